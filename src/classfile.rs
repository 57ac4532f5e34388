//! Declaration-level class-file parsing.
//!
//! `parse_class` makes one forward pass over the buffer: header, constant pool,
//! this/super/interfaces, the field table, the method table and the class
//! attributes. Attribute bodies (Code, StackMapTable, LineNumberTable,
//! Signature, ConstantValue, ...) are skipped by their declared length and never
//! interpreted.

use serde::Serialize;

use crate::constant::ConstantPool;
use crate::error::ParseError;
use crate::reader::ByteReader;

pub const MAGIC: u32 = 0xCAFE_BABE;

/// Newest major version accepted (Java 25).
pub const MAX_SUPPORTED_MAJOR: u16 = 69;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClassVersion {
    pub major: u16,
    pub minor: u16,
}

/// A method or field as declared: name plus its raw type descriptor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberSignature {
    pub name: String,
    pub descriptor: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassDescriptor {
    pub internal_name: String,
    pub version: ClassVersion,
    pub methods: Vec<MemberSignature>,
    pub fields: Vec<MemberSignature>,
}

pub fn parse_class(bytes: &[u8]) -> Result<ClassDescriptor, ParseError> {
    let mut reader = ByteReader::new(bytes);

    let magic = reader.read_u32()?;
    if magic != MAGIC {
        return Err(ParseError::BadMagic { found: magic });
    }

    let minor = reader.read_u16()?;
    let major = reader.read_u16()?;
    if major > MAX_SUPPORTED_MAJOR {
        return Err(ParseError::UnsupportedVersion { major, minor });
    }

    let pool = ConstantPool::read(&mut reader)?;

    let _access_flags = reader.read_u16()?;
    let this_class = reader.read_u16()?;
    let internal_name = pool.class_name(this_class)?;
    let _super_class = reader.read_u16()?;

    let interfaces_count = reader.read_u16()?;
    reader.skip(interfaces_count as usize * 2)?;

    let fields = read_members(&mut reader, &pool)?;
    let methods = read_members(&mut reader, &pool)?;

    let attributes_count = reader.read_u16()?;
    skip_attributes(&mut reader, &pool, attributes_count)?;

    Ok(ClassDescriptor {
        internal_name,
        version: ClassVersion { major, minor },
        methods,
        fields,
    })
}

/// Fields and methods share one layout:
/// `access_flags, name_index, descriptor_index, attributes_count, attributes[]`.
fn read_members(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool<'_>,
) -> Result<Vec<MemberSignature>, ParseError> {
    let count = reader.read_u16()?;
    let mut members = Vec::with_capacity(count as usize);

    for _ in 0..count {
        let _access_flags = reader.read_u16()?;
        let name = pool.utf8(reader.read_u16()?)?;
        let descriptor = pool.utf8(reader.read_u16()?)?;
        let attributes_count = reader.read_u16()?;
        skip_attributes(reader, pool, attributes_count)?;
        members.push(MemberSignature { name, descriptor });
    }

    Ok(members)
}

fn skip_attributes(
    reader: &mut ByteReader<'_>,
    pool: &ConstantPool<'_>,
    count: u16,
) -> Result<(), ParseError> {
    for _ in 0..count {
        pool.expect_utf8(reader.read_u16()?)?;
        let len = reader.read_u32()?;
        reader.skip(len as usize)?;
    }
    Ok(())
}
