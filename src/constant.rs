//! Structural constant-pool decoding.
//!
//! Every entry is walked so the cursor lands on the access flags that follow the
//! pool, but only `Utf8` and `Class` entries keep anything beyond their tag.
//! `Utf8` payloads stay borrowed from the class buffer and are decoded on demand.

use crate::error::ParseError;
use crate::reader::ByteReader;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstantTag {
    Utf8,
    Integer,
    Float,
    Long,
    Double,
    Class,
    String,
    Fieldref,
    Methodref,
    InterfaceMethodref,
    NameAndType,
    MethodHandle,
    MethodType,
    Dynamic,
    InvokeDynamic,
    Module,
    Package,
}

impl ConstantTag {
    pub fn from_u8(tag: u8) -> Option<Self> {
        match tag {
            1 => Some(Self::Utf8),
            3 => Some(Self::Integer),
            4 => Some(Self::Float),
            5 => Some(Self::Long),
            6 => Some(Self::Double),
            7 => Some(Self::Class),
            8 => Some(Self::String),
            9 => Some(Self::Fieldref),
            10 => Some(Self::Methodref),
            11 => Some(Self::InterfaceMethodref),
            12 => Some(Self::NameAndType),
            15 => Some(Self::MethodHandle),
            16 => Some(Self::MethodType),
            17 => Some(Self::Dynamic),
            18 => Some(Self::InvokeDynamic),
            19 => Some(Self::Module),
            20 => Some(Self::Package),
            _ => None,
        }
    }

    /// Payload size after the tag byte. `Utf8` is variable and handled separately.
    fn fixed_len(self) -> usize {
        match self {
            Self::Utf8 => 0,
            Self::Class | Self::String | Self::MethodType | Self::Module | Self::Package => 2,
            Self::MethodHandle => 3,
            Self::Integer
            | Self::Float
            | Self::Fieldref
            | Self::Methodref
            | Self::InterfaceMethodref
            | Self::NameAndType
            | Self::Dynamic
            | Self::InvokeDynamic => 4,
            Self::Long | Self::Double => 8,
        }
    }

    /// Long and Double take two pool slots; the second one is unusable.
    fn is_wide(self) -> bool {
        matches!(self, Self::Long | Self::Double)
    }
}

#[derive(Debug, Clone, Copy)]
enum Entry<'a> {
    Unusable,
    Utf8(&'a [u8]),
    Class { name_index: u16 },
    Other(ConstantTag),
}

#[derive(Debug, Clone)]
pub struct ConstantPool<'a> {
    entries: Vec<Entry<'a>>,
}

impl<'a> ConstantPool<'a> {
    /// Reads `constant_pool_count` followed by the pool itself.
    pub fn read(reader: &mut ByteReader<'a>) -> Result<Self, ParseError> {
        let count = reader.read_u16()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Entry::Unusable);

        while entries.len() < count as usize {
            let index = entries.len() as u16;
            let raw_tag = reader.read_u8()?;
            let tag = ConstantTag::from_u8(raw_tag)
                .ok_or(ParseError::UnknownConstantTag { tag: raw_tag, index })?;

            let entry = match tag {
                ConstantTag::Utf8 => {
                    let len = reader.read_u16()?;
                    Entry::Utf8(reader.take(len as usize)?)
                }
                ConstantTag::Class => Entry::Class {
                    name_index: reader.read_u16()?,
                },
                other => {
                    reader.skip(other.fixed_len())?;
                    Entry::Other(other)
                }
            };
            entries.push(entry);

            if tag.is_wide() {
                entries.push(Entry::Unusable);
            }
        }

        // A wide entry in the last slot pushes one past the declared count.
        entries.truncate(count as usize);
        Ok(Self { entries })
    }

    /// Declared `constant_pool_count`, one more than the last valid index.
    pub fn count(&self) -> u16 {
        self.entries.len() as u16
    }

    pub fn tag(&self, index: u16) -> Result<Option<ConstantTag>, ParseError> {
        Ok(match self.entry(index)? {
            Entry::Unusable => None,
            Entry::Utf8(_) => Some(ConstantTag::Utf8),
            Entry::Class { .. } => Some(ConstantTag::Class),
            Entry::Other(tag) => Some(tag),
        })
    }

    /// Checks that `index` names a `Utf8` entry without decoding it.
    pub fn expect_utf8(&self, index: u16) -> Result<(), ParseError> {
        self.utf8_bytes(index).map(|_| ())
    }

    pub fn utf8(&self, index: u16) -> Result<String, ParseError> {
        self.utf8_bytes(index).map(decode_modified_utf8)
    }

    /// Resolves a `Class` entry to its internal name.
    pub fn class_name(&self, index: u16) -> Result<String, ParseError> {
        match self.entry(index)? {
            Entry::Class { name_index } => self.utf8(name_index),
            _ => Err(ParseError::UnexpectedConstant {
                index,
                expected: "Class",
            }),
        }
    }

    fn utf8_bytes(&self, index: u16) -> Result<&'a [u8], ParseError> {
        match self.entry(index)? {
            Entry::Utf8(bytes) => Ok(bytes),
            _ => Err(ParseError::UnexpectedConstant {
                index,
                expected: "Utf8",
            }),
        }
    }

    fn entry(&self, index: u16) -> Result<Entry<'a>, ParseError> {
        if index == 0 {
            return Err(ParseError::UnexpectedConstant {
                index,
                expected: "usable",
            });
        }
        self.entries
            .get(index as usize)
            .copied()
            .ok_or(ParseError::ConstantIndexOutOfRange {
                index,
                count: self.count(),
            })
    }
}

/// Decodes the class-file flavour of UTF-8: NUL is `C0 80` and supplementary
/// characters arrive as two encoded surrogates. Lone surrogates, stray
/// continuation bytes, 4-byte lead bytes and cut-off sequences each become
/// U+FFFD; the name stays usable rather than failing the class.
pub fn decode_modified_utf8(bytes: &[u8]) -> String {
    if bytes.iter().all(|b| *b != 0 && *b < 0x80) {
        return bytes.iter().map(|&b| b as char).collect();
    }

    let mut units: Vec<u16> = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        let (unit, width) = if b & 0x80 == 0 {
            (Some(b as u16), 1)
        } else if b & 0xE0 == 0xC0 {
            let unit = continuation(bytes, i + 1).map(|b2| ((b as u16 & 0x1F) << 6) | b2);
            (unit, 2)
        } else if b & 0xF0 == 0xE0 {
            let unit = continuation(bytes, i + 1)
                .zip(continuation(bytes, i + 2))
                .map(|(b2, b3)| ((b as u16 & 0x0F) << 12) | (b2 << 6) | b3);
            (unit, 3)
        } else {
            (None, 1)
        };
        match unit {
            Some(unit) => {
                units.push(unit);
                i += width;
            }
            None => {
                units.push(REPLACEMENT);
                i += 1;
            }
        }
    }

    String::from_utf16_lossy(&units)
}

const REPLACEMENT: u16 = 0xFFFD;

fn continuation(bytes: &[u8], at: usize) -> Option<u16> {
    let b = *bytes.get(at)?;
    if b & 0xC0 != 0x80 {
        return None;
    }
    Some(b as u16 & 0x3F)
}
