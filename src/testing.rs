//! Test-only assembler for small class files.

use std::collections::HashMap;

pub struct ClassBuilder {
    major: u16,
    minor: u16,
    pool: Vec<u8>,
    next_slot: u16,
    utf8_slots: HashMap<String, u16>,
    this_class: u16,
    super_class: u16,
    interfaces: Vec<u16>,
    fields: Vec<Vec<u8>>,
    methods: Vec<Vec<u8>>,
    attributes: Vec<Vec<u8>>,
}

impl ClassBuilder {
    pub fn new(internal_name: &str) -> Self {
        let mut builder = Self {
            major: 52,
            minor: 0,
            pool: Vec::new(),
            next_slot: 1,
            utf8_slots: HashMap::new(),
            this_class: 0,
            super_class: 0,
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            attributes: Vec::new(),
        };
        builder.this_class = builder.class_entry(internal_name);
        builder.super_class = builder.class_entry("java/lang/Object");
        builder
    }

    pub fn version(mut self, major: u16, minor: u16) -> Self {
        self.major = major;
        self.minor = minor;
        self
    }

    pub fn this_class_index(mut self, index: u16) -> Self {
        self.this_class = index;
        self
    }

    pub fn interface(mut self, internal_name: &str) -> Self {
        let index = self.class_entry(internal_name);
        self.interfaces.push(index);
        self
    }

    pub fn long_constant(mut self, value: i64) -> Self {
        self.pool.push(5);
        self.pool.extend_from_slice(&value.to_be_bytes());
        self.next_slot += 2;
        self
    }

    pub fn double_constant(mut self, value: f64) -> Self {
        self.pool.push(6);
        self.pool.extend_from_slice(&value.to_bits().to_be_bytes());
        self.next_slot += 2;
        self
    }

    pub fn field(mut self, name: &str, descriptor: &str) -> Self {
        let member = self.member(name, descriptor, Vec::new());
        self.fields.push(member);
        self
    }

    pub fn field_with_attribute(
        mut self,
        name: &str,
        descriptor: &str,
        attribute: &str,
        data: &[u8],
    ) -> Self {
        let attr = self.attribute(attribute, data);
        let member = self.member(name, descriptor, vec![attr]);
        self.fields.push(member);
        self
    }

    /// Adds a method whose Code attribute holds `code_len` bytes of bytecode.
    pub fn method(mut self, name: &str, descriptor: &str, code_len: u32) -> Self {
        let mut code = Vec::new();
        code.extend_from_slice(&2u16.to_be_bytes());
        code.extend_from_slice(&1u16.to_be_bytes());
        code.extend_from_slice(&code_len.to_be_bytes());
        for i in 0..code_len {
            code.push(if i + 1 == code_len { 0xB1 } else { (i % 251) as u8 });
        }
        code.extend_from_slice(&0u16.to_be_bytes());
        code.extend_from_slice(&0u16.to_be_bytes());

        let attr = self.attribute("Code", &code);
        let member = self.member(name, descriptor, vec![attr]);
        self.methods.push(member);
        self
    }

    pub fn class_attribute(mut self, name: &str, data: &[u8]) -> Self {
        let attr = self.attribute(name, data);
        self.attributes.push(attr);
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        out.extend_from_slice(&0xCAFE_BABEu32.to_be_bytes());
        out.extend_from_slice(&self.minor.to_be_bytes());
        out.extend_from_slice(&self.major.to_be_bytes());
        out.extend_from_slice(&self.next_slot.to_be_bytes());
        out.extend_from_slice(&self.pool);
        out.extend_from_slice(&0x0021u16.to_be_bytes());
        out.extend_from_slice(&self.this_class.to_be_bytes());
        out.extend_from_slice(&self.super_class.to_be_bytes());

        out.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for index in &self.interfaces {
            out.extend_from_slice(&index.to_be_bytes());
        }
        for table in [&self.fields, &self.methods, &self.attributes] {
            out.extend_from_slice(&(table.len() as u16).to_be_bytes());
            for entry in table {
                out.extend_from_slice(entry);
            }
        }
        out
    }

    fn utf8(&mut self, value: &str) -> u16 {
        if let Some(index) = self.utf8_slots.get(value) {
            return *index;
        }
        let index = self.next_slot;
        self.pool.push(1);
        self.pool
            .extend_from_slice(&(value.len() as u16).to_be_bytes());
        self.pool.extend_from_slice(value.as_bytes());
        self.next_slot += 1;
        self.utf8_slots.insert(value.to_string(), index);
        index
    }

    fn class_entry(&mut self, internal_name: &str) -> u16 {
        let name_index = self.utf8(internal_name);
        let index = self.next_slot;
        self.pool.push(7);
        self.pool.extend_from_slice(&name_index.to_be_bytes());
        self.next_slot += 1;
        index
    }

    fn attribute(&mut self, name: &str, data: &[u8]) -> Vec<u8> {
        let mut out = self.utf8(name).to_be_bytes().to_vec();
        out.extend_from_slice(&(data.len() as u32).to_be_bytes());
        out.extend_from_slice(data);
        out
    }

    fn member(&mut self, name: &str, descriptor: &str, attributes: Vec<Vec<u8>>) -> Vec<u8> {
        let mut out = 0x0001u16.to_be_bytes().to_vec();
        out.extend_from_slice(&self.utf8(name).to_be_bytes());
        out.extend_from_slice(&self.utf8(descriptor).to_be_bytes());
        out.extend_from_slice(&(attributes.len() as u16).to_be_bytes());
        for attr in attributes {
            out.extend_from_slice(&attr);
        }
        out
    }
}
