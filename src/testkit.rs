//! In-memory fixtures for tests: class files and ZIP archives assembled
//! byte by byte, so no JDK is needed to exercise the parsers.

use std::collections::HashMap;
use std::io::Write;
use std::path::Path;

use flate2::write::DeflateEncoder;
use flate2::{Compression, Crc};

use crate::parser::classfile::{ACC_PUBLIC, ACC_SUPER};

#[derive(Default)]
struct Pool {
    bytes: Vec<u8>,
    next: u16,
    seen: HashMap<Vec<u8>, u16>,
}

impl Pool {
    fn intern(&mut self, entry: Vec<u8>) -> u16 {
        if let Some(&idx) = self.seen.get(&entry) {
            return idx;
        }
        if self.next == 0 {
            self.next = 1;
        }
        let idx = self.next;
        self.bytes.extend_from_slice(&entry);
        self.seen.insert(entry, idx);
        self.next += 1;
        idx
    }

    fn utf8(&mut self, s: &str) -> u16 {
        let mut entry = vec![1];
        entry.extend_from_slice(&(s.len() as u16).to_be_bytes());
        entry.extend_from_slice(s.as_bytes());
        self.intern(entry)
    }

    fn class(&mut self, name: &str) -> u16 {
        let name_idx = self.utf8(name);
        let mut entry = vec![7];
        entry.extend_from_slice(&name_idx.to_be_bytes());
        self.intern(entry)
    }

    fn name_and_type(&mut self, name: &str, desc: &str) -> u16 {
        let n = self.utf8(name);
        let d = self.utf8(desc);
        let mut entry = vec![12];
        entry.extend_from_slice(&n.to_be_bytes());
        entry.extend_from_slice(&d.to_be_bytes());
        self.intern(entry)
    }

    fn method_ref(&mut self, owner: &str, name: &str, desc: &str) -> u16 {
        let c = self.class(owner);
        let nat = self.name_and_type(name, desc);
        let mut entry = vec![10];
        entry.extend_from_slice(&c.to_be_bytes());
        entry.extend_from_slice(&nat.to_be_bytes());
        self.intern(entry)
    }

    fn string(&mut self, s: &str) -> u16 {
        let u = self.utf8(s);
        let mut entry = vec![8];
        entry.extend_from_slice(&u.to_be_bytes());
        self.intern(entry)
    }
}

struct Member {
    access: u16,
    name: String,
    descriptor: String,
    signature: Option<String>,
}

struct Inner {
    inner: String,
    outer: Option<String>,
    simple: String,
    access: u16,
}

enum PoolRef {
    Class(String),
    Method(String, String, String),
    String(String),
}

/// Assembles a class file.
pub struct ClassBuilder {
    name: String,
    access: u16,
    major: u16,
    super_class: Option<String>,
    interfaces: Vec<String>,
    fields: Vec<Member>,
    methods: Vec<Member>,
    source_file: Option<String>,
    annotations: Vec<(String, Vec<String>)>,
    inner: Vec<Inner>,
    refs: Vec<PoolRef>,
}

impl ClassBuilder {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            access: ACC_PUBLIC | ACC_SUPER,
            major: 52,
            super_class: Some("java/lang/Object".to_string()),
            interfaces: Vec::new(),
            fields: Vec::new(),
            methods: Vec::new(),
            source_file: None,
            annotations: Vec::new(),
            inner: Vec::new(),
            refs: Vec::new(),
        }
    }

    pub fn access(mut self, access: u16) -> Self {
        self.access = access;
        self
    }

    pub fn major(mut self, major: u16) -> Self {
        self.major = major;
        self
    }

    pub fn super_class(mut self, name: &str) -> Self {
        self.super_class = Some(name.to_string());
        self
    }

    pub fn interface(mut self, name: &str) -> Self {
        self.interfaces.push(name.to_string());
        self
    }

    pub fn field(mut self, access: u16, name: &str, descriptor: &str) -> Self {
        self.fields.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: None,
        });
        self
    }

    pub fn method(self, access: u16, name: &str, descriptor: &str) -> Self {
        self.push_method(access, name, descriptor, None)
    }

    pub fn method_with_signature(
        self,
        access: u16,
        name: &str,
        descriptor: &str,
        signature: &str,
    ) -> Self {
        self.push_method(access, name, descriptor, Some(signature))
    }

    fn push_method(mut self, access: u16, name: &str, descriptor: &str, signature: Option<&str>) -> Self {
        self.methods.push(Member {
            access,
            name: name.to_string(),
            descriptor: descriptor.to_string(),
            signature: signature.map(str::to_string),
        });
        self
    }

    pub fn source_file(mut self, name: &str) -> Self {
        self.source_file = Some(name.to_string());
        self
    }

    pub fn class_annotation(mut self, descriptor: &str) -> Self {
        self.annotations.push((descriptor.to_string(), Vec::new()));
        self
    }

    /// Class annotation whose elements are class literals, given as return
    /// descriptors (`V` for `void.class`, `I` for `int.class`).
    pub fn class_annotation_with_class_values(mut self, descriptor: &str, values: &[&str]) -> Self {
        self.annotations.push((
            descriptor.to_string(),
            values.iter().map(|v| v.to_string()).collect(),
        ));
        self
    }

    pub fn inner_class(mut self, inner: &str, outer: Option<&str>, simple: &str, access: u16) -> Self {
        self.inner.push(Inner {
            inner: inner.to_string(),
            outer: outer.map(str::to_string),
            simple: simple.to_string(),
            access,
        });
        self
    }

    /// Adds a bare `Class` constant, as bytecode like `checkcast` would.
    pub fn class_ref(mut self, name: &str) -> Self {
        self.refs.push(PoolRef::Class(name.to_string()));
        self
    }

    pub fn method_ref(mut self, owner: &str, name: &str, descriptor: &str) -> Self {
        self.refs.push(PoolRef::Method(
            owner.to_string(),
            name.to_string(),
            descriptor.to_string(),
        ));
        self
    }

    /// Adds a string literal constant.
    pub fn string_constant(mut self, value: &str) -> Self {
        self.refs.push(PoolRef::String(value.to_string()));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut pool = Pool::default();
        let mut body = Vec::new();

        let this_idx = pool.class(&self.name);
        let super_idx = self.super_class.as_deref().map(|s| pool.class(s)).unwrap_or(0);
        body.extend_from_slice(&self.access.to_be_bytes());
        body.extend_from_slice(&this_idx.to_be_bytes());
        body.extend_from_slice(&super_idx.to_be_bytes());

        body.extend_from_slice(&(self.interfaces.len() as u16).to_be_bytes());
        for iface in &self.interfaces {
            let idx = pool.class(iface);
            body.extend_from_slice(&idx.to_be_bytes());
        }

        for members in [&self.fields, &self.methods] {
            body.extend_from_slice(&(members.len() as u16).to_be_bytes());
            for m in members.iter() {
                body.extend_from_slice(&m.access.to_be_bytes());
                body.extend_from_slice(&pool.utf8(&m.name).to_be_bytes());
                body.extend_from_slice(&pool.utf8(&m.descriptor).to_be_bytes());
                match &m.signature {
                    Some(sig) => {
                        body.extend_from_slice(&1u16.to_be_bytes());
                        body.extend_from_slice(&pool.utf8("Signature").to_be_bytes());
                        body.extend_from_slice(&2u32.to_be_bytes());
                        body.extend_from_slice(&pool.utf8(sig).to_be_bytes());
                    }
                    None => body.extend_from_slice(&0u16.to_be_bytes()),
                }
            }
        }

        for r in &self.refs {
            match r {
                PoolRef::Class(name) => {
                    pool.class(name);
                }
                PoolRef::Method(owner, name, desc) => {
                    pool.method_ref(owner, name, desc);
                }
                PoolRef::String(value) => {
                    pool.string(value);
                }
            }
        }

        let mut attrs: Vec<(u16, Vec<u8>)> = Vec::new();
        if let Some(source) = &self.source_file {
            let idx = pool.utf8(source);
            attrs.push((pool.utf8("SourceFile"), idx.to_be_bytes().to_vec()));
        }
        if !self.annotations.is_empty() {
            let mut data = (self.annotations.len() as u16).to_be_bytes().to_vec();
            for (a, values) in &self.annotations {
                data.extend_from_slice(&pool.utf8(a).to_be_bytes());
                data.extend_from_slice(&(values.len() as u16).to_be_bytes());
                for value in values {
                    data.extend_from_slice(&pool.utf8("value").to_be_bytes());
                    data.push(b'c');
                    data.extend_from_slice(&pool.utf8(value).to_be_bytes());
                }
            }
            attrs.push((pool.utf8("RuntimeVisibleAnnotations"), data));
        }
        if !self.inner.is_empty() {
            let mut data = (self.inner.len() as u16).to_be_bytes().to_vec();
            for entry in &self.inner {
                data.extend_from_slice(&pool.class(&entry.inner).to_be_bytes());
                let outer = entry.outer.as_deref().map(|o| pool.class(o)).unwrap_or(0);
                data.extend_from_slice(&outer.to_be_bytes());
                data.extend_from_slice(&pool.utf8(&entry.simple).to_be_bytes());
                data.extend_from_slice(&entry.access.to_be_bytes());
            }
            attrs.push((pool.utf8("InnerClasses"), data));
        }
        body.extend_from_slice(&(attrs.len() as u16).to_be_bytes());
        for (name_idx, data) in attrs {
            body.extend_from_slice(&name_idx.to_be_bytes());
            body.extend_from_slice(&(data.len() as u32).to_be_bytes());
            body.extend_from_slice(&data);
        }

        let mut out = 0xCAFE_BABEu32.to_be_bytes().to_vec();
        out.extend_from_slice(&0u16.to_be_bytes());
        out.extend_from_slice(&self.major.to_be_bytes());
        out.extend_from_slice(&pool.next.max(1).to_be_bytes());
        out.extend_from_slice(&pool.bytes);
        out.extend_from_slice(&body);
        out
    }
}

/// Assembles a ZIP archive with stored or deflated entries.
#[derive(Default)]
pub struct ZipBuilder {
    entries: Vec<(String, Vec<u8>, bool)>,
}

impl ZipBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stored(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push((name.to_string(), data.to_vec(), false));
        self
    }

    pub fn deflated(mut self, name: &str, data: &[u8]) -> Self {
        self.entries.push((name.to_string(), data.to_vec(), true));
        self
    }

    pub fn build(self) -> Vec<u8> {
        let mut out = Vec::new();
        let mut central = Vec::new();

        for (name, data, deflate) in &self.entries {
            let mut crc = Crc::new();
            crc.update(data);
            let payload = if *deflate {
                let mut enc = DeflateEncoder::new(Vec::new(), Compression::default());
                enc.write_all(data).unwrap();
                enc.finish().unwrap()
            } else {
                data.clone()
            };
            let method: u16 = if *deflate { 8 } else { 0 };
            let offset = out.len() as u32;

            out.extend_from_slice(&0x04034b50u32.to_le_bytes());
            out.extend_from_slice(&20u16.to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(&method.to_le_bytes());
            out.extend_from_slice(&[0; 4]);
            out.extend_from_slice(&crc.sum().to_le_bytes());
            out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            out.extend_from_slice(&(data.len() as u32).to_le_bytes());
            out.extend_from_slice(&(name.len() as u16).to_le_bytes());
            out.extend_from_slice(&0u16.to_le_bytes());
            out.extend_from_slice(name.as_bytes());
            out.extend_from_slice(&payload);

            central.extend_from_slice(&0x02014b50u32.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&20u16.to_le_bytes());
            central.extend_from_slice(&0u16.to_le_bytes());
            central.extend_from_slice(&method.to_le_bytes());
            central.extend_from_slice(&[0; 4]);
            central.extend_from_slice(&crc.sum().to_le_bytes());
            central.extend_from_slice(&(payload.len() as u32).to_le_bytes());
            central.extend_from_slice(&(data.len() as u32).to_le_bytes());
            central.extend_from_slice(&(name.len() as u16).to_le_bytes());
            central.extend_from_slice(&[0; 4]); // extra, comment lengths
            central.extend_from_slice(&[0; 4]); // disk, internal attrs
            central.extend_from_slice(&[0; 4]); // external attrs
            central.extend_from_slice(&offset.to_le_bytes());
            central.extend_from_slice(name.as_bytes());
        }

        let cd_offset = out.len() as u32;
        out.extend_from_slice(&central);
        out.extend_from_slice(&0x06054b50u32.to_le_bytes());
        out.extend_from_slice(&[0; 4]);
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(self.entries.len() as u16).to_le_bytes());
        out.extend_from_slice(&(central.len() as u32).to_le_bytes());
        out.extend_from_slice(&cd_offset.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        out
    }

    pub fn write_to(self, path: &Path) {
        std::fs::write(path, self.build()).unwrap();
    }
}

/// A jar holding one empty public class per internal name.
pub fn jar_with_classes(names: &[&str]) -> Vec<u8> {
    names
        .iter()
        .fold(ZipBuilder::new(), |zip, name| {
            zip.deflated(&format!("{}.class", name), &ClassBuilder::new(name).build())
        })
        .build()
}
