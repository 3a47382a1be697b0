//! JVM class file structure.

use std::collections::BTreeSet;

use super::attributes::{parse_attributes, Attributes, InnerClass};
use super::constant_pool::{Constant, ConstantPool};
use super::descriptor::{class_constant_type, collect_signature_types};
use super::reader::Reader;
use crate::error::ParseError;

pub const MAGIC: u32 = 0xCAFE_BABE;

pub const ACC_PUBLIC: u16 = 0x0001;
pub const ACC_PRIVATE: u16 = 0x0002;
pub const ACC_PROTECTED: u16 = 0x0004;
pub const ACC_STATIC: u16 = 0x0008;
pub const ACC_FINAL: u16 = 0x0010;
pub const ACC_SUPER: u16 = 0x0020;
pub const ACC_VOLATILE: u16 = 0x0040;
/// Same bit as `ACC_VOLATILE`, on methods.
pub const ACC_BRIDGE: u16 = 0x0040;
pub const ACC_TRANSIENT: u16 = 0x0080;
pub const ACC_NATIVE: u16 = 0x0100;
pub const ACC_INTERFACE: u16 = 0x0200;
pub const ACC_ABSTRACT: u16 = 0x0400;
pub const ACC_SYNTHETIC: u16 = 0x1000;
pub const ACC_ANNOTATION: u16 = 0x2000;
pub const ACC_ENUM: u16 = 0x4000;
pub const ACC_MODULE: u16 = 0x8000;

/// A field or method.
#[derive(Debug, Clone)]
pub struct MemberInfo {
    pub access_flags: u16,
    pub name: String,
    pub descriptor: String,
    pub signature: Option<String>,
    pub synthetic: bool,
    annotation_descriptors: Vec<String>,
    local_variable_types: Vec<String>,
}

impl MemberInfo {
    pub fn has(&self, flag: u16) -> bool {
        self.access_flags & flag != 0
    }

    pub fn is_synthetic(&self) -> bool {
        self.synthetic || self.has(ACC_SYNTHETIC)
    }
}

#[derive(Debug, Clone)]
pub struct ClassFile {
    pub minor_version: u16,
    pub major_version: u16,
    pub constant_pool: ConstantPool,
    pub access_flags: u16,
    /// Internal name of the class this unit defines.
    pub this_class: String,
    pub super_class: Option<String>,
    pub interfaces: Vec<String>,
    pub fields: Vec<MemberInfo>,
    pub methods: Vec<MemberInfo>,
    pub source_file: Option<String>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClass>,
    pub synthetic: bool,
    annotation_descriptors: Vec<String>,
}

impl ClassFile {
    pub fn parse(data: &[u8]) -> Result<Self, ParseError> {
        let mut r = Reader::new(data);
        let magic = r.u4()?;
        if magic != MAGIC {
            return Err(ParseError::BadMagic { found: magic });
        }
        let minor_version = r.u2()?;
        let major_version = r.u2()?;
        let constant_pool = ConstantPool::parse(&mut r)?;

        let access_flags = r.u2()?;
        let this_class = constant_pool.class_name(r.u2()?)?.to_string();
        let super_class = constant_pool
            .optional_class_name(r.u2()?)?
            .map(str::to_string);

        let interface_count = r.u2()?;
        let mut interfaces = Vec::with_capacity(interface_count as usize);
        for _ in 0..interface_count {
            interfaces.push(constant_pool.class_name(r.u2()?)?.to_string());
        }

        let fields = members(&mut r, &constant_pool)?;
        let methods = members(&mut r, &constant_pool)?;
        let attrs = parse_attributes(&mut r, &constant_pool)?;

        Ok(Self {
            minor_version,
            major_version,
            constant_pool,
            access_flags,
            this_class,
            super_class,
            interfaces,
            fields,
            methods,
            source_file: attrs.source_file,
            signature: attrs.signature,
            inner_classes: attrs.inner_classes,
            synthetic: attrs.synthetic,
            annotation_descriptors: attrs.annotation_descriptors,
        })
    }

    pub fn has(&self, flag: u16) -> bool {
        self.access_flags & flag != 0
    }

    /// `module-info` and `package-info` units carry metadata, not a type.
    pub fn defines_type(&self) -> bool {
        !self.has(ACC_MODULE)
            && !self.this_class.ends_with("/package-info")
            && self.this_class != "package-info"
            && self.this_class != "module-info"
    }

    /// The `InnerClasses` entry describing this class itself, if nested.
    pub fn self_inner_entry(&self) -> Option<&InnerClass> {
        self.inner_classes
            .iter()
            .find(|entry| entry.inner == self.this_class)
    }

    /// Every class this unit refers to, as internal names. Includes the
    /// unit's own name; callers decide what to filter.
    pub fn referenced_types(&self) -> Result<BTreeSet<String>, ParseError> {
        let mut names = Vec::new();
        let pool = &self.constant_pool;

        for constant in pool.iter() {
            match constant {
                Constant::Class { name_index } => {
                    if let Some(name) = class_constant_type(pool.utf8(*name_index)?)? {
                        names.push(name);
                    }
                }
                Constant::NameAndType {
                    descriptor_index, ..
                }
                | Constant::MethodType { descriptor_index } => {
                    collect_signature_types(pool.utf8(*descriptor_index)?, &mut names)?;
                }
                _ => {}
            }
        }

        if let Some(sig) = &self.signature {
            collect_signature_types(sig, &mut names)?;
        }
        for descriptor in &self.annotation_descriptors {
            collect_signature_types(descriptor, &mut names)?;
        }
        for member in self.fields.iter().chain(&self.methods) {
            collect_signature_types(&member.descriptor, &mut names)?;
            if let Some(sig) = &member.signature {
                collect_signature_types(sig, &mut names)?;
            }
            for descriptor in member
                .annotation_descriptors
                .iter()
                .chain(&member.local_variable_types)
            {
                collect_signature_types(descriptor, &mut names)?;
            }
        }

        Ok(names.into_iter().collect())
    }
}

fn members(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<MemberInfo>, ParseError> {
    let count = r.u2()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let access_flags = r.u2()?;
        let name = pool.utf8(r.u2()?)?.to_string();
        let descriptor = pool.utf8(r.u2()?)?.to_string();
        let Attributes {
            signature,
            synthetic,
            annotation_descriptors,
            local_variable_types,
            ..
        } = parse_attributes(r, pool)?;
        out.push(MemberInfo {
            access_flags,
            name,
            descriptor,
            signature,
            synthetic,
            annotation_descriptors,
            local_variable_types,
        });
    }
    Ok(out)
}
