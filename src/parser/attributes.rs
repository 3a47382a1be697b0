//! The class-file attributes that carry type references or visibility.
//!
//! Unknown attributes are skipped by length. Type annotations are skipped
//! as well; their target encoding carries no extra type names beyond the
//! annotation type, which is usually also present in the constant pool.

use super::constant_pool::ConstantPool;
use super::reader::Reader;
use crate::error::ParseError;

/// Nesting cap for annotation element values.
const MAX_ANNOTATION_DEPTH: usize = 64;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InnerClass {
    pub inner: String,
    pub outer: Option<String>,
    pub simple_name: Option<String>,
    pub access_flags: u16,
}

#[derive(Debug, Clone, Default)]
pub struct Attributes {
    pub source_file: Option<String>,
    pub signature: Option<String>,
    pub inner_classes: Vec<InnerClass>,
    /// Annotation type descriptors plus class/enum descriptors used as
    /// annotation values.
    pub annotation_descriptors: Vec<String>,
    /// Local variable descriptors and signatures from `Code` debug tables.
    pub local_variable_types: Vec<String>,
    pub synthetic: bool,
}

impl Attributes {
    fn absorb(&mut self, other: Attributes) {
        self.annotation_descriptors.extend(other.annotation_descriptors);
        self.local_variable_types.extend(other.local_variable_types);
    }
}

pub fn parse_attributes(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Attributes, ParseError> {
    let mut attrs = Attributes::default();
    let count = r.u2()?;
    for _ in 0..count {
        let name = pool.utf8(r.u2()?)?;
        let mut body = Reader::new(r.u4_prefixed()?);
        match name {
            "SourceFile" => attrs.source_file = Some(pool.utf8(body.u2()?)?.to_string()),
            "Signature" => attrs.signature = Some(pool.utf8(body.u2()?)?.to_string()),
            "Synthetic" => attrs.synthetic = true,
            "InnerClasses" => attrs.inner_classes = inner_classes(&mut body, pool)?,
            "RuntimeVisibleAnnotations" | "RuntimeInvisibleAnnotations" => {
                annotations(&mut body, pool, &mut attrs.annotation_descriptors)?
            }
            "RuntimeVisibleParameterAnnotations" | "RuntimeInvisibleParameterAnnotations" => {
                let params = body.u1()?;
                for _ in 0..params {
                    annotations(&mut body, pool, &mut attrs.annotation_descriptors)?;
                }
            }
            "AnnotationDefault" => {
                element_value(&mut body, pool, &mut attrs.annotation_descriptors, 0)?
            }
            "Code" => {
                let nested = code(&mut body, pool)?;
                attrs.absorb(nested);
            }
            "LocalVariableTable" | "LocalVariableTypeTable" => {
                let len = body.u2()?;
                for _ in 0..len {
                    body.skip(6)?; // start_pc, length, name_index
                    attrs
                        .local_variable_types
                        .push(pool.utf8(body.u2()?)?.to_string());
                    body.skip(2)?; // index
                }
            }
            _ => {}
        }
    }
    Ok(attrs)
}

fn inner_classes(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Vec<InnerClass>, ParseError> {
    let count = r.u2()?;
    let mut out = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let inner = pool.class_name(r.u2()?)?.to_string();
        let outer = pool.optional_class_name(r.u2()?)?.map(str::to_string);
        let name_index = r.u2()?;
        let simple_name = if name_index == 0 {
            None
        } else {
            Some(pool.utf8(name_index)?.to_string())
        };
        out.push(InnerClass {
            inner,
            outer,
            simple_name,
            access_flags: r.u2()?,
        });
    }
    Ok(out)
}

fn code(r: &mut Reader<'_>, pool: &ConstantPool) -> Result<Attributes, ParseError> {
    r.skip(4)?; // max_stack, max_locals
    r.u4_prefixed()?;
    let handlers = r.u2()? as usize;
    r.skip(handlers * 8)?;
    parse_attributes(r, pool)
}

fn annotations(r: &mut Reader<'_>, pool: &ConstantPool, out: &mut Vec<String>) -> Result<(), ParseError> {
    let count = r.u2()?;
    for _ in 0..count {
        annotation(r, pool, out, 0)?;
    }
    Ok(())
}

fn annotation(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
    out: &mut Vec<String>,
    depth: usize,
) -> Result<(), ParseError> {
    out.push(pool.utf8(r.u2()?)?.to_string());
    let pairs = r.u2()?;
    for _ in 0..pairs {
        r.skip(2)?; // element_name_index
        element_value(r, pool, out, depth + 1)?;
    }
    Ok(())
}

fn element_value(
    r: &mut Reader<'_>,
    pool: &ConstantPool,
    out: &mut Vec<String>,
    depth: usize,
) -> Result<(), ParseError> {
    if depth > MAX_ANNOTATION_DEPTH {
        return Err(ParseError::LimitExceeded("annotation nesting".to_string()));
    }
    let tag = r.u1()?;
    match tag {
        b'B' | b'C' | b'D' | b'F' | b'I' | b'J' | b'S' | b'Z' | b's' => r.skip(2)?,
        b'e' => {
            out.push(pool.utf8(r.u2()?)?.to_string());
            r.skip(2)?; // const_name_index
        }
        b'c' => {
            // Return descriptor of the literal; `void.class` is `V`.
            let descriptor = pool.utf8(r.u2()?)?;
            if descriptor != "V" {
                out.push(descriptor.to_string());
            }
        }
        b'@' => annotation(r, pool, out, depth + 1)?,
        b'[' => {
            let count = r.u2()?;
            for _ in 0..count {
                element_value(r, pool, out, depth + 1)?;
            }
        }
        _ => {
            return Err(ParseError::CorruptEntry {
                entry: "annotation".to_string(),
                reason: format!("unknown element value tag {}", tag),
            })
        }
    }
    Ok(())
}
