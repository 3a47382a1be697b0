//! Class-file constant pool.

use super::reader::Reader;
use crate::error::ParseError;

/// One constant pool entry. Numeric payloads are skipped; only the
/// structure needed for type references is kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constant {
    /// Slot 0, and the second slot of `Long`/`Double`.
    Unusable,
    Utf8(String),
    Integer,
    Float,
    Long,
    Double,
    Class { name_index: u16 },
    String { utf8_index: u16 },
    FieldRef { class_index: u16, name_and_type_index: u16 },
    MethodRef { class_index: u16, name_and_type_index: u16 },
    InterfaceMethodRef { class_index: u16, name_and_type_index: u16 },
    NameAndType { name_index: u16, descriptor_index: u16 },
    MethodHandle { reference_kind: u8, reference_index: u16 },
    MethodType { descriptor_index: u16 },
    Dynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    InvokeDynamic { bootstrap_method_attr_index: u16, name_and_type_index: u16 },
    Module { name_index: u16 },
    Package { name_index: u16 },
}

#[derive(Debug, Clone, Default)]
pub struct ConstantPool {
    entries: Vec<Constant>,
}

impl ConstantPool {
    pub fn parse(r: &mut Reader<'_>) -> Result<Self, ParseError> {
        let count = r.u2()?;
        let mut entries = Vec::with_capacity(count as usize);
        entries.push(Constant::Unusable);

        let count = u32::from(count);
        let mut index: u32 = 1;
        while index < count {
            let tag = r.u1()?;
            let constant = match tag {
                1 => {
                    let len = r.u2()? as usize;
                    // Modified UTF-8; lossy decoding only affects NUL and
                    // supplementary characters, which never occur in names
                    // we care about.
                    Constant::Utf8(String::from_utf8_lossy(r.bytes(len)?).into_owned())
                }
                3 => {
                    r.skip(4)?;
                    Constant::Integer
                }
                4 => {
                    r.skip(4)?;
                    Constant::Float
                }
                5 => {
                    r.skip(8)?;
                    Constant::Long
                }
                6 => {
                    r.skip(8)?;
                    Constant::Double
                }
                7 => Constant::Class { name_index: r.u2()? },
                8 => Constant::String { utf8_index: r.u2()? },
                9 => Constant::FieldRef {
                    class_index: r.u2()?,
                    name_and_type_index: r.u2()?,
                },
                10 => Constant::MethodRef {
                    class_index: r.u2()?,
                    name_and_type_index: r.u2()?,
                },
                11 => Constant::InterfaceMethodRef {
                    class_index: r.u2()?,
                    name_and_type_index: r.u2()?,
                },
                12 => Constant::NameAndType {
                    name_index: r.u2()?,
                    descriptor_index: r.u2()?,
                },
                15 => Constant::MethodHandle {
                    reference_kind: r.u1()?,
                    reference_index: r.u2()?,
                },
                16 => Constant::MethodType {
                    descriptor_index: r.u2()?,
                },
                17 => Constant::Dynamic {
                    bootstrap_method_attr_index: r.u2()?,
                    name_and_type_index: r.u2()?,
                },
                18 => Constant::InvokeDynamic {
                    bootstrap_method_attr_index: r.u2()?,
                    name_and_type_index: r.u2()?,
                },
                19 => Constant::Module { name_index: r.u2()? },
                20 => Constant::Package { name_index: r.u2()? },
                _ => {
                    return Err(ParseError::UnknownConstantTag {
                        tag,
                        index: index as u16,
                    })
                }
            };

            let wide = matches!(constant, Constant::Long | Constant::Double);
            if wide && index + 1 >= count {
                return Err(ParseError::CorruptEntry {
                    entry: "constant pool".to_string(),
                    reason: format!("8-byte constant in last slot {}", index),
                });
            }
            entries.push(constant);
            index += 1;
            if wide {
                entries.push(Constant::Unusable);
                index += 1;
            }
        }

        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    pub fn get(&self, index: u16) -> Result<&Constant, ParseError> {
        match self.entries.get(index as usize) {
            Some(Constant::Unusable) | None => Err(ParseError::BadConstantIndex { index }),
            Some(constant) => Ok(constant),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constant> {
        self.entries.iter()
    }

    pub fn utf8(&self, index: u16) -> Result<&str, ParseError> {
        match self.get(index)? {
            Constant::Utf8(s) => Ok(s),
            _ => Err(ParseError::WrongConstantKind {
                index,
                expected: "Utf8",
            }),
        }
    }

    /// Internal name (`com/example/Foo`, or an array descriptor) of a
    /// `Class` constant.
    pub fn class_name(&self, index: u16) -> Result<&str, ParseError> {
        match self.get(index)? {
            Constant::Class { name_index } => self.utf8(*name_index),
            _ => Err(ParseError::WrongConstantKind {
                index,
                expected: "Class",
            }),
        }
    }

    /// Like [`class_name`](Self::class_name) but index 0 means "none".
    pub fn optional_class_name(&self, index: u16) -> Result<Option<&str>, ParseError> {
        if index == 0 {
            Ok(None)
        } else {
            self.class_name(index).map(Some)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pool_bytes(count: u16, body: &[u8]) -> Vec<u8> {
        let mut out = count.to_be_bytes().to_vec();
        out.extend_from_slice(body);
        out
    }

    #[test]
    fn test_parse_class_and_utf8() {
        let mut body = vec![1, 0, 3];
        body.extend_from_slice(b"a/B");
        body.extend_from_slice(&[7, 0, 1]);
        let data = pool_bytes(3, &body);
        let pool = ConstantPool::parse(&mut Reader::new(&data)).unwrap();
        assert_eq!(pool.len(), 3);
        assert_eq!(pool.utf8(1).unwrap(), "a/B");
        assert_eq!(pool.class_name(2).unwrap(), "a/B");
        assert!(matches!(
            pool.class_name(1),
            Err(ParseError::WrongConstantKind { .. })
        ));
    }

    #[test]
    fn test_long_takes_two_slots() {
        let mut body = vec![5, 0, 0, 0, 0, 0, 0, 0, 1];
        body.extend_from_slice(&[1, 0, 1, b'x']);
        let data = pool_bytes(4, &body);
        let pool = ConstantPool::parse(&mut Reader::new(&data)).unwrap();
        assert!(matches!(pool.get(2), Err(ParseError::BadConstantIndex { index: 2 })));
        assert_eq!(pool.utf8(3).unwrap(), "x");
    }

    #[test]
    fn test_wide_constant_in_last_slot_is_error() {
        let data = pool_bytes(3, &[1, 0, 1, b'x', 5, 0, 0, 0, 0, 0, 0, 0, 1]);
        assert!(matches!(
            ConstantPool::parse(&mut Reader::new(&data)),
            Err(ParseError::CorruptEntry { .. })
        ));
    }

    #[test]
    fn test_full_pool_with_trailing_long_does_not_overflow() {
        let mut body = Vec::new();
        for _ in 1..0xFFFEu32 {
            body.extend_from_slice(&[3, 0, 0, 0, 0]);
        }
        body.extend_from_slice(&[5, 0, 0, 0, 0, 0, 0, 0, 0]);
        let data = pool_bytes(0xFFFF, &body);
        assert!(matches!(
            ConstantPool::parse(&mut Reader::new(&data)),
            Err(ParseError::CorruptEntry { .. })
        ));
    }

    #[test]
    fn test_unknown_tag_is_error() {
        let data = pool_bytes(2, &[99]);
        assert_eq!(
            ConstantPool::parse(&mut Reader::new(&data)).unwrap_err(),
            ParseError::UnknownConstantTag { tag: 99, index: 1 }
        );
    }

    #[test]
    fn test_index_zero_is_none() {
        let data = pool_bytes(1, &[]);
        let pool = ConstantPool::parse(&mut Reader::new(&data)).unwrap();
        assert!(pool.is_empty());
        assert_eq!(pool.optional_class_name(0).unwrap(), None);
        assert!(pool.get(0).is_err());
    }
}
