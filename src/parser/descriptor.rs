//! Field/method descriptors and generic signatures.
//!
//! Names returned here are JVM internal names (`java/lang/String`); nested
//! types reached through a generic `Outer<T>.Inner` path are joined with `$`.

use std::fmt;

use crate::error::ParseError;

/// A type as written in a descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JavaType {
    Base(&'static str),
    Void,
    Object(String),
    Array(Box<JavaType>),
}

impl JavaType {
    /// Innermost class referenced by this type, if any.
    pub fn class_name(&self) -> Option<&str> {
        match self {
            JavaType::Object(name) => Some(name),
            JavaType::Array(inner) => inner.class_name(),
            JavaType::Base(_) | JavaType::Void => None,
        }
    }
}

impl fmt::Display for JavaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JavaType::Base(name) => write!(f, "{}", name),
            JavaType::Void => write!(f, "void"),
            JavaType::Object(name) => write!(f, "{}", name.replace('/', ".")),
            JavaType::Array(inner) => write!(f, "{}[]", inner),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodDescriptor {
    pub params: Vec<JavaType>,
    pub ret: JavaType,
}

impl MethodDescriptor {
    pub fn class_names(&self) -> impl Iterator<Item = &str> {
        self.params
            .iter()
            .chain(std::iter::once(&self.ret))
            .filter_map(JavaType::class_name)
    }
}

fn bad(s: &str) -> ParseError {
    ParseError::BadDescriptor(s.to_string())
}

fn base_type(c: u8) -> Option<&'static str> {
    Some(match c {
        b'B' => "byte",
        b'C' => "char",
        b'D' => "double",
        b'F' => "float",
        b'I' => "int",
        b'J' => "long",
        b'S' => "short",
        b'Z' => "boolean",
        _ => return None,
    })
}

/// Parse one field type starting at `*pos`.
fn field_type(s: &str, pos: &mut usize) -> Result<JavaType, ParseError> {
    let bytes = s.as_bytes();
    let c = *bytes.get(*pos).ok_or_else(|| bad(s))?;
    *pos += 1;
    if let Some(name) = base_type(c) {
        return Ok(JavaType::Base(name));
    }
    match c {
        b'L' => {
            let start = *pos;
            let len = bytes[start..]
                .iter()
                .position(|&b| b == b';')
                .ok_or_else(|| bad(s))?;
            if len == 0 {
                return Err(bad(s));
            }
            *pos = start + len + 1;
            Ok(JavaType::Object(s[start..start + len].to_string()))
        }
        b'[' => Ok(JavaType::Array(Box::new(field_type(s, pos)?))),
        _ => Err(bad(s)),
    }
}

pub fn parse_field_descriptor(s: &str) -> Result<JavaType, ParseError> {
    let mut pos = 0;
    let ty = field_type(s, &mut pos)?;
    if pos != s.len() {
        return Err(bad(s));
    }
    Ok(ty)
}

pub fn parse_method_descriptor(s: &str) -> Result<MethodDescriptor, ParseError> {
    let bytes = s.as_bytes();
    if bytes.first() != Some(&b'(') {
        return Err(bad(s));
    }
    let mut pos = 1;
    let mut params = Vec::new();
    loop {
        match bytes.get(pos) {
            Some(b')') => {
                pos += 1;
                break;
            }
            Some(_) => params.push(field_type(s, &mut pos)?),
            None => return Err(bad(s)),
        }
    }
    let ret = if bytes.get(pos) == Some(&b'V') {
        pos += 1;
        JavaType::Void
    } else {
        field_type(s, &mut pos)?
    };
    if pos != s.len() {
        return Err(bad(s));
    }
    Ok(MethodDescriptor { params, ret })
}

/// Element type of a `Class` constant. Plain class constants hold an
/// internal name; array class constants hold a descriptor.
pub fn class_constant_type(name: &str) -> Result<Option<String>, ParseError> {
    if name.starts_with('[') {
        Ok(parse_field_descriptor(name)?
            .class_name()
            .map(str::to_string))
    } else {
        Ok(Some(name.to_string()))
    }
}

/// Collect every class named by a descriptor or generic signature (class,
/// method or field form).
pub fn collect_signature_types(sig: &str, out: &mut Vec<String>) -> Result<(), ParseError> {
    let mut p = SignatureParser { s: sig, pos: 0 };
    p.parse(out)
}

struct SignatureParser<'a> {
    s: &'a str,
    pos: usize,
}

impl SignatureParser<'_> {
    fn peek(&self) -> Option<u8> {
        self.s.as_bytes().get(self.pos).copied()
    }

    fn next(&mut self) -> Result<u8, ParseError> {
        let c = self.peek().ok_or_else(|| bad(self.s))?;
        self.pos += 1;
        Ok(c)
    }

    fn expect(&mut self, want: u8) -> Result<(), ParseError> {
        if self.next()? == want {
            Ok(())
        } else {
            Err(bad(self.s))
        }
    }

    fn identifier(&mut self) -> Result<&str, ParseError> {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if matches!(c, b';' | b'<' | b'>' | b'.' | b':') {
                break;
            }
            self.pos += 1;
        }
        if self.pos == start {
            return Err(bad(self.s));
        }
        Ok(&self.s[start..self.pos])
    }

    fn parse(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        if self.peek() == Some(b'<') {
            self.type_parameters(out)?;
        }
        if self.peek() == Some(b'(') {
            self.pos += 1;
            while self.peek() != Some(b')') {
                self.java_type(out)?;
            }
            self.pos += 1;
            if self.peek() == Some(b'V') {
                self.pos += 1;
            } else {
                self.java_type(out)?;
            }
            while self.peek() == Some(b'^') {
                self.pos += 1;
                self.reference_type(out)?;
            }
        } else {
            // Class signature (superclass + interfaces) or a single field type.
            while self.peek().is_some() {
                self.java_type(out)?;
            }
        }
        if self.pos != self.s.len() {
            return Err(bad(self.s));
        }
        Ok(())
    }

    fn type_parameters(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        self.expect(b'<')?;
        while self.peek() != Some(b'>') {
            self.identifier()?;
            self.expect(b':')?;
            // Class bound may be empty (`T::Ljava/lang/Comparable;`).
            if !matches!(self.peek(), Some(b':') | Some(b'>')) {
                self.reference_type(out)?;
            }
            while self.peek() == Some(b':') {
                self.pos += 1;
                self.reference_type(out)?;
            }
        }
        self.pos += 1;
        Ok(())
    }

    fn java_type(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if base_type(c).is_some() => {
                self.pos += 1;
                Ok(())
            }
            _ => self.reference_type(out),
        }
    }

    fn reference_type(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        match self.next()? {
            b'L' => self.class_type(out),
            b'T' => {
                self.identifier()?;
                self.expect(b';')
            }
            b'[' => self.java_type(out),
            _ => Err(bad(self.s)),
        }
    }

    fn class_type(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        let mut name = self.identifier()?.to_string();
        loop {
            if self.peek() == Some(b'<') {
                self.type_arguments(out)?;
            }
            match self.next()? {
                b';' => break,
                b'.' => {
                    name.push('$');
                    name.push_str(self.identifier()?);
                }
                _ => return Err(bad(self.s)),
            }
        }
        out.push(name);
        Ok(())
    }

    fn type_arguments(&mut self, out: &mut Vec<String>) -> Result<(), ParseError> {
        self.expect(b'<')?;
        loop {
            match self.peek() {
                Some(b'>') => {
                    self.pos += 1;
                    return Ok(());
                }
                Some(b'*') => self.pos += 1,
                Some(b'+') | Some(b'-') => {
                    self.pos += 1;
                    self.reference_type(out)?;
                }
                Some(_) => self.reference_type(out)?,
                None => return Err(bad(self.s)),
            }
        }
    }
}
