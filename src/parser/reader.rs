//! Bounds-checked byte readers.
//!
//! Class files are big-endian and read sequentially; ZIP structures are
//! little-endian and read at absolute offsets.

use crate::error::ParseError;

/// Sequential big-endian reader over a byte slice.
#[derive(Debug, Clone)]
pub struct Reader<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.pos
    }

    pub fn is_empty(&self) -> bool {
        self.remaining() == 0
    }

    pub fn bytes(&mut self, len: usize) -> Result<&'a [u8], ParseError> {
        let end = self
            .pos
            .checked_add(len)
            .filter(|&end| end <= self.data.len())
            .ok_or(ParseError::Truncated {
                offset: self.pos,
                wanted: len,
            })?;
        let slice = &self.data[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    pub fn skip(&mut self, len: usize) -> Result<(), ParseError> {
        self.bytes(len).map(|_| ())
    }

    pub fn u1(&mut self) -> Result<u8, ParseError> {
        Ok(self.bytes(1)?[0])
    }

    pub fn u2(&mut self) -> Result<u16, ParseError> {
        let b = self.bytes(2)?;
        Ok(u16::from_be_bytes([b[0], b[1]]))
    }

    pub fn u4(&mut self) -> Result<u32, ParseError> {
        let b = self.bytes(4)?;
        Ok(u32::from_be_bytes([b[0], b[1], b[2], b[3]]))
    }

    /// Read a `u4` length followed by that many bytes.
    pub fn u4_prefixed(&mut self) -> Result<&'a [u8], ParseError> {
        let len = self.u4()? as usize;
        self.bytes(len)
    }
}

fn le_slice(data: &[u8], offset: usize, len: usize) -> Result<&[u8], ParseError> {
    offset
        .checked_add(len)
        .filter(|&end| end <= data.len())
        .map(|end| &data[offset..end])
        .ok_or(ParseError::Truncated {
            offset,
            wanted: len,
        })
}

pub fn le_u16(data: &[u8], offset: usize) -> Result<u16, ParseError> {
    let b = le_slice(data, offset, 2)?;
    Ok(u16::from_le_bytes([b[0], b[1]]))
}

pub fn le_u32(data: &[u8], offset: usize) -> Result<u32, ParseError> {
    let b = le_slice(data, offset, 4)?;
    Ok(u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
}

pub fn slice_at(data: &[u8], offset: usize, len: usize) -> Result<&[u8], ParseError> {
    le_slice(data, offset, len)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequential_reads() {
        let data = [0xCA, 0xFE, 0xBA, 0xBE, 0x00, 0x34, 0x07];
        let mut r = Reader::new(&data);
        assert_eq!(r.u4().unwrap(), 0xCAFEBABE);
        assert_eq!(r.u2().unwrap(), 0x34);
        assert_eq!(r.u1().unwrap(), 7);
        assert!(r.is_empty());
    }

    #[test]
    fn test_truncated_read_reports_offset() {
        let data = [0x00, 0x01, 0x02];
        let mut r = Reader::new(&data);
        r.u2().unwrap();
        assert_eq!(
            r.u2().unwrap_err(),
            ParseError::Truncated {
                offset: 2,
                wanted: 2
            }
        );
    }

    #[test]
    fn test_huge_length_does_not_overflow() {
        let data = [0xFF, 0xFF, 0xFF, 0xFF];
        let mut r = Reader::new(&data);
        assert!(r.u4_prefixed().is_err());
    }

    #[test]
    fn test_little_endian_helpers() {
        let data = [0x50, 0x4b, 0x05, 0x06];
        assert_eq!(le_u32(&data, 0).unwrap(), 0x06054b50);
        assert_eq!(le_u16(&data, 2).unwrap(), 0x0605);
        assert!(le_u16(&data, 3).is_err());
        assert!(le_u32(&data, usize::MAX).is_err());
    }
}
