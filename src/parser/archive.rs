//! Minimal ZIP reader for jar archives.
//!
//! Entries are located through the central directory and inflated with
//! `flate2`. Only stored and deflated entries are supported; ZIP64 and
//! encrypted archives are rejected as malformed. Every size is checked
//! against [`Limits`] before anything is allocated.

use std::io::Read;

use flate2::read::DeflateDecoder;
use flate2::Crc;

use super::reader::{le_u16, le_u32, slice_at};
use crate::config::Limits;
use crate::error::ParseError;

const EOCD_SIGNATURE: u32 = 0x0605_4b50;
const CENTRAL_SIGNATURE: u32 = 0x0201_4b50;
const LOCAL_SIGNATURE: u32 = 0x0403_4b50;
const EOCD_LEN: usize = 22;
const CENTRAL_LEN: usize = 46;
const LOCAL_LEN: usize = 30;
const MAX_COMMENT_LEN: usize = 0xFFFF;

const METHOD_STORED: u16 = 0;
const METHOD_DEFLATED: u16 = 8;
const FLAG_ENCRYPTED: u16 = 0x0001;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZipEntry {
    pub name: String,
    method: u16,
    flags: u16,
    crc32: u32,
    compressed_size: u64,
    pub uncompressed_size: u64,
    local_header_offset: usize,
}

impl ZipEntry {
    pub fn is_dir(&self) -> bool {
        self.name.ends_with('/')
    }
}

#[derive(Debug)]
pub struct Archive {
    data: Vec<u8>,
    entries: Vec<ZipEntry>,
}

impl Archive {
    pub fn parse(data: Vec<u8>, limits: &Limits) -> Result<Self, ParseError> {
        if data.len() as u64 > limits.max_archive_bytes {
            return Err(ParseError::LimitExceeded(format!(
                "archive is {} bytes (max {})",
                data.len(),
                limits.max_archive_bytes
            )));
        }

        let eocd = find_eocd(&data)?;
        let total = le_u16(&data, eocd + 10)?;
        let cd_size = le_u32(&data, eocd + 12)?;
        let cd_offset = le_u32(&data, eocd + 16)?;
        if total == 0xFFFF || cd_size == u32::MAX || cd_offset == u32::MAX {
            return Err(ParseError::Unsupported("zip64 archive".to_string()));
        }
        if total as usize > limits.max_archive_entries {
            return Err(ParseError::LimitExceeded(format!(
                "archive declares {} entries (max {})",
                total, limits.max_archive_entries
            )));
        }
        let cd_end = (cd_offset as usize)
            .checked_add(cd_size as usize)
            .filter(|&end| end <= eocd)
            .ok_or_else(|| ParseError::NotAnArchive("central directory out of bounds".to_string()))?;

        let mut entries = Vec::with_capacity(total as usize);
        let mut pos = cd_offset as usize;
        for _ in 0..total {
            if pos + CENTRAL_LEN > cd_end || le_u32(&data, pos)? != CENTRAL_SIGNATURE {
                return Err(ParseError::NotAnArchive(format!(
                    "bad central directory record at {}",
                    pos
                )));
            }
            let flags = le_u16(&data, pos + 8)?;
            let method = le_u16(&data, pos + 10)?;
            let crc32 = le_u32(&data, pos + 16)?;
            let compressed = le_u32(&data, pos + 20)?;
            let uncompressed = le_u32(&data, pos + 24)?;
            let name_len = le_u16(&data, pos + 28)? as usize;
            let extra_len = le_u16(&data, pos + 30)? as usize;
            let comment_len = le_u16(&data, pos + 32)? as usize;
            let local_offset = le_u32(&data, pos + 42)?;
            if compressed == u32::MAX || uncompressed == u32::MAX || local_offset == u32::MAX {
                return Err(ParseError::Unsupported("zip64 entry".to_string()));
            }
            let name_bytes = slice_at(&data, pos + CENTRAL_LEN, name_len)?;
            entries.push(ZipEntry {
                name: String::from_utf8_lossy(name_bytes).into_owned(),
                method,
                flags,
                crc32,
                compressed_size: compressed as u64,
                uncompressed_size: uncompressed as u64,
                local_header_offset: local_offset as usize,
            });
            pos += CENTRAL_LEN + name_len + extra_len + comment_len;
        }

        Ok(Self { data, entries })
    }

    pub fn entries(&self) -> &[ZipEntry] {
        &self.entries
    }

    pub fn read(&self, entry: &ZipEntry, limits: &Limits) -> Result<Vec<u8>, ParseError> {
        let corrupt = |reason: String| ParseError::CorruptEntry {
            entry: entry.name.clone(),
            reason,
        };

        if entry.flags & FLAG_ENCRYPTED != 0 {
            return Err(ParseError::Unsupported(format!("encrypted entry {}", entry.name)));
        }
        if entry.uncompressed_size > limits.max_entry_bytes {
            return Err(ParseError::LimitExceeded(format!(
                "entry {} is {} bytes (max {})",
                entry.name, entry.uncompressed_size, limits.max_entry_bytes
            )));
        }

        let header = entry.local_header_offset;
        if le_u32(&self.data, header)? != LOCAL_SIGNATURE {
            return Err(corrupt("bad local header signature".to_string()));
        }
        let name_len = le_u16(&self.data, header + 26)? as usize;
        let extra_len = le_u16(&self.data, header + 28)? as usize;
        let start = header + LOCAL_LEN + name_len + extra_len;
        let raw = slice_at(&self.data, start, entry.compressed_size as usize)?;

        let expected = entry.uncompressed_size as usize;
        let bytes = match entry.method {
            METHOD_STORED => {
                if raw.len() != expected {
                    return Err(corrupt("stored size mismatch".to_string()));
                }
                raw.to_vec()
            }
            METHOD_DEFLATED => {
                let mut out = Vec::with_capacity(expected);
                DeflateDecoder::new(raw)
                    .take(expected as u64 + 1)
                    .read_to_end(&mut out)
                    .map_err(|e| corrupt(e.to_string()))?;
                if out.len() != expected {
                    return Err(corrupt(format!(
                        "inflated {} bytes, expected {}",
                        out.len(),
                        expected
                    )));
                }
                out
            }
            other => {
                return Err(ParseError::Unsupported(format!(
                    "compression method {} in {}",
                    other, entry.name
                )))
            }
        };

        let mut crc = Crc::new();
        crc.update(&bytes);
        if crc.sum() != entry.crc32 {
            return Err(corrupt("crc mismatch".to_string()));
        }
        Ok(bytes)
    }
}

fn find_eocd(data: &[u8]) -> Result<usize, ParseError> {
    if data.len() < EOCD_LEN {
        return Err(ParseError::NotAnArchive("too short".to_string()));
    }
    let last = data.len() - EOCD_LEN;
    let first = last.saturating_sub(MAX_COMMENT_LEN);
    (first..=last)
        .rev()
        .find(|&pos| le_u32(data, pos).ok() == Some(EOCD_SIGNATURE))
        .ok_or_else(|| ParseError::NotAnArchive("no end of central directory record".to_string()))
}
