//! Error types for depsight.
//!
//! Parsing failures are always fatal for the module being analyzed and are
//! kept distinct from "nothing found" results, so a caller can never mistake
//! a failed analysis for a clean one.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Low-level decoding failures inside a class file or archive.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("unexpected end of data at offset {offset} (wanted {wanted} bytes)")]
    Truncated { offset: usize, wanted: usize },

    #[error("bad magic number {found:#010x}")]
    BadMagic { found: u32 },

    #[error("invalid constant pool index {index}")]
    BadConstantIndex { index: u16 },

    #[error("unknown constant pool tag {tag} at index {index}")]
    UnknownConstantTag { tag: u8, index: u16 },

    #[error("constant {index} is not a {expected}")]
    WrongConstantKind { index: u16, expected: &'static str },

    #[error("malformed descriptor `{0}`")]
    BadDescriptor(String),

    #[error("not a zip archive: {0}")]
    NotAnArchive(String),

    #[error("unsupported archive feature: {0}")]
    Unsupported(String),

    #[error("limit exceeded: {0}")]
    LimitExceeded(String),

    #[error("corrupt archive entry `{entry}`: {reason}")]
    CorruptEntry { entry: String, reason: String },
}

/// Errors surfaced by the analysis engine.
#[derive(Debug, Error)]
pub enum DepsightError {
    /// A backing file could not be parsed in its expected format.
    #[error("malformed artifact {}{}: {source}", path.display(), entry.as_deref().map(|e| format!(" (entry {})", e)).unwrap_or_default())]
    MalformedArtifact {
        path: PathBuf,
        entry: Option<String>,
        #[source]
        source: ParseError,
    },

    #[error("I/O error on {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The same artifact identity was supplied twice in one dependency view.
    #[error("duplicate artifact identity `{0}`")]
    DuplicateArtifact(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("invalid module manifest: {0}")]
    Manifest(String),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl DepsightError {
    pub fn malformed(path: impl Into<PathBuf>, entry: Option<String>, source: ParseError) -> Self {
        DepsightError::MalformedArtifact {
            path: path.into(),
            entry,
            source,
        }
    }

    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        DepsightError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures caused by an unparseable input artifact.
    pub fn is_malformed(&self) -> bool {
        matches!(self, DepsightError::MalformedArtifact { .. })
    }
}

pub type Result<T> = std::result::Result<T, DepsightError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_message_includes_entry() {
        let err = DepsightError::malformed(
            "libs/a.jar",
            Some("com/a/Foo.class".to_string()),
            ParseError::BadMagic { found: 0xdeadbeef },
        );
        let msg = err.to_string();
        assert!(msg.contains("libs/a.jar"));
        assert!(msg.contains("com/a/Foo.class"));
        assert!(msg.contains("0xdeadbeef"));
        assert!(err.is_malformed());
    }

    #[test]
    fn test_malformed_message_without_entry() {
        let err = DepsightError::malformed(
            "out/Foo.class",
            None,
            ParseError::Truncated { offset: 4, wanted: 2 },
        );
        assert!(!err.to_string().contains("entry"));
    }
}
