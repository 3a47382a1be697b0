//! Analysis configuration, loaded from `.depsight/config.toml`.
//!
//! Every field has a default, so an empty or missing file is valid.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DepsightError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DepsightConfig {
    pub scan: ScanConfig,
    pub limits: Limits,
    pub misuse: MisuseConfig,
    pub abi: AbiConfig,
}

impl DepsightConfig {
    /// Load config from a TOML file. Falls back to defaults when the file is
    /// missing or cannot be parsed.
    pub fn load(path: &Path) -> Self {
        if !path.exists() {
            debug!(path = %path.display(), "no config file, using defaults");
            return Self::default();
        }
        match fs::read_to_string(path) {
            Ok(text) => match Self::from_toml_str(&text) {
                Ok(config) => config,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config, using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                warn!(path = %path.display(), error = %e, "unreadable config, using defaults");
                Self::default()
            }
        }
    }

    /// Strict parse, for callers that want config errors to be fatal.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DepsightError::Config(e.to_string()))
    }
}

/// Which files the text scanners look at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    /// Extensions of resource files scanned for class names (layout XML).
    pub resource_extensions: Vec<String>,
    /// Extensions of generated stub sources.
    pub stub_extensions: Vec<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            resource_extensions: vec!["xml".to_string()],
            stub_extensions: vec!["java".to_string()],
        }
    }
}

/// Caps that turn pathological inputs into a malformed-artifact failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Limits {
    /// Largest archive read into memory.
    pub max_archive_bytes: u64,
    /// Most entries an archive may declare.
    pub max_archive_entries: usize,
    /// Largest uncompressed size of a single entry or loose class file.
    pub max_entry_bytes: u64,
}

/// 512 MiB.
pub const DEFAULT_MAX_ARCHIVE_BYTES: u64 = 512 * 1024 * 1024;
pub const DEFAULT_MAX_ARCHIVE_ENTRIES: usize = 200_000;
/// 64 MiB.
pub const DEFAULT_MAX_ENTRY_BYTES: u64 = 64 * 1024 * 1024;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_archive_bytes: DEFAULT_MAX_ARCHIVE_BYTES,
            max_archive_entries: DEFAULT_MAX_ARCHIVE_ENTRIES,
            max_entry_bytes: DEFAULT_MAX_ENTRY_BYTES,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MisuseConfig {
    /// Identity patterns never reported as unused. A trailing `*` matches any
    /// suffix of the canonical identity (`com.google.auto.value:*`).
    pub allow_unused: Vec<String>,
}

impl MisuseConfig {
    pub fn allows_unused(&self, canonical: &str) -> bool {
        self.allow_unused.iter().any(|pattern| match pattern.strip_suffix('*') {
            Some(prefix) => canonical.starts_with(prefix),
            None => canonical == pattern,
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AbiConfig {
    /// Package prefixes whose types are never part of the ABI
    /// (`com.example.internal`).
    pub exclude_packages: Vec<String>,
}

impl AbiConfig {
    pub fn excludes(&self, type_name: &str) -> bool {
        let package = type_name.rsplit_once('.').map(|(p, _)| p).unwrap_or("");
        self.exclude_packages.iter().any(|prefix| {
            package == prefix
                || package
                    .strip_prefix(prefix.as_str())
                    .is_some_and(|rest| rest.starts_with('.'))
        })
    }
}
