//! The artifacts report: every resolved artifact with its declaration and
//! the symbols it provides.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::graph::{ArtifactKind, ArtifactSymbolIndex, Declaration, IndexWarning};
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactEntry {
    /// Canonical identity string.
    pub identity: String,
    pub kind: ArtifactKind,
    pub declaration: Declaration,
    pub symbols: Vec<Symbol>,
}

/// Deterministic view of an [`ArtifactSymbolIndex`]. Entries are sorted by
/// canonical identity and symbols are sorted within each entry, so the JSON
/// forms are byte-identical for identical inputs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArtifactsReport {
    pub artifacts: Vec<ArtifactEntry>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<IndexWarning>,
}

impl ArtifactsReport {
    pub fn from_index(index: &ArtifactSymbolIndex) -> Self {
        let mut artifacts: Vec<ArtifactEntry> = index
            .artifacts()
            .iter()
            .map(|artifact| ArtifactEntry {
                identity: artifact.identity.canonical(),
                kind: artifact.identity.kind(),
                declaration: artifact.declaration,
                symbols: artifact.symbols.iter().cloned().collect(),
            })
            .collect();
        artifacts.sort_by(|a, b| a.identity.cmp(&b.identity));

        let mut warnings = index.warnings().to_vec();
        warnings.sort();

        Self {
            artifacts,
            warnings,
        }
    }

    pub fn get(&self, identity: &str) -> Option<&ArtifactEntry> {
        self.artifacts
            .binary_search_by(|entry| entry.identity.as_str().cmp(identity))
            .ok()
            .map(|i| &self.artifacts[i])
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
