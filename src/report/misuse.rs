//! Dependency misuse: declared dependencies that are never used, and
//! transitive ones the module relies on without declaring.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::MisuseConfig;
use crate::error::Result;
use crate::graph::{ArtifactSymbolIndex, Declaration, DependencyGraph};
use crate::symbol::Symbol;
use crate::usage::UsedSymbolSet;

/// A transitive dependency whose symbols the module uses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitiveUsage {
    pub identity: String,
    /// The used symbols it provides, sorted.
    pub symbols: Vec<Symbol>,
    /// Direct dependencies it is reachable through. Empty when the build
    /// supplied no parent metadata.
    #[serde(default)]
    pub via: Vec<String>,
    /// Shortest chain from a direct dependency down to this one, both ends
    /// included.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub path: Vec<String>,
}

/// Result of comparing declarations with actual usage. `unused_direct` and
/// `used_transitive` never share an identity; every list is sorted by
/// canonical identity.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MisuseReport {
    pub unused_direct: Vec<String>,
    pub used_transitive: Vec<TransitiveUsage>,
    /// Direct dependencies that own no symbols, so their use can't be
    /// observed from bytecode. Either they define no classes, or every
    /// class they define is owned by an artifact indexed before them.
    /// Never reported as unused.
    #[serde(default)]
    pub unobservable: Vec<String>,
    /// Unused direct dependencies suppressed by `misuse.allow_unused`.
    #[serde(default)]
    pub allowed_unused: Vec<String>,
}

impl MisuseReport {
    /// No unused direct and no used transitive dependencies.
    pub fn is_clean(&self) -> bool {
        self.unused_direct.is_empty() && self.used_transitive.is_empty()
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Classify every artifact of `index` against `used`.
pub fn analyze_misuse(
    index: &ArtifactSymbolIndex,
    used: &UsedSymbolSet,
    graph: &DependencyGraph,
    config: &MisuseConfig,
) -> MisuseReport {
    let mut report = MisuseReport::default();

    for artifact in index.artifacts() {
        let canonical = artifact.identity.canonical();
        let used_symbols = used.used_from(&artifact.symbols);

        match artifact.declaration {
            Declaration::Direct if artifact.symbols.is_empty() => {
                if !config.allows_unused(&canonical) {
                    report.unobservable.push(canonical);
                }
            }
            Declaration::Direct if used_symbols.is_empty() => {
                if config.allows_unused(&canonical) {
                    report.allowed_unused.push(canonical);
                } else {
                    report.unused_direct.push(canonical);
                }
            }
            Declaration::Direct => {}
            Declaration::Transitive if !used_symbols.is_empty() => {
                let via = graph
                    .via(&artifact.identity)
                    .iter()
                    .map(|id| id.canonical())
                    .collect();
                let path = graph
                    .path_to(&artifact.identity)
                    .map(|chain| chain.iter().map(|id| id.canonical()).collect())
                    .unwrap_or_default();
                report.used_transitive.push(TransitiveUsage {
                    identity: canonical,
                    symbols: used_symbols,
                    via,
                    path,
                });
            }
            Declaration::Transitive => {}
        }
    }

    report.unused_direct.sort();
    report.unobservable.sort();
    report.allowed_unused.sort();
    report
        .used_transitive
        .sort_by(|a, b| a.identity.cmp(&b.identity));

    debug!(
        unused_direct = report.unused_direct.len(),
        used_transitive = report.used_transitive.len(),
        unobservable = report.unobservable.len(),
        "computed misuse"
    );
    report
}
