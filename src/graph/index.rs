//! Symbol ownership across a resolved classpath.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

use super::types::{Artifact, ArtifactIdentity, ResolvedArtifact};
use crate::error::{DepsightError, Result};
use crate::symbol::Symbol;

/// A non-fatal problem found while indexing.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IndexWarning {
    /// Two artifacts define the same type. `owner` came first in input
    /// order and keeps the symbol.
    AmbiguousOwnership {
        symbol: Symbol,
        owner: String,
        claimant: String,
    },
}

impl fmt::Display for IndexWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IndexWarning::AmbiguousOwnership {
                symbol,
                owner,
                claimant,
            } => write!(
                f,
                "{} is defined by both {} and {}; attributing it to {}",
                symbol, owner, claimant, owner
            ),
        }
    }
}

/// Maps each resolved artifact to the symbols it owns.
///
/// Artifacts keep their input order. A symbol defined by several artifacts
/// belongs to the first one only.
#[derive(Debug, Clone, Default)]
pub struct ArtifactSymbolIndex {
    artifacts: Vec<Artifact>,
    owners: HashMap<Symbol, usize>,
    warnings: Vec<IndexWarning>,
}

impl ArtifactSymbolIndex {
    /// Merge per-artifact definitions, in order. Fails if an identity
    /// appears twice.
    pub fn from_definitions(
        definitions: Vec<(ResolvedArtifact, BTreeSet<Symbol>)>,
    ) -> Result<Self> {
        let mut seen = HashSet::new();
        let mut index = Self::default();

        for (resolved, defined) in definitions {
            if !seen.insert(resolved.identity.clone()) {
                return Err(DepsightError::DuplicateArtifact(resolved.identity.canonical()));
            }
            let slot = index.artifacts.len();
            let mut owned = BTreeSet::new();
            for symbol in defined {
                match index.owners.get(&symbol) {
                    Some(&owner) => index.warnings.push(IndexWarning::AmbiguousOwnership {
                        symbol,
                        owner: index.artifacts[owner].identity.canonical(),
                        claimant: resolved.identity.canonical(),
                    }),
                    None => {
                        index.owners.insert(symbol.clone(), slot);
                        owned.insert(symbol);
                    }
                }
            }
            index.artifacts.push(Artifact {
                identity: resolved.identity,
                declaration: resolved.declaration,
                parents: resolved.parents,
                symbols: owned,
            });
        }

        Ok(index)
    }

    /// Artifacts in input order.
    pub fn artifacts(&self) -> &[Artifact] {
        &self.artifacts
    }

    pub fn get(&self, identity: &ArtifactIdentity) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| &a.identity == identity)
    }

    pub fn owner_of(&self, symbol: &Symbol) -> Option<&Artifact> {
        self.owners.get(symbol).map(|&slot| &self.artifacts[slot])
    }

    pub fn warnings(&self) -> &[IndexWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.artifacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.artifacts.is_empty()
    }

    /// Total symbols owned across all artifacts.
    pub fn symbol_count(&self) -> usize {
        self.owners.len()
    }
}
