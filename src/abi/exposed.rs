//! Dependencies whose types appear in the public surface. Consumers of the
//! module need these on their compile classpath.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::surface::AbiSurface;
use crate::graph::ArtifactSymbolIndex;
use crate::symbol::Symbol;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExposedDependency {
    pub identity: String,
    /// Exposed symbols it provides, sorted.
    pub symbols: Vec<Symbol>,
}

/// Sorted by canonical identity.
pub fn exposed_dependencies(
    surface: &AbiSurface,
    index: &ArtifactSymbolIndex,
) -> Vec<ExposedDependency> {
    let mut by_owner: BTreeMap<String, Vec<Symbol>> = BTreeMap::new();
    for symbol in surface.exposed_types() {
        if let Some(owner) = index.owner_of(&symbol) {
            by_owner
                .entry(owner.identity.canonical())
                .or_default()
                .push(symbol);
        }
    }
    by_owner
        .into_iter()
        .map(|(identity, symbols)| ExposedDependency { identity, symbols })
        .collect()
}
