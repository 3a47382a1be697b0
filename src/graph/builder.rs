//! Index builder: reads every resolved artifact and collects the types it
//! defines.
//!
//! Artifacts are parsed in parallel; the results are merged back in input
//! order so ownership is deterministic.

use rayon::prelude::*;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::{debug, info, warn};

use super::index::ArtifactSymbolIndex;
use super::types::ResolvedArtifact;
use crate::config::Limits;
use crate::error::Result;
use crate::parser;
use crate::symbol::Symbol;

/// Build the symbol index for a classpath view.
pub fn build_index(artifacts: &[ResolvedArtifact], limits: &Limits) -> Result<ArtifactSymbolIndex> {
    let definitions: Vec<(ResolvedArtifact, BTreeSet<Symbol>)> = artifacts
        .par_iter()
        .map(|artifact| {
            let defined = defined_symbols(&artifact.file, limits)?;
            debug!(
                artifact = %artifact.identity,
                symbol_count = defined.len(),
                "indexed artifact"
            );
            Ok((artifact.clone(), defined))
        })
        .collect::<Result<_>>()?;

    let index = ArtifactSymbolIndex::from_definitions(definitions)?;
    for warning in index.warnings() {
        warn!(%warning, "ambiguous symbol ownership");
    }
    info!(
        artifact_count = index.len(),
        symbol_count = index.symbol_count(),
        warning_count = index.warnings().len(),
        "built artifact symbol index"
    );
    Ok(index)
}

/// Types defined by the compiled units at `path`, excluding synthetic
/// markers and metadata units.
pub fn defined_symbols(path: &Path, limits: &Limits) -> Result<BTreeSet<Symbol>> {
    let mut defined = BTreeSet::new();
    parser::for_each_class(path, limits, |_, class| {
        if class.defines_type() {
            let symbol = Symbol::from_internal(&class.this_class);
            if !symbol.is_synthetic_marker() {
                defined.insert(symbol);
            }
        }
        Ok(())
    })?;
    Ok(defined)
}
