//! Used-symbol extraction: which external types a module's compiled output,
//! generated stubs, and resources refer to.

use std::collections::BTreeSet;
use std::path::PathBuf;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::DepsightConfig;
use crate::error::Result;
use crate::parser;
use crate::scan::{self, JavaStubScanner, PatternScanner};
use crate::symbol::Symbol;

/// The externally-defined symbols a module references. Sorted, duplicate
/// free, and never containing a type the module defines itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UsedSymbolSet {
    symbols: BTreeSet<Symbol>,
}

impl UsedSymbolSet {
    pub fn contains(&self, symbol: &str) -> bool {
        self.symbols.contains(symbol)
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Symbol> {
        self.symbols.iter()
    }

    /// Symbols of `defined` that are used, in sorted order.
    pub fn used_from<'a>(&'a self, defined: &'a BTreeSet<Symbol>) -> Vec<Symbol> {
        // Walk the smaller side.
        if defined.len() <= self.symbols.len() {
            defined
                .iter()
                .filter(|s| self.symbols.contains(*s))
                .cloned()
                .collect()
        } else {
            self.symbols
                .iter()
                .filter(|s| defined.contains(*s))
                .cloned()
                .collect()
        }
    }
}

impl FromIterator<Symbol> for UsedSymbolSet {
    fn from_iter<I: IntoIterator<Item = Symbol>>(iter: I) -> Self {
        Self {
            symbols: iter.into_iter().collect(),
        }
    }
}

/// Where a module's usage evidence lives.
#[derive(Debug, Clone, Default)]
pub struct UsageSources {
    pub compiled_outputs: Vec<PathBuf>,
    pub stub_dirs: Vec<PathBuf>,
    pub resource_dirs: Vec<PathBuf>,
}

/// Types defined and referenced by one compiled-output location.
#[derive(Debug, Default)]
struct OutputFacts {
    defined: BTreeSet<String>,
    referenced: BTreeSet<String>,
}

/// Build the used-symbol set for a module.
///
/// Every compiled output must exist and parse; a malformed unit fails the
/// whole extraction rather than yielding a partial set. Stub and resource
/// roots that don't exist are skipped.
pub fn extract_used_symbols(
    sources: &UsageSources,
    config: &DepsightConfig,
) -> Result<UsedSymbolSet> {
    let limits = config.limits;

    let facts: Vec<OutputFacts> = sources
        .compiled_outputs
        .par_iter()
        .map(|output| {
            let mut facts = OutputFacts::default();
            parser::for_each_class(output, &limits, |_, class| {
                facts.referenced.extend(class.referenced_types()?);
                if class.defines_type() {
                    facts.defined.insert(class.this_class);
                }
                Ok(())
            })?;
            Ok(facts)
        })
        .collect::<Result<_>>()?;

    let mut defined = BTreeSet::new();
    let mut referenced = BTreeSet::new();
    for output in facts {
        defined.extend(output.defined);
        referenced.extend(output.referenced);
    }
    let own: BTreeSet<Symbol> = defined.iter().map(|n| Symbol::from_internal(n)).collect();

    let mut found: BTreeSet<Symbol> = referenced
        .iter()
        .map(|n| Symbol::from_internal(n))
        .collect();
    let bytecode_count = found.len();

    found.extend(scan::scan_dirs(
        &sources.stub_dirs,
        &config.scan.stub_extensions,
        &JavaStubScanner::new(),
        &limits,
    )?);
    found.extend(scan::scan_dirs(
        &sources.resource_dirs,
        &config.scan.resource_extensions,
        &PatternScanner,
        &limits,
    )?);
    debug!(
        bytecode = bytecode_count,
        text = found.len() - bytecode_count,
        "collected candidate symbols"
    );

    let used: UsedSymbolSet = found
        .into_iter()
        .filter(|s| !s.is_synthetic_marker() && !own.contains(s))
        .collect();
    info!(
        defined = own.len(),
        used = used.len(),
        "extracted used symbols"
    );
    Ok(used)
}
