//! Text scanning of resources and generated stubs for class names.
//!
//! Bytecode is exact; text is evidence. Anything found here is unioned into
//! the used-symbol set with the same standing as bytecode references, so the
//! scanners lean towards matching too much rather than too little.

pub mod pattern;
pub mod stubs;

pub use pattern::PatternScanner;
pub use stubs::JavaStubScanner;

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;

use crate::config::Limits;
use crate::error::{DepsightError, ParseError, Result};
use crate::parser;
use crate::symbol::Symbol;

/// Extracts candidate class names from a text file.
pub trait TextSymbolScanner: Send + Sync {
    fn name(&self) -> &'static str;

    fn scan(&self, text: &str, out: &mut BTreeSet<Symbol>);
}

/// Scan every file under `roots` with one of `extensions`. Missing roots are
/// skipped; unreadable files are an error. Files are scanned in parallel.
pub fn scan_dirs(
    roots: &[PathBuf],
    extensions: &[String],
    scanner: &dyn TextSymbolScanner,
    limits: &Limits,
) -> Result<BTreeSet<Symbol>> {
    let extensions: Vec<&str> = extensions.iter().map(String::as_str).collect();
    let mut files = Vec::new();
    for root in roots {
        if !root.exists() {
            debug!(root = %root.display(), "text root missing, skipping");
            continue;
        }
        files.extend(parser::files_with_extensions(root, &extensions)?);
    }
    debug!(
        scanner = scanner.name(),
        file_count = files.len(),
        "scanning text files"
    );

    let per_file: Vec<BTreeSet<Symbol>> = files
        .par_iter()
        .map(|file| scan_file(file, scanner, limits))
        .collect::<Result<_>>()?;

    Ok(per_file.into_iter().flatten().collect())
}

fn scan_file(
    file: &Path,
    scanner: &dyn TextSymbolScanner,
    limits: &Limits,
) -> Result<BTreeSet<Symbol>> {
    let len = fs::metadata(file)
        .map_err(|e| DepsightError::io(file, e))?
        .len();
    if len > limits.max_entry_bytes {
        return Err(DepsightError::malformed(
            file,
            None,
            ParseError::LimitExceeded(format!(
                "text file is {} bytes (max {})",
                len, limits.max_entry_bytes
            )),
        ));
    }
    let bytes = fs::read(file).map_err(|e| DepsightError::io(file, e))?;
    let mut found = BTreeSet::new();
    scanner.scan(&String::from_utf8_lossy(&bytes), &mut found);
    Ok(found)
}
