//! # depsight
//!
//! Dependency usage and ABI analysis for JVM build modules.
//!
//! depsight reads a module's compiled class files and compares what they
//! actually reference with what the build declares:
//!
//! - **Unused direct dependencies**: declared, but no class from them is used
//! - **Used transitive dependencies**: used, but only available through
//!   another dependency
//! - **ABI fingerprint**: a stable hash of the public binary interface, so
//!   consumers only recompile when it really changed
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use depsight::{analyze_module, DepsightConfig, ModuleInputs, ModuleOutcome};
//! use std::path::Path;
//!
//! let inputs = ModuleInputs::load(Path::new("build/depsight/app-debug.json"))?;
//! let config = DepsightConfig::load(Path::new(".depsight/config.toml"));
//!
//! if let ModuleOutcome::Analyzed(report) = analyze_module(&inputs, &config)? {
//!     print!("{}", report.render_misuse());
//! }
//! # Ok::<(), depsight::DepsightError>(())
//! ```

pub mod abi;
pub mod aggregate;
pub mod cli;
pub mod config;
pub mod error;
pub mod graph;
pub mod parser;
pub mod pipeline;
pub mod report;
pub mod scan;
pub mod symbol;
pub mod usage;

#[cfg(test)]
mod testkit;

// Re-exports for convenience
pub use error::{DepsightError, ParseError, Result};

pub use abi::{analyze_abi, AbiReport, AbiSurface};
pub use aggregate::{aggregate, RootReports};
pub use config::DepsightConfig;
pub use graph::{
    build_index, ArtifactIdentity, ArtifactSymbolIndex, Declaration, DependencyGraph,
    IndexWarning, ResolvedArtifact,
};
pub use pipeline::{analyze_module, ModuleFlavor, ModuleInputs, ModuleOutcome, ModuleReport};
pub use report::{analyze_misuse, ArtifactsReport, MisuseReport, TransitiveUsage};
pub use symbol::Symbol;
pub use usage::{extract_used_symbols, UsageSources, UsedSymbolSet};
