//! Dependency graph module: resolved artifacts, the symbols they own, and
//! how they were pulled in.

pub mod builder;
pub mod engine;
pub mod index;
pub mod types;

pub use builder::{build_index, defined_symbols};
pub use engine::DependencyGraph;
pub use index::{ArtifactSymbolIndex, IndexWarning};
pub use types::{Artifact, ArtifactIdentity, ArtifactKind, Declaration, ResolvedArtifact};
