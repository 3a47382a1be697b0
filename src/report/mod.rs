//! Reports derived from the symbol index and the used-symbol set.

pub mod declared;
pub mod misuse;
pub mod render;

pub use declared::{ArtifactEntry, ArtifactsReport};
pub use misuse::{analyze_misuse, MisuseReport, TransitiveUsage};
pub use render::render_misuse;
