//! ABI extraction: the visible type and member surface of a module, its
//! textual dump, and a fingerprint for change detection.

pub mod dump;
pub mod exposed;
pub mod surface;

pub use dump::{fingerprint, full_dump, reduce};
pub use exposed::{exposed_dependencies, ExposedDependency};
pub use surface::{extract_surface, AbiMember, AbiSurface, AbiType, MemberKind, TypeKind};

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tracing::info;

use crate::config::DepsightConfig;
use crate::error::Result;
use crate::graph::ArtifactSymbolIndex;

/// ABI of one module variant.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiReport {
    pub fingerprint: String,
    pub type_count: usize,
    pub member_count: usize,
    /// Dependencies whose types appear in the surface.
    #[serde(default)]
    pub exposed: Vec<ExposedDependency>,
    /// Full dump with provenance comments.
    #[serde(skip)]
    pub dump: String,
    /// Dump without comments; the fingerprint input.
    #[serde(skip)]
    pub reduced: String,
}

impl AbiReport {
    pub fn from_surface(surface: &AbiSurface, index: Option<&ArtifactSymbolIndex>) -> Self {
        let dump = full_dump(surface);
        let reduced = reduce(&dump);
        Self {
            fingerprint: fingerprint(&reduced),
            type_count: surface.types.len(),
            member_count: surface.member_count(),
            exposed: index
                .map(|index| exposed_dependencies(surface, index))
                .unwrap_or_default(),
            dump,
            reduced,
        }
    }
}

/// Extract and fingerprint the ABI of `outputs`. Exposed dependencies are
/// resolved against `index` when one is given.
pub fn analyze_abi(
    outputs: &[PathBuf],
    config: &DepsightConfig,
    index: Option<&ArtifactSymbolIndex>,
) -> Result<AbiReport> {
    let surface = extract_surface(outputs, &config.abi, &config.limits)?;
    let report = AbiReport::from_surface(&surface, index);
    info!(
        type_count = report.type_count,
        member_count = report.member_count,
        fingerprint = %report.fingerprint,
        "computed abi"
    );
    Ok(report)
}
