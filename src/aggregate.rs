//! Root-level reports merged from per-module outcomes.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::abi::AbiReport;
use crate::error::{DepsightError, Result};
use crate::pipeline::ModuleOutcome;
use crate::report::MisuseReport;

/// What happened to one module variant in a root report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum RootStatus<T> {
    Analyzed { report: T },
    Skipped { reason: String },
    /// The analysis does not apply to this flavor.
    NotApplicable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootEntry<T> {
    pub module: String,
    pub variant: String,
    #[serde(flatten)]
    pub status: RootStatus<T>,
}

/// Entries sorted by module, then variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootReport<T> {
    pub modules: Vec<RootEntry<T>>,
}

impl<T> Default for RootReport<T> {
    fn default() -> Self {
        Self {
            modules: Vec::new(),
        }
    }
}

impl<T: Serialize> RootReport<T> {
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl<T> RootReport<T> {
    fn sort(&mut self) {
        self.modules
            .sort_by(|a, b| (&a.module, &a.variant).cmp(&(&b.module, &b.variant)));
    }

    pub fn analyzed(&self) -> impl Iterator<Item = (&RootEntry<T>, &T)> {
        self.modules.iter().filter_map(|entry| match &entry.status {
            RootStatus::Analyzed { report } => Some((entry, report)),
            _ => None,
        })
    }

    pub fn skipped_count(&self) -> usize {
        self.modules
            .iter()
            .filter(|e| matches!(e.status, RootStatus::Skipped { .. }))
            .count()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RootReports {
    pub misuse: RootReport<MisuseReport>,
    pub abi: RootReport<AbiReport>,
}

impl RootReports {
    /// Modules with at least one unused direct or used transitive
    /// dependency.
    pub fn misuse_count(&self) -> usize {
        self.misuse.analyzed().filter(|(_, r)| !r.is_clean()).count()
    }
}

/// Merge outcomes. Input order doesn't matter.
pub fn aggregate(outcomes: &[ModuleOutcome]) -> RootReports {
    let mut reports = RootReports::default();
    for outcome in outcomes {
        let module = outcome.module().to_string();
        let variant = outcome.variant().to_string();
        let (misuse, abi) = match outcome {
            ModuleOutcome::Analyzed(report) => (
                RootStatus::Analyzed {
                    report: report.misuse.clone(),
                },
                match &report.abi {
                    Some(abi) => RootStatus::Analyzed {
                        report: abi.clone(),
                    },
                    None => RootStatus::NotApplicable,
                },
            ),
            ModuleOutcome::Skipped { reason, .. } => (
                RootStatus::Skipped {
                    reason: reason.clone(),
                },
                RootStatus::Skipped {
                    reason: reason.clone(),
                },
            ),
        };
        reports.misuse.modules.push(RootEntry {
            module: module.clone(),
            variant: variant.clone(),
            status: misuse,
        });
        reports.abi.modules.push(RootEntry {
            module,
            variant,
            status: abi,
        });
    }

    reports.misuse.sort();
    reports.abi.sort();
    debug!(module_count = outcomes.len(), "aggregated reports");
    reports
}

/// Read per-module outcome files written by `analyze`.
pub fn load_outcomes(paths: &[impl AsRef<Path>]) -> Result<Vec<ModuleOutcome>> {
    paths
        .iter()
        .map(|path| {
            let path = path.as_ref();
            let text = fs::read_to_string(path).map_err(|e| DepsightError::io(path, e))?;
            serde_json::from_str(&text).map_err(|e| {
                DepsightError::Manifest(format!("{}: {}", path.display(), e))
            })
        })
        .collect()
}
