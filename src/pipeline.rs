//! One module variant end to end: used symbols, symbol indexes for both
//! classpath views, misuse, and ABI.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::abi::{self, AbiReport};
use crate::config::DepsightConfig;
use crate::error::{DepsightError, Result};
use crate::graph::{build_index, ArtifactSymbolIndex, DependencyGraph, ResolvedArtifact};
use crate::report::{analyze_misuse, render_misuse, ArtifactsReport, MisuseReport};
use crate::usage::{self, UsageSources, UsedSymbolSet};

/// What kind of module is being analyzed. Decides which analyses apply.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModuleFlavor {
    /// An application: nothing consumes its ABI.
    Application,
    /// A library with resources.
    #[default]
    Library,
    /// A plain JVM library without resources.
    Plain,
}

impl ModuleFlavor {
    pub fn scans_resources(&self) -> bool {
        !matches!(self, ModuleFlavor::Plain)
    }

    pub fn has_abi(&self) -> bool {
        !matches!(self, ModuleFlavor::Application)
    }

    pub fn extract_used_symbols(
        &self,
        inputs: &ModuleInputs,
        config: &DepsightConfig,
    ) -> Result<UsedSymbolSet> {
        let sources = UsageSources {
            compiled_outputs: inputs.compiled_outputs.clone(),
            stub_dirs: inputs.stub_dirs.clone(),
            resource_dirs: if self.scans_resources() {
                inputs.resource_dirs.clone()
            } else {
                Vec::new()
            },
        };
        usage::extract_used_symbols(&sources, config)
    }

    /// `None` for flavors without an ABI.
    pub fn abi_analysis(
        &self,
        inputs: &ModuleInputs,
        config: &DepsightConfig,
        index: Option<&ArtifactSymbolIndex>,
    ) -> Result<Option<AbiReport>> {
        if !self.has_abi() {
            return Ok(None);
        }
        abi::analyze_abi(&inputs.compiled_outputs, config, index).map(Some)
    }
}

/// Everything the build hands over for one module variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleInputs {
    /// Module path (`:app`).
    pub module: String,
    #[serde(default = "default_variant")]
    pub variant: String,
    #[serde(default)]
    pub flavor: ModuleFlavor,
    #[serde(default)]
    pub compiled_outputs: Vec<PathBuf>,
    #[serde(default)]
    pub stub_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub resource_dirs: Vec<PathBuf>,
    #[serde(default)]
    pub compile_classpath: Vec<ResolvedArtifact>,
    #[serde(default)]
    pub runtime_classpath: Vec<ResolvedArtifact>,
}

fn default_variant() -> String {
    "main".to_string()
}

impl ModuleInputs {
    /// Read a manifest. `.toml` files are TOML, anything else JSON.
    /// Relative paths are resolved against the manifest's directory.
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| DepsightError::io(path, e))?;
        let is_toml = path.extension().is_some_and(|ext| ext == "toml");
        let mut inputs = if is_toml {
            Self::from_toml_str(&text)?
        } else {
            Self::from_json_str(&text)?
        };
        if let Some(base) = path.parent() {
            inputs.resolve_relative(base);
        }
        Ok(inputs)
    }

    pub fn from_json_str(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| DepsightError::Manifest(e.to_string()))
    }

    pub fn from_toml_str(text: &str) -> Result<Self> {
        toml::from_str(text).map_err(|e| DepsightError::Manifest(e.to_string()))
    }

    /// Make every relative path absolute against `base`.
    pub fn resolve_relative(&mut self, base: &Path) {
        let fix = |p: &mut PathBuf| {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        };
        self.compiled_outputs
            .iter_mut()
            .chain(self.stub_dirs.iter_mut())
            .chain(self.resource_dirs.iter_mut())
            .for_each(fix);
        self.compile_classpath
            .iter_mut()
            .chain(self.runtime_classpath.iter_mut())
            .for_each(|a| fix(&mut a.file));
    }

    /// `:app (debug)`
    pub fn title(&self) -> String {
        format!("{} ({})", self.module, self.variant)
    }

    /// The classpath misuse is judged against: runtime, or compile when the
    /// build supplied no runtime view.
    pub fn misuse_classpath(&self) -> &[ResolvedArtifact] {
        if self.runtime_classpath.is_empty() {
            &self.compile_classpath
        } else {
            &self.runtime_classpath
        }
    }
}

/// Everything computed for one module variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleReport {
    pub module: String,
    pub variant: String,
    pub flavor: ModuleFlavor,
    pub used_symbols: UsedSymbolSet,
    pub compile_artifacts: ArtifactsReport,
    pub runtime_artifacts: ArtifactsReport,
    pub misuse: MisuseReport,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub abi: Option<AbiReport>,
}

impl ModuleReport {
    pub fn title(&self) -> String {
        format!("{} ({})", self.module, self.variant)
    }

    pub fn render_misuse(&self) -> String {
        render_misuse(&self.title(), &self.misuse)
    }
}

/// Result of analyzing a module. A skipped module is distinct from one that
/// was analyzed and found to use nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ModuleOutcome {
    Analyzed(ModuleReport),
    Skipped {
        module: String,
        variant: String,
        reason: String,
    },
}

impl ModuleOutcome {
    pub fn module(&self) -> &str {
        match self {
            ModuleOutcome::Analyzed(report) => &report.module,
            ModuleOutcome::Skipped { module, .. } => module,
        }
    }

    pub fn variant(&self) -> &str {
        match self {
            ModuleOutcome::Analyzed(report) => &report.variant,
            ModuleOutcome::Skipped { variant, .. } => variant,
        }
    }

    pub fn report(&self) -> Option<&ModuleReport> {
        match self {
            ModuleOutcome::Analyzed(report) => Some(report),
            ModuleOutcome::Skipped { .. } => None,
        }
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Run every analysis that applies to `inputs`.
pub fn analyze_module(inputs: &ModuleInputs, config: &DepsightConfig) -> Result<ModuleOutcome> {
    if let Some(reason) = missing_input(inputs) {
        warn!(module = %inputs.module, variant = %inputs.variant, %reason, "skipping module");
        return Ok(ModuleOutcome::Skipped {
            module: inputs.module.clone(),
            variant: inputs.variant.clone(),
            reason,
        });
    }

    let used = inputs.flavor.extract_used_symbols(inputs, config)?;

    let compile_index = build_index(&inputs.compile_classpath, &config.limits)?;
    let runtime_index = if inputs.runtime_classpath.is_empty() {
        None
    } else {
        Some(build_index(&inputs.runtime_classpath, &config.limits)?)
    };
    let misuse_index = runtime_index.as_ref().unwrap_or(&compile_index);
    let graph = DependencyGraph::from_resolved(inputs.misuse_classpath());
    let misuse = analyze_misuse(misuse_index, &used, &graph, &config.misuse);

    let abi = inputs
        .flavor
        .abi_analysis(inputs, config, Some(&compile_index))?;

    info!(
        module = %inputs.module,
        variant = %inputs.variant,
        used = used.len(),
        unused_direct = misuse.unused_direct.len(),
        used_transitive = misuse.used_transitive.len(),
        "analyzed module"
    );

    Ok(ModuleOutcome::Analyzed(ModuleReport {
        module: inputs.module.clone(),
        variant: inputs.variant.clone(),
        flavor: inputs.flavor,
        used_symbols: used,
        compile_artifacts: ArtifactsReport::from_index(&compile_index),
        runtime_artifacts: ArtifactsReport::from_index(
            runtime_index.as_ref().unwrap_or(&compile_index),
        ),
        misuse,
        abi,
    }))
}

fn missing_input(inputs: &ModuleInputs) -> Option<String> {
    if inputs.compiled_outputs.is_empty() {
        return Some("no compiled outputs".to_string());
    }
    inputs
        .compiled_outputs
        .iter()
        .find(|p| !p.exists())
        .map(|p| format!("compiled output {} does not exist", p.display()))
}
