//! CLI module for depsight.
//!
//! Commands:
//! - analyze: full pipeline for one module manifest, reports written to disk
//! - used: print the used-symbol set
//! - abi: fingerprint or dump compiled outputs
//! - aggregate: merge per-module outcomes into root reports

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::abi::{self, AbiReport};
use crate::aggregate::{aggregate, load_outcomes, RootReports};
use crate::config::DepsightConfig;
use crate::pipeline::{analyze_module, ModuleInputs, ModuleOutcome, ModuleReport};

/// Default config location under the project root.
pub const CONFIG_PATH: &str = ".depsight/config.toml";

#[derive(Parser)]
#[command(name = "depsight")]
#[command(about = "Dependency usage and ABI analysis for JVM modules", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Project root directory (default: current directory)
    #[arg(short, long, default_value = ".")]
    pub root: PathBuf,

    /// Config file (default: <root>/.depsight/config.toml)
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    // ─── Module Analysis ────────────────────────────────────────
    /// Analyze one module variant and write all reports
    Analyze {
        /// Module manifest (JSON or TOML)
        manifest: PathBuf,

        /// Output directory
        #[arg(short, long, default_value = "depsight-out")]
        out: PathBuf,

        /// Exit with an error when misuse is found
        #[arg(long)]
        strict: bool,
    },

    /// Print the symbols a module uses from outside itself
    Used {
        /// Module manifest (JSON or TOML)
        manifest: PathBuf,
    },

    /// Print the ABI fingerprint of compiled outputs
    Abi {
        /// Class directories, jars, or class files
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Print the full dump instead of the fingerprint
        #[arg(long, conflicts_with = "reduced")]
        dump: bool,

        /// Print the reduced form instead of the fingerprint
        #[arg(long)]
        reduced: bool,
    },

    // ─── Root Reports ───────────────────────────────────────────
    /// Merge per-module outcome files into root reports
    Aggregate {
        /// `outcome.json` files written by `analyze`
        #[arg(required = true)]
        reports: Vec<PathBuf>,

        /// Output directory
        #[arg(short, long, default_value = "depsight-out")]
        out: PathBuf,
    },
}

/// Execute a parsed command line.
pub fn run(cli: Cli) -> Result<()> {
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| cli.root.join(CONFIG_PATH));
    let config = DepsightConfig::load(&config_path);

    match cli.command {
        Commands::Analyze {
            manifest,
            out,
            strict,
        } => {
            let inputs = load_inputs(&manifest)?;
            let outcome = analyze_module(&inputs, &config)
                .with_context(|| format!("analyzing {}", inputs.title()))?;
            let dir = module_dir(&out, &inputs);
            write_outcome(&dir, &outcome)?;

            match &outcome {
                ModuleOutcome::Analyzed(report) => {
                    print!("{}", report.render_misuse());
                    if strict && !report.misuse.is_clean() {
                        bail!("dependency misuse found in {}", report.title());
                    }
                }
                ModuleOutcome::Skipped { reason, .. } => {
                    println!("Skipped {}: {}", inputs.title(), reason);
                }
            }
        }

        Commands::Used { manifest } => {
            let inputs = load_inputs(&manifest)?;
            let used = inputs
                .flavor
                .extract_used_symbols(&inputs, &config)
                .with_context(|| format!("extracting used symbols for {}", inputs.title()))?;
            for symbol in used.iter() {
                println!("{}", symbol);
            }
        }

        Commands::Abi {
            paths,
            dump,
            reduced,
        } => {
            let report = abi::analyze_abi(&paths, &config, None)?;
            if dump {
                print!("{}", report.dump);
            } else if reduced {
                print!("{}", report.reduced);
            } else {
                println!("{}", report.fingerprint);
            }
        }

        Commands::Aggregate { reports, out } => {
            let outcomes = load_outcomes(&reports)?;
            let root = aggregate(&outcomes);
            write_root_reports(&out, &root)?;
            println!(
                "{} module variants, {} with misuse, {} skipped",
                root.misuse.modules.len(),
                root.misuse_count(),
                root.misuse.skipped_count()
            );
        }
    }

    Ok(())
}

fn load_inputs(manifest: &Path) -> Result<ModuleInputs> {
    ModuleInputs::load(manifest)
        .with_context(|| format!("reading manifest {}", manifest.display()))
}

/// `<out>/<module path as dirs>/<variant>`; `:feature:login` becomes
/// `feature/login`, the root project `:` becomes `root`.
pub fn module_dir(out: &Path, inputs: &ModuleInputs) -> PathBuf {
    let mut dir = out.to_path_buf();
    let segments: Vec<&str> = inputs
        .module
        .split(':')
        .filter(|s| !s.is_empty())
        .collect();
    if segments.is_empty() {
        dir.push("root");
    }
    for segment in segments {
        dir.push(segment);
    }
    dir.push(&inputs.variant);
    dir
}

fn write(dir: &Path, name: &str, contents: &str) -> Result<()> {
    let path = dir.join(name);
    fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))
}

fn write_outcome(dir: &Path, outcome: &ModuleOutcome) -> Result<()> {
    fs::create_dir_all(dir).with_context(|| format!("creating {}", dir.display()))?;
    write(dir, "outcome.json", &outcome.to_pretty_json()?)?;
    if let ModuleOutcome::Analyzed(report) = outcome {
        write_module_reports(dir, report)?;
    }
    info!(dir = %dir.display(), "wrote module reports");
    Ok(())
}

fn write_module_reports(dir: &Path, report: &ModuleReport) -> Result<()> {
    let used: String = report
        .used_symbols
        .iter()
        .map(|s| format!("{}\n", s))
        .collect();
    write(dir, "used-symbols.txt", &used)?;

    write(dir, "artifacts-compile.json", &report.compile_artifacts.to_json()?)?;
    write(
        dir,
        "artifacts-compile-pretty.json",
        &report.compile_artifacts.to_pretty_json()?,
    )?;
    write(dir, "artifacts-runtime.json", &report.runtime_artifacts.to_json()?)?;
    write(
        dir,
        "artifacts-runtime-pretty.json",
        &report.runtime_artifacts.to_pretty_json()?,
    )?;

    write(dir, "misuse.json", &report.misuse.to_json()?)?;
    write(dir, "misuse-pretty.json", &report.misuse.to_pretty_json()?)?;
    write(dir, "misuse.txt", &report.render_misuse())?;

    if let Some(abi) = &report.abi {
        write_abi(dir, abi)?;
    }
    Ok(())
}

fn write_abi(dir: &Path, abi: &AbiReport) -> Result<()> {
    write(dir, "abi-dump.txt", &abi.dump)?;
    write(dir, "abi-reduced.txt", &abi.reduced)?;
    write(dir, "abi.json", &serde_json::to_string_pretty(abi)?)?;
    Ok(())
}

fn write_root_reports(out: &Path, root: &RootReports) -> Result<()> {
    fs::create_dir_all(out).with_context(|| format!("creating {}", out.display()))?;
    write(out, "misuse.json", &root.misuse.to_json()?)?;
    write(out, "misuse-pretty.json", &root.misuse.to_pretty_json()?)?;
    write(out, "abi.json", &root.abi.to_json()?)?;
    write(out, "abi-pretty.json", &root.abi.to_pretty_json()?)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testkit::jar_with_classes;
    use std::ffi::OsStr;

    fn parse(args: &[&dyn AsRef<OsStr>]) -> Cli {
        Cli::try_parse_from(args.iter().map(|a| a.as_ref().to_os_string())).unwrap()
    }

    fn inputs(module: &str, variant: &str) -> ModuleInputs {
        ModuleInputs::from_json_str(&format!(
            r#"{{"module": "{}", "variant": "{}"}}"#,
            module, variant
        ))
        .unwrap()
    }

    #[test]
    fn test_module_dir() {
        let out = Path::new("out");
        assert_eq!(
            module_dir(out, &inputs(":feature:login", "debug")),
            Path::new("out/feature/login/debug")
        );
        assert_eq!(module_dir(out, &inputs(":", "main")), Path::new("out/root/main"));
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from(["depsight", "abi", "a.jar", "--dump"]).unwrap();
        assert!(matches!(cli.command, Commands::Abi { dump: true, reduced: false, .. }));
        assert!(Cli::try_parse_from(["depsight", "abi"]).is_err());
        assert!(Cli::try_parse_from(["depsight", "abi", "a.jar", "--dump", "--reduced"]).is_err());
    }

    #[test]
    fn test_analyze_writes_reports() {
        let dir = tempfile::tempdir().unwrap();
        let classes = dir.path().join("classes");
        fs::create_dir_all(&classes).unwrap();
        fs::write(
            classes.join("Main.class"),
            crate::testkit::ClassBuilder::new("com/app/Main").build(),
        )
        .unwrap();
        fs::write(dir.path().join("b.jar"), jar_with_classes(&["com/b/Bar"])).unwrap();
        fs::write(
            dir.path().join("inputs.json"),
            r#"{
                "module": ":lib",
                "compiled_outputs": ["classes"],
                "compile_classpath": [
                    {"identity": "g:b:1", "file": "b.jar", "declaration": "direct"}
                ]
            }"#,
        )
        .unwrap();
        let out = dir.path().join("out");

        let manifest = dir.path().join("inputs.json");
        run(parse(&[&"depsight", &"--root", &dir.path(), &"analyze", &manifest, &"--out", &out])).unwrap();

        let module = out.join("lib/main");
        for name in [
            "outcome.json",
            "used-symbols.txt",
            "artifacts-compile.json",
            "artifacts-runtime-pretty.json",
            "misuse.txt",
            "abi-dump.txt",
            "abi-reduced.txt",
            "abi.json",
        ] {
            assert!(module.join(name).exists(), "missing {}", name);
        }
        let misuse = fs::read_to_string(module.join("misuse.json")).unwrap();
        assert!(misuse.contains(r#""unused_direct":["g:b:1"]"#));

        let strict = parse(&[&"depsight", &"analyze", &manifest, &"--out", &out, &"--strict"]);
        assert!(run(strict).is_err());

        let aggregate_out = dir.path().join("root");
        let outcome = module.join("outcome.json");
        run(parse(&[&"depsight", &"aggregate", &outcome, &"--out", &aggregate_out])).unwrap();
        assert!(aggregate_out.join("misuse-pretty.json").exists());
        assert!(aggregate_out.join("abi.json").exists());
    }
}
