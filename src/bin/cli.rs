//! depsight CLI - dependency usage and ABI analysis for JVM modules.
//!
//! Usage:
//!   depsight analyze <manifest> [-o out]   # All reports for one module
//!   depsight used <manifest>               # Used symbols
//!   depsight abi <path>... [--dump]        # ABI fingerprint or dump
//!   depsight aggregate <outcome.json>...   # Root reports
//!
//! Logs go to stderr (`RUST_LOG`, default `info`); stdout carries results.

use clap::Parser;
use depsight::cli::{run, Cli};

fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {:#}", e);
        std::process::exit(1);
    }
}
