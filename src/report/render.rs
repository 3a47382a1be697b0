//! Plain-text rendering of misuse reports for terminals and CI logs.

use std::fmt::Write;

use super::misuse::MisuseReport;

/// Render a human-readable summary. `title` names the module and variant.
pub fn render_misuse(title: &str, report: &MisuseReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Dependency usage for {}", title);

    if report.is_clean() {
        let _ = writeln!(out, "\nNo dependency misuse found.");
    }

    if !report.unused_direct.is_empty() {
        let _ = writeln!(out, "\nUnused direct dependencies (consider removing):");
        for identity in &report.unused_direct {
            let _ = writeln!(out, "  {}", identity);
        }
    }

    if !report.used_transitive.is_empty() {
        let _ = writeln!(out, "\nUsed transitive dependencies (consider declaring):");
        for usage in &report.used_transitive {
            if usage.via.is_empty() {
                let _ = writeln!(out, "  {}", usage.identity);
            } else {
                let _ = writeln!(out, "  {} (via {})", usage.identity, usage.via.join(", "));
            }
            if usage.path.len() > 2 {
                let _ = writeln!(out, "    path {}", usage.path.join(" -> "));
            }
            for symbol in &usage.symbols {
                let _ = writeln!(out, "    uses {}", symbol);
            }
        }
    }

    if !report.unobservable.is_empty() {
        let _ = writeln!(
            out,
            "\nDirect dependencies owning no classes (usage cannot be observed):"
        );
        for identity in &report.unobservable {
            let _ = writeln!(out, "  {}", identity);
        }
    }

    if !report.allowed_unused.is_empty() {
        let _ = writeln!(out, "\nUnused but allowed:");
        for identity in &report.allowed_unused {
            let _ = writeln!(out, "  {}", identity);
        }
    }

    out
}
