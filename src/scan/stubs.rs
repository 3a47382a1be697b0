//! Import scanning for generated Java stubs (kapt and similar).

use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;

use super::pattern::PatternScanner;
use super::TextSymbolScanner;
use crate::symbol::Symbol;

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?m)^\s*import\s+(static\s+)?([A-Za-z_][A-Za-z0-9_$]*(?:\s*\.\s*[A-Za-z_][A-Za-z0-9_$]*)*)(\s*\.\s*\*)?\s*;",
    )
    .unwrap()
});

/// Reads `import` declarations and then runs the pattern scan over the whole
/// file, since stubs spell out most types fully qualified.
///
/// Static imports reduce to the type that owns the member. Plain wildcard
/// imports name a package, not a type, and are skipped.
#[derive(Debug, Clone, Copy, Default)]
pub struct JavaStubScanner {
    pattern: PatternScanner,
}

impl JavaStubScanner {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TextSymbolScanner for JavaStubScanner {
    fn name(&self) -> &'static str {
        "java-stub"
    }

    fn scan(&self, text: &str, out: &mut BTreeSet<Symbol>) {
        for caps in IMPORT.captures_iter(text) {
            let is_static = caps.get(1).is_some();
            let is_wildcard = caps.get(3).is_some();
            let path: String = caps[2].chars().filter(|c| !c.is_whitespace()).collect();

            let type_name = match (is_static, is_wildcard) {
                (false, false) => Some(path.as_str()),
                (false, true) => None,
                (true, true) => Some(path.as_str()),
                (true, false) => path.rsplit_once('.').map(|(owner, _)| owner),
            };
            if let Some(name) = type_name.filter(|n| n.contains('.')) {
                out.insert(Symbol::new(name));
            }
        }
        self.pattern.scan(text, out);
    }
}
