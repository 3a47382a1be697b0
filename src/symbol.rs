//! Symbols: fully-qualified type names, the unit of usage tracking.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;

/// Name fragments of compiler-generated classes that never correspond to a
/// real dependency (lambda metafactory spins, D8 desugaring helpers).
const SYNTHETIC_MARKERS: &[&str] = &["$$Lambda", "-$$Lambda$", "$$ExternalSynthetic"];

/// A fully-qualified type name in source form (`com.example.Foo`, nested
/// types as `com.example.Foo$Bar`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Self {
        Symbol(name.into())
    }

    /// Convert a JVM internal name (`com/example/Foo`).
    pub fn from_internal(name: &str) -> Self {
        Symbol(name.replace('/', "."))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Generated marker classes are never dependency symbols.
    pub fn is_synthetic_marker(&self) -> bool {
        SYNTHETIC_MARKERS.iter().any(|m| self.0.contains(m))
    }

    /// Package portion, empty for the default package.
    pub fn package(&self) -> &str {
        self.0.rsplit_once('.').map(|(p, _)| p).unwrap_or("")
    }

    /// The outermost enclosing type (`a.Outer$Inner` → `a.Outer`).
    pub fn top_level(&self) -> Symbol {
        let simple_start = self.0.rfind('.').map(|i| i + 1).unwrap_or(0);
        match self.0[simple_start..].find('$') {
            Some(0) | None => self.clone(),
            Some(offset) => Symbol(self.0[..simple_start + offset].to_string()),
        }
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for Symbol {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for Symbol {
    fn from(name: &str) -> Self {
        Symbol::new(name)
    }
}
