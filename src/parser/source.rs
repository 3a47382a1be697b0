//! Detection of where compiled units live.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// The shape of a compiled-output location.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitSource {
    /// A directory tree of `.class` files (a compiler's output directory,
    /// or a project-internal artifact).
    Directory,
    /// A ZIP container (`.jar`, `.zip`).
    Archive,
    /// A single loose `.class` file.
    ClassFile,
}

impl UnitSource {
    /// Detect from an existing path. Returns `None` for paths that don't
    /// exist; any regular file that isn't a `.class` is read as an archive.
    pub fn from_path(path: &Path) -> Option<Self> {
        let meta = path.metadata().ok()?;
        if meta.is_dir() {
            Some(UnitSource::Directory)
        } else if is_class_file(path) {
            Some(UnitSource::ClassFile)
        } else {
            Some(UnitSource::Archive)
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            UnitSource::Directory => "directory",
            UnitSource::Archive => "archive",
            UnitSource::ClassFile => "class file",
        }
    }
}

pub fn is_class_file(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "class")
}

/// Whether an archive entry name is a class unit worth parsing.
pub fn is_class_entry(name: &str) -> bool {
    name.ends_with(".class") && !name.ends_with('/')
}
