//! Parsing of compiled JVM output: class files, jar archives, and
//! directories of class files.

pub mod archive;
pub mod attributes;
pub mod classfile;
pub mod constant_pool;
pub mod descriptor;
pub mod reader;
pub mod source;

pub use archive::{Archive, ZipEntry};
pub use classfile::{ClassFile, MemberInfo};
pub use source::UnitSource;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::debug;

use crate::config::Limits;
use crate::error::{DepsightError, ParseError, Result};

/// Parse every class unit found at `path` and hand it to `visit` along with
/// its origin (archive entry name or path relative to the directory).
///
/// Units are visited in a stable order (archive order, or sorted file
/// names for directories). The first unit that fails to parse aborts the
/// walk with [`DepsightError::MalformedArtifact`].
pub fn for_each_class<F>(path: &Path, limits: &Limits, mut visit: F) -> Result<()>
where
    F: FnMut(&str, ClassFile) -> std::result::Result<(), ParseError>,
{
    let source = UnitSource::from_path(path).ok_or_else(|| {
        DepsightError::io(path, io::Error::new(io::ErrorKind::NotFound, "path does not exist"))
    })?;
    debug!(path = %path.display(), source = source.name(), "reading compiled units");

    match source {
        UnitSource::ClassFile => {
            let bytes = read_bounded(path, limits)?;
            let origin = path.to_string_lossy();
            parse_and_visit(path, &origin, &bytes, &mut visit)
        }
        UnitSource::Archive => {
            let data = fs::read(path).map_err(|e| DepsightError::io(path, e))?;
            let archive =
                Archive::parse(data, limits).map_err(|e| DepsightError::malformed(path, None, e))?;
            for entry in archive.entries() {
                if !source::is_class_entry(&entry.name) {
                    continue;
                }
                let bytes = archive
                    .read(entry, limits)
                    .map_err(|e| DepsightError::malformed(path, Some(entry.name.clone()), e))?;
                parse_and_visit(path, &entry.name, &bytes, &mut visit)?;
            }
            Ok(())
        }
        UnitSource::Directory => {
            for file in class_files_in(path)? {
                let bytes = read_bounded(&file, limits)?;
                let origin = file
                    .strip_prefix(path)
                    .unwrap_or(&file)
                    .to_string_lossy()
                    .into_owned();
                parse_and_visit(path, &origin, &bytes, &mut visit)?;
            }
            Ok(())
        }
    }
}

fn parse_and_visit<F>(path: &Path, origin: &str, bytes: &[u8], visit: &mut F) -> Result<()>
where
    F: FnMut(&str, ClassFile) -> std::result::Result<(), ParseError>,
{
    let wrap = |e| DepsightError::malformed(path, Some(origin.to_string()), e);
    let class = ClassFile::parse(bytes).map_err(wrap)?;
    visit(origin, class).map_err(wrap)
}

fn read_bounded(path: &Path, limits: &Limits) -> Result<Vec<u8>> {
    let len = fs::metadata(path)
        .map_err(|e| DepsightError::io(path, e))?
        .len();
    if len > limits.max_entry_bytes {
        return Err(DepsightError::malformed(
            path,
            None,
            ParseError::LimitExceeded(format!(
                "class file is {} bytes (max {})",
                len, limits.max_entry_bytes
            )),
        ));
    }
    fs::read(path).map_err(|e| DepsightError::io(path, e))
}

/// All `.class` files under `root`, sorted. Hidden and ignored files are
/// included: build output is never filtered by VCS rules.
pub fn class_files_in(root: &Path) -> Result<Vec<PathBuf>> {
    files_with_extensions(root, &["class"])
}

/// All regular files under `root` whose extension is in `extensions`,
/// sorted by path.
pub fn files_with_extensions(root: &Path, extensions: &[&str]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for entry in WalkBuilder::new(root).standard_filters(false).build() {
        let entry = entry.map_err(|e| {
            let msg = e.to_string();
            DepsightError::io(
                root,
                e.into_io_error()
                    .unwrap_or_else(|| io::Error::new(io::ErrorKind::Other, msg)),
            )
        })?;
        if !entry.file_type().is_some_and(|ft| ft.is_file()) {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| extensions.contains(&ext));
        if matches {
            files.push(entry.into_path());
        }
    }
    files.sort();
    Ok(files)
}
