//! Text forms of an ABI surface and its fingerprint.
//!
//! The full dump carries comment lines (`// ...`) with provenance that may
//! change without affecting linking. The reduced form drops them and is the
//! change-detection contract: two outputs are ABI compatible for
//! downstream recompilation purposes iff their reduced forms are equal.

use sha2::{Digest, Sha256};
use std::fmt::Write;

use super::surface::{AbiSurface, AbiType, TypeKind};

const COMMENT: &str = "//";

/// Full dump, sorted by type then member.
pub fn full_dump(surface: &AbiSurface) -> String {
    let mut out = String::new();
    for ty in &surface.types {
        if let Some(source) = &ty.source_file {
            let _ = writeln!(out, "{} source: {}", COMMENT, source);
        }
        let _ = writeln!(
            out,
            "{} class version: {}.{}",
            COMMENT, ty.major_version, ty.minor_version
        );
        let _ = writeln!(out, "{}", type_header(ty));
        for member in &ty.members {
            let _ = writeln!(out, "  {}", member.display);
        }
        out.push('\n');
    }
    out
}

/// The dump without comment lines.
pub fn reduce(dump: &str) -> String {
    let mut out = String::with_capacity(dump.len());
    for line in dump.lines().filter(|l| !l.trim_start().starts_with(COMMENT)) {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// SHA-256 of the reduced form, hex encoded.
pub fn fingerprint(reduced: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(reduced.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn type_header(ty: &AbiType) -> String {
    let mut header = String::new();
    for modifier in &ty.modifiers {
        header.push_str(modifier);
        header.push(' ');
    }
    header.push_str(ty.kind.keyword());
    header.push(' ');
    header.push_str(&ty.name);

    if let Some(super_class) = &ty.super_class {
        let _ = write!(header, " extends {}", super_class);
    }
    if !ty.interfaces.is_empty() {
        let keyword = match ty.kind {
            TypeKind::Interface | TypeKind::Annotation => " extends",
            TypeKind::Class | TypeKind::Enum => " implements",
        };
        let _ = write!(header, "{} {}", keyword, ty.interfaces.join(", "));
    }
    header
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::surface::surface_of;
    use crate::config::AbiConfig;
    use crate::parser::classfile::{ACC_ABSTRACT, ACC_INTERFACE, ACC_PRIVATE, ACC_PUBLIC, ACC_STATIC};
    use crate::parser::ClassFile;
    use crate::testkit::ClassBuilder;

    fn dump_of(classes: Vec<Vec<u8>>) -> String {
        let parsed: Vec<ClassFile> = classes.iter().map(|b| ClassFile::parse(b).unwrap()).collect();
        full_dump(&surface_of(&parsed, &AbiConfig::default()).unwrap())
    }

    #[test]
    fn test_full_dump_layout() {
        let dump = dump_of(vec![
            ClassBuilder::new("com/a/Service")
                .source_file("Service.kt")
                .interface("java/io/Closeable")
                .method(ACC_PUBLIC, "close", "()V")
                .method(ACC_PUBLIC | ACC_STATIC, "create", "()Lcom/a/Service;")
                .build(),
            ClassBuilder::new("com/a/Listener")
                .access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
                .interface("java/util/EventListener")
                .build(),
        ]);
        assert_eq!(
            dump,
            "// class version: 52.0\n\
             public interface com.a.Listener extends java.util.EventListener\n\
             \n\
             // source: Service.kt\n\
             // class version: 52.0\n\
             public class com.a.Service implements java.io.Closeable\n\
             \x20 public void close()\n\
             \x20 public static com.a.Service create()\n\
             \n"
        );
    }

    #[test]
    fn test_reduced_drops_comments_only() {
        let dump = "// source: A.kt\n// class version: 52.0\npublic class a.A\n  public void run()\n\n";
        assert_eq!(reduce(dump), "public class a.A\n  public void run()\n\n");
    }

    #[test]
    fn test_fingerprint_ignores_provenance() {
        let v52 = dump_of(vec![ClassBuilder::new("a/A").source_file("A.java").build()]);
        let v55 = dump_of(vec![ClassBuilder::new("a/A").major(55).source_file("A.kt").build()]);
        assert_ne!(v52, v55);
        assert_eq!(fingerprint(&reduce(&v52)), fingerprint(&reduce(&v55)));
    }

    #[test]
    fn test_fingerprint_stability() {
        let base = ClassBuilder::new("a/A")
            .method(ACC_PUBLIC, "one", "()V")
            .method(ACC_PUBLIC, "two", "(I)V")
            .method(ACC_PRIVATE, "helper", "()V");
        let fp = |bytes: Vec<u8>| fingerprint(&reduce(&dump_of(vec![bytes])));

        let original = fp(base.build());
        let renamed_private = fp(ClassBuilder::new("a/A")
            .method(ACC_PUBLIC, "one", "()V")
            .method(ACC_PUBLIC, "two", "(I)V")
            .method(ACC_PRIVATE, "renamedHelper", "()V")
            .build());
        let reordered = fp(ClassBuilder::new("a/A")
            .method(ACC_PUBLIC, "two", "(I)V")
            .method(ACC_PUBLIC, "one", "()V")
            .method(ACC_PRIVATE, "helper", "()V")
            .build());
        let added = fp(ClassBuilder::new("a/A")
            .method(ACC_PUBLIC, "one", "()V")
            .method(ACC_PUBLIC, "two", "(I)V")
            .method(ACC_PUBLIC, "three", "()V")
            .method(ACC_PRIVATE, "helper", "()V")
            .build());

        assert_eq!(original, renamed_private);
        assert_eq!(original, reordered);
        assert_ne!(original, added);
        assert_eq!(original.len(), 64);
    }

    #[test]
    fn test_empty_surface() {
        let dump = full_dump(&AbiSurface::default());
        assert_eq!(dump, "");
        assert_eq!(
            fingerprint(&reduce(&dump)),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }
}
