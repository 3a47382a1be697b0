//! The public binary interface of a module's compiled output.

use std::collections::{BTreeSet, HashMap};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::config::{AbiConfig, Limits};
use crate::error::{ParseError, Result};
use crate::parser::classfile::{
    ACC_ABSTRACT, ACC_ANNOTATION, ACC_BRIDGE, ACC_ENUM, ACC_FINAL, ACC_INTERFACE, ACC_PROTECTED,
    ACC_PUBLIC, ACC_STATIC, ACC_SYNTHETIC,
};
use crate::parser::descriptor::{collect_signature_types, parse_field_descriptor, parse_method_descriptor};
use crate::parser::{self, ClassFile, MemberInfo};
use crate::symbol::Symbol;

const JAVA_LANG_OBJECT: &str = "java/lang/Object";
const STATIC_INITIALIZER: &str = "<clinit>";

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TypeKind {
    Class,
    Interface,
    Enum,
    Annotation,
}

impl TypeKind {
    fn of(flags: u16) -> Self {
        if flags & ACC_ANNOTATION != 0 {
            TypeKind::Annotation
        } else if flags & ACC_INTERFACE != 0 {
            TypeKind::Interface
        } else if flags & ACC_ENUM != 0 {
            TypeKind::Enum
        } else {
            TypeKind::Class
        }
    }

    pub fn keyword(&self) -> &'static str {
        match self {
            TypeKind::Class => "class",
            TypeKind::Interface => "interface",
            TypeKind::Enum => "enum",
            TypeKind::Annotation => "@interface",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Field,
    Method,
}

/// A visible field or method.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiMember {
    pub kind: MemberKind,
    pub name: String,
    pub descriptor: String,
    /// Modifiers relevant to linking, in source order.
    pub modifiers: Vec<String>,
    /// Java-like rendering with erased, fully-qualified types.
    pub display: String,
}

/// A visible type and its visible members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiType {
    /// Source-form name (`com.example.Outer$Inner`).
    pub name: String,
    pub kind: TypeKind,
    pub modifiers: Vec<String>,
    pub super_class: Option<String>,
    /// Sorted.
    pub interfaces: Vec<String>,
    /// Sorted by name then descriptor.
    pub members: Vec<AbiMember>,
    pub source_file: Option<String>,
    pub major_version: u16,
    pub minor_version: u16,
    /// Types named anywhere in this type's visible signatures.
    #[serde(skip)]
    pub exposed_types: BTreeSet<Symbol>,
}

/// Visible types sorted by name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbiSurface {
    pub types: Vec<AbiType>,
}

impl AbiSurface {
    pub fn member_count(&self) -> usize {
        self.types.iter().map(|t| t.members.len()).sum()
    }

    /// Every type referenced from the visible surface.
    pub fn exposed_types(&self) -> BTreeSet<Symbol> {
        self.types
            .iter()
            .flat_map(|t| t.exposed_types.iter().cloned())
            .collect()
    }
}

/// A parsed type awaiting the nesting check.
struct Candidate {
    abi: AbiType,
    class_public: bool,
    synthetic: bool,
    /// `Some` when the class is nested: (visible per its own entry, outer).
    nesting: Option<(bool, Option<String>)>,
}

/// Extract the surface of every compiled output.
pub fn extract_surface(
    outputs: &[PathBuf],
    config: &AbiConfig,
    limits: &Limits,
) -> Result<AbiSurface> {
    let mut candidates: HashMap<String, Candidate> = HashMap::new();
    for output in outputs {
        parser::for_each_class(output, limits, |_, class| {
            if class.defines_type() {
                let candidate = candidate(&class)?;
                candidates.insert(class.this_class, candidate);
            }
            Ok(())
        })?;
    }
    Ok(surface_from(candidates, config))
}

/// Build the surface from already-parsed classes.
pub fn surface_of(classes: &[ClassFile], config: &AbiConfig) -> std::result::Result<AbiSurface, ParseError> {
    let mut candidates = HashMap::new();
    for class in classes.iter().filter(|c| c.defines_type()) {
        candidates.insert(class.this_class.clone(), candidate(class)?);
    }
    Ok(surface_from(candidates, config))
}

fn surface_from(candidates: HashMap<String, Candidate>, config: &AbiConfig) -> AbiSurface {
    let mut memo: HashMap<String, bool> = HashMap::new();
    let mut types: Vec<AbiType> = Vec::new();
    for name in candidates.keys() {
        if is_visible(name, &candidates, config, &mut memo, 0) {
            if let Some(candidate) = candidates.get(name) {
                types.push(candidate.abi.clone());
            }
        }
    }
    types.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(
        class_count = candidates.len(),
        type_count = types.len(),
        "extracted abi surface"
    );
    AbiSurface { types }
}

/// Nesting deeper than this is treated as not visible.
const MAX_NESTING: usize = 64;

fn is_visible(
    name: &str,
    candidates: &HashMap<String, Candidate>,
    config: &AbiConfig,
    memo: &mut HashMap<String, bool>,
    depth: usize,
) -> bool {
    if let Some(&known) = memo.get(name) {
        return known;
    }
    let Some(candidate) = candidates.get(name) else {
        return false;
    };
    let visible = depth < MAX_NESTING
        && candidate.class_public
        && !candidate.synthetic
        && !config.excludes(&candidate.abi.name)
        && match &candidate.nesting {
            None => true,
            Some((entry_visible, outer)) => {
                *entry_visible
                    && outer.as_deref().is_some_and(|outer| {
                        is_visible(outer, candidates, config, memo, depth + 1)
                    })
            }
        };
    memo.insert(name.to_string(), visible);
    visible
}

fn candidate(class: &ClassFile) -> std::result::Result<Candidate, ParseError> {
    let self_entry = class.self_inner_entry();
    let flags = self_entry.map_or(class.access_flags, |e| e.access_flags);
    let kind = TypeKind::of(class.access_flags);

    let mut exposed = Vec::new();
    let super_class = class
        .super_class
        .as_deref()
        .filter(|s| *s != JAVA_LANG_OBJECT && kind != TypeKind::Interface);
    if let Some(s) = super_class {
        exposed.push(s.to_string());
    }
    exposed.extend(class.interfaces.iter().cloned());
    if let Some(sig) = &class.signature {
        collect_signature_types(sig, &mut exposed)?;
    }

    let mut members = Vec::new();
    for field in &class.fields {
        if include_member(field, MemberKind::Field) {
            members.push(render_member(field, MemberKind::Field, &mut exposed)?);
        }
    }
    for method in &class.methods {
        if include_member(method, MemberKind::Method) {
            members.push(render_member(method, MemberKind::Method, &mut exposed)?);
        }
    }
    members.sort_by(|a, b| (&a.name, &a.descriptor).cmp(&(&b.name, &b.descriptor)));

    let mut interfaces: Vec<String> = class
        .interfaces
        .iter()
        .map(|i| Symbol::from_internal(i).to_string())
        .collect();
    interfaces.sort();

    let mut modifiers = visibility(flags);
    if flags & ACC_STATIC != 0 {
        modifiers.push("static".to_string());
    }
    if kind == TypeKind::Class && flags & ACC_ABSTRACT != 0 {
        modifiers.push("abstract".to_string());
    }
    if kind == TypeKind::Class && flags & ACC_FINAL != 0 {
        modifiers.push("final".to_string());
    }

    let this = Symbol::from_internal(&class.this_class);
    let exposed_types = exposed
        .iter()
        .map(|n| Symbol::from_internal(n))
        .filter(|s| *s != this && !s.is_synthetic_marker())
        .collect();

    Ok(Candidate {
        abi: AbiType {
            name: this.to_string(),
            kind,
            modifiers,
            super_class: super_class.map(|s| Symbol::from_internal(s).to_string()),
            interfaces,
            members,
            source_file: class.source_file.clone(),
            major_version: class.major_version,
            minor_version: class.minor_version,
            exposed_types,
        },
        class_public: class.has(ACC_PUBLIC),
        synthetic: class.synthetic || class.has(ACC_SYNTHETIC),
        nesting: self_entry.map(|e| {
            (
                e.access_flags & (ACC_PUBLIC | ACC_PROTECTED) != 0,
                e.outer.clone(),
            )
        }),
    })
}

fn include_member(member: &MemberInfo, kind: MemberKind) -> bool {
    member.has(ACC_PUBLIC | ACC_PROTECTED)
        && !member.is_synthetic()
        && !(kind == MemberKind::Method && member.has(ACC_BRIDGE))
        && member.name != STATIC_INITIALIZER
        && !member.name.contains('$')
}

fn visibility(flags: u16) -> Vec<String> {
    if flags & ACC_PUBLIC != 0 {
        vec!["public".to_string()]
    } else if flags & ACC_PROTECTED != 0 {
        vec!["protected".to_string()]
    } else {
        Vec::new()
    }
}

fn render_member(
    member: &MemberInfo,
    kind: MemberKind,
    exposed: &mut Vec<String>,
) -> std::result::Result<AbiMember, ParseError> {
    let mut modifiers = visibility(member.access_flags);
    if member.has(ACC_STATIC) {
        modifiers.push("static".to_string());
    }
    if member.has(ACC_FINAL) {
        modifiers.push("final".to_string());
    }
    if kind == MemberKind::Method && member.has(ACC_ABSTRACT) {
        modifiers.push("abstract".to_string());
    }

    let signature = match kind {
        MemberKind::Field => {
            let ty = parse_field_descriptor(&member.descriptor)?;
            exposed.extend(ty.class_name().map(str::to_string));
            format!("{} {}", ty, member.name)
        }
        MemberKind::Method => {
            let descriptor = parse_method_descriptor(&member.descriptor)?;
            exposed.extend(descriptor.class_names().map(str::to_string));
            let params: Vec<String> = descriptor.params.iter().map(|p| p.to_string()).collect();
            if member.name == "<init>" {
                format!("<init>({})", params.join(", "))
            } else {
                format!("{} {}({})", descriptor.ret, member.name, params.join(", "))
            }
        }
    };
    if let Some(sig) = &member.signature {
        collect_signature_types(sig, exposed)?;
    }

    let display = if modifiers.is_empty() {
        signature
    } else {
        format!("{} {}", modifiers.join(" "), signature)
    };
    Ok(AbiMember {
        kind,
        name: member.name.clone(),
        descriptor: member.descriptor.clone(),
        modifiers,
        display,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::classfile::{ACC_PRIVATE, ACC_SUPER};
    use crate::testkit::ClassBuilder;

    fn surface(classes: Vec<Vec<u8>>, config: &AbiConfig) -> AbiSurface {
        let parsed: Vec<ClassFile> = classes
            .iter()
            .map(|bytes| ClassFile::parse(bytes).unwrap())
            .collect();
        surface_of(&parsed, config).unwrap()
    }

    fn names(surface: &AbiSurface) -> Vec<&str> {
        surface.types.iter().map(|t| t.name.as_str()).collect()
    }

    #[test]
    fn test_member_filtering() {
        let s = surface(
            vec![ClassBuilder::new("com/a/Api")
                .method(ACC_PUBLIC, "<init>", "()V")
                .method(ACC_PUBLIC, "run", "(ILjava/lang/String;)Lcom/b/Result;")
                .method(ACC_PROTECTED, "hook", "()V")
                .method(ACC_PRIVATE, "secret", "()V")
                .method(0, "packagePrivate", "()V")
                .method(ACC_PUBLIC | ACC_SYNTHETIC, "access$000", "()V")
                .method(ACC_PUBLIC | ACC_BRIDGE, "compareTo", "(Ljava/lang/Object;)I")
                .method(ACC_STATIC, "<clinit>", "()V")
                .method(ACC_PUBLIC, "internalThing$mymodule", "()V")
                .field(ACC_PUBLIC | ACC_STATIC | ACC_FINAL, "NAME", "Ljava/lang/String;")
                .field(ACC_PUBLIC | 0x0040, "counter", "I")
                .build()],
            &AbiConfig::default(),
        );
        let api = &s.types[0];
        let displays: Vec<&str> = api.members.iter().map(|m| m.display.as_str()).collect();
        assert_eq!(
            displays,
            vec![
                "public <init>()",
                "public static final java.lang.String NAME",
                "public int counter",
                "protected void hook()",
                "public com.b.Result run(int, java.lang.String)",
            ]
        );
        assert!(api.exposed_types.contains("com.b.Result"));
    }

    #[test]
    fn test_type_visibility() {
        let s = surface(
            vec![
                ClassBuilder::new("com/a/Public").build(),
                ClassBuilder::new("com/a/Hidden").access(ACC_SUPER).build(),
                ClassBuilder::new("com/a/Gen").access(ACC_PUBLIC | ACC_SYNTHETIC).build(),
            ],
            &AbiConfig::default(),
        );
        assert_eq!(names(&s), vec!["com.a.Public"]);
    }

    #[test]
    fn test_nested_visibility_follows_outer() {
        let outer = ClassBuilder::new("com/a/Outer")
            .inner_class("com/a/Outer$Open", Some("com/a/Outer"), "Open", ACC_PUBLIC | ACC_STATIC)
            .build();
        let open = ClassBuilder::new("com/a/Outer$Open")
            .inner_class("com/a/Outer$Open", Some("com/a/Outer"), "Open", ACC_PUBLIC | ACC_STATIC)
            .build();
        // Public in its own flags but private per InnerClasses.
        let private = ClassBuilder::new("com/a/Outer$Private")
            .inner_class("com/a/Outer$Private", Some("com/a/Outer"), "Private", ACC_PRIVATE)
            .build();
        let hidden_outer = ClassBuilder::new("com/a/Internal").access(ACC_SUPER).build();
        let nested_in_hidden = ClassBuilder::new("com/a/Internal$Api")
            .inner_class("com/a/Internal$Api", Some("com/a/Internal"), "Api", ACC_PUBLIC)
            .build();
        let anonymous = ClassBuilder::new("com/a/Outer$1")
            .inner_class("com/a/Outer$1", None, "", ACC_PUBLIC)
            .build();

        let s = surface(
            vec![outer, open, private, hidden_outer, nested_in_hidden, anonymous],
            &AbiConfig::default(),
        );
        assert_eq!(names(&s), vec!["com.a.Outer", "com.a.Outer$Open"]);
        assert_eq!(s.types[1].modifiers, vec!["public", "static"]);
    }

    #[test]
    fn test_excluded_packages() {
        let config = AbiConfig {
            exclude_packages: vec!["com.a.internal".to_string()],
        };
        let s = surface(
            vec![
                ClassBuilder::new("com/a/Api").build(),
                ClassBuilder::new("com/a/internal/Impl").build(),
                ClassBuilder::new("com/a/internal/deep/More").build(),
                ClassBuilder::new("com/a/internalish/Kept").build(),
            ],
            &config,
        );
        assert_eq!(names(&s), vec!["com.a.Api", "com.a.internalish.Kept"]);
    }

    #[test]
    fn test_type_header_parts() {
        let s = surface(
            vec![ClassBuilder::new("com/a/Impl")
                .access(ACC_PUBLIC | ACC_FINAL | ACC_SUPER)
                .super_class("com/b/Base")
                .interface("com/b/Zeta")
                .interface("com/b/Alpha")
                .build()],
            &AbiConfig::default(),
        );
        let t = &s.types[0];
        assert_eq!(t.kind, TypeKind::Class);
        assert_eq!(t.modifiers, vec!["public", "final"]);
        assert_eq!(t.super_class.as_deref(), Some("com.b.Base"));
        assert_eq!(t.interfaces, vec!["com.b.Alpha", "com.b.Zeta"]);
        let exposed: Vec<&str> = t.exposed_types.iter().map(Symbol::as_str).collect();
        assert_eq!(exposed, vec!["com.b.Alpha", "com.b.Base", "com.b.Zeta"]);
    }

    #[test]
    fn test_interface_omits_object_super() {
        let s = surface(
            vec![ClassBuilder::new("com/a/Listener")
                .access(ACC_PUBLIC | ACC_INTERFACE | ACC_ABSTRACT)
                .method(ACC_PUBLIC | ACC_ABSTRACT, "onEvent", "(Lcom/b/Event;)V")
                .build()],
            &AbiConfig::default(),
        );
        let t = &s.types[0];
        assert_eq!(t.kind, TypeKind::Interface);
        assert_eq!(t.modifiers, vec!["public"]);
        assert_eq!(t.super_class, None);
        assert_eq!(t.members[0].display, "public abstract void onEvent(com.b.Event)");
    }
}
