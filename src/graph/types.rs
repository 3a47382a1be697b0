//! Core types for the resolved dependency graph.
//!
//! Defines artifact identities, how an artifact was declared, and the
//! artifacts themselves with the symbols they provide.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use std::path::PathBuf;

use crate::symbol::Symbol;

/// Identifies one resolved dependency.
///
/// In manifests an identity may be written as its canonical string
/// (`":core"`, `"com.squareup.okio:okio:3.6.0"`) or as a tagged object
/// (`{ "kind": "library", "group": ..., "name": ..., "version": ... }`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ArtifactIdentity {
    /// Another module of the same build (`:core`, `:feature:login`).
    Project { path: String },
    /// An external library coordinate.
    Library {
        group: String,
        name: String,
        version: String,
    },
}

impl ArtifactIdentity {
    pub fn project(path: impl Into<String>) -> Self {
        ArtifactIdentity::Project { path: path.into() }
    }

    pub fn library(
        group: impl Into<String>,
        name: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        ArtifactIdentity::Library {
            group: group.into(),
            name: name.into(),
            version: version.into(),
        }
    }

    /// Parse a canonical string. Project paths start with `:`; libraries
    /// are `group:name` or `group:name:version`.
    pub fn parse(text: &str) -> Option<Self> {
        if text.starts_with(':') {
            return Some(Self::project(text));
        }
        let parts: Vec<&str> = text.split(':').collect();
        match parts.as_slice() {
            [group, name] if !group.is_empty() && !name.is_empty() => {
                Some(Self::library(*group, *name, ""))
            }
            [group, name, version] if !group.is_empty() && !name.is_empty() => {
                Some(Self::library(*group, *name, *version))
            }
            _ => None,
        }
    }

    /// The string reports are keyed and sorted by.
    pub fn canonical(&self) -> String {
        match self {
            ArtifactIdentity::Project { path } => path.clone(),
            ArtifactIdentity::Library {
                group,
                name,
                version,
            } if version.is_empty() => format!("{}:{}", group, name),
            ArtifactIdentity::Library {
                group,
                name,
                version,
            } => format!("{}:{}:{}", group, name, version),
        }
    }

    pub fn kind(&self) -> ArtifactKind {
        match self {
            ArtifactIdentity::Project { .. } => ArtifactKind::Project,
            ArtifactIdentity::Library { .. } => ArtifactKind::Library,
        }
    }
}

impl fmt::Display for ArtifactIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.canonical())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum IdentityRepr {
    Text(String),
    Tagged(TaggedIdentity),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum TaggedIdentity {
    Project {
        path: String,
    },
    Library {
        group: String,
        name: String,
        #[serde(default)]
        version: String,
    },
}

impl<'de> Deserialize<'de> for ArtifactIdentity {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        match IdentityRepr::deserialize(deserializer)? {
            IdentityRepr::Text(text) => ArtifactIdentity::parse(&text).ok_or_else(|| {
                serde::de::Error::custom(format!("invalid artifact identity `{}`", text))
            }),
            IdentityRepr::Tagged(TaggedIdentity::Project { path }) => {
                Ok(ArtifactIdentity::Project { path })
            }
            IdentityRepr::Tagged(TaggedIdentity::Library {
                group,
                name,
                version,
            }) => Ok(ArtifactIdentity::Library {
                group,
                name,
                version,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArtifactKind {
    Project,
    Library,
}

/// How an artifact ended up on the classpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Declaration {
    /// Listed in the module's own dependency declarations.
    Direct,
    /// Pulled in only through another dependency.
    Transitive,
}

impl fmt::Display for Declaration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Declaration::Direct => write!(f, "direct"),
            Declaration::Transitive => write!(f, "transitive"),
        }
    }
}

/// A resolved dependency as delivered by the build: identity, backing
/// file, and graph metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedArtifact {
    pub identity: ArtifactIdentity,
    /// Jar, class directory, or single class file.
    pub file: PathBuf,
    pub declaration: Declaration,
    /// Identities that pulled this artifact in. Empty when unknown.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parents: Vec<ArtifactIdentity>,
}

/// An artifact together with the symbols it defines.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub identity: ArtifactIdentity,
    pub declaration: Declaration,
    pub parents: Vec<ArtifactIdentity>,
    pub symbols: BTreeSet<Symbol>,
}

impl Artifact {
    pub fn is_direct(&self) -> bool {
        self.declaration == Declaration::Direct
    }
}
