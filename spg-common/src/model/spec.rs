use std::fmt;
use std::hash::{Hash, Hasher};

use serde::{Deserialize, Serialize};

use super::{Constraint, Platform, Source, Version};
use crate::dependency::Dependency;

/// How much of a specification has been loaded.
///
/// Only `Fetched` specs carry metadata that can be read without going back to
/// the registry. A `Stub` is an index entry; its runtime requirements are
/// unknown until the full specification is downloaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SpecKind {
    Fetched {
        #[serde(default)]
        required_runtime_version: Option<Constraint>,
        #[serde(default)]
        required_package_manager_version: Option<Constraint>,
    },
    #[default]
    Stub,
}

impl SpecKind {
    pub fn is_fetched(&self) -> bool {
        matches!(self, Self::Fetched { .. })
    }
}

/// One platform-specific build of a package as published by a source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageSpec {
    pub name: String,
    pub version: Version,
    pub platform: Platform,
    pub source: Source,
    #[serde(default)]
    pub dependencies: Vec<Dependency>,
    #[serde(default)]
    pub kind: SpecKind,
}

impl PackageSpec {
    pub fn full_name(&self) -> String {
        format!("{}-{}-{}", self.name, self.version, self.platform)
    }
}

/// A package pinned to a single platform, ready to be written to a lockfile.
///
/// Identity is name, version, platform and source; two platforms that resolve
/// to the same build collapse into one entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolvedSpec {
    pub name: String,
    pub version: Version,
    pub platform: Platform,
    pub source: Source,
    pub dependencies: Vec<Dependency>,
}

impl PartialEq for ResolvedSpec {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.version == other.version
            && self.platform == other.platform
            && self.source == other.source
    }
}

impl Eq for ResolvedSpec {}

impl Hash for ResolvedSpec {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
        self.version.hash(state);
        self.platform.hash(state);
        self.source.hash(state);
    }
}

impl fmt::Display for ResolvedSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}-{})", self.name, self.version, self.platform)
    }
}
