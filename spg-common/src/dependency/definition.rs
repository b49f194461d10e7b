use std::fmt;

use bitflags::bitflags;
use serde::{Deserialize, Serialize};

use crate::model::Constraint;

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
    pub struct DependencyTag: u8 {
        const RUNTIME     = 0b00000001;
        const BUILD       = 0b00000010;
        const TEST        = 0b00000100;
        const DEVELOPMENT = 0b00001000;
        const OPTIONAL    = 0b00010000;
    }
}

impl Default for DependencyTag {
    fn default() -> Self {
        Self::RUNTIME
    }
}

impl fmt::Display for DependencyTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

/// A dependency as declared by a package specification.
///
/// The constraint is platform independent; the platform a dependency applies
/// to is attached later by wrapping it in a `ScopedDependency`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    pub name: String,
    #[serde(default)]
    pub tags: DependencyTag,
    #[serde(default)]
    pub constraint: Constraint,
}

impl Dependency {
    pub fn new_runtime(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            tags: DependencyTag::RUNTIME,
            constraint,
        }
    }

    pub fn new_development(name: impl Into<String>, constraint: Constraint) -> Self {
        Self {
            name: name.into(),
            tags: DependencyTag::DEVELOPMENT,
            constraint,
        }
    }

    pub fn new_with_tags(
        name: impl Into<String>,
        tags: DependencyTag,
        constraint: Constraint,
    ) -> Self {
        Self {
            name: name.into(),
            tags,
            constraint,
        }
    }

    pub fn is_development(&self) -> bool {
        self.tags.contains(DependencyTag::DEVELOPMENT)
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.constraint.is_any() {
            write!(f, "{}", self.name)
        } else {
            write!(f, "{} ({})", self.name, self.constraint)
        }
    }
}

pub trait DependencyExt {
    fn non_development(&self) -> Vec<&Dependency>;
}

impl DependencyExt for [Dependency] {
    fn non_development(&self) -> Vec<&Dependency> {
        self.iter().filter(|dep| !dep.is_development()).collect()
    }
}
