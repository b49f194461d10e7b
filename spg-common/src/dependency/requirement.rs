use std::fmt;

use serde::{Deserialize, Serialize};

use super::Dependency;
use crate::model::{Constraint, Platform};

/// What a dependency edge points at.
///
/// `Runtime` and `PackageManager` are pseudo-packages: they let a solver treat
/// "needs runtime >= X" like any other edge, without reserving package names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Requirement {
    Package(Dependency),
    Runtime(Constraint),
    PackageManager(Constraint),
}

impl Requirement {
    pub fn constraint(&self) -> &Constraint {
        match self {
            Self::Package(dep) => &dep.constraint,
            Self::Runtime(c) | Self::PackageManager(c) => c,
        }
    }

    /// Name of the package this edge targets, `None` for pseudo-packages.
    pub fn package_name(&self) -> Option<&str> {
        match self {
            Self::Package(dep) => Some(&dep.name),
            Self::Runtime(_) | Self::PackageManager(_) => None,
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Package(dep) => write!(f, "{dep}"),
            Self::Runtime(c) => write!(f, "runtime ({c})"),
            Self::PackageManager(c) => write!(f, "package manager ({c})"),
        }
    }
}

/// A requirement together with the platform it applies to.
///
/// The same package can constrain a dependency differently per platform, so
/// edges are never shared across platforms.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScopedDependency {
    pub requirement: Requirement,
    pub platform: Platform,
}

impl ScopedDependency {
    pub fn new(requirement: Requirement, platform: Platform) -> Self {
        Self {
            requirement,
            platform,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.requirement.package_name()
    }
}

impl fmt::Display for ScopedDependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.requirement, self.platform)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_pseudo_packages() {
        let platform = Platform::new("arm64_sonoma").unwrap();
        let edge = ScopedDependency::new(
            Requirement::Runtime(Constraint::parse(">= 2.7").unwrap()),
            platform,
        );
        assert_eq!(edge.to_string(), "runtime (>= 2.7) [arm64_sonoma]");
        assert_eq!(edge.name(), None);
    }

    #[test]
    fn package_edges_expose_name() {
        let dep = Dependency::new_runtime("rake", Constraint::parse("~> 13.0").unwrap());
        let req = Requirement::Package(dep);
        assert_eq!(req.package_name(), Some("rake"));
        assert_eq!(req.to_string(), "rake (~> 13.0)");
    }
}
