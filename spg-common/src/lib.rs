// spg-common/src/lib.rs
pub mod config;
pub mod dependency;
pub mod error;
pub mod model;
pub mod specfile;

// Re-export key types
pub use config::Config;
pub use dependency::{Dependency, DependencyTag, Requirement, ScopedDependency};
pub use error::{Result, SpgError};
pub use model::{Constraint, PackageSpec, Platform, ResolvedSpec, Source, SpecKind, Version};
