// Declares the modules within the model directory.
pub mod constraint;
pub mod platform;
pub mod source;
pub mod spec;
pub mod version;

// Re-export
pub use constraint::Constraint;
pub use platform::{Arch, Os, Platform, PlatformKind};
pub use source::Source;
pub use spec::{PackageSpec, ResolvedSpec, SpecKind};
pub use version::Version;
