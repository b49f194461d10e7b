// spg-core/src/lib.rs

// Declare the top-level modules within the library crate
pub mod group;
pub mod platform;

// Re-export key types for easier use by the CLI crate
pub use group::{CandidateGroup, GroupOptions};
pub use platform::{current_platform, CompatibilityMatcher, MatchRank, PlatformMatcher};
