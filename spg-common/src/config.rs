// spg-common/src/config.rs
use std::env;

use tracing::debug;

use super::error::{Result, SpgError};
use crate::model::Platform;

/// Name of the resolver's own package when none is configured.
pub const DEFAULT_FRAMEWORK_PACKAGE: &str = "bundler";

const FRAMEWORK_PACKAGE_VAR: &str = "SPG_FRAMEWORK_PACKAGE";
const INCLUDE_FRAMEWORK_DEPS_VAR: &str = "SPG_INCLUDE_FRAMEWORK_DEPS";
const PLATFORM_VAR: &str = "SPG_PLATFORM";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Package whose edges are dropped while `ignores_framework_dependencies` holds.
    pub framework_package: String,
    pub ignores_framework_dependencies: bool,
    /// Platform override; `None` means detect the host.
    pub platform: Option<Platform>,
}

impl Config {
    pub fn load() -> Result<Self> {
        debug!("Loading spg configuration");
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup instead of the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let framework_package = lookup(FRAMEWORK_PACKAGE_VAR)
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| {
                debug!(
                    "{} not set or empty, falling back to default: {}",
                    FRAMEWORK_PACKAGE_VAR, DEFAULT_FRAMEWORK_PACKAGE
                );
                DEFAULT_FRAMEWORK_PACKAGE.to_string()
            });

        let ignores_framework_dependencies = match lookup(INCLUDE_FRAMEWORK_DEPS_VAR) {
            Some(value) => !parse_bool(INCLUDE_FRAMEWORK_DEPS_VAR, &value)?,
            None => true,
        };

        let platform = lookup(PLATFORM_VAR)
            .filter(|s| !s.trim().is_empty())
            .map(|tag| Platform::new(&tag))
            .transpose()
            .map_err(|e| SpgError::Config(format!("Invalid {PLATFORM_VAR}: {e}")))?;

        debug!("Configuration loaded successfully.");
        Ok(Self {
            framework_package: framework_package.trim().to_string(),
            ignores_framework_dependencies,
            platform,
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            framework_package: DEFAULT_FRAMEWORK_PACKAGE.to_string(),
            ignores_framework_dependencies: true,
            platform: None,
        }
    }
}

fn parse_bool(key: &str, value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(SpgError::Config(format!(
            "{key} must be a boolean, got '{other}'"
        ))),
    }
}
