use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{Result, SpgError};

/// Wrapper around semver::Version for package versions.
///
/// Registry versions that are not valid semver are normalized first:
/// short forms are padded (`2.7` is `2.7.0`), a packaging revision is dropped
/// (`1.2.3_1` is `1.2.3`), a dotted prerelease becomes a semver prerelease
/// (`1.16.0.rc1` is `1.16.0-rc1`) and numeric components past the third are
/// kept as build metadata (`1.2.3.4` is `1.2.3+4`). Build metadata only breaks
/// ties in ordering, so `1.2.3.4` sorts after `1.2.3` but before `1.2.4`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version(semver::Version);

impl Version {
    pub fn new(major: u64, minor: u64, patch: u64) -> Self {
        Version(semver::Version::new(major, minor, patch))
    }

    pub fn parse(s: &str) -> Result<Self> {
        let trimmed = s.trim();
        semver::Version::parse(trimmed).map(Version).or_else(|_| {
            let normalized = normalize_version(trimmed);
            semver::Version::parse(&normalized).map(Version).map_err(|e| {
                SpgError::VersionError(format!(
                    "Failed to parse version '{s}' (tried '{normalized}'): {e}"
                ))
            })
        })
    }

    pub fn as_semver(&self) -> &semver::Version {
        &self.0
    }
}

/// Pads `1` and `1.2` out to three components.
pub(crate) fn pad_version(s: &str) -> String {
    let parts: Vec<&str> = s.split('.').collect();
    match parts.len() {
        1 => format!("{}.0.0", parts[0]),
        2 => format!("{}.{}.0", parts[0], parts[1]),
        _ => s.to_string(),
    }
}

fn normalize_version(s: &str) -> String {
    let cleaned = s.split('_').next().unwrap_or(s);
    let mut release: Vec<&str> = Vec::new();
    let mut pre: Vec<&str> = Vec::new();
    for segment in cleaned.split('.') {
        if !pre.is_empty() {
            pre.push(segment);
            continue;
        }
        let digits = segment
            .find(|c: char| !c.is_ascii_digit())
            .unwrap_or(segment.len());
        let (number, rest) = segment.split_at(digits);
        if !number.is_empty() {
            release.push(number);
        }
        // `0rc1` and `0-rc1` both start a prerelease
        let rest = rest.trim_start_matches('-');
        if !rest.is_empty() || number.is_empty() {
            pre.push(rest);
        }
    }
    if release.is_empty() {
        return cleaned.to_string();
    }

    let (core, extra) = release.split_at(release.len().min(3));
    let mut normalized = pad_version(&core.join("."));
    if !pre.is_empty() {
        normalized.push('-');
        normalized.push_str(&pre.join("."));
    }
    if !extra.is_empty() {
        normalized.push('+');
        normalized.push_str(&extra.join("."));
    }
    normalized
}

impl FromStr for Version {
    type Err = SpgError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for Version {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D>(deserializer: D) -> std::result::Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Version::from_str(&s).map_err(serde::de::Error::custom)
    }
}

impl From<Version> for semver::Version {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl From<semver::Version> for Version {
    fn from(version: semver::Version) -> Self {
        Version(version)
    }
}
