use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpgError};

/// Tag of the build that runs everywhere.
pub const UNIVERSAL_TAG: &str = "all";

/// Known macOS release names, newest first.
pub const MACOS_RELEASES: &[&str] = &[
    "sequoia",
    "sonoma",
    "ventura",
    "monterey",
    "big_sur",
    "catalina",
    "mojave",
    "high_sierra",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Arch {
    Arm64,
    X86_64,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Os {
    /// A named macOS release from [`MACOS_RELEASES`].
    MacOS(String),
    Linux,
    Other(String),
}

impl Os {
    /// Position of a macOS release in [`MACOS_RELEASES`]; larger is older.
    pub fn macos_age(&self) -> Option<usize> {
        match self {
            Os::MacOS(name) => MACOS_RELEASES.iter().position(|r| *r == name.as_str()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PlatformKind {
    Universal,
    Native { arch: Arch, os: Os },
}

/// A platform tag such as `arm64_sonoma`, `sonoma` (Intel), `x86_64_linux` or `all`.
///
/// `x86_64_<release>` is accepted for Intel macOS and stored as `<release>`.
/// Equality, hashing and ordering use the tag string only.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Platform {
    tag: String,
    kind: PlatformKind,
}

impl Platform {
    pub fn new(tag: &str) -> Result<Self> {
        let tag = tag.trim();
        if tag.is_empty() {
            return Err(SpgError::PlatformError(
                "Platform tag must not be empty".to_string(),
            ));
        }
        if tag.chars().any(char::is_whitespace) {
            return Err(SpgError::PlatformError(format!(
                "Platform tag '{tag}' must not contain whitespace"
            )));
        }
        let tag = canonical_tag(tag);
        Ok(Self {
            tag: tag.to_string(),
            kind: parse_kind(tag),
        })
    }

    pub fn universal() -> Self {
        Self {
            tag: UNIVERSAL_TAG.to_string(),
            kind: PlatformKind::Universal,
        }
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn kind(&self) -> &PlatformKind {
        &self.kind
    }

    pub fn is_universal(&self) -> bool {
        self.kind == PlatformKind::Universal
    }

    pub fn arch(&self) -> Option<&Arch> {
        match &self.kind {
            PlatformKind::Native { arch, .. } => Some(arch),
            PlatformKind::Universal => None,
        }
    }

    pub fn os(&self) -> Option<&Os> {
        match &self.kind {
            PlatformKind::Native { os, .. } => Some(os),
            PlatformKind::Universal => None,
        }
    }
}

// Intel macOS builds are tagged with the bare release name
fn canonical_tag(tag: &str) -> &str {
    match tag.strip_prefix("x86_64_") {
        Some(release) if MACOS_RELEASES.contains(&release) => release,
        _ => tag,
    }
}

fn parse_kind(tag: &str) -> PlatformKind {
    if tag == UNIVERSAL_TAG {
        return PlatformKind::Universal;
    }
    let (arch, os_name) = if let Some(rest) = tag.strip_prefix("arm64_") {
        (Some(Arch::Arm64), rest)
    } else if let Some(rest) = tag.strip_prefix("x86_64_") {
        (Some(Arch::X86_64), rest)
    } else {
        (None, tag)
    };
    let os = if os_name == "linux" {
        Os::Linux
    } else if MACOS_RELEASES.contains(&os_name) {
        Os::MacOS(os_name.to_string())
    } else {
        Os::Other(os_name.to_string())
    };
    // Intel macOS builds carry the bare release name
    let arch = arch.unwrap_or(match os {
        Os::MacOS(_) => Arch::X86_64,
        _ => Arch::Unknown,
    });
    PlatformKind::Native { arch, os }
}

impl PartialEq for Platform {
    fn eq(&self, other: &Self) -> bool {
        self.tag == other.tag
    }
}

impl Eq for Platform {}

impl Hash for Platform {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.tag.hash(state);
    }
}

impl Ord for Platform {
    fn cmp(&self, other: &Self) -> Ordering {
        self.tag.cmp(&other.tag)
    }
}

impl PartialOrd for Platform {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.tag)
    }
}

impl FromStr for Platform {
    type Err = SpgError;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Platform::new(s)
    }
}

impl TryFrom<String> for Platform {
    type Error = SpgError;
    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        Platform::new(&value)
    }
}

impl From<Platform> for String {
    fn from(platform: Platform) -> Self {
        platform.tag
    }
}
