use std::fmt;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Where a package specification came from.
///
/// Opaque to the resolver beyond equality; two specs with the same name and
/// version from different sources are different candidates.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Source {
    Registry { url: String },
    Git { url: String, revision: String },
    Path { path: PathBuf },
}

impl Source {
    pub fn registry(url: impl Into<String>) -> Self {
        Self::Registry { url: url.into() }
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Registry { url } => write!(f, "registry {url}"),
            Self::Git { url, revision } => write!(f, "git {url} ({revision})"),
            Self::Path { path } => write!(f, "path {}", path.display()),
        }
    }
}
