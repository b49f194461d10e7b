use std::sync::Arc;

use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum SpgError {
    #[error("I/O Error: {0}")]
    Io(#[from] Arc<std::io::Error>),

    #[error("JSON Parsing Error: {0}")]
    Json(#[from] Arc<serde_json::Error>),

    #[error("Semantic Versioning Error: {0}")]
    SemVer(#[from] Arc<semver::Error>),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Configuration Error: {0}")]
    Config(String),

    #[error("Version error: {0}")]
    VersionError(String),

    #[error("Constraint error: {0}")]
    ConstraintError(String),

    #[error("Platform error: {0}")]
    PlatformError(String),
}

impl From<std::io::Error> for SpgError {
    fn from(err: std::io::Error) -> Self {
        SpgError::Io(Arc::new(err))
    }
}

impl From<serde_json::Error> for SpgError {
    fn from(err: serde_json::Error) -> Self {
        SpgError::Json(Arc::new(err))
    }
}

impl From<semver::Error> for SpgError {
    fn from(err: semver::Error) -> Self {
        SpgError::SemVer(Arc::new(err))
    }
}

pub type Result<T> = std::result::Result<T, SpgError>;
