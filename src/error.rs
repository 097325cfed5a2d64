use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for pkg-release operations
#[derive(Error, Debug)]
pub enum ReleaseError {
    #[error("Command failed: {command} (exit code {code})\n{stderr}")]
    CommandFailed {
        command: String,
        code: i32,
        stderr: String,
    },

    #[error("Invalid version format: '{0}'")]
    InvalidVersionFormat(String),

    #[error("No line declaring '{identifier}' found in {}", path.display())]
    VersionNotFound { path: PathBuf, identifier: String },

    #[error("More than one line declares '{identifier}' in {}", path.display())]
    AmbiguousVersion { path: PathBuf, identifier: String },

    #[error("Changelog already contains an entry for {0}")]
    DuplicateTag(String),

    #[error("Unexpected changelog layout in {}: {reason}", path.display())]
    ChangelogLayout { path: PathBuf, reason: String },

    #[error("Aborted by user: {0}")]
    UserAborted(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for Results in pkg-release
pub type Result<T> = std::result::Result<T, ReleaseError>;

impl ReleaseError {
    /// Create a configuration error with context
    pub fn config(msg: impl Into<String>) -> Self {
        ReleaseError::Config(msg.into())
    }

    /// Create an invalid version error for the offending text
    pub fn invalid_version(text: impl Into<String>) -> Self {
        ReleaseError::InvalidVersionFormat(text.into())
    }

    /// Create an abort error describing what the operator declined
    pub fn aborted(msg: impl Into<String>) -> Self {
        ReleaseError::UserAborted(msg.into())
    }
}

impl From<toml::de::Error> for ReleaseError {
    fn from(err: toml::de::Error) -> Self {
        ReleaseError::Config(err.to_string())
    }
}
