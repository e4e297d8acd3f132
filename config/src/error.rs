//! Error types for configuration resolution.
//!
//! Every variant is fatal: configuration is resolved before any dump or
//! translation work starts.

use thiserror::Error;

/// Errors that can occur while loading or resolving configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Configuration file is not valid YAML or has the wrong shape.
    #[error("YAML error: {0}")]
    YamlError(#[from] serde_yaml::Error),

    /// A required field is absent or empty.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),

    /// Database name cannot be used as an output file stem.
    #[error("invalid database name '{0}': must not be empty or contain path separators")]
    InvalidDatabaseName(String),

    /// A table in the table list is empty or blank.
    #[error("invalid table name '{0}'")]
    InvalidTable(String),
}

/// Convenience alias for results with [`ConfigError`].
pub type Result<T> = std::result::Result<T, ConfigError>;
