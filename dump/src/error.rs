//! Error types for dump invocation and script persistence.

use thiserror::Error;

/// Errors that can occur while dumping, translating, or writing a script.
///
/// A dump process that starts but exits non-zero is *not* an error; its
/// status is carried in [`DumpOutcome`](crate::DumpOutcome) so the caller
/// decides how to proceed.
#[derive(Debug, Error)]
pub enum DumpError {
    /// The dump program could not be started (usually not installed).
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// The child process was started without a stdout pipe.
    #[error("dump process has no stdout pipe")]
    MissingStdout,

    /// Reading the dump output failed part way through.
    #[error("failed to read dump output: {0}")]
    Read(#[source] std::io::Error),

    /// File I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Report serialization failure.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

/// Convenience alias for results with [`DumpError`].
pub type Result<T> = std::result::Result<T, DumpError>;
