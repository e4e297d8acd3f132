//! Error types for SQLite loading.
//!
//! SQL failures inside a script are not errors; they surface as an
//! unsuccessful [`LoadOutcome`](crate::LoadOutcome). These variants cover
//! the cases where loading could not be attempted at all.

use thiserror::Error;

/// Errors that prevent a load from running.
#[derive(Debug, Error)]
pub enum LoadError {
    /// SQLite database operation failure outside script execution.
    #[error("database error: {0}")]
    DatabaseError(#[from] rusqlite::Error),

    /// Script file or database path I/O failure.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// The `sqlite3` shell could not be started.
    #[error("failed to start '{program}': {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience alias for results with [`LoadError`].
pub type Result<T> = std::result::Result<T, LoadError>;
