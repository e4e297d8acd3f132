//! Persisting the translated script.

use std::fs;
use std::io::Write;
use std::path::Path;

use sha2::{Digest, Sha256};
use tracing::info;

use crate::error::Result;

/// Size and digest of a script written by [`write_script`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrittenScript {
    pub bytes: usize,
    pub sha256: String,
}

/// Writes `sql` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`IoError`](crate::DumpError::IoError) if the directory or file
/// cannot be created or written.
pub fn write_script(path: &Path, sql: &[u8]) -> Result<WrittenScript> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let mut file = fs::File::create(path)?;
    file.write_all(sql)?;
    file.flush()?;

    let written = WrittenScript {
        bytes: sql.len(),
        sha256: sha256_hex(sql),
    };
    info!(path = %path.display(), bytes = written.bytes, "Wrote translated script");
    Ok(written)
}

/// Lowercase hex SHA-256 of `bytes`.
pub fn sha256_hex(bytes: &[u8]) -> String {
    format!("{:x}", Sha256::digest(bytes))
}
