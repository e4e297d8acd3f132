//! Script loaders that materialize a `.sqlite` file from a translated script.
//!
//! Two implementations share the [`ScriptLoader`] trait:
//!
//! - [`Sqlite3Shell`] pipes the script file into the `sqlite3` command-line
//!   shell, exactly as a user would with `sqlite3 db.sqlite < db.sql`.
//! - [`EmbeddedLoader`] executes the script in-process through `rusqlite`,
//!   needing no external binary.
//!
//! Both report SQL failures through [`LoadOutcome`] rather than `Err`, so the
//! caller decides whether a failed load is fatal.

use std::borrow::Cow;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};
use std::time::Duration;

use rusqlite::{Connection, OpenFlags};
use tracing::{debug, info, warn};
use wait_timeout::ChildExt;

use crate::error::{LoadError, Result};

/// Result of feeding one script to a loader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadOutcome {
    pub success: bool,
    /// Process exit code; `None` for the embedded loader or a killed shell.
    pub exit_code: Option<i32>,
    /// Error text from SQLite, when there is any.
    pub message: Option<String>,
}

impl LoadOutcome {
    fn succeeded(exit_code: Option<i32>) -> Self {
        Self {
            success: true,
            exit_code,
            message: None,
        }
    }

    fn failed(exit_code: Option<i32>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            exit_code,
            message: Some(message.into()),
        }
    }
}

/// Loads a SQL script into a SQLite database file.
pub trait ScriptLoader {
    /// Short name recorded in run reports.
    fn name(&self) -> &'static str;

    /// Executes `script` against `database`, creating the file if needed.
    ///
    /// # Errors
    ///
    /// Returns an error only when the load cannot be attempted (missing
    /// script, loader not startable). SQL errors produce an unsuccessful
    /// [`LoadOutcome`].
    fn load(&self, script: &Path, database: &Path) -> Result<LoadOutcome>;
}

/// Runs `sqlite3 -bail <database>` with the script as standard input.
///
/// `-bail` stops at the first failing statement so a broken script yields a
/// non-zero exit status.
#[derive(Debug, Clone)]
pub struct Sqlite3Shell {
    program: PathBuf,
    timeout: Option<Duration>,
}

impl Sqlite3Shell {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
            timeout: None,
        }
    }

    /// Kills the shell if it has not exited after `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn program(&self) -> &Path {
        &self.program
    }
}

impl ScriptLoader for Sqlite3Shell {
    fn name(&self) -> &'static str {
        "sqlite3"
    }

    fn load(&self, script: &Path, database: &Path) -> Result<LoadOutcome> {
        let input = fs::File::open(script)?;
        info!(
            program = %self.program.display(),
            script = %script.display(),
            database = %database.display(),
            "Loading script with sqlite3 shell"
        );

        let mut child = Command::new(&self.program)
            .arg("-bail")
            .arg(database)
            .stdin(Stdio::from(input))
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|source| LoadError::Spawn {
                program: self.program.display().to_string(),
                source,
            })?;

        let stderr_thread = child.stderr.take().map(|pipe| {
            std::thread::spawn(move || {
                let mut buf = Vec::new();
                let mut pipe = pipe;
                let result = pipe.read_to_end(&mut buf);
                (buf, result)
            })
        });

        let status = match self.timeout {
            Some(timeout) => match child.wait_timeout(timeout)? {
                Some(status) => status,
                None => {
                    warn!(
                        timeout_secs = timeout.as_secs(),
                        "sqlite3 timed out, killing process"
                    );
                    let _ = child.kill();
                    let _ = child.wait();
                    return Ok(LoadOutcome::failed(
                        None,
                        format!("sqlite3 timed out after {}s", timeout.as_secs()),
                    ));
                }
            },
            None => child.wait()?,
        };

        let stderr = stderr_thread
            .and_then(|t| t.join().ok())
            .map(|(buf, res)| {
                if let Err(e) = res {
                    debug!(error = %e, "Failed to read sqlite3 stderr");
                }
                String::from_utf8_lossy(&buf).trim().to_string()
            })
            .unwrap_or_default();

        if status.success() {
            Ok(LoadOutcome::succeeded(status.code()))
        } else {
            warn!(exit_code = ?status.code(), stderr = %stderr, "sqlite3 reported a failure");
            let message = if stderr.is_empty() {
                format!("sqlite3 exited with {status}")
            } else {
                stderr
            };
            Ok(LoadOutcome::failed(status.code(), message))
        }
    }
}

/// Executes the script in-process with `rusqlite`.
///
/// The whole script runs inside one transaction: either every statement
/// applies or the database is left without any of them. The script is
/// decoded as UTF-8: invalid sequences become U+FFFD and a warning is
/// logged. [`Sqlite3Shell`] passes bytes through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedLoader;

impl ScriptLoader for EmbeddedLoader {
    fn name(&self) -> &'static str {
        "embedded"
    }

    fn load(&self, script: &Path, database: &Path) -> Result<LoadOutcome> {
        let raw = fs::read(script)?;
        let sql = String::from_utf8_lossy(&raw);
        if let Cow::Owned(_) = sql {
            warn!(
                script = %script.display(),
                "Script is not valid UTF-8; invalid bytes are loaded as U+FFFD (use the sqlite3 shell for byte-exact loads)"
            );
        }
        info!(
            script = %script.display(),
            database = %database.display(),
            bytes = raw.len(),
            "Loading script in-process"
        );

        let mut conn = Connection::open(database)?;
        let tx = conn.transaction()?;
        if let Err(err) = tx.execute_batch(&sql) {
            warn!(error = %err, "Script execution failed, rolling back");
            return Ok(LoadOutcome::failed(None, err.to_string()));
        }
        match tx.commit() {
            Ok(()) => Ok(LoadOutcome::succeeded(None)),
            Err(err) => Ok(LoadOutcome::failed(None, err.to_string())),
        }
    }
}

/// Counts user tables in an existing SQLite database.
///
/// # Errors
///
/// Returns [`DatabaseError`](LoadError::DatabaseError) if the file cannot be
/// opened read-only or is not a SQLite database.
pub fn count_tables(database: &Path) -> Result<usize> {
    let conn = Connection::open_with_flags(database, OpenFlags::SQLITE_OPEN_READ_ONLY)?;
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?;
    Ok(usize::try_from(count).unwrap_or_default())
}
