//! `mysqldump` invocation with streaming translation of its output.
//!
//! The dump runs in compact, ANSI-compatible, one-row-per-`INSERT` mode with
//! the binary character set, which yields a line stream the translator can
//! handle one line at a time. Stdout is consumed as it is produced; stderr
//! is drained on a background thread so a chatty dump cannot fill its pipe
//! and stall.

use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};

use mysql2sqlite_config::MigrationConfig;
use mysql2sqlite_core::{DialectTranslator, TranslatedDocument};
use tracing::{debug, info, warn};

use crate::error::{DumpError, Result};

/// Flags passed to every dump, in order.
pub const DUMP_FLAGS: &[&str] = &[
    "--compact",
    "--compatible=ansi",
    "--complete-insert",
    "--skip-extended-insert",
    "--default-character-set=binary",
];

/// Environment variable `mysqldump` reads the password from.
pub const PASSWORD_ENV: &str = "MYSQL_PWD";

/// A fully prepared `mysqldump` invocation.
///
/// # Examples
///
/// ```
/// use mysql2sqlite_config::{CommandLineConfig, ConfigSource};
/// use mysql2sqlite_dump::DumpCommand;
///
/// let config = ConfigSource::CommandLine(CommandLineConfig {
///     database: Some("shop".into()),
///     username: Some("root".into()),
///     tables: vec!["orders".into()],
///     ..Default::default()
/// })
/// .resolve()
/// .unwrap();
///
/// let dump = DumpCommand::from_config(&config);
/// assert_eq!(dump.args().first().map(String::as_str), Some("-u"));
/// assert_eq!(dump.args().last().map(String::as_str), Some("orders"));
/// ```
#[derive(Clone)]
pub struct DumpCommand {
    program: PathBuf,
    args: Vec<String>,
    password: Option<String>,
}

impl DumpCommand {
    /// Builds the invocation for `config`.
    ///
    /// The password never appears in the argument list; it is handed to the
    /// child through [`PASSWORD_ENV`].
    pub fn from_config(config: &MigrationConfig) -> Self {
        let mut args = vec!["-u".to_string(), config.username().to_string()];
        if let Some(host) = config.host() {
            args.push("-h".to_string());
            args.push(host.to_string());
        }
        if let Some(port) = config.port() {
            args.push("-P".to_string());
            args.push(port.to_string());
        }
        args.extend(DUMP_FLAGS.iter().map(|flag| flag.to_string()));
        args.push(config.database().to_string());
        args.extend(config.tables().iter().cloned());

        Self {
            program: config.tools().mysqldump.clone(),
            args,
            password: config.password().map(str::to_string),
        }
    }

    pub fn program(&self) -> &Path {
        &self.program
    }

    pub fn args(&self) -> &[String] {
        &self.args
    }

    /// The invocation as a single space-separated string, for progress output.
    pub fn to_command_line(&self) -> String {
        std::iter::once(self.program.display().to_string())
            .chain(self.args.iter().cloned())
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn command(&self) -> Command {
        let mut command = Command::new(&self.program);
        command
            .args(&self.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(password) = &self.password {
            command.env(PASSWORD_ENV, password);
        }
        command
    }

    /// Runs the dump, translating stdout line by line as it arrives.
    ///
    /// # Errors
    ///
    /// Returns [`Spawn`](DumpError::Spawn) if the program cannot be started
    /// and [`Read`](DumpError::Read) if reading its output fails. A non-zero
    /// exit status is reported through [`DumpOutcome::success`] instead.
    pub fn run(&self, translator: &DialectTranslator) -> Result<DumpOutcome> {
        info!(
            program = %self.program.display(),
            args = ?self.args,
            "Starting dump"
        );
        let mut child = self.command().spawn().map_err(|source| DumpError::Spawn {
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

        let Some(stdout) = child.stdout.take() else {
            let _ = child.kill();
            let _ = child.wait();
            return Err(DumpError::MissingStdout);
        };

        let document = match translator.translate_reader(BufReader::new(stdout)) {
            Ok(document) => document,
            Err(source) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(DumpError::Read(source));
            }
        };

        let status = child.wait()?;
        let stderr = stderr_thread
            .and_then(|t| t.join().ok())
            .map(|(buf, res)| {
                if let Err(e) = res {
                    debug!(error = %e, "Failed to read dump stderr");
                }
                String::from_utf8_lossy(&buf).trim().to_string()
            })
            .unwrap_or_default();

        let outcome = DumpOutcome::new(document, status, stderr);
        if outcome.success {
            info!(
                lines_kept = outcome.document.stats().lines_kept,
                "Dump finished"
            );
        } else {
            warn!(
                exit_code = ?outcome.exit_code,
                stderr = %outcome.stderr,
                "Dump exited unsuccessfully; continuing with partial output"
            );
        }
        Ok(outcome)
    }
}

impl std::fmt::Debug for DumpCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DumpCommand")
            .field("program", &self.program)
            .field("args", &self.args)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// Result of one dump run: the translated document plus process status.
#[derive(Debug, Clone)]
pub struct DumpOutcome {
    pub document: TranslatedDocument,
    pub exit_code: Option<i32>,
    pub success: bool,
    /// Trimmed stderr output, lossily decoded.
    pub stderr: String,
}

impl DumpOutcome {
    fn new(document: TranslatedDocument, status: ExitStatus, stderr: String) -> Self {
        Self {
            document,
            exit_code: status.code(),
            success: status.success(),
            stderr,
        }
    }
}
