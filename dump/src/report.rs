//! Structured summary of one migration run.

use std::path::Path;

use mysql2sqlite_core::TranslationStats;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::mysqldump::DumpOutcome;
use crate::output::WrittenScript;

/// Dump process status and translation counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DumpSummary {
    pub command: String,
    pub exit_code: Option<i32>,
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stderr: Option<String>,
    pub lines_read: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
}

impl DumpSummary {
    pub fn new(command: String, outcome: &DumpOutcome) -> Self {
        let TranslationStats {
            lines_read,
            lines_kept,
            lines_dropped,
        } = outcome.document.stats();
        Self {
            command,
            exit_code: outcome.exit_code,
            success: outcome.success,
            stderr: Some(outcome.stderr.clone()).filter(|s| !s.is_empty()),
            lines_read,
            lines_kept,
            lines_dropped,
        }
    }
}

/// Loader result as recorded in the report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadSummary {
    pub loader: String,
    pub success: bool,
    pub exit_code: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_count: Option<usize>,
}

/// Full record of a run, suitable for `--report` JSON output.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    pub tool_version: String,
    pub database: String,
    pub tables: Vec<String>,
    pub sql_path: String,
    pub sqlite_path: String,
    pub started_at: String,
    pub finished_at: String,
    pub dump: DumpSummary,
    pub script_bytes: usize,
    pub script_sha256: String,
    pub load: LoadSummary,
    /// Mirrors `load.success`: the loader decides overall success.
    pub success: bool,
}

impl RunReport {
    /// Assembles the report; `finished_at` is stamped now.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tool_version: &str,
        database: &str,
        tables: &[String],
        sql_path: &Path,
        sqlite_path: &Path,
        started_at: String,
        dump: DumpSummary,
        script: &WrittenScript,
        load: LoadSummary,
    ) -> Self {
        Self {
            tool_version: tool_version.to_string(),
            database: database.to_string(),
            tables: tables.to_vec(),
            sql_path: sql_path.display().to_string(),
            sqlite_path: sqlite_path.display().to_string(),
            started_at,
            finished_at: now_rfc3339(),
            success: load.success,
            dump,
            script_bytes: script.bytes,
            script_sha256: script.sha256.clone(),
            load,
        }
    }

    /// Writes the report as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::DumpError::IoError) or
    /// [`JsonError`](crate::DumpError::JsonError) on failure.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let raw = serde_json::to_string_pretty(self)?;
        std::fs::write(path, raw)?;
        Ok(())
    }
}

/// Current UTC time in RFC 3339 form.
pub fn now_rfc3339() -> String {
    chrono::Utc::now().to_rfc3339()
}
