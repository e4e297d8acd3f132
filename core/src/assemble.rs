//! Document assembly and the cross-line cleanup pass.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::Regex;
use serde::Serialize;
use tracing::info;

/// A trailing comma on the line before a statement's closing `);`.
static DANGLING_COMMA_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r",(\r?\n)\);").expect("static regex must compile"));

/// Line counters for one translation run.
///
/// `lines_kept` is the surviving line count reported to the user. It is
/// informational and never drives control flow.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TranslationStats {
    pub lines_read: usize,
    pub lines_kept: usize,
    pub lines_dropped: usize,
}

/// The complete translated script plus its counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TranslatedDocument {
    sql: Vec<u8>,
    stats: TranslationStats,
}

impl TranslatedDocument {
    pub fn sql(&self) -> &[u8] {
        &self.sql
    }

    pub fn stats(&self) -> TranslationStats {
        self.stats
    }

    pub fn is_empty(&self) -> bool {
        self.sql.is_empty()
    }

    /// The script as text, replacing invalid UTF-8 sequences.
    pub fn to_string_lossy(&self) -> String {
        String::from_utf8_lossy(&self.sql).into_owned()
    }
}

/// Accumulates surviving lines in dump order.
///
/// Lines are appended verbatim, each keeping its own line break; the
/// assembler never inserts separators.
#[derive(Debug, Default)]
pub struct Assembler {
    buffer: Vec<u8>,
    stats: TranslationStats,
}

impl Assembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a rewritten line that survived the filter.
    pub fn push_line(&mut self, line: &[u8]) {
        self.stats.lines_read += 1;
        self.stats.lines_kept += 1;
        self.buffer.extend_from_slice(line);
    }

    /// Records a line the filter dropped.
    pub fn skip_line(&mut self) {
        self.stats.lines_read += 1;
        self.stats.lines_dropped += 1;
    }

    /// Runs [`cleanup_document`] over the buffer and returns the result.
    pub fn finish(self) -> TranslatedDocument {
        let cleaned = match cleanup_document(&self.buffer) {
            Cow::Borrowed(_) => None,
            Cow::Owned(cleaned) => Some(cleaned),
        };
        let sql = cleaned.unwrap_or(self.buffer);
        info!(
            lines_read = self.stats.lines_read,
            lines_kept = self.stats.lines_kept,
            lines_dropped = self.stats.lines_dropped,
            bytes = sql.len(),
            "Assembled translated document"
        );
        TranslatedDocument {
            sql,
            stats: self.stats,
        }
    }
}

/// Removes the comma left dangling before `);` when the last column or key
/// line of a `CREATE TABLE` body was dropped.
///
/// The line break between the comma and `);` is preserved, so
/// `col integer,\n);` becomes `col integer\n);`.
///
/// # Examples
///
/// ```
/// use mysql2sqlite_core::cleanup_document;
///
/// let doc = b"CREATE TABLE t (\n  a integer,\n);\n";
/// assert_eq!(&*cleanup_document(doc), b"CREATE TABLE t (\n  a integer\n);\n");
/// ```
pub fn cleanup_document(document: &[u8]) -> Cow<'_, [u8]> {
    DANGLING_COMMA_RE.replace_all(document, b"${1});".as_slice())
}
