//! The filter → rewrite → assemble pipeline.

use std::borrow::Cow;
use std::io::{self, BufRead};

use tracing::debug;

use crate::assemble::{Assembler, TranslatedDocument};
use crate::filter::is_disallowed;
use crate::rewrite::{IdentifierQuoting, rewrite_line};

/// Knobs for [`DialectTranslator`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslatorOptions {
    pub quoting: IdentifierQuoting,
}

/// Translates MySQL dump text into SQLite-compatible SQL.
///
/// Stateless apart from its options; one translator can process any number
/// of documents.
///
/// # Examples
///
/// ```
/// use std::io::Cursor;
/// use mysql2sqlite_core::DialectTranslator;
///
/// let dump = Cursor::new("INSERT INTO `people` VALUES (1,'O\\'Brien');\n");
/// let doc = DialectTranslator::default().translate_reader(dump).unwrap();
/// assert_eq!(doc.sql(), b"INSERT INTO \"people\" VALUES (1,'O''Brien');\n");
/// assert_eq!(doc.stats().lines_kept, 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DialectTranslator {
    options: TranslatorOptions,
}

impl DialectTranslator {
    pub fn new(options: TranslatorOptions) -> Self {
        Self { options }
    }

    /// Translates one line, or returns `None` if the filter drops it.
    pub fn translate_line<'a>(&self, line: &'a [u8]) -> Option<Cow<'a, [u8]>> {
        if is_disallowed(line) {
            let text = String::from_utf8_lossy(line);
            debug!(line = %text.trim_end(), "Dropping key declaration");
            return None;
        }
        Some(rewrite_line(line, self.options.quoting))
    }

    /// Streams `reader` line by line through the pipeline.
    ///
    /// # Errors
    ///
    /// Returns the first I/O error raised by `reader`.
    pub fn translate_reader<R: BufRead>(&self, mut reader: R) -> io::Result<TranslatedDocument> {
        let mut assembler = Assembler::new();
        let mut line = Vec::new();
        loop {
            line.clear();
            if reader.read_until(b'\n', &mut line)? == 0 {
                break;
            }
            self.feed(&mut assembler, &line);
        }
        Ok(assembler.finish())
    }

    /// Translates an in-memory dump.
    pub fn translate_bytes(&self, input: &[u8]) -> TranslatedDocument {
        let mut assembler = Assembler::new();
        for line in input.split_inclusive(|b| *b == b'\n') {
            self.feed(&mut assembler, line);
        }
        assembler.finish()
    }

    /// Translates UTF-8 text. Output is UTF-8 whenever the input is.
    pub fn translate_str(&self, input: &str) -> String {
        self.translate_bytes(input.as_bytes()).to_string_lossy()
    }

    fn feed(&self, assembler: &mut Assembler, line: &[u8]) {
        match self.translate_line(line) {
            Some(rewritten) => assembler.push_line(&rewritten),
            None => assembler.skip_line(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn test_translate_line_drops_keys() {
        let translator = DialectTranslator::default();
        assert!(translator.translate_line(b"  UNIQUE KEY \"u\" (\"a\"),\n").is_none());
        assert_eq!(
            translator
                .translate_line(b"  `a` tinyint(1) NOT NULL,\n")
                .as_deref(),
            Some(&b"  \"a\" integer NOT NULL,\n"[..])
        );
    }

    #[test]
    fn test_dropped_final_key_leaves_no_dangling_comma() {
        let dump = "CREATE TABLE \"t\" (\n  \"col1\" int(11),\n  \"col2\" integer,\nKEY \"idx\" (col2)\n);\n";
        assert_eq!(
            DialectTranslator::default().translate_str(dump),
            "CREATE TABLE \"t\" (\n  \"col1\" integer,\n  \"col2\" integer\n);\n"
        );
    }

    #[test]
    fn test_reader_and_bytes_agree() {
        let dump = "CREATE TABLE `a` (\n  `id` int(11) NOT NULL auto_increment,\n  PRIMARY KEY (`id`)\n);\nINSERT INTO `a` VALUES (1);";
        let translator = DialectTranslator::default();
        let from_reader = translator
            .translate_reader(Cursor::new(dump.as_bytes()))
            .unwrap();
        let from_bytes = translator.translate_bytes(dump.as_bytes());
        assert_eq!(from_reader, from_bytes);
        // Final line without a trailing newline is still emitted.
        assert!(from_bytes.sql().ends_with(b"INSERT INTO \"a\" VALUES (1);"));
    }

    #[test]
    fn test_stats_count_every_line() {
        let dump = "CREATE TABLE \"a\" (\n  \"x\" int(1),\n  KEY \"k\" (\"x\"),\n  UNIQUE KEY \"u\" (\"x\")\n);\n";
        let doc = DialectTranslator::default().translate_bytes(dump.as_bytes());
        let stats = doc.stats();
        assert_eq!(stats.lines_read, 5);
        assert_eq!(stats.lines_kept, 3);
        assert_eq!(stats.lines_dropped, 2);
    }

    #[test]
    fn test_empty_input() {
        let doc = DialectTranslator::default().translate_bytes(b"");
        assert!(doc.is_empty());
        assert_eq!(doc.stats().lines_read, 0);
    }

    #[test]
    fn test_strip_quoting_option() {
        let translator = DialectTranslator::new(TranslatorOptions {
            quoting: IdentifierQuoting::Strip,
        });
        assert_eq!(
            translator.translate_str("INSERT INTO `t` (`a`) VALUES (1);\n"),
            "INSERT INTO t (a) VALUES (1);\n"
        );
    }

    #[test]
    fn test_translation_is_idempotent() {
        let dump = "CREATE TABLE `a` (\n  `id` int(10) unsigned NOT NULL auto_increment,\n  `s` enum('x','y') character set utf8 default 'x',\n  PRIMARY KEY  (`id`)\n);\nINSERT INTO `a` VALUES (1,'it\\'s');\n";
        let translator = DialectTranslator::default();
        let once = translator.translate_str(dump);
        assert_eq!(translator.translate_str(&once), once);
    }
}
