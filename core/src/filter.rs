//! Line filter for key declarations SQLite cannot take inline.

/// Substrings that mark a line as an index/key declaration.
///
/// Matching is case-sensitive: `mysqldump` always emits these keywords in
/// upper case, and the lowercase ` primary key` produced by the rewriter for
/// `auto_increment` columns must never trip the filter.
pub const DISALLOWED_MARKERS: &[&[u8]] = &[b"KEY \"", b"UNIQUE KEY ", b"PRIMARY KEY "];

/// Returns `true` if `line` must be dropped from the translated output.
///
/// A line is dropped when it declares a named key (`KEY "idx_name" (...)`), a
/// unique key, or a primary key written as a separate constraint clause.
///
/// # Examples
///
/// ```
/// use mysql2sqlite_core::is_disallowed;
///
/// assert!(is_disallowed(b"  KEY \"idx_email\" (\"email\"),\n"));
/// assert!(is_disallowed(b"  PRIMARY KEY (\"id\")\n"));
/// assert!(!is_disallowed(b"  \"email\" varchar(255) NOT NULL,\n"));
/// ```
pub fn is_disallowed(line: &[u8]) -> bool {
    DISALLOWED_MARKERS
        .iter()
        .any(|marker| contains_subslice(line, marker))
}

fn contains_subslice(haystack: &[u8], needle: &[u8]) -> bool {
    needle.len() <= haystack.len() && haystack.windows(needle.len()).any(|w| w == needle)
}
