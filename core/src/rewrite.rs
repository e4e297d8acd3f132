//! Ordered substitution rules mapping MySQL column vocabulary to SQLite.
//!
//! Each [`RewriteRule`] is a pure, global-within-line substitution. Rules
//! operate on bytes so that dumps taken with `--default-character-set=binary`
//! pass through without a UTF-8 round trip. All patterns are compiled with
//! Unicode disabled (`-u`), so character classes match arbitrary bytes and
//! case folding is ASCII only.
//!
//! The whole set is idempotent: applying [`rewrite_line`] to its own output
//! changes nothing.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::bytes::{Captures, NoExpand, Regex};

/// How double-quoted identifiers are emitted after backtick conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentifierQuoting {
    /// Keep `"identifier"` quoting (SQLite accepts it).
    #[default]
    Keep,
    /// Remove every `"` from the line, including ones inside string data.
    Strip,
}

#[derive(Debug, Clone, Copy)]
enum Replacement {
    Literal(&'static [u8]),
    /// `\'` becomes `''`; an escaped backslash is copied unchanged.
    BackslashEscapes,
}

/// One named substitution applied to every match within a line.
#[derive(Debug)]
pub struct RewriteRule {
    name: &'static str,
    pattern: Regex,
    replacement: Replacement,
}

impl RewriteRule {
    fn new(name: &'static str, pattern: &str, replacement: &'static [u8]) -> Self {
        Self::with(name, pattern, Replacement::Literal(replacement))
    }

    fn with(name: &'static str, pattern: &str, replacement: Replacement) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("static regex must compile"),
            replacement,
        }
    }

    /// Short identifier used in logs and tests.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Replaces every match in `line`. Borrows when nothing matched.
    pub fn apply<'a>(&self, line: &'a [u8]) -> Cow<'a, [u8]> {
        match self.replacement {
            Replacement::Literal(bytes) => self.pattern.replace_all(line, NoExpand(bytes)),
            Replacement::BackslashEscapes => {
                if !line.windows(2).any(|pair| pair == b"\\'") {
                    return Cow::Borrowed(line);
                }
                self.pattern
                    .replace_all(line, |caps: &Captures<'_>| -> &'static [u8] {
                        if &caps[0] == b"\\'" {
                            b"''"
                        } else {
                            b"\\\\"
                        }
                    })
            }
        }
    }
}

static RULES: LazyLock<Vec<RewriteRule>> = LazyLock::new(|| {
    vec![
        // SQLite has no unsigned integer types.
        RewriteRule::new("unsigned", r"(?i-u)\bunsigned[ \t]+", b""),
        // An INTEGER PRIMARY KEY column is SQLite's auto-increment rowid alias.
        RewriteRule::new("auto_increment", r"(?i-u)auto_increment", b" primary key"),
        RewriteRule::new(
            "integer_width",
            r"(?i-u)\b(?:tiny|small|medium|big)?int\([0-9]*\)",
            b"integer",
        ),
        RewriteRule::new("character_set", r"(?i-u)character set \w+", b""),
        RewriteRule::new("enum", r"(?i-u)\benum\([^)]*\)", b"varchar(255)"),
        // Stops at the end of the line so a last-column clause keeps its newline.
        RewriteRule::new("on_update", r"(?i-u)on update [^,\r\n]*", b""),
        RewriteRule::new("collate", r"(?i-u)collate \w+", b""),
        RewriteRule::new("backtick", r"`", b"\""),
        // Escapes are consumed left to right so `\\'` (a value ending in a
        // backslash) keeps its closing quote.
        RewriteRule::with(
            "escaped_quote",
            r"\\\\|\\'",
            Replacement::BackslashEscapes,
        ),
    ]
});

/// The ordered rule set applied by [`rewrite_line`].
pub fn rules() -> &'static [RewriteRule] {
    &RULES
}

/// Runs every rule over `line` in order, then applies `quoting`.
///
/// # Examples
///
/// ```
/// use mysql2sqlite_core::{IdentifierQuoting, rewrite_line};
///
/// let out = rewrite_line(b"`id` int(11) NOT NULL auto_increment,\n", IdentifierQuoting::Keep);
/// assert_eq!(&*out, b"\"id\" integer NOT NULL  primary key,\n");
/// ```
pub fn rewrite_line(line: &[u8], quoting: IdentifierQuoting) -> Cow<'_, [u8]> {
    let mut current = Cow::Borrowed(line);
    for rule in rules() {
        let next = match rule.apply(&current) {
            Cow::Borrowed(_) => continue,
            Cow::Owned(next) => next,
        };
        current = Cow::Owned(next);
    }

    if quoting == IdentifierQuoting::Strip && current.contains(&b'"') {
        current = Cow::Owned(current.iter().copied().filter(|b| *b != b'"').collect());
    }
    current
}
