//! MySQL dump to SQLite dialect translation.
//!
//! This crate turns the line stream produced by
//! `mysqldump --compact --compatible=ansi` into a script SQLite accepts. It is
//! not a SQL parser: every decision is made on the literal text
//! of one line, except for a single cleanup pass over the assembled document.
//!
//! The pipeline has three stages:
//!
//! - [`is_disallowed`]: drops index/key declaration lines SQLite does not
//!   accept inline inside `CREATE TABLE`.
//! - [`RewriteRule`] / [`rewrite_line`]: ordered, idempotent substitutions
//!   mapping column types and modifiers to SQLite vocabulary.
//! - [`Assembler`]: joins surviving lines in order and removes the dangling
//!   comma a dropped final key line leaves before `);`.
//!
//! [`DialectTranslator`] wires the three together.
//!
//! # Example
//!
//! ```
//! use mysql2sqlite_core::DialectTranslator;
//!
//! let dump = "CREATE TABLE \"users\" (\n  \"id\" int(11) NOT NULL auto_increment,\n  PRIMARY KEY (\"id\")\n);\n";
//! let sql = DialectTranslator::default().translate_str(dump);
//! assert_eq!(
//!     sql,
//!     "CREATE TABLE \"users\" (\n  \"id\" integer NOT NULL  primary key\n);\n"
//! );
//! ```

mod assemble;
mod filter;
mod rewrite;
mod translator;

pub use assemble::{Assembler, TranslatedDocument, TranslationStats, cleanup_document};
pub use filter::{DISALLOWED_MARKERS, is_disallowed};
pub use rewrite::{IdentifierQuoting, RewriteRule, rewrite_line, rules};
pub use translator::{DialectTranslator, TranslatorOptions};
