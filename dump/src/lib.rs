//! Dump side of a MySQL to SQLite migration.
//!
//! [`DumpCommand`] builds and runs the `mysqldump` invocation described by a
//! [`MigrationConfig`](mysql2sqlite_config::MigrationConfig), streaming its
//! output through a [`DialectTranslator`](mysql2sqlite_core::DialectTranslator).
//! [`write_script`] persists the translated document and [`RunReport`]
//! records what happened.
//!
//! # Example
//!
//! ```no_run
//! use mysql2sqlite_config::{CommandLineConfig, ConfigSource};
//! use mysql2sqlite_core::DialectTranslator;
//! use mysql2sqlite_dump::{DumpCommand, write_script};
//!
//! let config = ConfigSource::CommandLine(CommandLineConfig {
//!     database: Some("shop".into()),
//!     username: Some("root".into()),
//!     ..Default::default()
//! })
//! .resolve()
//! .unwrap();
//!
//! let outcome = DumpCommand::from_config(&config)
//!     .run(&DialectTranslator::default())
//!     .unwrap();
//! if !outcome.success {
//!     eprintln!("mysqldump failed: {}", outcome.stderr);
//! }
//! write_script(&config.sql_path(), outcome.document.sql()).unwrap();
//! ```

mod error;
mod mysqldump;
mod output;
mod report;

pub use error::{DumpError, Result};
pub use mysqldump::{DUMP_FLAGS, DumpCommand, DumpOutcome, PASSWORD_ENV};
pub use output::{WrittenScript, sha256_hex, write_script};
pub use report::{DumpSummary, LoadSummary, RunReport, now_rfc3339};
