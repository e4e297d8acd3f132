//! SQLite side of a MySQL to SQLite migration.
//!
//! This crate takes a translated `.sql` script and turns it into a `.sqlite`
//! database file. [`Sqlite3Shell`] delegates to the `sqlite3` command-line
//! shell; [`EmbeddedLoader`] runs the script through `rusqlite` without any
//! external binary. Both implement [`ScriptLoader`].
//!
//! # Quick start
//!
//! ```no_run
//! use std::path::Path;
//! use std::time::Duration;
//! use mysql2sqlite_sqlite::{ScriptLoader, Sqlite3Shell, count_tables};
//!
//! let shell = Sqlite3Shell::new("sqlite3").with_timeout(Duration::from_secs(600));
//! let outcome = shell
//!     .load(Path::new("shop.sql"), Path::new("shop.sqlite"))
//!     .unwrap();
//! if outcome.success {
//!     println!("{} tables", count_tables(Path::new("shop.sqlite")).unwrap());
//! }
//! ```

mod error;
mod loader;

pub use error::{LoadError, Result};
pub use loader::{EmbeddedLoader, LoadOutcome, ScriptLoader, Sqlite3Shell, count_tables};
