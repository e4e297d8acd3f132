//! Configuration for MySQL to SQLite migration runs.
//!
//! A run needs a database name, a username, and optionally a password, host,
//! port, explicit table list, overwrite flag, output directory, and tool
//! locations. These arrive either as command-line arguments or as a YAML
//! file; [`ConfigSource`] captures both and [`ConfigSource::resolve`] turns
//! either into the immutable [`MigrationConfig`] the rest of the workspace
//! consumes.
//!
//! # Quick start
//!
//! ```no_run
//! use mysql2sqlite_config::ConfigSource;
//!
//! let config = ConfigSource::from_file("mysql2sqlite.yml")
//!     .and_then(ConfigSource::resolve)
//!     .unwrap();
//! println!("writing {}", config.sql_path().display());
//! ```

mod config;
mod error;

pub use config::{
    CommandLineConfig, ConfigSource, DEFAULT_COUNTDOWN_SECS, DEFAULT_MYSQLDUMP, DEFAULT_SQLITE3,
    FileConfig, MigrationConfig, OverwritePolicy, ToolOverrides, ToolPaths,
};
pub use error::{ConfigError, Result};
