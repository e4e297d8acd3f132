//! Migration configuration: the two input sources and the resolved record.
//!
//! A run is configured either from command-line arguments or from a YAML
//! file. Both are captured by [`ConfigSource`] and resolved exactly once into
//! an immutable [`MigrationConfig`] before any dump or translation starts.
//!
//! # Example YAML
//!
//! ```yaml
//! database: shop
//! username: root
//! password: secret
//! host: 127.0.0.1
//! port: 3306
//! tables:
//!   - customers
//!   - orders
//! overwrite: false
//! output_dir: out
//! tools:
//!   mysqldump: /usr/local/mysql/bin/mysqldump
//!   sqlite3: /usr/bin/sqlite3
//! ```

use std::fmt;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::error::{ConfigError, Result};

/// Seconds to wait before removing existing output files when overwrite is off.
pub const DEFAULT_COUNTDOWN_SECS: u64 = 5;

/// Default dump program, resolved through `$PATH`.
pub const DEFAULT_MYSQLDUMP: &str = "mysqldump";

/// Default SQLite shell, resolved through `$PATH`.
pub const DEFAULT_SQLITE3: &str = "sqlite3";

/// What to do when an output file from a previous run already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverwritePolicy {
    /// Remove existing files straight away.
    Immediate,
    /// Warn once per second for `seconds`, then remove.
    Countdown { seconds: u64 },
}

impl OverwritePolicy {
    /// Maps the boolean `overwrite` flag onto a policy.
    ///
    /// # Examples
    ///
    /// ```
    /// use mysql2sqlite_config::OverwritePolicy;
    ///
    /// assert_eq!(OverwritePolicy::from_flag(true), OverwritePolicy::Immediate);
    /// assert_eq!(
    ///     OverwritePolicy::from_flag(false),
    ///     OverwritePolicy::Countdown { seconds: 5 }
    /// );
    /// ```
    pub fn from_flag(overwrite: bool) -> Self {
        if overwrite {
            Self::Immediate
        } else {
            Self::Countdown {
                seconds: DEFAULT_COUNTDOWN_SECS,
            }
        }
    }
}

/// Locations of the external programs a run invokes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ToolPaths {
    pub mysqldump: PathBuf,
    pub sqlite3: PathBuf,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            mysqldump: PathBuf::from(DEFAULT_MYSQLDUMP),
            sqlite3: PathBuf::from(DEFAULT_SQLITE3),
        }
    }
}

/// Optional per-tool overrides; unset entries keep the [`ToolPaths`] default.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ToolOverrides {
    pub mysqldump: Option<PathBuf>,
    pub sqlite3: Option<PathBuf>,
}

impl ToolOverrides {
    fn apply(self, tools: &mut ToolPaths) {
        if let Some(mysqldump) = self.mysqldump {
            tools.mysqldump = mysqldump;
        }
        if let Some(sqlite3) = self.sqlite3 {
            tools.sqlite3 = sqlite3;
        }
    }
}

/// Settings gathered from command-line arguments.
#[derive(Debug, Clone, Default)]
pub struct CommandLineConfig {
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tables: Vec<String>,
    pub overwrite: bool,
    pub output_dir: Option<PathBuf>,
    pub tools: ToolOverrides,
}

/// Settings read from a YAML configuration file.
///
/// Every field is optional at the parsing stage so that a missing
/// `database` or `username` is reported as
/// [`MissingField`](ConfigError::MissingField) rather than a YAML error.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub database: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tables: Vec<String>,
    pub overwrite: bool,
    pub output_dir: Option<PathBuf>,
    pub tools: ToolOverrides,
}

impl FileConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](ConfigError::IoError) if the file cannot be read,
    /// or [`YamlError`](ConfigError::YamlError) if parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }
}

/// Where a run's configuration comes from.
#[derive(Debug, Clone)]
pub enum ConfigSource {
    CommandLine(CommandLineConfig),
    File(FileConfig),
}

impl ConfigSource {
    /// Loads a YAML file into a [`ConfigSource::File`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        FileConfig::load(path).map(Self::File)
    }

    /// Validates the source and produces the canonical configuration.
    ///
    /// # Errors
    ///
    /// Returns [`MissingField`](ConfigError::MissingField) when `database` or
    /// `username` is absent or blank,
    /// [`InvalidDatabaseName`](ConfigError::InvalidDatabaseName) when the
    /// database name cannot serve as a file stem, and
    /// [`InvalidTable`](ConfigError::InvalidTable) for blank table names.
    ///
    /// # Examples
    ///
    /// ```
    /// use mysql2sqlite_config::{CommandLineConfig, ConfigSource};
    ///
    /// let config = ConfigSource::CommandLine(CommandLineConfig {
    ///     database: Some("shop".into()),
    ///     username: Some("root".into()),
    ///     ..Default::default()
    /// })
    /// .resolve()
    /// .unwrap();
    /// assert_eq!(config.sql_path().to_str(), Some("./shop.sql"));
    /// assert_eq!(config.sqlite_path().to_str(), Some("./shop.sqlite"));
    /// ```
    pub fn resolve(self) -> Result<MigrationConfig> {
        let fields = match self {
            Self::CommandLine(c) => Fields {
                database: c.database,
                username: c.username,
                password: c.password,
                host: c.host,
                port: c.port,
                tables: c.tables,
                overwrite: c.overwrite,
                output_dir: c.output_dir,
                tools: c.tools,
            },
            Self::File(f) => Fields {
                database: f.database,
                username: f.username,
                password: f.password,
                host: f.host,
                port: f.port,
                tables: f.tables,
                overwrite: f.overwrite,
                output_dir: f.output_dir,
                tools: f.tools,
            },
        };
        fields.validate()
    }
}

struct Fields {
    database: Option<String>,
    username: Option<String>,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    tables: Vec<String>,
    overwrite: bool,
    output_dir: Option<PathBuf>,
    tools: ToolOverrides,
}

impl Fields {
    fn validate(self) -> Result<MigrationConfig> {
        let database = non_blank(self.database).ok_or(ConfigError::MissingField("database"))?;
        validate_database_name(&database)?;
        let username = non_blank(self.username).ok_or(ConfigError::MissingField("username"))?;

        let tables = self
            .tables
            .into_iter()
            .map(|table| {
                let trimmed = table.trim();
                if trimmed.is_empty() {
                    Err(ConfigError::InvalidTable(table))
                } else {
                    Ok(trimmed.to_string())
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut tools = ToolPaths::default();
        self.tools.apply(&mut tools);

        Ok(MigrationConfig {
            database,
            username,
            password: self.password.filter(|p| !p.is_empty()),
            host: non_blank(self.host),
            port: self.port,
            tables,
            overwrite: OverwritePolicy::from_flag(self.overwrite),
            output_dir: self.output_dir.unwrap_or_else(|| PathBuf::from(".")),
            tools,
        })
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn validate_database_name(name: &str) -> Result<()> {
    let invalid = name == "."
        || name == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(ConfigError::InvalidDatabaseName(name.to_string()));
    }
    Ok(())
}

/// Canonical, validated configuration for one migration run.
#[derive(Clone, PartialEq, Eq)]
pub struct MigrationConfig {
    database: String,
    username: String,
    password: Option<String>,
    host: Option<String>,
    port: Option<u16>,
    tables: Vec<String>,
    overwrite: OverwritePolicy,
    output_dir: PathBuf,
    tools: ToolPaths,
}

impl MigrationConfig {
    pub fn database(&self) -> &str {
        &self.database
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    pub fn password(&self) -> Option<&str> {
        self.password.as_deref()
    }

    pub fn host(&self) -> Option<&str> {
        self.host.as_deref()
    }

    pub fn port(&self) -> Option<u16> {
        self.port
    }

    /// Tables to restrict the dump to; empty means the whole database.
    pub fn tables(&self) -> &[String] {
        &self.tables
    }

    pub fn overwrite(&self) -> OverwritePolicy {
        self.overwrite
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn tools(&self) -> &ToolPaths {
        &self.tools
    }

    /// Path of the translated script, `<output_dir>/<database>.sql`.
    pub fn sql_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.sql", self.database))
    }

    /// Path of the SQLite database, `<output_dir>/<database>.sqlite`.
    pub fn sqlite_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.sqlite", self.database))
    }

    /// Replaces the overwrite policy.
    pub fn with_overwrite(mut self, overwrite: OverwritePolicy) -> Self {
        self.overwrite = overwrite;
        self
    }

    /// Applies tool path overrides on top of the current paths.
    pub fn with_tools(mut self, overrides: ToolOverrides) -> Self {
        overrides.apply(&mut self.tools);
        self
    }

    /// Replaces the output directory.
    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }
}

impl fmt::Debug for MigrationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationConfig")
            .field("database", &self.database)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tables", &self.tables)
            .field("overwrite", &self.overwrite)
            .field("output_dir", &self.output_dir)
            .field("tools", &self.tools)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_yaml() -> &'static str {
        r#"
database: shop
username: root
password: secret
host: db.internal
port: 3307
tables:
  - customers
  - orders
overwrite: true
output_dir: out
tools:
  mysqldump: /opt/mysql/bin/mysqldump
"#
    }

    fn minimal_yaml() -> &'static str {
        r#"
database: shop
username: root
"#
    }

    fn cli(database: &str, username: &str) -> CommandLineConfig {
        CommandLineConfig {
            database: Some(database.to_string()),
            username: Some(username.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_deserialize_complete() {
        let config: FileConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(config.database.as_deref(), Some("shop"));
        assert_eq!(config.username.as_deref(), Some("root"));
        assert_eq!(config.password.as_deref(), Some("secret"));
        assert_eq!(config.host.as_deref(), Some("db.internal"));
        assert_eq!(config.port, Some(3307));
        assert_eq!(config.tables, vec!["customers", "orders"]);
        assert!(config.overwrite);
        assert_eq!(config.output_dir, Some(PathBuf::from("out")));
        assert_eq!(
            config.tools.mysqldump,
            Some(PathBuf::from("/opt/mysql/bin/mysqldump"))
        );
        assert_eq!(config.tools.sqlite3, None);
    }

    #[test]
    fn test_resolve_file_config() {
        let file: FileConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        let config = ConfigSource::File(file).resolve().unwrap();
        assert_eq!(config.database(), "shop");
        assert_eq!(config.username(), "root");
        assert_eq!(config.password(), Some("secret"));
        assert_eq!(config.host(), Some("db.internal"));
        assert_eq!(config.port(), Some(3307));
        assert_eq!(config.tables(), ["customers", "orders"]);
        assert_eq!(config.overwrite(), OverwritePolicy::Immediate);
        assert_eq!(config.sql_path(), PathBuf::from("out/shop.sql"));
        assert_eq!(config.sqlite_path(), PathBuf::from("out/shop.sqlite"));
        assert_eq!(
            config.tools().mysqldump,
            PathBuf::from("/opt/mysql/bin/mysqldump")
        );
        assert_eq!(config.tools().sqlite3, PathBuf::from(DEFAULT_SQLITE3));
    }

    #[test]
    fn test_resolve_minimal_file_uses_defaults() {
        let file: FileConfig = serde_yaml::from_str(minimal_yaml()).unwrap();
        let config = ConfigSource::File(file).resolve().unwrap();
        assert_eq!(config.password(), None);
        assert!(config.tables().is_empty());
        assert_eq!(
            config.overwrite(),
            OverwritePolicy::Countdown {
                seconds: DEFAULT_COUNTDOWN_SECS
            }
        );
        assert_eq!(config.output_dir(), Path::new("."));
        assert_eq!(config.tools(), &ToolPaths::default());
    }

    #[test]
    fn test_missing_database_is_reported() {
        let file: FileConfig = serde_yaml::from_str("username: root\n").unwrap();
        let err = ConfigSource::File(file).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("database")));
        assert_eq!(err.to_string(), "missing required field 'database'");
    }

    #[test]
    fn test_blank_username_is_missing() {
        let err = ConfigSource::CommandLine(cli("shop", "   "))
            .resolve()
            .unwrap_err();
        assert!(matches!(err, ConfigError::MissingField("username")));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        let result: std::result::Result<FileConfig, _> =
            serde_yaml::from_str("database: shop\nusername: root\npasword: typo\n");
        assert!(result.is_err());
    }

    #[test]
    fn test_database_name_with_separator_is_rejected() {
        for name in ["../etc", "a/b", "a\\b", "..", "."] {
            let err = ConfigSource::CommandLine(cli(name, "root"))
                .resolve()
                .unwrap_err();
            assert!(
                matches!(err, ConfigError::InvalidDatabaseName(_)),
                "{name} should be rejected"
            );
        }
    }

    #[test]
    fn test_tables_are_trimmed_and_blank_rejected() {
        let mut source = cli("shop", "root");
        source.tables = vec![" customers ".to_string(), "orders".to_string()];
        let config = ConfigSource::CommandLine(source.clone()).resolve().unwrap();
        assert_eq!(config.tables(), ["customers", "orders"]);

        source.tables.push("  ".to_string());
        let err = ConfigSource::CommandLine(source).resolve().unwrap_err();
        assert!(matches!(err, ConfigError::InvalidTable(_)));
    }

    #[test]
    fn test_empty_password_is_none() {
        let mut source = cli("shop", "root");
        source.password = Some(String::new());
        let config = ConfigSource::CommandLine(source).resolve().unwrap();
        assert_eq!(config.password(), None);
    }

    #[test]
    fn test_debug_redacts_password() {
        let mut source = cli("shop", "root");
        source.password = Some("hunter2".to_string());
        let config = ConfigSource::CommandLine(source).resolve().unwrap();
        let debug = format!("{config:?}");
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_with_overrides() {
        let config = ConfigSource::CommandLine(cli("shop", "root"))
            .resolve()
            .unwrap()
            .with_overwrite(OverwritePolicy::Countdown { seconds: 0 })
            .with_output_dir("/tmp/out")
            .with_tools(ToolOverrides {
                mysqldump: None,
                sqlite3: Some(PathBuf::from("/usr/bin/sqlite3")),
            });
        assert_eq!(config.overwrite(), OverwritePolicy::Countdown { seconds: 0 });
        assert_eq!(config.sql_path(), PathBuf::from("/tmp/out/shop.sql"));
        assert_eq!(config.tools().mysqldump, PathBuf::from(DEFAULT_MYSQLDUMP));
        assert_eq!(config.tools().sqlite3, PathBuf::from("/usr/bin/sqlite3"));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mysql2sqlite.yml");
        std::fs::write(&path, sample_yaml()).unwrap();

        let loaded = FileConfig::load(&path).unwrap();
        let parsed: FileConfig = serde_yaml::from_str(sample_yaml()).unwrap();
        assert_eq!(loaded.database, parsed.database);
        assert_eq!(loaded.tables, parsed.tables);
        assert_eq!(loaded.port, parsed.port);
        assert_eq!(loaded.tools, parsed.tools);
    }

    #[test]
    fn test_from_file_missing_path_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ConfigSource::from_file(dir.path().join("absent.yml")).unwrap_err();
        assert!(matches!(err, ConfigError::IoError(_)));
    }
}
