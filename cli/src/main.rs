use std::fs;
use std::io::{BufReader, Write};
use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use mysql2sqlite_config::{
    CommandLineConfig, ConfigSource, DEFAULT_COUNTDOWN_SECS, MigrationConfig, OverwritePolicy,
    ToolOverrides,
};
use mysql2sqlite_core::{DialectTranslator, IdentifierQuoting, TranslatorOptions};
use mysql2sqlite_dump::{
    DumpCommand, DumpSummary, LoadSummary, RunReport, now_rfc3339, write_script,
};
use mysql2sqlite_sqlite::{EmbeddedLoader, ScriptLoader, Sqlite3Shell, count_tables};
use tracing_subscriber::EnvFilter;

const PACKAGE_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Which loader materializes the `.sqlite` file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
enum LoaderKind {
    /// Pipe the script into the `sqlite3` shell.
    Shell,
    /// Execute the script in-process (no `sqlite3` binary needed). Bytes
    /// that are not valid UTF-8 are loaded as U+FFFD.
    Embedded,
}

#[derive(Debug, Parser)]
#[command(name = "mysql2sqlite")]
#[command(about = "Convert a MySQL database into a SQLite database file")]
#[command(version)]
struct Cli {
    /// Enable debug logging on stderr (RUST_LOG overrides).
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Dump a MySQL database, translate it, and load it into SQLite.
    Run(RunArgs),
    /// Translate an existing dump file (or stdin) without running any tool.
    Translate(TranslateArgs),
}

#[derive(Debug, Args)]
struct RunArgs {
    /// MySQL database to dump.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    database: Option<String>,
    /// MySQL user name.
    #[arg(required_unless_present = "config", conflicts_with = "config")]
    username: Option<String>,
    /// MySQL password (passed to mysqldump through MYSQL_PWD).
    #[arg(conflicts_with = "config")]
    password: Option<String>,
    /// YAML configuration file naming the database and credentials.
    #[arg(long)]
    config: Option<PathBuf>,
    /// MySQL server host.
    #[arg(long, conflicts_with = "config")]
    host: Option<String>,
    /// MySQL server port.
    #[arg(long, conflicts_with = "config")]
    port: Option<u16>,
    /// Comma-separated tables to restrict the dump to (default: all).
    #[arg(long, conflicts_with = "config")]
    tables: Option<String>,
    /// Remove existing output files without the countdown.
    #[arg(long)]
    overwrite: bool,
    /// Seconds to wait before removing existing output files.
    #[arg(long, default_value_t = DEFAULT_COUNTDOWN_SECS)]
    countdown: u64,
    /// Directory for the .sql and .sqlite files.
    #[arg(long)]
    output_dir: Option<PathBuf>,
    /// Loader used to create the SQLite database.
    #[arg(long, value_enum, default_value = "shell")]
    loader: LoaderKind,
    /// Path to the mysqldump binary.
    #[arg(long)]
    mysqldump: Option<PathBuf>,
    /// Path to the sqlite3 binary.
    #[arg(long)]
    sqlite3: Option<PathBuf>,
    /// Kill the sqlite3 shell after this many seconds.
    #[arg(long)]
    timeout: Option<u64>,
    /// Remove double-quoted identifier quoting from the output.
    #[arg(long)]
    strip_quotes: bool,
    /// Write a JSON run report to this path.
    #[arg(long)]
    report: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct TranslateArgs {
    /// Dump file to translate (default: stdin).
    #[arg(long)]
    input: Option<PathBuf>,
    /// Output file (default: stdout).
    #[arg(long)]
    output: Option<PathBuf>,
    /// Remove double-quoted identifier quoting from the output.
    #[arg(long)]
    strip_quotes: bool,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Run(args) => run_migration(args),
        Command::Translate(args) => run_translate(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

// ---------------------------------------------------------------------------
// run command
// ---------------------------------------------------------------------------

fn run_migration(args: RunArgs) -> Result<(), String> {
    let started_at = now_rfc3339();
    let config = resolve_config(&args)?;
    let sql_path = config.sql_path();
    let sqlite_path = config.sqlite_path();

    remove_existing_outputs(
        &[sql_path.clone(), sqlite_path.clone()],
        config.overwrite(),
        std::thread::sleep,
    )?;

    let translator = DialectTranslator::new(translator_options(args.strip_quotes));
    let dump = DumpCommand::from_config(&config);
    println!("Dumping '{}': {}", config.database(), dump.to_command_line());
    let outcome = dump.run(&translator).map_err(|e| e.to_string())?;
    if !outcome.success {
        let code = outcome
            .exit_code
            .map_or_else(|| "a signal".to_string(), |c| format!("status {c}"));
        eprintln!(
            "warning: mysqldump exited with {code}; continuing with {} line(s) of output{}",
            outcome.document.stats().lines_kept,
            if outcome.stderr.is_empty() {
                String::new()
            } else {
                format!(": {}", outcome.stderr)
            }
        );
    }

    println!("Writing out to: {}", sql_path.display());
    let script = write_script(&sql_path, outcome.document.sql()).map_err(|e| e.to_string())?;

    println!("Pushing to SQLite: {}", sqlite_path.display());
    let loader = build_loader(args.loader, &config, args.timeout);
    let load = loader
        .load(&sql_path, &sqlite_path)
        .map_err(|e| e.to_string())?;
    let table_count = if load.success {
        count_tables(&sqlite_path).ok()
    } else {
        None
    };

    let report = RunReport::new(
        PACKAGE_VERSION,
        config.database(),
        config.tables(),
        &sql_path,
        &sqlite_path,
        started_at,
        DumpSummary::new(dump.to_command_line(), &outcome),
        &script,
        LoadSummary {
            loader: loader.name().to_string(),
            success: load.success,
            exit_code: load.exit_code,
            message: load.message.clone(),
            table_count,
        },
    );
    if let Some(path) = &args.report {
        report
            .save(path)
            .map_err(|e| format!("Failed to write report '{}': {e}", path.display()))?;
    }

    if !report.success {
        return Err(format!(
            "Loading '{}' into '{}' failed: {}",
            sql_path.display(),
            sqlite_path.display(),
            load.message.as_deref().unwrap_or("unknown error")
        ));
    }

    println!(
        "Converted '{}' into '{}' ({} line(s), {} table(s)).",
        config.database(),
        sqlite_path.display(),
        report.dump.lines_kept,
        table_count.map_or_else(|| "?".to_string(), |n| n.to_string())
    );
    Ok(())
}

fn resolve_config(args: &RunArgs) -> Result<MigrationConfig, String> {
    let source = match &args.config {
        Some(path) => ConfigSource::from_file(path)
            .map_err(|e| format!("Failed to load config '{}': {e}", path.display()))?,
        None => ConfigSource::CommandLine(CommandLineConfig {
            database: args.database.clone(),
            username: args.username.clone(),
            password: args.password.clone(),
            host: args.host.clone(),
            port: args.port,
            tables: parse_csv_list(args.tables.clone()),
            overwrite: args.overwrite,
            output_dir: None,
            tools: ToolOverrides::default(),
        }),
    };

    let mut config = source
        .resolve()
        .map_err(|e| format!("Invalid configuration: {e}"))?;

    let overwrite = if args.overwrite {
        OverwritePolicy::Immediate
    } else {
        match config.overwrite() {
            OverwritePolicy::Immediate => OverwritePolicy::Immediate,
            OverwritePolicy::Countdown { .. } => OverwritePolicy::Countdown {
                seconds: args.countdown,
            },
        }
    };
    config = config.with_overwrite(overwrite).with_tools(ToolOverrides {
        mysqldump: args.mysqldump.clone(),
        sqlite3: args.sqlite3.clone(),
    });
    if let Some(dir) = &args.output_dir {
        config = config.with_output_dir(dir);
    }
    Ok(config)
}

/// Removes any of `paths` that exist, after the countdown `policy` asks for.
///
/// The countdown can be interrupted with Ctrl-C, which leaves every file in
/// place. Returns the paths that were removed.
fn remove_existing_outputs(
    paths: &[PathBuf],
    policy: OverwritePolicy,
    mut sleep: impl FnMut(Duration),
) -> Result<Vec<PathBuf>, String> {
    let existing: Vec<PathBuf> = paths.iter().filter(|p| p.exists()).cloned().collect();
    if existing.is_empty() {
        return Ok(existing);
    }

    if let OverwritePolicy::Countdown { seconds } = policy {
        let names = existing
            .iter()
            .map(|p| p.display().to_string())
            .collect::<Vec<_>>()
            .join(", ");
        for remaining in (1..=seconds).rev() {
            eprintln!(
                "{names} already exists. It will be overwritten in {remaining} second(s). Press Ctrl-C to stop."
            );
            sleep(Duration::from_secs(1));
        }
    }

    for path in &existing {
        fs::remove_file(path)
            .map_err(|err| format!("Failed to remove '{}': {err}", path.display()))?;
        tracing::debug!(path = %path.display(), "Removed existing output");
    }
    Ok(existing)
}

fn build_loader(
    kind: LoaderKind,
    config: &MigrationConfig,
    timeout_secs: Option<u64>,
) -> Box<dyn ScriptLoader> {
    match kind {
        LoaderKind::Shell => {
            let shell = Sqlite3Shell::new(&config.tools().sqlite3);
            match timeout_secs {
                Some(secs) => Box::new(shell.with_timeout(Duration::from_secs(secs))),
                None => Box::new(shell),
            }
        }
        LoaderKind::Embedded => Box::new(EmbeddedLoader),
    }
}

// ---------------------------------------------------------------------------
// translate command
// ---------------------------------------------------------------------------

fn run_translate(args: TranslateArgs) -> Result<(), String> {
    let translator = DialectTranslator::new(translator_options(args.strip_quotes));

    let document = match &args.input {
        Some(path) => {
            let file = fs::File::open(path)
                .map_err(|err| format!("Failed to read '{}': {err}", path.display()))?;
            translator.translate_reader(BufReader::new(file))
        }
        None => translator.translate_reader(std::io::stdin().lock()),
    }
    .map_err(|err| format!("Failed to read dump: {err}"))?;

    match &args.output {
        Some(path) => {
            write_script(path, document.sql())
                .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
            let stats = document.stats();
            eprintln!(
                "Translated {} line(s) ({} dropped) into '{}'.",
                stats.lines_kept,
                stats.lines_dropped,
                path.display()
            );
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout
                .write_all(document.sql())
                .and_then(|()| stdout.flush())
                .map_err(|err| format!("Failed to write stdout: {err}"))?;
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// helpers
// ---------------------------------------------------------------------------

fn translator_options(strip_quotes: bool) -> TranslatorOptions {
    TranslatorOptions {
        quoting: if strip_quotes {
            IdentifierQuoting::Strip
        } else {
            IdentifierQuoting::Keep
        },
    }
}

fn parse_csv_list(raw: Option<String>) -> Vec<String> {
    raw.map(|value| {
        value
            .split(',')
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(ToOwned::to_owned)
            .collect()
    })
    .unwrap_or_default()
}
