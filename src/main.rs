use anyhow::{bail, Context, Result};
use clap::Parser;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::{error, info, level_filters::LevelFilter, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use sparkify_etl::config::{self, AppConfig, FileConfig};
use sparkify_etl::etl::{run_pipeline, EtlError, TracingReporter};
use sparkify_etl::warehouse::SqliteWarehouse;

fn parse_path(s: &str) -> Result<PathBuf, String> {
    let path_buf = PathBuf::from(s);
    let original_path = match path_buf.canonicalize() {
        Ok(path) => path,
        Err(msg) => {
            if msg.kind() == std::io::ErrorKind::NotFound {
                path_buf
            } else {
                return Err(format!("Error resolving path '{}': {}", s, msg));
            }
        }
    };
    if original_path.is_absolute() {
        return Ok(original_path);
    }
    let cwd = std::env::current_dir().map_err(|e| format!("Failed to get current dir: {}", e))?;
    Ok(cwd.join(original_path))
}

#[derive(Parser, Debug)]
#[clap(about = "Loads song catalog and listening-event JSON files into a SQLite star schema")]
struct CliArgs {
    /// Path to TOML configuration file. Values in the file override CLI arguments.
    #[clap(long, value_parser = parse_path)]
    pub config: Option<PathBuf>,

    /// Root directory of the song catalog files [default: data/song_data].
    #[clap(long, value_parser = parse_path)]
    pub song_data: Option<PathBuf>,

    /// Root directory of the event-log files [default: data/log_data].
    #[clap(long, value_parser = parse_path)]
    pub log_data: Option<PathBuf>,

    /// Path to the SQLite warehouse database, created if missing [default: sparkify.db].
    #[clap(long, value_parser = parse_path)]
    pub db: Option<PathBuf>,

    /// Extension of the files to load, without the dot [default: json].
    #[clap(long)]
    pub extension: Option<String>,

    /// File that log lines are appended to [default: etl.log].
    #[clap(long)]
    pub log_file: Option<PathBuf>,

    /// Roll back and skip files that fail instead of stopping the run.
    #[clap(long)]
    pub continue_on_error: bool,

    /// Do not run data-quality checks before writing batches.
    #[clap(long)]
    pub skip_quality_checks: bool,
}

/// Convert CLI args to CliConfig for config resolution
impl From<&CliArgs> for config::CliConfig {
    fn from(args: &CliArgs) -> Self {
        config::CliConfig {
            song_data_dir: args.song_data.clone(),
            log_data_dir: args.log_data.clone(),
            db_path: args.db.clone(),
            extension: args.extension.clone(),
            log_file: args.log_file.clone(),
            continue_on_error: args.continue_on_error,
            skip_quality_checks: args.skip_quality_checks,
        }
    }
}

fn init_tracing(log_file: &Path) -> Result<()> {
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {:?}", log_file))?;

    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(
            tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(Mutex::new(file)),
        )
        .with(
            EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .with_env_var("LOG_LEVEL")
                .from_env_lossy(),
        )
        .try_init()
        .context("Failed to install tracing subscriber")
}

fn log_warehouse_summary(warehouse: &SqliteWarehouse) -> Result<()> {
    info!("Warehouse contents:");
    for (table, count) in warehouse.table_counts()? {
        info!("  {}: {} rows", table, count);
    }

    let duplicates = warehouse.duplicate_time_rows()?;
    if duplicates > 0 {
        warn!(
            "time table holds {} rows with an already present timestamp",
            duplicates
        );
    }
    Ok(())
}

fn run(
    cli_args: &CliArgs,
    cli_config: &config::CliConfig,
    file_config: Option<FileConfig>,
) -> Result<()> {
    // Resolve final configuration (TOML overrides CLI)
    let app_config = AppConfig::resolve(cli_config, file_config)?;

    if let Some(path) = &cli_args.config {
        info!("Loaded configuration from {:?}", path);
    }
    info!("Configuration loaded:");
    info!("  song_data_dir: {:?}", app_config.song_data_dir);
    info!("  log_data_dir: {:?}", app_config.log_data_dir);
    info!("  db_path: {:?}", app_config.db_path);
    info!("  extension: {}", app_config.extension);
    info!("  continue_on_error: {}", app_config.continue_on_error);
    info!("  quality_checks: {}", app_config.quality_checks);

    if !app_config.db_path.exists() {
        info!("Creating new warehouse database at {:?}", app_config.db_path);
    }
    let warehouse = SqliteWarehouse::open(&app_config.db_path)?;

    let reporter = TracingReporter;
    let summary = run_pipeline(
        &app_config.song_data_dir,
        &app_config.log_data_dir,
        app_config.driver_options(),
        &warehouse,
        &reporter,
    )?;

    log_warehouse_summary(&warehouse)?;

    if summary.failed_files() > 0 {
        for (path, reason) in summary
            .catalog
            .failed_files
            .iter()
            .chain(summary.events.failed_files.iter())
        {
            warn!("  skipped {}: {}", path.display(), reason);
        }
        bail!("{} files could not be loaded", summary.failed_files());
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli_args = CliArgs::parse();
    let cli_config: config::CliConfig = (&cli_args).into();

    let file_config = cli_args.config.as_deref().map(FileConfig::load).transpose();

    // A broken config file still gets its error into the CLI or default log file.
    let log_file = config::log_file_path(
        &cli_config,
        file_config.as_ref().ok().and_then(|c| c.as_ref()),
    );
    init_tracing(&log_file)?;

    let result = file_config.and_then(|file_config| run(&cli_args, &cli_config, file_config));
    if let Err(err) = &result {
        // Pipeline errors were already logged by the reporter.
        if err.downcast_ref::<EtlError>().is_none() {
            error!("Error in ETL process: {:#}", err);
        }
    }
    result
}
