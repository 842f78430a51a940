mod file_config;

pub use file_config::FileConfig;

use crate::etl::DriverOptions;
use anyhow::{bail, Result};
use std::path::{Path, PathBuf};

pub const DEFAULT_SONG_DATA_DIR: &str = "data/song_data";
pub const DEFAULT_LOG_DATA_DIR: &str = "data/log_data";
pub const DEFAULT_DB_PATH: &str = "sparkify.db";
pub const DEFAULT_EXTENSION: &str = "json";
pub const DEFAULT_LOG_FILE: &str = "etl.log";

/// CLI arguments that can be used for config resolution.
/// This struct mirrors the CLI arguments that can be overridden by TOML config.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub song_data_dir: Option<PathBuf>,
    pub log_data_dir: Option<PathBuf>,
    pub db_path: Option<PathBuf>,
    pub extension: Option<String>,
    pub log_file: Option<PathBuf>,
    pub continue_on_error: bool,
    pub skip_quality_checks: bool,
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub song_data_dir: PathBuf,
    pub log_data_dir: PathBuf,
    pub db_path: PathBuf,
    pub extension: String,
    pub log_file: PathBuf,
    pub continue_on_error: bool,
    pub quality_checks: bool,
}

fn check_data_dir(name: &str, dir: &Path) -> Result<()> {
    if !dir.exists() {
        bail!("{} does not exist: {:?}", name, dir);
    }
    if !dir.is_dir() {
        bail!("{} is not a directory: {:?}", name, dir);
    }
    Ok(())
}

/// Log file of a run. Needs no validation, so it is known before the rest
/// of the configuration is resolved.
pub fn log_file_path(cli: &CliConfig, file_config: Option<&FileConfig>) -> PathBuf {
    file_config
        .and_then(|file| file.log_file.as_ref())
        .map(PathBuf::from)
        .or_else(|| cli.log_file.clone())
        .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_FILE))
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file config.
    /// TOML values override CLI values where present.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let song_data_dir = file
            .song_data_dir
            .clone()
            .map(PathBuf::from)
            .or_else(|| cli.song_data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_SONG_DATA_DIR));
        check_data_dir("song_data_dir", &song_data_dir)?;

        let log_data_dir = file
            .log_data_dir
            .clone()
            .map(PathBuf::from)
            .or_else(|| cli.log_data_dir.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_LOG_DATA_DIR));
        check_data_dir("log_data_dir", &log_data_dir)?;

        let db_path = file
            .db_path
            .clone()
            .map(PathBuf::from)
            .or_else(|| cli.db_path.clone())
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH));
        if let Some(parent) = db_path.parent() {
            // A bare file name has an empty parent: the working directory.
            if !parent.as_os_str().is_empty() && !parent.is_dir() {
                bail!("Database directory does not exist: {:?}", parent);
            }
        }

        let extension = file
            .extension
            .clone()
            .or_else(|| cli.extension.clone())
            .unwrap_or_else(|| DEFAULT_EXTENSION.to_string());
        if extension.is_empty() {
            bail!("extension must not be empty");
        }
        if extension.starts_with('.') {
            bail!(
                "extension must be given without the leading dot: {:?}",
                extension
            );
        }

        let log_file = log_file_path(cli, Some(&file));

        let continue_on_error = file.continue_on_error.unwrap_or(cli.continue_on_error);
        let quality_checks = file.quality_checks.unwrap_or(!cli.skip_quality_checks);

        Ok(Self {
            song_data_dir,
            log_data_dir,
            db_path,
            extension,
            log_file,
            continue_on_error,
            quality_checks,
        })
    }

    pub fn driver_options(&self) -> DriverOptions {
        DriverOptions {
            extension: self.extension.clone(),
            continue_on_error: self.continue_on_error,
            quality_checks: self.quality_checks,
        }
    }
}
