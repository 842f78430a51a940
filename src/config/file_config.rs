use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Settings read from an optional TOML file. Every key overrides the CLI.
#[derive(Debug, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    // Inputs and output
    pub song_data_dir: Option<String>,
    pub log_data_dir: Option<String>,
    pub db_path: Option<String>,
    pub extension: Option<String>,
    pub log_file: Option<String>,

    // Load behavior
    pub continue_on_error: Option<bool>,
    pub quality_checks: Option<bool>,
}

impl FileConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse config file: {:?}", path))
    }
}
