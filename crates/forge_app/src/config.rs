use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use forge_core::SelectorEdits;
use forge_engine::ClientSettings;
use forge_logging::LogDestination;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::cli::Cli;

pub const CONFIG_FILENAME: &str = "selector_forge.ron";

/// Optional RON config file: `selector_forge.ron`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub backend_url: String,
    pub output_dir: PathBuf,
    pub log_destination: LogTarget,
    pub seed_blank_selectors: bool,
    pub request_timeout_secs: Option<u64>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            backend_url: ClientSettings::default().base_url,
            output_dir: PathBuf::from("./downloads"),
            log_destination: LogTarget::File,
            seed_blank_selectors: true,
            request_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LogTarget {
    #[default]
    File,
    Terminal,
    Both,
}

impl From<LogTarget> for LogDestination {
    fn from(target: LogTarget) -> Self {
        match target {
            LogTarget::File => LogDestination::File,
            LogTarget::Terminal => LogDestination::Terminal,
            LogTarget::Both => LogDestination::Both,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("could not parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        source: ron::error::SpannedError,
    },
}

/// Loads the config file.
///
/// A missing default file yields defaults; an explicit path must exist.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    let (config_path, explicit) = match path {
        Some(path) => (path.to_path_buf(), true),
        None => (PathBuf::from(CONFIG_FILENAME), false),
    };
    let content = match fs::read_to_string(&config_path) {
        Ok(content) => content,
        Err(err) if err.kind() == io::ErrorKind::NotFound && !explicit => {
            return Ok(AppConfig::default());
        }
        Err(source) => {
            return Err(ConfigError::Read {
                path: config_path,
                source,
            })
        }
    };
    ron::from_str(&content).map_err(|source| ConfigError::Parse {
        path: config_path,
        source,
    })
}

/// Config file values with command-line overrides applied.
#[derive(Debug, Clone)]
pub struct Settings {
    pub backend_url: String,
    pub output_dir: PathBuf,
    pub log_destination: LogDestination,
    pub seed_blank_selectors: bool,
    pub request_timeout: Option<Duration>,
    pub initial_url: Option<String>,
    pub manual_selectors: Option<SelectorEdits>,
}

impl Settings {
    pub fn resolve(cli: &Cli, config: AppConfig) -> Self {
        Self {
            backend_url: cli.backend.clone().unwrap_or(config.backend_url),
            output_dir: cli.output_dir.clone().unwrap_or(config.output_dir),
            log_destination: config.log_destination.into(),
            seed_blank_selectors: config.seed_blank_selectors,
            request_timeout: config.request_timeout_secs.map(Duration::from_secs),
            initial_url: cli.url.clone(),
            manual_selectors: cli.selector_edits(),
        }
    }

    pub fn client_settings(&self) -> ClientSettings {
        ClientSettings {
            request_timeout: self.request_timeout,
            ..ClientSettings::with_base_url(self.backend_url.clone())
        }
    }
}
