//! Demo configuration, read from an optional JSON file.

use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use filtertable_lib::orchestrator::OrchestratorConfig;
use filtertable_lib::provider::DEFAULT_DELAY;
use filtertable_lib::table::{DEFAULT_PAGE_SIZE_OPTIONS, TableConfig};
use serde::Deserialize;
use simplelog::LevelFilter;
use thiserror::Error;

/// Errors loading the demo configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("unknown log level '{0}'")]
    LogLevel(String),
    #[error("page size {0} is not one of the offered page sizes")]
    PageSize(usize),
}

/// Settings for one demo session. Every key is optional.
///
/// ```json
/// { "page_size": 10, "debounce_ms": 300, "timeout_ms": 5000, "log_level": "trace" }
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub page_size: usize,
    pub page_size_options: Vec<usize>,
    pub debounce_ms: u64,
    pub timeout_ms: Option<u64>,
    pub provider_delay_ms: u64,
    pub log_level: String,
    pub log_file: PathBuf,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            page_size: 5,
            page_size_options: DEFAULT_PAGE_SIZE_OPTIONS.to_vec(),
            debounce_ms: 0,
            timeout_ms: None,
            provider_delay_ms: DEFAULT_DELAY.as_millis() as u64,
            log_level: "debug".to_string(),
            log_file: PathBuf::from("filtertable-demo.log"),
        }
    }
}

impl DemoConfig {
    /// Read and validate a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        self.level_filter()?;
        if !self.page_size_options.contains(&self.page_size) {
            return Err(ConfigError::PageSize(self.page_size));
        }
        Ok(())
    }

    pub fn level_filter(&self) -> Result<LevelFilter, ConfigError> {
        LevelFilter::from_str(&self.log_level)
            .map_err(|_| ConfigError::LogLevel(self.log_level.clone()))
    }

    pub fn table_config(&self) -> TableConfig {
        TableConfig::new()
            .with_page_size(self.page_size)
            .with_page_size_options(self.page_size_options.clone())
            .with_aria_label("Securities")
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let config =
            OrchestratorConfig::new().with_debounce(Duration::from_millis(self.debounce_ms));
        match self.timeout_ms {
            Some(ms) => config.with_request_timeout(Duration::from_millis(ms)),
            None => config,
        }
    }

    pub fn provider_delay(&self) -> Duration {
        Duration::from_millis(self.provider_delay_ms)
    }
}
