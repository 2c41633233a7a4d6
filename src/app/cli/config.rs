//! TOML configuration file parsing and loading
//!
//! Settings come from the configuration file given with `--config-file`,
//! or from `intelrun/intelrun.toml` under the user's configuration
//! directory when it exists. Command-line flags override file values.

use super::args::Args;
use crate::core::error_handling::ContextualError;
use crate::plugin::api::{EngineSettings, ExecutionMode, DEFAULT_HEALTH_CHECK_TIMEOUT};
use crate::store::fixture::StateFixture;
use crate::store::InMemoryStore;
use crate::tasks::RUN_PLUGIN_SOFT_TIME_LIMIT;
use log::debug;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("The specified configuration file does not exist: {}", path.display())]
    NotFound { path: PathBuf },

    #[error("Error reading {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Invalid value for '{key}': {message}")]
    Invalid { key: &'static str, message: String },
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        true
    }

    fn user_message(&self) -> Option<String> {
        Some(self.to_string())
    }
}

/// Application settings after merging file and command line
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct Settings {
    pub mode: Option<ExecutionMode>,
    /// Seconds
    pub soft_time_limit: Option<u64>,
    /// Seconds
    pub health_check_timeout: Option<u64>,
    pub color: Option<bool>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_file: Option<PathBuf>,
    pub state_file: Option<PathBuf>,
}

impl Settings {
    /// Default configuration file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("intelrun").join("intelrun.toml"))
    }

    /// Load settings from `config_file`, or from the default location
    ///
    /// An explicitly given file must exist; a missing default file yields
    /// default settings.
    pub async fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_path() {
                Some(path) if path.exists() => path,
                _ => return Ok(Self::default()),
            },
        };

        debug!("Loading configuration from {}", path.display());
        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        Self::from_toml(&contents, &path)
    }

    pub fn from_toml(contents: &str, path: &Path) -> Result<Self, ConfigError> {
        let settings: Self = toml::from_str(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        settings.validate()?;
        Ok(settings)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.soft_time_limit == Some(0) {
            return Err(ConfigError::Invalid {
                key: "soft-time-limit",
                message: "must be greater than 0".to_string(),
            });
        }
        if self.health_check_timeout == Some(0) {
            return Err(ConfigError::Invalid {
                key: "health-check-timeout",
                message: "must be greater than 0".to_string(),
            });
        }
        Ok(())
    }

    /// Command-line values take precedence over file values
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(mode) = args.mode {
            self.mode = Some(mode);
        }
        if let Some(limit) = args.soft_time_limit {
            self.soft_time_limit = Some(limit.as_secs());
        }
        if let Some(timeout) = args.health_check_timeout {
            self.health_check_timeout = Some(timeout.as_secs());
        }
        if let Some(color) = args.color {
            self.color = Some(color);
        }
        if let Some(log_level) = &args.log_level {
            self.log_level = Some(log_level.clone());
        }
        if let Some(log_format) = &args.log_format {
            self.log_format = Some(log_format.clone());
        }
        if let Some(log_file) = &args.log_file {
            self.log_file = Some(log_file.clone());
        }
        if let Some(state_file) = &args.state_file {
            self.state_file = Some(state_file.clone());
        }
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            mode: self.mode.unwrap_or_default(),
            soft_time_limit: Some(
                self.soft_time_limit
                    .map(Duration::from_secs)
                    .unwrap_or(RUN_PLUGIN_SOFT_TIME_LIMIT),
            ),
            health_check_timeout: self
                .health_check_timeout
                .map(Duration::from_secs)
                .unwrap_or(DEFAULT_HEALTH_CHECK_TIMEOUT),
        }
    }

    /// Build the in-memory stores from the state file, if any
    pub async fn load_state(&self) -> Result<InMemoryStore, ConfigError> {
        let Some(path) = &self.state_file else {
            return Ok(InMemoryStore::new());
        };
        if !path.exists() {
            return Err(ConfigError::NotFound { path: path.clone() });
        }
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.clone(),
                source,
            })?;
        let fixture = StateFixture::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        Ok(InMemoryStore::from_fixture(fixture))
    }
}
