//! Command-line arguments
//!
//! Global options override values from the configuration file; each
//! subcommand maps to one operation of the engine or the task layer.

use crate::core::validation::{parse_key_value, validate_positive_secs};
use crate::plugin::api::ExecutionMode;
use crate::store::models::JobId;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::path::PathBuf;
use std::time::Duration;

#[derive(Parser, Debug, Clone)]
#[command(name = "intelrun")]
#[command(about = "Run threat-intelligence analyzer plugins against jobs")]
#[command(version = long_version())]
pub struct Args {
    /// Configuration file path
    #[arg(short = 'c', long = "config-file", value_name = "FILE", global = true)]
    pub config_file: Option<PathBuf>,

    /// State file seeding jobs, parameters and organization settings
    #[arg(short = 's', long = "state-file", value_name = "FILE", global = true)]
    pub state_file: Option<PathBuf>,

    /// Execution mode
    #[arg(short = 'm', long = "mode", value_name = "MODE", global = true)]
    pub mode: Option<ExecutionMode>,

    /// Soft time limit for a plugin run, in seconds
    #[arg(long = "soft-time-limit", value_name = "SECS", value_parser = validate_positive_secs, global = true)]
    pub soft_time_limit: Option<Duration>,

    /// Timeout of health check probes, in seconds
    #[arg(long = "health-check-timeout", value_name = "SECS", value_parser = validate_positive_secs, global = true)]
    pub health_check_timeout: Option<Duration>,

    /// Color output control:
    /// --color sets Some(true), --no-color sets Some(false), unspecified = None (auto/TTY)
    #[arg(short = 'g', long = "color", global = true)]
    pub color: Option<bool>,

    /// Log level
    #[arg(short = 'l', long = "log-level", value_name = "LEVEL", value_parser = ["trace", "debug", "info", "warn", "error", "off"], global = true)]
    pub log_level: Option<String>,

    /// Log file path
    #[arg(short = 'f', long = "log-file", value_name = "FILE", global = true)]
    pub log_file: Option<PathBuf>,

    /// Log output format
    #[arg(short = 'o', long = "log-format", value_name = "FORMAT", value_parser = ["text", "ext", "json"], global = true)]
    pub log_format: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// List registered plugins and engine modules
    Plugins,

    /// Run a plugin against a job and print its report
    Run {
        /// Plugin name or module path
        plugin: String,

        #[arg(short = 'j', long = "job", value_name = "ID")]
        job: JobId,

        /// Task identifier recorded on the report
        #[arg(short = 't', long = "task-id", value_name = "ID")]
        task_id: Option<String>,

        /// Runtime parameter override (name=value, repeatable)
        #[arg(short = 'p', long = "param", value_name = "NAME=VALUE", value_parser = parse_key_value)]
        params: Vec<(String, Value)>,
    },

    /// Probe the service behind a plugin
    Health {
        plugin: String,

        /// User whose parameters are used to find the URL
        #[arg(short = 'u', long = "user", value_name = "NAME")]
        user: Option<String>,

        /// Organization of the user, enabling organization-level parameters
        #[arg(short = 'O', long = "organization", value_name = "NAME")]
        organization: Option<String>,
    },

    /// Run an engine module and merge its result into a job
    Aggregate {
        #[arg(short = 'j', long = "job", value_name = "ID")]
        job: JobId,

        #[arg(short = 'M', long = "module", value_name = "PATH")]
        module: String,
    },
}

/// Version string including build metadata
pub fn long_version() -> String {
    format!(
        "{} (api {}, built {}, git {})",
        env!("CARGO_PKG_VERSION"),
        crate::core::version::get_api_version(),
        crate::core::version::build_time(),
        crate::core::version::git_hash()
    )
}

impl Args {
    pub fn parse_from_env() -> Self {
        Self::parse()
    }
}
