//! Plugin Trait System
//!
//! The contract every plugin implements. The engine drives a plugin through
//! `before_run`, `run` and `after_run` for one job; plugins never touch the
//! report or the stores themselves.
//!
//! # Lifecycle
//!
//! 1. The engine resolves the plugin's parameters and builds a [`RunContext`].
//! 2. [`Plugin::before_run`] prepares the instance (validate input, build clients).
//! 3. [`Plugin::run`] produces [`ReportContent`] or raises a [`RunError`].
//! 4. [`Plugin::after_run`] always runs, on success and on failure.

use crate::core::version;
use crate::plugin::content::ReportContent;
use crate::plugin::error::{PluginError, PluginResult, RunError};
use crate::plugin::parameters::PluginParameters;
use crate::plugin::types::{PluginInfo, PluginType};
use crate::store::models::Job;

/// What a plugin sees while it runs
#[derive(Debug, Clone, Copy)]
pub struct RunContext<'a> {
    pub job: &'a Job,
    pub parameters: &'a PluginParameters,
    pub task_id: &'a str,
}

/// Base plugin trait that all plugins must implement
#[async_trait::async_trait]
pub trait Plugin: Send + Sync {
    /// Get plugin metadata
    fn info(&self) -> PluginInfo;

    fn name(&self) -> String {
        self.info().name
    }

    fn plugin_type(&self) -> PluginType {
        self.info().plugin_type
    }

    /// Declared error kinds that are an expected failure mode of this plugin
    ///
    /// A `RunError::Declared` whose kind is listed here is logged as an
    /// expected error; any other kind is treated as a plugin defect.
    fn expected_errors(&self) -> &'static [&'static str];

    /// Service URL used by health checks when no URL parameter is configured
    fn url(&self) -> Option<String> {
        None
    }

    /// Check if this plugin is compatible with the given system API version
    fn is_compatible(&self, system_api_version: u32) -> bool {
        version::is_api_compatible(self.info().api_version, system_api_version)
    }

    async fn before_run(&mut self, _ctx: &RunContext<'_>) -> Result<(), RunError> {
        Ok(())
    }

    async fn run(&mut self, ctx: &RunContext<'_>) -> Result<ReportContent, RunError>;

    /// Cleanup hook; errors here are treated as fatal plugin defects
    async fn after_run(&mut self) -> PluginResult<()> {
        Ok(())
    }

    /// Refresh external data the plugin depends on (signatures, feeds)
    async fn update(&mut self) -> PluginResult<bool> {
        Err(PluginError::Unsupported {
            plugin_name: self.name(),
            operation: "update",
        })
    }
}
