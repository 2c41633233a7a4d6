//! Type definitions for the plugin system
//!
//! Metadata describing a plugin, the category it belongs to, where its
//! implementation is stored, and the small enums the engine reports back.

use serde::{Deserialize, Serialize};

/// Plugin metadata information
#[derive(Debug, Clone, PartialEq)]
pub struct PluginInfo {
    pub name: String,
    pub version: String,
    pub description: String,
    pub author: String,
    pub api_version: u32,
    pub plugin_type: PluginType,
    /// Dotted path of the implementation below the type's base path
    pub module: String,
}

/// Plugin type classification
///
/// Each category has its own configuration and report models in the
/// persistence layer, and its own base path for stored modules:
///
/// - `Analyzer`: inspects an observable or a file and produces a report.
/// - `Connector`: pushes job results to an external platform.
/// - `Pivot`: starts a follow-up job from the results of another one.
/// - `Visualizer`: reshapes reports for presentation.
/// - `Ingestor`: pulls observables from a feed and creates jobs.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    strum_macros::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum PluginType {
    Analyzer,
    Connector,
    Pivot,
    Visualizer,
    Ingestor,
}

impl PluginType {
    /// Name of the configuration model, used in error log messages
    pub fn config_model(&self) -> &'static str {
        match self {
            PluginType::Analyzer => "AnalyzerConfig",
            PluginType::Connector => "ConnectorConfig",
            PluginType::Pivot => "PivotConfig",
            PluginType::Visualizer => "VisualizerConfig",
            PluginType::Ingestor => "IngestorConfig",
        }
    }

    pub fn report_model(&self) -> &'static str {
        match self {
            PluginType::Analyzer => "AnalyzerReport",
            PluginType::Connector => "ConnectorReport",
            PluginType::Pivot => "PivotReport",
            PluginType::Visualizer => "VisualizerReport",
            PluginType::Ingestor => "IngestorReport",
        }
    }

    /// Root under which modules of this type are stored
    pub fn base_path(&self) -> &'static str {
        match self {
            PluginType::Analyzer => "analyzers_manager",
            PluginType::Connector => "connectors_manager",
            PluginType::Pivot => "pivots_manager",
            PluginType::Visualizer => "visualizers_manager",
            PluginType::Ingestor => "ingestors_manager",
        }
    }
}

/// Where a plugin's implementation lives
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ModuleDescriptor {
    pub base_path: String,
    pub module: String,
}

impl ModuleDescriptor {
    pub fn for_info(info: &PluginInfo) -> Self {
        Self {
            base_path: info.plugin_type.base_path().to_string(),
            module: info.module.clone(),
        }
    }
}

impl std::fmt::Display for ModuleDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}", self.base_path, self.module)
    }
}

/// How the engine treats failures and outbound connections
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum ExecutionMode {
    #[default]
    Normal,
    /// Run failures are returned to the caller after being recorded.
    /// Health probes are skipped.
    #[serde(rename = "strict")]
    #[strum(serialize = "strict")]
    StrictVerification,
    /// Health probes are skipped
    MockConnections,
}

impl ExecutionMode {
    pub fn is_strict(&self) -> bool {
        matches!(self, ExecutionMode::StrictVerification)
    }

    pub fn mocks_connections(&self) -> bool {
        matches!(
            self,
            ExecutionMode::StrictVerification | ExecutionMode::MockConnections
        )
    }
}

/// Result of a health check
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
    /// No URL to probe
    Undefined,
}

impl HealthStatus {
    pub fn from_healthy(healthy: bool) -> Self {
        if healthy {
            HealthStatus::Healthy
        } else {
            HealthStatus::Unhealthy
        }
    }
}

/// Lifecycle state of one plugin execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum EngineState {
    Created,
    Configured,
    Running,
    Succeeded,
    Failed,
    Finalized,
}
