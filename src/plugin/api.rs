//! Public API for the plugin system
//!
//! External modules should import from here rather than directly from
//! internal modules.

// Execution engine
pub use crate::plugin::engine::{
    Collaborators, EngineSettings, ExecutionEngine, DEFAULT_SOFT_TIME_LIMIT,
};

// Error handling
pub use crate::plugin::error::{BoxError, ErrorClass, PluginError, PluginResult, RunError};

// Plugin contract and metadata
pub use crate::plugin::content::{ContentItem, ReportContent};
pub use crate::plugin::traits::{Plugin, RunContext};
pub use crate::plugin::types::{
    EngineState, ExecutionMode, HealthStatus, ModuleDescriptor, PluginInfo, PluginType,
};

// Parameters
pub use crate::plugin::parameters::{resolve as resolve_parameters, PluginParameters, SecretValue};

// Lifecycle collaborators
pub use crate::plugin::health::{
    HealthProbe, HttpProbe, ProbeOutcome, DEFAULT_HEALTH_CHECK_TIMEOUT,
};
pub use crate::plugin::rate_limit::{BreakerDecision, RateLimitBreaker};
pub use crate::plugin::report::ReportLifecycle;

// Plugin registry
pub use crate::plugin::builtin::api::{PluginEntry, PluginFactory};
pub use crate::plugin::registry::PluginRegistry;
