//! Task entry points
//!
//! What a worker calls to run a plugin or an engine module for a job. Every
//! entry point runs inside a [`FailureLoggedTask`], which bounds it with a
//! soft time limit and logs any failure before handing it back.

pub mod aggregation;
pub mod failure;
pub mod modules;
pub mod plugin_task;

pub use aggregation::{execute_module, EngineModule, EngineModuleEntry, EngineModuleRegistry};
pub use failure::FailureLoggedTask;
pub use modules::{ObservableSummary, OBSERVABLE_SUMMARY_PATH};
pub use plugin_task::run_plugin;

use std::time::Duration;

/// Bound on a plugin's `run()`; enforced by the engine so that the report
/// is still finalized when it expires
pub const RUN_PLUGIN_SOFT_TIME_LIMIT: Duration = crate::plugin::api::DEFAULT_SOFT_TIME_LIMIT;

/// Bound on a whole engine module execution
pub const EXECUTE_MODULE_SOFT_TIME_LIMIT: Duration = Duration::from_secs(300);
