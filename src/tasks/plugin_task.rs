//! Plugin task entry point

use crate::plugin::api::{ExecutionEngine, PluginRegistry, PluginResult};
use crate::store::models::{JobId, Report};
use crate::store::traits::RuntimeConfiguration;
use crate::tasks::FailureLoggedTask;
use log::info;

/// Instantiate `plugin_name` and run it against `job_id`
///
/// The engine bounds `run()` with its soft time limit
/// ([`crate::tasks::RUN_PLUGIN_SOFT_TIME_LIMIT`] by default), so the task
/// itself is not cut short and the report is always finalized.
pub async fn run_plugin(
    engine: &ExecutionEngine,
    registry: &PluginRegistry,
    plugin_name: &str,
    job_id: JobId,
    runtime: &RuntimeConfiguration,
    task_id: &str,
) -> PluginResult<Report> {
    FailureLoggedTask::new("run_plugin")
        .run(async {
            let mut plugin = registry.create(plugin_name)?;
            info!("Running {} on job #{} (task {})", plugin_name, job_id, task_id);
            engine
                .start(plugin.as_mut(), job_id, runtime, task_id)
                .await
        })
        .await
}
