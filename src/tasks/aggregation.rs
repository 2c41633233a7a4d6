//! Aggregation Task
//!
//! Engine modules compute a piece of a job's aggregated data model from the
//! job itself. [`execute_module`] runs one module by path and merges its
//! result into the job, overwriting keys the module returns.

use crate::plugin::api::{PluginError, PluginResult, RunError};
use crate::store::models::{DataModel, Job, JobId};
use crate::store::traits::JobStore;
use crate::tasks::{FailureLoggedTask, EXECUTE_MODULE_SOFT_TIME_LIMIT};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// A unit of aggregation logic over a job
#[async_trait::async_trait]
pub trait EngineModule: Send + Sync {
    /// Path the module is registered and looked up under
    fn path(&self) -> &'static str;

    async fn run(&self, job: &Job) -> Result<Map<String, Value>, RunError>;
}

pub type EngineModuleFactory = fn() -> Box<dyn EngineModule>;

/// Entry for a builtin engine module in the static registry
pub struct EngineModuleEntry {
    pub factory: EngineModuleFactory,
}

inventory::collect!(EngineModuleEntry);

/// Register a builtin engine module factory
#[macro_export]
macro_rules! register_engine_module {
    ($factory_expr:expr) => {
        inventory::submit!($crate::tasks::aggregation::EngineModuleEntry {
            factory: $factory_expr
        });
    };
}

/// Engine modules by path
#[derive(Default)]
pub struct EngineModuleRegistry {
    modules: BTreeMap<&'static str, EngineModuleFactory>,
}

impl EngineModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for entry in inventory::iter::<EngineModuleEntry>() {
            if let Err(e) = registry.register(entry.factory) {
                warn!("Skipping builtin engine module: {}", e);
            }
        }
        registry
    }

    pub fn register(&mut self, factory: EngineModuleFactory) -> PluginResult<()> {
        let path = factory().path();
        if self.modules.contains_key(path) {
            return Err(PluginError::DuplicatePlugin {
                plugin_name: path.to_string(),
            });
        }
        self.modules.insert(path, factory);
        Ok(())
    }

    pub fn create(&self, path: &str) -> PluginResult<Box<dyn EngineModule>> {
        self.modules
            .get(path)
            .map(|factory| factory())
            .ok_or_else(|| PluginError::ModuleNotFound {
                path: path.to_string(),
            })
    }

    pub fn paths(&self) -> Vec<&'static str> {
        self.modules.keys().copied().collect()
    }
}

/// Run the engine module at `path` for `job_id` and merge its result
///
/// Returns the job's data model as persisted.
pub async fn execute_module(
    jobs: &dyn JobStore,
    modules: &EngineModuleRegistry,
    job_id: JobId,
    path: &str,
) -> PluginResult<DataModel> {
    FailureLoggedTask::new("execute_module")
        .with_soft_time_limit(EXECUTE_MODULE_SOFT_TIME_LIMIT)
        .run(merge_module_result(jobs, modules, job_id, path))
        .await
}

async fn merge_module_result(
    jobs: &dyn JobStore,
    modules: &EngineModuleRegistry,
    job_id: JobId,
    path: &str,
) -> PluginResult<DataModel> {
    let mut job = jobs.get_job(job_id).await.map_err(|e| {
        if e.is_not_found() {
            PluginError::JobNotFound { job_id }
        } else {
            PluginError::store("get_job", e)
        }
    })?;
    let module = modules.create(path)?;

    let result = module
        .run(&job)
        .await
        .map_err(|source| PluginError::ModuleFailed {
            path: path.to_string(),
            source,
        })?;
    debug!(
        "Engine module {} returned {} keys for job #{}",
        path,
        result.len(),
        job_id
    );

    job.data_model.merge(result, false);
    jobs.save_data_model(job_id, &job.data_model)
        .await
        .map_err(|e| PluginError::store("save_data_model", e))?;
    Ok(job.data_model)
}
