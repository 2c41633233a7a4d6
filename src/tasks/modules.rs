//! Built-in engine modules

use crate::plugin::api::RunError;
use crate::register_engine_module;
use crate::store::models::Job;
use crate::tasks::aggregation::EngineModule;
use serde_json::{json, Map, Value};

/// Copies the job's observable into the data model
#[derive(Debug, Default)]
pub struct ObservableSummary;

pub const OBSERVABLE_SUMMARY_PATH: &str = "engines_manager.modules.ObservableSummary";

fn create() -> Box<dyn EngineModule> {
    Box::new(ObservableSummary)
}

register_engine_module!(create);

#[async_trait::async_trait]
impl EngineModule for ObservableSummary {
    fn path(&self) -> &'static str {
        OBSERVABLE_SUMMARY_PATH
    }

    async fn run(&self, job: &Job) -> Result<Map<String, Value>, RunError> {
        let mut result = Map::new();
        result.insert(
            "observable".to_string(),
            json!({
                "name": job.observable_name,
                "classification": job.observable_classification.to_string(),
            }),
        );
        Ok(result)
    }
}
