//! Common test utilities and helpers
//!
//! Plugin fixtures and file helpers shared by the integration suites.

#![allow(dead_code)]

use async_trait::async_trait;
use intelrun::plugin::api::{
    Collaborators, EngineSettings, ExecutionEngine, HttpProbe, Plugin, PluginInfo, PluginType,
    ReportContent, RunContext, RunError,
};
use intelrun::store::InMemoryStore;
use serde_json::json;
use std::io::Write;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;

/// Plugin that only exists to be health checked
pub struct ProbeTarget {
    pub url: Option<String>,
}

#[async_trait]
impl Plugin for ProbeTarget {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "probe_target".to_string(),
            version: "1.0.0".to_string(),
            description: "Health check target".to_string(),
            author: "tests".to_string(),
            api_version: 20261001,
            plugin_type: PluginType::Analyzer,
            module: "tests.ProbeTarget".to_string(),
        }
    }

    fn expected_errors(&self) -> &'static [&'static str] {
        &[]
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    async fn run(&mut self, _ctx: &RunContext<'_>) -> Result<ReportContent, RunError> {
        Ok(ReportContent::Json(json!({})))
    }
}

/// Engine over `store` probing real HTTP endpoints
pub fn http_engine(store: Arc<InMemoryStore>, health_check_timeout: Duration) -> ExecutionEngine {
    let probe = Arc::new(HttpProbe::new().expect("failed to build probe"));
    ExecutionEngine::new(
        Collaborators::from_store(store, probe),
        EngineSettings {
            health_check_timeout,
            ..EngineSettings::default()
        },
    )
}

/// Write `contents` to a temporary `.toml` file
pub fn toml_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("failed to create temp file");
    file.write_all(contents.as_bytes())
        .expect("failed to write temp file");
    file
}
