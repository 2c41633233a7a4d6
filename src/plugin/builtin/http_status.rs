//! HTTP Status Analyzer
//!
//! Fetches the observable (a URL, or `http://<domain>` for a domain) and
//! reports the response status with a few identifying headers.
//!
//! The target changes with every job, so the plugin has no service URL of
//! its own; a health check needs a configured `*url*` parameter such as
//! `health_check_url`.

use crate::core::version;
use crate::plugin::content::ReportContent;
use crate::plugin::error::RunError;
use crate::plugin::traits::{Plugin, RunContext};
use crate::plugin::types::{PluginInfo, PluginType};
use crate::register_plugin;
use crate::store::models::{Job, ObservableKind};
use log::debug;
use serde_json::{json, Map, Value};
use std::time::Duration;

const DEFAULT_TIMEOUT_SECS: u64 = 10;
const REPORTED_HEADERS: [&str; 3] = ["server", "content-type", "location"];

#[derive(Debug, Default)]
pub struct HttpStatus {
    url: Option<String>,
    timeout: Option<Duration>,
    client: Option<reqwest::Client>,
}

impl HttpStatus {
    pub fn new() -> Self {
        Self::default()
    }

    /// URL to fetch for the job's observable
    pub fn target_url(job: &Job) -> Result<String, RunError> {
        match job.observable_classification {
            ObservableKind::Url => Ok(job.observable_name.clone()),
            ObservableKind::Domain => Ok(format!("http://{}", job.observable_name)),
            other => Err(RunError::declared(
                "invalid_observable",
                format!("Unsupported observable classification '{}'", other),
            )),
        }
    }
}

fn create() -> Box<dyn Plugin> {
    Box::new(HttpStatus::new())
}

register_plugin!(create);

#[async_trait::async_trait]
impl Plugin for HttpStatus {
    fn info(&self) -> PluginInfo {
        PluginInfo {
            name: "http_status".to_string(),
            version: "1.0.0".to_string(),
            description: "Report the HTTP status of a URL or domain".to_string(),
            author: "intelrun".to_string(),
            api_version: version::get_api_version(),
            plugin_type: PluginType::Analyzer,
            module: "observable_analyzers.http_status.HttpStatus".to_string(),
        }
    }

    fn expected_errors(&self) -> &'static [&'static str] {
        &["invalid_observable"]
    }

    async fn before_run(&mut self, ctx: &RunContext<'_>) -> Result<(), RunError> {
        let timeout = ctx
            .parameters
            .get_u64("timeout")
            .unwrap_or(DEFAULT_TIMEOUT_SECS);
        self.timeout = Some(Duration::from_secs(timeout));
        self.url = Some(Self::target_url(ctx.job)?);
        self.client = Some(reqwest::Client::builder().build()?);
        Ok(())
    }

    async fn run(&mut self, _ctx: &RunContext<'_>) -> Result<ReportContent, RunError> {
        let (Some(client), Some(url)) = (&self.client, &self.url) else {
            return Err(RunError::unexpected("run() called before before_run()"));
        };
        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));

        debug!("GET {} (timeout {:?})", url, timeout);
        let response = client.get(url).timeout(timeout).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(RunError::http(status.as_u16(), "Too Many Requests"));
        }

        let mut headers = Map::new();
        for name in REPORTED_HEADERS {
            if let Some(value) = response.headers().get(name).and_then(|v| v.to_str().ok()) {
                headers.insert(name.to_string(), Value::from(value));
            }
        }

        Ok(ReportContent::Json(json!({
            "url": url,
            "status": status.as_u16(),
            "ok": status.is_success(),
            "headers": headers,
        })))
    }

    async fn after_run(&mut self) -> crate::plugin::error::PluginResult<()> {
        self.client = None;
        Ok(())
    }
}
