//! Plugin Test Utilities
//!
//! Scripted plugins, fake collaborators and fixtures shared by the engine,
//! breaker and registry tests.

use crate::core::time::MockClock;
use crate::plugin::content::ReportContent;
use crate::plugin::engine::{Collaborators, EngineSettings, ExecutionEngine};
use crate::plugin::error::{PluginError, PluginResult, RunError};
use crate::plugin::health::{HealthProbe, ProbeOutcome};
use crate::plugin::parameters::PluginParameters;
use crate::plugin::traits::{Plugin, RunContext};
use crate::plugin::types::{PluginInfo, PluginType};
use crate::store::error::{StoreError, StoreResult};
use crate::store::models::{
    DataModel, Job, JobId, ObservableKind, OrgConfig, Organization, Parameter, Report,
    ReportField, ReportStatus, User,
};
use crate::store::traits::{OrgConfigStore, ParameterStore, ReportStore, RuntimeConfiguration};
use crate::store::InMemoryStore;
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub const TEST_API_VERSION: u32 = 20261001;

pub fn test_info(name: &str, api_version: u32) -> PluginInfo {
    PluginInfo {
        name: name.to_string(),
        version: "1.0.0".to_string(),
        description: "Scripted plugin for testing".to_string(),
        author: "Test Author".to_string(),
        api_version,
        plugin_type: PluginType::Analyzer,
        module: format!("tests.scripted.{}", capitalize(name)),
    }
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// What a scripted `run()` does
pub enum Script {
    Succeed(ReportContent),
    Fail(RunError),
    Sleep(Duration),
}

/// Hooks seen by a scripted plugin, shared with the test after the run
#[derive(Debug, Default)]
pub struct Observations {
    pub calls: Vec<&'static str>,
    pub parameters: Option<PluginParameters>,
    /// Report statuses found in the store when `before_run` was entered
    pub statuses_at_before_run: Vec<ReportStatus>,
}

/// Plugin whose behavior is set up by the test
pub struct ScriptedPlugin {
    pub info: PluginInfo,
    pub script: Option<Script>,
    pub before_run_error: Option<RunError>,
    pub after_run_error: Option<String>,
    pub expected: &'static [&'static str],
    pub url: Option<String>,
    pub observer: Option<(Arc<InMemoryStore>, JobId)>,
    pub observations: Arc<Mutex<Observations>>,
}

impl ScriptedPlugin {
    pub fn new(name: &str, script: Script) -> Self {
        Self {
            info: test_info(name, TEST_API_VERSION),
            script: Some(script),
            before_run_error: None,
            after_run_error: None,
            expected: &["invalid_observable"],
            url: None,
            observer: None,
            observations: Arc::new(Mutex::new(Observations::default())),
        }
    }

    pub fn succeeding(name: &str, content: ReportContent) -> Self {
        Self::new(name, Script::Succeed(content))
    }

    pub fn failing(name: &str, error: RunError) -> Self {
        Self::new(name, Script::Fail(error))
    }

    pub fn with_before_run_error(mut self, error: RunError) -> Self {
        self.before_run_error = Some(error);
        self
    }

    pub fn with_after_run_error(mut self, cause: &str) -> Self {
        self.after_run_error = Some(cause.to_string());
        self
    }

    pub fn with_url(mut self, url: &str) -> Self {
        self.url = Some(url.to_string());
        self
    }

    pub fn observing(mut self, store: Arc<InMemoryStore>, job_id: JobId) -> Self {
        self.observer = Some((store, job_id));
        self
    }

    pub fn observations(&self) -> Arc<Mutex<Observations>> {
        self.observations.clone()
    }
}

#[async_trait::async_trait]
impl Plugin for ScriptedPlugin {
    fn info(&self) -> PluginInfo {
        self.info.clone()
    }

    fn expected_errors(&self) -> &'static [&'static str] {
        self.expected
    }

    fn url(&self) -> Option<String> {
        self.url.clone()
    }

    async fn before_run(&mut self, ctx: &RunContext<'_>) -> Result<(), RunError> {
        let statuses = match &self.observer {
            Some((store, job_id)) => store
                .reports_for_job(*job_id)
                .await
                .into_iter()
                .map(|report| report.status)
                .collect(),
            None => Vec::new(),
        };
        {
            let mut observations = self.observations.lock().unwrap();
            observations.calls.push("before_run");
            observations.parameters = Some(ctx.parameters.clone());
            observations.statuses_at_before_run = statuses;
        }
        match self.before_run_error.take() {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    async fn run(&mut self, _ctx: &RunContext<'_>) -> Result<ReportContent, RunError> {
        self.observations.lock().unwrap().calls.push("run");
        match self.script.take() {
            Some(Script::Succeed(content)) => Ok(content),
            Some(Script::Fail(error)) => Err(error),
            Some(Script::Sleep(duration)) => {
                tokio::time::sleep(duration).await;
                Ok(ReportContent::Json(serde_json::json!({"slept": true})))
            }
            None => Err(RunError::unexpected("script already consumed")),
        }
    }

    async fn after_run(&mut self) -> PluginResult<()> {
        self.observations.lock().unwrap().calls.push("after_run");
        match self.after_run_error.take() {
            Some(cause) => Err(PluginError::Hook {
                plugin_name: self.info.name.clone(),
                hook: "after_run",
                cause,
            }),
            None => Ok(()),
        }
    }
}

pub fn scripted_alpha() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin::succeeding(
        "alpha",
        ReportContent::Json(serde_json::json!({})),
    ))
}

pub fn scripted_beta() -> Box<dyn Plugin> {
    Box::new(ScriptedPlugin::succeeding(
        "beta",
        ReportContent::Json(serde_json::json!({})),
    ))
}

pub fn incompatible_plugin() -> Box<dyn Plugin> {
    let mut plugin = ScriptedPlugin::succeeding("legacy", ReportContent::Json(serde_json::json!({})));
    plugin.info = test_info("legacy", 20190101);
    Box::new(plugin)
}

/// Probe returning a fixed outcome and counting calls
pub struct FakeProbe {
    outcome: ProbeOutcome,
    calls: AtomicUsize,
    last_url: Mutex<Option<String>>,
}

impl FakeProbe {
    pub fn new(outcome: ProbeOutcome) -> Self {
        Self {
            outcome,
            calls: AtomicUsize::new(0),
            last_url: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn last_url(&self) -> Option<String> {
        self.last_url.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl HealthProbe for FakeProbe {
    async fn head(&self, url: &str, _timeout: Duration) -> ProbeOutcome {
        self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_url.lock().unwrap() = Some(url.to_string());
        self.outcome.clone()
    }
}

/// Organization store that counts disable requests
pub struct CountingOrgStore {
    inner: Arc<InMemoryStore>,
    disables: AtomicUsize,
}

impl CountingOrgStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self {
            inner,
            disables: AtomicUsize::new(0),
        }
    }

    pub fn disables(&self) -> usize {
        self.disables.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl OrgConfigStore for CountingOrgStore {
    async fn get_or_create(
        &self,
        organization: &Organization,
        plugin: &str,
    ) -> StoreResult<OrgConfig> {
        self.inner.get_or_create(organization, plugin).await
    }

    async fn disable_for_rate_limit(
        &self,
        organization: &Organization,
        plugin: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        self.disables.fetch_add(1, Ordering::SeqCst);
        self.inner
            .disable_for_rate_limit(organization, plugin, now)
            .await
    }
}

/// Parameter store whose backend is down
pub struct BrokenParameterStore;

#[async_trait::async_trait]
impl ParameterStore for BrokenParameterStore {
    async fn resolve_parameters(
        &self,
        _plugin: &str,
        _user: &User,
        _runtime: &RuntimeConfiguration,
    ) -> StoreResult<Vec<Parameter>> {
        Err(StoreError::Backend {
            message: "connection refused".to_string(),
        })
    }
}

/// Report store that creates reports but cannot persist errors
pub struct ErrorsUnwritableReportStore {
    inner: Arc<InMemoryStore>,
}

impl ErrorsUnwritableReportStore {
    pub fn new(inner: Arc<InMemoryStore>) -> Self {
        Self { inner }
    }
}

#[async_trait::async_trait]
impl ReportStore for ErrorsUnwritableReportStore {
    async fn create_empty_report(
        &self,
        job: &Job,
        plugin: &str,
        task_id: &str,
        status: ReportStatus,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Report> {
        self.inner
            .create_empty_report(job, plugin, task_id, status, start_time)
            .await
    }

    async fn save(&self, report: &Report, fields: &[ReportField]) -> StoreResult<()> {
        if fields.contains(&ReportField::Errors) {
            return Err(StoreError::Backend {
                message: "disk full".to_string(),
            });
        }
        self.inner.save(report, fields).await
    }
}

pub fn start_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 10, 1, 12, 0, 0).unwrap()
}

pub fn job(id: JobId, user: User) -> Job {
    Job {
        id,
        user,
        observable_name: "example.com".to_string(),
        observable_classification: ObservableKind::Domain,
        data_model: DataModel::default(),
    }
}

/// Everything an engine test needs, wired to one in-memory store
pub struct Harness {
    pub store: Arc<InMemoryStore>,
    pub org_store: Arc<CountingOrgStore>,
    pub probe: Arc<FakeProbe>,
    pub clock: MockClock,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            org_store: Arc::new(CountingOrgStore::new(store.clone())),
            store,
            probe: Arc::new(FakeProbe::new(ProbeOutcome::Status(200))),
            clock: MockClock::at(start_time()),
        }
    }

    pub fn with_probe(mut self, outcome: ProbeOutcome) -> Self {
        self.probe = Arc::new(FakeProbe::new(outcome));
        self
    }

    pub fn collaborators(&self) -> Collaborators {
        Collaborators::from_store(self.store.clone(), self.probe.clone())
            .with_org_configs(self.org_store.clone())
            .with_clock(Arc::new(self.clock.clone()))
    }

    pub fn engine(&self, settings: EngineSettings) -> ExecutionEngine {
        ExecutionEngine::new(self.collaborators(), settings)
    }
}
