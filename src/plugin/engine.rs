//! Plugin Execution Engine
//!
//! Drives one plugin through `before_run`, `run` and `after_run` for a job.
//! Every execution gets a report that is created RUNNING before any plugin
//! code runs, reaches SUCCESS or FAILED, and is finalized with an end time
//! whatever happened in between.
//!
//! Failures raised by plugin code are recorded on the report and logged
//! according to their [`ErrorClass`]; they are not returned to the caller
//! unless the engine runs in [`ExecutionMode::StrictVerification`]. HTTP 429
//! failures go to the [`RateLimitBreaker`] instead of the error log.

use crate::core::time::{Clock, SystemClock};
use crate::core::validation::is_http_url;
use crate::plugin::content::ReportContent;
use crate::plugin::error::{ErrorClass, PluginError, PluginResult, RunError};
use crate::plugin::health::{HealthProbe, DEFAULT_HEALTH_CHECK_TIMEOUT};
use crate::plugin::parameters::{self, PluginParameters};
use crate::plugin::rate_limit::RateLimitBreaker;
use crate::plugin::report::ReportLifecycle;
use crate::plugin::traits::{Plugin, RunContext};
use crate::plugin::types::{EngineState, ExecutionMode, HealthStatus, PluginType};
use crate::store::models::{Job, JobId, Report, User};
use crate::store::traits::{JobStore, OrgConfigStore, ParameterStore, ReportStore, RuntimeConfiguration};
use crate::store::InMemoryStore;
use log::{debug, error, info};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Soft time limit applied to `run()` unless configured otherwise
pub const DEFAULT_SOFT_TIME_LIMIT: Duration = Duration::from_secs(500);

/// External services the engine depends on
#[derive(Clone)]
pub struct Collaborators {
    pub jobs: Arc<dyn JobStore>,
    pub parameters: Arc<dyn ParameterStore>,
    pub reports: Arc<dyn ReportStore>,
    pub org_configs: Arc<dyn OrgConfigStore>,
    pub probe: Arc<dyn HealthProbe>,
    pub clock: Arc<dyn Clock>,
}

impl Collaborators {
    /// Use one in-memory store for every persistence concern
    pub fn from_store(store: Arc<InMemoryStore>, probe: Arc<dyn HealthProbe>) -> Self {
        Self {
            jobs: store.clone(),
            parameters: store.clone(),
            reports: store.clone(),
            org_configs: store,
            probe,
            clock: Arc::new(SystemClock),
        }
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn with_org_configs(mut self, org_configs: Arc<dyn OrgConfigStore>) -> Self {
        self.org_configs = org_configs;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EngineSettings {
    pub mode: ExecutionMode,
    /// Upper bound on `run()`; `None` disables the limit
    pub soft_time_limit: Option<Duration>,
    pub health_check_timeout: Duration,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Normal,
            soft_time_limit: Some(DEFAULT_SOFT_TIME_LIMIT),
            health_check_timeout: DEFAULT_HEALTH_CHECK_TIMEOUT,
        }
    }
}

/// State of one execution, alive for the duration of `start`
struct PluginInstance {
    name: String,
    plugin_type: PluginType,
    job: Job,
    task_id: String,
    parameters: PluginParameters,
    report: ReportLifecycle,
    state: EngineState,
}

impl PluginInstance {
    fn advance(&mut self, next: EngineState) {
        debug!("{}: {} -> {}", self, self.state, next);
        self.state = next;
    }

    fn context(&self) -> RunContext<'_> {
        RunContext {
            job: &self.job,
            parameters: &self.parameters,
            task_id: &self.task_id,
        }
    }

    fn error_message(&self, error: &RunError, unexpected: bool) -> String {
        if unexpected {
            format!("{}. Unexpected error: '{}'", self, error)
        } else {
            format!(
                "{}. {} error: '{}'",
                self,
                self.plugin_type.config_model(),
                error
            )
        }
    }
}

impl fmt::Display for PluginInstance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, job: #{})", self.name, self.job.id)
    }
}

pub struct ExecutionEngine {
    collaborators: Collaborators,
    settings: EngineSettings,
    breaker: RateLimitBreaker,
}

impl ExecutionEngine {
    pub fn new(collaborators: Collaborators, settings: EngineSettings) -> Self {
        let breaker = RateLimitBreaker::new(
            collaborators.org_configs.clone(),
            collaborators.clock.clone(),
        );
        Self {
            collaborators,
            settings,
            breaker,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn jobs(&self) -> &Arc<dyn JobStore> {
        &self.collaborators.jobs
    }

    /// Execute `plugin` against `job_id`
    ///
    /// Returns the finalized report. Only lookup, store and `after_run`
    /// failures are returned as errors, plus run failures in strict mode.
    pub async fn start(
        &self,
        plugin: &mut dyn Plugin,
        job_id: JobId,
        runtime: &RuntimeConfiguration,
        task_id: &str,
    ) -> PluginResult<Report> {
        let job = self.bind_job(job_id).await?;
        let name = plugin.name();
        let report = ReportLifecycle::create_running(
            self.collaborators.reports.clone(),
            &job,
            &name,
            task_id,
            self.collaborators.clock.now(),
        )
        .await?;

        let mut instance = PluginInstance {
            name,
            plugin_type: plugin.plugin_type(),
            job,
            task_id: task_id.to_string(),
            parameters: PluginParameters::default(),
            report,
            state: EngineState::Created,
        };

        let outcome = self.guarded_run(plugin, &mut instance, runtime).await;
        let (handled, failure) = match outcome {
            Ok(content) => (self.after_run_success(&mut instance, content).await, None),
            Err(error) => (
                self.after_run_failed(&*plugin, &mut instance, &error).await,
                Some(error),
            ),
        };
        let finalized = self.after_run(plugin, &mut instance).await;

        handled?;
        finalized?;

        if let Some(error) = failure {
            if self.settings.mode.is_strict() {
                return Err(PluginError::RunFailed {
                    plugin_name: instance.name,
                    source: error,
                });
            }
        }
        Ok(instance.report.into_report())
    }

    async fn bind_job(&self, job_id: JobId) -> PluginResult<Job> {
        self.collaborators
            .jobs
            .get_job(job_id)
            .await
            .map_err(|e| {
                if e.is_not_found() {
                    PluginError::JobNotFound { job_id }
                } else {
                    PluginError::store("get_job", e)
                }
            })
    }

    /// Configuration, `before_run` and `run`; any failure lands here
    async fn guarded_run(
        &self,
        plugin: &mut dyn Plugin,
        instance: &mut PluginInstance,
        runtime: &RuntimeConfiguration,
    ) -> Result<ReportContent, RunError> {
        instance.parameters = parameters::resolve(
            self.collaborators.parameters.as_ref(),
            &instance.name,
            &instance.job.user,
            runtime,
        )
        .await
        .map_err(RunError::unexpected)?;
        instance.advance(EngineState::Configured);

        plugin.before_run(&instance.context()).await?;

        instance.advance(EngineState::Running);
        let ctx = instance.context();
        match self.settings.soft_time_limit {
            Some(limit) => tokio::time::timeout(limit, plugin.run(&ctx))
                .await
                .map_err(|_| RunError::Timeout { limit })?,
            None => plugin.run(&ctx).await,
        }
    }

    async fn after_run_success(
        &self,
        instance: &mut PluginInstance,
        content: ReportContent,
    ) -> PluginResult<()> {
        instance.advance(EngineState::Succeeded);
        instance.report.mark_success(content.into_json()).await
    }

    async fn after_run_failed(
        &self,
        plugin: &dyn Plugin,
        instance: &mut PluginInstance,
        error: &RunError,
    ) -> PluginResult<()> {
        instance.advance(EngineState::Failed);
        // Classified even when the report cannot be saved
        let recorded = instance.report.mark_failed(error.to_string()).await;

        match ErrorClass::of(error, plugin.expected_errors()) {
            ErrorClass::RateLimited => {
                let decision = self
                    .breaker
                    .disable_for_rate_limit(
                        &instance.name,
                        &instance.to_string(),
                        &instance.job.user,
                        &instance.parameters,
                    )
                    .await?;
                debug!("{}: rate limit breaker decision {:?}", instance, decision);
            }
            ErrorClass::Expected => error!("{}", instance.error_message(error, false)),
            ErrorClass::Unexpected => {
                error!("{}", instance.error_message(error, true));
                debug!("{}: {:?}", instance, error);
            }
        }
        recorded
    }

    /// Always runs: the plugin's cleanup hook, then the end time
    async fn after_run(
        &self,
        plugin: &mut dyn Plugin,
        instance: &mut PluginInstance,
    ) -> PluginResult<()> {
        let hook = plugin.after_run().await;
        let finalized = instance
            .report
            .finalize(self.collaborators.clock.now())
            .await;
        instance.advance(EngineState::Finalized);
        finalized?;

        hook.map_err(|e| PluginError::Hook {
            plugin_name: instance.name.clone(),
            hook: "after_run",
            cause: e.to_string(),
        })
    }

    /// Probe the service behind `plugin` on behalf of `user`
    pub async fn health_check(&self, plugin: &dyn Plugin, user: &User) -> PluginResult<HealthStatus> {
        let name = plugin.name();
        let Some(url) = self.health_check_url(plugin, user).await? else {
            debug!("No health check url for {}", name);
            return Ok(HealthStatus::Undefined);
        };
        if !is_http_url(&url) {
            debug!("Health check url {} for {} is not http", url, name);
            return Ok(HealthStatus::Undefined);
        }
        if self.settings.mode.mocks_connections() {
            return Ok(HealthStatus::Healthy);
        }

        info!("healthcheck url {} for {}", url, name);
        let outcome = self
            .collaborators
            .probe
            .head(&url, self.settings.health_check_timeout)
            .await;
        if !outcome.is_healthy() {
            info!(
                "healthcheck failed: url {} for {}. Error: {}",
                url, name, outcome
            );
        }
        Ok(HealthStatus::from_healthy(outcome.is_healthy()))
    }

    async fn health_check_url(&self, plugin: &dyn Plugin, user: &User) -> PluginResult<Option<String>> {
        let name = plugin.name();
        let params = parameters::resolve(
            self.collaborators.parameters.as_ref(),
            &name,
            user,
            &RuntimeConfiguration::new(),
        )
        .await?;

        if let Some(url) = params.health_check_url() {
            info!("Url retrieved to verify for {}", name);
            return Ok(Some(url.to_string()));
        }
        Ok(plugin.url().filter(|url| !url.is_empty()))
    }
}
