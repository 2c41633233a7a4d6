//! In-memory implementation of every store trait
//!
//! Backs the CLI and the test suites. All state sits behind a single
//! `tokio::sync::RwLock`, so each trait call is atomic with respect to the
//! others.

use crate::store::error::{StoreError, StoreResult};
use crate::store::fixture::{ParameterSpec, StateFixture};
use crate::store::models::{
    DataModel, Job, JobId, OrgConfig, Organization, Parameter, Report, ReportField, ReportId,
    ReportStatus, User,
};
use crate::store::traits::{
    JobStore, OrgConfigStore, ParameterStore, ReportStore, RuntimeConfiguration,
};
use chrono::{DateTime, Utc};
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::time::Duration;
use tokio::sync::RwLock;

// (plugin, parameter, owner)
type ValueKey = (String, String, String);

#[derive(Debug, Default)]
struct State {
    jobs: BTreeMap<JobId, Job>,
    reports: BTreeMap<ReportId, Report>,
    next_report_id: ReportId,
    declared: HashMap<String, Vec<ParameterSpec>>,
    personal_values: HashMap<ValueKey, Value>,
    org_values: HashMap<ValueKey, Value>,
    org_configs: HashMap<(String, String), OrgConfig>,
}

impl State {
    fn org_config_entry(&mut self, organization: &Organization, plugin: &str) -> &mut OrgConfig {
        self.org_configs
            .entry((organization.name.clone(), plugin.to_string()))
            .or_insert_with(|| OrgConfig::new(organization.clone(), plugin))
    }

    fn resolve(&self, plugin: &str, user: &User, runtime: &RuntimeConfiguration) -> Vec<Parameter> {
        let Some(specs) = self.declared.get(plugin) else {
            return Vec::new();
        };

        specs
            .iter()
            .map(|spec| {
                let personal_key = (
                    plugin.to_string(),
                    spec.name.clone(),
                    user.username.clone(),
                );
                let org_value = user.organization().and_then(|org| {
                    self.org_values
                        .get(&(plugin.to_string(), spec.name.clone(), org.name.clone()))
                });

                let (value, is_from_org) = if let Some(value) = runtime.get(&spec.name) {
                    (Some(value.clone()), false)
                } else if let Some(value) = self.personal_values.get(&personal_key) {
                    (Some(value.clone()), false)
                } else if let Some(value) = org_value {
                    (Some(value.clone()), true)
                } else if !spec.default.is_null() {
                    (Some(spec.default.clone()), false)
                } else {
                    (None, false)
                };

                Parameter {
                    name: spec.name.clone(),
                    configured: value.is_some(),
                    value: value.unwrap_or(Value::Null),
                    is_secret: spec.is_secret,
                    required: spec.required,
                    is_from_org,
                }
            })
            .collect()
    }
}

/// Thread-safe in-memory store
#[derive(Debug, Default)]
pub struct InMemoryStore {
    state: RwLock<State>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store seeded from a state fixture
    pub fn from_fixture(fixture: StateFixture) -> Self {
        let mut state = State::default();

        for job in fixture.jobs {
            state.jobs.insert(job.id, job);
        }
        for declared in fixture.parameters {
            state
                .declared
                .entry(declared.plugin)
                .or_default()
                .push(declared.spec);
        }
        for configured in fixture.values {
            if let Some(username) = configured.user {
                state.personal_values.insert(
                    (configured.plugin, configured.parameter, username),
                    configured.value,
                );
            } else if let Some(organization) = configured.organization {
                state.org_values.insert(
                    (configured.plugin, configured.parameter, organization),
                    configured.value,
                );
            } else {
                log::warn!(
                    "Ignoring value for {}.{}: neither user nor organization given",
                    configured.plugin,
                    configured.parameter
                );
            }
        }
        for org_config in fixture.org_configs {
            let organization = Organization {
                name: org_config.organization,
            };
            let entry = state.org_config_entry(&organization, &org_config.plugin);
            entry.rate_limit_timeout = org_config.rate_limit_timeout_secs.map(Duration::from_secs);
            entry.disabled = org_config.disabled;
        }

        Self {
            state: RwLock::new(state),
        }
    }

    pub async fn insert_job(&self, job: Job) {
        self.state.write().await.jobs.insert(job.id, job);
    }

    pub async fn declare_parameter(&self, plugin: &str, spec: ParameterSpec) {
        self.state
            .write()
            .await
            .declared
            .entry(plugin.to_string())
            .or_default()
            .push(spec);
    }

    pub async fn set_personal_value(&self, plugin: &str, parameter: &str, username: &str, value: Value) {
        self.state.write().await.personal_values.insert(
            (plugin.to_string(), parameter.to_string(), username.to_string()),
            value,
        );
    }

    pub async fn set_org_value(&self, plugin: &str, parameter: &str, organization: &str, value: Value) {
        self.state.write().await.org_values.insert(
            (plugin.to_string(), parameter.to_string(), organization.to_string()),
            value,
        );
    }

    pub async fn set_rate_limit_timeout(
        &self,
        organization: &str,
        plugin: &str,
        timeout: Option<Duration>,
    ) {
        let organization = Organization {
            name: organization.to_string(),
        };
        let mut state = self.state.write().await;
        state.org_config_entry(&organization, plugin).rate_limit_timeout = timeout;
    }

    pub async fn report(&self, report_id: ReportId) -> Option<Report> {
        self.state.read().await.reports.get(&report_id).cloned()
    }

    pub async fn reports_for_job(&self, job_id: JobId) -> Vec<Report> {
        self.state
            .read()
            .await
            .reports
            .values()
            .filter(|report| report.job_id == job_id)
            .cloned()
            .collect()
    }

    pub async fn org_config(&self, organization: &str, plugin: &str) -> Option<OrgConfig> {
        self.state
            .read()
            .await
            .org_configs
            .get(&(organization.to_string(), plugin.to_string()))
            .cloned()
    }
}

#[async_trait::async_trait]
impl JobStore for InMemoryStore {
    async fn get_job(&self, job_id: JobId) -> StoreResult<Job> {
        self.state
            .read()
            .await
            .jobs
            .get(&job_id)
            .cloned()
            .ok_or_else(|| StoreError::not_found("Job", job_id))
    }

    async fn save_data_model(&self, job_id: JobId, data_model: &DataModel) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let job = state
            .jobs
            .get_mut(&job_id)
            .ok_or_else(|| StoreError::not_found("Job", job_id))?;
        job.data_model = data_model.clone();
        Ok(())
    }
}

#[async_trait::async_trait]
impl ParameterStore for InMemoryStore {
    async fn resolve_parameters(
        &self,
        plugin: &str,
        user: &User,
        runtime: &RuntimeConfiguration,
    ) -> StoreResult<Vec<Parameter>> {
        Ok(self.state.read().await.resolve(plugin, user, runtime))
    }
}

#[async_trait::async_trait]
impl ReportStore for InMemoryStore {
    async fn create_empty_report(
        &self,
        job: &Job,
        plugin: &str,
        task_id: &str,
        status: ReportStatus,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Report> {
        let mut state = self.state.write().await;
        state.next_report_id += 1;
        let report = Report {
            id: state.next_report_id,
            job_id: job.id,
            plugin: plugin.to_string(),
            task_id: task_id.to_string(),
            status,
            content: Value::Object(Default::default()),
            errors: Vec::new(),
            start_time,
            end_time: None,
        };
        state.reports.insert(report.id, report.clone());
        Ok(report)
    }

    async fn save(&self, report: &Report, fields: &[ReportField]) -> StoreResult<()> {
        let mut state = self.state.write().await;
        let stored = state
            .reports
            .get_mut(&report.id)
            .ok_or_else(|| StoreError::not_found("Report", report.id))?;
        for field in fields {
            match field {
                ReportField::Status => stored.status = report.status,
                ReportField::Content => stored.content = report.content.clone(),
                ReportField::Errors => stored.errors = report.errors.clone(),
                ReportField::EndTime => stored.end_time = report.end_time,
            }
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl OrgConfigStore for InMemoryStore {
    async fn get_or_create(
        &self,
        organization: &Organization,
        plugin: &str,
    ) -> StoreResult<OrgConfig> {
        let mut state = self.state.write().await;
        Ok(state.org_config_entry(organization, plugin).clone())
    }

    async fn disable_for_rate_limit(
        &self,
        organization: &Organization,
        plugin: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut state = self.state.write().await;
        let config = state.org_config_entry(organization, plugin);
        if config.is_disabled_at(now) {
            return Ok(false);
        }
        let timeout = config
            .rate_limit_timeout
            .and_then(|timeout| chrono::Duration::from_std(timeout).ok());
        config.disabled = true;
        config.disabled_until = timeout.map(|timeout| now + timeout);
        log::info!(
            "Disabled {} for organization {} until {:?}",
            plugin,
            organization.name,
            config.disabled_until
        );
        Ok(true)
    }
}
