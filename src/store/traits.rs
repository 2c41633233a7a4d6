//! Collaborator interfaces consumed by the execution engine
//!
//! The engine never talks to a database directly. Each persistence concern
//! is a trait so that deployments can plug in their own backend and tests
//! can substitute fakes.

use crate::store::error::StoreResult;
use crate::store::models::{
    DataModel, Job, JobId, OrgConfig, Organization, Parameter, Report, ReportField, ReportStatus,
    User,
};
use chrono::{DateTime, Utc};
use serde_json::{Map, Value};

/// Runtime overrides for one plugin, keyed by parameter name
pub type RuntimeConfiguration = Map<String, Value>;

#[async_trait::async_trait]
pub trait JobStore: Send + Sync {
    /// Look up a job; `StoreError::NotFound` when it does not exist
    async fn get_job(&self, job_id: JobId) -> StoreResult<Job>;

    /// Persist a job's aggregated data model
    async fn save_data_model(&self, job_id: JobId, data_model: &DataModel) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait ParameterStore: Send + Sync {
    /// Resolve the parameters declared by `plugin` for `user`
    ///
    /// Precedence is runtime override, then the user's personal value, then
    /// the organization value, then the declared default. The returned list
    /// keeps declaration order.
    async fn resolve_parameters(
        &self,
        plugin: &str,
        user: &User,
        runtime: &RuntimeConfiguration,
    ) -> StoreResult<Vec<Parameter>>;
}

#[async_trait::async_trait]
pub trait ReportStore: Send + Sync {
    async fn create_empty_report(
        &self,
        job: &Job,
        plugin: &str,
        task_id: &str,
        status: ReportStatus,
        start_time: DateTime<Utc>,
    ) -> StoreResult<Report>;

    /// Write only the listed fields of `report`
    async fn save(&self, report: &Report, fields: &[ReportField]) -> StoreResult<()>;
}

#[async_trait::async_trait]
pub trait OrgConfigStore: Send + Sync {
    async fn get_or_create(
        &self,
        organization: &Organization,
        plugin: &str,
    ) -> StoreResult<OrgConfig>;

    /// Disable `plugin` for `organization` for its rate-limit timeout
    ///
    /// Returns `false` when the configuration was already disabled, so that
    /// concurrent callers can race on it safely.
    async fn disable_for_rate_limit(
        &self,
        organization: &Organization,
        plugin: &str,
        now: DateTime<Utc>,
    ) -> StoreResult<bool>;
}
