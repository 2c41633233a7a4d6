//! Report Lifecycle Manager
//!
//! Owns one report for the duration of a plugin execution. The report is
//! created RUNNING, moves to exactly one terminal status, and is finalized
//! exactly once; finalization is the only writer of `end_time`.

use crate::plugin::error::{PluginError, PluginResult};
use crate::store::models::{Job, Report, ReportField, ReportStatus};
use crate::store::traits::ReportStore;
use chrono::{DateTime, Utc};
use log::debug;
use serde_json::Value;
use std::sync::Arc;

pub struct ReportLifecycle {
    report: Report,
    store: Arc<dyn ReportStore>,
    finalized: bool,
}

impl ReportLifecycle {
    /// Create an empty RUNNING report for `plugin` on `job`
    pub async fn create_running(
        store: Arc<dyn ReportStore>,
        job: &Job,
        plugin: &str,
        task_id: &str,
        now: DateTime<Utc>,
    ) -> PluginResult<Self> {
        let report = store
            .create_empty_report(job, plugin, task_id, ReportStatus::Running, now)
            .await
            .map_err(|e| PluginError::store("create_empty_report", e))?;
        debug!(
            "Created report #{} for {} on job #{} (task {})",
            report.id, plugin, job.id, task_id
        );
        Ok(Self {
            report,
            store,
            finalized: false,
        })
    }

    pub fn report(&self) -> &Report {
        &self.report
    }

    pub fn is_finalized(&self) -> bool {
        self.finalized
    }

    /// RUNNING → SUCCESS, persisting status and content only
    pub async fn mark_success(&mut self, content: Value) -> PluginResult<()> {
        self.transition(ReportStatus::Success)?;
        self.report.content = content;
        self.save(&[ReportField::Status, ReportField::Content]).await
    }

    /// RUNNING → FAILED, appending `error` and persisting status and errors only
    pub async fn mark_failed(&mut self, error: String) -> PluginResult<()> {
        self.transition(ReportStatus::Failed)?;
        self.report.errors.push(error);
        self.save(&[ReportField::Status, ReportField::Errors]).await
    }

    /// Stamp the end time and persist the whole report
    pub async fn finalize(&mut self, now: DateTime<Utc>) -> PluginResult<()> {
        if self.finalized {
            return Err(PluginError::AlreadyFinalized {
                report_id: self.report.id,
            });
        }
        self.finalized = true;
        self.report.end_time = Some(now);
        self.save(&ReportField::ALL).await
    }

    pub fn into_report(self) -> Report {
        self.report
    }

    fn transition(&mut self, to: ReportStatus) -> PluginResult<()> {
        if self.report.status.is_terminal() || self.finalized {
            return Err(PluginError::InvalidTransition {
                report_id: self.report.id,
                from: self.report.status,
                to,
            });
        }
        self.report.status = to;
        Ok(())
    }

    async fn save(&self, fields: &[ReportField]) -> PluginResult<()> {
        self.store
            .save(&self.report, fields)
            .await
            .map_err(|e| PluginError::store("save_report", e))
    }
}
