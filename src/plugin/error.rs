//! Plugin Error Handling
//!
//! Two families of errors live here. [`PluginError`] is what the engine and
//! task layer return to their callers: lookup failures, store failures,
//! lifecycle violations. [`RunError`] is what plugin code raises from its
//! hooks; the engine records it into the report instead of propagating it.

use crate::store::error::StoreError;
use crate::store::models::{JobId, ReportId, ReportStatus};
use std::time::Duration;

/// Result type alias for plugin operations
pub type PluginResult<T> = std::result::Result<T, PluginError>;

/// Boxed error carried by unexpected run failures
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

/// Errors surfaced to callers of the engine and task layer
#[derive(Debug, thiserror::Error)]
pub enum PluginError {
    #[error("Job #{job_id} not found")]
    JobNotFound { job_id: JobId },

    #[error("Plugin not found: {plugin_name}")]
    PluginNotFound { plugin_name: String },

    #[error("Engine module not found: {path}")]
    ModuleNotFound { path: String },

    #[error("Plugin '{plugin_name}' is already registered")]
    DuplicatePlugin { plugin_name: String },

    #[error("Version incompatible: {message}")]
    VersionIncompatible { message: String },

    #[error("Store operation '{operation}' failed: {source}")]
    Store {
        operation: &'static str,
        #[source]
        source: StoreError,
    },

    #[error("Report #{report_id} cannot move from {from} to {to}")]
    InvalidTransition {
        report_id: ReportId,
        from: ReportStatus,
        to: ReportStatus,
    },

    #[error("Report #{report_id} was already finalized")]
    AlreadyFinalized { report_id: ReportId },

    #[error("Plugin '{plugin_name}' failed during '{hook}': {cause}")]
    Hook {
        plugin_name: String,
        hook: &'static str,
        cause: String,
    },

    #[error("Plugin '{plugin_name}' run failed: {source}")]
    RunFailed {
        plugin_name: String,
        #[source]
        source: RunError,
    },

    #[error("Engine module '{path}' failed: {source}")]
    ModuleFailed {
        path: String,
        #[source]
        source: RunError,
    },

    #[error("Task '{task}' exceeded its soft time limit of {limit:?}")]
    TimedOut { task: String, limit: Duration },

    #[error("Plugin '{plugin_name}' does not support '{operation}'")]
    Unsupported {
        plugin_name: String,
        operation: &'static str,
    },
}

impl PluginError {
    pub fn store(operation: &'static str, source: StoreError) -> Self {
        PluginError::Store { operation, source }
    }

    /// Job or module could not be resolved
    pub fn is_lookup_failure(&self) -> bool {
        matches!(
            self,
            PluginError::JobNotFound { .. }
                | PluginError::PluginNotFound { .. }
                | PluginError::ModuleNotFound { .. }
        )
    }
}

impl crate::core::error_handling::ContextualError for PluginError {
    fn is_user_actionable(&self) -> bool {
        self.is_lookup_failure() || matches!(self, PluginError::Unsupported { .. })
    }

    fn user_message(&self) -> Option<String> {
        if self.is_user_actionable() {
            Some(self.to_string())
        } else {
            None
        }
    }
}

/// Errors raised by plugin code during a run
#[derive(Debug, thiserror::Error)]
pub enum RunError {
    /// Upstream service answered with an HTTP error status
    #[error("{status} {message}")]
    Http { status: u16, message: String },

    /// The run exceeded the soft time limit
    #[error("Soft time limit of {limit:?} exceeded")]
    Timeout { limit: Duration },

    /// A failure mode the plugin knows about, tagged with a kind
    #[error("{message}")]
    Declared { kind: &'static str, message: String },

    /// Anything else
    #[error("{0}")]
    Unexpected(BoxError),
}

impl RunError {
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        RunError::Http {
            status,
            message: message.into(),
        }
    }

    pub fn declared(kind: &'static str, message: impl Into<String>) -> Self {
        RunError::Declared {
            kind,
            message: message.into(),
        }
    }

    pub fn unexpected(error: impl Into<BoxError>) -> Self {
        RunError::Unexpected(error.into())
    }

    /// HTTP 429 from an upstream service
    pub fn is_rate_limit(&self) -> bool {
        matches!(self, RunError::Http { status: 429, .. })
    }
}

impl From<reqwest::Error> for RunError {
    fn from(error: reqwest::Error) -> Self {
        if let Some(status) = error.status() {
            RunError::Http {
                status: status.as_u16(),
                message: error.to_string(),
            }
        } else {
            RunError::Unexpected(Box::new(error))
        }
    }
}

/// How a failed run is handled and logged
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// HTTP 429; goes to the rate-limit circuit breaker
    RateLimited,
    /// Declared by the plugin, or an HTTP/timeout failure
    Expected,
    /// A plugin or platform defect
    Unexpected,
}

impl ErrorClass {
    /// Classify a run failure against the plugin's declared error kinds
    pub fn of(error: &RunError, expected_errors: &[&str]) -> Self {
        match error {
            e if e.is_rate_limit() => ErrorClass::RateLimited,
            RunError::Http { .. } | RunError::Timeout { .. } => ErrorClass::Expected,
            RunError::Declared { kind, .. } if expected_errors.contains(kind) => {
                ErrorClass::Expected
            }
            RunError::Declared { .. } | RunError::Unexpected(_) => ErrorClass::Unexpected,
        }
    }
}
