//! Failure-logged task wrapper

use crate::plugin::api::{PluginError, PluginResult};
use log::{debug, error};
use std::future::Future;
use std::time::Duration;

/// Runs a task future, logging its failure with the task name
///
/// Errors are always returned to the caller after logging.
#[derive(Debug, Clone)]
pub struct FailureLoggedTask {
    name: String,
    soft_time_limit: Option<Duration>,
}

impl FailureLoggedTask {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            soft_time_limit: None,
        }
    }

    pub fn with_soft_time_limit(mut self, limit: Duration) -> Self {
        self.soft_time_limit = Some(limit);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub async fn run<T, F>(&self, task: F) -> PluginResult<T>
    where
        F: Future<Output = PluginResult<T>>,
    {
        debug!("Task {} started", self.name);
        let result = match self.soft_time_limit {
            Some(limit) => match tokio::time::timeout(limit, task).await {
                Ok(result) => result,
                Err(_) => Err(PluginError::TimedOut {
                    task: self.name.clone(),
                    limit,
                }),
            },
            None => task.await,
        };

        match &result {
            Ok(_) => debug!("Task {} finished", self.name),
            Err(e) => error!("Task {} failed: {}", self.name, e),
        }
        result
    }
}
