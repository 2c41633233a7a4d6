//! Persisted entities shared between the engine and its stores

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::time::Duration;

pub type JobId = u64;
pub type ReportId = u64;

/// Organization a user can belong to
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Organization {
    pub name: String,
}

/// Membership of a user in an organization
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Membership {
    pub organization: Organization,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    #[serde(default)]
    pub membership: Option<Membership>,
}

impl User {
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_string(),
            membership: None,
        }
    }

    pub fn in_organization(mut self, organization: &str) -> Self {
        self.membership = Some(Membership {
            organization: Organization {
                name: organization.to_string(),
            },
        });
        self
    }

    pub fn has_membership(&self) -> bool {
        self.membership.is_some()
    }

    pub fn organization(&self) -> Option<&Organization> {
        self.membership.as_ref().map(|m| &m.organization)
    }
}

/// What kind of observable a job analyzes
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ObservableKind {
    Domain,
    Url,
    Ip,
    Hash,
    Generic,
    File,
}

/// Aggregated data model of a job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DataModel(pub Map<String, Value>);

impl DataModel {
    /// Merge another object into this data model
    ///
    /// With `append` unset every incoming key replaces the existing one.
    /// With `append` set, arrays present on both sides are concatenated and
    /// all other values are replaced.
    pub fn merge(&mut self, other: Map<String, Value>, append: bool) {
        for (key, incoming) in other {
            match (self.0.get_mut(&key), incoming) {
                (Some(Value::Array(existing)), Value::Array(extra)) if append => {
                    existing.extend(extra);
                }
                (_, incoming) => {
                    self.0.insert(key, incoming);
                }
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: JobId,
    pub user: User,
    pub observable_name: String,
    pub observable_classification: ObservableKind,
    #[serde(default)]
    pub data_model: DataModel,
}

/// Report status; moves RUNNING → SUCCESS | FAILED and never back
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[strum(serialize_all = "SCREAMING_SNAKE_CASE")]
pub enum ReportStatus {
    Running,
    Success,
    Failed,
}

impl ReportStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ReportStatus::Running)
    }
}

/// Report columns that a save may touch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReportField {
    Status,
    Content,
    Errors,
    EndTime,
}

impl ReportField {
    pub const ALL: [ReportField; 4] = [
        ReportField::Status,
        ReportField::Content,
        ReportField::Errors,
        ReportField::EndTime,
    ];
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    pub job_id: JobId,
    pub plugin: String,
    pub task_id: String,
    pub status: ReportStatus,
    pub content: Value,
    pub errors: Vec<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: Option<DateTime<Utc>>,
}

/// A plugin parameter after resolution for one user and one run
#[derive(Debug, Clone, PartialEq)]
pub struct Parameter {
    pub name: String,
    pub value: Value,
    pub is_secret: bool,
    pub required: bool,
    /// The effective value came from an organization-level override
    pub is_from_org: bool,
    /// Some value source (runtime, personal, org or default) supplied a value
    pub configured: bool,
}

impl Parameter {
    /// True when the value is present and not an empty string
    pub fn has_value(&self) -> bool {
        match &self.value {
            Value::Null => false,
            Value::String(s) => !s.is_empty(),
            _ => true,
        }
    }
}

/// Per-organization, per-plugin operational state
#[derive(Debug, Clone, PartialEq)]
pub struct OrgConfig {
    pub organization: Organization,
    pub plugin: String,
    pub rate_limit_timeout: Option<Duration>,
    pub disabled: bool,
    pub disabled_until: Option<DateTime<Utc>>,
}

impl OrgConfig {
    pub fn new(organization: Organization, plugin: &str) -> Self {
        Self {
            organization,
            plugin: plugin.to_string(),
            rate_limit_timeout: None,
            disabled: false,
            disabled_until: None,
        }
    }

    /// Disabled and, if the disable is time-boxed, still inside the window
    pub fn is_disabled_at(&self, now: DateTime<Utc>) -> bool {
        self.disabled && self.disabled_until.map_or(true, |until| until > now)
    }
}
