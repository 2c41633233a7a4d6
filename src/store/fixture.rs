//! Declarative seed data for the in-memory stores
//!
//! The CLI reads a TOML state file into [`StateFixture`] so that jobs,
//! parameter declarations, overrides and organization settings can be set
//! up without a database.

use crate::store::models::Job;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A parameter declared by a plugin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(default)]
    pub is_secret: bool,
    #[serde(default)]
    pub required: bool,
    #[serde(default)]
    pub default: Value,
}

impl ParameterSpec {
    pub fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            is_secret: false,
            required: false,
            default: Value::Null,
        }
    }

    pub fn secret(mut self) -> Self {
        self.is_secret = true;
        self
    }

    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn with_default(mut self, default: Value) -> Self {
        self.default = default;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeclaredParameter {
    pub plugin: String,
    #[serde(flatten)]
    pub spec: ParameterSpec,
}

/// A configured value owned either by a user or by an organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterValue {
    pub plugin: String,
    pub parameter: String,
    pub value: Value,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub organization: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrgConfigFixture {
    pub organization: String,
    pub plugin: String,
    #[serde(default)]
    pub rate_limit_timeout_secs: Option<u64>,
    #[serde(default)]
    pub disabled: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StateFixture {
    #[serde(default)]
    pub jobs: Vec<Job>,
    #[serde(default)]
    pub parameters: Vec<DeclaredParameter>,
    #[serde(default)]
    pub values: Vec<ParameterValue>,
    #[serde(default)]
    pub org_configs: Vec<OrgConfigFixture>,
}

impl StateFixture {
    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }
}
