//! Parameter Resolver
//!
//! Resolves the parameters a plugin declares for the acting user and binds
//! them into a [`PluginParameters`] lookup structure. Public parameters are
//! reachable by name. Secret parameters are bound under a private `_name`
//! key and only come back out through [`PluginParameters::secret`], whose
//! value never prints.

use crate::plugin::error::{PluginError, PluginResult};
use crate::store::models::{Parameter, User};
use crate::store::traits::{ParameterStore, RuntimeConfiguration};
use log::debug;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

const REDACTED: &str = "***";

/// A secret parameter value; `Debug` and `Display` never show it
#[derive(Clone, PartialEq)]
pub struct SecretValue(Value);

impl SecretValue {
    pub fn expose(&self) -> &Value {
        &self.0
    }

    pub fn as_str(&self) -> Option<&str> {
        self.0.as_str()
    }
}

impl fmt::Debug for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SecretValue({})", REDACTED)
    }
}

impl fmt::Display for SecretValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(REDACTED)
    }
}

/// Private binding name of a secret parameter
pub fn private_name(name: &str) -> String {
    format!("_{}", name)
}

/// Parameters resolved for one plugin execution
#[derive(Clone, Default)]
pub struct PluginParameters {
    parameters: Vec<Parameter>,
    public: BTreeMap<String, Value>,
    private: BTreeMap<String, SecretValue>,
}

impl PluginParameters {
    /// Bind a resolved parameter list, keeping its order
    pub fn new(parameters: Vec<Parameter>) -> Self {
        let mut public = BTreeMap::new();
        let mut private = BTreeMap::new();
        for parameter in &parameters {
            if parameter.is_secret {
                private.insert(
                    private_name(&parameter.name),
                    SecretValue(parameter.value.clone()),
                );
            } else {
                public.insert(parameter.name.clone(), parameter.value.clone());
            }
        }
        Self {
            parameters,
            public,
            private,
        }
    }

    /// Value of a public parameter; secrets are not visible here
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.public.get(name)
    }

    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(Value::as_str)
    }

    pub fn get_u64(&self, name: &str) -> Option<u64> {
        self.get(name).and_then(Value::as_u64)
    }

    /// Value of a secret parameter, looked up under its private name
    pub fn secret(&self, name: &str) -> Option<&SecretValue> {
        self.private.get(&private_name(name))
    }

    /// Names every parameter is bound under, secrets with their private name
    pub fn bound_names(&self) -> impl Iterator<Item = &str> {
        self.public
            .keys()
            .chain(self.private.keys())
            .map(String::as_str)
    }

    /// Resolved parameters in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Parameter> {
        self.parameters.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.parameters.is_empty()
    }

    /// First parameter carrying an API key
    pub fn api_key_parameter(&self) -> Option<&Parameter> {
        self.parameters
            .iter()
            .find(|parameter| parameter.name.contains("api_key"))
    }

    /// First configured, non-empty URL parameter
    pub fn health_check_url(&self) -> Option<&str> {
        self.parameters
            .iter()
            .filter(|parameter| parameter.name.to_lowercase().contains("url"))
            .filter(|parameter| parameter.configured)
            .find_map(|parameter| parameter.value.as_str().filter(|url| !url.is_empty()))
    }
}

impl fmt::Debug for PluginParameters {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = f.debug_map();
        for parameter in &self.parameters {
            if parameter.is_secret {
                map.entry(&private_name(&parameter.name), &REDACTED);
            } else {
                map.entry(&parameter.name, &parameter.value);
            }
        }
        map.finish()
    }
}

impl<'a> IntoIterator for &'a PluginParameters {
    type Item = &'a Parameter;
    type IntoIter = std::slice::Iter<'a, Parameter>;

    fn into_iter(self) -> Self::IntoIter {
        self.parameters.iter()
    }
}

/// Resolve `plugin`'s parameters for `user` with runtime overrides applied
pub async fn resolve(
    store: &dyn ParameterStore,
    plugin: &str,
    user: &User,
    runtime: &RuntimeConfiguration,
) -> PluginResult<PluginParameters> {
    let parameters = store
        .resolve_parameters(plugin, user, runtime)
        .await
        .map_err(|e| PluginError::store("resolve_parameters", e))?;

    for parameter in &parameters {
        if parameter.is_secret {
            debug!(
                "{}: bound secret parameter {}",
                plugin,
                private_name(&parameter.name)
            );
        } else {
            debug!(
                "{}: bound parameter {} = {}",
                plugin, parameter.name, parameter.value
            );
        }
    }

    Ok(PluginParameters::new(parameters))
}
