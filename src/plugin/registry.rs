//! Plugin Registry
//!
//! Table mapping plugin names to factories. Each execution gets a fresh
//! instance from [`PluginRegistry::create`]; the registry itself holds no
//! plugin state.

use crate::core::version;
use crate::plugin::builtin::api::{builtin_factories, PluginFactory};
use crate::plugin::error::{PluginError, PluginResult};
use crate::plugin::traits::Plugin;
use crate::plugin::types::{ModuleDescriptor, PluginInfo};
use log::{debug, warn};
use std::collections::BTreeMap;

struct RegisteredPlugin {
    info: PluginInfo,
    factory: PluginFactory,
}

/// Plugin registry, ordered by plugin name
pub struct PluginRegistry {
    plugins: BTreeMap<String, RegisteredPlugin>,
    api_version: u32,
}

impl std::fmt::Debug for PluginRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PluginRegistry")
            .field("plugins", &self.plugins.keys().collect::<Vec<_>>())
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Create an empty registry for the crate's plugin API version
    pub fn new() -> Self {
        Self::with_api_version(version::get_api_version())
    }

    pub fn with_api_version(api_version: u32) -> Self {
        Self {
            plugins: BTreeMap::new(),
            api_version,
        }
    }

    /// Build a registry from every plugin submitted with `register_plugin!`
    ///
    /// Incompatible or duplicate builtins are skipped with a warning so that
    /// one bad entry does not take the others down.
    pub fn from_inventory() -> Self {
        let mut registry = Self::new();
        for factory in builtin_factories() {
            if let Err(e) = registry.register(factory) {
                warn!("Skipping builtin plugin: {}", e);
            }
        }
        debug!("Registered {} builtin plugins", registry.plugins.len());
        registry
    }

    /// Register a plugin factory
    pub fn register(&mut self, factory: PluginFactory) -> PluginResult<()> {
        let plugin = factory();
        let info = plugin.info();

        if !plugin.is_compatible(self.api_version) {
            return Err(PluginError::VersionIncompatible {
                message: format!(
                    "Plugin '{}' requires API version {} but the host provides {}",
                    info.name, info.api_version, self.api_version
                ),
            });
        }

        if self.plugins.contains_key(&info.name) {
            return Err(PluginError::DuplicatePlugin {
                plugin_name: info.name,
            });
        }

        debug!("Registered plugin {} ({})", info.name, info.plugin_type);
        self.plugins
            .insert(info.name.clone(), RegisteredPlugin { info, factory });
        Ok(())
    }

    /// Create a fresh instance by plugin name or stored module path
    pub fn create(&self, name: &str) -> PluginResult<Box<dyn Plugin>> {
        let registered = match self.plugins.get(name) {
            Some(registered) => registered,
            None => self.resolve_module(name)?,
        };
        Ok((registered.factory)())
    }

    /// Plugin names in sorted order
    pub fn names(&self) -> Vec<&str> {
        self.plugins.keys().map(String::as_str).collect()
    }

    pub fn infos(&self) -> impl Iterator<Item = &PluginInfo> {
        self.plugins.values().map(|registered| &registered.info)
    }

    pub fn info(&self, name: &str) -> PluginResult<&PluginInfo> {
        self.lookup(name).map(|registered| &registered.info)
    }

    pub fn module_descriptor(&self, name: &str) -> PluginResult<ModuleDescriptor> {
        self.info(name).map(ModuleDescriptor::for_info)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }

    fn lookup(&self, name: &str) -> PluginResult<&RegisteredPlugin> {
        self.plugins
            .get(name)
            .ok_or_else(|| PluginError::PluginNotFound {
                plugin_name: name.to_string(),
            })
    }

    /// Find a plugin by module path, with or without its base path
    fn resolve_module(&self, path: &str) -> PluginResult<&RegisteredPlugin> {
        self.plugins
            .values()
            .find(|registered| {
                registered.info.module == path
                    || ModuleDescriptor::for_info(&registered.info).to_string() == path
            })
            .ok_or_else(|| PluginError::PluginNotFound {
                plugin_name: path.to_string(),
            })
    }
}
