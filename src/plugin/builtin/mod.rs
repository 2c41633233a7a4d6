//! Built-in Plugin Implementations
//!
//! Plugins that ship with the system. Each one registers itself with
//! `register_plugin!` and is picked up by `PluginRegistry::from_inventory`.

pub mod api;
pub mod http_status;
