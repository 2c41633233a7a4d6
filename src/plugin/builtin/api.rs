//! API for builtin plugin registration and discovery
//!
//! Plugins use the `register_plugin!` macro to register a factory for
//! automatic discovery by [`crate::plugin::registry::PluginRegistry::from_inventory`].

use crate::plugin::traits::Plugin;

/// Constructor for a fresh plugin instance
pub type PluginFactory = fn() -> Box<dyn Plugin>;

/// Entry for a builtin plugin in the static registry
pub struct PluginEntry {
    pub factory: PluginFactory,
}

// Collect all builtin plugin entries
inventory::collect!(PluginEntry);

/// Register a builtin plugin factory
///
/// ```ignore
/// fn create() -> Box<dyn Plugin> {
///     Box::new(HttpStatus::default())
/// }
///
/// register_plugin!(create);
/// ```
#[macro_export]
macro_rules! register_plugin {
    ($factory_expr:expr) => {
        inventory::submit!($crate::plugin::builtin::api::PluginEntry {
            factory: $factory_expr
        });
    };
}

/// Get all registered builtin plugin factories
pub fn builtin_factories() -> Vec<PluginFactory> {
    inventory::iter::<PluginEntry>()
        .map(|entry| entry.factory)
        .collect()
}
