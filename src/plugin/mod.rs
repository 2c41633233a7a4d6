//! Plugin System Module
//!
//! Plugin contract, registry and the execution engine that runs plugins
//! against jobs and records their reports.

// Internal modules - all access should go through api module
pub(crate) mod builtin;
pub(crate) mod content;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod health;
pub(crate) mod parameters;
pub(crate) mod rate_limit;
pub(crate) mod registry;
pub(crate) mod report;
pub(crate) mod traits;
pub(crate) mod types;

// Public API module - the only public interface for the plugin system
pub mod api;

#[cfg(test)]
mod tests;
