//! Plugin execution framework for threat-intelligence analyzers
//!
//! Plugins run against a job's observable under a uniform lifecycle: their
//! parameters are resolved for the acting user, their report is created
//! RUNNING and always finalized, failures are classified and recorded, and
//! upstream rate limiting can disable a plugin for an organization.

pub mod app;
pub mod core;
pub mod plugin;
pub mod store;
pub mod tasks;
