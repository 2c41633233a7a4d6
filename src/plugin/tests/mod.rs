//! Test modules for the plugin system
//!
//! Engine lifecycle scenarios, rate-limit breaker and health check suites,
//! with the scripted plugins and fakes they share.

pub mod utils;
