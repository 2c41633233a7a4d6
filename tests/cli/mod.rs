//! CLI Integration Test Modules

pub mod argument_parsing;
pub mod pipeline;
pub mod toml_config;
