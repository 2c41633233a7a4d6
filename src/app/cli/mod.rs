//! CLI module containing argument parsing, configuration loading and output

pub mod args;
pub mod config;
pub mod display;

pub use args::{Args, Command};
pub use config::{ConfigError, Settings};
