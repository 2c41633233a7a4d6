//! Configuration and state file tests

use crate::common::toml_file;
use clap::Parser;
use intelrun::app::cli::{Args, ConfigError, Settings};
use intelrun::plugin::api::ExecutionMode;
use intelrun::store::traits::JobStore;
use std::time::Duration;

#[tokio::test]
async fn test_load_config_file_and_override() {
    let file = toml_file(
        r#"
mode = "strict"
soft-time-limit = 30
log-level = "warn"
"#,
    );

    let mut settings = Settings::load(Some(file.path())).await.unwrap();
    assert_eq!(settings.mode, Some(ExecutionMode::StrictVerification));

    let args = Args::try_parse_from([
        "intelrun",
        "--soft-time-limit",
        "45",
        "plugins",
    ])
    .unwrap();
    settings.apply_args(&args);

    let engine = settings.engine_settings();
    assert_eq!(engine.mode, ExecutionMode::StrictVerification);
    assert_eq!(engine.soft_time_limit, Some(Duration::from_secs(45)));
    assert_eq!(settings.log_level.as_deref(), Some("warn"));
}

#[tokio::test]
async fn test_malformed_config_file() {
    let file = toml_file("mode = [");
    let error = Settings::load(Some(file.path())).await.unwrap_err();
    assert!(matches!(error, ConfigError::Parse { .. }));
}

#[tokio::test]
async fn test_load_state_file() {
    let state = toml_file(
        r#"
[[jobs]]
id = 4
observable_name = "evil.example"
observable_classification = "domain"

[jobs.user]
username = "carol"
"#,
    );
    let settings = Settings {
        state_file: Some(state.path().to_path_buf()),
        ..Settings::default()
    };

    let store = settings.load_state().await.unwrap();
    let job = store.get_job(4).await.unwrap();
    assert_eq!(job.observable_name, "evil.example");
    assert!(!job.user.has_membership());
}

#[tokio::test]
async fn test_missing_state_file() {
    let settings = Settings {
        state_file: Some("/nonexistent/state.toml".into()),
        ..Settings::default()
    };
    assert!(matches!(
        settings.load_state().await,
        Err(ConfigError::NotFound { .. })
    ));
}
