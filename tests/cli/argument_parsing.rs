//! CLI argument parsing tests

use clap::Parser;
use intelrun::app::cli::args::*;
use intelrun::plugin::api::ExecutionMode;
use std::path::PathBuf;
use std::time::Duration;

#[test]
fn test_plugins_with_global_options() {
    let args = Args::try_parse_from([
        "intelrun",
        "--log-level",
        "debug",
        "--log-format",
        "json",
        "--config-file",
        "/etc/intelrun.toml",
        "plugins",
    ])
    .unwrap();

    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("json"));
    assert_eq!(args.config_file, Some(PathBuf::from("/etc/intelrun.toml")));
    assert_eq!(args.command, Command::Plugins);
}

#[test]
fn test_aggregate_command() {
    let args = Args::try_parse_from([
        "intelrun",
        "aggregate",
        "--job",
        "12",
        "--module",
        "engines_manager.modules.ObservableSummary",
    ])
    .unwrap();

    assert_eq!(
        args.command,
        Command::Aggregate {
            job: 12,
            module: "engines_manager.modules.ObservableSummary".to_string(),
        }
    );
}

#[test]
fn test_run_with_task_id_and_limits() {
    let args = Args::try_parse_from([
        "intelrun",
        "run",
        "http_status",
        "-j",
        "3",
        "-t",
        "celery-42",
        "--soft-time-limit",
        "60",
        "--mode",
        "mock-connections",
    ])
    .unwrap();

    assert_eq!(args.soft_time_limit, Some(Duration::from_secs(60)));
    assert_eq!(args.mode, Some(ExecutionMode::MockConnections));
    match args.command {
        Command::Run { job, task_id, params, .. } => {
            assert_eq!(job, 3);
            assert_eq!(task_id.as_deref(), Some("celery-42"));
            assert!(params.is_empty());
        }
        other => panic!("unexpected command {:?}", other),
    }
}

#[test]
fn test_invalid_log_format_rejected() {
    assert!(Args::try_parse_from(["intelrun", "--log-format", "xml", "plugins"]).is_err());
}

#[test]
fn test_version_includes_api_version() {
    assert!(long_version().contains(&intelrun::core::version::get_api_version().to_string()));
}
