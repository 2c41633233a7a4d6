//! State file → engine → report, against a mocked upstream service

use crate::common::toml_file;
use intelrun::app::cli::Settings;
use intelrun::plugin::api::{Collaborators, EngineSettings, ExecutionEngine, HttpProbe, PluginRegistry};
use intelrun::store::models::ReportStatus;
use intelrun::store::{InMemoryStore, JobStore, RuntimeConfiguration};
use intelrun::tasks::{execute_module, run_plugin, EngineModuleRegistry, OBSERVABLE_SUMMARY_PATH};
use serde_json::json;
use std::sync::Arc;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn state(url: &str) -> String {
    format!(
        r#"
[[jobs]]
id = 1
observable_name = "{url}"
observable_classification = "url"

[jobs.user]
username = "dave"

[jobs.user.membership.organization]
name = "acme"

[[parameters]]
plugin = "http_status"
name = "api_key_name"
is_secret = true
required = true

[[parameters]]
plugin = "http_status"
name = "timeout"
default = 5

[[values]]
plugin = "http_status"
parameter = "api_key_name"
value = "shared-key"
organization = "acme"

[[org_configs]]
organization = "acme"
plugin = "http_status"
rate_limit_timeout_secs = 3600
"#
    )
}

async fn load(url: &str) -> (tempfile::NamedTempFile, Arc<InMemoryStore>) {
    let file = toml_file(&state(url));
    let settings = Settings {
        state_file: Some(file.path().to_path_buf()),
        ..Settings::default()
    };
    let store = Arc::new(settings.load_state().await.unwrap());
    (file, store)
}

fn engine(store: Arc<InMemoryStore>) -> ExecutionEngine {
    let probe = Arc::new(HttpProbe::new().unwrap());
    ExecutionEngine::new(Collaborators::from_store(store, probe), EngineSettings::default())
}

#[tokio::test]
async fn test_http_status_success() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/landing"))
        .respond_with(ResponseTemplate::new(200).insert_header("server", "nginx"))
        .expect(1)
        .mount(&server)
        .await;
    let (_file, store) = load(&format!("{}/landing", server.uri())).await;

    let report = run_plugin(
        &engine(store.clone()),
        &PluginRegistry::from_inventory(),
        "http_status",
        1,
        &RuntimeConfiguration::new(),
        "task-ok",
    )
    .await
    .unwrap();

    assert_eq!(report.status, ReportStatus::Success);
    assert_eq!(report.task_id, "task-ok");
    assert_eq!(report.content["status"], json!(200));
    assert_eq!(report.content["ok"], json!(true));
    assert_eq!(report.content["headers"]["server"], json!("nginx"));
    assert!(report.errors.is_empty());
    assert!(report.end_time.is_some());

    let stored = store.report(report.id).await.unwrap();
    assert_eq!(stored, report);
}

#[tokio::test]
async fn test_too_many_requests_disables_for_organization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&server)
        .await;
    let (_file, store) = load(&format!("{}/landing", server.uri())).await;

    let report = run_plugin(
        &engine(store.clone()),
        &PluginRegistry::from_inventory(),
        "http_status",
        1,
        &RuntimeConfiguration::new(),
        "task-429",
    )
    .await
    .unwrap();

    assert_eq!(report.status, ReportStatus::Failed);
    assert_eq!(report.errors.len(), 1);
    assert!(report.end_time.is_some());

    let config = store.org_config("acme", "http_status").await.unwrap();
    assert!(config.disabled);
    assert!(config.disabled_until.is_some());
}

#[tokio::test]
async fn test_runtime_timeout_override() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(std::time::Duration::from_secs(5)))
        .mount(&server)
        .await;
    let (_file, store) = load(&server.uri()).await;
    let mut runtime = RuntimeConfiguration::new();
    runtime.insert("timeout".to_string(), json!(1));

    let report = run_plugin(
        &engine(store.clone()),
        &PluginRegistry::from_inventory(),
        "http_status",
        1,
        &runtime,
        "task-slow",
    )
    .await
    .unwrap();

    assert_eq!(report.status, ReportStatus::Failed);
    let config = store.org_config("acme", "http_status").await.unwrap();
    assert!(!config.disabled);
}

#[tokio::test]
async fn test_aggregate_observable_summary() {
    let (_file, store) = load("https://example.com/a").await;

    let data_model = execute_module(
        store.as_ref(),
        &EngineModuleRegistry::from_inventory(),
        1,
        OBSERVABLE_SUMMARY_PATH,
    )
    .await
    .unwrap();

    assert_eq!(
        data_model.get("observable"),
        Some(&json!({"name": "https://example.com/a", "classification": "url"}))
    );
    let job = store.get_job(1).await.unwrap();
    assert_eq!(job.data_model, data_model);
}
