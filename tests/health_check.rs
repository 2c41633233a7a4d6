//! Health check integration tests
//!
//! Uses wiremock for HTTP mocking. Covers the 400..=408 healthy window,
//! server errors, probe timeouts and URL selection from parameters.

mod common;

use common::{http_engine, ProbeTarget};
use intelrun::plugin::api::{HealthStatus, PluginRegistry};
use intelrun::store::fixture::ParameterSpec;
use intelrun::store::models::User;
use intelrun::store::InMemoryStore;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn check(server_status: ResponseTemplate, timeout: Duration) -> HealthStatus {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(server_status)
        .mount(&mock_server)
        .await;

    let engine = http_engine(Arc::new(InMemoryStore::new()), timeout);
    let plugin = ProbeTarget {
        url: Some(format!("{}/", mock_server.uri())),
    };
    engine
        .health_check(&plugin, &User::new("alice"))
        .await
        .expect("health check failed")
}

#[tokio::test]
async fn test_head_not_allowed_is_healthy() {
    let status = check(ResponseTemplate::new(405), Duration::from_secs(5)).await;
    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_unauthorized_is_healthy() {
    let status = check(ResponseTemplate::new(401), Duration::from_secs(5)).await;
    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_ok_is_healthy() {
    let status = check(ResponseTemplate::new(200), Duration::from_secs(5)).await;
    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_server_error_is_unhealthy() {
    let status = check(ResponseTemplate::new(500), Duration::from_secs(5)).await;
    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_too_many_requests_is_unhealthy() {
    let status = check(ResponseTemplate::new(429), Duration::from_secs(5)).await;
    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_probe_timeout_is_unhealthy() {
    let status = check(
        ResponseTemplate::new(200).set_delay(Duration::from_secs(5)),
        Duration::from_millis(200),
    )
    .await;
    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_connection_refused_is_unhealthy() {
    let engine = http_engine(Arc::new(InMemoryStore::new()), Duration::from_secs(2));
    let plugin = ProbeTarget {
        url: Some("http://127.0.0.1:9/".to_string()),
    };
    let status = engine
        .health_check(&plugin, &User::new("alice"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_no_url_is_undefined() {
    let engine = http_engine(Arc::new(InMemoryStore::new()), Duration::from_secs(5));
    let status = engine
        .health_check(&ProbeTarget { url: None }, &User::new("alice"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Undefined);
}

#[tokio::test]
async fn test_url_parameter_takes_precedence() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/status"))
        .respond_with(ResponseTemplate::new(503))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store
        .declare_parameter("probe_target", ParameterSpec::new("instance_url"))
        .await;
    store
        .set_personal_value(
            "probe_target",
            "instance_url",
            "alice",
            json!(format!("{}/status", mock_server.uri())),
        )
        .await;

    let engine = http_engine(store, Duration::from_secs(5));
    let plugin = ProbeTarget {
        url: Some("http://127.0.0.1:9/".to_string()),
    };
    let status = engine
        .health_check(&plugin, &User::new("alice"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Unhealthy);
}

#[tokio::test]
async fn test_redirect_is_not_followed() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/"))
        .respond_with(
            ResponseTemplate::new(301)
                .insert_header("location", format!("{}/down", mock_server.uri()).as_str()),
        )
        .expect(1)
        .mount(&mock_server)
        .await;
    Mock::given(method("HEAD"))
        .and(path("/down"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&mock_server)
        .await;

    let engine = http_engine(Arc::new(InMemoryStore::new()), Duration::from_secs(5));
    let plugin = ProbeTarget {
        url: Some(format!("{}/", mock_server.uri())),
    };
    let status = engine
        .health_check(&plugin, &User::new("alice"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Healthy);
}

#[tokio::test]
async fn test_http_status_plugin_without_url_parameter_is_undefined() {
    let engine = http_engine(Arc::new(InMemoryStore::new()), Duration::from_secs(5));
    let plugin = PluginRegistry::from_inventory()
        .create("http_status")
        .expect("http_status not registered");

    let status = engine
        .health_check(plugin.as_ref(), &User::new("alice"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Undefined);
}

#[tokio::test]
async fn test_http_status_plugin_uses_org_url_parameter() {
    let mock_server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path("/ping"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let store = Arc::new(InMemoryStore::new());
    store
        .declare_parameter("http_status", ParameterSpec::new("health_check_url"))
        .await;
    store
        .set_org_value(
            "http_status",
            "health_check_url",
            "acme",
            json!(format!("{}/ping", mock_server.uri())),
        )
        .await;

    let engine = http_engine(store, Duration::from_secs(5));
    let plugin = PluginRegistry::from_inventory()
        .create("http_status")
        .expect("http_status not registered");

    let status = engine
        .health_check(plugin.as_ref(), &User::new("alice").in_organization("acme"))
        .await
        .expect("health check failed");
    assert_eq!(status, HealthStatus::Healthy);
}
