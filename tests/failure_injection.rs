//! Failure injection tests for the request client.

use axum::routing::get;
use axum::Router;
use std::sync::Arc;
use std::time::{Duration, Instant};

use maak_client::client::RequestError;
use maak_client::resilience::{Classify, ErrorClass};
use maak_client::session::Session;
use maak_client::ResilientClient;

mod common;
use common::ScriptedSessions;

fn client_for(base_url: &str) -> ResilientClient {
    let sessions = ScriptedSessions::with_session(Session::new("sess-1", "user-1"));
    ResilientClient::new(&common::fast_config(base_url), Arc::new(sessions))
}

#[tokio::test]
async fn test_server_error_rethrown_verbatim_after_max_retries() {
    let backend = common::start_programmable_backend(|_, _| (500, String::new())).await;
    let client = client_for(&backend.base_url);

    let start = Instant::now();
    let err = client.get("/matches").await.unwrap_err();

    assert_eq!(err.to_string(), "500 Internal Server Error");
    assert_eq!(backend.hits(), 3);
    // Two fixed 30ms pauses between three attempts.
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_retry_on_failure() {
    let backend = common::start_programmable_backend(|index, _| {
        if index < 2 {
            (503, "Service Unavailable".into())
        } else {
            (200, r#"{"matches":[{"id":7}]}"#.into())
        }
    })
    .await;
    let client = client_for(&backend.base_url);

    let body = client.get("/matches").await.unwrap();

    assert_eq!(body["matches"][0]["id"], 7);
    assert_eq!(backend.hits(), 3);
}

#[tokio::test]
async fn test_fatal_error_not_retried() {
    let backend =
        common::start_programmable_backend(|_, _| (400, r#"{"error":"invalid filter"}"#.into()))
            .await;
    let client = client_for(&backend.base_url);

    let err = client.get("/matches?filter=bogus").await.unwrap_err();

    assert_eq!(err.to_string(), "400 Bad Request: invalid filter");
    assert_eq!(err.class(), ErrorClass::Fatal);
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_forbidden_not_retried() {
    let backend = common::start_programmable_backend(|_, _| (403, String::new())).await;
    let client = client_for(&backend.base_url);

    let err = client.get("/privacy/export").await.unwrap_err();

    assert!(matches!(err, RequestError::Api { .. }));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_auto_retry_disabled() {
    let backend = common::start_programmable_backend(|_, _| (503, String::new())).await;
    let client = client_for(&backend.base_url);
    client.set_auto_retry(false);

    let err = client.get("/community/posts").await.unwrap_err();

    assert_eq!(err.to_string(), "503 Service Unavailable");
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_max_retries_changed_at_runtime() {
    let backend = common::start_programmable_backend(|_, _| (502, String::new())).await;
    let client = client_for(&backend.base_url);
    assert_eq!(client.set_max_retries(5), 5);

    let _ = client.get("/matches").await;
    assert_eq!(backend.hits(), 5);

    assert_eq!(client.set_max_retries(0), 1);
    let _ = client.get("/matches").await;
    assert_eq!(backend.hits(), 6);
}

#[tokio::test]
async fn test_network_error_backs_off() {
    let addr = common::dead_address();
    let client = client_for(&format!("http://{}", addr));

    let start = Instant::now();
    let err = client.get("/matches").await.unwrap_err();

    assert!(matches!(err, RequestError::Network(_)));
    assert_eq!(err.class(), ErrorClass::Network);
    // 20ms then 40ms between the three attempts.
    assert!(start.elapsed() >= Duration::from_millis(60));
}

#[tokio::test]
async fn test_slow_backend_times_out() {
    let router = Router::new().route(
        "/matches",
        get(|| async {
            tokio::time::sleep(Duration::from_secs(3)).await;
            "{}"
        }),
    );
    let addr = common::serve(router).await;

    let mut config = common::fast_config(&format!("http://{}", addr));
    config.api.request_timeout_secs = 1;
    config.retry.auto_retry_enabled = false;
    let sessions = ScriptedSessions::with_session(Session::new("sess-1", "user-1"));
    let client = ResilientClient::new(&config, Arc::new(sessions));

    let err = client.get("/matches").await.unwrap_err();

    assert!(matches!(err, RequestError::Timeout(1)));
    assert_eq!(err.class(), ErrorClass::Network);
}

#[tokio::test]
async fn test_invalid_json_is_fatal() {
    let backend = common::start_programmable_backend(|_, _| (200, "<html>oops</html>".into())).await;
    let client = client_for(&backend.base_url);

    let err = client.get("/matches").await.unwrap_err();

    assert!(matches!(err, RequestError::Decode(_)));
    assert_eq!(backend.hits(), 1);
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let backend = common::start_programmable_backend(|_, _| (204, String::new())).await;
    let client = client_for(&backend.base_url);

    let body = client.delete("/community/posts/3").await.unwrap();
    assert!(body.is_null());
}

#[tokio::test]
async fn test_health_check_bypasses_retry() {
    let backend = common::start_programmable_backend(|index, _| {
        if index == 0 {
            (503, String::new())
        } else {
            (200, r#"{"status":"healthy"}"#.into())
        }
    })
    .await;
    let client = client_for(&backend.base_url);

    let err = client.health_check().await.unwrap_err();
    assert_eq!(err.to_string(), "503 Service Unavailable");
    assert_eq!(backend.hits(), 1);

    let body = client.health_check().await.unwrap();
    assert_eq!(body["status"], "healthy");
    assert_eq!(backend.hits(), 2);

    let health = &backend.requests()[1];
    assert_eq!(health.path, "/health");
    assert_eq!(health.header("authorization"), Some("Bearer anon-test-key"));
    assert_eq!(health.header("x-session-id"), None);
    assert_eq!(health.header("x-is-demo"), None);
}

#[tokio::test]
async fn test_typed_response() {
    #[derive(serde::Deserialize)]
    struct Profile {
        name: String,
        age: u8,
    }

    let backend =
        common::start_programmable_backend(|_, _| (200, r#"{"name":"Aino","age":29}"#.into()))
            .await;
    let client = client_for(&backend.base_url);

    let profile: Profile = client.get_json("/profile").await.unwrap();
    assert_eq!(profile.name, "Aino");
    assert_eq!(profile.age, 29);
}
