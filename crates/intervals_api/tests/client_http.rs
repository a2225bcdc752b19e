use std::time::Duration;

use intervals_api::http_client::ReqwestIntervalsClient;
use intervals_api::{IntervalsClient, IntervalsError};
use secrecy::SecretString;
use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client(server: &MockServer, max_retries: u32) -> ReqwestIntervalsClient {
    ReqwestIntervalsClient::new(
        &server.uri(),
        "i42",
        SecretString::new("tok".into()),
        Duration::from_secs(5),
        max_retries,
        Duration::ZERO,
    )
}

#[tokio::test]
async fn get_activities_sends_basic_auth_and_range_query() {
    let server = MockServer::start().await;
    let body = json!([
        {"id": "a1", "name": "Morning Ride"},
        {"id": "a2", "name": "Evening Run"}
    ]);
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .and(query_param("oldest", "2024-01-01"))
        .and(query_param("newest", "2024-01-31"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let acts = client(&server, 0)
        .get_activities("2024-01-01", Some("2024-01-31"))
        .await
        .expect("activities");
    assert_eq!(acts.len(), 2);
    assert_eq!(acts[0]["id"], "a1");

    let received = server.received_requests().await.unwrap();
    let auth = received[0]
        .headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(auth.starts_with("Basic "), "got {auth:?}");
}

#[tokio::test]
async fn newest_query_param_omitted_when_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/i42/wellness"))
        .and(query_param("oldest", "2024-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
        .mount(&server)
        .await;

    let records = client(&server, 0)
        .get_wellness("2024-01-01", None)
        .await
        .expect("wellness");
    assert!(records.is_empty());

    let received = server.received_requests().await.unwrap();
    assert!(!received[0].url.query().unwrap_or("").contains("newest"));
}

#[tokio::test]
async fn non_list_body_yields_empty_vec() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"error": "odd shape"})))
        .mount(&server)
        .await;

    let acts = client(&server, 0)
        .get_activities("2024-01-01", None)
        .await
        .expect("activities");
    assert!(acts.is_empty());
}

#[tokio::test]
async fn retries_transient_503_then_succeeds() {
    let server = MockServer::start().await;
    // First two responses fail with 503, then the expiring mock stops matching.
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "a1"}])))
        .mount(&server)
        .await;

    let acts = client(&server, 3)
        .get_activities("2024-01-01", None)
        .await
        .expect("activities after retries");
    assert_eq!(acts.len(), 1);
    assert_eq!(server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn non_retryable_400_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({"detail": "bad oldest"})))
        .mount(&server)
        .await;

    let err = client(&server, 3)
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    match err {
        IntervalsError::Api { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "bad oldest");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(server.received_requests().await.unwrap().len(), 1);
}

#[tokio::test]
async fn status_401_maps_to_authentication() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, IntervalsError::Authentication));
}

#[tokio::test]
async fn status_403_maps_to_authorization() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .get_wellness("2024-01-01", None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, IntervalsError::Authorization));
}

#[tokio::test]
async fn status_404_carries_resource_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    match err {
        IntervalsError::NotFound { resource, id } => {
            assert_eq!(resource, "activities");
            assert_eq!(id, "/athlete/i42/activities");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn status_429_surfaces_retry_after_seconds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(429).insert_header("Retry-After", "60"))
        .mount(&server)
        .await;

    // max_retries = 0 so the rate limit surfaces instead of being retried.
    let err = client(&server, 0)
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    match err {
        IntervalsError::RateLimit { retry_after } => assert_eq!(retry_after, Some(60)),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn slow_response_maps_to_timeout_with_configured_value() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;

    let client = ReqwestIntervalsClient::new(
        &server.uri(),
        "i42",
        SecretString::new("tok".into()),
        Duration::from_millis(200),
        0,
        Duration::ZERO,
    );
    let err = client
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must time out");
    match err {
        // A 200ms timeout rounds up to one second in the report.
        IntervalsError::Timeout { timeout_secs } => assert_eq!(timeout_secs, 1),
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn connection_refused_maps_to_network_error() {
    // Port 1 is never listening.
    let client = ReqwestIntervalsClient::new(
        "http://127.0.0.1:1",
        "i42",
        SecretString::new("tok".into()),
        Duration::from_secs(2),
        0,
        Duration::ZERO,
    );
    let err = client
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    assert!(matches!(err, IntervalsError::Network(_)), "got {err}");
}

#[tokio::test]
async fn delete_returns_true_on_204() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/athlete/i42/thing/1"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let ok = client(&server, 0)
        .delete("/athlete/i42/thing/1")
        .await
        .expect("delete");
    assert!(ok);
}

#[tokio::test]
async fn post_with_empty_body_decodes_to_empty_object() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/athlete/i42/thing"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    let out = client(&server, 0)
        .post("/athlete/i42/thing", &json!({"a": 1}))
        .await
        .expect("post");
    assert_eq!(out, json!({}));
}

#[tokio::test]
async fn put_round_trips_json_body() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/athlete/i42/thing/1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"updated": true})))
        .mount(&server)
        .await;

    let out = client(&server, 0)
        .put("/athlete/i42/thing/1", &json!({"name": "x"}))
        .await
        .expect("put");
    assert_eq!(out["updated"], true);
}

#[tokio::test]
async fn api_error_falls_back_to_message_key_then_text() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/athlete/i42/activities"))
        .respond_with(ResponseTemplate::new(500).set_body_json(json!({"message": "boom"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let err = client(&server, 0)
        .get_activities("2024-01-01", None)
        .await
        .expect_err("must fail");
    match err {
        IntervalsError::Api { status, message } => {
            assert_eq!(status, 500);
            assert_eq!(message, "boom");
        }
        other => panic!("unexpected error: {other}"),
    }
}
