use std::time::Duration;

use serde::de::IgnoredAny;
use ticketbridge_api::retry::RetryConfig;
use ticketbridge_api::{ApiClient, ClientOptions, RemoteServiceError};
use wiremock::matchers::{basic_auth, body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_retries() -> RetryConfig {
    RetryConfig {
        max_attempts: 3,
        initial_interval: Duration::from_millis(5),
        max_interval: Duration::from_millis(20),
        multiplier: 2.0,
    }
}

#[tokio::test]
async fn test_post_sends_basic_auth_and_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .and(basic_auth("svc-bot", "hunter2"))
        .and(body_json(serde_json::json!({"fields": {"summary": "Widget"}})))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "id": "10001",
            "key": "PROJ-1"
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri())
        .unwrap()
        .with_basic_auth("svc-bot", "hunter2");

    let created: serde_json::Value = client
        .post(
            "/rest/api/2/issue",
            &serde_json::json!({"fields": {"summary": "Widget"}}),
        )
        .await
        .unwrap();

    assert_eq!(created["key"], "PROJ-1");
}

#[tokio::test]
async fn test_default_headers_are_sent() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/api/2/myself"))
        .and(header("contextUser", "jdoe"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"name": "jdoe"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let options = ClientOptions {
        headers: vec![("contextUser".to_string(), "jdoe".to_string())],
        ..Default::default()
    };
    let client = ApiClient::with_options(mock_server.uri(), &options).unwrap();

    let me: serde_json::Value = client.get("rest/api/2/myself").await.unwrap();
    assert_eq!(me["name"], "jdoe");
}

#[tokio::test]
async fn test_base_path_is_preserved() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/jira/rest/api/2/serverInfo"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"version": "9.4.0"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(format!("{}/jira", mock_server.uri())).unwrap();
    assert!(client.base_url().path().ends_with("/jira/"));

    let info: serde_json::Value = client.get("/rest/api/2/serverInfo").await.unwrap();
    assert_eq!(info["version"], "9.4.0");
}

#[tokio::test]
async fn test_no_content_response_is_accepted() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue/PROJ-1/transitions"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();
    let result: Result<IgnoredAny, _> = client
        .post(
            "/rest/api/2/issue/PROJ-1/transitions",
            &serde_json::json!({"transition": {"id": "31"}}),
        )
        .await;

    assert!(result.is_ok());
}

#[tokio::test]
async fn test_get_retries_server_errors() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/rest/agile/1.0/board"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"values": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri())
        .unwrap()
        .with_retry_config(fast_retries());

    let boards: serde_json::Value = client.get("/rest/agile/1.0/board").await.unwrap();
    assert!(boards["values"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_post_is_never_retried() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/rest/api/2/issue"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri())
        .unwrap()
        .with_retry_config(fast_retries());

    let result: Result<serde_json::Value, _> = client
        .post("/rest/api/2/issue", &serde_json::json!({"fields": {}}))
        .await;

    match result {
        Err(RemoteServiceError::ServerError { status, message }) => {
            assert_eq!(status, 503);
            assert_eq!(message, "maintenance");
        }
        other => panic!("expected server error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_status_mapping() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/unauthorized"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/missing"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/bad"))
        .respond_with(ResponseTemplate::new(400).set_body_string("{\"errors\":{\"summary\":\"required\"}}"))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/teapot"))
        .respond_with(ResponseTemplate::new(418))
        .mount(&mock_server)
        .await;
    Mock::given(method("GET"))
        .and(path("/garbage"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>login</html>"))
        .mount(&mock_server)
        .await;

    let client = ApiClient::new(mock_server.uri()).unwrap();

    let err = client.get::<serde_json::Value>("/unauthorized").await.unwrap_err();
    assert!(matches!(err, RemoteServiceError::AuthenticationFailed { .. }));

    let err = client.get::<serde_json::Value>("/missing").await.unwrap_err();
    assert!(matches!(err, RemoteServiceError::NotFound { ref resource } if resource == "/missing"));

    let err = client.get::<serde_json::Value>("/bad").await.unwrap_err();
    assert!(matches!(err, RemoteServiceError::BadRequest { ref message } if message.contains("summary")));

    let err = client.get::<serde_json::Value>("/teapot").await.unwrap_err();
    assert_eq!(err.status(), Some(418));

    let err = client.get::<serde_json::Value>("/garbage").await.unwrap_err();
    assert!(matches!(err, RemoteServiceError::InvalidResponse(_)));
}

#[test]
fn test_invalid_header_is_rejected() {
    let options = ClientOptions {
        headers: vec![("contextUser".to_string(), "bad\nvalue".to_string())],
        ..Default::default()
    };

    let result = ApiClient::with_options("https://jira.example.com", &options);
    assert!(matches!(
        result,
        Err(RemoteServiceError::InvalidHeader { .. })
    ));
}

#[test]
fn test_invalid_base_url_is_rejected() {
    assert!(matches!(
        ApiClient::new("not a url"),
        Err(RemoteServiceError::InvalidUrl(_))
    ));
}
