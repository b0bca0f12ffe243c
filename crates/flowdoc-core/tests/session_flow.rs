//! Integration tests for the login/logout lifecycle against a mock backend.

use std::time::Duration;

use chrono::Utc;
use flowdoc_core::auth::{FileTokenStore, MemoryTokenStore, TokenStore};
use flowdoc_core::{ApiClient, ApiError, Session, SessionData};
use serde_json::json;
use tempfile::TempDir;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn api_for(server: &MockServer) -> ApiClient {
    ApiClient::new(&server.uri(), Duration::from_secs(5)).unwrap()
}

fn previous_session(token: &str) -> SessionData {
    SessionData {
        token: token.to_string(),
        username: "previous".to_string(),
        created_at: Utc::now(),
    }
}

#[tokio::test]
async fn test_login_stores_returned_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .and(body_json(json!({"username": "alice", "password": "s3cret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token": "jwt-abc",
            "user": {"id": 1}
        })))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(MemoryTokenStore::new());
    session
        .login(&api_for(&mock_server), "alice", "s3cret")
        .await
        .unwrap();

    assert!(session.is_authenticated());
    assert_eq!(session.token().as_deref(), Some("jwt-abc"));
    assert_eq!(session.data().unwrap().username, "alice");
}

#[tokio::test]
async fn test_login_replaces_previous_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "new"})))
        .mount(&mock_server)
        .await;

    let session = Session::new(MemoryTokenStore::with_session(previous_session("old")));
    session
        .login(&api_for(&mock_server), "alice", "pw")
        .await
        .unwrap();

    assert_eq!(session.token().as_deref(), Some("new"));
}

#[tokio::test]
async fn test_failed_login_keeps_existing_token() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"error": "bad credentials"})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let session = Session::new(MemoryTokenStore::with_session(previous_session("T")));
    let err = session
        .login(&api_for(&mock_server), "alice", "wrong")
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::Unauthorized)));
    assert_eq!(session.token().as_deref(), Some("T"));
}

#[tokio::test]
async fn test_failed_login_when_logged_out_stays_logged_out() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(500).set_body_string("database down"))
        .mount(&mock_server)
        .await;

    let session = Session::new(MemoryTokenStore::new());
    let err = session
        .login(&api_for(&mock_server), "alice", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::ServerError(_))));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_login_response_without_token_is_rejected() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let session = Session::new(MemoryTokenStore::with_session(previous_session("T")));
    let err = session
        .login(&api_for(&mock_server), "alice", "pw")
        .await
        .unwrap_err();

    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::InvalidResponse(_))));
    assert_eq!(session.token().as_deref(), Some("T"));
}

#[tokio::test]
async fn test_unreachable_backend_is_network_error() {
    // Nothing listens on the discard port
    let api = ApiClient::new("http://127.0.0.1:9", Duration::from_secs(5)).unwrap();
    let session = Session::new(MemoryTokenStore::new());

    let err = session.login(&api, "alice", "pw").await.unwrap_err();
    assert!(matches!(err.downcast_ref::<ApiError>(), Some(ApiError::NetworkError(_))));
    assert!(!session.is_authenticated());
}

#[tokio::test]
async fn test_file_backed_session_survives_reopen_and_logout() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("POST"))
        .and(path("/api/auth/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"token": "persisted"})))
        .mount(&mock_server)
        .await;

    let session = Session::new(FileTokenStore::new(temp_dir.path()));
    session
        .login(&api_for(&mock_server), "erin", "pw")
        .await
        .unwrap();

    // A second handle over the same directory sees the same slot
    let reopened = Session::new(FileTokenStore::new(temp_dir.path()));
    assert_eq!(reopened.token().as_deref(), Some("persisted"));

    reopened.logout().unwrap();
    reopened.logout().unwrap();
    assert!(!reopened.is_authenticated());
    assert!(!session.is_authenticated());
    assert!(FileTokenStore::new(temp_dir.path()).load().unwrap().is_none());
}
