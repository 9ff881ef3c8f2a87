//! Web API Authentication Tests
//!
//! Integration tests for account endpoints.

use std::sync::Arc;

use axum::http::header::AUTHORIZATION;
use axum::http::StatusCode;
use axum_test::TestServer;
use serde_json::{json, Value};
use sharebox::web::router::{create_health_router, create_router};
use sharebox::{AppState, Config};
use tempfile::TempDir;

/// Create a test configuration.
fn create_test_config(temp_dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.auth.jwt_secret = "test-secret-key-for-testing-only".to_string();
    config.storage.root_path = temp_dir.path().join("uploads").display().to_string();
    config
}

/// Create a test server backed by a temporary storage root.
fn create_test_server() -> (TestServer, TempDir) {
    let temp_dir = TempDir::new().unwrap();
    let config = create_test_config(&temp_dir);

    let app_state = Arc::new(AppState::new(&config).expect("Failed to create app state"));
    let router =
        create_router(app_state, &config.server.cors_origins).merge(create_health_router());
    let server = TestServer::new(router).expect("Failed to create test server");

    (server, temp_dir)
}

async fn register(server: &TestServer, email: &str, password: &str) -> Value {
    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": email, "password": password }))
        .await;
    response.assert_status(StatusCode::CREATED);
    response.json::<Value>()
}

#[tokio::test]
async fn test_health() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/health").await;

    response.assert_status_ok();
    assert_eq!(response.text(), "OK");
}

#[tokio::test]
async fn test_register_success() {
    let (server, _temp_dir) = create_test_server();

    let body = register(&server, "alice@example.com", "password123").await;

    let token = body["data"]["token"].as_str().unwrap();
    let uid = body["data"]["uid"].as_str().unwrap();
    assert!(!token.is_empty());
    assert_eq!(uid.len(), 32);
    assert_eq!(body["data"]["expires_in"], 86400);
}

#[tokio::test]
async fn test_register_duplicate_email() {
    let (server, _temp_dir) = create_test_server();
    register(&server, "alice@example.com", "password123").await;

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "Alice@Example.com", "password": "password456" }))
        .await;

    response.assert_status(StatusCode::CONFLICT);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_register_validation() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "not-an-email", "password": "short" }))
        .await;

    response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    assert!(body["error"]["details"]["email"].is_array());
    assert!(body["error"]["details"]["password"].is_array());
}

#[tokio::test]
async fn test_register_missing_field() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/api/auth/register")
        .json(&json!({ "email": "alice@example.com" }))
        .await;

    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_success() {
    let (server, _temp_dir) = create_test_server();
    let registered = register(&server, "bob@example.com", "password123").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "password123" }))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["uid"], registered["data"]["uid"]);
    assert!(body["data"]["token"].as_str().is_some());
}

#[tokio::test]
async fn test_login_wrong_password() {
    let (server, _temp_dir) = create_test_server();
    register(&server, "bob@example.com", "password123").await;

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "bob@example.com", "password": "wrongpassword" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
    let body = response.json::<Value>();
    assert_eq!(body["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_login_unknown_user() {
    let (server, _temp_dir) = create_test_server();

    let response = server
        .post("/api/auth/login")
        .json(&json!({ "email": "nobody@example.com", "password": "password123" }))
        .await;

    response.assert_status(StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me() {
    let (server, _temp_dir) = create_test_server();
    let registered = register(&server, "carol@example.com", "password123").await;
    let token = registered["data"]["token"].as_str().unwrap();

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, format!("Bearer {}", token))
        .await;

    response.assert_status_ok();
    let body = response.json::<Value>();
    assert_eq!(body["data"]["email"], "carol@example.com");
    assert_eq!(body["data"]["uid"], registered["data"]["uid"]);
}

#[tokio::test]
async fn test_me_unauthorized() {
    let (server, _temp_dir) = create_test_server();

    let response = server.get("/api/auth/me").await;
    response.assert_status(StatusCode::UNAUTHORIZED);

    let response = server
        .get("/api/auth/me")
        .add_header(AUTHORIZATION, "Bearer not-a-jwt".to_string())
        .await;
    response.assert_status(StatusCode::UNAUTHORIZED);
}
