//! API integration tests
//!
//! Drive the full router with in-memory store and cache, a no-op queue
//! producer, and a temp upload directory.

use std::path::PathBuf;
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use authvault_server::app_state::AppState;
use authvault_server::cache::InMemoryTokenCache;
use authvault_server::producer::NoopVerifyProducer;
use authvault_server::routes;
use authvault_server::services::{AuthService, TokenService};
use authvault_server::store::InMemoryUserStore;
use authvault_server::token::TokenCodec;

const SECRET: &str = "integration_secret";
const BOUNDARY: &str = "X-TEST-BOUNDARY";

fn upload_dir() -> PathBuf {
    std::env::temp_dir().join(format!("authvault-test-{}", std::process::id()))
}

fn test_app() -> Router {
    let cache = Arc::new(InMemoryTokenCache::new());
    let store = Arc::new(InMemoryUserStore::new());
    let token_service = TokenService::new(cache, TokenCodec::new(SECRET), 3600);
    let auth_service = AuthService::new(store, token_service.clone());
    let state = AppState::new(
        Arc::new(auth_service),
        token_service,
        Arc::new(NoopVerifyProducer),
        upload_dir(),
    );
    routes::app(state)
}

async fn post_json(app: &Router, uri: &str, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(app, request).await
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn multipart_body(user_id: &str, filename: &str, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"user_id\"\r\n\r\n{user_id}\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: image/jpeg\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(content);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
    body
}

async fn post_multipart(app: &Router, user_id: &str, filename: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/api/verify")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(user_id, filename, b"fake-image-bytes")))
        .unwrap();
    send(app, request).await
}

#[tokio::test]
async fn registration_returns_token() {
    let app = test_app();
    let (status, body) = post_json(
        &app,
        "/api/registration",
        json!({"login": "alice", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["token"].as_str().is_some());
}

#[tokio::test]
async fn end_to_end_token_lifecycle() {
    let app = test_app();

    // Register and get the first token.
    let (status, body) = post_json(
        &app,
        "/api/registration",
        json!({"login": "alice", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let t1 = body["token"].as_str().unwrap().to_string();

    // The token is recognized as the live one.
    let (status, body) = post_json(&app, "/api/check_token", json!({"token": t1})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_token_valid"], json!(true));
    let user_id = body["user_id"].as_i64().unwrap();

    // Authenticating again reuses the same token, no re-issue.
    let (status, body) = post_json(
        &app,
        "/api/auth",
        json!({"login": "alice", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["token"].as_str().unwrap(), t1);

    // A well-signed token for a user that never registered is invalid
    // but not an error.
    let stray = TokenCodec::new(SECRET).encode(9999, 3600).unwrap();
    assert_ne!(user_id, 9999);
    let (status, body) = post_json(&app, "/api/check_token", json!({"token": stray})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_token_valid"], json!(false));
    assert_eq!(body["user_id"], Value::Null);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let app = test_app();
    let payload = json!({"login": "alice", "password": "secret1"});
    post_json(&app, "/api/registration", payload.clone()).await;
    let (status, body) = post_json(&app, "/api/registration", payload).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], json!("User alice already exists"));
}

#[tokio::test]
async fn bad_credentials_are_not_found() {
    let app = test_app();
    post_json(
        &app,
        "/api/registration",
        json!({"login": "alice", "password": "secret1"}),
    )
    .await;

    for payload in [
        json!({"login": "alice", "password": "wrong00"}),
        json!({"login": "no_user", "password": "secret1"}),
    ] {
        let (status, body) = post_json(&app, "/api/auth", payload).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            body["detail"],
            json!("User with the provided details not found")
        );
    }
}

#[tokio::test]
async fn invalid_login_shape_is_unprocessable() {
    let app = test_app();
    let (status, _) = post_json(
        &app,
        "/api/registration",
        json!({"login": "a!", "password": "secret1"}),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn tampered_token_is_unauthorized() {
    let app = test_app();
    let (_, body) = post_json(
        &app,
        "/api/registration",
        json!({"login": "alice", "password": "secret1"}),
    )
    .await;
    let token = body["token"].as_str().unwrap();
    let mut tampered = token[..token.len() - 1].to_string();
    tampered.push(if token.ends_with('A') { 'B' } else { 'A' });

    let (status, body) = post_json(&app, "/api/check_token", json!({"token": tampered})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], json!("Invalid token"));
}

#[tokio::test]
async fn expired_token_is_unauthorized_with_distinct_detail() {
    let app = test_app();
    let claims = authvault_server::token::Claims {
        id: 1,
        exp: chrono::Utc::now().timestamp() - 5,
    };
    let expired = jsonwebtoken::encode(
        &jsonwebtoken::Header::default(),
        &claims,
        &jsonwebtoken::EncodingKey::from_secret(SECRET.as_bytes()),
    )
    .unwrap();

    let (status, body) = post_json(&app, "/api/check_token", json!({"token": expired})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["detail"], json!("Token has expired"));
}

#[tokio::test]
async fn ready_probe_answers() {
    let app = test_app();
    let request = Request::builder()
        .method("GET")
        .uri("/api/healthz/ready")
        .body(Body::empty())
        .unwrap();
    let (status, body) = send(&app, request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_ready"], json!(true));
}

#[tokio::test]
async fn photo_upload_is_accepted() {
    let app = test_app();
    let (status, body) = post_multipart(&app, "1", "one_face.jpg").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], json!("Message received for processing"));
    assert!(upload_dir().join("1_one_face.jpg").exists());
}

#[tokio::test]
async fn photo_upload_rejects_non_image() {
    let app = test_app();
    let (status, body) = post_multipart(&app, "1", "wrong_file.txt").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["detail"], json!("Invalid image format .txt"));
}

#[tokio::test]
async fn photo_upload_rejects_missing_extension() {
    let app = test_app();
    let (status, body) = post_multipart(&app, "1", "face").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(
        body["detail"],
        json!("File name is too short or the file has no extension")
    );
}
