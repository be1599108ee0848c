use account_auth::{create_routes, AuthConfig, AuthService, MemoryStore};

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    response::Response,
    Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

fn app() -> Router {
    let config = AuthConfig {
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..AuthConfig::new("integration-secret-0123456789-abcdefghij")
    };

    let store = Arc::new(MemoryStore::new());
    let auth = AuthService::new(config, store.clone(), store).unwrap();
    create_routes(Arc::new(auth))
}

fn alice() -> Value {
    json!({
        "username": "alice",
        "password": "secret1",
        "email": "a@x.com",
        "firstName": "Alice",
        "lastName": "A"
    })
}

async fn post_json(app: &Router, uri: &str, body: Value) -> Response {
    app.clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
        .unwrap()
}

async fn get_profile(app: &Router, authorization: Option<&str>) -> Response {
    let mut request = Request::builder().uri("/api/user/profile");
    if let Some(value) = authorization {
        request = request.header(header::AUTHORIZATION, value);
    }

    app.clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

async fn body_json(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

async fn signed_in_token(app: &Router) -> String {
    post_json(app, "/api/auth/signup", alice()).await;
    let response = post_json(
        app,
        "/api/auth/signin",
        json!({ "username": "alice", "password": "secret1" }),
    )
    .await;
    body_json(response).await["accessToken"]
        .as_str()
        .unwrap()
        .to_string()
}

#[tokio::test]
async fn test_sign_up_then_duplicate() {
    let app = app();

    let response = post_json(&app, "/api/auth/signup", alice()).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(bytes.is_empty());

    let response = post_json(&app, "/api/auth/signup", alice()).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sign_up_duplicate_email_in_other_case() {
    let app = app();
    post_json(&app, "/api/auth/signup", alice()).await;

    let mut other = alice();
    other["username"] = json!("bob");
    other["email"] = json!("A@X.COM");

    let response = post_json(&app, "/api/auth/signup", other).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_sign_up_missing_field() {
    let app = app();

    let mut body = alice();
    body.as_object_mut().unwrap().remove("lastName");

    let response = post_json(&app, "/api/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_up_malformed_body() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_up_without_content_type() {
    let app = app();

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/auth/signup")
                .body(Body::from(alice().to_string()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_sign_up_oversized_body() {
    let app = app();

    let mut body = alice();
    body["bio"] = json!("x".repeat(3 * 1024 * 1024));

    let response = post_json(&app, "/api/auth/signup", body).await;
    assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    assert_eq!(body_json(response).await["error"], "invalid_body");
}

#[tokio::test]
async fn test_sign_in_sets_cookie_and_returns_token() {
    let app = app();
    post_json(&app, "/api/auth/signup", alice()).await;

    let response = post_json(
        &app,
        "/api/auth/signin",
        json!({ "username": "alice", "password": "secret1" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .expect("refresh cookie")
        .to_str()
        .unwrap()
        .to_string();
    assert!(cookie.starts_with("refreshToken="));
    assert!(cookie.contains("HttpOnly"));
    assert!(cookie.contains("Secure"));
    assert!(cookie.contains("SameSite=None"));
    assert!(cookie.contains("Max-Age=1209600"));

    let body = body_json(response).await;
    assert!(!body["accessToken"].as_str().unwrap().is_empty());
    assert_eq!(body["message"], "User Alice A logged in!");
    assert!(body.get("refreshToken").is_none());
}

#[tokio::test]
async fn test_sign_in_failures_are_indistinguishable() {
    let app = app();
    post_json(&app, "/api/auth/signup", alice()).await;

    let wrong_password = post_json(
        &app,
        "/api/auth/signin",
        json!({ "username": "alice", "password": "wrong" }),
    )
    .await;
    let unknown_user = post_json(
        &app,
        "/api/auth/signin",
        json!({ "username": "mallory", "password": "secret1" }),
    )
    .await;

    assert_eq!(wrong_password.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_user.status(), StatusCode::UNAUTHORIZED);
    assert!(wrong_password.headers().get(header::SET_COOKIE).is_none());
    assert_eq!(body_json(wrong_password).await, body_json(unknown_user).await);
}

#[tokio::test]
async fn test_sign_in_missing_field() {
    let app = app();
    let response = post_json(&app, "/api/auth/signin", json!({ "username": "alice" })).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_profile_with_token() {
    let app = app();
    let token = signed_in_token(&app).await;

    let response = get_profile(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body["user"]["username"], "alice");
    assert_eq!(body["user"]["email"], "a@x.com");
    assert_eq!(body["user"]["displayName"], "Alice A");

    let text = body.to_string();
    assert!(!text.contains("passwordHash"));
    assert!(!text.contains("password_hash"));
    assert!(!text.contains("$argon2"));
}

#[tokio::test]
async fn test_profile_rejects_tampered_token() {
    let app = app();
    let token = signed_in_token(&app).await;

    let signature_start = token.rfind('.').unwrap() + 1;
    let mut bytes = token.into_bytes();
    let index = signature_start + 5;
    bytes[index] = if bytes[index] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(bytes).unwrap();

    let response = get_profile(&app, Some(&format!("Bearer {tampered}"))).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_without_token() {
    let app = app();

    let response = get_profile(&app, None).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = get_profile(&app, Some("Basic YWxpY2U6c2VjcmV0MQ==")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_for_vanished_user() {
    let config = AuthConfig {
        argon2_memory_cost: 1024,
        argon2_time_cost: 1,
        argon2_parallelism: 1,
        ..AuthConfig::new("integration-secret-0123456789-abcdefghij")
    };
    let store = Arc::new(MemoryStore::new());
    let auth = Arc::new(AuthService::new(config, store.clone(), store).unwrap());

    // A valid token whose user was never stored
    let token = auth
        .tokens()
        .issue_access_token(uuid::Uuid::new_v4())
        .unwrap();
    let app = create_routes(auth);

    let response = get_profile(&app, Some(&format!("Bearer {token}"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
