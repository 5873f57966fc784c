//! JSON endpoint tests

use axum::{
    body::Body,
    http::{header, Request, StatusCode},
};
use keyward_core::{KeywardConfig, PasswordConfig};
use keyward_web::{create_app, AppState};
use serde_json::Value;
use tower::ServiceExt;

async fn test_state() -> AppState {
    let config = KeywardConfig {
        password: PasswordConfig::minimal(),
        ..KeywardConfig::default()
    };
    AppState::new(config).await.unwrap()
}

/// Test helper to extract JSON response
async fn extract_json_response(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_reports_backend_and_sessions() {
    let state = test_state().await;
    state.auth.login("admin", "admin", None).await.unwrap();
    let app = create_app(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let health = extract_json_response(response).await;
    assert_eq!(health["status"], "healthy");
    assert_eq!(health["backend"], "memory");
    assert_eq!(health["registered_users"], 1);
    assert_eq!(health["active_sessions"], 1);
    assert!(health["version"].is_string());
}

#[tokio::test]
async fn test_session_endpoint() {
    let state = test_state().await;
    let session = state.auth.login("admin", "admin", None).await.unwrap();
    let app = create_app(state);

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let anonymous = extract_json_response(response).await;
    assert_eq!(anonymous["authenticated"], false);
    assert!(anonymous["username"].is_null());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/session")
                .header(header::COOKIE, format!("keyward_session={}", session.id))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let authenticated = extract_json_response(response).await;
    assert_eq!(authenticated["authenticated"], true);
    assert_eq!(authenticated["username"], "admin");
}

#[tokio::test]
async fn test_custom_cookie_name() {
    let mut config = KeywardConfig {
        password: PasswordConfig::minimal(),
        ..KeywardConfig::default()
    };
    config.session.cookie_name = "sid".to_string();
    config.session.secure_cookie = true;
    let app = create_app(AppState::new(config).await.unwrap());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/auth")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from("action=login&username=admin&password=admin"))
                .unwrap(),
        )
        .await
        .unwrap();

    let set_cookie = response.headers()[header::SET_COOKIE].to_str().unwrap();
    assert!(set_cookie.starts_with("sid="));
    assert!(set_cookie.contains("Secure"));
}
