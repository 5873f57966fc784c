//! Tests for the auth service and the session extractors

use super::*;
use axum::{
    body::Body,
    extract::FromRequestParts,
    http::{header::COOKIE, HeaderValue, Method, Request, StatusCode},
};
use keyward_core::{KeywardConfig, PasswordConfig};
use std::sync::Arc;

fn test_config() -> KeywardConfig {
    KeywardConfig {
        password: PasswordConfig::minimal(),
        ..KeywardConfig::default()
    }
}

async fn test_state() -> AppState {
    AppState::new(test_config()).await.unwrap()
}

/// Request parts carrying `cookie`, if given
fn parts_with_cookie(cookie: Option<String>) -> Parts {
    let mut request = Request::builder()
        .method(Method::GET)
        .uri("/test")
        .body(Body::empty())
        .unwrap();

    if let Some(cookie) = cookie {
        request
            .headers_mut()
            .insert(COOKIE, HeaderValue::from_str(&cookie).unwrap());
    }

    request.into_parts().0
}

#[tokio::test]
async fn test_register_login_scenario() {
    let state = test_state().await;
    let auth = &state.auth;

    auth.register("alice", "pw1").await.unwrap();
    assert!(matches!(
        auth.register("alice", "pw2").await,
        Err(AuthError::DuplicateUsername)
    ));

    let session = auth.login("alice", "pw1", None).await.unwrap();
    assert_eq!(session.username, "alice");
    assert!(matches!(
        auth.login("alice", "pw2", None).await,
        Err(AuthError::InvalidCredentials)
    ));
}

#[tokio::test]
async fn test_register_requires_both_fields() {
    let state = test_state().await;

    for (username, password) in [("", "pw"), ("   ", "pw"), ("bob", "")] {
        assert!(matches!(
            state.auth.register(username, password).await,
            Err(AuthError::MissingCredentials)
        ));
    }
    // Only the seeded admin is stored
    assert_eq!(state.auth.store().count().await.unwrap(), 1);
}

#[tokio::test]
async fn test_login_with_missing_fields_is_invalid() {
    let state = test_state().await;

    assert!(matches!(
        state.auth.login("", "admin", None).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert!(matches!(
        state.auth.login("admin", "", None).await,
        Err(AuthError::InvalidCredentials)
    ));
    assert_eq!(state.auth.sessions().active_count().await, 0);
}

#[tokio::test]
async fn test_failed_login_issues_no_session() {
    let state = test_state().await;

    let _ = state.auth.login("admin", "wrong", None).await;
    let _ = state.auth.login("ghost", "admin", None).await;

    assert_eq!(state.auth.sessions().active_count().await, 0);
}

#[tokio::test]
async fn test_relogin_replaces_previous_session() {
    let state = test_state().await;

    let first = state.auth.login("admin", "admin", None).await.unwrap();
    let second = state
        .auth
        .login("admin", "admin", Some(&first.id))
        .await
        .unwrap();

    assert_ne!(first.id, second.id);
    assert!(state.auth.current_session(&first.id).await.is_none());
    assert!(state.auth.current_session(&second.id).await.is_some());
}

#[tokio::test]
async fn test_logout_without_session_is_noop() {
    let state = test_state().await;

    assert!(!state.auth.logout(None).await);
    assert!(!state.auth.logout(Some("unknown")).await);
}

#[tokio::test]
async fn test_storage_failure_is_not_invalid_credentials() {
    struct BrokenStore;

    #[async_trait::async_trait]
    impl CredentialStore for BrokenStore {
        async fn register(&self, _: &str, _: &str) -> Result<Created, AuthError> {
            Err(AuthError::StorageUnavailable("offline".to_string()))
        }

        async fn authenticate(&self, _: &str, _: &str) -> Result<bool, AuthError> {
            Err(AuthError::StorageUnavailable("offline".to_string()))
        }

        async fn count(&self) -> Result<u64, AuthError> {
            Err(AuthError::StorageUnavailable("offline".to_string()))
        }

        fn backend(&self) -> &'static str {
            "broken"
        }
    }

    let mut config = test_config();
    config.storage.seed_admin = false;
    let state = AppState::with_store(config, Arc::new(BrokenStore))
        .await
        .unwrap();

    let err = state.auth.login("admin", "admin", None).await.unwrap_err();
    assert!(matches!(err, AuthError::StorageUnavailable(_)));
    assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_session_user_extraction() {
    let state = test_state().await;
    let session = state.auth.login("admin", "admin", None).await.unwrap();

    let mut parts = parts_with_cookie(Some(format!("keyward_session={}", session.id)));
    let user = SessionUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap();

    assert_eq!(user.username, "admin");
    assert_eq!(user.session_id, session.id);
}

#[tokio::test]
async fn test_session_user_rejects_anonymous() {
    let state = test_state().await;

    let mut parts = parts_with_cookie(None);
    let result = SessionUser::from_request_parts(&mut parts, &state).await;
    assert!(result.is_err());

    let mut parts = parts_with_cookie(Some("keyward_session=forged".to_string()));
    let rejection = SessionUser::from_request_parts(&mut parts, &state)
        .await
        .unwrap_err();
    let response = rejection.into_response();
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(response.headers()["location"], "/login");
}

#[tokio::test]
async fn test_optional_session_after_logout() {
    let state = test_state().await;
    let session = state.auth.login("admin", "admin", None).await.unwrap();
    let cookie = format!("keyward_session={}", session.id);

    let mut parts = parts_with_cookie(Some(cookie.clone()));
    let OptionalSession(before) = OptionalSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert!(before.is_some());

    state.auth.logout(Some(&session.id)).await;

    let mut parts = parts_with_cookie(Some(cookie));
    let OptionalSession(after) = OptionalSession::from_request_parts(&mut parts, &state)
        .await
        .unwrap();
    assert!(after.is_none());
}
