//! Health and session status endpoints

use super::types::{HealthResponse, SessionInfoResponse};
use crate::{auth::OptionalSession, AppState};
use axum::{extract::State, response::Json};
use tracing::warn;

/// Health check endpoint.
///
/// Reports `degraded` when the credential store cannot be counted.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let store = state.auth.store();

    let (status, registered_users) = match store.count().await {
        Ok(count) => ("healthy", Some(count)),
        Err(e) => {
            warn!("Health check could not reach credential storage: {}", e);
            ("degraded", None)
        }
    };

    Json(HealthResponse {
        status: status.to_string(),
        timestamp: chrono::Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        backend: store.backend().to_string(),
        registered_users,
        active_sessions: state.auth.sessions().active_count().await,
    })
}

/// Whether the request carries a live session, and for whom
pub async fn session_info(OptionalSession(session): OptionalSession) -> Json<SessionInfoResponse> {
    Json(SessionInfoResponse {
        authenticated: session.is_some(),
        username: session.map(|s| s.username),
    })
}
