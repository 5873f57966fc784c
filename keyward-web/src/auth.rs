//! Credential storage, password hashing, sessions and the extractors that read them

pub mod credentials;
#[cfg(feature = "sqlite")]
pub mod database;
pub mod error;
pub mod handlers;
pub mod password;
pub mod service;
pub mod sessions;

#[cfg(test)]
mod tests;

pub use credentials::{seed_admin, Created, CredentialStore, MemoryCredentialStore};
pub use error::AuthError;
pub use password::CredentialHasher;
pub use service::AuthService;
pub use sessions::{Session, SessionManager};

use crate::AppState;
use axum::{
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
    response::{IntoResponse, Redirect, Response},
};
use axum_extra::extract::cookie::CookieJar;
use serde::Serialize;
use tracing::debug;

/// Identity behind a live session cookie
#[derive(Debug, Clone, Serialize)]
pub struct SessionUser {
    #[serde(skip)]
    pub session_id: String,
    pub username: String,
}

/// Sends anonymous visitors to the login form
#[derive(Debug)]
pub struct LoginRedirect;

impl IntoResponse for LoginRedirect {
    fn into_response(self) -> Response {
        Redirect::to("/login").into_response()
    }
}

/// Resolve the session cookie carried by `parts`, if any
async fn session_from_parts(parts: &Parts, state: &AppState) -> Option<SessionUser> {
    let jar = CookieJar::from_headers(&parts.headers);
    let cookie = jar.get(&state.config.session.cookie_name)?;

    match state.auth.current_session(cookie.value()).await {
        Some(session) => Some(SessionUser {
            session_id: session.id,
            username: session.username,
        }),
        None => {
            debug!("Session cookie did not resolve to a live session");
            None
        }
    }
}

impl<S> FromRequestParts<S> for SessionUser
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = LoginRedirect;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        session_from_parts(parts, &app_state)
            .await
            .ok_or(LoginRedirect)
    }
}

/// Session extractor that never rejects
#[derive(Debug, Clone)]
pub struct OptionalSession(pub Option<SessionUser>);

impl<S> FromRequestParts<S> for OptionalSession
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app_state = AppState::from_ref(state);
        Ok(OptionalSession(
            session_from_parts(parts, &app_state).await,
        ))
    }
}
