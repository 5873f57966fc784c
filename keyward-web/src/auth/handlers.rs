//! Form router for `POST /auth`
//!
//! One endpoint, three branches chosen by the `action` field. Outcomes are
//! redirects carrying a status code in the query string, or rendered views.

use super::error::AuthError;
use crate::{
    templates::{HtmlTemplate, LoginTemplate, WelcomeTemplate},
    AppState,
};
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::CookieJar;
use serde::Deserialize;
use std::str::FromStr;
use tracing::{debug, info, warn};

pub const INVALID_LOGIN_MESSAGE: &str = "Invalid Username or Password!";
pub const STORAGE_UNAVAILABLE_MESSAGE: &str =
    "Login is temporarily unavailable, please try again later.";

/// Fields submitted by the login, register and logout forms
#[derive(Debug, Default, Deserialize)]
pub struct AuthForm {
    pub action: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
}

/// The branch a form submission asks for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    Register,
    Login,
    Logout,
}

impl FromStr for AuthAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "register" => Ok(AuthAction::Register),
            "login" => Ok(AuthAction::Login),
            "logout" => Ok(AuthAction::Logout),
            other => Err(format!("unknown action: {}", other)),
        }
    }
}

/// Dispatch a form submission on its action token.
///
/// Missing or unrecognised actions land on the login form without touching
/// any state.
pub async fn dispatch(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(form): Form<AuthForm>,
) -> Response {
    let action = form.action.as_deref().map(AuthAction::from_str);

    match action {
        Some(Ok(AuthAction::Register)) => register(&state, &form).await,
        Some(Ok(AuthAction::Login)) => login(&state, jar, &form).await,
        Some(Ok(AuthAction::Logout)) => logout(&state, jar).await,
        Some(Err(e)) => {
            debug!("Rejected form submission: {}", e);
            Redirect::to("/login").into_response()
        }
        None => Redirect::to("/login").into_response(),
    }
}

async fn register(state: &AppState, form: &AuthForm) -> Response {
    let username = form.username.as_deref().unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();

    let target = match state.auth.register(username, password).await {
        Ok(_) => "/login?msg=RegisteredSuccessfully",
        Err(AuthError::DuplicateUsername) => "/register?error=UserExists",
        Err(AuthError::MissingCredentials) => "/register?error=MissingCredentials",
        Err(AuthError::StorageUnavailable(_)) => "/register?error=StorageUnavailable",
        Err(AuthError::InvalidCredentials | AuthError::PasswordHash(_)) => {
            "/register?error=ServerError"
        }
    };

    Redirect::to(target).into_response()
}

async fn login(state: &AppState, jar: CookieJar, form: &AuthForm) -> Response {
    let username = form.username.as_deref().unwrap_or_default();
    let password = form.password.as_deref().unwrap_or_default();
    let previous = jar
        .get(&state.config.session.cookie_name)
        .map(|cookie| cookie.value().to_string());

    match state
        .auth
        .login(username, password, previous.as_deref())
        .await
    {
        Ok(session) => {
            let jar = jar.add(state.session_cookie(session.id));
            (jar, HtmlTemplate(WelcomeTemplate::new(session.username))).into_response()
        }
        Err(e) => {
            let message = if e.status().is_server_error() {
                warn!(code = e.code(), "Login failed: {}", e);
                STORAGE_UNAVAILABLE_MESSAGE
            } else {
                debug!(code = e.code(), "Login rejected");
                INVALID_LOGIN_MESSAGE
            };

            (
                e.status(),
                HtmlTemplate(LoginTemplate::new(None, Some(message.to_string()))),
            )
                .into_response()
        }
    }
}

async fn logout(state: &AppState, jar: CookieJar) -> Response {
    let cookie_name = state.config.session.cookie_name.clone();
    let session_id = jar.get(&cookie_name).map(|c| c.value().to_string());

    if !state.auth.logout(session_id.as_deref()).await {
        info!("Logout requested without a live session");
    }

    let jar = jar.remove(state.removal_cookie());
    (jar, Redirect::to("/login?msg=logOutSuccessful")).into_response()
}
