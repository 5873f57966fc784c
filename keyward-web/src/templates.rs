//! Server-rendered views
//!
//! Askama templates live under `templates/` in this crate.

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use tracing::error;

/// Login form, with an optional status banner and error line
#[derive(Template)]
#[template(path = "login.html")]
pub struct LoginTemplate {
    pub title: String,
    pub message: Option<String>,
    pub error: Option<String>,
}

/// Registration form
#[derive(Template)]
#[template(path = "register.html")]
pub struct RegisterTemplate {
    pub title: String,
    pub error: Option<String>,
}

/// Landing view for an authenticated user
#[derive(Template)]
#[template(path = "welcome.html")]
pub struct WelcomeTemplate {
    pub title: String,
    pub username: String,
}

impl LoginTemplate {
    pub fn new(message: Option<String>, error: Option<String>) -> Self {
        Self {
            title: "Keyward - Login".to_string(),
            message,
            error,
        }
    }
}

impl RegisterTemplate {
    pub fn new(error: Option<String>) -> Self {
        Self {
            title: "Keyward - Register".to_string(),
            error,
        }
    }
}

impl WelcomeTemplate {
    pub fn new(username: String) -> Self {
        Self {
            title: format!("Keyward - Welcome {}", username),
            username,
        }
    }
}

/// Renders an askama template as an HTML response
pub struct HtmlTemplate<T>(pub T);

impl<T: Template> IntoResponse for HtmlTemplate<T> {
    fn into_response(self) -> Response {
        match self.0.render() {
            Ok(html) => Html(html).into_response(),
            Err(e) => {
                error!("Failed to render template: {}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Failed to render page").into_response()
            }
        }
    }
}
