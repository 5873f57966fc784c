//! Keyward Web Server
//!
//! Form-driven register/login/logout with pluggable credential storage and
//! server-side sessions.

pub mod auth;
pub mod config_validator;
pub mod handlers;
pub mod routes;
pub mod server;
pub mod state;
pub mod templates;

// Re-export main types
pub use server::{KeywardServer, KeywardServerBuilder};
pub use state::AppState;

use auth::AuthError;
use axum::{extract::DefaultBodyLimit, Router};
use keyward_core::KeywardError;
use tower_http::trace::TraceLayer;
use tracing::error;

/// Create the main application router
pub fn create_app(state: AppState) -> Router {
    routes::all_routes()
        .layer(TraceLayer::new_for_http())
        .layer(DefaultBodyLimit::max(64 * 1024))
        .with_state(state)
}

/// Error types for the web server
#[derive(thiserror::Error, Debug)]
pub enum WebError {
    #[error("Server error: {0}")]
    Server(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Core(#[from] KeywardError),

    #[error("Authentication setup error: {0}")]
    Auth(#[from] AuthError),
}

impl WebError {
    /// Log the error, with full context for core errors
    pub fn log(&self) {
        match self {
            WebError::Core(e) => e.log(),
            WebError::Auth(e) => error!(code = e.code(), "{}", e),
            other => error!("{}", other),
        }
    }
}

/// Result type for web operations
pub type WebResult<T> = Result<T, WebError>;
