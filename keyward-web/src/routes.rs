//! Route definitions for the Keyward web server

use crate::{auth, handlers, AppState};
use axum::{
    routing::{get, post},
    Router,
};

/// JSON endpoints, nested under `/api`
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        .route("/session", get(handlers::session_info))
}

/// Form pages and the `/auth` router
pub fn page_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(handlers::index))
        .route("/login", get(handlers::login_page))
        .route("/register", get(handlers::register_page))
        .route("/welcome", get(handlers::welcome_page))
        .route("/auth", post(auth::handlers::dispatch))
}

/// Create all routes combined
pub fn all_routes() -> Router<AppState> {
    Router::new()
        .nest("/api", api_routes())
        .merge(page_routes())
}
