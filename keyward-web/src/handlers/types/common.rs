//! JSON payloads for the `/api` endpoints

use serde::{Deserialize, Serialize};

/// Health report
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
    pub version: String,
    /// Credential backend name, `memory` or `sqlite`
    pub backend: String,
    pub registered_users: Option<u64>,
    pub active_sessions: usize,
}

/// Authentication status of the calling request
#[derive(Debug, Serialize, Deserialize)]
pub struct SessionInfoResponse {
    pub authenticated: bool,
    pub username: Option<String>,
}

/// Status banner parameters on the login and register forms
#[derive(Debug, Default, Deserialize)]
pub struct StatusQuery {
    pub msg: Option<String>,
    pub error: Option<String>,
}
