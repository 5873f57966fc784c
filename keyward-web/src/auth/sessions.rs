//! Server-side sessions keyed by an opaque identifier

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::{DateTime, Duration, Utc};
use rand::{rngs::OsRng, RngCore};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Name of the attribute holding the authenticated username
pub const USERNAME_ATTRIBUTE: &str = "username";

const SESSION_ID_BYTES: usize = 32;

/// A live session bound to an authenticated username
#[derive(Debug, Clone, Serialize)]
pub struct Session {
    pub id: String,
    pub username: String,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    pub attributes: HashMap<String, String>,
}

impl Session {
    fn new(username: String) -> Self {
        let now = Utc::now();
        let mut attributes = HashMap::new();
        attributes.insert(USERNAME_ATTRIBUTE.to_string(), username.clone());

        Self {
            id: generate_session_id(),
            username,
            created_at: now,
            last_activity: now,
            attributes,
        }
    }

    fn is_expired(&self, idle_timeout: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_activity >= idle_timeout
    }
}

/// 256 random bits, URL-safe base64
fn generate_session_id() -> String {
    let mut bytes = [0u8; SESSION_ID_BYTES];
    OsRng.fill_bytes(&mut bytes);
    URL_SAFE_NO_PAD.encode(bytes)
}

/// Issues, resolves and invalidates sessions.
///
/// Removal from the map is the only way a session stops authenticating, so
/// an invalidated or expired identifier can never resolve again.
#[derive(Debug, Clone)]
pub struct SessionManager {
    sessions: Arc<RwLock<HashMap<String, Session>>>,
    idle_timeout: Duration,
}

impl SessionManager {
    pub fn new(idle_timeout: Duration) -> Self {
        Self {
            sessions: Arc::new(RwLock::new(HashMap::new())),
            idle_timeout,
        }
    }

    /// Create a session bound to `username`
    pub async fn login(&self, username: &str) -> Session {
        let session = Session::new(username.to_string());

        let mut sessions = self.sessions.write().await;
        sessions.insert(session.id.clone(), session.clone());

        debug!("Issued session for: {}", username);
        session
    }

    /// Invalidate a session. Returns whether one was removed; absent ids are a no-op.
    pub async fn logout(&self, session_id: &str) -> bool {
        let removed = self.sessions.write().await.remove(session_id);
        match removed {
            Some(session) => {
                debug!("Invalidated session for: {}", session.username);
                true
            }
            None => false,
        }
    }

    /// Look up a live session and record activity on it
    pub async fn resolve(&self, session_id: &str) -> Option<Session> {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;

        let expired = match sessions.get_mut(session_id) {
            Some(session) if !session.is_expired(self.idle_timeout, now) => {
                session.last_activity = now;
                return Some(session.clone());
            }
            Some(_) => true,
            None => false,
        };

        if expired {
            sessions.remove(session_id);
            debug!("Session expired on access");
        }
        None
    }

    /// Store an attribute on a live session. The username attribute is
    /// fixed at login and cannot be overwritten.
    pub async fn set_attribute(&self, session_id: &str, key: &str, value: &str) -> bool {
        if key == USERNAME_ATTRIBUTE {
            return false;
        }
        let mut sessions = self.sessions.write().await;
        match sessions.get_mut(session_id) {
            Some(session) => {
                session
                    .attributes
                    .insert(key.to_string(), value.to_string());
                true
            }
            None => false,
        }
    }

    pub async fn attribute(&self, session_id: &str, key: &str) -> Option<String> {
        let sessions = self.sessions.read().await;
        sessions
            .get(session_id)
            .filter(|s| !s.is_expired(self.idle_timeout, Utc::now()))
            .and_then(|s| s.attributes.get(key).cloned())
    }

    /// Drop every session idle past the timeout
    pub async fn cleanup_expired(&self) -> usize {
        let now = Utc::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|_, session| !session.is_expired(self.idle_timeout, now));
        let removed = before - sessions.len();

        if removed > 0 {
            info!("Cleaned up {} expired sessions", removed);
        }
        removed
    }

    pub async fn active_count(&self) -> usize {
        self.sessions.read().await.len()
    }
}
