//! Register/login/logout over a credential store and a session manager

use super::{
    credentials::{Created, CredentialStore},
    error::AuthError,
    sessions::{Session, SessionManager},
};
use std::sync::Arc;
use tracing::{info, warn};

/// Ties credential checks to session issuance.
///
/// A session is only ever created after the store confirms the credential.
#[derive(Clone)]
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    sessions: SessionManager,
}

impl AuthService {
    pub fn new(store: Arc<dyn CredentialStore>, sessions: SessionManager) -> Self {
        Self { store, sessions }
    }

    /// Create a credential record for a new username
    pub async fn register(&self, username: &str, password: &str) -> Result<Created, AuthError> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }

        match self.store.register(username, password).await {
            Ok(created) => {
                info!("Registered new user: {}", created.username);
                Ok(created)
            }
            Err(AuthError::DuplicateUsername) => {
                info!("Registration refused, username taken: {}", username);
                Err(AuthError::DuplicateUsername)
            }
            Err(e) => {
                warn!("Registration failed for {}: {}", username, e);
                Err(e)
            }
        }
    }

    /// Check the credential and issue a fresh session.
    ///
    /// Any session the caller already holds is invalidated first.
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        previous_session: Option<&str>,
    ) -> Result<Session, AuthError> {
        if username.is_empty() || password.is_empty() {
            warn!("Login attempt with missing credentials");
            return Err(AuthError::InvalidCredentials);
        }

        let valid = self.store.authenticate(username, password).await.map_err(|e| {
            warn!("Login for {} could not reach credential storage: {}", username, e);
            e
        })?;

        if !valid {
            warn!("Failed login attempt for user: {}", username);
            return Err(AuthError::InvalidCredentials);
        }

        if let Some(previous) = previous_session {
            self.sessions.logout(previous).await;
        }

        let session = self.sessions.login(username).await;
        info!("User logged in: {}", username);
        Ok(session)
    }

    /// Invalidate the caller's session if it has one
    pub async fn logout(&self, session_id: Option<&str>) -> bool {
        let Some(session_id) = session_id else {
            return false;
        };

        let removed = self.sessions.logout(session_id).await;
        if removed {
            info!("User logged out");
        }
        removed
    }

    pub async fn current_session(&self, session_id: &str) -> Option<Session> {
        self.sessions.resolve(session_id).await
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }
}

impl std::fmt::Debug for AuthService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthService")
            .field("backend", &self.store.backend())
            .field("sessions", &self.sessions)
            .finish()
    }
}
