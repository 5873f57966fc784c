//! Shared application state

use crate::{
    auth::{
        seed_admin, AuthService, CredentialHasher, CredentialStore, MemoryCredentialStore,
        SessionManager,
    },
    WebError, WebResult,
};
use axum_extra::extract::cookie::{Cookie, SameSite};
use keyward_core::KeywardConfig;
use std::sync::Arc;
use tracing::info;

#[cfg(feature = "sqlite")]
use crate::auth::database::{connect_pool, SqliteCredentialStore};

/// State handed to every handler
#[derive(Clone, Debug)]
pub struct AppState {
    /// Configuration
    pub config: Arc<KeywardConfig>,
    /// Credential checks and sessions
    pub auth: AuthService,
}

impl AppState {
    /// Build state from configuration, choosing the credential backend.
    ///
    /// A configured database that cannot be reached is an error; there is no
    /// silent fallback to memory.
    pub async fn new(config: KeywardConfig) -> WebResult<Self> {
        let hasher = CredentialHasher::new(&config.password)?;

        let store: Arc<dyn CredentialStore> = match config.storage.database_url.as_deref() {
            #[cfg(feature = "sqlite")]
            Some(database_url) => {
                let pool = connect_pool(&config.storage, database_url).await?;
                Arc::new(SqliteCredentialStore::new(pool, hasher).await?)
            }
            #[cfg(not(feature = "sqlite"))]
            Some(_) => {
                return Err(WebError::Config(
                    "database_url is set but this build has no sqlite support".to_string(),
                ))
            }
            None => Arc::new(MemoryCredentialStore::new(hasher)),
        };

        Self::with_store(config, store).await
    }

    /// Build state around an existing credential store
    pub async fn with_store(
        config: KeywardConfig,
        store: Arc<dyn CredentialStore>,
    ) -> WebResult<Self> {
        seed_admin(store.as_ref(), &config.storage).await?;

        let idle_timeout = i64::try_from(config.session.idle_timeout_secs)
            .ok()
            .and_then(chrono::Duration::try_seconds)
            .ok_or_else(|| WebError::Config("session idle timeout is too large".to_string()))?;
        let sessions = SessionManager::new(idle_timeout);

        info!(
            "Application state initialized with {} credential storage",
            store.backend()
        );

        Ok(Self {
            config: Arc::new(config),
            auth: AuthService::new(store, sessions),
        })
    }

    /// Cookie carrying a freshly issued session id
    pub fn session_cookie(&self, session_id: String) -> Cookie<'static> {
        Cookie::build((self.config.session.cookie_name.clone(), session_id))
            .path("/")
            .http_only(true)
            .same_site(SameSite::Lax)
            .secure(self.config.session.secure_cookie)
            .build()
    }

    /// Cookie matching [`session_cookie`](Self::session_cookie) for removal
    pub fn removal_cookie(&self) -> Cookie<'static> {
        Cookie::build(self.config.session.cookie_name.clone())
            .path("/")
            .build()
    }

    /// Drop expired sessions
    pub async fn cleanup_expired_sessions(&self) -> usize {
        self.auth.sessions().cleanup_expired().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keyward_core::PasswordConfig;

    fn test_config() -> KeywardConfig {
        KeywardConfig {
            password: PasswordConfig::minimal(),
            ..KeywardConfig::default()
        }
    }

    #[tokio::test]
    async fn test_memory_backend_is_seeded() {
        let state = AppState::new(test_config()).await.unwrap();

        assert_eq!(state.auth.store().backend(), "memory");
        assert!(state.auth.store().authenticate("admin", "admin").await.unwrap());
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_sqlite_backend_selected_by_url() {
        let mut config = test_config();
        config.storage.database_url = Some("sqlite::memory:".to_string());

        let state = AppState::new(config).await.unwrap();
        assert_eq!(state.auth.store().backend(), "sqlite");
        assert_eq!(state.auth.store().count().await.unwrap(), 1);
    }

    #[cfg(feature = "sqlite")]
    #[tokio::test]
    async fn test_unreachable_database_fails_startup() {
        let mut config = test_config();
        config.storage.database_url =
            Some("sqlite:///nonexistent-keyward-dir/nested/users.db".to_string());

        assert!(AppState::new(config).await.is_err());
    }

    #[tokio::test]
    async fn test_oversized_idle_timeout_is_config_error() {
        let mut config = test_config();
        config.session.idle_timeout_secs = 10_000_000_000_000_000;

        let result = AppState::new(config).await;
        assert!(matches!(result, Err(WebError::Config(_))));
    }

    #[tokio::test]
    async fn test_session_cookie_attributes() {
        let state = AppState::new(test_config()).await.unwrap();
        let cookie = state.session_cookie("abc".to_string());

        assert_eq!(cookie.name(), "keyward_session");
        assert_eq!(cookie.value(), "abc");
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.same_site(), Some(SameSite::Lax));
        assert_eq!(cookie.path(), Some("/"));
    }
}
