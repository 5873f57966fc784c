//! Credential storage abstraction and the in-memory backend

use super::{error::AuthError, password::CredentialHasher};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use keyward_core::StorageConfig;
use serde::Serialize;
use std::collections::{hash_map::Entry, HashMap};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

/// Successful registration
#[derive(Debug, Clone, Serialize)]
pub struct Created {
    pub username: String,
    pub created_at: DateTime<Utc>,
}

/// Stored credential. The password is only ever held as an Argon2 PHC string.
#[derive(Debug, Clone)]
pub struct CredentialRecord {
    pub username: String,
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

/// Username to password records with uniqueness enforcement.
///
/// `register` must insert-if-absent atomically. `authenticate` returns
/// `Ok(false)` for both unknown usernames and wrong passwords; `Err` is
/// reserved for storage failures.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    async fn register(&self, username: &str, password: &str) -> Result<Created, AuthError>;

    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError>;

    /// Number of registered usernames
    async fn count(&self) -> Result<u64, AuthError>;

    /// Short backend name for diagnostics
    fn backend(&self) -> &'static str;
}

/// In-memory storage, lost on restart
#[derive(Debug, Clone)]
pub struct MemoryCredentialStore {
    records: Arc<RwLock<HashMap<String, CredentialRecord>>>,
    hasher: CredentialHasher,
}

impl MemoryCredentialStore {
    pub fn new(hasher: CredentialHasher) -> Self {
        Self {
            records: Arc::new(RwLock::new(HashMap::new())),
            hasher,
        }
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn register(&self, username: &str, password: &str) -> Result<Created, AuthError> {
        // Hash before taking the lock; the check and the insert share one write guard.
        let password_hash = self.hasher.hash_blocking(password).await?;

        let mut records = self.records.write().await;
        match records.entry(username.to_string()) {
            Entry::Occupied(_) => {
                debug!("Registration rejected: username '{}' already exists", username);
                Err(AuthError::DuplicateUsername)
            }
            Entry::Vacant(slot) => {
                let record = slot.insert(CredentialRecord {
                    username: username.to_string(),
                    password_hash,
                    created_at: Utc::now(),
                });
                debug!("Stored credential for: {}", record.username);
                Ok(Created {
                    username: record.username.clone(),
                    created_at: record.created_at,
                })
            }
        }
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let stored_hash = {
            let records = self.records.read().await;
            records.get(username).map(|r| r.password_hash.clone())
        };

        self.hasher.verify_blocking(password, stored_hash).await
    }

    async fn count(&self) -> Result<u64, AuthError> {
        Ok(self.records.read().await.len() as u64)
    }

    fn backend(&self) -> &'static str {
        "memory"
    }
}

/// Register the configured administrative credential unless it already exists
pub async fn seed_admin(
    store: &dyn CredentialStore,
    config: &StorageConfig,
) -> Result<(), AuthError> {
    if !config.seed_admin {
        return Ok(());
    }

    match store
        .register(&config.admin_username, &config.admin_password)
        .await
    {
        Ok(created) => {
            info!("Seeded administrative user: {}", created.username);
            Ok(())
        }
        Err(AuthError::DuplicateUsername) => {
            debug!("Administrative user already present");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
