//! Argon2id password hashing

use super::error::AuthError;
use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};
use keyward_core::PasswordConfig;
use std::fmt;
use std::sync::Arc;
use tracing::warn;

const DUMMY_PASSWORD: &str = "keyward-timing-equaliser";

/// Hashes and verifies passwords as salted Argon2id PHC strings.
///
/// Cloning is cheap; the configured hasher and the dummy hash are shared.
#[derive(Clone)]
pub struct CredentialHasher {
    argon2: Argon2<'static>,
    dummy_hash: Arc<str>,
}

impl fmt::Debug for CredentialHasher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialHasher")
            .field("params", self.argon2.params())
            .finish_non_exhaustive()
    }
}

impl CredentialHasher {
    /// Create a hasher with the given cost parameters
    pub fn new(config: &PasswordConfig) -> Result<Self, AuthError> {
        let params = Params::new(
            config.memory_kib,
            config.iterations,
            config.parallelism,
            None,
        )
        .map_err(|e| AuthError::PasswordHash(format!("invalid Argon2 parameters: {}", e)))?;

        let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);
        let dummy_hash = hash_with(&argon2, DUMMY_PASSWORD)?;

        Ok(Self {
            argon2,
            dummy_hash: dummy_hash.into(),
        })
    }

    /// Hash a password with a fresh random salt
    pub fn hash(&self, password: &str) -> Result<String, AuthError> {
        hash_with(&self.argon2, password)
    }

    /// Verify a password against a stored PHC string.
    ///
    /// A malformed stored hash never verifies.
    pub fn verify(&self, password: &str, stored_hash: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Stored password hash is malformed: {}", e);
                return false;
            }
        };

        self.argon2
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    }

    /// Spend the same work as a real verification, for usernames that do not exist.
    pub fn verify_dummy(&self, password: &str) {
        let _ = self.verify(password, &self.dummy_hash);
    }

    /// [`hash`](Self::hash) on the blocking pool
    pub async fn hash_blocking(&self, password: &str) -> Result<String, AuthError> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| AuthError::PasswordHash(format!("hashing task failed: {}", e)))?
    }

    /// [`verify`](Self::verify) on the blocking pool; `None` runs the dummy verification
    pub async fn verify_blocking(
        &self,
        password: &str,
        stored_hash: Option<String>,
    ) -> Result<bool, AuthError> {
        let hasher = self.clone();
        let password = password.to_string();
        tokio::task::spawn_blocking(move || match stored_hash {
            Some(hash) => hasher.verify(&password, &hash),
            None => {
                hasher.verify_dummy(&password);
                false
            }
        })
        .await
        .map_err(|e| AuthError::PasswordHash(format!("verification task failed: {}", e)))
    }
}

fn hash_with(argon2: &Argon2<'static>, password: &str) -> Result<String, AuthError> {
    let salt = SaltString::generate(&mut OsRng);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| AuthError::PasswordHash(e.to_string()))
}
