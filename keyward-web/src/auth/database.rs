//! SQLite-backed credential storage

use super::{
    credentials::{Created, CredentialStore},
    error::AuthError,
    password::CredentialHasher,
};
use async_trait::async_trait;
use chrono::Utc;
use keyward_core::{storage_error, KeywardResult, StorageConfig};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;
use tracing::{debug, error, info};

/// Open a connection pool for the credential table.
///
/// In-memory databases live only as long as their connection, so they get a
/// single connection that is never recycled.
pub async fn connect_pool(config: &StorageConfig, database_url: &str) -> KeywardResult<SqlitePool> {
    info!("🔗 Connecting to credential database: {}", database_url);

    let options = SqliteConnectOptions::from_str(database_url)
        .map_err(|e| storage_error!(format!("Invalid database URL: {}", database_url), "database", e))?
        .create_if_missing(true);

    let in_memory = database_url.contains(":memory:") || database_url.contains("mode=memory");

    let pool_options =
        SqlitePoolOptions::new().acquire_timeout(Duration::from_secs(config.acquire_timeout_secs));

    let pool_options = if in_memory {
        debug!("Using a single pinned connection for in-memory database");
        pool_options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
    } else {
        pool_options
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
    };

    let pool = pool_options.connect_with(options).await.map_err(|e| {
        error!("❌ Database connection failed: {}", e);
        storage_error!("Failed to connect to database", "database", e)
    })?;

    info!("✅ Database connection established successfully");
    Ok(pool)
}

/// Credential store over a `users` table.
///
/// Uniqueness comes from the table's primary key, so duplicate detection is
/// atomic without a separate existence query.
#[derive(Debug, Clone)]
pub struct SqliteCredentialStore {
    pool: SqlitePool,
    hasher: CredentialHasher,
}

impl SqliteCredentialStore {
    /// Create the store, creating the table when missing
    pub async fn new(pool: SqlitePool, hasher: CredentialHasher) -> Result<Self, AuthError> {
        let store = Self { pool, hasher };
        store.create_tables().await?;
        Ok(store)
    }

    async fn create_tables(&self) -> Result<(), AuthError> {
        let query = r#"
            CREATE TABLE IF NOT EXISTS users (
                username TEXT PRIMARY KEY NOT NULL,
                password_hash TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
        "#;

        sqlx::query(query).execute(&self.pool).await.map_err(|e| {
            error!("Failed to create users table: {}", e);
            AuthError::StorageUnavailable(e.to_string())
        })?;

        debug!("Users table ready");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

#[async_trait]
impl CredentialStore for SqliteCredentialStore {
    async fn register(&self, username: &str, password: &str) -> Result<Created, AuthError> {
        let password_hash = self.hasher.hash_blocking(password).await?;
        let created_at = Utc::now();

        sqlx::query("INSERT INTO users (username, password_hash, created_at) VALUES (?, ?, ?)")
            .bind(username)
            .bind(&password_hash)
            .bind(created_at.to_rfc3339())
            .execute(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::Database(db) if db.is_unique_violation() => {
                    debug!("Registration rejected: username '{}' already exists", username);
                    AuthError::DuplicateUsername
                }
                other => {
                    error!("Failed to insert user: {}", other);
                    AuthError::StorageUnavailable(other.to_string())
                }
            })?;

        debug!("User inserted successfully: {}", username);
        Ok(Created {
            username: username.to_string(),
            created_at,
        })
    }

    async fn authenticate(&self, username: &str, password: &str) -> Result<bool, AuthError> {
        let stored_hash =
            sqlx::query_scalar::<_, String>("SELECT password_hash FROM users WHERE username = ?")
                .bind(username)
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| {
                    error!("Failed to query user by username: {}", e);
                    AuthError::StorageUnavailable(e.to_string())
                })?;

        self.hasher.verify_blocking(password, stored_hash).await
    }

    async fn count(&self) -> Result<u64, AuthError> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AuthError::StorageUnavailable(e.to_string()))?;

        Ok(count.max(0) as u64)
    }

    fn backend(&self) -> &'static str {
        "sqlite"
    }
}
