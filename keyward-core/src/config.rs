//! Layered configuration
//!
//! Defaults, then an optional TOML file, then `KEYWARD__SECTION__KEY` environment variables.

use crate::error::{ErrorContext, KeywardError, KeywardResult};
use crate::logging::LoggingConfig;
use crate::{config_error, validation_error};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable prefix for configuration overrides
pub const ENV_PREFIX: &str = "KEYWARD";

/// Upper bound for session timings, ten years
pub const MAX_SESSION_SECS: u64 = 10 * 365 * 24 * 60 * 60;

/// Top-level configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct KeywardConfig {
    pub server: ServerConfig,
    pub storage: StorageConfig,
    pub session: SessionConfig,
    pub password: PasswordConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Server host
    pub host: String,
    /// Server port
    pub port: u16,
    /// Enable development mode
    pub dev_mode: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            dev_mode: false,
        }
    }
}

impl ServerConfig {
    /// Get the server address
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Credential storage settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// SQLite URL; the in-memory credential table is used when unset
    pub database_url: Option<String>,
    /// Upper bound on pooled connections
    pub max_connections: u32,
    /// Connections kept open while idle
    pub min_connections: u32,
    /// How long a request waits for a pooled connection
    pub acquire_timeout_secs: u64,
    /// Seed the administrative credential at startup
    pub seed_admin: bool,
    pub admin_username: String,
    pub admin_password: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            max_connections: 10,
            min_connections: 2,
            acquire_timeout_secs: 5,
            seed_admin: true,
            admin_username: "admin".to_string(),
            admin_password: "admin".to_string(),
        }
    }
}

/// Session cookie and lifetime settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub cookie_name: String,
    /// Mark the cookie `Secure` (HTTPS only)
    pub secure_cookie: bool,
    /// Sessions idle longer than this are expired
    pub idle_timeout_secs: u64,
    /// Interval of the background sweep removing expired sessions
    pub cleanup_interval_secs: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "keyward_session".to_string(),
            secure_cookie: false,
            idle_timeout_secs: 30 * 60,
            cleanup_interval_secs: 5 * 60,
        }
    }
}

/// Argon2id cost parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

impl Default for PasswordConfig {
    // argon2 crate defaults (OWASP minimum for Argon2id)
    fn default() -> Self {
        Self {
            memory_kib: 19 * 1024,
            iterations: 2,
            parallelism: 1,
        }
    }
}

impl PasswordConfig {
    /// Cheapest parameters Argon2 accepts. Test use only.
    pub fn minimal() -> Self {
        Self {
            memory_kib: 8,
            iterations: 1,
            parallelism: 1,
        }
    }
}

impl KeywardConfig {
    /// Load configuration from defaults, an optional TOML file and the environment
    pub fn load(path: Option<&Path>) -> KeywardResult<Self> {
        let defaults = config::Config::try_from(&Self::default())
            .map_err(|e| config_source_error(e, "serialize_defaults"))?;

        let mut builder = config::Config::builder().add_source(defaults);

        if let Some(path) = path {
            if !path.exists() {
                return Err(config_error!(
                    format!("Config file not found: {}", path.display()),
                    "config"
                ));
            }
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("__")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| config_source_error(e, "build"))?
            .try_deserialize::<Self>()
            .map_err(|e| config_source_error(e, "deserialize"))?;

        config.validate()?;
        Ok(config)
    }

    /// Reject settings the server cannot run with
    pub fn validate(&self) -> KeywardResult<()> {
        if self.server.port == 0 {
            return Err(validation_error!(
                "Port must be greater than 0",
                "server.port",
                "config"
            ));
        }

        if self.storage.max_connections == 0 {
            return Err(validation_error!(
                "max_connections must be greater than 0",
                "storage.max_connections",
                "config"
            ));
        }

        if self.storage.min_connections > self.storage.max_connections {
            return Err(validation_error!(
                format!(
                    "min_connections ({}) exceeds max_connections ({})",
                    self.storage.min_connections, self.storage.max_connections
                ),
                "storage.min_connections",
                "config"
            ));
        }

        if self.storage.seed_admin
            && (self.storage.admin_username.trim().is_empty()
                || self.storage.admin_password.is_empty())
        {
            return Err(validation_error!(
                "Seeded admin credential needs a username and a password",
                "storage.admin_username",
                "config"
            ));
        }

        if self.session.cookie_name.is_empty()
            || !self
                .session
                .cookie_name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
        {
            return Err(validation_error!(
                "Cookie name must be non-empty and use only [A-Za-z0-9_-]",
                "session.cookie_name",
                "config"
            ));
        }

        for (field, secs) in [
            ("session.idle_timeout_secs", self.session.idle_timeout_secs),
            ("session.cleanup_interval_secs", self.session.cleanup_interval_secs),
        ] {
            if secs == 0 || secs > MAX_SESSION_SECS {
                return Err(validation_error!(
                    format!("{} must be between 1 and {} seconds", field, MAX_SESSION_SECS),
                    field,
                    "config"
                ));
            }
        }

        let password = &self.password;
        if password.iterations == 0
            || password.parallelism == 0
            || password.memory_kib < 8 * password.parallelism
        {
            return Err(validation_error!(
                "Argon2 needs iterations >= 1, parallelism >= 1 and memory_kib >= 8 * parallelism",
                "password",
                "config"
            ));
        }

        Ok(())
    }
}

fn config_source_error(error: config::ConfigError, operation: &str) -> KeywardError {
    KeywardError::Config {
        message: format!("Failed to load configuration: {}", error),
        source: Some(Box::new(error)),
        context: ErrorContext::new("config")
            .with_operation(operation)
            .with_suggestion("Check TOML syntax in config file")
            .with_suggestion("Environment overrides use the KEYWARD__SECTION__KEY form"),
    }
}
