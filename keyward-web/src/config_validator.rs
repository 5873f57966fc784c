//! Startup checks on the server configuration
//!
//! Errors stop the server from starting. Warnings flag settings that work but
//! are unsafe outside development.

use crate::{WebError, WebResult};
use keyward_core::KeywardConfig;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use tracing::{error, info, warn};

/// Configuration validation result. Any error makes it invalid.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    pub is_valid: bool,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
}

/// Configuration validation error
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

/// Configuration validation warning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub field: String,
    pub message: String,
    pub recommendation: String,
}

/// Configuration validator
pub struct ConfigValidator;

impl ConfigValidator {
    /// Validate complete configuration
    pub fn validate_config(config: &KeywardConfig) -> ValidationResult {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if let Err(e) = config.validate() {
            errors.push(ValidationError {
                field: match &e {
                    keyward_core::KeywardError::Validation {
                        field: Some(field), ..
                    } => field.clone(),
                    _ => "config".to_string(),
                },
                message: e.to_string(),
            });
        }

        Self::validate_network_config(config, &mut errors);
        Self::validate_security_config(config, &mut warnings);

        ValidationResult {
            is_valid: errors.is_empty(),
            errors,
            warnings,
        }
    }

    fn validate_network_config(config: &KeywardConfig, errors: &mut Vec<ValidationError>) {
        let host = &config.server.host;
        if host.is_empty() {
            errors.push(ValidationError {
                field: "server.host".to_string(),
                message: "Host cannot be empty".to_string(),
            });
        } else if host.parse::<IpAddr>().is_err() && host != "localhost" {
            errors.push(ValidationError {
                field: "server.host".to_string(),
                message: format!("Invalid host format: {}", host),
            });
        }
    }

    fn validate_security_config(config: &KeywardConfig, warnings: &mut Vec<ValidationWarning>) {
        if config.server.dev_mode {
            return;
        }

        let loopback = config.server.host == "localhost"
            || config
                .server
                .host
                .parse::<IpAddr>()
                .map(|ip| ip.is_loopback())
                .unwrap_or(false);

        if !loopback && !config.session.secure_cookie {
            warnings.push(ValidationWarning {
                field: "session.secure_cookie".to_string(),
                message: "Session cookie is sent over plain HTTP on a public interface"
                    .to_string(),
                recommendation: "Serve over HTTPS and set session.secure_cookie = true"
                    .to_string(),
            });
        }

        if config.storage.seed_admin && config.storage.admin_password == "admin" {
            warnings.push(ValidationWarning {
                field: "storage.admin_password".to_string(),
                message: "Administrative account uses the default password".to_string(),
                recommendation: "Set storage.admin_password or disable storage.seed_admin"
                    .to_string(),
            });
        }

        if config.storage.database_url.is_none() {
            warnings.push(ValidationWarning {
                field: "storage.database_url".to_string(),
                message: "Registered users are kept in memory and lost on restart".to_string(),
                recommendation: "Configure a SQLite database file".to_string(),
            });
        }
    }

    /// Log validation results
    pub fn log_validation_results(result: &ValidationResult) {
        if result.is_valid {
            info!("✅ Configuration validation passed");
        } else {
            error!("❌ Configuration validation failed");
        }

        for error in &result.errors {
            error!("{}: {}", error.field, error.message);
        }

        for warning in &result.warnings {
            warn!(
                "{}: {} (Recommendation: {})",
                warning.field, warning.message, warning.recommendation
            );
        }
    }
}

/// Validate configuration and return result
pub fn validate_config(config: &KeywardConfig) -> WebResult<ValidationResult> {
    let result = ConfigValidator::validate_config(config);
    ConfigValidator::log_validation_results(&result);

    if !result.is_valid {
        return Err(WebError::Config(
            "Configuration validation failed".to_string(),
        ));
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_pass_with_warnings() {
        let result = ConfigValidator::validate_config(&KeywardConfig::default());

        assert!(result.is_valid);
        assert!(result.errors.is_empty());
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "storage.admin_password"));
    }

    #[test]
    fn test_dev_mode_silences_warnings() {
        let mut config = KeywardConfig::default();
        config.server.dev_mode = true;

        let result = ConfigValidator::validate_config(&config);
        assert!(result.warnings.is_empty());
    }

    #[test]
    fn test_public_host_without_secure_cookie_warns() {
        let mut config = KeywardConfig::default();
        config.server.host = "0.0.0.0".to_string();

        let result = ConfigValidator::validate_config(&config);
        assert!(result
            .warnings
            .iter()
            .any(|w| w.field == "session.secure_cookie"));
    }

    #[test]
    fn test_unparseable_host_alone_fails_validation() {
        let mut config = KeywardConfig::default();
        config.server.host = "not a host".to_string();

        let result = ConfigValidator::validate_config(&config);
        assert!(!result.is_valid);
        assert_eq!(result.errors.len(), 1);
        assert!(matches!(validate_config(&config), Err(WebError::Config(_))));
    }

    #[test]
    fn test_invalid_settings_are_errors() {
        let mut config = KeywardConfig::default();
        config.server.host = "not a host".to_string();
        config.session.cookie_name = "bad name;".to_string();

        let result = ConfigValidator::validate_config(&config);
        assert!(!result.is_valid);
        assert!(result
            .errors
            .iter()
            .any(|e| e.field == "session.cookie_name"));
        assert!(result.errors.iter().any(|e| e.field == "server.host"));
        assert!(validate_config(&config).is_err());
    }
}
