//! Unified error handling system
//!
//! Provides structured error types with context, recovery suggestions, and proper error chaining

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{error, warn};

pub type KeywardResult<T> = Result<T, KeywardError>;

/// Error context providing additional information for debugging and recovery
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorContext {
    /// Unique error ID for tracking
    pub error_id: String,
    /// Timestamp when error occurred
    pub timestamp: DateTime<Utc>,
    /// Component where error originated
    pub component: String,
    /// Operation being performed when error occurred
    pub operation: Option<String>,
    /// Recovery suggestions
    pub recovery_suggestions: Vec<String>,
}

impl ErrorContext {
    pub fn new(component: &str) -> Self {
        Self {
            error_id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            component: component.to_string(),
            operation: None,
            recovery_suggestions: Vec::new(),
        }
    }

    pub fn with_operation(mut self, operation: &str) -> Self {
        self.operation = Some(operation.to_string());
        self
    }

    pub fn with_suggestion(mut self, suggestion: &str) -> Self {
        self.recovery_suggestions.push(suggestion.to_string());
        self
    }
}

/// Main error type for the infrastructure shared by Keyward crates
#[derive(Error, Debug)]
pub enum KeywardError {
    #[error("Storage error: {message}")]
    Storage {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Configuration error: {message}")]
    Config {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
        context: ErrorContext,
    },

    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
        context: ErrorContext,
    },
}

impl KeywardError {
    /// Get the error context
    pub fn context(&self) -> &ErrorContext {
        match self {
            KeywardError::Storage { context, .. }
            | KeywardError::Config { context, .. }
            | KeywardError::Validation { context, .. } => context,
        }
    }

    /// Log the error with appropriate level
    pub fn log(&self) {
        let context = self.context();
        match self {
            KeywardError::Storage { .. } => {
                warn!(
                    error_id = %context.error_id,
                    component = %context.component,
                    suggestions = ?context.recovery_suggestions,
                    error = %self,
                    "Storage error"
                );
            }
            KeywardError::Config { .. } | KeywardError::Validation { .. } => {
                error!(
                    error_id = %context.error_id,
                    component = %context.component,
                    suggestions = ?context.recovery_suggestions,
                    error = %self,
                    "Configuration or validation error"
                );
            }
        }
    }
}

/// Convenience macros for creating errors with context
#[macro_export]
macro_rules! storage_error {
    ($msg:expr, $component:expr) => {
        $crate::KeywardError::Storage {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component),
        }
    };
    ($msg:expr, $component:expr, $source:expr) => {
        $crate::KeywardError::Storage {
            message: $msg.to_string(),
            source: Some(Box::new($source)),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check that the database URL points at a reachable database"),
        }
    };
}

#[macro_export]
macro_rules! config_error {
    ($msg:expr, $component:expr) => {
        $crate::KeywardError::Config {
            message: $msg.to_string(),
            source: None,
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check your configuration file")
                .with_suggestion("Environment overrides use the KEYWARD__SECTION__KEY form"),
        }
    };
}

#[macro_export]
macro_rules! validation_error {
    ($msg:expr, $field:expr, $component:expr) => {
        $crate::KeywardError::Validation {
            message: $msg.to_string(),
            field: Some($field.to_string()),
            context: $crate::ErrorContext::new($component)
                .with_suggestion("Check the field value and format"),
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_macro_carries_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk gone");
        let error = storage_error!("Failed to open database", "sqlite", io);

        match &error {
            KeywardError::Storage {
                message,
                source,
                context,
            } => {
                assert_eq!(message, "Failed to open database");
                assert!(source.is_some());
                assert_eq!(context.component, "sqlite");
                assert_eq!(context.recovery_suggestions.len(), 1);
            }
            other => panic!("Expected Storage error, got {:?}", other),
        }
    }

    #[test]
    fn test_validation_error_display() {
        let error = validation_error!("Port must be non-zero", "server.port", "config");
        assert_eq!(error.context().component, "config");
        assert_eq!(error.to_string(), "Validation error: Port must be non-zero");
    }
}
