//! Integration tests for keyward-core infrastructure

use keyward_core::{
    config_error, init_logging, storage_error, ErrorContext, KeywardConfig, KeywardError,
    LogFormat, LoggingConfig,
};

#[test]
fn test_error_handling() {
    let error = config_error!("Invalid config", "test_component");

    match &error {
        KeywardError::Config {
            message, context, ..
        } => {
            assert_eq!(message, "Invalid config");
            assert_eq!(context.component, "test_component");
            assert!(!context.error_id.is_empty());
            assert_eq!(context.recovery_suggestions.len(), 2);
        }
        _ => panic!("Expected Config error"),
    }

    // Should not panic without a subscriber installed
    error.log();

    let storage = storage_error!("Pool exhausted", "sqlite");
    storage.log();
    assert_eq!(storage.context().component, "sqlite");

    let context = ErrorContext::new("sessions").with_operation("cleanup");
    assert_eq!(context.operation.as_deref(), Some("cleanup"));
}

#[test]
fn test_environment_overrides_defaults() {
    std::env::set_var("KEYWARD__SERVER__PORT", "7001");
    std::env::set_var("KEYWARD__SESSION__SECURE_COOKIE", "true");

    let config = KeywardConfig::load(None).unwrap();

    std::env::remove_var("KEYWARD__SERVER__PORT");
    std::env::remove_var("KEYWARD__SESSION__SECURE_COOKIE");

    assert_eq!(config.server.port, 7001);
    assert!(config.session.secure_cookie);
    assert_eq!(config.storage.admin_username, "admin");
}

#[test]
fn test_logging_initialization() {
    let config = LoggingConfig {
        level: "debug".to_string(),
        format: LogFormat::Compact,
        filter_directives: vec!["keyward_core=debug".to_string()],
        ..LoggingConfig::default()
    };

    // A global subscriber can only be installed once per process
    assert!(init_logging(&config).is_ok());
    assert!(init_logging(&config).is_err());
}
