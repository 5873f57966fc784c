//! Unified logging system
//!
//! Provides structured logging with configurable output

use serde::{Deserialize, Serialize};
use std::io;
use std::sync::Mutex;
use tracing_subscriber::{
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
};

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Output format (json, pretty, compact)
    pub format: LogFormat,
    /// Whether to include file and line information
    pub include_location: bool,
    /// Whether to include thread information
    pub include_thread: bool,
    /// Whether to log to file
    pub log_to_file: bool,
    /// Log file path (if log_to_file is true)
    pub log_file_path: Option<String>,
    /// Emit a line when each span closes, with its duration
    pub log_span_close: bool,
    /// Extra per-target directives such as `sqlx=warn`, applied on top of `level`
    pub filter_directives: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Json,
    Pretty,
    Compact,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
            include_location: false,
            include_thread: false,
            log_to_file: false,
            log_file_path: None,
            log_span_close: false,
            filter_directives: Vec::new(),
        }
    }
}

impl LoggingConfig {
    fn span_events(&self) -> FmtSpan {
        if self.log_span_close {
            FmtSpan::CLOSE
        } else {
            FmtSpan::NONE
        }
    }

    fn open_log_file(
        &self,
    ) -> Result<Option<Mutex<std::fs::File>>, Box<dyn std::error::Error + Send + Sync>> {
        if !self.log_to_file {
            return Ok(None);
        }
        let log_path = self
            .log_file_path
            .as_deref()
            .ok_or("log_file_path must be specified when log_to_file is true")?;
        let file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(log_path)?;
        Ok(Some(Mutex::new(file)))
    }
}

/// Build the filter from `RUST_LOG` when present, otherwise from the config.
pub fn build_filter(
    config: &LoggingConfig,
) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    match EnvFilter::try_from_default_env() {
        Ok(filter) => add_directives(filter, &config.filter_directives),
        Err(_) => config_filter(config),
    }
}

/// Filter from `level` plus `filter_directives`, ignoring the environment
fn config_filter(
    config: &LoggingConfig,
) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    let filter = EnvFilter::try_new(&config.level)?;
    add_directives(filter, &config.filter_directives)
}

fn add_directives(
    mut filter: EnvFilter,
    directives: &[String],
) -> Result<EnvFilter, Box<dyn std::error::Error + Send + Sync>> {
    for directive in directives {
        filter = filter.add_directive(directive.parse()?);
    }
    Ok(filter)
}

/// Initialize the logging system
pub fn init_logging(
    config: &LoggingConfig,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let filter = build_filter(config)?;
    let registry = tracing_subscriber::registry().with(filter);
    let file = config.open_log_file()?;

    match config.format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_span_events(config.span_events())
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread);

            match file {
                Some(file) => registry.with(fmt_layer.with_writer(file)).try_init()?,
                None => registry.with(fmt_layer.with_writer(io::stdout)).try_init()?,
            }
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer()
                .pretty()
                .with_span_events(config.span_events())
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread);

            match file {
                Some(file) => registry.with(fmt_layer.with_writer(file)).try_init()?,
                None => registry.with(fmt_layer.with_writer(io::stdout)).try_init()?,
            }
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer()
                .compact()
                .with_span_events(config.span_events())
                .with_file(config.include_location)
                .with_line_number(config.include_location)
                .with_thread_ids(config.include_thread)
                .with_thread_names(config.include_thread);

            match file {
                Some(file) => registry.with(fmt_layer.with_writer(file)).try_init()?,
                None => registry.with(fmt_layer.with_writer(io::stdout)).try_init()?,
            }
        }
    }

    Ok(())
}
