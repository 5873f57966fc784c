//! Keyward Core - shared infrastructure
//!
//! Error types with context, logging initialisation and layered configuration
//! used by the Keyward web service.

pub mod config;
pub mod error;
pub mod logging;

pub use self::config::*;
pub use error::*;
pub use logging::*;

// Re-export commonly used external types
pub use tracing;
