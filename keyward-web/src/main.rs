//! Keyward Web Server
//!
//! Register, log in and log out against a memory or SQLite credential store.

use clap::Parser;
use keyward_core::{init_logging, KeywardConfig};
use keyward_web::config_validator::validate_config;
use keyward_web::KeywardServerBuilder;
use std::path::PathBuf;
use tracing::{error, info};

/// Keyward Web Server - form-based authentication with server-side sessions
#[derive(Parser)]
#[command(name = "keyward-web")]
#[command(about = "Form-based authentication with server-side sessions")]
#[command(version)]
struct Args {
    /// Path to a TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Server host to bind to
    #[arg(long)]
    host: Option<String>,

    /// Server port to listen on
    #[arg(short, long)]
    port: Option<u16>,

    /// Enable development mode
    #[arg(long)]
    dev: bool,

    /// SQLite database URL for credential storage; memory storage when unset
    #[arg(long)]
    database_url: Option<String>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long)]
    log_level: Option<String>,
}

impl Args {
    /// Command line flags win over file and environment settings
    fn apply(self, config: &mut KeywardConfig) {
        if let Some(host) = self.host {
            config.server.host = host;
        }
        if let Some(port) = self.port {
            config.server.port = port;
        }
        if self.dev {
            config.server.dev_mode = true;
        }
        if let Some(database_url) = self.database_url {
            config.storage.database_url = Some(database_url);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
    }
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    // Load environment variables
    dotenvy::dotenv().ok();

    let mut config = match KeywardConfig::load(args.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("❌ Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };
    args.apply(&mut config);

    if let Err(e) = init_logging(&config.logging) {
        eprintln!("❌ Failed to initialize logging: {}", e);
        std::process::exit(1);
    }

    if let Err(e) = validate_config(&config) {
        e.log();
        std::process::exit(1);
    }

    info!("🏗️  Building server...");
    let server = match KeywardServerBuilder::with_config(config).build().await {
        Ok(server) => server,
        Err(e) => {
            error!("❌ Failed to build server");
            e.log();
            std::process::exit(1);
        }
    };

    if let Err(e) = server.start().await {
        error!("❌ Server failed");
        e.log();
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_args_parsing() {
        let args = Args::parse_from(["keyward-web"]);
        assert!(args.host.is_none());
        assert!(args.port.is_none());
        assert!(!args.dev);

        let args = Args::parse_from([
            "keyward-web",
            "--host",
            "0.0.0.0",
            "--port",
            "3000",
            "--dev",
            "--database-url",
            "sqlite://users.db",
        ]);
        let mut config = KeywardConfig::default();
        args.apply(&mut config);

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 3000);
        assert!(config.server.dev_mode);
        assert_eq!(
            config.storage.database_url.as_deref(),
            Some("sqlite://users.db")
        );
    }

    #[test]
    fn test_unset_flags_keep_loaded_values() {
        let mut config = KeywardConfig::default();
        config.server.port = 9090;

        Args::parse_from(["keyward-web"]).apply(&mut config);
        assert_eq!(config.server.port, 9090);
    }
}
