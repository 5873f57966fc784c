//! Keyward Web Server
//!
//! Main web server implementation using Axum.

use crate::{create_app, AppState, WebError, WebResult};
use axum::serve;
use keyward_core::KeywardConfig;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing::{debug, error, info, warn};

/// Main Keyward web server
pub struct KeywardServer {
    config: KeywardConfig,
    state: AppState,
}

impl KeywardServer {
    /// Create a new server, connecting the configured credential store
    pub async fn new(config: KeywardConfig) -> WebResult<Self> {
        config.validate()?;
        let state = AppState::new(config.clone()).await?;

        Ok(Self { config, state })
    }

    /// Start the web server and run until Ctrl-C
    pub async fn start(self) -> WebResult<()> {
        let address = self.config.server.address();

        info!("🚀 Starting Keyward Web Server");
        info!("📍 Server address: http://{}", address);
        info!("🔧 Development mode: {}", self.config.server.dev_mode);
        info!("🗄️  Credential storage: {}", self.state.auth.store().backend());

        let app = create_app(self.state.clone());

        let listener = TcpListener::bind(&address)
            .await
            .map_err(WebError::Server)?;

        info!("✅ Server listening on http://{}", address);

        let cleanup = spawn_session_cleanup(
            self.state.clone(),
            Duration::from_secs(self.config.session.cleanup_interval_secs),
        );

        let result = serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await;

        cleanup.abort();

        if let Err(e) = result {
            error!("❌ Server error: {}", e);
            return Err(WebError::Server(e));
        }

        info!("👋 Server shut down gracefully");
        Ok(())
    }
}

/// Periodically drop sessions idle past their timeout
fn spawn_session_cleanup(state: AppState, every: Duration) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(every);
        // First tick completes immediately
        interval.tick().await;
        loop {
            interval.tick().await;
            let removed = state.cleanup_expired_sessions().await;
            debug!("Session cleanup pass removed {} sessions", removed);
        }
    })
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Builder for KeywardServer
pub struct KeywardServerBuilder {
    config: KeywardConfig,
}

impl KeywardServerBuilder {
    /// Create a new server builder
    pub fn new() -> Self {
        Self {
            config: KeywardConfig::default(),
        }
    }

    /// Start from an already loaded configuration
    pub fn with_config(config: KeywardConfig) -> Self {
        Self { config }
    }

    /// Set the server host
    pub fn host<S: Into<String>>(mut self, host: S) -> Self {
        self.config.server.host = host.into();
        self
    }

    /// Set the server port
    pub fn port(mut self, port: u16) -> Self {
        self.config.server.port = port;
        self
    }

    /// Enable development mode
    pub fn dev_mode(mut self, dev_mode: bool) -> Self {
        self.config.server.dev_mode = dev_mode;
        self
    }

    /// Set database URL
    pub fn database_url<S: Into<String>>(mut self, database_url: S) -> Self {
        self.config.storage.database_url = Some(database_url.into());
        self
    }

    /// Build the server
    pub async fn build(self) -> WebResult<KeywardServer> {
        KeywardServer::new(self.config).await
    }
}

impl Default for KeywardServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
