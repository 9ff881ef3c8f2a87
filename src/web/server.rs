//! Web server for Sharebox.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::compression::CompressionLayer;

use crate::config::Config;
use crate::share::CapabilityRegistry;
use crate::{Result, ShareboxError};

use super::handlers::AppState;
use super::router::{create_health_router, create_router, create_static_router};

/// Web server for the API.
pub struct WebServer {
    /// Server address.
    addr: SocketAddr,
    /// Application state.
    app_state: Arc<AppState>,
    /// Full configuration.
    config: Config,
}

impl WebServer {
    /// Create a new web server.
    pub fn new(config: &Config) -> Result<Self> {
        Self::with_state(config, AppState::new(config)?)
    }

    /// Create a web server around prepared state.
    pub fn with_state(config: &Config, app_state: AppState) -> Result<Self> {
        let addr = format!("{}:{}", config.server.host, config.server.port)
            .parse()
            .map_err(|e| ShareboxError::Config(format!("invalid server address: {e}")))?;

        Ok(Self {
            addr,
            app_state: Arc::new(app_state),
            config: config.clone(),
        })
    }

    /// Get the server address.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Shared application state.
    pub fn state(&self) -> Arc<AppState> {
        self.app_state.clone()
    }

    /// Assemble the full application router.
    pub fn router(&self) -> Router {
        let mut router = create_router(self.app_state.clone(), &self.config.server.cors_origins)
            .merge(create_health_router());

        if self.config.server.serve_static {
            if let Some(static_router) = create_static_router(&self.config.server.static_path) {
                router = router.merge(static_router);
            }
        }

        router.layer(CompressionLayer::new())
    }

    /// Start the share link cleanup background task.
    ///
    /// Expired links are already rejected on validation; the sweep only
    /// bounds memory.
    fn start_share_cleanup_task(shares: Arc<CapabilityRegistry>, interval_secs: u64) {
        tokio::spawn(async move {
            let mut interval = tokio::time::interval(Duration::from_secs(interval_secs.max(1)));

            // Skip the first immediate tick
            interval.tick().await;

            loop {
                interval.tick().await;

                let count = shares.cleanup_expired();
                if count > 0 {
                    tracing::info!(deleted_count = count, "Cleaned up expired share links");
                } else {
                    tracing::debug!("No expired share links to clean up");
                }
            }
        });
    }

    async fn bind(&self) -> std::io::Result<(TcpListener, Router)> {
        let router = self.router();
        let listener = TcpListener::bind(self.addr).await?;

        Self::start_share_cleanup_task(
            self.app_state.shares.clone(),
            self.config.shares.cleanup_interval_secs,
        );
        tracing::info!(
            interval_secs = self.config.shares.cleanup_interval_secs,
            "Share cleanup task started"
        );

        Ok((listener, router))
    }

    /// Run the web server.
    pub async fn run(self) -> std::io::Result<()> {
        let (listener, router) = self.bind().await?;
        tracing::info!("Web server listening on http://{}", listener.local_addr()?);

        axum::serve(listener, router).await
    }

    /// Run the server and return the actual bound address.
    ///
    /// This is useful for testing when binding to port 0.
    pub async fn run_with_addr(self) -> std::io::Result<SocketAddr> {
        let (listener, router) = self.bind().await?;
        let local_addr = listener.local_addr()?;
        tracing::info!("Web server listening on http://{}", local_addr);

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, router).await {
                tracing::error!("Web server error: {}", e);
            }
        });

        Ok(local_addr)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};

    fn create_test_config(temp_dir: &TempDir) -> Config {
        let mut config = Config::default();
        config.server.host = "127.0.0.1".to_string();
        config.server.port = 0;
        config.auth.jwt_secret = "test-secret-key".to_string();
        config.storage.root_path = temp_dir.path().join("uploads").display().to_string();
        config
    }

    #[tokio::test]
    async fn test_web_server_new() {
        let temp_dir = TempDir::new().unwrap();
        let server = WebServer::new(&create_test_config(&temp_dir)).unwrap();

        assert_eq!(server.addr().ip().to_string(), "127.0.0.1");
        assert!(temp_dir.path().join("uploads").is_dir());
    }

    #[tokio::test]
    async fn test_web_server_invalid_addr() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = create_test_config(&temp_dir);
        config.server.host = "not an address".to_string();

        assert!(matches!(
            WebServer::new(&config),
            Err(ShareboxError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_web_server_run() {
        let temp_dir = TempDir::new().unwrap();
        let server = WebServer::new(&create_test_config(&temp_dir)).unwrap();
        let addr = server.run_with_addr().await.unwrap();

        let mut stream = tokio::net::TcpStream::connect(addr).await.unwrap();
        stream
            .write_all(b"GET /health HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();
        let mut response = String::new();
        stream.read_to_string(&mut response).await.unwrap();

        assert!(response.starts_with("HTTP/1.1 200"));
        assert!(response.ends_with("OK"));
    }
}
