//! Configuration module for Sharebox.

use serde::Deserialize;
use std::path::Path;

use crate::share::MAX_TTL_HOURS;
use crate::{Result, ShareboxError};

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Host address to bind.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port number to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// CORS allowed origins.
    #[serde(default)]
    pub cors_origins: Vec<String>,
    /// Whether to serve the static frontend.
    #[serde(default)]
    pub serve_static: bool,
    /// Path to static files directory.
    #[serde(default = "default_static_path")]
    pub static_path: String,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_static_path() -> String {
    "static".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: vec![],
            serve_static: false,
            static_path: default_static_path(),
        }
    }
}

/// Tenant storage configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Directory holding one subdirectory per tenant.
    #[serde(default = "default_root_path")]
    pub root_path: String,
    /// Maximum size of a single uploaded file in megabytes.
    #[serde(default = "default_max_upload_size")]
    pub max_upload_size_mb: u64,
    /// Advisory per-tenant space ceiling in bytes.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,
}

fn default_root_path() -> String {
    "uploads".to_string()
}

fn default_max_upload_size() -> u64 {
    crate::storage::DEFAULT_MAX_UPLOAD_SIZE / (1024 * 1024)
}

fn default_quota_bytes() -> u64 {
    crate::storage::DEFAULT_QUOTA_BYTES
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            root_path: default_root_path(),
            max_upload_size_mb: default_max_upload_size(),
            quota_bytes: default_quota_bytes(),
        }
    }
}

/// Authentication configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// JWT secret key (must be set).
    #[serde(default)]
    pub jwt_secret: String,
    /// Access token expiry in seconds.
    #[serde(default = "default_jwt_expiry")]
    pub jwt_expiry_secs: u64,
}

fn default_jwt_expiry() -> u64 {
    24 * 60 * 60 // 24 hours
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            jwt_expiry_secs: default_jwt_expiry(),
        }
    }
}

/// Share link configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct SharesConfig {
    /// Lifetime applied when a share is created without a positive TTL.
    #[serde(default = "default_share_ttl")]
    pub default_ttl_hours: i64,
    /// Interval of the expired share sweep in seconds.
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

fn default_share_ttl() -> i64 {
    24
}

fn default_cleanup_interval() -> u64 {
    3600 // 1 hour
}

impl Default for SharesConfig {
    fn default() -> Self {
        Self {
            default_ttl_hours: default_share_ttl(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub level: String,
    /// Path to the log file.
    #[serde(default = "default_log_file")]
    pub file: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_file() -> String {
    "logs/sharebox.log".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            file: default_log_file(),
        }
    }
}

/// Main configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct Config {
    /// Server configuration.
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage configuration.
    #[serde(default)]
    pub storage: StorageConfig,
    /// Authentication configuration.
    #[serde(default)]
    pub auth: AuthConfig,
    /// Share link configuration.
    #[serde(default)]
    pub shares: SharesConfig,
    /// Logging configuration.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(ShareboxError::Io)?;
        Self::parse(&content)
    }

    /// Load configuration from a TOML file and apply environment variable overrides.
    pub fn load_with_env<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut config = Self::load(path)?;
        config.apply_env_overrides();
        Ok(config)
    }

    /// Parse configuration from a TOML string.
    pub fn parse(s: &str) -> Result<Self> {
        toml::from_str(s).map_err(|e| ShareboxError::Config(format!("config parse error: {e}")))
    }

    /// Apply environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `SHAREBOX_JWT_SECRET`: Override the JWT secret key
    /// - `SHAREBOX_STORAGE_ROOT`: Override the storage root directory
    pub fn apply_env_overrides(&mut self) {
        if let Ok(jwt_secret) = std::env::var("SHAREBOX_JWT_SECRET") {
            if !jwt_secret.is_empty() {
                self.auth.jwt_secret = jwt_secret;
            }
        }
        if let Ok(root) = std::env::var("SHAREBOX_STORAGE_ROOT") {
            if !root.is_empty() {
                self.storage.root_path = root;
            }
        }
    }

    /// Validate the configuration.
    ///
    /// Returns an error if the JWT secret is not set or the storage root is empty.
    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            return Err(ShareboxError::Config(
                "jwt_secret is not set. \
                 Set it in config.toml or via SHAREBOX_JWT_SECRET environment variable."
                    .to_string(),
            ));
        }
        if self.storage.root_path.trim().is_empty() {
            return Err(ShareboxError::Config(
                "storage.root_path must not be empty".to_string(),
            ));
        }
        if self.shares.default_ttl_hours > MAX_TTL_HOURS {
            return Err(ShareboxError::Config(format!(
                "shares.default_ttl_hours must be at most {MAX_TTL_HOURS}"
            )));
        }
        Ok(())
    }

    /// Maximum size of a single upload in bytes.
    pub fn max_upload_bytes(&self) -> u64 {
        self.storage.max_upload_size_mb * 1024 * 1024
    }
}
