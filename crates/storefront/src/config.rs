//! Storefront configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! ## Required
//! - `AUTOPARTS_CATALOG_URL` - Product catalog API endpoint
//! - `AUTOPARTS_ORDERS_URL` - Order submission API endpoint
//!
//! ## Optional
//! - `AUTOPARTS_HOST` - Bind address (default: 127.0.0.1)
//! - `AUTOPARTS_PORT` - Listen port (default: 3000)
//! - `SENTRY_DSN` - Sentry error tracking DSN

use std::net::{IpAddr, SocketAddr};

use thiserror::Error;
use url::Url;

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Storefront application configuration.
#[derive(Debug, Clone)]
pub struct StorefrontConfig {
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Product catalog API configuration
    pub catalog: CatalogConfig,
    /// Order submission API configuration
    pub orders: OrdersConfig,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
}

/// Product catalog API configuration.
#[derive(Debug, Clone)]
pub struct CatalogConfig {
    /// Base URL of the product listing endpoint (no trailing slash)
    pub base_url: String,
}

/// Order submission API configuration.
#[derive(Debug, Clone)]
pub struct OrdersConfig {
    /// URL of the order submission endpoint
    pub endpoint: String,
}

impl StorefrontConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if required variables are missing or invalid.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let host = get_env_or_default("AUTOPARTS_HOST", "127.0.0.1")
            .parse::<IpAddr>()
            .map_err(|e| ConfigError::InvalidEnvVar("AUTOPARTS_HOST".to_string(), e.to_string()))?;
        let port = get_env_or_default("AUTOPARTS_PORT", "3000")
            .parse::<u16>()
            .map_err(|e| ConfigError::InvalidEnvVar("AUTOPARTS_PORT".to_string(), e.to_string()))?;

        let catalog = CatalogConfig {
            base_url: get_endpoint_url("AUTOPARTS_CATALOG_URL")?,
        };
        let orders = OrdersConfig {
            endpoint: get_endpoint_url("AUTOPARTS_ORDERS_URL")?,
        };
        let sentry_dsn = get_optional_env("SENTRY_DSN");

        Ok(Self {
            host,
            port,
            catalog,
            orders,
            sentry_dsn,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

/// Get a required environment variable.
fn get_required_env(key: &str) -> Result<String, ConfigError> {
    std::env::var(key).map_err(|_| ConfigError::MissingEnvVar(key.to_string()))
}

/// Get an optional environment variable.
fn get_optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

/// Get an environment variable with a default value.
fn get_env_or_default(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Load a required endpoint URL and validate it.
fn get_endpoint_url(key: &str) -> Result<String, ConfigError> {
    let value = get_required_env(key)?;
    validate_endpoint_url(key, &value)
}

/// Validate that an endpoint value parses as an http(s) URL.
///
/// Returns the URL with any trailing slash removed so paths can be appended
/// uniformly.
fn validate_endpoint_url(key: &str, value: &str) -> Result<String, ConfigError> {
    let url = Url::parse(value)
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::InvalidEnvVar(
            key.to_string(),
            format!("unsupported scheme '{}'", url.scheme()),
        ));
    }

    Ok(value.trim_end_matches('/').to_string())
}
