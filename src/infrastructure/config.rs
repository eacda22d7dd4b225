//! Service configuration.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address or host name (default `0.0.0.0`)
//! - `PORT`: bind port (default `4000`)
//! - `STORE_MODE`: `in_memory` (default) | `redis`
//! - `REDIS_URL`: Redis connection URL (default `redis://127.0.0.1:6379`)
//! - `KEY_STRATEGY`: `legacy` (default) | `uuid`
//!
//! # Example
//!
//! ```ignore
//! let config = ServiceConfig::from_env()?;
//! let store = StoreFactory::new(config.clone()).create().await?;
//! ```

use std::env;
use std::net::{SocketAddr, ToSocketAddrs};
use std::str::FromStr;

use thiserror::Error;

use crate::domain::{InvalidKeyStrategy, KeyStrategy};

/// Default bind address.
pub const DEFAULT_HOST: &str = "0.0.0.0";

/// Default bind port.
pub const DEFAULT_PORT: u16 = 4000;

/// Default Redis URL used when `REDIS_URL` is not set.
pub const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

// =============================================================================
// Configuration Types
// =============================================================================

/// Backing store for todo records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StoreMode {
    /// Process-local store. Suitable for testing and development.
    #[default]
    InMemory,
    /// Redis store for production use.
    Redis,
}

impl FromStr for StoreMode {
    type Err = ConfigurationError;

    /// Parses a store mode from a string.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidStoreMode` if the string is not recognized.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.to_lowercase().as_str() {
            "in_memory" | "inmemory" | "memory" => Ok(Self::InMemory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigurationError::InvalidStoreMode(value.to_string())),
        }
    }
}

/// Configuration for the todo service.
///
/// Use `ServiceConfigBuilder` for a fluent API to construct this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServiceConfig {
    /// Bind address.
    pub host: String,
    /// Bind port.
    pub port: u16,
    /// Which store backs the API.
    pub store_mode: StoreMode,
    /// Redis connection URL, used when `store_mode` is `Redis`.
    pub redis_url: String,
    /// How keys for new todos are generated.
    pub key_strategy: KeyStrategy,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            store_mode: StoreMode::default(),
            redis_url: DEFAULT_REDIS_URL.to_string(),
            key_strategy: KeyStrategy::default(),
        }
    }
}

/// Reads an environment variable, treating empty/whitespace-only as unset.
fn read_var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

impl ServiceConfig {
    /// Creates a new configuration builder.
    #[must_use]
    pub fn builder() -> ServiceConfigBuilder {
        ServiceConfigBuilder::default()
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if:
    /// - `PORT` is not a valid port number
    /// - `STORE_MODE` or `KEY_STRATEGY` contains an invalid value
    /// - the resulting bind address is invalid
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let defaults = Self::default();

        let host = read_var("HOST").unwrap_or(defaults.host);
        let port = match read_var("PORT") {
            Some(value) => value
                .parse()
                .map_err(|_| ConfigurationError::InvalidPort(value))?,
            None => defaults.port,
        };
        let store_mode = match read_var("STORE_MODE") {
            Some(value) => value.parse()?,
            None => defaults.store_mode,
        };
        let redis_url = read_var("REDIS_URL").unwrap_or(defaults.redis_url);
        let key_strategy = match read_var("KEY_STRATEGY") {
            Some(value) => value.parse()?,
            None => defaults.key_strategy,
        };

        let config = Self {
            host,
            port,
            store_mode,
            redis_url,
            key_strategy,
        };

        config.validate()?;
        Ok(config)
    }

    /// Returns the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidAddress` if `host` is neither an IP
    /// address nor a resolvable host name.
    pub fn bind_address(&self) -> Result<SocketAddr, ConfigurationError> {
        (self.host.as_str(), self.port)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addresses| addresses.next())
            .ok_or_else(|| {
                ConfigurationError::InvalidAddress(format!("{}:{}", self.host, self.port))
            })
    }

    /// Validates the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the bind address is invalid or the
    /// Redis URL is missing for the Redis store.
    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.bind_address()?;

        if self.store_mode == StoreMode::Redis && self.redis_url.trim().is_empty() {
            return Err(ConfigurationError::MissingRedisUrl);
        }

        Ok(())
    }
}

/// Builder for `ServiceConfig`.
///
/// # Example
///
/// ```ignore
/// let config = ServiceConfig::builder()
///     .store_mode(StoreMode::Redis)
///     .redis_url("redis://localhost:6379")
///     .key_strategy(KeyStrategy::Uuid)
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct ServiceConfigBuilder {
    config: ServiceConfig,
}

impl ServiceConfigBuilder {
    /// Sets the bind address.
    #[must_use]
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.config.host = host.into();
        self
    }

    /// Sets the bind port.
    #[must_use]
    pub const fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    /// Sets the store mode.
    #[must_use]
    pub const fn store_mode(mut self, mode: StoreMode) -> Self {
        self.config.store_mode = mode;
        self
    }

    /// Sets the Redis URL.
    #[must_use]
    pub fn redis_url(mut self, url: impl Into<String>) -> Self {
        self.config.redis_url = url.into();
        self
    }

    /// Sets the key strategy.
    #[must_use]
    pub const fn key_strategy(mut self, strategy: KeyStrategy) -> Self {
        self.config.key_strategy = strategy;
        self
    }

    /// Builds the configuration.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError` if the configuration is invalid.
    pub fn build(self) -> Result<ServiceConfig, ConfigurationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

// =============================================================================
// Error Types
// =============================================================================

/// Errors that can occur while loading configuration.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    /// Invalid store mode value.
    #[error("Invalid store mode: '{0}'. Expected 'in_memory' or 'redis'")]
    InvalidStoreMode(String),

    /// Invalid key strategy value.
    #[error(transparent)]
    InvalidKeyStrategy(#[from] InvalidKeyStrategy),

    /// `PORT` is not a number in `0..=65535`.
    #[error("Invalid port: '{0}'")]
    InvalidPort(String),

    /// `HOST` does not resolve to a socket address.
    #[error("Invalid bind address: '{0}'")]
    InvalidAddress(String),

    /// Empty `REDIS_URL` when store mode is Redis.
    #[error("REDIS_URL must not be empty when STORE_MODE=redis")]
    MissingRedisUrl,
}

// =============================================================================
// Tests
// =============================================================================
