//! Store factory for runtime backend selection.
//!
//! Builds the configured `KeyValueStore` and connects it before the server
//! starts accepting requests.

use std::sync::Arc;

use thiserror::Error;

use super::config::{ConfigurationError, ServiceConfig, StoreMode};
use super::{InMemoryStore, KeyValueStore, RedisStore, StoreError};

/// Errors that can occur while starting or running the service.
#[derive(Debug, Error)]
pub enum StartupError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigurationError),

    /// The store could not be created or connected.
    #[error("Store connection error: {0}")]
    StoreConnection(#[from] StoreError),

    /// The listener could not be bound.
    #[error("Failed to bind {address}: {reason}")]
    Bind {
        /// Address that was requested.
        address: String,
        /// Underlying I/O error message.
        reason: String,
    },

    /// The server stopped with an I/O error.
    #[error("Server error: {0}")]
    Serve(String),
}

/// Factory for creating the store selected by configuration.
///
/// # Example
///
/// ```ignore
/// let factory = StoreFactory::new(ServiceConfig::from_env()?);
/// let store = factory.create().await?;
/// ```
#[derive(Debug, Clone)]
pub struct StoreFactory {
    config: ServiceConfig,
}

impl StoreFactory {
    /// Creates a new store factory with the given configuration.
    #[must_use]
    pub const fn new(config: ServiceConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration used by this factory.
    #[must_use]
    pub const fn config(&self) -> &ServiceConfig {
        &self.config
    }

    /// Creates and connects the configured store.
    ///
    /// # Errors
    ///
    /// Returns `StartupError::StoreConnection` if the store cannot be reached.
    pub async fn create(&self) -> Result<Arc<dyn KeyValueStore>, StartupError> {
        let store: Arc<dyn KeyValueStore> = match self.config.store_mode {
            StoreMode::InMemory => Arc::new(InMemoryStore::new()),
            StoreMode::Redis => Arc::new(RedisStore::from_url(&self.config.redis_url)?),
        };

        store.connect().await?;
        tracing::info!(store_mode = ?self.config.store_mode, "Store connected");
        Ok(store)
    }
}

// =============================================================================
// Tests
// =============================================================================
