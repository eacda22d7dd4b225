//! Infrastructure layer: key-value stores and service configuration.

pub mod config;
pub mod factory;
mod in_memory;
mod redis;
mod store;

pub use config::{ConfigurationError, ServiceConfig, ServiceConfigBuilder, StoreMode};
pub use factory::{StartupError, StoreFactory};
pub use in_memory::InMemoryStore;
pub use self::redis::RedisStore;
pub use store::{KeyValueStore, StoreEntry, StoreError, StoreFuture, ValueFormat, decode_lenient};
