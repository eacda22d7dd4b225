//! Redis key-value store.
//!
//! This module provides the Redis-backed implementation of `KeyValueStore`
//! using `deadpool-redis` for connection pooling.
//!
//! # Key Design
//!
//! - Todo: `todos:{title}{n}` -> JSON string
//! - Other keys in the same database are left alone and reported by
//!   `get_all_data` with their Redis type

use deadpool_redis::{Config, Connection, Pool, Runtime};
use redis::AsyncCommands;
use serde_json::Value;

use super::store::{
    KeyValueStore, StoreEntry, StoreError, StoreFuture, ValueFormat, decode_lenient,
};

/// Number of keys requested per `SCAN` round trip.
const SCAN_BATCH_SIZE: usize = 500;

/// Redis type name for plain string values.
const STRING_KIND: &str = "string";

// =============================================================================
// Helper Functions
// =============================================================================

async fn checkout(pool: &Pool) -> Result<Connection, StoreError> {
    pool.get()
        .await
        .map_err(|error| StoreError::Connection(error.to_string()))
}

#[allow(clippy::needless_pass_by_value)]
fn command_error(error: redis::RedisError) -> StoreError {
    StoreError::Command(error.to_string())
}

/// Collects every key in the database with cursor-based `SCAN`.
async fn scan_keys(connection: &mut Connection) -> Result<Vec<String>, StoreError> {
    let mut cursor: u64 = 0;
    let mut keys = Vec::new();
    loop {
        let (next_cursor, batch): (u64, Vec<String>) = redis::cmd("SCAN")
            .arg(cursor)
            .arg("COUNT")
            .arg(SCAN_BATCH_SIZE)
            .query_async(&mut **connection)
            .await
            .map_err(command_error)?;
        keys.extend(batch);
        if next_cursor == 0 {
            return Ok(keys);
        }
        cursor = next_cursor;
    }
}

// =============================================================================
// Redis Store
// =============================================================================

/// Redis implementation of `KeyValueStore`.
///
/// # Example
///
/// ```ignore
/// let store = RedisStore::from_url("redis://localhost:6379")?;
/// store.connect().await?;
/// store.set("todos:Buy milk42", &json!({"title": "Buy milk"}), ValueFormat::Json).await?;
/// ```
#[derive(Clone)]
pub struct RedisStore {
    /// Connection pool for Redis.
    pool: Pool,
}

impl std::fmt::Debug for RedisStore {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("RedisStore")
            .field("pool_status", &self.pool.status())
            .finish()
    }
}

impl RedisStore {
    /// Creates a new Redis store with the given connection pool.
    #[must_use]
    pub const fn new(pool: Pool) -> Self {
        Self { pool }
    }

    /// Creates a new Redis store from a Redis URL.
    ///
    /// No connection is opened until `connect` is called.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Connection` if the pool cannot be created.
    pub fn from_url(redis_url: &str) -> Result<Self, StoreError> {
        let config = Config::from_url(redis_url);
        let pool = config
            .create_pool(Some(Runtime::Tokio1))
            .map_err(|error| StoreError::Connection(error.to_string()))?;
        Ok(Self { pool })
    }
}

#[allow(clippy::significant_drop_tightening)]
impl KeyValueStore for RedisStore {
    fn connect(&self) -> StoreFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut connection = checkout(&pool).await?;
            let _: String = redis::cmd("PING")
                .query_async(&mut *connection)
                .await
                .map_err(|error| StoreError::Connection(error.to_string()))?;
            Ok(())
        })
    }

    fn get(&self, key: &str, format: ValueFormat) -> StoreFuture<Option<Value>> {
        let pool = self.pool.clone();
        let key = key.to_string();
        Box::pin(async move {
            let mut connection = checkout(&pool).await?;
            let data: Option<String> = connection.get(&key).await.map_err(command_error)?;
            data.map(|raw| format.decode(raw)).transpose()
        })
    }

    fn set(&self, key: &str, value: &Value, format: ValueFormat) -> StoreFuture<()> {
        let pool = self.pool.clone();
        let key = key.to_string();
        let encoded = format.encode(value);
        Box::pin(async move {
            let raw = encoded?;
            let mut connection = checkout(&pool).await?;
            let (): () = connection.set(&key, raw).await.map_err(command_error)?;
            Ok(())
        })
    }

    fn del(&self, key: &str) -> StoreFuture<u64> {
        let pool = self.pool.clone();
        let key = key.to_string();
        Box::pin(async move {
            let mut connection = checkout(&pool).await?;
            let deleted: u64 = connection.del(&key).await.map_err(command_error)?;
            Ok(deleted)
        })
    }

    fn get_all_data(&self) -> StoreFuture<Vec<StoreEntry>> {
        let pool = self.pool.clone();
        Box::pin(async move {
            let mut connection = checkout(&pool).await?;
            let keys = scan_keys(&mut connection).await?;
            if keys.is_empty() {
                return Ok(Vec::new());
            }

            // GET on a non-string key fails the whole pipeline, so types
            // are resolved first and only string keys are read.
            let mut type_pipeline = redis::pipe();
            for key in &keys {
                type_pipeline.cmd("TYPE").arg(key);
            }
            let kinds: Vec<String> = type_pipeline
                .query_async(&mut *connection)
                .await
                .map_err(command_error)?;

            let string_keys: Vec<&String> = keys
                .iter()
                .zip(&kinds)
                .filter(|(_, kind)| kind.as_str() == STRING_KIND)
                .map(|(key, _)| key)
                .collect();

            let mut values: Vec<Option<String>> = Vec::with_capacity(string_keys.len());
            if !string_keys.is_empty() {
                let mut get_pipeline = redis::pipe();
                for key in &string_keys {
                    get_pipeline.cmd("GET").arg(key.as_str());
                }
                values = get_pipeline
                    .query_async(&mut *connection)
                    .await
                    .map_err(command_error)?;
            }

            let mut values = values.into_iter();
            let entries = keys
                .into_iter()
                .zip(kinds)
                .map(|(key, kind)| {
                    let value = if kind == STRING_KIND {
                        values
                            .next()
                            .flatten()
                            .map_or(Value::Null, decode_lenient)
                    } else {
                        Value::Null
                    };
                    StoreEntry::new(key, value, kind)
                })
                .collect();

            Ok(entries)
        })
    }

    fn close(&self) -> StoreFuture<()> {
        let pool = self.pool.clone();
        Box::pin(async move {
            pool.close();
            Ok(())
        })
    }
}

// =============================================================================
// Tests
// =============================================================================
