//! Key-value store abstraction.
//!
//! The service treats the store as a black box offering per-key
//! `get`/`set`/`del`, a full dump, and an explicit connect/close lifecycle.
//! Implementations are injected behind `Arc<dyn KeyValueStore>`.

use futures::future::BoxFuture;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

// =============================================================================
// Store Error
// =============================================================================

/// Errors that can occur during store operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// The store could not be reached.
    #[error("Connection error: {0}")]
    Connection(String),

    /// An operation was attempted before `connect` or after `close`.
    #[error("Store is not connected")]
    NotConnected,

    /// The store rejected a command.
    #[error("Command error: {0}")]
    Command(String),

    /// A value could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(String),
}

// =============================================================================
// Value Format
// =============================================================================

/// How a value is encoded in the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValueFormat {
    /// Value is stored as a JSON document.
    #[default]
    Json,
    /// Value is stored as plain text; reads return a JSON string.
    Text,
}

impl ValueFormat {
    /// Encodes a value into the raw string kept by the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if the value cannot be encoded.
    pub fn encode(self, value: &Value) -> Result<String, StoreError> {
        match (self, value) {
            (Self::Text, Value::String(text)) => Ok(text.clone()),
            _ => serde_json::to_string(value)
                .map_err(|error| StoreError::Serialization(error.to_string())),
        }
    }

    /// Decodes a raw string read from the store.
    ///
    /// # Errors
    ///
    /// Returns `StoreError::Serialization` if a `Json` value is not valid JSON.
    pub fn decode(self, raw: String) -> Result<Value, StoreError> {
        match self {
            Self::Json => serde_json::from_str(&raw)
                .map_err(|error| StoreError::Serialization(error.to_string())),
            Self::Text => Ok(Value::String(raw)),
        }
    }
}

/// Decodes a raw string without knowing its format.
///
/// JSON documents are parsed; anything else is returned as a string.
#[must_use]
pub fn decode_lenient(raw: String) -> Value {
    serde_json::from_str(&raw).unwrap_or(Value::String(raw))
}

// =============================================================================
// Store Entry
// =============================================================================

/// One entry of a full store dump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoreEntry {
    /// The entry key.
    pub key: String,
    /// The decoded value, `Null` when the entry holds a non-string type.
    pub value: Value,
    /// The store's type name for the entry (e.g. `string`, `hash`).
    #[serde(rename = "type")]
    pub kind: String,
}

impl StoreEntry {
    /// Creates a new store entry.
    #[must_use]
    pub fn new(key: impl Into<String>, value: Value, kind: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value,
            kind: kind.into(),
        }
    }
}

// =============================================================================
// Key-Value Store
// =============================================================================

/// Boxed future returned by store operations.
pub type StoreFuture<T> = BoxFuture<'static, Result<T, StoreError>>;

/// Key-value store used by the API layer.
///
/// All methods return a `'static` future so that implementations clone what
/// they need up front (pool handles, shared maps) and callers can hold the
/// store behind a trait object.
pub trait KeyValueStore: Send + Sync {
    /// Establishes the connection. Called once before serving traffic.
    fn connect(&self) -> StoreFuture<()>;

    /// Reads a value, returning `Ok(None)` if the key is absent.
    fn get(&self, key: &str, format: ValueFormat) -> StoreFuture<Option<Value>>;

    /// Writes a value, replacing any existing one.
    fn set(&self, key: &str, value: &Value, format: ValueFormat) -> StoreFuture<()>;

    /// Deletes a key, returning the number of entries removed (0 or 1).
    fn del(&self, key: &str) -> StoreFuture<u64>;

    /// Returns every entry in the store, in the store's own order.
    fn get_all_data(&self) -> StoreFuture<Vec<StoreEntry>>;

    /// Releases the connection. Called once after the server stops.
    fn close(&self) -> StoreFuture<()>;
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn test_json_format_round_trips_objects() {
        let value = json!({"title": "a", "completed": false});
        let raw = ValueFormat::Json.encode(&value).unwrap();
        assert_eq!(ValueFormat::Json.decode(raw).unwrap(), value);
    }

    #[rstest]
    fn test_text_format_stores_strings_verbatim() {
        let raw = ValueFormat::Text.encode(&json!("hello")).unwrap();
        assert_eq!(raw, "hello");
        assert_eq!(ValueFormat::Text.decode(raw).unwrap(), json!("hello"));
    }

    #[rstest]
    fn test_json_format_rejects_invalid_documents() {
        let result = ValueFormat::Json.decode("not json".to_string());
        assert!(matches!(result, Err(StoreError::Serialization(_))));
    }

    #[rstest]
    #[case("{\"a\":1}", json!({"a": 1}))]
    #[case("42", json!(42))]
    #[case("plain text", json!("plain text"))]
    fn test_decode_lenient(#[case] raw: &str, #[case] expected: Value) {
        assert_eq!(decode_lenient(raw.to_string()), expected);
    }

    #[rstest]
    fn test_store_entry_serializes_kind_as_type() {
        let entry = StoreEntry::new("todos:a1", json!({"title": "a"}), "string");
        let serialized = serde_json::to_value(&entry).unwrap();
        assert_eq!(serialized["type"], "string");
    }

    #[rstest]
    fn test_store_error_display() {
        assert_eq!(
            StoreError::Connection("refused".to_string()).to_string(),
            "Connection error: refused"
        );
        assert_eq!(StoreError::NotConnected.to_string(), "Store is not connected");
    }
}
