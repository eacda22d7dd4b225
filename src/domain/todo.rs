//! Todo domain model.
//!
//! A todo is stored as a loose JSON object so that fields the caller sends
//! are passed through untouched. Only `title`, `description` and `completed`
//! carry meaning for the service; everything else is opaque.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

// =============================================================================
// Constants
// =============================================================================

/// Namespace prefix shared by every todo key.
pub const KEY_PREFIX: &str = "todos:";

/// Field carrying the store key in API responses.
const KEY_FIELD: &str = "key";

// =============================================================================
// TodoKey
// =============================================================================

/// Store key identifying a todo.
///
/// Keys are generated once at creation and never change afterwards.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoKey(String);

impl TodoKey {
    /// Wraps a raw key without checking its namespace.
    ///
    /// Patch and delete accept any key the caller names, so this is the
    /// constructor used at the HTTP boundary.
    #[must_use]
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Returns the key as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the key lives in the todo namespace.
    #[must_use]
    pub fn is_todo(&self) -> bool {
        is_todo_key(&self.0)
    }
}

impl std::fmt::Display for TodoKey {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(formatter, "{}", self.0)
    }
}

impl From<TodoKey> for String {
    fn from(key: TodoKey) -> Self {
        key.0
    }
}

/// Returns true if `key` starts with [`KEY_PREFIX`].
#[must_use]
pub fn is_todo_key(key: &str) -> bool {
    key.starts_with(KEY_PREFIX)
}

// =============================================================================
// TodoFields
// =============================================================================

/// The JSON object persisted for a todo.
///
/// Never contains a `key` field; the key is attached only when the record
/// leaves the service.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TodoFields(Map<String, Value>);

impl TodoFields {
    /// Builds fields from a request payload.
    ///
    /// Returns `None` if the payload is not a JSON object. Any `key` field
    /// supplied by the caller is discarded.
    #[must_use]
    pub fn from_payload(payload: Value) -> Option<Self> {
        match payload {
            Value::Object(map) => Some(Self(map).without_key()),
            _ => None,
        }
    }

    /// Builds fields from a value read back from the store.
    ///
    /// Non-object values contribute no fields.
    #[must_use]
    pub fn from_stored(value: Value) -> Self {
        match value {
            Value::Object(map) => Self(map).without_key(),
            _ => Self::default(),
        }
    }

    /// Returns the title if it is a string.
    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.0.get("title").and_then(Value::as_str)
    }

    /// Returns true if the title is present, a string and not empty.
    #[must_use]
    pub fn has_title(&self) -> bool {
        self.title().is_some_and(|title| !title.is_empty())
    }

    /// Returns the value of a field.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    /// Fills `description` and `completed` when the caller left them out.
    #[must_use]
    pub fn with_defaults(mut self) -> Self {
        self.0
            .entry("description")
            .or_insert_with(|| Value::String(String::new()));
        self.0
            .entry("completed")
            .or_insert(Value::Bool(false));
        self
    }

    /// Shallow merge: every field in `updates` replaces the existing one.
    #[must_use]
    pub fn merge(mut self, updates: Self) -> Self {
        for (field, value) in updates.0 {
            self.0.insert(field, value);
        }
        self
    }

    /// Converts the fields into the value written to the store.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }

    /// Converts the fields into an API record, `{...fields, key}`.
    #[must_use]
    pub fn into_record(mut self, key: &TodoKey) -> Value {
        self.0
            .insert(KEY_FIELD.to_string(), Value::String(key.as_str().to_string()));
        Value::Object(self.0)
    }

    fn without_key(mut self) -> Self {
        self.0.remove(KEY_FIELD);
        self
    }
}

// =============================================================================
// Tests
// =============================================================================
