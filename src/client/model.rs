//! Client-side view model for todos.
//!
//! Server records are loose JSON; the board works on [`TodoItem`], a fixed
//! shape built by normalizing each record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

// =============================================================================
// TodoItem
// =============================================================================

/// A todo as displayed by the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TodoItem {
    /// Local identity: the server key when known, otherwise a fallback.
    pub id: String,
    /// Server key. Items without one exist only locally.
    pub key: Option<String>,
    /// Title, empty if the record had none.
    pub title: String,
    /// Description, empty if the record had none.
    pub description: String,
    /// Completion state.
    pub completed: bool,
}

impl TodoItem {
    /// Normalizes a record returned by the list endpoint.
    ///
    /// `index` and `now_millis` build the fallback id `"<millis>-<index>"`
    /// used when the record carries neither `key` nor `id`.
    #[must_use]
    pub fn from_record(record: &Value, index: usize, now_millis: i64) -> Self {
        let key = server_key(record);
        Self {
            id: key.clone().unwrap_or_else(|| format!("{now_millis}-{index}")),
            key,
            title: text_field(record, "title").unwrap_or_default(),
            description: text_field(record, "description").unwrap_or_default(),
            completed: record.get("completed").is_some_and(is_truthy),
        }
    }

    /// Normalizes the record returned by the create endpoint.
    ///
    /// Empty fields in the response fall back to what was submitted. A null
    /// response yields a local-only item built from the submission.
    #[must_use]
    pub fn from_created(created: &Value, submitted: &NewTodo, now_millis: i64) -> Self {
        if created.is_null() {
            return Self {
                id: now_millis.to_string(),
                key: None,
                title: submitted.title.clone(),
                description: submitted.description.clone(),
                completed: submitted.completed,
            };
        }

        let key = server_key(created);
        Self {
            id: key.clone().unwrap_or_else(|| now_millis.to_string()),
            key,
            title: text_field(created, "title").unwrap_or_else(|| submitted.title.clone()),
            description: text_field(created, "description")
                .unwrap_or_else(|| submitted.description.clone()),
            completed: created.get("completed").is_some_and(is_truthy),
        }
    }
}

/// Normalizes a list response. Anything but an array yields no items.
#[must_use]
pub fn normalize_list(data: &Value, now_millis: i64) -> Vec<TodoItem> {
    data.as_array()
        .map(|records| {
            records
                .iter()
                .enumerate()
                .map(|(index, record)| TodoItem::from_record(record, index, now_millis))
                .collect()
        })
        .unwrap_or_default()
}

/// Returns `key`, else `id`, skipping values that are falsy.
fn server_key(record: &Value) -> Option<String> {
    ["key", "id"]
        .into_iter()
        .filter_map(|field| record.get(field))
        .find_map(|value| match value {
            Value::String(text) if !text.is_empty() => Some(text.clone()),
            Value::Number(number) if is_truthy(value) => Some(number.to_string()),
            _ => None,
        })
}

/// Returns a non-empty string field.
fn text_field(record: &Value, field: &str) -> Option<String> {
    record
        .get(field)
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// JSON truthiness: `null`, `false`, `0`, `NaN` and `""` are false.
#[must_use]
pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(flag) => *flag,
        Value::Number(number) => number.as_f64().is_some_and(|n| n != 0.0 && !n.is_nan()),
        Value::String(text) => !text.is_empty(),
        Value::Array(_) | Value::Object(_) => true,
    }
}

// =============================================================================
// NewTodo
// =============================================================================

/// Body sent when creating a todo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTodo {
    /// Trimmed, non-empty title.
    pub title: String,
    /// Trimmed description.
    pub description: String,
    /// Always false for new todos.
    pub completed: bool,
}

impl NewTodo {
    /// Creates an open todo from raw form input, trimming both fields.
    #[must_use]
    pub fn from_form(title: &str, description: &str) -> Self {
        Self {
            title: title.trim().to_string(),
            description: description.trim().to_string(),
            completed: false,
        }
    }
}

// =============================================================================
// Filter
// =============================================================================

/// Which todos the board shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Filter {
    /// Every todo.
    #[default]
    All,
    /// Todos not yet completed.
    Active,
    /// Completed todos.
    Completed,
}

impl Filter {
    /// Every filter in display order.
    pub const ALL: [Self; 3] = [Self::All, Self::Active, Self::Completed];

    /// Button label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::All => "All",
            Self::Active => "Active",
            Self::Completed => "Completed",
        }
    }

    /// Returns true if `item` is visible under this filter.
    #[must_use]
    pub const fn matches(self, item: &TodoItem) -> bool {
        match self {
            Self::All => true,
            Self::Active => !item.completed,
            Self::Completed => item.completed,
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
