//! Data Transfer Objects for the todo API.
//!
//! Request bodies are accepted as raw JSON and checked field by field so that
//! each malformed shape gets its own error message.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::error::ApiErrorResponse;
use crate::domain::{TodoFields, TodoKey};

/// Create body without a usable title.
pub const MISSING_TITLE: &str = "todo must include a title";

/// Patch or delete body without a usable `key`.
pub const MISSING_KEY: &str = "Request body must include `key` string";

/// Patch body without an `updates` object.
pub const MISSING_UPDATES: &str = "Request body must include `updates` object";

/// Empty key in a path-variant delete.
pub const MISSING_KEY_PARAMETER: &str = "Missing key parameter";

// =============================================================================
// Request DTOs
// =============================================================================

/// Validated body of `POST /api/todos`.
#[derive(Debug, Clone, PartialEq)]
pub struct CreateTodoRequest {
    /// Caller-supplied fields, `key` removed.
    pub fields: TodoFields,
}

impl CreateTodoRequest {
    /// Validates a create body.
    ///
    /// # Errors
    ///
    /// Returns 400 if the body is not an object or has no non-empty string title.
    pub fn from_body(body: Value) -> Result<Self, ApiErrorResponse> {
        TodoFields::from_payload(body)
            .filter(TodoFields::has_title)
            .map(|fields| Self { fields })
            .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_TITLE))
    }

    /// Returns the title. Always non-empty after validation.
    #[must_use]
    pub fn title(&self) -> &str {
        self.fields.title().unwrap_or_default()
    }
}

/// Validated body of `PATCH /api/todos`.
#[derive(Debug, Clone, PartialEq)]
pub struct PatchTodoRequest {
    /// Target record.
    pub key: TodoKey,
    /// Fields to merge, `key` removed.
    pub updates: TodoFields,
}

impl PatchTodoRequest {
    /// Validates a patch body.
    ///
    /// # Errors
    ///
    /// Returns 400 if `key` is not a non-empty string or `updates` is not an object.
    pub fn from_body(mut body: Value) -> Result<Self, ApiErrorResponse> {
        let key = required_key(&body)?;
        let updates = body
            .get_mut("updates")
            .map(Value::take)
            .and_then(TodoFields::from_payload)
            .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_UPDATES))?;
        Ok(Self { key, updates })
    }
}

/// Validated body of `DELETE /api/todos`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteTodoRequest {
    /// Record to delete.
    pub key: TodoKey,
}

impl DeleteTodoRequest {
    /// Validates a delete body.
    ///
    /// # Errors
    ///
    /// Returns 400 if `key` is not a non-empty string.
    pub fn from_body(body: &Value) -> Result<Self, ApiErrorResponse> {
        required_key(body).map(|key| Self { key })
    }

    /// Validates the decoded path segment of a path-variant delete.
    ///
    /// # Errors
    ///
    /// Returns 400 if the key is empty.
    pub fn from_path(key: String) -> Result<Self, ApiErrorResponse> {
        if key.is_empty() {
            Err(ApiErrorResponse::bad_request(MISSING_KEY_PARAMETER))
        } else {
            Ok(Self {
                key: TodoKey::new(key),
            })
        }
    }
}

fn required_key(body: &Value) -> Result<TodoKey, ApiErrorResponse> {
    body.get("key")
        .and_then(Value::as_str)
        .filter(|key| !key.is_empty())
        .map(TodoKey::new)
        .ok_or_else(|| ApiErrorResponse::bad_request(MISSING_KEY))
}

// =============================================================================
// Response DTOs
// =============================================================================

/// Response body of both delete endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteResponse {
    /// The key that was requested.
    pub key: String,
    /// Number of records removed (0 or 1).
    pub deleted: u64,
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use rstest::rstest;
    use serde_json::json;

    fn message(error: &ApiErrorResponse) -> &str {
        &error.body.error
    }

    #[rstest]
    fn test_create_request_strips_key() {
        let request =
            CreateTodoRequest::from_body(json!({"title": "a", "key": "todos:evil"})).unwrap();
        assert_eq!(request.title(), "a");
        assert!(request.fields.get("key").is_none());
    }

    #[rstest]
    #[case(json!({}))]
    #[case(json!({"title": ""}))]
    #[case(json!({"title": 5}))]
    #[case(json!({"title": null}))]
    #[case(json!(["title"]))]
    #[case(json!("title"))]
    fn test_create_request_requires_title(#[case] body: Value) {
        let error = CreateTodoRequest::from_body(body).unwrap_err();
        assert_eq!(error.status, StatusCode::BAD_REQUEST);
        assert_eq!(message(&error), MISSING_TITLE);
    }

    #[rstest]
    fn test_patch_request_valid() {
        let request = PatchTodoRequest::from_body(json!({
            "key": "todos:a1",
            "updates": {"completed": true, "key": "todos:other"}
        }))
        .unwrap();
        assert_eq!(request.key, TodoKey::new("todos:a1"));
        assert_eq!(request.updates.get("completed"), Some(&json!(true)));
        assert!(request.updates.get("key").is_none());
    }

    #[rstest]
    #[case(json!({"updates": {}}))]
    #[case(json!({"key": "", "updates": {}}))]
    #[case(json!({"key": 7, "updates": {}}))]
    #[case(json!(null))]
    fn test_patch_request_requires_key(#[case] body: Value) {
        let error = PatchTodoRequest::from_body(body).unwrap_err();
        assert_eq!(message(&error), MISSING_KEY);
    }

    #[rstest]
    #[case(json!({"key": "todos:a1"}))]
    #[case(json!({"key": "todos:a1", "updates": null}))]
    #[case(json!({"key": "todos:a1", "updates": "done"}))]
    #[case(json!({"key": "todos:a1", "updates": [1, 2]}))]
    fn test_patch_request_requires_updates_object(#[case] body: Value) {
        let error = PatchTodoRequest::from_body(body).unwrap_err();
        assert_eq!(message(&error), MISSING_UPDATES);
    }

    #[rstest]
    fn test_delete_request_from_body() {
        let request = DeleteTodoRequest::from_body(&json!({"key": "todos:a1"})).unwrap();
        assert_eq!(request.key.as_str(), "todos:a1");

        let error = DeleteTodoRequest::from_body(&json!({})).unwrap_err();
        assert_eq!(message(&error), MISSING_KEY);
    }

    #[rstest]
    fn test_delete_request_from_path() {
        let request = DeleteTodoRequest::from_path("todos:Buy milk42".to_string()).unwrap();
        assert_eq!(request.key.as_str(), "todos:Buy milk42");

        let error = DeleteTodoRequest::from_path(String::new()).unwrap_err();
        assert_eq!(message(&error), MISSING_KEY_PARAMETER);
    }

    #[rstest]
    fn test_delete_response_serialization() {
        let response = DeleteResponse {
            key: "todos:a1".to_string(),
            deleted: 1,
        };
        assert_eq!(
            serde_json::to_value(&response).unwrap(),
            json!({"key": "todos:a1", "deleted": 1})
        );
    }
}
