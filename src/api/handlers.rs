//! HTTP handlers for the todo API.
//!
//! Handlers translate each request into one or two key-value store calls and
//! pass JSON payloads through with minimal shaping.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Path, State,
        rejection::{JsonRejection, PathRejection},
    },
};
use serde_json::{Map, Value};

use super::dto::{
    CreateTodoRequest, DeleteResponse, DeleteTodoRequest, MISSING_KEY_PARAMETER,
    PatchTodoRequest,
};
use super::error::ApiErrorResponse;
use crate::domain::{KeyStrategy, TodoFields, TodoKey, is_todo_key};
use crate::infrastructure::{KeyValueStore, StoreError, ValueFormat};

/// How many legacy keys are tried before accepting a possibly taken one.
const MAX_KEY_ATTEMPTS: usize = 8;

// =============================================================================
// Application State
// =============================================================================

/// Shared application dependencies.
///
/// The store is a trait object so the backend can be chosen at startup.
#[derive(Clone)]
pub struct AppState {
    /// Connected key-value store.
    pub store: Arc<dyn KeyValueStore>,
    /// How keys for new todos are generated.
    pub key_strategy: KeyStrategy,
}

impl AppState {
    /// Creates a new `AppState`.
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>, key_strategy: KeyStrategy) -> Self {
        Self {
            store,
            key_strategy,
        }
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("AppState")
            .field("store", &"Arc<dyn KeyValueStore>")
            .field("key_strategy", &self.key_strategy)
            .finish()
    }
}

// =============================================================================
// POST /api/todos Handler
// =============================================================================

/// Creates a todo.
///
/// # Request Body
///
/// ```json
/// { "title": "Buy milk", "description": "2 litres" }
/// ```
///
/// # Response
///
/// - **200 OK**: `{...stored, key}`; `description` defaults to `""` and
///   `completed` to `false`
/// - **400 Bad Request**: missing or empty title; nothing is written
/// - **500 Internal Server Error**: store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above.
pub async fn create_todo(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiErrorResponse> {
    let request = CreateTodoRequest::from_body(body_or_empty(body)?)?;

    let key = allocate_key(&state, request.title()).await?;
    let fields = request.fields.with_defaults();

    state
        .store
        .set(key.as_str(), &fields.clone().into_value(), ValueFormat::Json)
        .await
        .map_err(|error| store_failure(&error, &key, "Failed to create todo"))?;

    tracing::info!(key = %key, "Created todo");
    Ok(Json(fields.into_record(&key)))
}

/// Picks a key for a new todo.
///
/// Legacy keys are checked against the store and regenerated on collision.
/// After `MAX_KEY_ATTEMPTS` taken candidates the last one is used anyway.
async fn allocate_key(state: &AppState, title: &str) -> Result<TodoKey, ApiErrorResponse> {
    let strategy = state.key_strategy;
    if !strategy.may_collide() {
        return Ok(strategy.generate(title, &mut rand::rng()));
    }

    let mut candidate = strategy.generate(title, &mut rand::rng());
    for attempt in 1..=MAX_KEY_ATTEMPTS {
        let existing = state
            .store
            .get(candidate.as_str(), ValueFormat::Text)
            .await
            .map_err(|error| store_failure(&error, &candidate, "Failed to create todo"))?;
        if existing.is_none() {
            return Ok(candidate);
        }
        tracing::debug!(key = %candidate, attempt, "Generated key already in use");
        candidate = strategy.generate(title, &mut rand::rng());
    }

    tracing::warn!(key = %candidate, "No free key found, overwriting existing record");
    Ok(candidate)
}

// =============================================================================
// GET /api/todos Handler
// =============================================================================

/// Lists every todo in store order.
///
/// Entries outside the `todos:` namespace and entries with a null value are
/// skipped. Each record is returned as `{...value, key}`.
///
/// # Errors
///
/// Returns 500 if the store cannot be read.
pub async fn list_todos(
    State(state): State<AppState>,
) -> Result<Json<Vec<Value>>, ApiErrorResponse> {
    let entries = state.store.get_all_data().await.map_err(|error| {
        tracing::error!(%error, "Failed to read store");
        ApiErrorResponse::internal_error("Failed to list todos")
    })?;

    let todos: Vec<Value> = entries
        .into_iter()
        .filter(|entry| is_todo_key(&entry.key) && !entry.value.is_null())
        .map(|entry| {
            let key = TodoKey::new(entry.key);
            TodoFields::from_stored(entry.value).into_record(&key)
        })
        .collect();

    tracing::debug!(count = todos.len(), "Listed todos");
    Ok(Json(todos))
}

// =============================================================================
// PATCH /api/todos Handler
// =============================================================================

/// Applies a shallow partial update to a todo.
///
/// # Request Body
///
/// ```json
/// { "key": "todos:Buy milk42", "updates": { "completed": true } }
/// ```
///
/// # Response
///
/// - **200 OK**: `{...merged, key}`
/// - **400 Bad Request**: missing `key` or `updates`
/// - **404 Not Found**: no record under `key`; the store is unchanged
/// - **500 Internal Server Error**: store failure
///
/// # Errors
///
/// Returns [`ApiErrorResponse`] for the cases above.
pub async fn patch_todo(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Value>, ApiErrorResponse> {
    let body = body_or_empty(body)?;
    let PatchTodoRequest { key, updates } = PatchTodoRequest::from_body(body)?;

    let existing = state
        .store
        .get(key.as_str(), ValueFormat::Json)
        .await
        .map_err(|error| store_failure(&error, &key, "Failed to update key"))?
        .ok_or_else(|| ApiErrorResponse::not_found("Key not found"))?;

    let merged = TodoFields::from_stored(existing).merge(updates);
    state
        .store
        .set(key.as_str(), &merged.clone().into_value(), ValueFormat::Json)
        .await
        .map_err(|error| store_failure(&error, &key, "Failed to update key"))?;

    tracing::info!(key = %key, "Updated todo");
    Ok(Json(merged.into_record(&key)))
}

// =============================================================================
// DELETE /api/todos Handlers
// =============================================================================

/// Deletes a todo named in the request body.
///
/// Deleting a missing key succeeds with `deleted: 0`.
///
/// # Errors
///
/// Returns 400 for a missing `key` and 500 on store failure.
pub async fn delete_todo(
    State(state): State<AppState>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let request = DeleteTodoRequest::from_body(&body_or_empty(body)?)?;
    remove(&state, request.key).await
}

/// Deletes a todo named by the URL-encoded path segment.
///
/// # Errors
///
/// Returns 400 for an empty key and 500 on store failure.
pub async fn delete_todo_by_path(
    State(state): State<AppState>,
    key: Result<Path<String>, PathRejection>,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let Path(key) = key.map_err(|rejection| {
        tracing::debug!(%rejection, "Rejected key parameter");
        ApiErrorResponse::bad_request(MISSING_KEY_PARAMETER)
    })?;
    let request = DeleteTodoRequest::from_path(key)?;
    remove(&state, request.key).await
}

/// Answers `DELETE /api/todos/`, where the key segment is empty.
///
/// # Errors
///
/// Always returns 400 `Missing key parameter`.
pub async fn delete_todo_without_key() -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    Err(ApiErrorResponse::bad_request(MISSING_KEY_PARAMETER))
}

async fn remove(
    state: &AppState,
    key: TodoKey,
) -> Result<Json<DeleteResponse>, ApiErrorResponse> {
    let deleted = state
        .store
        .del(key.as_str())
        .await
        .map_err(|error| store_failure(&error, &key, "Failed to delete key"))?;

    tracing::info!(key = %key, deleted, "Deleted todo");
    Ok(Json(DeleteResponse {
        key: key.into(),
        deleted,
    }))
}

/// Unwraps a JSON body. A request without a JSON content type counts as `{}`.
fn body_or_empty(body: Result<Json<Value>, JsonRejection>) -> Result<Value, ApiErrorResponse> {
    match body {
        Ok(Json(value)) => Ok(value),
        Err(JsonRejection::MissingJsonContentType(_)) => Ok(Value::Object(Map::new())),
        Err(rejection) => Err(rejection.into()),
    }
}

fn store_failure(error: &StoreError, key: &TodoKey, message: &str) -> ApiErrorResponse {
    tracing::error!(%error, key = %key, "{message}");
    ApiErrorResponse::internal_error(message)
}

// =============================================================================
// GET /health Handler
// =============================================================================

/// Health check response body.
#[derive(Debug, Clone, serde::Serialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: &'static str,
    /// Service version.
    pub version: &'static str,
}

/// Health check endpoint.
///
/// ```json
/// { "status": "healthy", "version": "0.1.0" }
/// ```
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// =============================================================================
// Tests
// =============================================================================
