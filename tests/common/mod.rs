//! Common test helpers for integration tests.
//!
//! # Note
//!
//! The `#![allow(dead_code)]` attribute is necessary because Rust compiles each
//! integration test file as a separate crate, and not every file uses every
//! helper.

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use http_body_util::BodyExt;
use parking_lot::Mutex;
use serde_json::{Map, Value, json};
use tower::ServiceExt;

use todo_board::api::{AppState, DeleteResponse, create_router};
use todo_board::client::{ApiFuture, ClientError, NewTodo, TodoApi};
use todo_board::domain::KeyStrategy;
use todo_board::infrastructure::{
    InMemoryStore, KeyValueStore, StoreEntry, StoreError, StoreFuture, ValueFormat,
};

// =============================================================================
// Store Helpers
// =============================================================================

/// Creates a connected in-memory store.
pub async fn connected_store() -> InMemoryStore {
    let store = InMemoryStore::new();
    store.connect().await.unwrap();
    store
}

/// Writes a JSON value directly to the store.
pub async fn seed(store: &dyn KeyValueStore, key: &str, value: Value) {
    store.set(key, &value, ValueFormat::Json).await.unwrap();
}

/// Reads a JSON value directly from the store.
pub async fn stored(store: &dyn KeyValueStore, key: &str) -> Option<Value> {
    store.get(key, ValueFormat::Json).await.unwrap()
}

/// Store wrapper that counts writes and fails selected operations.
#[derive(Clone, Default)]
pub struct ScriptedStore {
    inner: InMemoryStore,
    fail_get: Arc<AtomicBool>,
    fail_set: Arc<AtomicBool>,
    fail_del: Arc<AtomicBool>,
    fail_get_all: Arc<AtomicBool>,
    set_calls: Arc<AtomicUsize>,
}

impl ScriptedStore {
    pub async fn connected() -> Self {
        let store = Self::default();
        store.inner.connect().await.unwrap();
        store
    }

    pub fn fail_get(&self) {
        self.fail_get.store(true, Ordering::SeqCst);
    }

    pub fn fail_set(&self) {
        self.fail_set.store(true, Ordering::SeqCst);
    }

    pub fn fail_del(&self) {
        self.fail_del.store(true, Ordering::SeqCst);
    }

    pub fn fail_get_all(&self) {
        self.fail_get_all.store(true, Ordering::SeqCst);
    }

    /// Number of `set` calls that reached the store.
    pub fn set_calls(&self) -> usize {
        self.set_calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &InMemoryStore {
        &self.inner
    }

    fn injected() -> StoreError {
        StoreError::Command("injected failure".to_string())
    }
}

impl KeyValueStore for ScriptedStore {
    fn connect(&self) -> StoreFuture<()> {
        self.inner.connect()
    }

    fn get(&self, key: &str, format: ValueFormat) -> StoreFuture<Option<Value>> {
        if self.fail_get.load(Ordering::SeqCst) {
            return Box::pin(async { Err(Self::injected()) });
        }
        self.inner.get(key, format)
    }

    fn set(&self, key: &str, value: &Value, format: ValueFormat) -> StoreFuture<()> {
        if self.fail_set.load(Ordering::SeqCst) {
            return Box::pin(async { Err(Self::injected()) });
        }
        self.set_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.set(key, value, format)
    }

    fn del(&self, key: &str) -> StoreFuture<u64> {
        if self.fail_del.load(Ordering::SeqCst) {
            return Box::pin(async { Err(Self::injected()) });
        }
        self.inner.del(key)
    }

    fn get_all_data(&self) -> StoreFuture<Vec<StoreEntry>> {
        if self.fail_get_all.load(Ordering::SeqCst) {
            return Box::pin(async { Err(Self::injected()) });
        }
        self.inner.get_all_data()
    }

    fn close(&self) -> StoreFuture<()> {
        self.inner.close()
    }
}

// =============================================================================
// Router Helpers
// =============================================================================

/// Builds the router over `store` with the legacy key strategy.
pub fn router_for(store: impl KeyValueStore + 'static) -> Router {
    create_router(AppState::new(Arc::new(store), KeyStrategy::Legacy))
}

/// Sends a request with a JSON body.
pub async fn send_json(router: &Router, method: &str, uri: &str, body: &Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// Sends a request with a raw body and JSON content type.
pub async fn send_raw(router: &Router, method: &str, uri: &str, body: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    send(router, request).await
}

/// Sends a request without a body.
pub async fn send_empty(router: &Router, method: &str, uri: &str) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    send(router, request).await
}

/// Sends a request and decodes the JSON response body.
pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

/// Creates a todo through the router and returns the response body.
pub async fn create(router: &Router, body: Value) -> Value {
    let (status, created) = send_json(router, "POST", "/api/todos", &body).await;
    assert_eq!(status, StatusCode::OK, "create failed: {created}");
    created
}

/// Lists todos through the router.
pub async fn list(router: &Router) -> Vec<Value> {
    let (status, body) = send_empty(router, "GET", "/api/todos").await;
    assert_eq!(status, StatusCode::OK, "list failed: {body}");
    body.as_array().cloned().unwrap()
}

/// Returns the keys in a list response.
pub fn keys(todos: &[Value]) -> Vec<String> {
    todos
        .iter()
        .map(|todo| todo["key"].as_str().unwrap().to_string())
        .collect()
}

// =============================================================================
// Fake Todo API
// =============================================================================

/// A call received by [`FakeTodoApi`].
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List,
    Create(NewTodo),
    Update { key: String, updates: Map<String, Value> },
    Delete(String),
}

/// In-process `TodoApi` with scripted responses.
#[derive(Default)]
pub struct FakeTodoApi {
    list_response: Mutex<Option<Result<Value, ClientError>>>,
    list_hangs: AtomicBool,
    fail_create: AtomicBool,
    fail_update: AtomicBool,
    fail_delete: AtomicBool,
    calls: Mutex<Vec<Call>>,
}

impl FakeTodoApi {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Makes `list_todos` return `records`.
    pub fn with_list(self: &Arc<Self>, records: Value) -> Arc<Self> {
        *self.list_response.lock() = Some(Ok(records));
        Arc::clone(self)
    }

    /// Makes `list_todos` fail.
    pub fn failing_list(self: &Arc<Self>) -> Arc<Self> {
        *self.list_response.lock() = Some(Err(server_error("GET")));
        Arc::clone(self)
    }

    /// Makes `list_todos` never complete.
    pub fn hanging_list(self: &Arc<Self>) -> Arc<Self> {
        self.list_hangs.store(true, Ordering::SeqCst);
        Arc::clone(self)
    }

    pub fn fail_create(&self, fail: bool) {
        self.fail_create.store(fail, Ordering::SeqCst);
    }

    pub fn fail_update(&self, fail: bool) {
        self.fail_update.store(fail, Ordering::SeqCst);
    }

    pub fn fail_delete(&self, fail: bool) {
        self.fail_delete.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().clone()
    }

    fn record(&self, call: Call) {
        self.calls.lock().push(call);
    }
}

/// The error the fake returns for failing calls.
pub fn server_error(method: &str) -> ClientError {
    ClientError::Status {
        method: method.to_string(),
        url: "http://fake/api/todos".to_string(),
        status: 500,
        body: json!({"error": "injected"}).to_string(),
    }
}

impl TodoApi for FakeTodoApi {
    fn list_todos(&self) -> ApiFuture<Value> {
        self.record(Call::List);
        if self.list_hangs.load(Ordering::SeqCst) {
            return Box::pin(futures::future::pending());
        }
        let response = self
            .list_response
            .lock()
            .clone()
            .unwrap_or_else(|| Ok(json!([])));
        Box::pin(async move { response })
    }

    fn create_todo(&self, todo: &NewTodo) -> ApiFuture<Value> {
        self.record(Call::Create(todo.clone()));
        let response = if self.fail_create.load(Ordering::SeqCst) {
            Err(server_error("POST"))
        } else {
            Ok(json!({
                "title": todo.title,
                "description": todo.description,
                "completed": todo.completed,
                "key": format!("todos:{}1", todo.title),
            }))
        };
        Box::pin(async move { response })
    }

    fn update_todo(&self, key: &str, updates: &Map<String, Value>) -> ApiFuture<Value> {
        self.record(Call::Update {
            key: key.to_string(),
            updates: updates.clone(),
        });
        let response = if self.fail_update.load(Ordering::SeqCst) {
            Err(server_error("PATCH"))
        } else {
            let mut record = updates.clone();
            record.insert("key".to_string(), Value::String(key.to_string()));
            Ok(Value::Object(record))
        };
        Box::pin(async move { response })
    }

    fn delete_todo(&self, key: &str) -> ApiFuture<DeleteResponse> {
        self.record(Call::Delete(key.to_string()));
        let response = if self.fail_delete.load(Ordering::SeqCst) {
            Err(server_error("DELETE"))
        } else {
            Ok(DeleteResponse {
                key: key.to_string(),
                deleted: 1,
            })
        };
        Box::pin(async move { response })
    }
}
