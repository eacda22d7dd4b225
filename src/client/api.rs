//! The board's view of the todo HTTP API.

use futures::future::BoxFuture;
use serde_json::{Map, Value};
use thiserror::Error;

use super::model::NewTodo;
use crate::api::DeleteResponse;

/// Errors surfaced by API calls. The `Display` text is what the board shows.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// A call was rejected before anything was sent.
    #[error("{0}")]
    InvalidArgument(String),

    /// The server answered with a non-success status.
    #[error("{method} {url} failed: {status} {body}")]
    Status {
        /// Request method.
        method: String,
        /// Request URL.
        url: String,
        /// Response status code.
        status: u16,
        /// Response body text.
        body: String,
    },

    /// The request could not be sent or the response not read.
    #[error("{method} {url} failed: {reason}")]
    Transport {
        /// Request method.
        method: String,
        /// Request URL.
        url: String,
        /// Underlying error message.
        reason: String,
    },

    /// The response body was not valid JSON.
    #[error("Failed to parse JSON from {url}: {reason}")]
    Decode {
        /// Request URL.
        url: String,
        /// Parser error message.
        reason: String,
    },
}

/// Boxed future returned by API calls.
pub type ApiFuture<T> = BoxFuture<'static, Result<T, ClientError>>;

/// Todo API as used by the board.
///
/// Responses are returned as raw JSON and normalized by the caller.
pub trait TodoApi: Send + Sync {
    /// `GET /api/todos`.
    fn list_todos(&self) -> ApiFuture<Value>;

    /// `POST /api/todos`.
    fn create_todo(&self, todo: &NewTodo) -> ApiFuture<Value>;

    /// `PATCH /api/todos` with `{key, updates}`.
    fn update_todo(&self, key: &str, updates: &Map<String, Value>) -> ApiFuture<Value>;

    /// `DELETE /api/todos` with `{key}`.
    fn delete_todo(&self, key: &str) -> ApiFuture<DeleteResponse>;
}
