//! API module for HTTP handlers.
//!
//! This module contains route definitions and request/response handlers.

pub mod dto;
pub mod error;
pub mod handlers;
pub mod routes;

pub use dto::{CreateTodoRequest, DeleteResponse, DeleteTodoRequest, PatchTodoRequest};
pub use error::{ApiErrorResponse, ErrorBody};
pub use handlers::{
    AppState, HealthResponse, create_todo, delete_todo, delete_todo_by_path,
    delete_todo_without_key, health_check, list_todos, patch_todo,
};
pub use routes::create_router;
