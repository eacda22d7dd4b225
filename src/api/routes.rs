//! Route configuration for the todo API.
//!
//! # Routes
//!
//! | Method | Path | Handler | Description |
//! |--------|------|---------|-------------|
//! | GET | /api/todos | `list_todos` | List all todos |
//! | POST | /api/todos | `create_todo` | Create a todo |
//! | PATCH | /api/todos | `patch_todo` | Partially update a todo |
//! | DELETE | /api/todos | `delete_todo` | Delete a todo named in the body |
//! | DELETE | /api/todos/{key} | `delete_todo_by_path` | Delete a todo named in the path |
//! | DELETE | /api/todos/ | `delete_todo_without_key` | 400, empty key segment |
//! | GET | /health | `health_check` | Health check endpoint |

use axum::Router;
use axum::routing::{delete, get};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, create_todo, delete_todo, delete_todo_by_path, delete_todo_without_key,
    health_check, list_todos, patch_todo,
};

/// Creates the Axum router with all API routes.
///
/// Requests are traced and CORS allows any origin, method and header so the
/// board can be served from a different origin.
///
/// # Example
///
/// ```rust,ignore
/// let state = AppState::new(store, KeyStrategy::Legacy);
/// let listener = tokio::net::TcpListener::bind("0.0.0.0:4000").await?;
/// axum::serve(listener, create_router(state)).await?;
/// ```
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route(
            "/api/todos",
            get(list_todos)
                .post(create_todo)
                .patch(patch_todo)
                .delete(delete_todo),
        )
        .route("/api/todos/", delete(delete_todo_without_key))
        .route("/api/todos/{key}", delete(delete_todo_by_path))
        .route("/health", get(health_check))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}
