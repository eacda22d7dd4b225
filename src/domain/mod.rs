//! Domain module for todos.
//!
//! This module contains the todo record model and key generation.

pub mod key;
pub mod todo;

pub use key::{InvalidKeyStrategy, KeyStrategy, LEGACY_SUFFIX_BOUND};
pub use todo::{KEY_PREFIX, TodoFields, TodoKey, is_todo_key};
