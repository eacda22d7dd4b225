//! Todo board library.
//!
//! - [`api`]: axum handlers for create, list, patch and delete over a
//!   key-value store
//! - [`client`]: headless board view model with optimistic updates, plus a
//!   `reqwest` client for the API
//! - [`domain`]: todo records and key generation
//! - [`infrastructure`]: key-value stores and service configuration

pub mod api;
pub mod client;
pub mod domain;
pub mod infrastructure;
