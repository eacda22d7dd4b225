//! Client side of the todo board.
//!
//! A headless view model: [`BoardController`] runs the user flows against any
//! [`TodoApi`], and [`BoardView`] is what a renderer draws.

pub mod api;
pub mod board;
pub mod controller;
pub mod http;
pub mod model;
pub mod optimistic;
pub mod view;

pub use api::{ApiFuture, ClientError, TodoApi};
pub use board::{BoardEvent, TodoBoard};
pub use controller::{BoardController, FlowOutcome, LoadOutcome, TITLE_REQUIRED, ViewHandle};
pub use http::{DEFAULT_BASE_URL, TodoApiClient};
pub use model::{Filter, NewTodo, TodoItem, is_truthy, normalize_list};
pub use optimistic::Optimistic;
pub use view::{BoardView, FilterButton};
