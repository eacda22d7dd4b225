//! User flows of the todo board.
//!
//! [`BoardController`] owns the board state and an API handle. Each flow
//! clears the error slot, talks to the API, and reconciles the board through
//! [`BoardEvent`]s. The board lock is never held across an API call.

use std::sync::Arc;

use futures::future::{AbortHandle, Abortable, Aborted, BoxFuture};
use parking_lot::Mutex;
use serde_json::{Map, Value};

use super::api::{ClientError, TodoApi};
use super::board::{BoardEvent, TodoBoard};
use super::model::{Filter, NewTodo, TodoItem, normalize_list};
use super::optimistic::{self, Optimistic};
use super::view::BoardView;

/// Error shown when submitting without a title.
pub const TITLE_REQUIRED: &str = "Title is required";

/// How the initial load ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The list was replaced with this many items.
    Loaded(usize),
    /// The request failed; the error is on the board.
    Failed(ClientError),
    /// The view was torn down first; the board list is untouched.
    Cancelled,
}

/// How a user flow ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowOutcome {
    /// The change was applied.
    Completed,
    /// Local validation failed; nothing was sent.
    Rejected,
    /// There was nothing to do; nothing was sent.
    Skipped,
    /// The API call failed; the error is on the board.
    Failed,
}

/// Handle returned by [`BoardController::mount`].
#[derive(Debug, Clone)]
pub struct ViewHandle {
    abort: AbortHandle,
}

impl ViewHandle {
    /// Tears the view down, aborting the initial load if it is still running.
    pub fn teardown(&self) {
        self.abort.abort();
    }
}

/// Drives the board.
///
/// Clones share the same board.
#[derive(Clone)]
pub struct BoardController {
    board: Arc<Mutex<TodoBoard>>,
    api: Arc<dyn TodoApi>,
}

impl std::fmt::Debug for BoardController {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("BoardController")
            .field("board", &*self.board.lock())
            .field("api", &"Arc<dyn TodoApi>")
            .finish()
    }
}

/// Clears the loading flag when the initial load ends, however it ends.
struct LoadFinishedGuard(Arc<Mutex<TodoBoard>>);

impl Drop for LoadFinishedGuard {
    fn drop(&mut self) {
        self.0.lock().apply(BoardEvent::LoadFinished);
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

impl BoardController {
    /// Creates a controller with an empty board.
    #[must_use]
    pub fn new(api: Arc<dyn TodoApi>) -> Self {
        Self {
            board: Arc::new(Mutex::new(TodoBoard::new())),
            api,
        }
    }

    /// Starts the initial load.
    ///
    /// The returned future performs the load; the handle aborts it. An
    /// aborted load leaves the list untouched and raises no error. The
    /// loading flag is cleared when the future completes or is dropped.
    pub fn mount(&self) -> (BoxFuture<'static, LoadOutcome>, ViewHandle) {
        let (abort, registration) = AbortHandle::new_pair();
        let board = Arc::clone(&self.board);
        let request = Abortable::new(self.api.list_todos(), registration);

        board.lock().apply(BoardEvent::LoadStarted);

        let finished = LoadFinishedGuard(Arc::clone(&board));
        let load = async move {
            let _finished = finished;
            match request.await {
                Ok(Ok(data)) => {
                    let items = normalize_list(&data, now_millis());
                    let count = items.len();
                    board.lock().apply(BoardEvent::Loaded(items));
                    tracing::debug!(count, "Loaded todos");
                    LoadOutcome::Loaded(count)
                }
                Ok(Err(error)) => {
                    tracing::warn!(%error, "Failed to load todos");
                    board.lock().apply(BoardEvent::ErrorRaised(error.to_string()));
                    LoadOutcome::Failed(error)
                }
                Err(Aborted) => {
                    tracing::debug!("Initial load cancelled");
                    LoadOutcome::Cancelled
                }
            }
        };

        (Box::pin(load), ViewHandle { abort })
    }

    /// Creates a todo from the form.
    ///
    /// An empty trimmed title is rejected locally with a focus request. On
    /// success the new item is prepended and the form cleared.
    pub async fn submit(&self) -> FlowOutcome {
        let draft = {
            let mut board = self.board.lock();
            if board.is_submitting() {
                return FlowOutcome::Skipped;
            }
            board.apply(BoardEvent::ErrorCleared);
            let draft = NewTodo::from_form(board.title(), board.description());
            if draft.title.is_empty() {
                board.apply(BoardEvent::ErrorRaised(TITLE_REQUIRED.to_string()));
                board.apply(BoardEvent::FocusRequested);
                return FlowOutcome::Rejected;
            }
            board.apply(BoardEvent::SubmittingSet(true));
            draft
        };

        let result = self.api.create_todo(&draft).await;

        let mut board = self.board.lock();
        let outcome = match result {
            Ok(created) => {
                let item = TodoItem::from_created(&created, &draft, now_millis());
                tracing::debug!(id = %item.id, "Created todo");
                board.apply(BoardEvent::Created(item));
                board.apply(BoardEvent::FormCleared);
                FlowOutcome::Completed
            }
            Err(error) => {
                board.apply(BoardEvent::ErrorRaised(error.to_string()));
                FlowOutcome::Failed
            }
        };
        board.apply(BoardEvent::SubmittingSet(false));
        outcome
    }

    /// Flips an item's completion state optimistically.
    ///
    /// Items that are missing or have no server key are left alone. On
    /// failure the prior state is restored.
    pub async fn toggle_complete(&self, id: &str) -> FlowOutcome {
        let key = {
            let mut board = self.board.lock();
            board.apply(BoardEvent::ErrorCleared);
            board.find(id).and_then(|item| item.key.clone())
        };
        let Some(key) = key else {
            return FlowOutcome::Skipped;
        };

        let outcome = optimistic::update(
            &*self.board,
            |board| board.find(id).map(|item| item.completed),
            |board, completed| {
                board.apply(BoardEvent::CompletionSet {
                    id: id.to_string(),
                    completed,
                });
            },
            |completed| !completed,
            |completed| {
                let mut updates = Map::new();
                updates.insert("completed".to_string(), Value::Bool(completed));
                self.api.update_todo(&key, &updates)
            },
        )
        .await;

        match outcome {
            Optimistic::Committed(_) => FlowOutcome::Completed,
            Optimistic::Missing => FlowOutcome::Skipped,
            Optimistic::RolledBack(error) => {
                tracing::warn!(%error, key = %key, "Rolled back completion change");
                self.board
                    .lock()
                    .apply(BoardEvent::ErrorRaised(error.to_string()));
                FlowOutcome::Failed
            }
        }
    }

    /// Deletes an item.
    ///
    /// Items with a server key are removed only after the API confirms; items
    /// without one are removed locally.
    pub async fn delete(&self, id: &str) -> FlowOutcome {
        let key = {
            let mut board = self.board.lock();
            let Some(item) = board.find(id) else {
                return FlowOutcome::Skipped;
            };
            let key = item.key.clone();
            board.apply(BoardEvent::ErrorCleared);
            key
        };

        if let Some(key) = key {
            if let Err(error) = self.api.delete_todo(&key).await {
                self.board
                    .lock()
                    .apply(BoardEvent::ErrorRaised(error.to_string()));
                return FlowOutcome::Failed;
            }
        }

        self.board.lock().apply(BoardEvent::Removed { id: id.to_string() });
        FlowOutcome::Completed
    }

    /// Updates the title input.
    pub fn edit_title(&self, title: impl Into<String>) {
        self.board.lock().apply(BoardEvent::TitleEdited(title.into()));
    }

    /// Updates the description input.
    pub fn edit_description(&self, description: impl Into<String>) {
        self.board
            .lock()
            .apply(BoardEvent::DescriptionEdited(description.into()));
    }

    /// Resets both form inputs.
    pub fn clear_form(&self) {
        self.board.lock().apply(BoardEvent::FormCleared);
    }

    /// Switches the active filter.
    pub fn set_filter(&self, filter: Filter) {
        self.board.lock().apply(BoardEvent::FilterChanged(filter));
    }

    /// Marks a pending focus request as handled.
    pub fn focus_handled(&self) {
        self.board.lock().apply(BoardEvent::FocusHandled);
    }

    /// Returns a copy of the board state.
    #[must_use]
    pub fn snapshot(&self) -> TodoBoard {
        self.board.lock().clone()
    }

    /// Returns a render-ready view of the board.
    #[must_use]
    pub fn view(&self) -> BoardView {
        BoardView::from(&*self.board.lock())
    }
}
