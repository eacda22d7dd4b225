//! Board state and its reducer.
//!
//! Every change to the board goes through [`TodoBoard::apply`]. Each applied
//! event bumps `version`, so observers can cheaply tell whether anything
//! changed since their last read.

use super::model::{Filter, TodoItem};

/// A state transition of the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardEvent {
    /// The initial list request was issued.
    LoadStarted,
    /// The initial list request ended (success, failure or cancellation).
    LoadFinished,
    /// Replace the list with freshly loaded items.
    Loaded(Vec<TodoItem>),
    /// Prepend a newly created item.
    Created(TodoItem),
    /// Set the completion state of an item.
    CompletionSet {
        /// Item id.
        id: String,
        /// New state.
        completed: bool,
    },
    /// Remove an item.
    Removed {
        /// Item id.
        id: String,
    },
    /// Show an error, replacing any previous one.
    ErrorRaised(String),
    /// Clear the error slot.
    ErrorCleared,
    /// Set or reset the submitting flag.
    SubmittingSet(bool),
    /// The title input changed.
    TitleEdited(String),
    /// The description input changed.
    DescriptionEdited(String),
    /// Reset both form inputs.
    FormCleared,
    /// Switch the active filter.
    FilterChanged(Filter),
    /// Ask the view to focus the title input.
    FocusRequested,
    /// The view has focused the title input.
    FocusHandled,
}

/// Complete client-side state of the todo board.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoBoard {
    todos: Vec<TodoItem>,
    title: String,
    description: String,
    loading: bool,
    error: Option<String>,
    submitting: bool,
    filter: Filter,
    focus_requested: bool,
    version: u64,
}

impl TodoBoard {
    /// Creates an empty board.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies one transition.
    pub fn apply(&mut self, event: BoardEvent) {
        match event {
            BoardEvent::LoadStarted => self.loading = true,
            BoardEvent::LoadFinished => self.loading = false,
            BoardEvent::Loaded(items) => self.todos = items,
            BoardEvent::Created(item) => self.todos.insert(0, item),
            BoardEvent::CompletionSet { id, completed } => {
                if let Some(item) = self.todos.iter_mut().find(|item| item.id == id) {
                    item.completed = completed;
                }
            }
            BoardEvent::Removed { id } => self.todos.retain(|item| item.id != id),
            BoardEvent::ErrorRaised(message) => self.error = Some(message),
            BoardEvent::ErrorCleared => self.error = None,
            BoardEvent::SubmittingSet(submitting) => self.submitting = submitting,
            BoardEvent::TitleEdited(title) => self.title = title,
            BoardEvent::DescriptionEdited(description) => self.description = description,
            BoardEvent::FormCleared => {
                self.title.clear();
                self.description.clear();
            }
            BoardEvent::FilterChanged(filter) => self.filter = filter,
            BoardEvent::FocusRequested => self.focus_requested = true,
            BoardEvent::FocusHandled => self.focus_requested = false,
        }
        self.version += 1;
    }

    /// Every item, in display order.
    #[must_use]
    pub fn todos(&self) -> &[TodoItem] {
        &self.todos
    }

    /// Items visible under the active filter.
    #[must_use]
    pub fn visible(&self) -> Vec<&TodoItem> {
        self.todos
            .iter()
            .filter(|item| self.filter.matches(item))
            .collect()
    }

    /// Looks up an item by id.
    #[must_use]
    pub fn find(&self, id: &str) -> Option<&TodoItem> {
        self.todos.iter().find(|item| item.id == id)
    }

    #[must_use]
    pub fn title(&self) -> &str {
        &self.title
    }

    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    #[must_use]
    pub const fn is_loading(&self) -> bool {
        self.loading
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        self.submitting
    }

    #[must_use]
    pub const fn filter(&self) -> Filter {
        self.filter
    }

    /// True while a title focus request is pending.
    #[must_use]
    pub const fn focus_requested(&self) -> bool {
        self.focus_requested
    }

    /// Number of transitions applied so far.
    #[must_use]
    pub const fn version(&self) -> u64 {
        self.version
    }
}

// =============================================================================
// Tests
// =============================================================================
