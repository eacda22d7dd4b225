//! Render-ready snapshot of the board.

use serde::Serialize;

use super::board::TodoBoard;
use super::model::{Filter, TodoItem};

/// Page header.
pub const HEADER: &str = "Todo Dashboard";

/// Line under the header.
pub const SUBTITLE: &str = "Track. Focus. Achieve.";

/// Heading of the list section.
pub const LIST_HEADING: &str = "My Todos";

/// Count label while the initial load runs.
pub const LOADING_LABEL: &str = "Loading…";

/// One filter button.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterButton {
    /// Filter the button selects.
    pub filter: Filter,
    /// Button text.
    pub label: &'static str,
    /// True for the active filter.
    pub active: bool,
}

/// Everything a renderer needs to draw the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BoardView {
    pub header: &'static str,
    pub subtitle: &'static str,
    pub list_heading: &'static str,
    /// Current title input.
    pub title: String,
    /// Current description input.
    pub description: String,
    /// `Adding...` while a create is in flight, else `Add`.
    pub submit_label: &'static str,
    /// The submit button is disabled while a create is in flight.
    pub submit_disabled: bool,
    /// Error text, if any.
    pub error: Option<String>,
    /// `Loading…` or `<n> total`, counting every item regardless of filter.
    pub count_label: String,
    /// True when the list is empty and not loading.
    pub show_empty_state: bool,
    pub filters: Vec<FilterButton>,
    /// Items under the active filter.
    pub items: Vec<TodoItem>,
    /// The title input should take focus.
    pub focus_title: bool,
}

impl From<&TodoBoard> for BoardView {
    fn from(board: &TodoBoard) -> Self {
        let total = board.todos().len();
        let count_label = if board.is_loading() {
            LOADING_LABEL.to_string()
        } else {
            format!("{total} total")
        };

        Self {
            header: HEADER,
            subtitle: SUBTITLE,
            list_heading: LIST_HEADING,
            title: board.title().to_string(),
            description: board.description().to_string(),
            submit_label: if board.is_submitting() { "Adding..." } else { "Add" },
            submit_disabled: board.is_submitting(),
            error: board.error().map(str::to_string),
            count_label,
            show_empty_state: total == 0 && !board.is_loading(),
            filters: Filter::ALL
                .into_iter()
                .map(|filter| FilterButton {
                    filter,
                    label: filter.label(),
                    active: filter == board.filter(),
                })
                .collect(),
            items: board.visible().into_iter().cloned().collect(),
            focus_title: board.focus_requested(),
        }
    }
}
