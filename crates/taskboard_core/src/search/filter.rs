//! Case-insensitive text filter over task title and description.
//!
//! # Invariants
//! - Filtering never mutates the source board.
//! - A blank query matches every task.

use crate::model::board::Board;
use crate::model::task::Task;

/// Normalized search term.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskQuery {
    needle: String,
}

impl TaskQuery {
    pub fn new(term: &str) -> Self {
        Self {
            needle: term.trim().to_lowercase(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.needle.is_empty()
    }

    pub fn matches(&self, task: &Task) -> bool {
        self.is_empty()
            || task.title.to_lowercase().contains(&self.needle)
            || task.description.to_lowercase().contains(&self.needle)
    }
}

/// Board restricted to tasks matching `query`, list membership and order kept.
pub fn filter_board(board: &Board, query: &TaskQuery) -> Board {
    board.filter(|task| query.matches(task))
}
