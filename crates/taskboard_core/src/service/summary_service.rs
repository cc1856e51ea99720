//! Board summary projection.
//!
//! # Invariants
//! - Read-only; summaries are recomputed from the board on every call.
//! - Unparseable due dates never count as a deadline.

use crate::model::board::Board;
use crate::model::task::{parse_due_date, Priority, TaskStatus};
use chrono::NaiveDate;

/// Per-status counts plus the urgent workload.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BoardSummary {
    pub todo: usize,
    pub in_progress: usize,
    pub await_feedback: usize,
    pub done: usize,
    pub total: usize,
    /// Urgent tasks that are not done.
    pub urgent: usize,
    /// Earliest due date among urgent, not-done tasks.
    pub next_urgent_deadline: Option<NaiveDate>,
}

pub fn summarize(board: &Board) -> BoardSummary {
    let open_urgent = board
        .iter()
        .filter(|task| task.priority == Priority::Urgent && task.status != TaskStatus::Done)
        .collect::<Vec<_>>();

    BoardSummary {
        todo: board.todo.len(),
        in_progress: board.in_progress.len(),
        await_feedback: board.await_feedback.len(),
        done: board.done.len(),
        total: board.len(),
        urgent: open_urgent.len(),
        next_urgent_deadline: open_urgent
            .iter()
            .filter_map(|task| parse_due_date(&task.due_date).ok())
            .min(),
    }
}

/// Formats a date as `Month D, YYYY`, e.g. `October 5, 2030`.
pub fn format_due_date(date: NaiveDate) -> String {
    date.format("%B %-d, %Y").to_string()
}
