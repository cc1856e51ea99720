//! Contact snapshot reconciliation over a board.
//!
//! Tasks embed copies of contacts. After a registry edit or delete these
//! functions bring every embedded copy in line and report which status lists
//! changed, so callers persist only those lists.
//!
//! # Invariants
//! - Pure over `&mut Board`; no storage access.
//! - Returned statuses are distinct and in board scan order.

use crate::model::board::Board;
use crate::model::contact::Contact;
use crate::model::task::TaskStatus;

/// Replaces every embedded snapshot of `contact` with the current value.
pub fn apply_contact_update(board: &mut Board, contact: &Contact) -> Vec<TaskStatus> {
    let mut affected = Vec::new();
    for status in TaskStatus::ALL {
        let mut changed = false;
        for task in board.tasks_mut(status) {
            for snapshot in task.contacts.iter_mut().filter(|c| c.id == contact.id) {
                if *snapshot != *contact {
                    *snapshot = contact.clone();
                    changed = true;
                }
            }
        }
        if changed {
            affected.push(status);
        }
    }
    affected
}

/// Removes every embedded snapshot of `contact_id`.
pub fn remove_contact(board: &mut Board, contact_id: &str) -> Vec<TaskStatus> {
    let mut affected = Vec::new();
    for status in TaskStatus::ALL {
        let mut changed = false;
        for task in board.tasks_mut(status) {
            let before = task.contacts.len();
            task.contacts.retain(|c| c.id != contact_id);
            changed |= task.contacts.len() != before;
        }
        if changed {
            affected.push(status);
        }
    }
    affected
}
