//! Status board model.
//!
//! # Responsibility
//! - Hold the four ordered status lists and expose positional lookups.
//! - Normalize loaded boards so each task's `status` matches its list.
//!
//! # Invariants
//! - Lookup order is `todo -> inProgress -> awaitFeedback -> done`; first match wins.
//! - Insertion order within a list is preserved by every operation here.

use super::serde_compat::list_or_map;
use super::task::{Task, TaskStatus};
use serde::{Deserialize, Serialize};

/// Position of a task inside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskLocation {
    pub status: TaskStatus,
    pub index: usize,
}

/// Result of a task lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskMatch<'a> {
    pub task: &'a Task,
    pub location: TaskLocation,
}

/// Four ordered status lists partitioning a user's tasks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    #[serde(default, deserialize_with = "list_or_map")]
    pub todo: Vec<Task>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub in_progress: Vec<Task>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub await_feedback: Vec<Task>,
    #[serde(default, deserialize_with = "list_or_map")]
    pub done: Vec<Task>,
}

impl Board {
    pub fn tasks(&self, status: TaskStatus) -> &[Task] {
        match status {
            TaskStatus::Todo => &self.todo,
            TaskStatus::InProgress => &self.in_progress,
            TaskStatus::AwaitFeedback => &self.await_feedback,
            TaskStatus::Done => &self.done,
        }
    }

    pub fn tasks_mut(&mut self, status: TaskStatus) -> &mut Vec<Task> {
        match status {
            TaskStatus::Todo => &mut self.todo,
            TaskStatus::InProgress => &mut self.in_progress,
            TaskStatus::AwaitFeedback => &mut self.await_feedback,
            TaskStatus::Done => &mut self.done,
        }
    }

    /// Rewrites every task's `status` to the list that holds it.
    ///
    /// Returns the number of tasks whose stored status disagreed.
    pub fn normalize(&mut self) -> usize {
        let mut corrected = 0;
        for status in TaskStatus::ALL {
            for task in self.tasks_mut(status) {
                if task.status != status {
                    task.status = status;
                    corrected += 1;
                }
            }
        }
        corrected
    }

    /// Finds a task by id across all lists.
    pub fn find_task(&self, task_id: &str) -> Option<TaskMatch<'_>> {
        TaskStatus::ALL.into_iter().find_map(|status| {
            self.tasks(status)
                .iter()
                .position(|task| task.id == task_id)
                .map(|index| TaskMatch {
                    task: &self.tasks(status)[index],
                    location: TaskLocation { status, index },
                })
        })
    }

    /// Index of `task_id` inside one list.
    pub fn position(&self, status: TaskStatus, task_id: &str) -> Option<usize> {
        self.tasks(status).iter().position(|task| task.id == task_id)
    }

    pub fn task_at_mut(&mut self, location: TaskLocation) -> Option<&mut Task> {
        self.tasks_mut(location.status).get_mut(location.index)
    }

    /// Iterates all tasks in lookup order.
    pub fn iter(&self) -> impl Iterator<Item = &Task> + '_ {
        TaskStatus::ALL
            .into_iter()
            .flat_map(move |status| self.tasks(status).iter())
    }

    pub fn len(&self) -> usize {
        TaskStatus::ALL
            .into_iter()
            .map(|status| self.tasks(status).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns a board holding only tasks accepted by `predicate`, keeping
    /// each task in its list and relative order.
    pub fn filter<P>(&self, mut predicate: P) -> Board
    where
        P: FnMut(&Task) -> bool,
    {
        let mut filtered = Board::default();
        for status in TaskStatus::ALL {
            filtered.tasks_mut(status).extend(
                self.tasks(status)
                    .iter()
                    .filter(|task| predicate(task))
                    .cloned(),
            );
        }
        filtered
    }

    /// Checks that every task's status matches its list and no id repeats.
    pub fn is_partitioned(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        TaskStatus::ALL.into_iter().all(|status| {
            self.tasks(status)
                .iter()
                .all(|task| task.status == status && seen.insert(task.id.as_str()))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{Board, TaskLocation};
    use crate::model::task::{Category, TaskDraft, TaskFields, TaskStatus};

    fn task(title: &str, status: TaskStatus) -> crate::model::task::Task {
        TaskDraft::new(TaskFields::new(title, "2030-01-01", Some(Category::UserStory)))
            .into_task(Category::UserStory, status)
    }

    #[test]
    fn find_scans_statuses_in_fixed_order() {
        let mut board = Board::default();
        let shared = task("a", TaskStatus::Done);
        let mut duplicate = shared.clone();
        duplicate.status = TaskStatus::InProgress;
        board.done.push(shared.clone());
        board.in_progress.push(duplicate);

        let found = board.find_task(&shared.id).unwrap();
        assert_eq!(
            found.location,
            TaskLocation {
                status: TaskStatus::InProgress,
                index: 0
            }
        );
    }

    #[test]
    fn normalize_aligns_status_with_list() {
        let mut board = Board::default();
        board.done.push(task("a", TaskStatus::Todo));
        board.todo.push(task("b", TaskStatus::Todo));

        assert_eq!(board.normalize(), 1);
        assert_eq!(board.done[0].status, TaskStatus::Done);
        assert!(board.is_partitioned());
    }

    #[test]
    fn filter_keeps_list_membership_and_order() {
        let mut board = Board::default();
        board.todo.push(task("keep 1", TaskStatus::Todo));
        board.todo.push(task("drop", TaskStatus::Todo));
        board.todo.push(task("keep 2", TaskStatus::Todo));
        board.done.push(task("keep 3", TaskStatus::Done));

        let filtered = board.filter(|task| task.title.starts_with("keep"));
        let titles = filtered.todo.iter().map(|t| t.title.as_str()).collect::<Vec<_>>();
        assert_eq!(titles, vec!["keep 1", "keep 2"]);
        assert_eq!(filtered.done.len(), 1);
        assert_eq!(board.len(), 4);
    }
}
