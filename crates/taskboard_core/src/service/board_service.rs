//! Board engine: task and subtask use cases over one user's board.
//!
//! # Responsibility
//! - Own the in-memory board and apply task/subtask mutations to it.
//! - Persist each mutation at the narrowest covering path.
//!
//! # Invariants
//! - Validation runs before any mutation or write.
//! - Unknown task ids and out-of-range subtask indices are no-ops: no mutation, no write.
//! - Mutations are applied in memory before the write and are not rolled back when
//!   the write fails; `reload` restores the stored state.
//!
//! Write paths per operation:
//! - create: `board/{status}`
//! - edit and subtask changes: `board/{status}/{index}`
//! - move and delete: `board`

use super::reconcile;
use crate::model::board::{Board, TaskLocation, TaskMatch};
use crate::model::contact::Contact;
use crate::model::task::{
    compute_progress, Progress, Subtask, Task, TaskDraft, TaskFields, TaskStatus,
    TaskValidationError,
};
use crate::repo::board_repo::BoardRepository;
use crate::repo::RepoError;
use crate::search::{filter_board, TaskQuery};
use chrono::{Local, NaiveDate};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type BoardResult<T> = Result<T, BoardServiceError>;

/// Board engine failure.
#[derive(Debug)]
pub enum BoardServiceError {
    Validation(TaskValidationError),
    BlankSubtask,
    Repo(RepoError),
}

impl Display for BoardServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::BlankSubtask => write!(f, "subtask text must not be blank"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BoardServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::BlankSubtask => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<TaskValidationError> for BoardServiceError {
    fn from(value: TaskValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for BoardServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service owning a board and the repository it syncs to.
pub struct BoardService<R: BoardRepository> {
    repo: R,
    board: Board,
}

impl<R: BoardRepository> BoardService<R> {
    /// Wraps an already loaded board, normalizing task statuses.
    pub fn new(repo: R, mut board: Board) -> Self {
        board.normalize();
        Self { repo, board }
    }

    /// Loads the stored board through `repo`.
    pub fn load(repo: R) -> BoardResult<Self> {
        let board = repo.load_board()?;
        Ok(Self::new(repo, board))
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    pub fn into_board(self) -> Board {
        self.board
    }

    /// Replaces the in-memory board with the stored one.
    pub fn reload(&mut self) -> BoardResult<()> {
        self.board = self.repo.load_board()?;
        info!(
            "event=board_reload module=board status=ok tasks={}",
            self.board.len()
        );
        Ok(())
    }

    /// Creates a task in `status`, validating the due date against the local date.
    pub fn create_task(&mut self, draft: TaskDraft, status: TaskStatus) -> BoardResult<Task> {
        self.create_task_on(draft, status, Local::now().date_naive())
    }

    /// Creates a task in `status`, treating `today` as the earliest valid due date.
    ///
    /// # Errors
    /// - `Validation` when a required field is missing or the due date is before `today`.
    /// - `Repo` when the status list cannot be written; the task stays on the board.
    pub fn create_task_on(
        &mut self,
        draft: TaskDraft,
        status: TaskStatus,
        today: NaiveDate,
    ) -> BoardResult<Task> {
        let category = draft.fields.validate_new(today)?;
        let task = draft.into_task(category, status);
        self.board.tasks_mut(status).push(task.clone());

        let result = self
            .repo
            .save_status_list(status, self.board.tasks(status));
        log_write("task_create", status, &result);
        result?;
        Ok(task)
    }

    /// Looks a task up across all lists in scan order.
    pub fn find_task(&self, task_id: &str) -> Option<TaskMatch<'_>> {
        self.board.find_task(task_id)
    }

    /// Moves a task from `from` to the end of `to`.
    ///
    /// Returns `Ok(false)` without writing when the task is not in `from`.
    pub fn move_task(
        &mut self,
        task_id: &str,
        from: TaskStatus,
        to: TaskStatus,
    ) -> BoardResult<bool> {
        let Some(index) = self.board.position(from, task_id) else {
            return Ok(false);
        };
        let mut task = self.board.tasks_mut(from).remove(index);
        task.status = to;
        self.board.tasks_mut(to).push(task);

        let result = self.repo.save_board(&self.board);
        log_write("task_move", to, &result);
        result?;
        Ok(true)
    }

    /// Overwrites the editable fields of a task in `status`; subtasks are kept.
    ///
    /// Past due dates are accepted so overdue tasks stay editable.
    pub fn edit_task(
        &mut self,
        task_id: &str,
        status: TaskStatus,
        fields: TaskFields,
    ) -> BoardResult<bool> {
        let category = fields.validate()?;
        let Some(index) = self.board.position(status, task_id) else {
            return Ok(false);
        };
        let location = TaskLocation { status, index };
        let task = &mut self.board.tasks_mut(status)[index];
        fields.apply_to(task, category);

        let result = self.save_task_at(location);
        log_write("task_edit", status, &result);
        result?;
        Ok(true)
    }

    /// Removes a task from `status` and returns it.
    pub fn delete_task(&mut self, task_id: &str, status: TaskStatus) -> BoardResult<Option<Task>> {
        let Some(index) = self.board.position(status, task_id) else {
            return Ok(None);
        };
        let task = self.board.tasks_mut(status).remove(index);

        let result = self.repo.save_board(&self.board);
        log_write("task_delete", status, &result);
        result?;
        Ok(Some(task))
    }

    /// Appends a subtask. Blank text is rejected.
    pub fn add_subtask(&mut self, task_id: &str, text: &str) -> BoardResult<bool> {
        let text = text.trim();
        if text.is_empty() {
            return Err(BoardServiceError::BlankSubtask);
        }
        self.mutate_task("subtask_add", task_id, |task| {
            task.subtasks.push(Subtask::new(text));
            true
        })
    }

    /// Replaces subtask text. Blank text deletes the subtask at `index`.
    pub fn edit_subtask(&mut self, task_id: &str, index: usize, text: &str) -> BoardResult<bool> {
        let text = text.trim();
        if text.is_empty() {
            return self.delete_subtask(task_id, index);
        }
        self.mutate_task("subtask_edit", task_id, |task| {
            match task.subtasks.get_mut(index) {
                Some(subtask) => {
                    subtask.text = text.to_string();
                    true
                }
                None => false,
            }
        })
    }

    /// Removes the subtask at `index`; later subtasks shift down by one.
    pub fn delete_subtask(&mut self, task_id: &str, index: usize) -> BoardResult<bool> {
        self.mutate_task("subtask_delete", task_id, |task| {
            if index < task.subtasks.len() {
                task.subtasks.remove(index);
                true
            } else {
                false
            }
        })
    }

    pub fn toggle_subtask_completed(&mut self, task_id: &str, index: usize) -> BoardResult<bool> {
        self.mutate_task("subtask_toggle", task_id, |task| {
            match task.subtasks.get_mut(index) {
                Some(subtask) => {
                    subtask.completed = !subtask.completed;
                    true
                }
                None => false,
            }
        })
    }

    /// Subtask progress of a task on this board.
    pub fn compute_progress(&self, task_id: &str) -> Option<Progress> {
        self.board
            .find_task(task_id)
            .map(|found| compute_progress(found.task))
    }

    /// Board restricted to tasks accepted by `predicate`.
    pub fn filter_tasks<P>(&self, predicate: P) -> Board
    where
        P: FnMut(&Task) -> bool,
    {
        self.board.filter(predicate)
    }

    /// Board restricted to tasks whose title or description contains `term`.
    pub fn search(&self, term: &str) -> Board {
        filter_board(&self.board, &TaskQuery::new(term))
    }

    /// Pushes an edited contact into every task snapshot and writes the
    /// affected status lists.
    pub fn reconcile_contact_update(&mut self, contact: &Contact) -> BoardResult<Vec<TaskStatus>> {
        let affected = reconcile::apply_contact_update(&mut self.board, contact);
        self.save_status_lists(&affected)?;
        Ok(affected)
    }

    /// Drops a deleted contact from every task and writes the affected status lists.
    pub fn reconcile_contact_removal(&mut self, contact_id: &str) -> BoardResult<Vec<TaskStatus>> {
        let affected = reconcile::remove_contact(&mut self.board, contact_id);
        self.save_status_lists(&affected)?;
        Ok(affected)
    }

    fn save_status_lists(&self, statuses: &[TaskStatus]) -> BoardResult<()> {
        for &status in statuses {
            let result = self.repo.save_status_list(status, self.board.tasks(status));
            log_write("contact_reconcile", status, &result);
            result?;
        }
        Ok(())
    }

    fn mutate_task<F>(&mut self, event: &str, task_id: &str, mutate: F) -> BoardResult<bool>
    where
        F: FnOnce(&mut Task) -> bool,
    {
        let Some(location) = self.board.find_task(task_id).map(|found| found.location) else {
            return Ok(false);
        };
        let Some(task) = self.board.task_at_mut(location) else {
            return Ok(false);
        };
        if !mutate(task) {
            return Ok(false);
        }

        let result = self.save_task_at(location);
        log_write(event, location.status, &result);
        result?;
        Ok(true)
    }

    // Falls back to the whole list while stored slots differ from in-memory indices.
    fn save_task_at(&self, location: TaskLocation) -> Result<(), RepoError> {
        let tasks = self.board.tasks(location.status);
        if !self.repo.is_index_aligned(location.status) {
            return self.repo.save_status_list(location.status, tasks);
        }
        match tasks.get(location.index) {
            Some(task) => self.repo.save_task(location, task),
            None => Ok(()),
        }
    }
}

fn log_write<T>(event: &str, status: TaskStatus, result: &Result<T, RepoError>) {
    match result {
        Ok(_) => info!("event={event} module=board status=ok task_status={status}"),
        Err(err) => error!(
            "event={event} module=board status=error task_status={status} error_code={}",
            err.error_code()
        ),
    }
}
