//! Board repository contracts and store-backed implementation.
//!
//! # Responsibility
//! - Load a user's board and write it back at board, status-list or task granularity.
//!
//! # Invariants
//! - A missing board document loads as an empty, normalized board.
//! - Status lists are always written as full arrays so indices stay contiguous.
//! - A list loaded as a keyed object or with `null` holes is not addressable by
//!   in-memory index until it has been rewritten as a full array.

use super::{decode, encode, RepoResult};
use crate::model::board::{Board, TaskLocation};
use crate::model::task::{Task, TaskStatus};
use crate::remote::{RemoteStore, UserPaths};
use serde_json::Value;
use std::cell::RefCell;
use std::collections::HashSet;

/// Repository interface for board persistence.
pub trait BoardRepository {
    fn load_board(&self) -> RepoResult<Board>;
    /// Overwrites all four status lists.
    fn save_board(&self, board: &Board) -> RepoResult<()>;
    /// Overwrites one status list.
    fn save_status_list(&self, status: TaskStatus, tasks: &[Task]) -> RepoResult<()>;
    /// Overwrites one task in place.
    fn save_task(&self, location: TaskLocation, task: &Task) -> RepoResult<()>;
    /// Whether stored indices of `status` match the in-memory list, so
    /// [`BoardRepository::save_task`] hits the right slot.
    fn is_index_aligned(&self, _status: TaskStatus) -> bool {
        true
    }
}

/// Board repository over a [`RemoteStore`].
pub struct RemoteBoardRepository<'s, S: RemoteStore + ?Sized> {
    store: &'s S,
    paths: UserPaths,
    unaligned: RefCell<HashSet<TaskStatus>>,
}

impl<'s, S: RemoteStore + ?Sized> RemoteBoardRepository<'s, S> {
    pub fn new(store: &'s S, paths: UserPaths) -> Self {
        Self {
            store,
            paths,
            unaligned: RefCell::new(HashSet::new()),
        }
    }

    pub fn paths(&self) -> &UserPaths {
        &self.paths
    }
}

impl<S: RemoteStore + ?Sized> BoardRepository for RemoteBoardRepository<'_, S> {
    fn load_board(&self) -> RepoResult<Board> {
        let path = self.paths.board();
        let (mut board, unaligned) = match self.store.get(&path)? {
            Some(value) => {
                let unaligned = unaligned_statuses(&value);
                (decode::<Board>(&path, value)?, unaligned)
            }
            None => (Board::default(), HashSet::new()),
        };
        board.normalize();
        *self.unaligned.borrow_mut() = unaligned;
        Ok(board)
    }

    fn save_board(&self, board: &Board) -> RepoResult<()> {
        let path = self.paths.board();
        let value = encode(&path, board)?;
        self.store.replace(&path, &value)?;
        self.unaligned.borrow_mut().clear();
        Ok(())
    }

    fn save_status_list(&self, status: TaskStatus, tasks: &[Task]) -> RepoResult<()> {
        let path = self.paths.status(status);
        let value = encode(&path, tasks)?;
        self.store.replace(&path, &value)?;
        self.unaligned.borrow_mut().remove(&status);
        Ok(())
    }

    fn save_task(&self, location: TaskLocation, task: &Task) -> RepoResult<()> {
        let path = self.paths.task(location.status, location.index);
        let value = encode(&path, task)?;
        self.store.replace(&path, &value)?;
        Ok(())
    }

    fn is_index_aligned(&self, status: TaskStatus) -> bool {
        !self.unaligned.borrow().contains(&status)
    }
}

// Lists stored as keyed objects or with holes decode compacted, so their
// stored slots differ from in-memory indices.
fn unaligned_statuses(board: &Value) -> HashSet<TaskStatus> {
    TaskStatus::ALL
        .into_iter()
        .filter(|status| match board.get(status.as_str()) {
            None | Some(Value::Null) => false,
            Some(Value::Array(items)) => items.iter().any(Value::is_null),
            Some(_) => true,
        })
        .collect()
}
