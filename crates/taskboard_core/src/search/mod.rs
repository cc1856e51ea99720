//! Read-only search over the board.
//!
//! # Responsibility
//! - Turn user search input into a task predicate.
//! - Project a board onto the tasks matching a query.

pub mod filter;

pub use filter::{filter_board, TaskQuery};
