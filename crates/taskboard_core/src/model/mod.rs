//! Board domain model: users, contacts, tasks, subtasks and the status board.
//!
//! # Responsibility
//! - Define the canonical data structures shared by repositories and services.
//! - Keep the stored JSON shape (camelCase keys, canonical status names) in one place.
//!
//! # Invariants
//! - Every task lives in exactly one status list and its `status` matches that list.
//! - Missing lists in stored documents read as empty lists, never as errors.
//! - Contacts embedded in tasks are snapshot copies, not references.

pub mod board;
pub mod contact;
pub(crate) mod serde_compat;
pub mod task;
pub mod user;
