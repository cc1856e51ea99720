//! Use-case services over repositories.
//!
//! # Responsibility
//! - Orchestrate validation, in-memory mutation and persistence per use case.
//! - Keep storage layout and transport concerns behind repository traits.
//!
//! # Invariants
//! - Services never bypass repository contracts.
//! - No service holds ambient "current user" state; the session context is
//!   injected through the repositories they are built from.

pub mod account_service;
pub mod board_service;
pub mod contact_service;
pub mod identity_service;
pub mod reconcile;
pub mod summary_service;
