//! Core domain logic for the task board.
//! This crate is the single source of truth for board, contact and session invariants.

pub mod cache;
pub mod config;
pub mod logging;
pub mod model;
pub mod remote;
pub mod repo;
pub mod search;
pub mod service;

pub use cache::{open_cache, open_cache_in_memory, CacheError, SessionCache, SqliteSessionCache};
pub use config::{AppConfig, ConfigError, ConfigOverrides};
pub use logging::{default_log_level, init_logging, logging_status, LogTarget};
pub use model::board::{Board, TaskLocation, TaskMatch};
pub use model::contact::{Contact, ContactFields, ContactGroup, ContactValidationError};
pub use model::task::{
    compute_progress, Category, Priority, Progress, Subtask, Task, TaskDraft, TaskFields,
    TaskStatus, TaskValidationError,
};
pub use model::user::{NamespaceKey, SessionContext, User};
pub use remote::{
    HttpRemoteStore, MemoryRemoteStore, RemoteStore, StoreError, StoreResult, StoredDocument,
    UserPaths,
};
pub use repo::board_repo::{BoardRepository, RemoteBoardRepository};
pub use repo::contact_repo::{ContactRepository, RemoteContactRepository};
pub use repo::user_repo::{RemoteUserRepository, UserRepository};
pub use repo::{RepoError, RepoResult};
pub use search::TaskQuery;
pub use service::account_service::{AccountError, AccountService, SignedIn};
pub use service::board_service::{BoardResult, BoardService, BoardServiceError};
pub use service::contact_service::{ContactResult, ContactService, ContactServiceError};
pub use service::identity_service::{clear_session, IdentityError, IdentityService};
pub use service::summary_service::{format_due_date, summarize, BoardSummary};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
