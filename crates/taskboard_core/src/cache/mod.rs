//! Local session cache backed by SQLite.
//!
//! # Responsibility
//! - Persist the advisory session snapshot between process runs.
//! - Apply cache schema migrations before any read or write.
//!
//! # Invariants
//! - Cached values are advisory; the remote store stays authoritative for user data.
//! - Schema version is tracked via `PRAGMA user_version`.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;
mod session_cache;

pub use open::{open_cache, open_cache_in_memory};
pub use session_cache::SqliteSessionCache;

/// Stored id of the active user.
pub const CURRENT_USER_ID_KEY: &str = "currentUserId";
/// Stored namespace key of the active user.
pub const CLEANED_EMAIL_KEY: &str = "cleanedEmail";
/// Serialized snapshot of the active user document.
pub const CURRENT_USER_KEY: &str = "currentUser";

pub type CacheResult<T> = Result<T, CacheError>;

#[derive(Debug)]
pub enum CacheError {
    Sqlite(rusqlite::Error),
    /// The directory holding the cache file could not be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Io { path, source } => {
                write!(f, "cannot create cache directory `{}`: {source}", path.display())
            }
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "cache schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for CacheError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Sqlite(err) => Some(err),
            Self::Io { source, .. } => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
        }
    }
}

impl From<rusqlite::Error> for CacheError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// String key-value storage for session state.
pub trait SessionCache {
    fn get(&self, key: &str) -> CacheResult<Option<String>>;
    fn set(&self, key: &str, value: &str) -> CacheResult<()>;
    /// Removes `key`; removing an absent key is not an error.
    fn remove(&self, key: &str) -> CacheResult<()>;
}

impl<T: SessionCache + ?Sized> SessionCache for &T {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        (**self).remove(key)
    }
}
