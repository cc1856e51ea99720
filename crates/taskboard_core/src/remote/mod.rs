//! Remote document store client.
//!
//! # Responsibility
//! - Define the path-addressed document contract (`get/create/replace/remove`).
//! - Provide the HTTP backend and an in-memory backend with the same semantics.
//!
//! # Invariants
//! - Paths are slash-separated, relative, and never contain empty segments.
//! - Failures are returned as `StoreError` and never retried at this layer.
//! - There is no transactional guarantee across multiple calls.

use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod http;
mod memory;
pub mod paths;

pub use http::{HttpRemoteStore, DEFAULT_TIMEOUT};
pub use memory::{MemoryRemoteStore, WriteOp, WriteRecord};
pub use paths::UserPaths;

pub type StoreResult<T> = Result<T, StoreError>;

/// Document stored by `create` or `replace`.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredDocument {
    /// Server-generated key; only set by `create`.
    pub key: Option<String>,
    pub value: Value,
}

/// Remote store failure.
#[derive(Debug)]
pub enum StoreError {
    InvalidPath(String),
    Transport {
        method: &'static str,
        path: String,
        message: String,
    },
    Status {
        method: &'static str,
        path: String,
        status: u16,
    },
    Decode {
        path: String,
        message: String,
    },
    Unavailable(String),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidPath(path) => write!(f, "invalid store path `{path}`"),
            Self::Transport {
                method,
                path,
                message,
            } => write!(f, "{method} {path} failed: {message}"),
            Self::Status {
                method,
                path,
                status,
            } => write!(f, "{method} {path} returned HTTP {status}"),
            Self::Decode { path, message } => {
                write!(f, "failed to decode document at `{path}`: {message}")
            }
            Self::Unavailable(message) => write!(f, "store unavailable: {message}"),
        }
    }
}

impl Error for StoreError {}

impl StoreError {
    /// Stable log code; carries no path or payload.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidPath(_) => "invalid_path",
            Self::Transport { .. } => "transport",
            Self::Status { .. } => "http_status",
            Self::Decode { .. } => "decode_failed",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Path-addressed access to a hierarchical JSON document store.
pub trait RemoteStore {
    /// Reads the document at `path`; `None` when nothing is stored there.
    fn get(&self, path: &str) -> StoreResult<Option<Value>>;
    /// Stores `value` under a new generated child key of `path`.
    fn create(&self, path: &str, value: &Value) -> StoreResult<StoredDocument>;
    /// Overwrites the document at `path`, creating intermediate structure.
    fn replace(&self, path: &str, value: &Value) -> StoreResult<StoredDocument>;
    fn remove(&self, path: &str) -> StoreResult<()>;
}

impl<T: RemoteStore + ?Sized> RemoteStore for &T {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        (**self).get(path)
    }

    fn create(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        (**self).create(path, value)
    }

    fn replace(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        (**self).replace(path, value)
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        (**self).remove(path)
    }
}

impl<T: RemoteStore + ?Sized> RemoteStore for Box<T> {
    fn get(&self, path: &str) -> StoreResult<Option<Value>> {
        (**self).get(path)
    }

    fn create(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        (**self).create(path, value)
    }

    fn replace(&self, path: &str, value: &Value) -> StoreResult<StoredDocument> {
        (**self).replace(path, value)
    }

    fn remove(&self, path: &str) -> StoreResult<()> {
        (**self).remove(path)
    }
}

/// Splits and checks a store path.
pub(crate) fn split_path(path: &str) -> StoreResult<Vec<&str>> {
    let trimmed = path.trim_matches('/');
    if trimmed.is_empty() {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    let segments = trimmed.split('/').collect::<Vec<_>>();
    if segments
        .iter()
        .any(|segment| segment.is_empty() || segment.contains(['.', '#', '$', '[', ']']))
    {
        return Err(StoreError::InvalidPath(path.to_string()));
    }
    Ok(segments)
}

/// Path label safe for logs: keeps the top-level collection and the depth.
pub(crate) fn path_label(path: &str) -> String {
    let segments = path.trim_matches('/').split('/').collect::<Vec<_>>();
    match segments.as_slice() {
        [] | [""] => "<root>".to_string(),
        [root] => (*root).to_string(),
        [root, rest @ ..] => {
            let tail = rest
                .iter()
                .skip(2)
                .copied()
                .collect::<Vec<_>>()
                .join("/");
            if tail.is_empty() {
                format!("{root}/*")
            } else {
                format!("{root}/*/{tail}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{path_label, split_path};

    #[test]
    fn split_path_rejects_empty_and_reserved_segments() {
        assert!(split_path("").is_err());
        assert!(split_path("users//x").is_err());
        assert!(split_path("users/a.b").is_err());
        assert_eq!(split_path("/users/a/").unwrap(), vec!["users", "a"]);
    }

    #[test]
    fn path_label_hides_namespace_and_user_id() {
        assert_eq!(path_label("users/adaexamplecom/u1/board/todo"), "users/*/board/todo");
        assert_eq!(path_label("users/adaexamplecom"), "users/*");
        assert_eq!(path_label("users"), "users");
    }
}
