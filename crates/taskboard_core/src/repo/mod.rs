//! Repository layer over the remote document store.
//!
//! # Responsibility
//! - Define use-case oriented data access contracts for boards, contacts and users.
//! - Keep path layout and JSON encoding out of service orchestration.
//!
//! # Invariants
//! - Repositories never validate or mutate domain state; they only read and write.
//! - Each write method maps to exactly one store call.
//! - Documents that cannot be decoded surface as `InvalidData`, never as empty state.

use crate::remote::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod board_repo;
pub mod contact_repo;
pub mod user_repo;

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for document reads and writes.
#[derive(Debug)]
pub enum RepoError {
    Store(StoreError),
    InvalidData { path: String, message: String },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::InvalidData { path, message } => {
                write!(f, "invalid stored data at `{path}`: {message}")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::InvalidData { .. } => None,
        }
    }
}

impl RepoError {
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Store(err) => err.error_code(),
            Self::InvalidData { .. } => "invalid_data",
        }
    }
}

impl From<StoreError> for RepoError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

pub(crate) fn decode<T: DeserializeOwned>(path: &str, value: Value) -> RepoResult<T> {
    serde_json::from_value(value).map_err(|err| RepoError::InvalidData {
        path: path.to_string(),
        message: err.to_string(),
    })
}

pub(crate) fn encode<T: Serialize + ?Sized>(path: &str, value: &T) -> RepoResult<Value> {
    serde_json::to_value(value).map_err(|err| RepoError::InvalidData {
        path: path.to_string(),
        message: err.to_string(),
    })
}
