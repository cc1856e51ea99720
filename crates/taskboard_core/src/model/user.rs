//! User document and session identity types.
//!
//! # Responsibility
//! - Define the stored user document.
//! - Derive the namespace key under which a user's documents are stored.
//!
//! # Invariants
//! - `User::id` is the store key of the document and is never serialized into it.
//! - Namespace derivation is deterministic for a given email.

use super::board::Board;
use super::contact::Contact;
use super::serde_compat::{list_or_map, null_as_default};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

static NAMESPACE_STRIP_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9_\s]").expect("valid namespace regex"));

/// Fixed guest account email.
pub const GUEST_EMAIL: &str = "guest@example.com";
/// Fixed guest account user id.
pub const GUEST_USER_ID: &str = "guest";

/// Stored user document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    #[serde(skip)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default, deserialize_with = "list_or_map")]
    pub contacts: Vec<Contact>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub board: Board,
}

impl User {
    /// New account document with no contacts and an empty board.
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            id: String::new(),
            name: name.into(),
            email: email.into(),
            password: password.into(),
            contacts: Vec::new(),
            board: Board::default(),
        }
    }
}

/// Storage namespace derived from an account email.
///
/// Every character other than ASCII letters, digits, underscore and
/// whitespace is removed. Emails differing only in punctuation collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NamespaceKey(String);

impl NamespaceKey {
    pub fn from_email(email: &str) -> Self {
        Self(NAMESPACE_STRIP_RE.replace_all(email, "").into_owned())
    }

    /// Wraps an already derived key, e.g. one read back from the session cache.
    pub fn from_raw(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Display for NamespaceKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifies whose documents the services operate on.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SessionContext {
    pub user_id: String,
    pub namespace: NamespaceKey,
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, namespace: NamespaceKey) -> Self {
        Self {
            user_id: user_id.into(),
            namespace,
        }
    }

    pub fn guest() -> Self {
        Self::new(GUEST_USER_ID, NamespaceKey::from_email(GUEST_EMAIL))
    }
}

#[cfg(test)]
mod tests {
    use super::{NamespaceKey, SessionContext, User};
    use serde_json::json;

    #[test]
    fn namespace_strips_punctuation() {
        assert_eq!(NamespaceKey::from_email("ada.l@example.com").as_str(), "adalexamplecom");
        assert_eq!(NamespaceKey::from_email("a_b c@x.io").as_str(), "a_b cxio");
    }

    #[test]
    fn namespace_collides_on_punctuation_only_differences() {
        assert_eq!(
            NamespaceKey::from_email("a.b@c.de"),
            NamespaceKey::from_email("ab@cde")
        );
    }

    #[test]
    fn guest_context_uses_fixed_identity() {
        let ctx = SessionContext::guest();
        assert_eq!(ctx.user_id, "guest");
        assert_eq!(ctx.namespace.as_str(), "guestexamplecom");
    }

    #[test]
    fn user_id_is_not_serialized_and_null_board_reads_empty() {
        let user: User = serde_json::from_value(json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "pw",
            "board": null
        }))
        .unwrap();
        assert!(user.board.is_empty());
        assert!(user.contacts.is_empty());

        let mut with_id = user.clone();
        with_id.id = "u1".to_string();
        let value = serde_json::to_value(&with_id).unwrap();
        assert!(value.get("id").is_none());
    }
}
