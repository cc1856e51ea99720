//! Store path layout for one user's documents.
//!
//! ```text
//! users/{namespace}/{userId}
//! users/{namespace}/{userId}/contacts
//! users/{namespace}/{userId}/board[/{status}[/{index}]]
//! ```

use crate::model::task::TaskStatus;
use crate::model::user::{NamespaceKey, SessionContext};

pub const USERS_ROOT: &str = "users";

/// Path builder bound to one session context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserPaths {
    root: String,
}

impl UserPaths {
    pub fn new(ctx: &SessionContext) -> Self {
        Self {
            root: format!("{}/{}", namespace(&ctx.namespace), ctx.user_id),
        }
    }

    pub fn user(&self) -> String {
        self.root.clone()
    }

    pub fn contacts(&self) -> String {
        format!("{}/contacts", self.root)
    }

    pub fn board(&self) -> String {
        format!("{}/board", self.root)
    }

    pub fn status(&self, status: TaskStatus) -> String {
        format!("{}/board/{}", self.root, status.as_str())
    }

    pub fn task(&self, status: TaskStatus, index: usize) -> String {
        format!("{}/board/{}/{index}", self.root, status.as_str())
    }
}

/// Collection holding every account registered under `key`.
pub fn namespace(key: &NamespaceKey) -> String {
    format!("{USERS_ROOT}/{key}")
}

#[cfg(test)]
mod tests {
    use super::{namespace, UserPaths};
    use crate::model::task::TaskStatus;
    use crate::model::user::{NamespaceKey, SessionContext};

    #[test]
    fn builds_user_scoped_paths() {
        let ctx = SessionContext::new("u1", NamespaceKey::from_email("ada@example.com"));
        let paths = UserPaths::new(&ctx);
        assert_eq!(paths.user(), "users/adaexamplecom/u1");
        assert_eq!(paths.contacts(), "users/adaexamplecom/u1/contacts");
        assert_eq!(
            paths.status(TaskStatus::AwaitFeedback),
            "users/adaexamplecom/u1/board/awaitFeedback"
        );
        assert_eq!(
            paths.task(TaskStatus::InProgress, 2),
            "users/adaexamplecom/u1/board/inProgress/2"
        );
        assert_eq!(namespace(&ctx.namespace), "users/adaexamplecom");
    }
}
