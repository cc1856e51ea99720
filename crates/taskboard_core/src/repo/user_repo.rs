//! User document repository contracts and store-backed implementation.
//!
//! # Invariants
//! - Returned users carry their store key in `User::id`.
//! - Namespace listings are ordered by store key.

use super::{decode, encode, RepoError, RepoResult};
use crate::model::user::{NamespaceKey, SessionContext, User};
use crate::remote::paths::{namespace, UserPaths};
use crate::remote::RemoteStore;
use serde_json::Value;

/// Repository interface for user documents.
pub trait UserRepository {
    fn load_user(&self, ctx: &SessionContext) -> RepoResult<Option<User>>;
    /// Lists every user document stored under `ns`.
    fn load_namespace(&self, ns: &NamespaceKey) -> RepoResult<Vec<User>>;
    /// Stores a new user under `ns` and returns its generated id.
    fn create_user(&self, ns: &NamespaceKey, user: &User) -> RepoResult<String>;
    /// Overwrites the user document at a known id.
    fn save_user(&self, ctx: &SessionContext, user: &User) -> RepoResult<()>;
}

/// User repository over a [`RemoteStore`].
pub struct RemoteUserRepository<'s, S: RemoteStore + ?Sized> {
    store: &'s S,
}

impl<'s, S: RemoteStore + ?Sized> RemoteUserRepository<'s, S> {
    pub fn new(store: &'s S) -> Self {
        Self { store }
    }
}

impl<S: RemoteStore + ?Sized> UserRepository for RemoteUserRepository<'_, S> {
    fn load_user(&self, ctx: &SessionContext) -> RepoResult<Option<User>> {
        let path = UserPaths::new(ctx).user();
        let Some(value) = self.store.get(&path)? else {
            return Ok(None);
        };
        let mut user = decode::<User>(&path, value)?;
        user.id = ctx.user_id.clone();
        Ok(Some(user))
    }

    fn load_namespace(&self, ns: &NamespaceKey) -> RepoResult<Vec<User>> {
        let path = namespace(ns);
        let entries = match self.store.get(&path)? {
            None => return Ok(Vec::new()),
            Some(Value::Object(map)) => {
                let mut entries = map.into_iter().collect::<Vec<_>>();
                entries.sort_by(|(left, _), (right, _)| left.cmp(right));
                entries
            }
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| (index.to_string(), item))
                .collect(),
            Some(_) => {
                return Err(RepoError::InvalidData {
                    path,
                    message: "expected a collection of user documents".to_string(),
                });
            }
        };

        let mut users = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if value.is_null() {
                continue;
            }
            let mut user = decode::<User>(&format!("{path}/{key}"), value)?;
            user.id = key;
            users.push(user);
        }
        Ok(users)
    }

    fn create_user(&self, ns: &NamespaceKey, user: &User) -> RepoResult<String> {
        let path = namespace(ns);
        let value = encode(&path, user)?;
        let stored = self.store.create(&path, &value)?;
        stored.key.ok_or_else(|| RepoError::InvalidData {
            path,
            message: "store returned no generated key".to_string(),
        })
    }

    fn save_user(&self, ctx: &SessionContext, user: &User) -> RepoResult<()> {
        let path = UserPaths::new(ctx).user();
        let value = encode(&path, user)?;
        self.store.replace(&path, &value)?;
        Ok(())
    }
}
