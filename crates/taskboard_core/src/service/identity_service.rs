//! Identity context: which user's documents are active.
//!
//! # Responsibility
//! - Keep the session reference (user id + namespace key) in the local cache.
//! - Resolve the active user from the remote store on demand.
//!
//! # Invariants
//! - The remote store is authoritative; the cached user snapshot is advisory only
//!   and is never consulted by `resolve_active_user`.
//! - `end_session` clears every session key.

use crate::cache::{
    CacheError, SessionCache, CLEANED_EMAIL_KEY, CURRENT_USER_ID_KEY, CURRENT_USER_KEY,
};
use crate::model::user::{NamespaceKey, SessionContext, User};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type IdentityResult<T> = Result<T, IdentityError>;

#[derive(Debug)]
pub enum IdentityError {
    Cache(CacheError),
    Repo(RepoError),
    Encode(serde_json::Error),
}

impl Display for IdentityError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cache(err) => write!(f, "session cache error: {err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode user snapshot: {err}"),
        }
    }
}

impl Error for IdentityError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Cache(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<CacheError> for IdentityError {
    fn from(value: CacheError) -> Self {
        Self::Cache(value)
    }
}

impl From<RepoError> for IdentityError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Session identity over a user repository and a local cache.
pub struct IdentityService<U: UserRepository, C: SessionCache> {
    users: U,
    cache: C,
}

impl<U: UserRepository, C: SessionCache> IdentityService<U, C> {
    pub fn new(users: U, cache: C) -> Self {
        Self { users, cache }
    }

    /// Session reference stored in the cache, if complete.
    pub fn active_context(&self) -> IdentityResult<Option<SessionContext>> {
        let user_id = self.cache.get(CURRENT_USER_ID_KEY)?;
        let namespace = self.cache.get(CLEANED_EMAIL_KEY)?;
        Ok(match (user_id, namespace) {
            (Some(user_id), Some(namespace))
                if !user_id.trim().is_empty() && !namespace.is_empty() =>
            {
                Some(SessionContext::new(user_id, NamespaceKey::from_raw(namespace)))
            }
            _ => None,
        })
    }

    /// Loads the active user from the store.
    ///
    /// Returns `Ok(None)` when no session reference is cached, the document is
    /// missing, or it has no name. The returned board is normalized.
    pub fn resolve_active_user(&self) -> IdentityResult<Option<User>> {
        let Some(ctx) = self.active_context()? else {
            return Ok(None);
        };
        let Some(mut user) = self.users.load_user(&ctx)? else {
            info!("event=identity_resolve module=identity status=ok found=false");
            return Ok(None);
        };
        if user.name.trim().is_empty() {
            warn!("event=identity_resolve module=identity status=error error_code=unnamed_user");
            return Ok(None);
        }
        let corrected = user.board.normalize();
        info!(
            "event=identity_resolve module=identity status=ok found=true normalized_tasks={corrected}"
        );
        Ok(Some(user))
    }

    /// Writes the advisory user snapshot to the cache.
    pub fn persist_local_snapshot(&self, user: &User) -> IdentityResult<()> {
        let encoded = serde_json::to_string(user).map_err(IdentityError::Encode)?;
        self.cache.set(CURRENT_USER_KEY, &encoded)?;
        Ok(())
    }

    /// Last cached user snapshot. Unreadable snapshots are treated as absent.
    pub fn cached_snapshot(&self) -> IdentityResult<Option<User>> {
        let Some(raw) = self.cache.get(CURRENT_USER_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str::<User>(&raw) {
            Ok(user) => Ok(Some(user)),
            Err(_) => {
                warn!("event=snapshot_read module=identity status=error error_code=decode_failed");
                Ok(None)
            }
        }
    }

    /// Stores the session reference and the user snapshot.
    pub fn begin_session(&self, ctx: &SessionContext, user: &User) -> IdentityResult<()> {
        self.cache.set(CURRENT_USER_ID_KEY, &ctx.user_id)?;
        self.cache.set(CLEANED_EMAIL_KEY, ctx.namespace.as_str())?;
        self.persist_local_snapshot(user)?;
        info!("event=session_begin module=identity status=ok");
        Ok(())
    }

    pub fn end_session(&self) -> IdentityResult<()> {
        clear_session(&self.cache)
    }
}

/// Removes every session key from `cache`. Needs no store access.
pub fn clear_session<C: SessionCache + ?Sized>(cache: &C) -> IdentityResult<()> {
    for key in [CURRENT_USER_ID_KEY, CLEANED_EMAIL_KEY, CURRENT_USER_KEY] {
        cache.remove(key)?;
    }
    info!("event=session_end module=identity status=ok");
    Ok(())
}
