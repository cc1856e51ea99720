//! Account registration and sign-in.
//!
//! # Invariants
//! - One account per namespace key; registration fails if the namespace holds any user.
//! - Passwords are compared as stored (plain text).

use crate::model::contact::is_valid_email;
use crate::model::user::{NamespaceKey, SessionContext, User, GUEST_EMAIL};
use crate::repo::user_repo::UserRepository;
use crate::repo::RepoError;
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type AccountResult<T> = Result<T, AccountError>;

#[derive(Debug)]
pub enum AccountError {
    BlankName,
    InvalidEmail(String),
    BlankPassword,
    EmailAlreadyRegistered,
    InvalidCredentials,
    Repo(RepoError),
}

impl Display for AccountError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid email `{value}`"),
            Self::BlankPassword => write!(f, "password must not be blank"),
            Self::EmailAlreadyRegistered => write!(f, "the email already exists"),
            Self::InvalidCredentials => write!(f, "invalid email or password"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for AccountError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for AccountError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Successful sign-in: the session reference plus the loaded user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedIn {
    pub context: SessionContext,
    pub user: User,
}

pub struct AccountService<U: UserRepository> {
    users: U,
}

impl<U: UserRepository> AccountService<U> {
    pub fn new(users: U) -> Self {
        Self { users }
    }

    /// Creates an account with no contacts and an empty board.
    pub fn register(&self, name: &str, email: &str, password: &str) -> AccountResult<SignedIn> {
        let name = name.trim();
        let email = email.trim();
        if name.is_empty() {
            return Err(AccountError::BlankName);
        }
        if !is_valid_email(email) {
            return Err(AccountError::InvalidEmail(email.to_string()));
        }
        if password.is_empty() {
            return Err(AccountError::BlankPassword);
        }

        let namespace = NamespaceKey::from_email(email);
        if !self.users.load_namespace(&namespace)?.is_empty() {
            warn!("event=account_register module=account status=error error_code=email_exists");
            return Err(AccountError::EmailAlreadyRegistered);
        }

        let mut user = User::new(name, email, password);
        user.id = self.users.create_user(&namespace, &user)?;
        info!("event=account_register module=account status=ok");
        Ok(SignedIn {
            context: SessionContext::new(user.id.clone(), namespace),
            user,
        })
    }

    /// Signs in with the first account stored under the email's namespace.
    pub fn sign_in(&self, email: &str, password: &str) -> AccountResult<SignedIn> {
        let namespace = NamespaceKey::from_email(email.trim());
        if namespace.is_empty() {
            return Err(AccountError::InvalidCredentials);
        }
        let Some(mut user) = self.users.load_namespace(&namespace)?.into_iter().next() else {
            warn!("event=account_sign_in module=account status=error error_code=unknown_account");
            return Err(AccountError::InvalidCredentials);
        };
        if user.password != password {
            warn!("event=account_sign_in module=account status=error error_code=bad_password");
            return Err(AccountError::InvalidCredentials);
        }

        user.board.normalize();
        info!("event=account_sign_in module=account status=ok guest=false");
        Ok(SignedIn {
            context: SessionContext::new(user.id.clone(), namespace),
            user,
        })
    }

    /// Signs in to the fixed guest account.
    pub fn sign_in_guest(&self) -> AccountResult<SignedIn> {
        let context = SessionContext::guest();
        let Some(mut user) = self.users.load_user(&context)? else {
            warn!("event=account_sign_in module=account status=error error_code=guest_missing");
            return Err(AccountError::InvalidCredentials);
        };
        user.board.normalize();
        info!("event=account_sign_in module=account status=ok guest=true");
        Ok(SignedIn { context, user })
    }

    /// Creates the guest account document if it does not exist yet.
    ///
    /// Returns `true` when the document was created.
    pub fn ensure_guest_user(&self) -> AccountResult<bool> {
        let context = SessionContext::guest();
        if self.users.load_user(&context)?.is_some() {
            return Ok(false);
        }
        self.users
            .save_user(&context, &User::new("Guest", GUEST_EMAIL, ""))?;
        info!("event=guest_seed module=account status=ok");
        Ok(true)
    }
}
