//! Contact registry use cases.
//!
//! # Responsibility
//! - Own the user's contact list and persist it as a whole.
//! - Fan contact edits and deletes out to task snapshots through the board engine.
//!
//! # Invariants
//! - The contact list is written before any board reconciliation write.
//! - `id` and `color` never change after creation.
//! - Unknown contact ids are no-ops: no mutation, no write.

use super::board_service::{BoardService, BoardServiceError};
use crate::model::contact::{
    group_by_initial, sort_contacts, Contact, ContactFields, ContactGroup,
    ContactValidationError,
};
use crate::repo::board_repo::BoardRepository;
use crate::repo::contact_repo::ContactRepository;
use crate::repo::RepoError;
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ContactResult<T> = Result<T, ContactServiceError>;

#[derive(Debug)]
pub enum ContactServiceError {
    Validation(ContactValidationError),
    Repo(RepoError),
    /// Contact list was written but task snapshots could not be reconciled.
    Board(BoardServiceError),
}

impl Display for ContactServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
            Self::Board(err) => write!(f, "contact saved but task update failed: {err}"),
        }
    }
}

impl Error for ContactServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
            Self::Board(err) => Some(err),
        }
    }
}

impl From<ContactValidationError> for ContactServiceError {
    fn from(value: ContactValidationError) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ContactServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

impl From<BoardServiceError> for ContactServiceError {
    fn from(value: BoardServiceError) -> Self {
        Self::Board(value)
    }
}

/// Use-case service owning the contact list.
pub struct ContactService<R: ContactRepository> {
    repo: R,
    contacts: Vec<Contact>,
}

impl<R: ContactRepository> ContactService<R> {
    pub fn new(repo: R, contacts: Vec<Contact>) -> Self {
        Self { repo, contacts }
    }

    pub fn load(repo: R) -> ContactResult<Self> {
        let contacts = repo.load_contacts()?;
        Ok(Self::new(repo, contacts))
    }

    /// Contacts in stored order.
    pub fn contacts(&self) -> &[Contact] {
        &self.contacts
    }

    pub fn get(&self, contact_id: &str) -> Option<&Contact> {
        self.contacts.iter().find(|contact| contact.id == contact_id)
    }

    /// Contacts ordered by last name, then first name.
    pub fn sorted(&self) -> Vec<Contact> {
        let mut contacts = self.contacts.clone();
        sort_contacts(&mut contacts);
        contacts
    }

    /// Sorted contacts grouped by last-name initial.
    pub fn groups(&self) -> Vec<ContactGroup> {
        group_by_initial(&self.contacts)
    }

    pub fn reload(&mut self) -> ContactResult<()> {
        self.contacts = self.repo.load_contacts()?;
        Ok(())
    }

    /// Validates and appends a new contact, then writes the contact list.
    pub fn create_contact(&mut self, fields: ContactFields) -> ContactResult<Contact> {
        fields.validate()?;
        let contact = Contact::new(&fields);
        self.contacts.push(contact.clone());
        self.save("contact_create")?;
        Ok(contact)
    }

    /// Merges edited fields, writes the contact list, then refreshes every task
    /// snapshot of the contact on `board`.
    ///
    /// Returns `Ok(None)` when `contact_id` is unknown.
    pub fn edit_contact<B: BoardRepository>(
        &mut self,
        contact_id: &str,
        fields: ContactFields,
        board: &mut BoardService<B>,
    ) -> ContactResult<Option<Contact>> {
        fields.validate()?;
        let Some(contact) = self.contacts.iter_mut().find(|c| c.id == contact_id) else {
            return Ok(None);
        };
        contact.apply_fields(&fields);
        let updated = contact.clone();
        self.save("contact_edit")?;

        let affected = board.reconcile_contact_update(&updated)?;
        info!(
            "event=contact_reconcile module=contacts status=ok op=update affected_lists={}",
            affected.len()
        );
        Ok(Some(updated))
    }

    /// Removes a contact, writes the contact list, then drops it from every task
    /// on `board`.
    ///
    /// Returns `Ok(None)` when `contact_id` is unknown.
    pub fn delete_contact<B: BoardRepository>(
        &mut self,
        contact_id: &str,
        board: &mut BoardService<B>,
    ) -> ContactResult<Option<Contact>> {
        let Some(index) = self.contacts.iter().position(|c| c.id == contact_id) else {
            return Ok(None);
        };
        let removed = self.contacts.remove(index);
        self.save("contact_delete")?;

        let affected = board.reconcile_contact_removal(&removed.id)?;
        info!(
            "event=contact_reconcile module=contacts status=ok op=remove affected_lists={}",
            affected.len()
        );
        Ok(Some(removed))
    }

    fn save(&self, event: &str) -> ContactResult<()> {
        match self.repo.save_contacts(&self.contacts) {
            Ok(()) => {
                info!(
                    "event={event} module=contacts status=ok contacts={}",
                    self.contacts.len()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event={event} module=contacts status=error error_code={}",
                    err.error_code()
                );
                Err(err.into())
            }
        }
    }
}
