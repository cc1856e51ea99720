//! Contact list repository contracts and store-backed implementation.

use super::{decode, encode, RepoResult};
use crate::model::contact::Contact;
use crate::remote::{RemoteStore, UserPaths};
use serde::Deserialize;

/// Repository interface for the user's contact list.
pub trait ContactRepository {
    fn load_contacts(&self) -> RepoResult<Vec<Contact>>;
    /// Overwrites the whole list.
    fn save_contacts(&self, contacts: &[Contact]) -> RepoResult<()>;
}

/// Contact repository over a [`RemoteStore`].
pub struct RemoteContactRepository<'s, S: RemoteStore + ?Sized> {
    store: &'s S,
    paths: UserPaths,
}

impl<'s, S: RemoteStore + ?Sized> RemoteContactRepository<'s, S> {
    pub fn new(store: &'s S, paths: UserPaths) -> Self {
        Self { store, paths }
    }
}

// Lists may be stored as arrays with holes or as keyed objects.
#[derive(Deserialize)]
#[serde(transparent)]
struct StoredContacts(
    #[serde(deserialize_with = "crate::model::serde_compat::list_or_map")] Vec<Contact>,
);

impl<S: RemoteStore + ?Sized> ContactRepository for RemoteContactRepository<'_, S> {
    fn load_contacts(&self) -> RepoResult<Vec<Contact>> {
        let path = self.paths.contacts();
        match self.store.get(&path)? {
            Some(value) => Ok(decode::<StoredContacts>(&path, value)?.0),
            None => Ok(Vec::new()),
        }
    }

    fn save_contacts(&self, contacts: &[Contact]) -> RepoResult<()> {
        let path = self.paths.contacts();
        let value = encode(&path, contacts)?;
        self.store.replace(&path, &value)?;
        Ok(())
    }
}
