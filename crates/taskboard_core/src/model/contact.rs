//! Contact domain model.
//!
//! # Responsibility
//! - Define the address-book entry and its derived display attributes.
//! - Provide validation, ordering and grouping used by the contact registry.
//!
//! # Invariants
//! - `id` is generated once and never changes.
//! - `initials` is always derived from `name` and recomputed on rename.
//! - `color` is assigned at creation and kept across edits.

use once_cell::sync::Lazy;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

const SORT_KEY_CHARS: usize = 3;

/// Stable contact identifier. Older documents carry non-UUID ids, so the
/// value is kept as an opaque string.
pub type ContactId = String;

/// Address-book entry, also embedded as a snapshot inside tasks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub number: String,
    /// Derived from `name`; cached for rendering.
    #[serde(default)]
    pub initials: String,
    /// `#rrggbb` badge color.
    #[serde(default)]
    pub color: String,
}

/// User-editable contact fields.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContactFields {
    pub name: String,
    pub email: String,
    pub number: String,
}

/// Contact input validation failures.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContactValidationError {
    BlankName,
    InvalidEmail(String),
    BlankNumber,
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankName => write!(f, "contact name must not be blank"),
            Self::InvalidEmail(value) => write!(f, "invalid contact email `{value}`"),
            Self::BlankNumber => write!(f, "contact number must not be blank"),
        }
    }
}

impl Error for ContactValidationError {}

impl ContactFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        number: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            number: number.into(),
        }
    }

    /// Checks required fields and email shape.
    pub fn validate(&self) -> Result<(), ContactValidationError> {
        if self.name.trim().is_empty() {
            return Err(ContactValidationError::BlankName);
        }
        if !is_valid_email(self.email.trim()) {
            return Err(ContactValidationError::InvalidEmail(self.email.clone()));
        }
        if self.number.trim().is_empty() {
            return Err(ContactValidationError::BlankNumber);
        }
        Ok(())
    }

    fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            number: self.number.trim().to_string(),
        }
    }
}

impl Contact {
    /// Creates a contact with a generated id, derived initials and a random color.
    ///
    /// Input is trimmed but not validated; callers validate `ContactFields` first.
    pub fn new(fields: &ContactFields) -> Self {
        let fields = fields.normalized();
        Self {
            id: Uuid::new_v4().to_string(),
            initials: derive_initials(&fields.name),
            name: fields.name,
            email: fields.email,
            number: fields.number,
            color: random_color(),
        }
    }

    /// Merges edited fields, keeping `id` and `color`.
    pub fn apply_fields(&mut self, fields: &ContactFields) {
        let fields = fields.normalized();
        self.initials = derive_initials(&fields.name);
        self.name = fields.name;
        self.email = fields.email;
        self.number = fields.number;
    }

    /// Uppercased first letter of the last name, used as the address-book group.
    pub fn group_letter(&self) -> Option<char> {
        last_name(&self.name)
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
    }
}

/// Contacts sharing one address-book initial.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactGroup {
    pub letter: char,
    pub contacts: Vec<Contact>,
}

/// Derives display initials: first and last name initials, or the first
/// character alone for single-word names.
pub fn derive_initials(name: &str) -> String {
    let parts = name.split_whitespace().collect::<Vec<_>>();
    let initials = match parts.as_slice() {
        [] => String::new(),
        [single] => single.chars().take(1).collect(),
        [first, .., last] => first.chars().take(1).chain(last.chars().take(1)).collect(),
    };
    initials.to_uppercase()
}

/// Returns a random `#rrggbb` color.
pub fn random_color() -> String {
    let value: u32 = rand::rng().random_range(0..0xFF_FFFF);
    format!("#{value:06x}")
}

pub fn is_valid_email(value: &str) -> bool {
    EMAIL_RE.is_match(value)
}

/// Stable sort by last name, then first name, comparing the first three
/// uppercased characters of each.
pub fn sort_contacts(contacts: &mut [Contact]) {
    contacts.sort_by(compare_contacts);
}

/// Groups contacts by last-name initial after sorting them.
///
/// Contacts with blank names are collected under `#`.
pub fn group_by_initial(contacts: &[Contact]) -> Vec<ContactGroup> {
    let mut sorted = contacts.to_vec();
    sort_contacts(&mut sorted);

    let mut groups: Vec<ContactGroup> = Vec::new();
    for contact in sorted {
        let letter = contact.group_letter().unwrap_or('#');
        match groups.last_mut() {
            Some(group) if group.letter == letter => group.contacts.push(contact),
            _ => groups.push(ContactGroup {
                letter,
                contacts: vec![contact],
            }),
        }
    }
    groups
}

fn compare_contacts(left: &Contact, right: &Contact) -> Ordering {
    sort_key(last_name(&left.name))
        .cmp(&sort_key(last_name(&right.name)))
        .then_with(|| sort_key(first_name(&left.name)).cmp(&sort_key(first_name(&right.name))))
}

fn sort_key(part: &str) -> String {
    part.chars().take(SORT_KEY_CHARS).collect::<String>().to_uppercase()
}

fn first_name(name: &str) -> &str {
    name.split_whitespace().next().unwrap_or("")
}

fn last_name(name: &str) -> &str {
    name.split_whitespace().last().unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::{
        derive_initials, group_by_initial, random_color, sort_contacts, Contact, ContactFields,
    };

    fn contact(name: &str) -> Contact {
        Contact::new(&ContactFields::new(name, "a@b.de", "1"))
    }

    #[test]
    fn initials_use_first_and_last_word() {
        assert_eq!(derive_initials("anna maria schmidt"), "AS");
        assert_eq!(derive_initials("  Bob  "), "B");
        assert_eq!(derive_initials(""), "");
    }

    #[test]
    fn random_color_is_six_hex_digits() {
        let color = random_color();
        assert_eq!(color.len(), 7);
        assert!(color.starts_with('#'));
        assert!(color[1..].chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn sort_uses_last_name_prefix_then_first_name() {
        let mut contacts = vec![
            contact("Zoe Miller"),
            contact("Anna Millerson"),
            contact("Carl Adams"),
        ];
        sort_contacts(&mut contacts);
        let names = contacts.iter().map(|c| c.name.as_str()).collect::<Vec<_>>();
        // "MIL" ties between Miller and Millerson, so first names decide.
        assert_eq!(names, vec!["Carl Adams", "Anna Millerson", "Zoe Miller"]);
    }

    #[test]
    fn sort_is_stable_for_equal_keys() {
        let first = contact("Tom Baker");
        let second = contact("Tomas Bakerly");
        let mut contacts = vec![first.clone(), second.clone()];
        sort_contacts(&mut contacts);
        assert_eq!(contacts[0].id, first.id);
        assert_eq!(contacts[1].id, second.id);
    }

    #[test]
    fn groups_follow_last_name_initial() {
        let groups = group_by_initial(&[
            contact("Ada Lovelace"),
            contact("Alan Turing"),
            contact("Linus Lee"),
        ]);
        let letters = groups.iter().map(|g| g.letter).collect::<Vec<_>>();
        assert_eq!(letters, vec!['L', 'T']);
        assert_eq!(groups[0].contacts.len(), 2);
    }

    #[test]
    fn validation_rejects_bad_email() {
        let fields = ContactFields::new("Ada", "not-an-email", "123");
        assert!(fields.validate().is_err());
        assert!(ContactFields::new("Ada", "ada@example.com", "123").validate().is_ok());
    }
}
