//! Family members and their directional relations.

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// The sentinel subject every family tree is drawn around.
pub const MY_NAME: &str = "Me";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("person name must not be empty")]
pub struct EmptyNameError;

/// A person's display name, used as their identifier within a family tree.
///
/// Guaranteed non-empty after trimming. Comparison is exact and case-sensitive.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PersonName(String);

impl PersonName {
    pub fn new(value: impl Into<String>) -> Result<Self, EmptyNameError> {
        let value = value.into();
        if value.trim().is_empty() {
            Err(EmptyNameError)
        } else {
            Ok(Self(value))
        }
    }

    #[must_use]
    pub fn me() -> Self {
        Self(MY_NAME.to_string())
    }

    #[must_use]
    pub fn is_me(&self) -> bool {
        self.0 == MY_NAME
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PersonName {
    type Error = EmptyNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl TryFrom<&str> for PersonName {
    type Error = EmptyNameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PersonName> for String {
    fn from(value: PersonName) -> Self {
        value.0
    }
}

impl AsRef<str> for PersonName {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl PartialEq<str> for PersonName {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for PersonName {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

impl fmt::Display for PersonName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Names a person is related to, in the order they were selected.
///
/// Relations are directional: listing `Child` here does not add anything to `Child`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RelationSet(Vec<PersonName>);

impl RelationSet {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `name` unless already present. Returns whether it was added.
    pub fn insert(&mut self, name: PersonName) -> bool {
        if self.contains(name.as_str()) {
            return false;
        }
        self.0.push(name);
        true
    }

    /// Selects `name` if unselected, otherwise deselects it.
    pub fn toggle(&mut self, name: PersonName) {
        if let Some(pos) = self.0.iter().position(|n| *n == name) {
            self.0.remove(pos);
        } else {
            self.0.push(name);
        }
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.iter().any(|n| n.as_str() == name)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PersonName> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<PersonName> for RelationSet {
    fn from_iter<I: IntoIterator<Item = PersonName>>(iter: I) -> Self {
        let mut set = Self::new();
        for name in iter {
            set.insert(name);
        }
        set
    }
}

impl<'a> IntoIterator for &'a RelationSet {
    type Item = &'a PersonName;
    type IntoIter = std::slice::Iter<'a, PersonName>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub name: PersonName,
    pub relations: RelationSet,
}

impl Person {
    #[must_use]
    pub fn new(name: PersonName, relations: RelationSet) -> Self {
        Self { name, relations }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyError {
    #[error("{0} is already in the family tree")]
    DuplicateName(PersonName),
    #[error("{person} cannot be related to unknown member {relation}")]
    UnknownRelation {
        person: PersonName,
        relation: PersonName,
    },
}
