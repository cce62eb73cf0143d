//! In-memory family tree.
//!
//! The tree is an append-only list of [`Person`] entries around the implicit
//! subject `"Me"`. Relations are plain names resolved against the store only
//! when [`RelationPolicy::Strict`] is in effect.

use clara_types::{FamilyError, Person, PersonName, RelationSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RelationPolicy {
    /// Accept any relation name.
    #[default]
    Unchecked,
    /// Every relation must be `"Me"` or a member already in the tree.
    Strict,
}

#[derive(Debug, Clone, Default)]
pub struct FamilyTree {
    members: Vec<Person>,
    policy: RelationPolicy,
}

impl FamilyTree {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_policy(policy: RelationPolicy) -> Self {
        Self {
            members: Vec::new(),
            policy,
        }
    }

    /// The default household: Mom, Dad, Spouse and Child.
    #[must_use]
    pub fn seeded(policy: RelationPolicy) -> Self {
        let mut tree = Self::with_policy(policy);
        for (name, relations) in [
            ("Mom", &["Me"][..]),
            ("Dad", &["Me"][..]),
            ("Spouse", &[][..]),
            ("Child", &["Me", "Spouse"][..]),
        ] {
            let relations = relations
                .iter()
                .filter_map(|r| PersonName::new(*r).ok())
                .collect();
            if let Ok(name) = PersonName::new(name) {
                tree.members.push(Person::new(name, relations));
            }
        }
        tree
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        name == clara_types::MY_NAME || self.get(name).is_some()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Person> {
        self.members.iter().find(|p| p.name == name)
    }

    /// Appends a new person. On error the tree is left unchanged.
    pub fn add_person(
        &mut self,
        name: PersonName,
        relations: RelationSet,
    ) -> Result<(), FamilyError> {
        if self.contains(name.as_str()) {
            return Err(FamilyError::DuplicateName(name));
        }

        if self.policy == RelationPolicy::Strict
            && let Some(unknown) = relations.iter().find(|r| !self.contains(r.as_str()))
        {
            return Err(FamilyError::UnknownRelation {
                person: name,
                relation: unknown.clone(),
            });
        }

        tracing::debug!(name = %name, relations = relations.len(), "Adding family member");
        self.members.push(Person::new(name, relations));
        Ok(())
    }

    /// `"Me"` followed by every member in insertion order.
    #[must_use]
    pub fn list_members(&self) -> Vec<&str> {
        std::iter::once(clara_types::MY_NAME)
            .chain(self.members.iter().map(|p| p.name.as_str()))
            .collect()
    }

    /// Members whose relations include `relation`, in insertion order.
    #[must_use]
    pub fn children_of(&self, relation: &str) -> Vec<&Person> {
        self.members
            .iter()
            .filter(|p| p.relations.contains(relation))
            .collect()
    }

    /// Like [`children_of`](Self::children_of), paired with each member's store index.
    pub fn indexed_children_of<'a>(
        &'a self,
        relation: &'a str,
    ) -> impl Iterator<Item = (usize, &'a Person)> + 'a {
        self.members
            .iter()
            .enumerate()
            .filter(move |(_, p)| p.relations.contains(relation))
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Person> {
        self.members.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}
