//! Specialized collection types

use std::collections::HashMap;

pub use slotmap::{new_key_type, SlotMap};

/// Outcome of inserting into a [`NamedMap`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The name was new; the entry lives at this index
    Inserted(usize),
    /// The name already existed at this index; the new entry was dropped
    Duplicate(usize),
}

impl Insertion {
    /// Whether the entry was stored
    pub fn is_inserted(self) -> bool {
        matches!(self, Self::Inserted(_))
    }
}

/// Insertion-ordered map from unique names to values
///
/// The first value registered under a name wins; later inserts with the
/// same name are rejected and leave the original untouched. Iteration and
/// index lookups follow registration order, which is what the settings
/// record relies on to line values up with entries.
#[derive(Debug)]
pub struct NamedMap<T> {
    entries: Vec<(String, T)>,
    index: HashMap<String, usize>,
}

impl<T> NamedMap<T> {
    /// Create an empty map
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert `value` under `name` unless the name is already taken
    pub fn insert(&mut self, name: impl Into<String>, value: T) -> Insertion {
        let name = name.into();
        if let Some(&existing) = self.index.get(&name) {
            return Insertion::Duplicate(existing);
        }
        let position = self.entries.len();
        self.index.insert(name.clone(), position);
        self.entries.push((name, value));
        Insertion::Inserted(position)
    }

    /// Look up a value by name
    pub fn get(&self, name: &str) -> Option<&T> {
        self.index.get(name).map(|&i| &self.entries[i].1)
    }

    /// Look up a value by name for mutation
    pub fn get_mut(&mut self, name: &str) -> Option<&mut T> {
        let i = *self.index.get(name)?;
        Some(&mut self.entries[i].1)
    }

    /// Look up a value by registration index
    pub fn get_index(&self, index: usize) -> Option<&T> {
        self.entries.get(index).map(|(_, value)| value)
    }

    /// Look up a value by registration index for mutation
    pub fn get_index_mut(&mut self, index: usize) -> Option<&mut T> {
        self.entries.get_mut(index).map(|(_, value)| value)
    }

    /// Registration index of a name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Name stored at a registration index
    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|(name, _)| name.as_str())
    }

    /// Check whether a name is registered
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if the map is empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in registration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &T)> {
        self.entries.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate entries mutably in registration order
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&str, &mut T)> {
        self.entries.iter_mut().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterate names in registration order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(name, _)| name.as_str())
    }

    /// Remove every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.index.clear();
    }
}

impl<T> Default for NamedMap<T> {
    fn default() -> Self {
        Self::new()
    }
}
