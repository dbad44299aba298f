//! Ordered, identity-indexed collection of entities.
//!
//! The store is the only place the working order lives. Output pages are
//! emitted in exactly this order; nothing but [`OrderedStore::reorder`] and
//! [`OrderedStore::remove_by_id`] ever changes it.

use crate::model::{Entity, EntityId};

/// Ordered collection of entities with unique ids.
#[derive(Debug, Clone)]
pub struct OrderedStore<T> {
    items: Vec<T>,
}

impl<T> Default for OrderedStore<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> OrderedStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a batch to the tail, keeping the batch's relative order.
    pub fn append(&mut self, entities: impl IntoIterator<Item = T>) {
        self.items.extend(entities);
    }

    /// Remove the entry with this id.
    ///
    /// Returns the removed entity, or `None` when the id is not present.
    pub fn remove_by_id(&mut self, id: &EntityId) -> Option<T> {
        let index = self.position(id)?;
        Some(self.items.remove(index))
    }

    /// Move the entry identified by `source` into the slot currently held by
    /// `target`, shifting the entries in between by one.
    ///
    /// Returns `true` when the order changed.
    pub fn reorder(&mut self, source: &EntityId, target: &EntityId) -> bool {
        if source == target {
            return false;
        }

        let (Some(from), Some(to)) = (self.position(source), self.position(target)) else {
            return false;
        };

        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Remove every entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Index of the entry with this id.
    pub fn position(&self, id: &EntityId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Entry with this id.
    pub fn get(&self, id: &EntityId) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Entry at a 0-based position.
    pub fn at(&self, index: usize) -> Option<&T> {
        self.items.get(index)
    }

    /// Entries in collection order.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Ids in collection order.
    pub fn ids(&self) -> Vec<EntityId> {
        self.items.iter().map(|item| item.id().clone()).collect()
    }

    /// Copy of the current entries.
    ///
    /// Entities share their content buffers, so this is a cheap handle copy.
    pub fn snapshot(&self) -> Vec<T> {
        self.items.clone()
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'a, T: Entity> IntoIterator for &'a OrderedStore<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
