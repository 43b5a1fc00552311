//! `EntityStore`: every resource observed since the page loaded.
//!
//! The store only grows. Nothing is ever removed or edited after insertion,
//! and iteration order is arrival order across and within frames. The frame
//! observer appends and the redraw hook reads; both run on the same event
//! loop, so the shared handle needs no locking.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

use crate::types::{Category, EntityDescriptor};

pub type SharedStore = Rc<RefCell<EntityStore>>;

#[derive(Debug, Default)]
pub struct EntityStore {
    entities: Vec<EntityDescriptor>,
}

impl EntityStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn into_shared(self) -> SharedStore {
        Rc::new(RefCell::new(self))
    }

    pub fn append(&mut self, entity: EntityDescriptor) {
        self.entities.push(entity);
    }

    pub fn extend<I>(&mut self, entities: I)
    where
        I: IntoIterator<Item = EntityDescriptor>,
    {
        self.entities.extend(entities);
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&EntityDescriptor> {
        self.entities.get(index)
    }

    /// Entities in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, EntityDescriptor> {
        self.entities.iter()
    }

    /// How many stored entities fall in each category.
    pub fn count_by_category(&self) -> BTreeMap<Category, usize> {
        let mut counts = BTreeMap::new();
        for e in &self.entities {
            *counts.entry(e.category).or_insert(0) += 1;
        }
        counts
    }
}

impl<'a> IntoIterator for &'a EntityStore {
    type Item = &'a EntityDescriptor;
    type IntoIter = std::slice::Iter<'a, EntityDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
