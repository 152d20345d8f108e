//! Attribute store
//!
//! Session-scoped visual attributes keyed by object handle. Missing records
//! read as all-unset; defaults are filled only when an object is emitted.

use std::collections::HashMap;

use rand::Rng;

use crate::types::{ObjectId, VisualAttributes, DEFAULT_SIZE};

/// Uniformly random point in the unit square
pub fn default_position<R: Rng + ?Sized>(rng: &mut R) -> (f64, f64) {
    (rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0))
}

/// Visual attributes for every object the session has configured or touched
#[derive(Debug, Clone, Default)]
pub struct AttributeStore {
    records: HashMap<ObjectId, VisualAttributes>,
}

impl AttributeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with externally configured overrides
    pub fn from_overrides<I>(overrides: I) -> Self
    where
        I: IntoIterator<Item = (ObjectId, VisualAttributes)>,
    {
        Self {
            records: overrides.into_iter().collect(),
        }
    }

    /// Stored attributes, or an all-unset record
    pub fn get(&self, id: ObjectId) -> VisualAttributes {
        self.records.get(&id).copied().unwrap_or_default()
    }

    /// Mark a container as expanded (idempotent)
    pub fn set_expanded(&mut self, id: ObjectId) {
        self.records.entry(id).or_default().expanded = true;
    }

    /// Clear a container's expanded flag
    pub fn set_collapsed(&mut self, id: ObjectId) {
        if let Some(record) = self.records.get_mut(&id) {
            record.expanded = false;
        }
    }

    /// Store a client-reported position and size
    pub fn set_pos_size(&mut self, id: ObjectId, pos: (f64, f64), size: (f64, f64)) {
        let record = self.records.entry(id).or_default();
        record.pos = Some(pos);
        record.size = Some(size);
    }

    /// Position and size to emit, filling unset values with defaults.
    ///
    /// A missing position draws a fresh random point on every call; it is not
    /// written back to the store.
    pub fn placement<R: Rng + ?Sized>(
        &self,
        id: ObjectId,
        rng: &mut R,
    ) -> ((f64, f64), (f64, f64)) {
        let attrs = self.get(id);
        let pos = match attrs.pos {
            Some(pos) => pos,
            None => default_position(rng),
        };
        (pos, attrs.size.unwrap_or(DEFAULT_SIZE))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
