//! Per-entity metadata: string keys mapped to integer values.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::EntityId;

/// Integer values attached to an entity, keyed by name.
///
/// Missing keys read as `0`; reading never inserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetaData {
    values: BTreeMap<String, i32>,
}

impl MetaData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Metadata with a single key set.
    pub fn single(key: impl Into<String>, value: i32) -> Self {
        let mut data = Self::new();
        data.set_value(key, value);
        data
    }

    /// Builder-style setter.
    pub fn with_value(mut self, key: impl Into<String>, value: i32) -> Self {
        self.set_value(key, value);
        self
    }

    pub fn set_value(&mut self, key: impl Into<String>, value: i32) {
        self.values.insert(key.into(), value);
    }

    /// Value for `key`, or `0` when absent.
    pub fn get_value(&self, key: &str) -> i32 {
        self.values.get(key).copied().unwrap_or(0)
    }

    pub fn has_value(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// All key names in sorted order.
    pub fn value_names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Merge `delta` into this metadata. Keys in the delta overwrite, all
    /// other keys are left untouched.
    pub fn merge(&mut self, delta: &MetaData) {
        for (key, value) in &delta.values {
            self.values.insert(key.clone(), *value);
        }
    }
}

/// Metadata for every entity identity the world has ever assigned.
///
/// Entries outlive their entity: deleting an entity leaves its metadata in
/// place so historical queries by the old identity still resolve.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct MetadataStore {
    entries: BTreeMap<EntityId, MetaData>,
}

impl MetadataStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Detached copy of the metadata for `id` (empty if none was stored).
    pub fn get(&self, id: EntityId) -> MetaData {
        self.entries.get(&id).cloned().unwrap_or_default()
    }

    /// Merge a delta into the stored metadata of `id`.
    pub fn merge(&mut self, id: EntityId, delta: &MetaData) {
        self.entries.entry(id).or_default().merge(delta);
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&EntityId, &MetaData)> {
        self.entries.iter()
    }
}

impl FromIterator<(EntityId, MetaData)> for MetadataStore {
    fn from_iter<I: IntoIterator<Item = (EntityId, MetaData)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
