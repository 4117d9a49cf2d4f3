//! Owner of live entities, keyed by identity.

use std::collections::BTreeMap;

use crate::entities::{EntityHandle, EntityId};

/// Live entities by identity, plus the monotonic identity counter.
#[derive(Debug, Default)]
pub struct EntityRegistry {
    last_id: u64,
    entities: BTreeMap<EntityId, EntityHandle>,
}

impl EntityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuild a registry from previously committed entities.
    pub(crate) fn restore(last_id: u64, entities: impl IntoIterator<Item = EntityHandle>) -> Self {
        Self {
            last_id,
            entities: entities.into_iter().map(|handle| (handle.id(), handle)).collect(),
        }
    }

    /// Hand out the next unused identity.
    pub fn next_id(&mut self) -> EntityId {
        self.last_id += 1;
        EntityId(self.last_id)
    }

    pub fn last_id(&self) -> u64 {
        self.last_id
    }

    /// Whether `id` was handed out by this registry at some point.
    pub fn was_assigned(&self, id: EntityId) -> bool {
        id.is_set() && id.0 <= self.last_id
    }

    pub fn insert(&mut self, handle: EntityHandle) {
        self.entities.insert(handle.id(), handle);
    }

    pub fn remove(&mut self, id: EntityId) -> Option<EntityHandle> {
        self.entities.remove(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&EntityHandle> {
        if !id.is_set() {
            return None;
        }
        self.entities.get(&id)
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.get(id).is_some()
    }

    /// Live entities in identity order.
    pub fn iter(&self) -> impl Iterator<Item = &EntityHandle> {
        self.entities.values()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}
