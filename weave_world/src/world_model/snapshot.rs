//! Plain data-transfer form of a world model, for save and resume.

use serde::{Deserialize, Serialize};

use super::{EntityRegistry, WorldModel};
use crate::actions::ActionRecord;
use crate::entities::{EntityHandle, MetadataStore, WorldEntity};

/// Everything needed to rebuild a [`WorldModel`] exactly.
///
/// Listeners are not part of the snapshot and must be registered again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Last identity handed out.
    pub last_id: u64,
    /// Live entities in identity order.
    pub entities: Vec<WorldEntity>,
    /// Metadata, including tombstones of deleted entities.
    pub metadata: MetadataStore,
    pub history: Vec<ActionRecord>,
}

impl WorldModel {
    /// Capture the current state as plain data.
    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot {
            last_id: self.registry.last_id(),
            entities: self.registry.iter().map(EntityHandle::snapshot).collect(),
            metadata: self.metadata.clone(),
            history: self.history.clone(),
        }
    }

    /// Rebuild a world from a snapshot.
    pub fn from_snapshot(snapshot: WorldSnapshot) -> Self {
        let registry = EntityRegistry::restore(
            snapshot.last_id,
            snapshot.entities.into_iter().map(EntityHandle::new),
        );
        Self {
            registry,
            metadata: snapshot.metadata,
            history: snapshot.history,
            ..Self::default()
        }
    }

    /// Replace the whole state with `snapshot`, keeping registered listeners.
    pub fn restore(&mut self, snapshot: WorldSnapshot) {
        let listeners = std::mem::take(&mut self.listeners);
        *self = Self::from_snapshot(snapshot);
        self.listeners = listeners;
    }
}
