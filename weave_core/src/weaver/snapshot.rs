//! Save and resume for the weaver's state.

use serde::{Deserialize, Serialize};
use weave_world::WorldSnapshot;

use super::QuestWeaver;
use crate::error::WeaverError;
use crate::quest::QuestModel;
use crate::random::RandomStream;

/// Random stream position, world and quest registry.
///
/// Factories, the story writer, tick handlers and world listeners are code,
/// not state; they stay with the weaver a snapshot is restored into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaverSnapshot {
    pub random: RandomStream,
    pub world: WorldSnapshot,
    pub quests: QuestModel,
}

impl WeaverSnapshot {
    pub fn to_json(&self) -> Result<String, WeaverError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(source: &str) -> Result<Self, WeaverError> {
        Ok(serde_json::from_str(source)?)
    }
}

impl QuestWeaver {
    pub fn snapshot(&self) -> WeaverSnapshot {
        WeaverSnapshot {
            random: self.random.clone(),
            world: self.world.snapshot(),
            quests: self.quests.clone(),
        }
    }

    /// Replace the current state with `snapshot`.
    pub fn restore(&mut self, snapshot: WeaverSnapshot) {
        self.random = snapshot.random;
        self.world.restore(snapshot.world);
        self.quests = snapshot.quests;
    }
}
