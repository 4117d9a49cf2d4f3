//! Hunt-and-kill quests: track a target until it is destroyed.

use serde::{Deserialize, Serialize};
use weave_world::{EntityId, MetaData, WorldModel, WorldModelAction};

use super::{QuestActionType, QuestId, QuestModelAction, QuestTickResult};

/// Metadata keys shared between quests and the world.
pub mod markers {
    /// Non-zero once an entity has been destroyed.
    pub const DESTROYED: &str = "Destroyed";
    /// Identity of the location an entity currently is at.
    pub const CURRENT_LOCATION: &str = "CurrentLocation";
    /// Standing of an agent towards the player, capped at 100.
    pub const RELATION_TO_PLAYER: &str = "RelationToPlayer";
}

const RELATION_GAIN: i32 = 20;
const MAX_RELATION: i32 = 100;

/// Payload of a hunt-and-kill quest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HuntAndKill {
    pub target: EntityId,
    pub location: EntityId,
    pub sponsor: Option<EntityId>,
}

impl HuntAndKill {
    /// Succeed once the target is destroyed, rewarding the sponsor; until
    /// then keep the live target at the quest location.
    pub fn tick(&self, quest_id: QuestId, _delta: f32, world: &WorldModel) -> QuestTickResult {
        let target_data = world.metadata(self.target);
        let mut changes = Vec::new();

        if target_data.get_value(markers::DESTROYED) != 0 {
            if let Some(sponsor) = self.sponsor {
                if let Ok(action) = world.change_metadata(sponsor, markers::RELATION_TO_PLAYER, |old| {
                    (old + RELATION_GAIN).min(MAX_RELATION)
                }) {
                    changes.push(action);
                }
            }
            return QuestTickResult::new(changes, QuestModelAction::new(QuestActionType::Succeed, quest_id));
        }

        let location = i32::try_from(self.location.0).unwrap_or(i32::MAX);
        if let Some(target) = world.entity(self.target) {
            if target_data.get_value(markers::CURRENT_LOCATION) != location {
                changes.push(WorldModelAction::update(
                    target,
                    MetaData::single(markers::CURRENT_LOCATION, location),
                ));
            }
        }
        QuestTickResult::new(changes, QuestModelAction::keep(quest_id))
    }
}
