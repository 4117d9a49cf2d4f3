//! Quest registry - owns every quest and applies lifecycle actions.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::{info, warn};
use weave_world::EntityId;

use super::{Quest, QuestActionType, QuestId, QuestModelAction, QuestProperties, QuestState};

/// All quests, keyed by identity, with the entities that filled their properties.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuestModel {
    last_id: u64,
    quests: BTreeMap<QuestId, Quest>,
    properties: BTreeMap<QuestId, BTreeMap<String, EntityId>>,
}

impl QuestModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly created quest. It gets a new identity and starts
    /// out [`QuestState::Inactive`].
    pub fn register_new(&mut self, mut quest: Quest, properties: &QuestProperties) -> QuestId {
        self.last_id += 1;
        let id = QuestId(self.last_id);
        quest.id = id;
        quest.state = QuestState::Inactive;

        let resolved = properties
            .iter()
            .map(|(name, entity)| (name.clone(), entity.id()))
            .collect();
        self.properties.insert(id, resolved);

        info!(quest_id = %id, quest_type = %quest.quest_type, title = %quest.title, "registered quest");
        self.quests.insert(id, quest);
        id
    }

    /// Apply a lifecycle action. Returns the quest after the change, or
    /// `None` if no quest has that identity.
    pub fn execute(&mut self, action: QuestModelAction) -> Option<&Quest> {
        let Some(quest) = self.quests.get_mut(&action.quest_id) else {
            warn!(quest_id = %action.quest_id, "lifecycle action for unknown quest");
            return None;
        };

        let previous = quest.state;
        quest.state = previous.apply(action.action_type);
        if quest.state != previous {
            info!(quest_id = %quest.id, from = ?previous, to = ?quest.state, "quest state changed");
        } else if action.action_type != QuestActionType::Keep {
            warn!(quest_id = %quest.id, state = ?previous, action = ?action.action_type, "ignored lifecycle action");
        }
        Some(quest)
    }

    pub fn get_quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get(&id)
    }

    /// All quests in identity order.
    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.values()
    }

    pub fn quests_with_state(&self, state: QuestState) -> Vec<&Quest> {
        self.quests.values().filter(|q| q.state == state).collect()
    }

    /// Number of quests created from the given template key.
    pub fn count_of_type(&self, quest_type: &str) -> usize {
        self.quests.values().filter(|q| q.quest_type == quest_type).count()
    }

    /// Entity identities that filled the properties of a quest.
    pub fn quest_properties(&self, id: QuestId) -> Option<&BTreeMap<String, EntityId>> {
        self.properties.get(&id)
    }

    pub fn len(&self) -> usize {
        self.quests.len()
    }

    pub fn is_empty(&self) -> bool {
        self.quests.is_empty()
    }
}
