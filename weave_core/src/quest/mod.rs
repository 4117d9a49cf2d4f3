//! Quest data model - quests, their kinds and the per-tick contract.

mod hunt;
mod lifecycle;
mod model;

pub use hunt::*;
pub use lifecycle::*;
pub use model::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use tracing::warn;
use weave_world::{EntityHandle, EntityId, WorldModel, WorldModelAction};

/// Unique identifier for quests, assigned on registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct QuestId(pub u64);

impl QuestId {
    /// Sentinel for "not yet registered".
    pub const NONE: QuestId = QuestId(0);
}

impl std::fmt::Display for QuestId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Resolved template properties: property name to the entity filling it.
pub type QuestProperties = BTreeMap<String, EntityHandle>;

/// Kind-specific quest payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum QuestKind {
    /// No per-tick behaviour; the game drives the lifecycle.
    #[default]
    Plain,
    HuntAndKill(HuntAndKill),
    /// Behaviour supplied by a handler registered under `handler`.
    Custom {
        handler: String,
        entities: BTreeMap<String, EntityId>,
    },
}

/// Per-tick behaviour of a custom quest kind.
pub type TickFn = fn(&Quest, f32, &WorldModel) -> QuestTickResult;

/// Capability table for [`QuestKind::Custom`] quests.
#[derive(Clone, Default)]
pub struct TickHandlers {
    handlers: HashMap<String, TickFn>,
}

impl std::fmt::Debug for TickHandlers {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

impl TickHandlers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) the handler for `name`.
    pub fn register(&mut self, name: impl Into<String>, handler: TickFn) {
        self.handlers.insert(name.into(), handler);
    }

    pub fn get(&self, name: &str) -> Option<TickFn> {
        self.handlers.get(name).copied()
    }
}

/// A quest as held by the quest registry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quest {
    id: QuestId,
    /// Key of the template this quest came from.
    pub quest_type: String,
    pub title: String,
    pub description: String,
    pub story: String,
    state: QuestState,
    pub kind: QuestKind,
}

impl Quest {
    pub fn new(quest_type: impl Into<String>, title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            id: QuestId::NONE,
            quest_type: quest_type.into(),
            title: title.into(),
            description: description.into(),
            story: String::new(),
            state: QuestState::Inactive,
            kind: QuestKind::Plain,
        }
    }

    pub fn with_story(mut self, story: impl Into<String>) -> Self {
        self.story = story.into();
        self
    }

    pub fn with_kind(mut self, kind: QuestKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn id(&self) -> QuestId {
        self.id
    }

    pub fn state(&self) -> QuestState {
        self.state
    }

    /// World changes and lifecycle change for one tick of this quest.
    pub fn tick(&self, delta: f32, world: &WorldModel, handlers: &TickHandlers) -> QuestTickResult {
        match &self.kind {
            QuestKind::Plain => QuestTickResult::keep(self.id),
            QuestKind::HuntAndKill(hunt) => hunt.tick(self.id, delta, world),
            QuestKind::Custom { handler, .. } => match handlers.get(handler) {
                Some(tick) => tick(self, delta, world),
                None => {
                    warn!(quest_id = %self.id, handler = %handler, "no tick handler registered");
                    QuestTickResult::keep(self.id)
                }
            },
        }
    }
}

/// Result of ticking a quest. World changes are applied before the quest change.
#[derive(Debug, Clone)]
pub struct QuestTickResult {
    world_changes: Vec<WorldModelAction>,
    quest_change: QuestModelAction,
}

impl QuestTickResult {
    pub fn new(world_changes: Vec<WorldModelAction>, quest_change: QuestModelAction) -> Self {
        Self {
            world_changes,
            quest_change,
        }
    }

    /// Nothing happens this tick.
    pub fn keep(quest_id: QuestId) -> Self {
        Self::new(Vec::new(), QuestModelAction::keep(quest_id))
    }

    pub fn world_changes(&self) -> &[WorldModelAction] {
        &self.world_changes
    }

    pub fn quest_change(&self) -> QuestModelAction {
        self.quest_change
    }
}
