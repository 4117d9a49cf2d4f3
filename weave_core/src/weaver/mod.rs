//! The quest weaver - ties world, quests, templates and stories together.
//!
//! One generation cycle (`create_new_quests`):
//! 1. Every registered factory offers templates for the current world
//! 2. Each template is resolved into a candidate via its property graph
//! 3. The selector picks the priority candidates, or at most one scored one
//! 4. Each chosen candidate is committed: world actions, then the story and
//!    its world actions, then the quest is registered
//!
//! All randomness comes from the weaver's own [`RandomStream`], so a given
//! seed and world always produce the same quests.

mod snapshot;

pub use snapshot::*;

use tracing::{debug, info};
use weave_world::{WorldModel, WorldModelAction};

use crate::config::WeaverConfig;
use crate::error::WeaverError;
use crate::quest::{Quest, QuestActionType, QuestId, QuestModel, QuestModelAction, QuestState, TickFn, TickHandlers};
use crate::random::RandomStream;
use crate::selection::{CandidateSelector, QuestCandidate};
use crate::story::{StoryRequest, StoryWriter, TemplateStoryWriter};
use crate::template::TemplateFactory;

/// Builder for [`QuestWeaver`].
pub struct WeaverBuilder {
    config: WeaverConfig,
    world: Option<WorldModel>,
    story_writer: Option<Box<dyn StoryWriter>>,
    factories: Vec<Box<dyn TemplateFactory>>,
}

impl WeaverBuilder {
    pub fn new(config: WeaverConfig) -> Self {
        Self {
            config,
            world: None,
            story_writer: None,
            factories: Vec::new(),
        }
    }

    pub fn world(mut self, world: WorldModel) -> Self {
        self.world = Some(world);
        self
    }

    pub fn story_writer(mut self, writer: impl StoryWriter + 'static) -> Self {
        self.story_writer = Some(Box::new(writer));
        self
    }

    /// Add a template factory. May be called several times.
    pub fn template_factory(mut self, factory: impl TemplateFactory + 'static) -> Self {
        self.factories.push(Box::new(factory));
        self
    }

    pub fn build(self) -> Result<QuestWeaver, WeaverError> {
        self.config.validate()?;
        let world = self.world.ok_or(WeaverError::MissingWorldModel)?;
        let story_writer = self
            .story_writer
            .unwrap_or_else(|| Box::new(TemplateStoryWriter::default()));

        Ok(QuestWeaver {
            random: RandomStream::new(self.config.seed),
            selector: CandidateSelector::new(self.config.selection),
            config: self.config,
            world,
            quests: QuestModel::new(),
            story_writer,
            factories: self.factories,
            tick_handlers: TickHandlers::new(),
        })
    }
}

/// Generates quests against a world and advances them over time.
pub struct QuestWeaver {
    config: WeaverConfig,
    random: RandomStream,
    selector: CandidateSelector,
    world: WorldModel,
    quests: QuestModel,
    story_writer: Box<dyn StoryWriter>,
    factories: Vec<Box<dyn TemplateFactory>>,
    tick_handlers: TickHandlers,
}

impl QuestWeaver {
    pub fn builder(config: WeaverConfig) -> WeaverBuilder {
        WeaverBuilder::new(config)
    }

    /// Run one generation cycle. Returns the ids of the quests created; an
    /// empty list means nothing fit this cycle.
    pub fn create_new_quests(&mut self) -> Vec<QuestId> {
        let mut templates = Vec::new();
        for factory in &self.factories {
            templates.extend(factory.create_templates(&self.world, &self.quests, &mut self.random));
        }
        debug!(templates = templates.len(), "collected quest templates");

        let candidates = self
            .selector
            .build_candidates(templates, &self.world, &self.quests, &mut self.random);
        let chosen = self.selector.select(candidates, &self.quests, &mut self.random);

        chosen.into_iter().map(|candidate| self.commit(candidate)).collect()
    }

    fn commit(&mut self, candidate: QuestCandidate) -> QuestId {
        self.world.execute(&candidate.actions);

        let request = StoryRequest {
            quest_type: candidate.template.key(),
            properties: &candidate.properties,
        };
        let story = self.story_writer.write_story(&request, &self.world, &mut self.random);
        if !story.world_actions.is_empty() {
            self.world.execute(&story.world_actions);
        }

        let quest = candidate.template.to_quest(&candidate.properties, &story.text);
        let id = self.quests.register_new(quest, &candidate.properties);
        info!(quest_id = %id, template = candidate.template.key(), score = candidate.score, "committed quest");
        id
    }

    /// Advance every active quest by `delta`, in identity order.
    ///
    /// Each quest's world changes are applied before its lifecycle change.
    /// Returns the quests whose state changed.
    pub fn tick(&mut self, delta: f32) -> Vec<QuestId> {
        let active: Vec<QuestId> = self
            .quests
            .quests_with_state(QuestState::Active)
            .into_iter()
            .map(Quest::id)
            .collect();

        let mut changed = Vec::new();
        for id in active {
            let Some(quest) = self.quests.get_quest(id) else {
                continue;
            };
            let result = quest.tick(delta, &self.world, &self.tick_handlers);

            let world_changes: &[WorldModelAction] = result.world_changes();
            if !world_changes.is_empty() {
                self.world.execute(world_changes);
            }
            if self.apply_lifecycle(result.quest_change()).is_some() {
                changed.push(id);
            }
        }
        changed
    }

    /// Apply a lifecycle action on behalf of the game. Returns the new state,
    /// or `None` for an unknown quest.
    pub fn change_quest_state(&mut self, id: QuestId, action: QuestActionType) -> Option<QuestState> {
        self.quests
            .execute(QuestModelAction::new(action, id))
            .map(Quest::state)
    }

    /// `Some(new_state)` when the action changed the quest's state.
    fn apply_lifecycle(&mut self, action: QuestModelAction) -> Option<QuestState> {
        let before = self.quests.get_quest(action.quest_id)?.state();
        let after = self.quests.execute(action)?.state();
        (after != before).then_some(after)
    }

    pub fn get_quest(&self, id: QuestId) -> Option<&Quest> {
        self.quests.get_quest(id)
    }

    pub fn quests(&self) -> impl Iterator<Item = &Quest> {
        self.quests.quests()
    }

    pub fn quests_with_state(&self, state: QuestState) -> Vec<&Quest> {
        self.quests.quests_with_state(state)
    }

    pub fn quests_model(&self) -> &QuestModel {
        &self.quests
    }

    pub fn register_template_factory(&mut self, factory: impl TemplateFactory + 'static) {
        self.factories.push(Box::new(factory));
    }

    /// Register the tick behaviour for [`crate::quest::QuestKind::Custom`]
    /// quests naming `handler`.
    pub fn register_tick_handler(&mut self, handler: impl Into<String>, tick: TickFn) {
        self.tick_handlers.register(handler, tick);
    }

    pub fn world(&self) -> &WorldModel {
        &self.world
    }

    pub fn world_mut(&mut self) -> &mut WorldModel {
        &mut self.world
    }

    pub fn config(&self) -> &WeaverConfig {
        &self.config
    }
}

impl std::fmt::Debug for QuestWeaver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestWeaver")
            .field("config", &self.config)
            .field("world", &self.world)
            .field("quests", &self.quests.len())
            .field("factories", &self.factories.len())
            .field("tick_handlers", &self.tick_handlers)
            .finish()
    }
}
