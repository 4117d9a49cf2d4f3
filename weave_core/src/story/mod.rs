//! Story collaborators - narrative text for committed quests.

mod simple;

pub use simple::*;

use thiserror::Error;
use weave_world::{WorldModel, WorldModelAction};

use crate::quest::QuestProperties;
use crate::random::RandomSource;

/// What a story writer gets to work with.
#[derive(Debug, Clone, Copy)]
pub struct StoryRequest<'a> {
    pub quest_type: &'a str,
    /// Properties of the committed quest; entities carry their final identities.
    pub properties: &'a QuestProperties,
}

/// Narrative text plus any world changes the story implies.
#[derive(Debug, Clone, Default)]
pub struct StoryResult {
    pub text: String,
    pub world_actions: Vec<WorldModelAction>,
}

/// Produces narrative text for a quest.
pub trait StoryWriter {
    /// An empty result means no story fits; that is not an error.
    fn write_story(&self, request: &StoryRequest<'_>, world: &WorldModel, rs: &mut dyn RandomSource) -> StoryResult;
}

/// Invalid story template definitions.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoryError {
    #[error("story template '{0}' has no required entities")]
    NoRequiredEntities(String),
}
