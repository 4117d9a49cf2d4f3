//! Story templates with entity conditions.

use serde::{Deserialize, Serialize};
use tracing::debug;
use weave_world::{EntityHandle, MetaData, WorldModel, WorldModelAction};

use super::{StoryError, StoryRequest, StoryResult, StoryWriter};
use crate::random::RandomSource;

/// Condition an entity must meet to appear in a story.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoryCondition {
    /// Each entity takes part in this story at most once.
    OncePerEntity,
    WithProperty(String),
    WithoutProperty(String),
    GreaterThan(String, i32),
    SmallerThan(String, i32),
}

impl StoryCondition {
    fn accepts(&self, metadata: &MetaData, marker: &str) -> bool {
        match self {
            StoryCondition::OncePerEntity => !metadata.has_value(marker),
            StoryCondition::WithProperty(key) => metadata.has_value(key),
            StoryCondition::WithoutProperty(key) => !metadata.has_value(key),
            StoryCondition::GreaterThan(key, value) => metadata.has_value(key) && metadata.get_value(key) > *value,
            StoryCondition::SmallerThan(key, value) => metadata.has_value(key) && metadata.get_value(key) < *value,
        }
    }
}

/// A story line with `{1}`, `{2}`... tokens, one per required entity type.
#[derive(Debug, Clone, PartialEq)]
pub struct StoryTemplate {
    key: String,
    required_types: Vec<String>,
    conditions: Vec<StoryCondition>,
    text: String,
}

impl StoryTemplate {
    pub fn new(key: impl Into<String>, required_types: Vec<String>, text: impl Into<String>) -> Result<Self, StoryError> {
        let key = key.into();
        if required_types.is_empty() {
            return Err(StoryError::NoRequiredEntities(key));
        }
        Ok(Self {
            key,
            required_types,
            conditions: Vec::new(),
            text: text.into(),
        })
    }

    pub fn with_condition(mut self, condition: StoryCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    /// Metadata key marking entities used by a once-per-entity story.
    pub fn marker(&self) -> String {
        format!("story.{}", self.key)
    }

    /// Valid entities for each required type, or `None` if a type has none.
    fn valid_entities(&self, request: &StoryRequest<'_>, world: &WorldModel) -> Option<Vec<Vec<EntityHandle>>> {
        let marker = self.marker();
        let mut result = Vec::with_capacity(self.required_types.len());

        for entity_type in &self.required_types {
            let valid: Vec<EntityHandle> = request
                .properties
                .values()
                .filter(|entity| entity.id().is_set() && entity.entity_type() == *entity_type)
                .filter(|entity| {
                    let metadata = world.metadata(entity.id());
                    self.conditions.iter().all(|c| c.accepts(&metadata, &marker))
                })
                .cloned()
                .collect();
            if valid.is_empty() {
                return None;
            }
            result.push(valid);
        }
        Some(result)
    }

    pub fn is_valid(&self, request: &StoryRequest<'_>, world: &WorldModel) -> bool {
        self.valid_entities(request, world).is_some()
    }

    /// Fill the template with one random valid entity per required type.
    pub fn create_story(&self, request: &StoryRequest<'_>, world: &WorldModel, rs: &mut dyn RandomSource) -> StoryResult {
        let Some(candidates) = self.valid_entities(request, world) else {
            return StoryResult::default();
        };

        let once = self.conditions.contains(&StoryCondition::OncePerEntity);
        let marker = self.marker();
        let mut result = StoryResult {
            text: self.text.clone(),
            world_actions: Vec::new(),
        };

        for (index, valid) in candidates.iter().enumerate() {
            let entity = &valid[rs.uniform_index(valid.len())];
            let label = {
                let entity = entity.borrow();
                entity.name().map(str::to_string).unwrap_or_else(|| format!("#{}", entity.id()))
            };
            result.text = result.text.replace(&format!("{{{}}}", index + 1), &label);

            if once {
                result
                    .world_actions
                    .push(WorldModelAction::update(entity.clone(), MetaData::single(marker.clone(), 1)));
            }
        }
        result
    }
}

/// Story writer choosing uniformly among the story templates that fit.
#[derive(Debug, Clone, Default)]
pub struct TemplateStoryWriter {
    templates: Vec<StoryTemplate>,
}

impl TemplateStoryWriter {
    pub fn new(templates: Vec<StoryTemplate>) -> Self {
        Self { templates }
    }

    pub fn add_template(&mut self, template: StoryTemplate) {
        self.templates.push(template);
    }
}

impl StoryWriter for TemplateStoryWriter {
    fn write_story(&self, request: &StoryRequest<'_>, world: &WorldModel, rs: &mut dyn RandomSource) -> StoryResult {
        let valid: Vec<&StoryTemplate> = self.templates.iter().filter(|t| t.is_valid(request, world)).collect();
        if valid.is_empty() {
            debug!(quest_type = request.quest_type, "no story template fits");
            return StoryResult::default();
        }
        let chosen = valid[rs.uniform_index(valid.len())];
        debug!(quest_type = request.quest_type, story = chosen.key(), "writing story");
        chosen.create_story(request, world, rs)
    }
}
