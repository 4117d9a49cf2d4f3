//! Data-driven templates and a factory serving a fixed set of them.

use serde::{Deserialize, Serialize};
use weave_world::{MetaData, WorldEntity, WorldModel, WorldModelAction};

use super::{existing_entity_node, new_entity_node, QuestTemplate, TemplateFactory};
use crate::graph::{ConstraintGraph, GraphSolver};
use crate::quest::{Quest, QuestModel, QuestProperties};
use crate::random::RandomSource;

/// One property of a [`SimpleQuestTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemplateProperty {
    pub name: String,
    /// Type tag of the entities that may fill this property.
    pub entity_type: String,
    #[serde(default = "default_mandatory")]
    pub mandatory: bool,
    /// Prototype for a new entity, offered next to the existing ones.
    #[serde(default)]
    pub create: Option<WorldEntity>,
    /// Metadata given to a newly created entity.
    #[serde(default)]
    pub create_metadata: MetaData,
}

fn default_mandatory() -> bool {
    true
}

impl TemplateProperty {
    pub fn new(name: impl Into<String>, entity_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            entity_type: entity_type.into(),
            mandatory: true,
            create: None,
            create_metadata: MetaData::new(),
        }
    }

    pub fn optional(mut self) -> Self {
        self.mandatory = false;
        self
    }

    /// Also offer a freshly created entity for this property.
    pub fn or_create(mut self, prototype: WorldEntity, metadata: MetaData) -> Self {
        self.create = Some(prototype);
        self.create_metadata = metadata;
        self
    }
}

/// A template described entirely by data.
///
/// `{property}` placeholders in title and description are replaced by the
/// name of the entity that filled the property. Optional properties are filled
/// whenever a matching entity exists; placeholders of unfilled ones are
/// removed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimpleQuestTemplate {
    pub key: String,
    pub title: String,
    pub description: String,
    pub rarity: i64,
    #[serde(default)]
    pub priority: bool,
    #[serde(default)]
    pub properties: Vec<TemplateProperty>,
}

impl SimpleQuestTemplate {
    pub fn new(key: impl Into<String>, title: impl Into<String>, description: impl Into<String>, rarity: i64) -> Self {
        Self {
            key: key.into(),
            title: title.into(),
            description: description.into(),
            rarity,
            priority: false,
            properties: Vec::new(),
        }
    }

    pub fn with_property(mut self, property: TemplateProperty) -> Self {
        self.properties.push(property);
        self
    }

    pub fn with_priority(mut self, priority: bool) -> Self {
        self.priority = priority;
        self
    }

    fn fill(&self, text: &str, properties: &QuestProperties) -> String {
        let mut filled = text.to_string();
        for (name, entity) in properties {
            let placeholder = format!("{{{}}}", name);
            let label = {
                let entity = entity.borrow();
                entity.name().map(str::to_string).unwrap_or_else(|| format!("#{}", entity.id()))
            };
            filled = filled.replace(&placeholder, &label);
        }
        for property in self.properties.iter().filter(|p| !properties.contains_key(&p.name)) {
            filled = filled.replace(&format!("{{{}}}", property.name), "");
        }
        filled
    }
}

impl QuestTemplate for SimpleQuestTemplate {
    fn key(&self) -> &str {
        &self.key
    }

    fn rarity(&self) -> i64 {
        self.rarity
    }

    fn is_priority(&self) -> bool {
        self.priority
    }

    fn property_graph(
        &self,
        world: &WorldModel,
        _quests: &QuestModel,
        _rs: &mut dyn RandomSource,
    ) -> ConstraintGraph<WorldModelAction> {
        let mut graph = ConstraintGraph::new();
        for property in &self.properties {
            graph.add_group(property.name.clone(), property.mandatory);
            for entity in world.entities_with_type(&property.entity_type) {
                graph.add_node(existing_entity_node(&property.name, entity));
            }
            if let Some(prototype) = &property.create {
                graph.add_node(new_entity_node(
                    &property.name,
                    prototype.clone(),
                    property.create_metadata.clone(),
                ));
            }
        }
        graph
    }

    fn fill_optional(&self, graph: &mut ConstraintGraph<WorldModelAction>, rs: &mut dyn RandomSource) {
        GraphSolver::fill_optional(graph, rs);
    }

    fn to_quest(&self, properties: &QuestProperties, story: &str) -> Quest {
        Quest::new(
            self.key.clone(),
            self.fill(&self.title, properties),
            self.fill(&self.description, properties),
        )
        .with_story(story)
    }
}

/// Factory handing out clones of a fixed template list every cycle.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StaticTemplateFactory {
    templates: Vec<SimpleQuestTemplate>,
}

impl StaticTemplateFactory {
    pub fn new(templates: Vec<SimpleQuestTemplate>) -> Self {
        Self { templates }
    }
}

impl TemplateFactory for StaticTemplateFactory {
    fn create_templates(
        &self,
        _world: &WorldModel,
        _quests: &QuestModel,
        _rs: &mut dyn RandomSource,
    ) -> Vec<Box<dyn QuestTemplate>> {
        self.templates
            .iter()
            .cloned()
            .map(|t| Box::new(t) as Box<dyn QuestTemplate>)
            .collect()
    }
}
