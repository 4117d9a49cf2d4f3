use tracing::{debug, warn};
use weave_world::{WorldModel, WorldModelAction};

use crate::graph::GraphSolver;
use crate::quest::{QuestModel, QuestProperties};
use crate::random::RandomSource;
use crate::template::QuestTemplate;

/// A template together with one resolved property set.
pub struct QuestCandidate {
    pub template: Box<dyn QuestTemplate>,
    pub properties: QuestProperties,
    /// Type of the quest this candidate turns into.
    pub quest_type: String,
    /// World actions committed when this candidate is chosen.
    pub actions: Vec<WorldModelAction>,
    pub score: i64,
    pub is_priority: bool,
}

impl QuestCandidate {
    pub fn new(template: Box<dyn QuestTemplate>, properties: QuestProperties, actions: Vec<WorldModelAction>) -> Self {
        let is_priority = template.is_priority();
        let quest_type = template.to_quest(&properties, "").quest_type;
        Self {
            template,
            properties,
            quest_type,
            actions,
            score: 0,
            is_priority,
        }
    }

    /// Solve the template's property graph and collect the resulting actions.
    ///
    /// Returns `None` when a mandatory property has no way of being filled.
    pub fn resolve(
        template: Box<dyn QuestTemplate>,
        world: &WorldModel,
        quests: &QuestModel,
        rs: &mut dyn RandomSource,
    ) -> Option<Self> {
        let mut graph = template.property_graph(world, quests, rs);

        let empty = graph.empty_mandatory_groups();
        if !empty.is_empty() {
            warn!(template = template.key(), groups = ?empty, "skipping template with unfillable properties");
            return None;
        }

        GraphSolver::solve(&mut graph, rs);
        template.fill_optional(&mut graph, rs);
        let properties: QuestProperties = GraphSolver::solution(&graph)
            .into_iter()
            .map(|(name, node)| (name, node.payload.entity().clone()))
            .collect();

        let mut actions: Vec<WorldModelAction> = graph.active_nodes().map(|node| node.payload.clone()).collect();
        actions.extend(template.extra_actions(&properties, world));

        debug!(
            template = template.key(),
            properties = properties.len(),
            actions = actions.len(),
            "resolved candidate"
        );
        Some(Self::new(template, properties, actions))
    }
}

impl std::fmt::Debug for QuestCandidate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuestCandidate")
            .field("template", &self.template.key())
            .field("quest_type", &self.quest_type)
            .field("properties", &self.properties.keys().collect::<Vec<_>>())
            .field("actions", &self.actions.len())
            .field("score", &self.score)
            .field("is_priority", &self.is_priority)
            .finish()
    }
}
