//! Quest templates - the collaborators that offer quest drafts each cycle.
//!
//! A template describes its required entities as a constraint graph: one
//! group per property, one node per way of filling it. Each node carries the
//! world action that fills the property, a KEEP for an existing entity or a
//! CREATE for a new one.

mod simple;

pub use simple::*;

use weave_world::{EntityHandle, MetaData, WorldEntity, WorldModel, WorldModelAction};

use crate::graph::{ConstraintGraph, Node};
use crate::quest::{Quest, QuestModel, QuestProperties};
use crate::random::RandomSource;

/// An instantiated quest template offered for one generation cycle.
pub trait QuestTemplate {
    /// Template key; becomes the quest type of quests made from it.
    fn key(&self) -> &str;

    /// Base score. Lower values are picked more often.
    fn rarity(&self) -> i64;

    /// Priority templates skip scoring and are always committed.
    fn is_priority(&self) -> bool {
        false
    }

    /// Candidate entities for every property, one group per property.
    fn property_graph(
        &self,
        world: &WorldModel,
        quests: &QuestModel,
        rs: &mut dyn RandomSource,
    ) -> ConstraintGraph<WorldModelAction>;

    /// Fill optional properties once the mandatory ones are solved.
    ///
    /// Called after [`crate::graph::GraphSolver::solve`] with the same random
    /// source. By default optional groups stay inactive.
    fn fill_optional(&self, _graph: &mut ConstraintGraph<WorldModelAction>, _rs: &mut dyn RandomSource) {}

    /// World actions implied by a resolved property set, on top of the
    /// actions of the chosen nodes.
    fn extra_actions(&self, _properties: &QuestProperties, _world: &WorldModel) -> Vec<WorldModelAction> {
        Vec::new()
    }

    /// Materialize the quest once its world actions are committed.
    fn to_quest(&self, properties: &QuestProperties, story: &str) -> Quest;
}

/// Source of quest templates.
pub trait TemplateFactory {
    fn create_templates(
        &self,
        world: &WorldModel,
        quests: &QuestModel,
        rs: &mut dyn RandomSource,
    ) -> Vec<Box<dyn QuestTemplate>>;
}

/// Node that fills `property` with an existing entity.
pub fn existing_entity_node(property: &str, entity: EntityHandle) -> Node<WorldModelAction> {
    Node::new(property, WorldModelAction::keep(entity))
}

/// Node that fills `property` with a new entity created from `entity`.
///
/// Any identity the prototype carries is dropped.
pub fn new_entity_node(property: &str, entity: WorldEntity, metadata: MetaData) -> Node<WorldModelAction> {
    Node::new(property, WorldModelAction::create(entity.into_draft(), metadata))
}

#[cfg(test)]
mod tests {
    use super::*;
    use weave_world::{EntityId, WorldActionType};

    #[test]
    fn test_property_nodes() {
        let handle = EntityHandle::new(WorldEntity::new("Planet"));
        let keep = existing_entity_node("planet", handle.clone());
        assert_eq!(keep.group(), "planet");
        assert_eq!(keep.payload.action_type(), WorldActionType::Keep);
        assert!(keep.payload.entity().same_entity(&handle));

        let create = new_entity_node("ship", WorldEntity::new("Ship"), MetaData::single("Hull", 3));
        assert_eq!(create.payload.action_type(), WorldActionType::Create);
        assert_eq!(create.payload.entity().id(), EntityId::NONE);
        assert_eq!(create.payload.metadata().get_value("Hull"), 3);
    }

    #[test]
    fn test_new_entity_node_drops_prototype_id() {
        let prototype: WorldEntity = serde_json::from_str(r#"{"id": 5, "entity_type": "Ship"}"#).unwrap();
        assert_eq!(prototype.id(), EntityId(5));

        let create = new_entity_node("ship", prototype, MetaData::new());
        assert_eq!(create.payload.entity().id(), EntityId::NONE);
    }
}
