//! World model actions - intended mutations of the world.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::entities::{EntityHandle, EntityId, MetaData, WorldEntity};
use crate::error::WorldError;

/// The kind of mutation an action performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WorldActionType {
    Create,
    Update,
    Delete,
    /// Reference an existing entity without changing it.
    Keep,
}

impl WorldActionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorldActionType::Create => "CREATE",
            WorldActionType::Update => "UPDATE",
            WorldActionType::Delete => "DELETE",
            WorldActionType::Keep => "KEEP",
        }
    }
}

impl std::fmt::Display for WorldActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WorldActionType {
    type Err = WorldError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "CREATE" => Ok(WorldActionType::Create),
            "UPDATE" => Ok(WorldActionType::Update),
            "DELETE" => Ok(WorldActionType::Delete),
            "KEEP" => Ok(WorldActionType::Keep),
            _ => Err(WorldError::UnknownActionType(s.to_string())),
        }
    }
}

impl TryFrom<u8> for WorldActionType {
    type Error = WorldError;

    fn try_from(code: u8) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(WorldActionType::Create),
            1 => Ok(WorldActionType::Update),
            2 => Ok(WorldActionType::Delete),
            3 => Ok(WorldActionType::Keep),
            other => Err(WorldError::UnknownActionType(other.to_string())),
        }
    }
}

/// An intended mutation: action type, target entity and metadata delta.
#[derive(Debug, Clone)]
pub struct WorldModelAction {
    action_type: WorldActionType,
    entity: EntityHandle,
    metadata: MetaData,
}

impl WorldModelAction {
    pub fn new(action_type: WorldActionType, entity: EntityHandle) -> Self {
        Self::with_metadata(action_type, entity, MetaData::new())
    }

    pub fn with_metadata(action_type: WorldActionType, entity: EntityHandle, metadata: MetaData) -> Self {
        Self {
            action_type,
            entity,
            metadata,
        }
    }

    /// CREATE a new entity from an uncommitted draft.
    pub fn create(entity: impl Into<EntityHandle>, metadata: MetaData) -> Self {
        Self::with_metadata(WorldActionType::Create, entity.into(), metadata)
    }

    pub fn update(entity: EntityHandle, metadata: MetaData) -> Self {
        Self::with_metadata(WorldActionType::Update, entity, metadata)
    }

    pub fn delete(entity: EntityHandle) -> Self {
        Self::new(WorldActionType::Delete, entity)
    }

    pub fn keep(entity: EntityHandle) -> Self {
        Self::new(WorldActionType::Keep, entity)
    }

    pub fn action_type(&self) -> WorldActionType {
        self.action_type
    }

    pub fn entity(&self) -> &EntityHandle {
        &self.entity
    }

    pub fn metadata(&self) -> &MetaData {
        &self.metadata
    }
}

/// History entry for an executed action.
///
/// Captures the entity identity at execution time, so a DELETE record keeps
/// the identity the entity had before it was cleared.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRecord {
    pub action_type: WorldActionType,
    pub entity_id: EntityId,
    pub entity_type: String,
    pub metadata: MetaData,
}

impl ActionRecord {
    pub(crate) fn new(action_type: WorldActionType, entity: &WorldEntity, entity_id: EntityId, metadata: &MetaData) -> Self {
        Self {
            action_type,
            entity_id,
            entity_type: entity.entity_type().to_string(),
            metadata: metadata.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_action_type() {
        assert_eq!("create".parse::<WorldActionType>(), Ok(WorldActionType::Create));
        assert_eq!("KEEP".parse::<WorldActionType>(), Ok(WorldActionType::Keep));
        assert_eq!(
            "MERGE".parse::<WorldActionType>(),
            Err(WorldError::UnknownActionType("MERGE".to_string()))
        );
    }

    #[test]
    fn test_action_type_from_code() {
        assert_eq!(WorldActionType::try_from(2), Ok(WorldActionType::Delete));
        assert!(matches!(
            WorldActionType::try_from(100),
            Err(WorldError::UnknownActionType(_))
        ));
    }

    #[test]
    fn test_action_shares_entity_handle() {
        let handle = EntityHandle::new(WorldEntity::new("Planet"));
        let action = WorldModelAction::keep(handle.clone());
        assert!(action.entity().same_entity(&handle));
        assert_eq!(action.action_type(), WorldActionType::Keep);
        assert!(action.metadata().is_empty());
    }
}
