//! Validation errors reported by the world model.

use thiserror::Error;

use crate::entities::EntityId;

/// A single world model action that could not be applied.
///
/// These never abort a batch: the offending action is skipped and the error
/// is collected into the [`ExecuteReport`](crate::ExecuteReport).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    #[error("entity with id {id} not found (type {entity_type})")]
    UnknownEntity { id: EntityId, entity_type: String },

    #[error("entity already has an id: {id}")]
    AlreadyCreated { id: EntityId },

    #[error("cannot keep entity {id} (type {entity_type}): it was never created")]
    KeepUnknown { id: EntityId, entity_type: String },

    #[error("illegal world action type: {0}")]
    UnknownActionType(String),
}
