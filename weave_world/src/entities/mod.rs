//! Entity definitions for the quest world.

mod metadata;

pub use metadata::*;

use serde::{Deserialize, Serialize};
use std::cell::{Ref, RefCell};
use std::collections::BTreeMap;
use std::rc::Rc;

/// Identity of a committed world entity.
///
/// Identities are handed out by the world model from a monotonic counter.
/// [`EntityId::NONE`] marks an entity that has not been committed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Sentinel for "not yet committed".
    pub const NONE: EntityId = EntityId(0);

    /// Whether this id refers to a committed entity.
    pub fn is_set(&self) -> bool {
        self.0 != 0
    }
}

impl std::fmt::Display for EntityId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A world entity: identity, type tag and a type-specific payload.
///
/// Relationships to other entities are stored as [`EntityId`] values in
/// `links` and resolved through the world model when needed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldEntity {
    #[serde(default)]
    id: EntityId,
    entity_type: String,

    /// Free-form payload, keyed by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, serde_json::Value>,

    /// Named references to other entities.
    #[serde(default)]
    pub links: BTreeMap<String, EntityId>,
}

impl WorldEntity {
    /// Create a new, uncommitted entity of the given type.
    pub fn new(entity_type: impl Into<String>) -> Self {
        Self {
            id: EntityId::NONE,
            entity_type: entity_type.into(),
            attributes: BTreeMap::new(),
            links: BTreeMap::new(),
        }
    }

    /// Set a payload attribute.
    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Link this entity to another one by identity.
    pub fn with_link(mut self, name: impl Into<String>, target: EntityId) -> Self {
        self.links.insert(name.into(), target);
        self
    }

    pub fn id(&self) -> EntityId {
        self.id
    }

    pub fn entity_type(&self) -> &str {
        &self.entity_type
    }

    /// The `name` attribute, if the payload carries a string one.
    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(|v| v.as_str())
    }

    /// This entity as an uncommitted draft, ready for a CREATE.
    pub fn into_draft(mut self) -> Self {
        self.id = EntityId::NONE;
        self
    }

    pub(crate) fn set_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

/// Shared handle to an in-memory entity.
///
/// Templates, candidates and actions all refer to the same entity object, so
/// the identity assigned by a CREATE is visible to every later action in the
/// same batch that holds a clone of the handle.
#[derive(Clone)]
pub struct EntityHandle(Rc<RefCell<WorldEntity>>);

impl EntityHandle {
    pub fn new(entity: WorldEntity) -> Self {
        Self(Rc::new(RefCell::new(entity)))
    }

    /// Current identity of the entity ([`EntityId::NONE`] while uncommitted).
    pub fn id(&self) -> EntityId {
        self.0.borrow().id
    }

    pub fn entity_type(&self) -> String {
        self.0.borrow().entity_type.clone()
    }

    /// Borrow the entity payload.
    pub fn borrow(&self) -> Ref<'_, WorldEntity> {
        self.0.borrow()
    }

    /// Detached copy of the entity as it is right now.
    pub fn snapshot(&self) -> WorldEntity {
        self.0.borrow().clone()
    }

    /// Whether both handles point at the same in-memory entity.
    pub fn same_entity(&self, other: &EntityHandle) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    pub(crate) fn set_id(&self, id: EntityId) {
        self.0.borrow_mut().set_id(id);
    }
}

impl From<WorldEntity> for EntityHandle {
    fn from(entity: WorldEntity) -> Self {
        Self::new(entity)
    }
}

impl std::fmt::Debug for EntityHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let entity = self.0.borrow();
        f.debug_struct("EntityHandle")
            .field("id", &entity.id)
            .field("entity_type", &entity.entity_type)
            .finish()
    }
}
