//! The world model - the single transactional entry point for world changes.
//!
//! All mutations go through [`WorldModel::execute`], which applies a batch of
//! [`WorldModelAction`]s in order:
//! 1. **Apply**: each action is validated and applied on its own; an invalid
//!    action is logged, reported and skipped, the rest of the batch continues
//! 2. **History**: every applied non-KEEP action is appended to the audit log
//! 3. **Invalidate**: the type-indexed entity cache is dropped
//! 4. **Notify**: listeners get the full batch once, after all of the above

mod registry;
mod snapshot;

pub use registry::*;
pub use snapshot::*;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;
use tracing::{debug, warn};

use crate::actions::{ActionRecord, WorldActionType, WorldModelAction};
use crate::entities::{EntityHandle, EntityId, MetaData, MetadataStore};
use crate::error::WorldError;

/// Observer of world changes.
pub trait WorldListener {
    /// Called once per non-empty batch with every action that was supplied,
    /// in the order they were supplied. `world` already reflects the whole batch.
    fn world_changed(&self, actions: &[WorldModelAction], world: &WorldModel);
}

/// Outcome of one [`WorldModel::execute`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExecuteReport {
    /// Number of actions that passed validation.
    pub applied: usize,
    /// Actions that were skipped, in batch order.
    pub errors: Vec<WorldError>,
}

impl ExecuteReport {
    /// Whether every action in the batch was applied.
    pub fn is_clean(&self) -> bool {
        self.errors.is_empty()
    }
}

/// Entities, their metadata, the action history and the listener set.
#[derive(Default)]
pub struct WorldModel {
    registry: EntityRegistry,
    metadata: MetadataStore,
    history: Vec<ActionRecord>,
    listeners: Vec<Rc<dyn WorldListener>>,
    type_cache: RefCell<Option<BTreeMap<String, Vec<EntityHandle>>>>,
}

impl WorldModel {
    /// Create a new empty world.
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of actions in order.
    pub fn execute(&mut self, actions: &[WorldModelAction]) -> ExecuteReport {
        let mut report = ExecuteReport::default();

        for action in actions {
            match self.apply(action) {
                Ok(()) => report.applied += 1,
                Err(err) => {
                    warn!(action = %action.action_type(), error = %err, "skipping world model action");
                    report.errors.push(err);
                }
            }
        }

        if !actions.is_empty() {
            self.type_cache.borrow_mut().take();
            let listeners = self.listeners.clone();
            for listener in &listeners {
                listener.world_changed(actions, self);
            }
        }

        report
    }

    fn apply(&mut self, action: &WorldModelAction) -> Result<(), WorldError> {
        let handle = action.entity();
        let id = handle.id();

        match action.action_type() {
            WorldActionType::Create => {
                if id.is_set() {
                    return Err(WorldError::AlreadyCreated { id });
                }
                let new_id = self.registry.next_id();
                handle.set_id(new_id);
                self.registry.insert(handle.clone());
                self.metadata.merge(new_id, action.metadata());
                debug!(entity_id = %new_id, entity_type = %handle.entity_type(), "create entity");
                self.record(action, new_id);
            }
            WorldActionType::Update => {
                self.require_live(handle)?;
                self.metadata.merge(id, action.metadata());
                debug!(entity_id = %id, entity_type = %handle.entity_type(), "update entity");
                self.record(action, id);
            }
            WorldActionType::Delete => {
                self.require_live(handle)?;
                self.registry.remove(id);
                handle.set_id(EntityId::NONE);
                debug!(entity_id = %id, entity_type = %handle.entity_type(), "delete entity");
                self.record(action, id);
            }
            WorldActionType::Keep => {
                if !self.registry.contains(id) && !self.registry.was_assigned(id) {
                    return Err(WorldError::KeepUnknown {
                        id,
                        entity_type: handle.entity_type(),
                    });
                }
                debug!(entity_id = %id, entity_type = %handle.entity_type(), "keep entity");
            }
        }

        Ok(())
    }

    fn require_live(&self, handle: &EntityHandle) -> Result<(), WorldError> {
        if self.registry.contains(handle.id()) {
            Ok(())
        } else {
            Err(WorldError::UnknownEntity {
                id: handle.id(),
                entity_type: handle.entity_type(),
            })
        }
    }

    fn record(&mut self, action: &WorldModelAction, id: EntityId) {
        let record = ActionRecord::new(action.action_type(), &action.entity().borrow(), id, action.metadata());
        self.history.push(record);
    }

    /// Register a listener for future batches.
    pub fn add_listener(&mut self, listener: Rc<dyn WorldListener>) {
        self.listeners.push(listener);
    }

    /// Get a live entity by identity.
    pub fn entity(&self, id: EntityId) -> Option<EntityHandle> {
        self.registry.get(id).cloned()
    }

    /// All live entities in identity order.
    pub fn entities(&self) -> Vec<EntityHandle> {
        self.registry.iter().cloned().collect()
    }

    /// Live entities with the given type tag.
    pub fn entities_with_type(&self, entity_type: &str) -> Vec<EntityHandle> {
        let mut cache = self.type_cache.borrow_mut();
        let index = cache.get_or_insert_with(|| {
            let mut index: BTreeMap<String, Vec<EntityHandle>> = BTreeMap::new();
            for handle in self.registry.iter() {
                index.entry(handle.entity_type()).or_default().push(handle.clone());
            }
            index
        });
        index.get(entity_type).cloned().unwrap_or_default()
    }

    pub fn entity_count(&self) -> usize {
        self.registry.len()
    }

    /// Detached copy of the metadata of `id`. Works for deleted entities too.
    pub fn metadata(&self, id: EntityId) -> MetaData {
        self.metadata.get(id)
    }

    /// Every applied non-KEEP action, in execution order.
    pub fn history(&self) -> &[ActionRecord] {
        &self.history
    }

    /// History records that touched `id`.
    pub fn history_for(&self, id: EntityId) -> Vec<&ActionRecord> {
        self.history.iter().filter(|record| record.entity_id == id).collect()
    }

    /// CREATE and UPDATE records for `id` that carried a metadata delta.
    pub fn metadata_history(&self, id: EntityId) -> Vec<&ActionRecord> {
        self.history
            .iter()
            .filter(|record| {
                record.entity_id == id
                    && matches!(record.action_type, WorldActionType::Create | WorldActionType::Update)
                    && !record.metadata.is_empty()
            })
            .collect()
    }

    /// Build an UPDATE action that rewrites one metadata key of `id`.
    ///
    /// The current value (0 if absent) is passed through `updater`. Nothing is
    /// applied; the caller decides when to execute the returned action.
    pub fn change_metadata<F>(&self, id: EntityId, key: &str, updater: F) -> Result<WorldModelAction, WorldError>
    where
        F: FnOnce(i32) -> i32,
    {
        let entity = self.entity(id).ok_or_else(|| WorldError::UnknownEntity {
            id,
            entity_type: "unknown".to_string(),
        })?;
        let current = self.metadata.get(id).get_value(key);
        Ok(WorldModelAction::update(entity, MetaData::single(key, updater(current))))
    }
}

impl std::fmt::Debug for WorldModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorldModel")
            .field("registry", &self.registry)
            .field("metadata", &self.metadata)
            .field("history", &self.history.len())
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::WorldEntity;

    #[derive(Default)]
    struct RecordingListener {
        calls: RefCell<Vec<Vec<WorldActionType>>>,
        seen_entity_counts: RefCell<Vec<usize>>,
    }

    impl WorldListener for RecordingListener {
        fn world_changed(&self, actions: &[WorldModelAction], world: &WorldModel) {
            self.calls
                .borrow_mut()
                .push(actions.iter().map(|a| a.action_type()).collect());
            self.seen_entity_counts.borrow_mut().push(world.entity_count());
        }
    }

    fn draft(entity_type: &str) -> EntityHandle {
        EntityHandle::new(WorldEntity::new(entity_type))
    }

    fn create(world: &mut WorldModel, entity_type: &str, metadata: MetaData) -> EntityHandle {
        let handle = draft(entity_type);
        let report = world.execute(&[WorldModelAction::create(handle.clone(), metadata)]);
        assert!(report.is_clean());
        handle
    }

    #[test]
    fn test_create_assigns_increasing_ids() {
        let mut world = WorldModel::new();
        let first = create(&mut world, "Location", MetaData::new());
        let second = create(&mut world, "Location", MetaData::new());

        assert_eq!(first.id(), EntityId(1));
        assert_eq!(second.id(), EntityId(2));
        assert_eq!(world.entity_count(), 2);
        assert!(world.entity(first.id()).is_some());
    }

    #[test]
    fn test_create_twice_fails() {
        let mut world = WorldModel::new();
        let handle = draft("Location");
        let actions = vec![WorldModelAction::create(handle.clone(), MetaData::new())];

        assert!(world.execute(&actions).is_clean());
        let report = world.execute(&actions);

        assert_eq!(report.applied, 0);
        assert_eq!(report.errors, vec![WorldError::AlreadyCreated { id: EntityId(1) }]);
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn test_update_unknown_entity() {
        let mut world = WorldModel::new();
        let report = world.execute(&[WorldModelAction::update(draft("Agent"), MetaData::single("A", 1))]);

        assert!(matches!(report.errors[0], WorldError::UnknownEntity { .. }));
        assert!(world.history().is_empty());
    }

    #[test]
    fn test_update_entity_from_other_world() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::new());

        let mut other = WorldModel::new();
        let report = other.execute(&[WorldModelAction::update(handle, MetaData::single("A", 1))]);
        assert_eq!(report.errors.len(), 1);
    }

    #[test]
    fn test_update_merges_metadata() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::single("A", 1));

        world.execute(&[WorldModelAction::update(handle.clone(), MetaData::single("B", 2))]);
        assert_eq!(world.metadata(handle.id()), MetaData::new().with_value("A", 1).with_value("B", 2));

        world.execute(&[WorldModelAction::update(handle.clone(), MetaData::single("A", 191))]);
        assert_eq!(world.metadata(handle.id()).get_value("A"), 191);
        assert_eq!(world.metadata(handle.id()).get_value("B"), 2);
    }

    #[test]
    fn test_empty_update_keeps_keys() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::single("A", 1));

        world.execute(&[WorldModelAction::update(handle.clone(), MetaData::new())]);

        assert_eq!(world.metadata(handle.id()), MetaData::single("A", 1));
    }

    #[test]
    fn test_create_then_update_in_one_batch() {
        let mut world = WorldModel::new();
        let handle = draft("Agent");
        let report = world.execute(&[
            WorldModelAction::create(handle.clone(), MetaData::single("A", 1)),
            WorldModelAction::update(handle.clone(), MetaData::single("B", 2)),
        ]);

        assert!(report.is_clean());
        assert_eq!(report.applied, 2);
        assert_eq!(world.metadata(handle.id()), MetaData::new().with_value("A", 1).with_value("B", 2));
    }

    #[test]
    fn test_delete_keeps_metadata_tombstone() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Wreck", MetaData::single("Test123", 142));
        let id = handle.id();

        let report = world.execute(&[WorldModelAction::delete(handle.clone())]);

        assert!(report.is_clean());
        assert!(world.entity(id).is_none());
        assert_eq!(handle.id(), EntityId::NONE);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.metadata(id).get_value("Test123"), 142);
        assert_eq!(world.history().last().map(|r| r.entity_id), Some(id));
    }

    #[test]
    fn test_delete_unknown_entity() {
        let mut world = WorldModel::new();
        let report = world.execute(&[WorldModelAction::delete(draft("Wreck"))]);
        assert!(matches!(report.errors[0], WorldError::UnknownEntity { .. }));
    }

    #[test]
    fn test_keep_known_entity() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Station", MetaData::new());

        let report = world.execute(&[WorldModelAction::keep(handle.clone())]);

        assert!(report.is_clean());
        assert_eq!(world.entity_count(), 1);
        assert_eq!(world.history().len(), 1);
    }

    #[test]
    fn test_keep_unknown_entity_without_id() {
        let mut world = WorldModel::new();
        let report = world.execute(&[WorldModelAction::keep(draft("Station"))]);
        assert!(matches!(report.errors[0], WorldError::KeepUnknown { .. }));
    }

    #[test]
    fn test_keep_deleted_entity_from_snapshot() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Station", MetaData::single("Docked", 2));
        let saved = handle.snapshot();
        world.execute(&[WorldModelAction::delete(handle)]);
        let history_len = world.history().len();

        let stale = EntityHandle::new(saved);
        let report = world.execute(&[WorldModelAction::keep(stale.clone())]);

        assert!(report.is_clean());
        assert_eq!(report.applied, 1);
        assert_eq!(world.history().len(), history_len);
        assert_eq!(world.entity_count(), 0);
        assert_eq!(world.metadata(stale.id()).get_value("Docked"), 2);
    }

    #[test]
    fn test_keep_never_assigned_id() {
        let mut world = WorldModel::new();
        create(&mut world, "Station", MetaData::new());
        let forged = EntityHandle::new(WorldEntity::new("Station"));
        forged.set_id(EntityId(9));

        let report = world.execute(&[WorldModelAction::keep(forged)]);

        assert!(matches!(report.errors[0], WorldError::KeepUnknown { .. }));
    }

    #[test]
    fn test_failure_does_not_stop_batch() {
        let mut world = WorldModel::new();
        let good = draft("Planet");
        let report = world.execute(&[
            WorldModelAction::update(draft("Planet"), MetaData::single("A", 1)),
            WorldModelAction::create(good.clone(), MetaData::new()),
        ]);

        assert_eq!(report.applied, 1);
        assert_eq!(report.errors.len(), 1);
        assert!(good.id().is_set());
    }

    #[test]
    fn test_listener_called_once_per_batch() {
        let mut world = WorldModel::new();
        let listener = Rc::new(RecordingListener::default());
        world.add_listener(listener.clone());

        world.execute(&[]);
        assert!(listener.calls.borrow().is_empty());

        let handle = draft("Agent");
        world.execute(&[
            WorldModelAction::create(handle.clone(), MetaData::new()),
            WorldModelAction::keep(handle.clone()),
        ]);
        world.execute(&[WorldModelAction::delete(handle)]);

        let calls = listener.calls.borrow();
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0], vec![WorldActionType::Create, WorldActionType::Keep]);
        assert_eq!(calls[1], vec![WorldActionType::Delete]);
        assert_eq!(*listener.seen_entity_counts.borrow(), vec![1, 0]);
    }

    #[test]
    fn test_listener_receives_failed_actions_too() {
        let mut world = WorldModel::new();
        let listener = Rc::new(RecordingListener::default());
        world.add_listener(listener.clone());

        world.execute(&[WorldModelAction::update(draft("Agent"), MetaData::new())]);

        assert_eq!(listener.calls.borrow().len(), 1);
        assert_eq!(listener.calls.borrow()[0], vec![WorldActionType::Update]);
    }

    #[test]
    fn test_history_excludes_keep_and_keeps_order() {
        let mut world = WorldModel::new();
        let a = create(&mut world, "Agent", MetaData::single("A", 1));
        let b = create(&mut world, "Agent", MetaData::new());
        world.execute(&[
            WorldModelAction::keep(a.clone()),
            WorldModelAction::update(b.clone(), MetaData::single("B", 1)),
        ]);
        world.execute(&[WorldModelAction::delete(a.clone())]);

        let kinds: Vec<_> = world
            .history()
            .iter()
            .map(|r| (r.action_type, r.entity_id))
            .collect();
        assert_eq!(
            kinds,
            vec![
                (WorldActionType::Create, EntityId(1)),
                (WorldActionType::Create, EntityId(2)),
                (WorldActionType::Update, EntityId(2)),
                (WorldActionType::Delete, EntityId(1)),
            ]
        );
        assert_eq!(world.history_for(EntityId(1)).len(), 2);
    }

    #[test]
    fn test_metadata_history() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::single("A", 1));
        world.execute(&[
            WorldModelAction::update(handle.clone(), MetaData::new()),
            WorldModelAction::update(handle.clone(), MetaData::single("A", 2)),
        ]);

        let history = world.metadata_history(handle.id());
        assert_eq!(history.len(), 2);
        assert_eq!(history[1].metadata.get_value("A"), 2);
    }

    #[test]
    fn test_entities_with_type_cache_invalidation() {
        let mut world = WorldModel::new();
        create(&mut world, "Planet", MetaData::new());
        assert_eq!(world.entities_with_type("Planet").len(), 1);
        assert!(world.entities_with_type("Ship").is_empty());

        let ship = create(&mut world, "Ship", MetaData::new());
        assert_eq!(world.entities_with_type("Ship").len(), 1);

        world.execute(&[WorldModelAction::delete(ship)]);
        assert!(world.entities_with_type("Ship").is_empty());
    }

    #[test]
    fn test_change_metadata_does_not_apply() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::single("Relation", 95));

        let action = world
            .change_metadata(handle.id(), "Relation", |old| (old + 20).min(100))
            .unwrap();
        assert_eq!(action.action_type(), WorldActionType::Update);
        assert_eq!(action.metadata(), &MetaData::single("Relation", 100));
        assert_eq!(world.metadata(handle.id()).get_value("Relation"), 95);

        world.execute(&[action]);
        assert_eq!(world.metadata(handle.id()).get_value("Relation"), 100);
    }

    #[test]
    fn test_change_metadata_defaults_to_zero() {
        let mut world = WorldModel::new();
        let handle = create(&mut world, "Agent", MetaData::new());
        let action = world.change_metadata(handle.id(), "Count", |old| old + 1).unwrap();
        assert_eq!(action.metadata().get_value("Count"), 1);

        assert!(world.change_metadata(EntityId(42), "Count", |old| old).is_err());
    }
}
