use slotmap::SlotMap;

use crate::assets::AssetLibrary;
use crate::config::AnimationConfig;
use crate::notify::{NotifyEvent, NotifyGroup, NotifyHandle, NotifyRegistry, NotifyTracker};
use crate::runtime::EntityKey;
use crate::runtime::cache::RuntimeCache;
use crate::runtime::entity::AnimatedEntity;
use crate::runtime::system::AnimationSystem;

/// Owns every animated entity plus the shared asset library, the per-entity
/// runtime caches and the notify machinery.
#[derive(Default)]
pub struct AnimationWorld {
    pub(crate) entities: SlotMap<EntityKey, AnimatedEntity>,
    pub(crate) assets: AssetLibrary,
    pub(crate) cache: RuntimeCache,
    pub(crate) notifies: NotifyRegistry,
    pub(crate) tracker: NotifyTracker,
    pub(crate) config: AnimationConfig,
}

impl AnimationWorld {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: AnimationConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn config(&self) -> &AnimationConfig {
        &self.config
    }

    /// Replaces the configuration. Runtime caches rebuild on the next tick.
    pub fn set_config(&mut self, config: AnimationConfig) {
        self.config = config;
        self.cache.clear();
    }

    // ------------------------------------------------------------------------
    // Entities
    // ------------------------------------------------------------------------

    pub fn spawn(&mut self, entity: AnimatedEntity) -> EntityKey {
        self.entities.insert(entity)
    }

    /// Removes the entity together with its runtime cache, tracked notify
    /// slots and entity-bound notify registrations.
    pub fn despawn(&mut self, key: EntityKey) -> Option<AnimatedEntity> {
        let entity = self.entities.remove(key)?;
        self.cache.remove(key);
        self.tracker.remove(key);
        self.notifies.remove_entity(key);
        Some(entity)
    }

    #[must_use]
    pub fn contains(&self, key: EntityKey) -> bool {
        self.entities.contains_key(key)
    }

    #[must_use]
    pub fn entity(&self, key: EntityKey) -> Option<&AnimatedEntity> {
        self.entities.get(key)
    }

    pub fn entity_mut(&mut self, key: EntityKey) -> Option<&mut AnimatedEntity> {
        self.entities.get_mut(key)
    }

    pub fn entities(&self) -> impl Iterator<Item = (EntityKey, &AnimatedEntity)> {
        self.entities.iter()
    }

    #[must_use]
    pub fn entity_count(&self) -> usize {
        self.entities.len()
    }

    // ------------------------------------------------------------------------
    // Assets and caches
    // ------------------------------------------------------------------------

    #[must_use]
    pub fn assets(&self) -> &AssetLibrary {
        &self.assets
    }

    pub fn assets_mut(&mut self) -> &mut AssetLibrary {
        &mut self.assets
    }

    #[must_use]
    pub fn runtime_cache(&self) -> &RuntimeCache {
        &self.cache
    }

    // ------------------------------------------------------------------------
    // Notifies
    // ------------------------------------------------------------------------

    pub fn create_notify_group(&mut self) -> NotifyGroup {
        self.notifies.create_group()
    }

    pub fn register_notify(&mut self, event: NotifyEvent) -> NotifyHandle {
        self.notifies.register(event)
    }

    pub fn remove_notify(&mut self, handle: NotifyHandle) -> bool {
        self.notifies.remove(handle)
    }

    pub fn remove_notify_group(&mut self, group: NotifyGroup) -> usize {
        self.notifies.remove_group(group)
    }

    #[must_use]
    pub fn notifies(&self) -> &NotifyRegistry {
        &self.notifies
    }

    // ------------------------------------------------------------------------
    // Tick
    // ------------------------------------------------------------------------

    /// Advances every entity by `dt` seconds.
    #[inline]
    pub fn update(&mut self, dt: f32) {
        AnimationSystem::update(self, dt);
    }
}
