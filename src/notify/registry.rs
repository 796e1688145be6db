use rustc_hash::FxHashMap;
use slotmap::{SlotMap, new_key_type};
use smallvec::SmallVec;

use crate::notify::window::TimeWindow;
use crate::runtime::EntityKey;

new_key_type! {
    /// One notify registration.
    pub struct NotifyHandle;
    /// Owner handle for bulk deregistration.
    pub struct NotifyGroup;
}

/// Playback slot a notify fired from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotifySlot {
    BaseA,
    BaseB,
    UpperA,
    UpperB,
    Additive,
    /// The single-clip driver.
    Single,
    /// The state machine driver's current state.
    State,
}

/// Passed to the callback when a notify fires.
#[derive(Debug, Clone, Copy)]
pub struct NotifyFired<'a> {
    pub entity: EntityKey,
    pub clip: &'a str,
    /// Trigger time in seconds, after clamping to the clip duration.
    pub time: f32,
    pub slot: NotifySlot,
}

pub type NotifyCallback = Box<dyn FnMut(&NotifyFired<'_>)>;

/// A callback bound to a point in a clip's timeline.
pub struct NotifyEvent {
    pub clip: String,
    /// Seconds. Clamped to the clip duration when evaluated.
    pub time: f32,
    pub group: Option<NotifyGroup>,
    /// Restricts firing to one entity. Pruned once the key goes stale.
    pub entity: Option<EntityKey>,
    callback: NotifyCallback,
}

impl NotifyEvent {
    pub fn new<F>(clip: impl Into<String>, time: f32, callback: F) -> Self
    where
        F: FnMut(&NotifyFired<'_>) + 'static,
    {
        Self {
            clip: clip.into(),
            time,
            group: None,
            entity: None,
            callback: Box::new(callback),
        }
    }

    #[must_use]
    pub fn in_group(mut self, group: NotifyGroup) -> Self {
        self.group = Some(group);
        self
    }

    #[must_use]
    pub fn bound_to(mut self, entity: EntityKey) -> Self {
        self.entity = Some(entity);
        self
    }
}

impl std::fmt::Debug for NotifyEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NotifyEvent")
            .field("clip", &self.clip)
            .field("time", &self.time)
            .field("group", &self.group)
            .field("entity", &self.entity)
            .finish_non_exhaustive()
    }
}

/// All live notify registrations, indexed by clip name.
#[derive(Default)]
pub struct NotifyRegistry {
    events: SlotMap<NotifyHandle, NotifyEvent>,
    groups: SlotMap<NotifyGroup, SmallVec<[NotifyHandle; 8]>>,
    by_clip: FxHashMap<String, SmallVec<[NotifyHandle; 4]>>,
}

impl NotifyRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_group(&mut self) -> NotifyGroup {
        self.groups.insert(SmallVec::new())
    }

    pub fn register(&mut self, event: NotifyEvent) -> NotifyHandle {
        let clip = event.clip.clone();
        let group = event.group;
        let handle = self.events.insert(event);

        self.by_clip.entry(clip).or_default().push(handle);
        match group.and_then(|g| self.groups.get_mut(g)) {
            Some(members) => members.push(handle),
            None if group.is_some() => {
                log::warn!("Notify registered into a removed group, it will only be removable by handle");
            }
            None => {}
        }
        handle
    }

    /// Removes one registration. Returns `false` for a stale handle.
    pub fn remove(&mut self, handle: NotifyHandle) -> bool {
        let Some(event) = self.events.remove(handle) else {
            return false;
        };
        if let Some(handles) = self.by_clip.get_mut(&event.clip) {
            handles.retain(|h| *h != handle);
            if handles.is_empty() {
                self.by_clip.remove(&event.clip);
            }
        }
        if let Some(members) = event.group.and_then(|g| self.groups.get_mut(g)) {
            members.retain(|h| *h != handle);
        }
        true
    }

    /// Removes every registration in `group` and the group itself.
    pub fn remove_group(&mut self, group: NotifyGroup) -> usize {
        let Some(members) = self.groups.remove(group) else {
            return 0;
        };
        members.into_iter().filter(|&h| self.remove(h)).count()
    }

    /// Drops registrations bound to entities that fail `is_alive`.
    pub fn prune(&mut self, mut is_alive: impl FnMut(EntityKey) -> bool) -> usize {
        let stale: SmallVec<[NotifyHandle; 8]> = self
            .events
            .iter()
            .filter(|(_, e)| e.entity.is_some_and(|key| !is_alive(key)))
            .map(|(h, _)| h)
            .collect();
        stale.into_iter().filter(|&h| self.remove(h)).count()
    }

    /// Drops every registration bound to `entity`.
    pub fn remove_entity(&mut self, entity: EntityKey) -> usize {
        self.prune(|key| key != entity)
    }

    #[must_use]
    pub fn contains(&self, handle: NotifyHandle) -> bool {
        self.events.contains_key(handle)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    #[must_use]
    pub fn has_clip(&self, clip: &str) -> bool {
        self.by_clip.contains_key(clip)
    }

    /// Fires every notify on `clip` whose trigger lies in `window`.
    /// Returns the number of callbacks invoked.
    pub fn fire(
        &mut self,
        entity: EntityKey,
        clip: &str,
        slot: NotifySlot,
        window: &TimeWindow,
    ) -> usize {
        let Some(handles) = self.by_clip.get(clip) else {
            return 0;
        };

        let mut fired = 0;
        for &handle in handles {
            let Some(event) = self.events.get_mut(handle) else {
                continue;
            };
            if event.entity.is_some_and(|bound| bound != entity) {
                continue;
            }
            let trigger = event.time.clamp(0.0, window.duration.max(0.0));
            if !window.crossed(trigger) {
                continue;
            }

            log::trace!("Notify '{clip}' @ {trigger:.3}s fired for {entity:?} ({slot:?})");
            (event.callback)(&NotifyFired {
                entity,
                clip,
                time: trigger,
                slot,
            });
            fired += 1;
        }
        fired
    }
}
