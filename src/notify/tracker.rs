use slotmap::SecondaryMap;
use smallvec::SmallVec;

use crate::notify::registry::{NotifyRegistry, NotifySlot};
use crate::notify::window::{PlaybackDirection, TimeWindow};
use crate::runtime::EntityKey;

/// Current playback of one active clip slot, as reported by a driver.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SlotPlayback<'a> {
    pub slot: NotifySlot,
    pub clip: &'a str,
    /// Seconds.
    pub time: f32,
    /// Seconds.
    pub duration: f32,
    pub looping: bool,
    pub speed: f32,
}

/// Slots reported by one entity's drivers in one tick.
pub type Playbacks<'a> = SmallVec<[SlotPlayback<'a>; 8]>;

#[derive(Debug, Clone)]
struct SlotRecord {
    slot: NotifySlot,
    clip: String,
    time: f32,
}

/// Remembers the previous time of every active slot so crossings can be
/// detected tick over tick.
///
/// A slot seen for the first time, or now playing a different clip, only
/// records its time: a clip switch never fires notifies on its own.
#[derive(Default)]
pub struct NotifyTracker {
    slots: SecondaryMap<EntityKey, SmallVec<[SlotRecord; 4]>>,
}

impl NotifyTracker {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares `playbacks` with the previous tick and fires crossed
    /// notifies. Slots missing from `playbacks` are forgotten.
    pub fn observe(
        &mut self,
        entity: EntityKey,
        playbacks: &[SlotPlayback<'_>],
        registry: &mut NotifyRegistry,
    ) -> usize {
        if !self.slots.contains_key(entity) {
            self.slots.insert(entity, SmallVec::new());
        }
        let Some(records) = self.slots.get_mut(entity) else {
            return 0;
        };

        records.retain(|r| playbacks.iter().any(|p| p.slot == r.slot));

        let mut fired = 0;
        for playback in playbacks {
            let Some(record) = records.iter_mut().find(|r| r.slot == playback.slot) else {
                records.push(SlotRecord {
                    slot: playback.slot,
                    clip: playback.clip.to_string(),
                    time: playback.time,
                });
                continue;
            };

            if record.clip != playback.clip {
                record.clip.clear();
                record.clip.push_str(playback.clip);
                record.time = playback.time;
                continue;
            }

            let prev = record.time;
            record.time = playback.time;
            if prev == playback.time || !registry.has_clip(playback.clip) {
                continue;
            }

            let window = TimeWindow {
                prev,
                curr: playback.time,
                duration: playback.duration,
                looping: playback.looping,
                direction: PlaybackDirection::infer(prev, playback.time, playback.speed),
            };
            fired += registry.fire(entity, playback.clip, playback.slot, &window);
        }
        fired
    }

    /// Forgets every slot of `entity`.
    pub fn remove(&mut self, entity: EntityKey) {
        self.slots.remove(entity);
    }

    /// Last recorded time of `slot`, if it is being tracked.
    #[must_use]
    pub fn previous_time(&self, entity: EntityKey, slot: NotifySlot) -> Option<f32> {
        self.slots
            .get(entity)?
            .iter()
            .find(|r| r.slot == slot)
            .map(|r| r.time)
    }
}
