use crate::animation::ClipSlot;
use crate::graph::layers::{CrossFadeConfig, FadeStart};

/// Elapsed fade time within this much of `duration` counts as complete.
const COMPLETION_EPSILON: f32 = 1e-5;

/// Runtime side of a [`CrossFadeConfig`]: timer plus the A/B assignment it
/// was started for.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CrossFadeState {
    assigned: Option<(Option<String>, Option<String>)>,
    started: bool,
    complete: bool,
    elapsed: f32,
}

impl CrossFadeState {
    #[inline]
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    #[inline]
    #[must_use]
    pub fn is_started(&self) -> bool {
        self.started
    }

    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// True when the A/B clip names differ from the ones this fade was
    /// started for. The first observation always counts as a change.
    #[must_use]
    pub fn assignment_changed(&self, a: &ClipSlot, b: &ClipSlot) -> bool {
        match &self.assigned {
            Some((old_a, old_b)) => old_a.as_deref() != a.clip_name() || old_b.as_deref() != b.clip_name(),
            None => true,
        }
    }

    /// Advances the fade by `dt` and returns the A→B blend weight.
    ///
    /// On an assignment change the timer restarts and `b.time` is re-seeded
    /// to `entry * duration_b`. `duration_a`/`duration_b` are in seconds.
    pub fn update(
        &mut self,
        config: &CrossFadeConfig,
        a: &ClipSlot,
        b: &mut ClipSlot,
        duration_a: f32,
        duration_b: f32,
        dt: f32,
    ) -> f32 {
        if self.assignment_changed(a, b) {
            self.reset();
            self.assigned = Some((a.clip.clone(), b.clip.clone()));
            b.time = config.entry.clamp(0.0, 1.0) * duration_b.max(0.0);
        }

        if !self.started {
            self.started = match config.start {
                FadeStart::Immediate => true,
                FadeStart::AtExitTime => a.normalized_time(duration_a) >= config.exit,
            };
        }

        if self.started && !self.complete {
            self.elapsed += dt.max(0.0);
            if self.elapsed >= config.duration - COMPLETION_EPSILON {
                self.complete = true;
            }
        }

        self.weight(config)
    }

    #[must_use]
    pub fn weight(&self, config: &CrossFadeConfig) -> f32 {
        if self.complete {
            1.0
        } else if !self.started || config.duration <= 0.0 {
            0.0
        } else {
            config.curve.apply(self.elapsed / config.duration)
        }
    }
}
