//! State machine driver.
//!
//! Evaluates an [`FsmAsset`] against named parameters once per tick:
//! transition check (any-state first, then the current state), time
//! advance, then a linear cross-fade from the outgoing to the incoming
//! state over the transition's blend duration.

use crate::animation::{ClipCursors, LocalPose, wrap_time};
use crate::fsm::asset::{FsmAsset, FsmCondition, FsmParams, FsmState, FsmTransition};
use crate::notify::{NotifySlot, SlotPlayback};
use crate::runtime::RigCache;

/// Float parameter driving per-state two-clip blends.
pub const SPEED_PARAM: &str = "speed";

#[derive(Debug, Clone, Copy, PartialEq)]
struct ActiveState {
    id: u32,
    /// Normalized time in `[0, 1]`.
    phase: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Transition {
    elapsed: f32,
    duration: f32,
}

impl Transition {
    fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

/// What the state machine is showing this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FsmStatus<'a> {
    pub state: u32,
    /// Dominant clip of the current state.
    pub clip: &'a str,
    /// Speed-blend weight toward `clip_b` (0 for single-clip states).
    pub blend_weight: f32,
    /// `Some` while cross-fading from the previous state.
    pub transition_progress: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Validity {
    Unchecked,
    Valid,
    Invalid,
}

#[derive(Debug, Clone, Default)]
struct StateScratch {
    cursors_a: ClipCursors,
    cursors_b: ClipCursors,
    pose: LocalPose,
    pose_b: LocalPose,
}

#[derive(Debug, Clone)]
pub struct StateMachinePlayer {
    pub enabled: bool,
    pub params: FsmParams,
    asset: Option<FsmAsset>,
    validity: Validity,
    current: Option<ActiveState>,
    previous: Option<ActiveState>,
    transition: Option<Transition>,
    incoming: StateScratch,
    outgoing: StateScratch,
}

impl Default for StateMachinePlayer {
    fn default() -> Self {
        Self {
            enabled: true,
            params: FsmParams::default(),
            asset: None,
            validity: Validity::Unchecked,
            current: None,
            previous: None,
            transition: None,
            incoming: StateScratch::default(),
            outgoing: StateScratch::default(),
        }
    }
}

impl StateMachinePlayer {
    #[must_use]
    pub fn new(asset: FsmAsset) -> Self {
        let mut player = Self::default();
        player.set_asset(asset);
        player
    }

    /// Replaces the asset and restarts from its default state.
    pub fn set_asset(&mut self, asset: FsmAsset) {
        self.asset = Some(asset);
        self.validity = Validity::Unchecked;
        self.current = None;
        self.previous = None;
        self.transition = None;
    }

    #[must_use]
    pub fn asset(&self) -> Option<&FsmAsset> {
        self.asset.as_ref()
    }

    #[must_use]
    pub fn current_state(&self) -> Option<u32> {
        self.current.map(|s| s.id)
    }

    /// True when the driver has a valid asset and will produce a pose.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.enabled && self.asset.is_some() && self.validity != Validity::Invalid
    }

    #[must_use]
    pub fn status(&self) -> Option<FsmStatus<'_>> {
        let asset = self.asset.as_ref()?;
        let current = self.current?;
        let state = asset.state(current.id)?;
        let blend_weight = self.speed_weight(state);
        Some(FsmStatus {
            state: current.id,
            clip: dominant_clip(state, blend_weight),
            blend_weight,
            transition_progress: self.transition.map(|t| t.progress()),
        })
    }

    fn speed_weight(&self, state: &FsmState) -> f32 {
        if state.blend.is_some() {
            self.params.float(SPEED_PARAM).unwrap_or(0.0).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    fn ensure_valid(&mut self) -> bool {
        if self.validity == Validity::Unchecked {
            self.validity = match self.asset.as_ref().map(FsmAsset::validate) {
                Some(Ok(())) => Validity::Valid,
                Some(Err(e)) => {
                    log::warn!("State machine asset rejected, driver idle: {e}");
                    Validity::Invalid
                }
                None => Validity::Unchecked,
            };
        }
        self.validity == Validity::Valid
    }

    /// Advances the machine and writes its pose into `out`.
    /// Returns `false` when there is nothing to evaluate.
    pub fn evaluate(&mut self, cache: &RigCache, dt: f32, out: &mut LocalPose) -> bool {
        if !self.enabled || !self.ensure_valid() {
            return false;
        }
        let Some(asset) = self.asset.take() else {
            return false;
        };
        let evaluated = self.step(&asset, cache, dt, out);
        self.asset = Some(asset);
        evaluated
    }

    fn step(&mut self, asset: &FsmAsset, cache: &RigCache, dt: f32, out: &mut LocalPose) -> bool {
        let current = *self.current.get_or_insert(ActiveState {
            id: asset.default_state,
            phase: 0.0,
        });

        if self.transition.is_none() {
            if let Some(transition) = self.pick_transition(asset, current.id) {
                log::debug!(
                    "State machine transition {} -> {} over {:.2}s",
                    current.id,
                    transition.to,
                    transition.blend_duration
                );
                self.consume_triggers(&transition.conditions);
                self.previous = Some(current);
                self.current = Some(ActiveState {
                    id: transition.to,
                    phase: 0.0,
                });
                self.transition = Some(Transition {
                    elapsed: 0.0,
                    duration: transition.blend_duration.max(0.0),
                });
            }
        }

        let Some(mut current) = self.current else {
            return false;
        };
        let Some(state) = asset.state(current.id) else {
            return false;
        };
        current.phase = self.advance_phase(state, cache, current.phase, dt);
        self.current = Some(current);

        if let Some(mut previous) = self.previous {
            if let Some(state) = asset.state(previous.id) {
                previous.phase = self.advance_phase(state, cache, previous.phase, dt);
            }
            self.previous = Some(previous);
        }

        let progress = match self.transition.as_mut() {
            Some(t) => {
                t.elapsed += dt.max(0.0);
                t.progress()
            }
            None => 1.0,
        };
        if progress >= 1.0 {
            self.previous = None;
            self.transition = None;
        }

        let weight = self.speed_weight(state);
        sample_state(state, weight, current.phase, cache, &mut self.incoming);

        match self.previous.and_then(|p| asset.state(p.id).map(|s| (s, p.phase))) {
            Some((prev_state, phase)) => {
                let prev_weight = self.speed_weight(prev_state);
                sample_state(prev_state, prev_weight, phase, cache, &mut self.outgoing);
                out.blend_into(&self.outgoing.pose, &self.incoming.pose, progress);
            }
            None => out.copy_from(&self.incoming.pose),
        }
        true
    }

    fn pick_transition<'a>(&self, asset: &'a FsmAsset, current: u32) -> Option<&'a FsmTransition> {
        let holds = |t: &&FsmTransition| t.conditions.iter().all(|c| c.holds(&self.params));
        asset
            .transitions
            .iter()
            .filter(|t| t.from.is_none() && t.to != current)
            .find(holds)
            .or_else(|| {
                asset
                    .transitions
                    .iter()
                    .filter(|t| t.from == Some(current))
                    .find(holds)
            })
    }

    fn consume_triggers(&mut self, conditions: &[FsmCondition]) {
        for condition in conditions {
            if let FsmCondition::Trigger { param } = condition {
                self.params.consume_trigger(param);
            }
        }
    }

    fn advance_phase(&self, state: &FsmState, cache: &RigCache, phase: f32, dt: f32) -> f32 {
        let duration = self.state_duration(state, cache);
        if duration <= 0.0 {
            return 0.0;
        }
        let phase = phase + dt * state.play_rate / duration;
        wrap_time(phase, 1.0, state.looping)
    }

    /// Seconds per loop; speed blends interpolate the two clip lengths.
    fn state_duration(&self, state: &FsmState, cache: &RigCache) -> f32 {
        match &state.blend {
            Some(blend) => {
                let a = cache.clip_duration(&blend.clip_a).unwrap_or(0.0);
                let b = cache.clip_duration(&blend.clip_b).unwrap_or(0.0);
                a + (b - a) * self.speed_weight(state)
            }
            None => cache.clip_duration(&state.clip).unwrap_or(0.0),
        }
    }

    /// Active clip slot for notify tracking.
    #[must_use]
    pub fn playback<'a>(&'a self, cache: &RigCache) -> Option<SlotPlayback<'a>> {
        let status = self.status()?;
        let asset = self.asset.as_ref()?;
        let state = asset.state(status.state)?;
        let current = self.current?;
        let duration = cache.clip_duration(status.clip)?;
        Some(SlotPlayback {
            slot: NotifySlot::State,
            clip: status.clip,
            time: current.phase * duration,
            duration,
            looping: state.looping,
            speed: state.play_rate,
        })
    }
}

fn dominant_clip(state: &FsmState, weight: f32) -> &str {
    match &state.blend {
        Some(blend) if weight >= 0.5 => &blend.clip_b,
        Some(blend) => &blend.clip_a,
        None => &state.clip,
    }
}

/// Samples one state at normalized time `phase` into `scratch.pose`.
/// Unknown clips fall back to the bind pose.
fn sample_state(
    state: &FsmState,
    weight: f32,
    phase: f32,
    cache: &RigCache,
    scratch: &mut StateScratch,
) {
    let sample = |name: &str, cursors: &mut ClipCursors, out: &mut LocalPose| {
        let Some(index) = cache.clip_index(name) else {
            out.copy_from(cache.bind_pose());
            return;
        };
        let duration = cache.clip(index).map_or(0.0, |c| c.duration_seconds());
        cache.sample_into(index, phase * duration, state.looping, cursors, out);
    };

    match &state.blend {
        Some(blend) => {
            sample(&blend.clip_a, &mut scratch.cursors_a, &mut scratch.pose);
            if weight > 0.0 {
                sample(&blend.clip_b, &mut scratch.cursors_b, &mut scratch.pose_b);
                scratch.pose.blend_with(&scratch.pose_b, weight);
            }
        }
        None => sample(&state.clip, &mut scratch.cursors_a, &mut scratch.pose),
    }
}
