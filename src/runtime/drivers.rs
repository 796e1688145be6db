//! Animation drivers
//!
//! Each driver turns its own inputs into a local pose and resolves it:
//! - [`Animator`]: layered graph, IK and socket overrides
//! - [`ClipPlayer`]: a single clip slot
//! - [`StateMachinePlayer`]: state machine (see [`crate::fsm`])
//!
//! All enabled drivers run every tick; the entity publishes the output of
//! the highest-priority one that is driving.

use glam::Affine3A;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::animation::{ClipCursors, ClipSlot, LocalPose};
use crate::config::IkSettings;
use crate::fsm::StateMachinePlayer;
use crate::graph::{GraphOutcome, LayerParams, PoseBlendGraph};
use crate::ik::{CcdSolver, IkOutcome};
use crate::notify::{NotifySlot, Playbacks, SlotPlayback};
use crate::runtime::RigCache;
use crate::runtime::resolver::ResolvedPose;
use crate::socket::{PoseSource, SocketBinding};

/// Pose produced by one driver this tick.
#[derive(Debug, Clone, Default)]
pub struct DriverOutput {
    pub pose: LocalPose,
    pub resolved: ResolvedPose,
    /// The driver evaluated a clip this tick.
    pub driving: bool,
}

impl DriverOutput {
    fn resolve(&mut self, rig: &RigCache) {
        self.resolved
            .resolve(rig.skeleton(), rig.parents(), &self.pose);
    }

    fn idle(&mut self) {
        self.driving = false;
    }
}

macro_rules! impl_idle {
    ($($driver:ty),*) => {$(
        impl $driver {
            pub(crate) fn idle(&mut self) {
                self.output.idle();
            }
        }
    )*};
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DriverKind {
    Animator,
    ClipPlayer,
    StateMachine,
}

// ============================================================================
// Animator
// ============================================================================

/// The layered driver: blend graph, IK chains and socket overrides.
#[derive(Debug, Clone)]
pub struct Animator {
    pub enabled: bool,
    pub params: LayerParams,
    /// Socket name → redirection used while this driver is driving.
    pub socket_overrides: FxHashMap<String, SocketBinding>,
    graph: PoseBlendGraph,
    solver: CcdSolver,
    ik_outcomes: SmallVec<[IkOutcome; 2]>,
    missing_tips: FxHashSet<String>,
    output: DriverOutput,
}

impl Default for Animator {
    fn default() -> Self {
        Self::new(LayerParams::default())
    }
}

impl Animator {
    #[must_use]
    pub fn new(params: LayerParams) -> Self {
        Self {
            enabled: true,
            params,
            socket_overrides: FxHashMap::default(),
            graph: PoseBlendGraph::new(),
            solver: CcdSolver::default(),
            ik_outcomes: SmallVec::new(),
            missing_tips: FxHashSet::default(),
            output: DriverOutput::default(),
        }
    }

    #[must_use]
    pub fn with_socket_override(mut self, socket: impl Into<String>, binding: SocketBinding) -> Self {
        self.socket_overrides.insert(socket.into(), binding);
        self
    }

    #[must_use]
    pub fn graph(&self) -> &PoseBlendGraph {
        &self.graph
    }

    #[must_use]
    pub fn output(&self) -> &DriverOutput {
        &self.output
    }

    /// Outcome of each solved chain in the last tick, in chain order.
    /// Skipped chains are absent.
    #[must_use]
    pub fn ik_outcomes(&self) -> &[IkOutcome] {
        &self.ik_outcomes
    }

    pub fn evaluate(&mut self, rig: &RigCache, ik: &IkSettings, dt: f32) {
        self.output.idle();
        self.ik_outcomes.clear();
        if !self.enabled {
            return;
        }

        let outcome = self
            .graph
            .evaluate(&mut self.params, rig, dt, &mut self.output.pose);
        if outcome == GraphOutcome::Evaluated {
            self.solve_ik(rig, ik);
            self.output.driving = true;
        }
        self.output.resolve(rig);
    }

    fn solve_ik(&mut self, rig: &RigCache, ik: &IkSettings) {
        self.solver.settings.clone_from(ik);
        for chain in &self.params.ik_chains {
            if !chain.enabled || chain.weight <= 0.0 {
                continue;
            }
            let Some(tip) = rig.node(&chain.tip) else {
                if self.missing_tips.insert(chain.tip.clone()) {
                    log::warn!(
                        "IK tip bone '{}' not found on mesh asset '{}', chain skipped",
                        chain.tip,
                        rig.asset().path
                    );
                }
                continue;
            };
            let outcome = self.solver.solve(
                rig.parents(),
                &mut self.output.pose,
                tip,
                chain.chain_length,
                chain.target,
                chain.weight,
            );
            self.ik_outcomes.push(outcome);
        }
    }

    /// Active clip slots for notify tracking.
    pub fn playbacks<'a>(&'a self, rig: &RigCache, out: &mut Playbacks<'a>) {
        if !self.output.driving {
            return;
        }
        let params = &self.params;
        let mut push = |slot: NotifySlot, clip: &'a ClipSlot| {
            let Some(name) = clip.clip_name() else {
                return;
            };
            let Some(duration) = rig.clip_duration(name) else {
                return;
            };
            out.push(SlotPlayback {
                slot,
                clip: name,
                time: clip.time,
                duration,
                looping: clip.looping,
                speed: clip.speed,
            });
        };

        // B slots only report while they contribute to the pose
        push(NotifySlot::BaseA, &params.base.a);
        if params.base.blend > 0.0 {
            push(NotifySlot::BaseB, &params.base.b);
        }
        if params.upper_body.enabled && params.upper_body.weight > 0.0 {
            push(NotifySlot::UpperA, &params.upper_body.a);
            if params.upper_body.blend > 0.0 {
                push(NotifySlot::UpperB, &params.upper_body.b);
            }
        }
        if params.additive.enabled && params.additive.weight > 0.0 {
            push(NotifySlot::Additive, &params.additive.clip);
        }
    }
}

impl_idle!(Animator, ClipPlayer, StateMachineDriver);

impl PoseSource for Animator {
    fn is_driving(&self) -> bool {
        self.output.driving
    }

    fn node_global(&self, node: usize) -> Option<Affine3A> {
        self.output.resolved.global(node)
    }

    fn socket_override(&self, socket: &str) -> Option<&SocketBinding> {
        self.socket_overrides.get(socket)
    }
}

// ============================================================================
// Clip player
// ============================================================================

/// The simple driver: one clip, no layers.
#[derive(Debug, Clone)]
pub struct ClipPlayer {
    pub enabled: bool,
    pub slot: ClipSlot,
    cursors: ClipCursors,
    missing: Option<String>,
    output: DriverOutput,
}

impl ClipPlayer {
    #[must_use]
    pub fn new(slot: ClipSlot) -> Self {
        Self {
            enabled: true,
            slot,
            cursors: ClipCursors::default(),
            missing: None,
            output: DriverOutput::default(),
        }
    }

    #[must_use]
    pub fn output(&self) -> &DriverOutput {
        &self.output
    }

    pub fn evaluate(&mut self, rig: &RigCache, dt: f32) {
        self.output.idle();
        if !self.enabled {
            return;
        }
        let Some(name) = self.slot.clip_name() else {
            return;
        };
        let Some(index) = rig.clip_index(name) else {
            if self.missing.as_deref() != Some(name) {
                log::warn!("Clip '{name}' not found on mesh asset '{}'", rig.asset().path);
                self.missing = Some(name.to_string());
            }
            return;
        };
        self.missing = None;

        let duration = rig.clip(index).map_or(0.0, |c| c.duration_seconds());
        self.slot.advance(dt, duration);
        rig.sample_into(
            index,
            self.slot.time,
            self.slot.looping,
            &mut self.cursors,
            &mut self.output.pose,
        );
        self.output.resolve(rig);
        self.output.driving = true;
    }

    #[must_use]
    pub fn playback(&self, rig: &RigCache) -> Option<SlotPlayback<'_>> {
        if !self.output.driving {
            return None;
        }
        let clip = self.slot.clip_name()?;
        Some(SlotPlayback {
            slot: NotifySlot::Single,
            clip,
            time: self.slot.time,
            duration: rig.clip_duration(clip)?,
            looping: self.slot.looping,
            speed: self.slot.speed,
        })
    }
}

impl PoseSource for ClipPlayer {
    fn is_driving(&self) -> bool {
        self.output.driving
    }

    fn node_global(&self, node: usize) -> Option<Affine3A> {
        self.output.resolved.global(node)
    }
}

// ============================================================================
// State machine
// ============================================================================

/// [`StateMachinePlayer`] plus its resolved output.
#[derive(Debug, Clone, Default)]
pub struct StateMachineDriver {
    pub player: StateMachinePlayer,
    output: DriverOutput,
}

impl StateMachineDriver {
    #[must_use]
    pub fn new(player: StateMachinePlayer) -> Self {
        Self {
            player,
            output: DriverOutput::default(),
        }
    }

    #[must_use]
    pub fn output(&self) -> &DriverOutput {
        &self.output
    }

    pub fn evaluate(&mut self, rig: &RigCache, dt: f32) {
        self.output.idle();
        if self.player.evaluate(rig, dt, &mut self.output.pose) {
            self.output.resolve(rig);
            self.output.driving = true;
        }
    }

    #[must_use]
    pub fn playback(&self, rig: &RigCache) -> Option<SlotPlayback<'_>> {
        if !self.output.driving {
            return None;
        }
        self.player.playback(rig)
    }
}

impl PoseSource for StateMachineDriver {
    fn is_driving(&self) -> bool {
        self.output.driving
    }

    fn node_global(&self, node: usize) -> Option<Affine3A> {
        self.output.resolved.global(node)
    }
}
