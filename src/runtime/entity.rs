use glam::{Affine3A, Mat4};
use rustc_hash::FxHashMap;

use crate::animation::ClipSlot;
use crate::config::AnimationConfig;
use crate::fsm::StateMachinePlayer;
use crate::graph::LayerParams;
use crate::notify::Playbacks;
use crate::runtime::RigCache;
use crate::runtime::drivers::{Animator, ClipPlayer, DriverKind, StateMachineDriver};
use crate::runtime::resolver::ResolvedPose;
use crate::socket::{PoseSource, SocketDecl, aggregate_sockets};

/// One animated character: which mesh it uses, where it is, what drives it,
/// and what it published last tick.
#[derive(Debug, Clone)]
pub struct AnimatedEntity {
    /// Logical mesh asset path in the [`AssetLibrary`](crate::assets::AssetLibrary).
    pub mesh: String,
    pub world: Affine3A,
    pub enabled: bool,
    pub animator: Option<Animator>,
    pub clip_player: Option<ClipPlayer>,
    pub state_machine: Option<StateMachineDriver>,
    pub sockets: Vec<SocketDecl>,
    published: ResolvedPose,
    active_driver: Option<DriverKind>,
    socket_worlds: FxHashMap<String, Affine3A>,
    missing_mesh_logged: bool,
}

impl AnimatedEntity {
    #[must_use]
    pub fn new(mesh: impl Into<String>) -> Self {
        Self {
            mesh: mesh.into(),
            world: Affine3A::IDENTITY,
            enabled: true,
            animator: None,
            clip_player: None,
            state_machine: None,
            sockets: Vec::new(),
            published: ResolvedPose::default(),
            active_driver: None,
            socket_worlds: FxHashMap::default(),
            missing_mesh_logged: false,
        }
    }

    #[must_use]
    pub fn with_world(mut self, world: Affine3A) -> Self {
        self.world = world;
        self
    }

    #[must_use]
    pub fn with_animator(mut self, params: LayerParams) -> Self {
        self.animator = Some(Animator::new(params));
        self
    }

    #[must_use]
    pub fn with_clip_player(mut self, slot: ClipSlot) -> Self {
        self.clip_player = Some(ClipPlayer::new(slot));
        self
    }

    #[must_use]
    pub fn with_state_machine(mut self, player: StateMachinePlayer) -> Self {
        self.state_machine = Some(StateMachineDriver::new(player));
        self
    }

    #[must_use]
    pub fn with_socket(mut self, socket: SocketDecl) -> Self {
        self.sockets.push(socket);
        self
    }

    /// Skinning palette published last tick, one matrix per skeleton bone.
    #[must_use]
    pub fn palette(&self) -> &[Mat4] {
        &self.published.palette
    }

    /// Model-space node transforms published last tick.
    #[must_use]
    pub fn globals(&self) -> &[Affine3A] {
        &self.published.globals
    }

    /// Driver whose pose was published last tick.
    #[must_use]
    pub fn active_driver(&self) -> Option<DriverKind> {
        self.active_driver
    }

    #[must_use]
    pub fn socket_world(&self, name: &str) -> Option<Affine3A> {
        self.socket_worlds.get(name).copied()
    }

    #[must_use]
    pub fn socket_worlds(&self) -> &FxHashMap<String, Affine3A> {
        &self.socket_worlds
    }

    // ------------------------------------------------------------------------
    // Per-tick stages, driven by AnimationSystem
    // ------------------------------------------------------------------------

    pub(crate) fn evaluate_drivers(&mut self, rig: &RigCache, config: &AnimationConfig, dt: f32) {
        if let Some(animator) = self.animator.as_mut() {
            animator.evaluate(rig, &config.ik, dt);
        }
        if let Some(player) = self.clip_player.as_mut() {
            player.evaluate(rig, dt);
        }
        if let Some(fsm) = self.state_machine.as_mut() {
            fsm.evaluate(rig, dt);
        }
    }

    /// Publishes the highest-priority driving output, or the bind pose.
    pub(crate) fn publish(&mut self, rig: &mut RigCache) {
        let (kind, output) = if let Some(a) = self.animator.as_ref().filter(|a| a.is_driving()) {
            (Some(DriverKind::Animator), Some(a.output()))
        } else if let Some(p) = self.clip_player.as_ref().filter(|p| p.is_driving()) {
            (Some(DriverKind::ClipPlayer), Some(p.output()))
        } else if let Some(f) = self.state_machine.as_ref().filter(|f| f.is_driving()) {
            (Some(DriverKind::StateMachine), Some(f.output()))
        } else {
            (None, None)
        };

        if kind != self.active_driver {
            log::debug!("Published driver changed: {:?} -> {kind:?}", self.active_driver);
            self.active_driver = kind;
        }

        match output {
            Some(output) => self.published.copy_from(&output.resolved),
            None => self
                .published
                .resolve(rig.skeleton(), rig.parents(), rig.bind_pose()),
        }
        rig.last.copy_from(&self.published);
    }

    pub(crate) fn playbacks<'a>(&'a self, rig: &RigCache, out: &mut Playbacks<'a>) {
        if let Some(animator) = &self.animator {
            animator.playbacks(rig, out);
        }
        if let Some(playback) = self.clip_player.as_ref().and_then(|p| p.playback(rig)) {
            out.push(playback);
        }
        if let Some(playback) = self.state_machine.as_ref().and_then(|f| f.playback(rig)) {
            out.push(playback);
        }
    }

    pub(crate) fn resolve_sockets(&mut self, rig: Option<&RigCache>) {
        let mut sources: Vec<&dyn PoseSource> = Vec::with_capacity(3);
        if let Some(a) = &self.animator {
            sources.push(a);
        }
        if let Some(p) = &self.clip_player {
            sources.push(p);
        }
        if let Some(f) = &self.state_machine {
            sources.push(f);
        }
        aggregate_sockets(
            &mut self.sockets,
            &sources,
            rig,
            self.world,
            &mut self.socket_worlds,
        );
    }

    /// Marks every driver idle, e.g. while the entity is disabled.
    pub(crate) fn idle(&mut self) {
        if let Some(a) = self.animator.as_mut() {
            a.idle();
        }
        if let Some(p) = self.clip_player.as_mut() {
            p.idle();
        }
        if let Some(f) = self.state_machine.as_mut() {
            f.idle();
        }
        self.active_driver = None;
    }

    pub(crate) fn warn_missing_mesh(&mut self) {
        if !self.missing_mesh_logged {
            log::warn!("Mesh asset '{}' is not loaded, entity shows no animation", self.mesh);
            self.missing_mesh_logged = true;
        }
    }

    pub(crate) fn mesh_found(&mut self) {
        self.missing_mesh_logged = false;
    }
}
