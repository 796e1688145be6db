//! Per-tick runtime
//!
//! - [`AnimationWorld`]: entities, asset library, runtime caches, notifies
//! - [`AnimationSystem`]: the single per-tick entry point
//! - [`RigCache`]: per-entity data derived from its mesh asset
//! - [`Animator`], [`ClipPlayer`], [`StateMachineDriver`]: pose sources
//! - [`ResolvedPose`]: globals and skinning palette

use slotmap::new_key_type;

pub mod cache;
pub mod drivers;
pub mod entity;
pub mod resolver;
pub mod system;
pub mod world;

new_key_type! {
    pub struct EntityKey;
}

pub use cache::{RigCache, RuntimeCache};
pub use drivers::{Animator, ClipPlayer, DriverKind, DriverOutput, StateMachineDriver};
pub use entity::AnimatedEntity;
pub use resolver::{ResolvedPose, build_palette, compute_global, compute_globals};
pub use system::AnimationSystem;
pub use world::AnimationWorld;
