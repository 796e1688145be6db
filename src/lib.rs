#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

//! Layered skeletal pose evaluation.
//!
//! Per entity, per tick: clip sampling (optionally through precomputed
//! tables) → pose blend graph → CCD IK → global pose and skinning palette
//! → notify window tracking → socket world transforms.
//!
//! ```rust,ignore
//! let mut world = AnimationWorld::new();
//! world.assets_mut().insert("hero.mesh", skeleton, clips);
//!
//! let hero = world.spawn(
//!     AnimatedEntity::new("hero.mesh").with_animator(LayerParams {
//!         base: BaseLayer::single("Idle"),
//!         ..Default::default()
//!     }),
//! );
//!
//! world.update(1.0 / 60.0);
//! let palette = world.entity(hero).map(AnimatedEntity::palette);
//! ```

pub mod animation;
pub mod assets;
pub mod config;
pub mod errors;
pub mod fsm;
pub mod graph;
pub mod ik;
pub mod notify;
pub mod runtime;
pub mod skeleton;
pub mod socket;

pub use animation::{AnimationClip, ClipSlot, KeyframeTrack, LocalPose, NodeChannel};
pub use assets::{AssetLibrary, MeshAsset};
pub use config::AnimationConfig;
pub use errors::{AnimationError, Result};
pub use fsm::{FsmAsset, StateMachinePlayer};
pub use graph::{BaseLayer, IkChainDescriptor, LayerParams, UpperBodyLayer};
pub use notify::{NotifyEvent, NotifyFired, NotifyGroup, NotifyHandle, NotifySlot};
pub use runtime::{AnimatedEntity, AnimationSystem, AnimationWorld, EntityKey};
pub use skeleton::{Bone, LocalTransform, Skeleton, SkeletonNode};
pub use socket::{SocketBinding, SocketDecl};
