//! Skeleton data
//!
//! Immutable per-mesh data supplied by the external importer:
//! - [`Skeleton`]: topologically sorted node hierarchy plus skinned bones
//! - [`LocalTransform`]: parent-space TRS of one node
//! - [`BoneClassifier`] / [`BoneMask`]: keyword-driven node selection

pub mod hierarchy;
pub mod mask;
pub mod transform;

pub use hierarchy::{Bone, Skeleton, SkeletonNode};
pub use mask::{BoneClassifier, BoneMask};
pub use transform::{LocalTransform, slerp_shortest};
