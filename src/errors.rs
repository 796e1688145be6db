//! Error Types
//!
//! This module defines the error type returned by construction and
//! validation APIs.
//!
//! # Overview
//!
//! The per-tick runtime ([`AnimationSystem`](crate::runtime::AnimationSystem))
//! never fails: a missing clip, an unknown bone or degenerate IK geometry
//! degrades to "no visual change" and is logged. [`AnimationError`] is only
//! produced when immutable data is built:
//! - skeleton hierarchy validation
//! - keyframe track / clip validation
//! - precomputed sample table construction
//! - state machine asset validation
//!
//! ```rust,ignore
//! use stance::errors::Result;
//!
//! fn import() -> Result<Skeleton> {
//!     Skeleton::new("hero", nodes, bones, Affine3A::IDENTITY)
//! }
//! ```

use thiserror::Error;

/// The main error type for the animation core.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    // ========================================================================
    // Skeleton Errors
    // ========================================================================
    /// A node references a parent that does not precede it.
    #[error("node '{node}' (index {index}) has parent {parent}, parents must precede children")]
    UnsortedHierarchy {
        /// Name of the offending node
        node: String,
        /// Index of the offending node
        index: usize,
        /// Parent index that was found
        parent: usize,
    },

    /// Two nodes share the same name.
    #[error("duplicate skeleton node name '{0}'")]
    DuplicateNodeName(String),

    /// A bone points at a node index that does not exist.
    #[error("bone '{bone}' references node {node}, skeleton has {node_count} nodes")]
    BoneNodeOutOfRange {
        /// Name of the bone
        bone: String,
        /// Referenced node index
        node: usize,
        /// Number of nodes in the skeleton
        node_count: usize,
    },

    // ========================================================================
    // Clip Errors
    // ========================================================================
    /// Keyframe times and values disagree in length.
    #[error("track for node '{node}' has {times} key times but {values} values")]
    TrackLengthMismatch {
        /// Node the track animates
        node: String,
        /// Number of key times
        times: usize,
        /// Number of key values
        values: usize,
    },

    /// Keyframe times go backwards.
    #[error("track for node '{node}' has decreasing key times at key {key}")]
    UnsortedKeyframes {
        /// Node the track animates
        node: String,
        /// Index of the first out-of-order key
        key: usize,
    },

    /// Sample rate for precomputation is not usable.
    #[error("invalid precompute sample rate {0}")]
    InvalidSampleRate(f32),

    // ========================================================================
    // State Machine Errors
    // ========================================================================
    /// A transition or the default state references an unknown state id.
    #[error("state machine references unknown state id {0}")]
    UnknownState(u32),

    /// Two states share the same id.
    #[error("state machine declares state id {0} twice")]
    DuplicateState(u32),
}

/// Alias for `Result<T, AnimationError>`.
pub type Result<T> = std::result::Result<T, AnimationError>;
