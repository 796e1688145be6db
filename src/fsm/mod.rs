//! Finite-state-machine driver
//!
//! [`FsmAsset`] is the already-parsed definition (states, transitions,
//! conditions); [`StateMachinePlayer`] evaluates it against [`FsmParams`]
//! and produces a pose plus an [`FsmStatus`] (current clip, blend weight,
//! transition progress).

pub mod asset;
pub mod player;

pub use asset::{FsmAsset, FsmCondition, FsmParam, FsmParams, FsmState, FsmTransition, SpeedBlend};
pub use player::{FsmStatus, SPEED_PARAM, StateMachinePlayer};
