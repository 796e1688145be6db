//! Notify Window Tracker
//!
//! Time-triggered callbacks on clips. The [`NotifyTracker`] keeps the
//! previous time of every active slot and asks the [`NotifyRegistry`] to
//! fire whatever lies in the swept [`TimeWindow`], once per crossing,
//! across loop wraps and in both playback directions.

pub mod registry;
pub mod tracker;
pub mod window;

pub use registry::{
    NotifyCallback, NotifyEvent, NotifyFired, NotifyGroup, NotifyHandle, NotifyRegistry,
    NotifySlot,
};
pub use tracker::{NotifyTracker, Playbacks, SlotPlayback};
pub use window::{PlaybackDirection, TimeWindow};
