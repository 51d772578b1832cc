//! Locomotion: turns latched movement controls into root motion.
//!
//! # Invariants
//! - `velocity` is always within `[-max_velocity, max_velocity]` after a tick.
//! - `speed` is recomputed every tick and never carried over.
//! - Yaw only changes while the character is moving.
//! - The facing direction is recomputed after the yaw update, every tick.

mod config;
mod locomotion;

pub use config::LocomotionConfig;
pub use locomotion::{
    LocomotionController, LocomotionInput, LocomotionState, MotionSample, integrate_velocity,
    walk_playback_rate, walk_time_scale, yaw_delta,
};
