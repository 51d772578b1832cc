use serde::{Deserialize, Serialize};

/// Locomotion tuning. All values are per tick, not per second.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocomotionConfig {
    /// Base increment that inertia and acceleration scale.
    pub base_step: f32,
    /// Decay factor applied while no movement key is held.
    pub inertia: f32,
    /// Gain applied while a movement key is held.
    pub acceleration: f32,
    /// Velocity clamp, symmetric around zero.
    pub max_velocity: f32,
    /// Below this magnitude a coasting character snaps to rest.
    pub dead_zone: f32,
    /// Yaw change per tick while steering, in radians.
    pub turn_rate: f32,
    /// Floor for the walk-cycle rate so slow steps still read as walking.
    pub min_walk_rate: f32,
    pub walk_rate_scale: f32,
}

impl Default for LocomotionConfig {
    fn default() -> Self {
        Self {
            base_step: 0.001,
            inertia: 0.5,
            acceleration: 0.3,
            max_velocity: 0.025,
            dead_zone: 0.0008,
            turn_rate: 0.01,
            min_walk_rate: 0.015,
            walk_rate_scale: 40.0,
        }
    }
}

impl LocomotionConfig {
    pub fn decay_step(&self) -> f32 {
        self.base_step * self.inertia
    }

    pub fn accel_step(&self) -> f32 {
        self.base_step * self.acceleration
    }
}
