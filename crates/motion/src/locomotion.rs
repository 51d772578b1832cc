use cartwalker_common::Transform;
use cartwalker_input::ControlState;
use glam::Vec3;

use crate::config::LocomotionConfig;

/// Movement controls as seen by one locomotion tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LocomotionInput {
    pub forward: bool,
    pub backward: bool,
    pub left: bool,
    pub right: bool,
    /// False until the power-on sequence hands control to the player.
    pub interaction_enabled: bool,
}

impl LocomotionInput {
    pub fn from_controls(controls: &ControlState, interaction_enabled: bool) -> Self {
        Self {
            forward: controls.forward,
            backward: controls.backward,
            left: controls.left,
            right: controls.right,
            interaction_enabled,
        }
    }
}

/// Persistent locomotion state. Only `velocity` survives between ticks.
///
/// Negative velocity walks toward the local -Z axis (forward key), positive
/// toward +Z (backward key).
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocomotionState {
    pub velocity: f32,
}

/// What one tick did, for the animation layer and for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MotionSample {
    /// Per-tick change applied to velocity this tick.
    pub speed: f32,
    pub velocity: f32,
    pub yaw_delta: f32,
    pub displacement: Vec3,
    /// Walk-cycle playback rate magnitude; zero at rest.
    pub playback_rate: f32,
    /// Signed time scale for the walk clips, `None` when they should be left alone.
    pub walk_time_scale: Option<f32>,
}

/// Integrate one tick of velocity. Returns `(speed, velocity)`.
///
/// The dead-zone test looks at the velocity coming into the tick.
pub fn integrate_velocity(
    velocity: f32,
    input: &LocomotionInput,
    cfg: &LocomotionConfig,
) -> (f32, f32) {
    let mut speed = 0.0;
    let mut velocity = velocity;

    if !(input.forward || input.backward) {
        if velocity > 0.0 {
            speed -= cfg.decay_step();
        } else if velocity < 0.0 {
            speed += cfg.decay_step();
        }

        if velocity > -cfg.dead_zone && velocity < cfg.dead_zone {
            speed = 0.0;
            velocity = 0.0;
        }
    }

    // Both held cancel out.
    if input.forward {
        speed -= cfg.accel_step();
    }
    if input.backward {
        speed += cfg.accel_step();
    }

    velocity += speed;
    velocity = velocity.clamp(-cfg.max_velocity, cfg.max_velocity);
    (speed, velocity)
}

/// Yaw change for this tick given the already-integrated velocity.
///
/// Steering reverses while backing up, like a car in reverse.
pub fn yaw_delta(input: &LocomotionInput, velocity: f32, cfg: &LocomotionConfig) -> f32 {
    if velocity == 0.0 {
        return 0.0;
    }
    let mut delta = 0.0;
    if input.right {
        delta += if input.backward { cfg.turn_rate } else { -cfg.turn_rate };
    }
    if input.left {
        delta += if input.backward { -cfg.turn_rate } else { cfg.turn_rate };
    }
    delta
}

/// Walk-cycle playback rate magnitude.
pub fn walk_playback_rate(velocity: f32, cfg: &LocomotionConfig) -> f32 {
    if velocity == 0.0 {
        0.0
    } else {
        velocity.abs().max(cfg.min_walk_rate) * cfg.walk_rate_scale
    }
}

/// Signed time scale for the walk clips.
///
/// Walking toward -Z plays the clips forward, toward +Z plays them in
/// reverse. At rest the clips keep whatever scale they had.
pub fn walk_time_scale(velocity: f32, cfg: &LocomotionConfig) -> Option<f32> {
    let rate = walk_playback_rate(velocity, cfg);
    if velocity < 0.0 {
        Some(rate)
    } else if velocity > 0.0 {
        Some(-rate)
    } else {
        None
    }
}

/// Drives a single character root.
#[derive(Debug, Clone, Default)]
pub struct LocomotionController {
    config: LocomotionConfig,
    state: LocomotionState,
}

impl LocomotionController {
    pub fn new(config: LocomotionConfig) -> Self {
        Self {
            config,
            state: LocomotionState::default(),
        }
    }

    pub fn config(&self) -> &LocomotionConfig {
        &self.config
    }

    pub fn state(&self) -> LocomotionState {
        self.state
    }

    pub fn velocity(&self) -> f32 {
        self.state.velocity
    }

    /// Advance one tick and move `root`.
    ///
    /// `root` must be unparented: its local forward axis is taken as its
    /// world facing. Returns `None` while interaction is disabled, in which
    /// case nothing is touched.
    pub fn tick(&mut self, input: &LocomotionInput, root: &mut Transform) -> Option<MotionSample> {
        if !input.interaction_enabled {
            return None;
        }

        let (speed, velocity) = integrate_velocity(self.state.velocity, input, &self.config);
        self.state.velocity = velocity;

        let yaw = yaw_delta(input, velocity, &self.config);
        if yaw != 0.0 {
            root.rotate_y(yaw);
        }

        let displacement = root.forward() * velocity;
        root.position += displacement;

        let sample = MotionSample {
            speed,
            velocity,
            yaw_delta: yaw,
            displacement,
            playback_rate: walk_playback_rate(velocity, &self.config),
            walk_time_scale: walk_time_scale(velocity, &self.config),
        };
        tracing::trace!(velocity, speed, yaw, "locomotion tick");
        Some(sample)
    }
}
