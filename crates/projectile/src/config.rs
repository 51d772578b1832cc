use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Projectile tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectileConfig {
    /// Time a projectile stays in the scene.
    pub lifetime_ms: u64,
    /// Minimum spacing between accepted fire requests.
    pub cooldown_ms: u64,
    /// Distance moved along local -Z every frame.
    pub step_distance: f32,
    /// Spin about local Z every frame, radians.
    pub spin: f32,
    pub scale: f32,
    /// Spawn position used when the muzzle node is not in the scene yet.
    pub fallback_position: Vec3,
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        Self {
            lifetime_ms: 5000,
            cooldown_ms: 200,
            step_distance: 0.2,
            spin: 0.2,
            scale: 0.006,
            fallback_position: Vec3::new(-0.007, -0.01, -0.036),
        }
    }
}

impl ProjectileConfig {
    pub fn lifetime(&self) -> Duration {
        Duration::from_millis(self.lifetime_ms)
    }

    pub fn cooldown(&self) -> Duration {
        Duration::from_millis(self.cooldown_ms)
    }
}
