use cartwalker_common::{EntityId, Pose, Timeline, Transform};
use cartwalker_scene::Scene;
use glam::{Quat, Vec3};
use std::collections::BTreeMap;
use std::time::Duration;

use crate::config::ProjectileConfig;

/// Bookkeeping for one live projectile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projectile {
    pub id: EntityId,
    pub spawned_at: Duration,
    /// Frames of motion applied so far.
    pub frames: u32,
}

/// Owns every projectile currently in the scene.
#[derive(Debug, Clone)]
pub struct Projectiles {
    config: ProjectileConfig,
    live: BTreeMap<EntityId, Projectile>,
    expiry: Timeline<EntityId>,
}

impl Projectiles {
    pub fn new(config: ProjectileConfig) -> Self {
        Self {
            config,
            live: BTreeMap::new(),
            expiry: Timeline::new(),
        }
    }

    pub fn config(&self) -> &ProjectileConfig {
        &self.config
    }

    pub fn live_count(&self) -> usize {
        self.live.len()
    }

    pub fn get(&self, id: EntityId) -> Option<&Projectile> {
        self.live.get(&id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Projectile> {
        self.live.values()
    }

    /// World pose a projectile would spawn at right now.
    ///
    /// Falls back to the configured default position when the muzzle node is
    /// missing from the scene.
    pub fn spawn_pose(&self, scene: &Scene, muzzle: Option<EntityId>) -> Pose {
        muzzle
            .and_then(|id| scene.world_pose(id))
            .unwrap_or_else(|| Pose::new(self.config.fallback_position, Quat::IDENTITY))
    }

    /// Add a projectile at the muzzle's live world pose and schedule its removal.
    pub fn spawn(
        &mut self,
        now: Duration,
        scene: &mut Scene,
        muzzle: Option<EntityId>,
    ) -> EntityId {
        let pose = self.spawn_pose(scene, muzzle);
        let id = scene.spawn_named(
            "cart",
            Transform {
                position: pose.position,
                rotation: pose.rotation,
                scale: Vec3::splat(self.config.scale),
            },
        );
        self.live.insert(
            id,
            Projectile {
                id,
                spawned_at: now,
                frames: 0,
            },
        );
        self.expiry.schedule(now, self.config.lifetime(), id);
        tracing::debug!(
            id = %id.short(),
            position = ?pose.position,
            "projectile spawned"
        );
        id
    }

    /// Remove expired projectiles, then move the rest one frame.
    ///
    /// Returns the ids removed this frame.
    pub fn tick(&mut self, now: Duration, scene: &mut Scene) -> Vec<EntityId> {
        let mut expired = Vec::new();
        while let Some((_, id)) = self.expiry.pop_due(now) {
            if self.live.remove(&id).is_some() {
                scene.despawn(id);
                tracing::debug!(id = %id.short(), "projectile expired");
                expired.push(id);
            }
        }

        let mut lost = Vec::new();
        for projectile in self.live.values_mut() {
            let Some(node) = scene.get(projectile.id) else {
                lost.push(projectile.id);
                continue;
            };
            let mut transform = node.transform;
            transform.translate_local(Vec3::Z, -self.config.step_distance);
            transform.rotate_local_z(self.config.spin);
            if scene.set_transform(projectile.id, transform).is_ok() {
                projectile.frames += 1;
            }
        }
        for id in lost {
            tracing::warn!(id = %id.short(), "projectile removed from scene externally");
            self.live.remove(&id);
        }

        expired
    }

    /// Remove every live projectile and cancel pending removals.
    pub fn clear(&mut self, scene: &mut Scene) -> usize {
        self.expiry.cancel_all();
        let ids: Vec<_> = self.live.keys().copied().collect();
        for id in &ids {
            scene.despawn(*id);
        }
        self.live.clear();
        ids.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartwalker_scene::SceneEvent;

    const FRAME: Duration = Duration::from_millis(16);

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn spawn_uses_muzzle_world_pose() {
        let mut scene = Scene::new();
        let root = scene.spawn_named("root", Transform::from_position(Vec3::X));
        let offset = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        let muzzle = scene.spawn_child(root, "muzzle", offset).unwrap();
        let mut p = Projectiles::new(ProjectileConfig::default());
        let id = p.spawn(ms(0), &mut scene, Some(muzzle));
        let node = scene.get(id).unwrap();
        assert!(node.parent.is_none());
        let offset = node.transform.position - Vec3::new(1.0, 2.0, 0.0);
        assert!(offset.length() < 1e-6);
        assert_eq!(node.transform.scale, Vec3::splat(0.006));
    }

    #[test]
    fn missing_muzzle_falls_back_to_default_pose() {
        let mut scene = Scene::new();
        let mut p = Projectiles::new(ProjectileConfig::default());
        let id = p.spawn(ms(0), &mut scene, Some(EntityId::new()));
        let node = scene.get(id).unwrap();
        assert_eq!(node.transform.position, Vec3::new(-0.007, -0.01, -0.036));
        assert_eq!(node.transform.rotation, Quat::IDENTITY);

        let id = p.spawn(ms(0), &mut scene, None);
        assert_eq!(
            scene.get(id).unwrap().transform.position,
            Vec3::new(-0.007, -0.01, -0.036)
        );
    }

    #[test]
    fn projectile_moves_every_frame_until_removed_at_lifetime() {
        let mut scene = Scene::new();
        let mut p = Projectiles::new(ProjectileConfig::default());
        let spawned = ms(1000);
        let id = p.spawn(spawned, &mut scene, None);

        let mut now = spawned;
        let mut last_z = scene.get(id).unwrap().transform.position.z;
        let removed_at = loop {
            now += FRAME;
            let expired = p.tick(now, &mut scene);
            if expired.contains(&id) {
                break now;
            }
            let z = scene.get(id).unwrap().transform.position.z;
            assert!(z < last_z, "projectile did not move at {now:?}");
            last_z = z;
        };

        assert!(!scene.contains(id));
        assert_eq!(p.live_count(), 0);
        let lifetime = removed_at - spawned;
        assert!(lifetime >= ms(5000) && lifetime < ms(5000) + FRAME);
    }

    #[test]
    fn motion_spins_about_local_z() {
        let mut scene = Scene::new();
        let mut p = Projectiles::new(ProjectileConfig::default());
        let id = p.spawn(ms(0), &mut scene, None);
        p.tick(FRAME, &mut scene);
        let t = scene.get(id).unwrap().transform;
        let expected = Quat::from_rotation_z(0.2);
        assert!(t.rotation.dot(expected).abs() > 0.9999);
        assert!((t.position.z - (-0.036 - 0.2)).abs() < 1e-5);
        assert_eq!(p.get(id).unwrap().frames, 1);
    }

    #[test]
    fn clear_removes_everything() {
        let mut scene = Scene::new();
        let mut p = Projectiles::new(ProjectileConfig::default());
        p.spawn(ms(0), &mut scene, None);
        p.spawn(ms(10), &mut scene, None);
        assert_eq!(p.clear(&mut scene), 2);
        assert_eq!(scene.node_count(), 0);
        assert!(p.tick(ms(10_000), &mut scene).is_empty());
        let despawns = scene
            .events()
            .iter()
            .filter(|e| matches!(e, SceneEvent::Despawned { .. }))
            .count();
        assert_eq!(despawns, 2);
    }

    #[test]
    fn externally_removed_projectile_is_forgotten() {
        let mut scene = Scene::new();
        let mut p = Projectiles::new(ProjectileConfig::default());
        let id = p.spawn(ms(0), &mut scene, None);
        scene.despawn(id);
        p.tick(FRAME, &mut scene);
        assert_eq!(p.live_count(), 0);
    }
}
