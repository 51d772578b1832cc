use cartwalker_common::{EntityId, Transform};
use cartwalker_scene::{Scene, SceneError};
use glam::Vec3;

/// Scene nodes the controller drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CharacterRig {
    /// Unparented group the locomotion moves and steers.
    pub root: EntityId,
    /// Cartridge slot whose world pose seeds every projectile. `None` until
    /// the model is laid out.
    pub muzzle: Option<EntityId>,
}

/// Lay out the character's node hierarchy in `scene`.
pub fn build_rig(scene: &mut Scene) -> Result<CharacterRig, SceneError> {
    let root = scene.spawn_named(
        "character",
        Transform {
            position: Vec3::new(0.0, -0.01, 0.0),
            scale: Vec3::splat(5.0),
            ..Transform::default()
        },
    );
    let body = scene.spawn_child(
        root,
        "body",
        Transform::from_position(Vec3::new(0.005, 0.029, 0.001)),
    )?;
    let muzzle = scene.spawn_child(
        body,
        "cart-slot",
        Transform::from_euler_xyz(
            Vec3::new(-0.007, -0.01, -0.036),
            Vec3::new(0.03, 0.0, -3.141),
            Vec3::splat(0.001),
        ),
    )?;
    Ok(CharacterRig {
        root,
        muzzle: Some(muzzle),
    })
}
