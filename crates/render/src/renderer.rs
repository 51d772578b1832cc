use cartwalker_common::EntityId;
use cartwalker_scene::Scene;
use glam::Vec3;
use std::fmt::Write;

/// Where the scene is viewed from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderView {
    pub camera: Vec3,
    pub look_at: Vec3,
    /// Vertical field of view in degrees.
    pub fov: f32,
}

impl Default for RenderView {
    fn default() -> Self {
        Self {
            camera: Vec3::new(0.0, 0.18, 0.32),
            look_at: Vec3::ZERO,
            fov: 50.0,
        }
    }
}

/// Backend-independent rendering entry point. Implementations only read the scene.
pub trait Renderer {
    type Output;

    fn render(&self, scene: &Scene, view: &RenderView) -> Self::Output;
}

/// Text dump of the node tree with world-space positions, one node per line.
#[derive(Debug, Default)]
pub struct DebugTextRenderer;

impl DebugTextRenderer {
    pub fn new() -> Self {
        Self
    }

    fn write_node(scene: &Scene, id: EntityId, depth: usize, out: &mut String) {
        let (Some(node), Some(pose)) = (scene.get(id), scene.world_pose(id)) else {
            return;
        };
        let p = pose.position;
        let _ = writeln!(
            out,
            "{:indent$}{} [{}] world=({:.3}, {:.3}, {:.3}) yaw={:.3}",
            "",
            node.name.as_deref().unwrap_or("-"),
            id.short(),
            p.x,
            p.y,
            p.z,
            node.transform.yaw(),
            indent = 2 * (depth + 1)
        );
        for child in scene.children(id) {
            Self::write_node(scene, child, depth + 1, out);
        }
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn render(&self, scene: &Scene, view: &RenderView) -> String {
        let mut out = String::new();
        let _ = writeln!(
            out,
            "frame {} | {} nodes | camera {:?} -> {:?} fov {:.0}",
            scene.frame(),
            scene.node_count(),
            view.camera.to_array(),
            view.look_at.to_array(),
            view.fov
        );
        let roots = scene
            .nodes()
            .iter()
            .filter(|(_, node)| node.parent.is_none())
            .map(|(id, _)| *id);
        for root in roots {
            Self::write_node(scene, root, 0, &mut out);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cartwalker_common::Transform;

    #[test]
    fn empty_scene_prints_header_only() {
        let output = DebugTextRenderer::new().render(&Scene::new(), &RenderView::default());
        assert!(output.starts_with("frame 0 | 0 nodes"));
        assert_eq!(output.lines().count(), 1);
    }

    #[test]
    fn children_are_indented_under_parent() {
        let mut scene = Scene::new();
        let root = scene.spawn_named("character", Transform::from_position(Vec3::X));
        let slot = Transform::from_position(Vec3::new(0.0, 2.0, 0.0));
        scene.spawn_child(root, "cart-slot", slot).unwrap();
        scene.advance_frame();

        let output = DebugTextRenderer::new().render(&scene, &RenderView::default());
        let lines: Vec<_> = output.lines().collect();
        assert!(lines[0].starts_with("frame 1 | 2 nodes"));
        assert!(lines[1].starts_with("  character"));
        assert!(lines[2].starts_with("    cart-slot"));
        assert!(lines[2].contains("world=(1.000, 2.000, 0.000)"));
    }
}
