use cartwalker_common::{EntityId, Pose, Transform};
use glam::Mat4;
use std::collections::BTreeMap;

/// An event record produced by every mutation to the scene.
#[derive(Debug, Clone, PartialEq)]
pub enum SceneEvent {
    /// Node was added under `parent` (None = scene root).
    Spawned {
        id: EntityId,
        parent: Option<EntityId>,
        transform: Transform,
    },
    /// Node was removed. Carries its last transform.
    Despawned { id: EntityId, transform: Transform },
    /// Node transform was updated.
    TransformUpdated {
        id: EntityId,
        old: Transform,
        new: Transform,
    },
    /// One display frame elapsed.
    FrameAdvanced { frame: u64 },
}

/// Errors from scene operations.
#[derive(Debug, thiserror::Error)]
pub enum SceneError {
    #[error("scene node {0:?} not found")]
    NodeNotFound(EntityId),
}

/// Per-node data stored in the scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneNode {
    pub name: Option<String>,
    pub parent: Option<EntityId>,
    pub transform: Transform,
}

/// Retained scene graph.
///
/// Owns node transforms and the parent hierarchy. The character controller
/// mutates its root through `set_transform`; projectiles are added at the
/// scene root and removed when they expire.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    nodes: BTreeMap<EntityId, SceneNode>,
    frame: u64,
    event_log: Vec<SceneEvent>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of frames advanced so far.
    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Drain and return the event log.
    pub fn drain_events(&mut self) -> Vec<SceneEvent> {
        std::mem::take(&mut self.event_log)
    }

    /// Read-only access to the event log.
    pub fn events(&self) -> &[SceneEvent] {
        &self.event_log
    }

    pub fn nodes(&self) -> &BTreeMap<EntityId, SceneNode> {
        &self.nodes
    }

    /// Add an unnamed node at the scene root.
    pub fn spawn(&mut self, transform: Transform) -> EntityId {
        self.insert(None, None, transform)
    }

    /// Add a named node at the scene root.
    pub fn spawn_named(&mut self, name: impl Into<String>, transform: Transform) -> EntityId {
        self.insert(None, Some(name.into()), transform)
    }

    /// Add a named node under `parent`.
    pub fn spawn_child(
        &mut self,
        parent: EntityId,
        name: impl Into<String>,
        transform: Transform,
    ) -> Result<EntityId, SceneError> {
        if !self.nodes.contains_key(&parent) {
            return Err(SceneError::NodeNotFound(parent));
        }
        Ok(self.insert(Some(parent), Some(name.into()), transform))
    }

    fn insert(
        &mut self,
        parent: Option<EntityId>,
        name: Option<String>,
        transform: Transform,
    ) -> EntityId {
        let id = EntityId::new();
        self.nodes.insert(
            id,
            SceneNode {
                name,
                parent,
                transform,
            },
        );
        self.event_log.push(SceneEvent::Spawned {
            id,
            parent,
            transform,
        });
        id
    }

    /// Remove a node and everything below it. Returns the node if it existed.
    pub fn despawn(&mut self, id: EntityId) -> Option<SceneNode> {
        for child in self.children(id) {
            self.despawn(child);
        }
        let node = self.nodes.remove(&id);
        if let Some(ref n) = node {
            self.event_log.push(SceneEvent::Despawned {
                id,
                transform: n.transform,
            });
        }
        node
    }

    pub fn contains(&self, id: EntityId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn get(&self, id: EntityId) -> Option<&SceneNode> {
        self.nodes.get(&id)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut SceneNode> {
        self.nodes.get_mut(&id)
    }

    /// Direct children of `id`, in id order.
    pub fn children(&self, id: EntityId) -> Vec<EntityId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    /// First node carrying `name`.
    pub fn find_by_name(&self, name: &str) -> Option<EntityId> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name.as_deref() == Some(name))
            .map(|(id, _)| *id)
    }

    /// Replace a node's local transform and log the change.
    pub fn set_transform(&mut self, id: EntityId, new: Transform) -> Result<(), SceneError> {
        let data = self.nodes.get_mut(&id).ok_or(SceneError::NodeNotFound(id))?;
        let old = data.transform;
        data.transform = new;
        self.event_log
            .push(SceneEvent::TransformUpdated { id, old, new });
        Ok(())
    }

    /// Local-to-world matrix of a node, composed through all parents.
    pub fn world_matrix(&self, id: EntityId) -> Option<Mat4> {
        let node = self.nodes.get(&id)?;
        let local = node.transform.to_matrix();
        match node.parent {
            Some(parent) => Some(self.world_matrix(parent)? * local),
            None => Some(local),
        }
    }

    /// World-space position and orientation of a node.
    pub fn world_pose(&self, id: EntityId) -> Option<Pose> {
        let (_, rotation, position) = self.world_matrix(id)?.to_scale_rotation_translation();
        Some(Pose::new(position, rotation.normalize()))
    }

    /// Advance one display frame.
    pub fn advance_frame(&mut self) {
        self.frame += 1;
        self.event_log
            .push(SceneEvent::FrameAdvanced { frame: self.frame });
    }
}
