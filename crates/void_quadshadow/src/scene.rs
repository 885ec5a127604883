//! Scene Collaborators
//!
//! Minimal stand-ins for the renderer-owned objects the allocator reads and
//! mutates: the source directional light, the viewer camera and the scene
//! node registry casters are attached to.
//!
//! All three are shared with the renderer through `Arc<RwLock<_>>` handles.
//! The allocator only ever holds one lock at a time.

use std::collections::BTreeMap;
use std::sync::Arc;

use glam::{Mat4, Vec3};
use parking_lot::RwLock;
use serde::{Serialize, Deserialize};

use crate::quadrant::ShadowFrustumBounds;

/// Shared directional light
pub type LightHandle = Arc<RwLock<DirectionalLight>>;
/// Shared viewer camera
pub type CameraHandle = Arc<RwLock<ViewerCamera>>;
/// Shared scene node registry
pub type SceneHandle = Arc<RwLock<SceneGraph>>;

/// Scene node identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(pub u64);

/// What a scene node represents
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum NodeKind {
    /// Grouping node
    Group,
    /// Regular light
    Light,
    /// Quadrant shadow caster in the given slot
    ShadowCaster(usize),
    /// Aim target of the caster in the given slot
    CasterTarget(usize),
}

#[derive(Clone, Debug)]
struct SceneNode {
    kind: NodeKind,
    parent: Option<NodeId>,
}

/// Flat node registry with parent links
///
/// Removing a node only removes that node; children keep their (now
/// dangling) parent link and are never touched implicitly.
#[derive(Clone, Debug)]
pub struct SceneGraph {
    nodes: BTreeMap<NodeId, SceneNode>,
    next_id: u64,
    root: NodeId,
}

impl SceneGraph {
    /// Create a graph containing only the root group
    pub fn new() -> Self {
        let root = NodeId(0);
        let mut nodes = BTreeMap::new();
        nodes.insert(root, SceneNode { kind: NodeKind::Group, parent: None });

        Self { nodes, next_id: 1, root }
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> SceneHandle {
        Arc::new(RwLock::new(self))
    }

    /// Root node
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Add a node under `parent`
    ///
    /// A parent that is not in the graph falls back to the root.
    pub fn add(&mut self, kind: NodeKind, parent: NodeId) -> NodeId {
        let parent = if self.nodes.contains_key(&parent) { parent } else { self.root };
        let id = NodeId(self.next_id);
        self.next_id += 1;
        self.nodes.insert(id, SceneNode { kind, parent: Some(parent) });
        id
    }

    /// Remove a node; returns false if it was not present
    ///
    /// The root cannot be removed.
    pub fn remove(&mut self, id: NodeId) -> bool {
        if id == self.root {
            return false;
        }
        self.nodes.remove(&id).is_some()
    }

    /// Check whether a node is attached
    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Kind of an attached node
    pub fn kind_of(&self, id: NodeId) -> Option<NodeKind> {
        self.nodes.get(&id).map(|n| n.kind)
    }

    /// Parent of an attached node
    pub fn parent_of(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|n| n.parent)
    }

    /// Direct children of a node
    pub fn children_of(&self, id: NodeId) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent == Some(id))
            .map(|(child, _)| *child)
            .collect()
    }

    /// Count attached nodes of a kind matching `predicate`
    pub fn count_kind(&self, predicate: impl Fn(NodeKind) -> bool) -> usize {
        self.nodes.values().filter(|n| predicate(n.kind)).count()
    }

    /// Total node count, root included
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when only the root remains
    pub fn is_empty(&self) -> bool {
        self.nodes.len() <= 1
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

/// Shadow parameters of a light
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LightShadow {
    /// Orthographic bounds of the full shadow frustum
    pub bounds: ShadowFrustumBounds,
    /// Depth bias to prevent shadow acne
    pub bias: f32,
    /// Normal-based offset to prevent peter-panning
    pub normal_bias: f32,
    /// Shadow map size (width, height)
    pub map_size: [u32; 2],
}

impl Default for LightShadow {
    fn default() -> Self {
        Self {
            bounds: ShadowFrustumBounds::default(),
            bias: 0.0,
            normal_bias: 0.0,
            map_size: [512, 512],
        }
    }
}

/// Directional light casting shadows toward its target
#[derive(Clone, Debug)]
pub struct DirectionalLight {
    /// Scene node of the light
    pub node: NodeId,
    /// World position
    pub position: Vec3,
    /// World position the light points at
    pub target: Vec3,
    /// Intensity in lux
    pub intensity: f32,
    /// Whether the light contributes directly
    pub visible: bool,
    /// Shadow settings
    pub shadow: LightShadow,
}

impl DirectionalLight {
    /// Create a light attached to a scene node
    pub fn new(node: NodeId, position: Vec3, target: Vec3) -> Self {
        Self {
            node,
            position,
            target,
            intensity: 1.0,
            visible: true,
            shadow: LightShadow::default(),
        }
    }

    /// Set shadow bounds
    pub fn with_bounds(mut self, bounds: ShadowFrustumBounds) -> Self {
        self.shadow.bounds = bounds;
        self
    }

    /// Set intensity
    pub fn with_intensity(mut self, intensity: f32) -> Self {
        self.intensity = intensity;
        self
    }

    /// Normalized direction from position toward target
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> LightHandle {
        Arc::new(RwLock::new(self))
    }
}

/// Viewer camera as seen by the allocator
///
/// Only the world position takes part in quadrant selection.
#[derive(Clone, Debug)]
pub struct ViewerCamera {
    /// World position
    pub position: Vec3,
    /// View-projection matrix
    pub view_projection: Mat4,
}

impl ViewerCamera {
    /// Camera at a world position with an identity view-projection
    pub fn at(position: Vec3) -> Self {
        Self {
            position,
            view_projection: Mat4::IDENTITY,
        }
    }

    /// Wrap in a shared handle
    pub fn into_handle(self) -> CameraHandle {
        Arc::new(RwLock::new(self))
    }
}

/// Up vector that is never parallel to the light direction
pub(crate) fn light_up_vector(direction: Vec3) -> Vec3 {
    if direction.y.abs() > 0.9 {
        Vec3::Z
    } else {
        Vec3::Y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scene_add_remove() {
        let mut scene = SceneGraph::new();
        let root = scene.root();

        let group = scene.add(NodeKind::Group, root);
        let light = scene.add(NodeKind::Light, group);

        assert!(scene.contains(light));
        assert_eq!(scene.parent_of(light), Some(group));
        assert_eq!(scene.children_of(group), vec![light]);

        assert!(scene.remove(light));
        assert!(!scene.remove(light));
        assert!(!scene.contains(light));
        assert!(scene.contains(group));
    }

    #[test]
    fn test_scene_root_is_permanent() {
        let mut scene = SceneGraph::new();
        assert!(!scene.remove(scene.root()));
        assert!(scene.is_empty());
    }

    #[test]
    fn test_scene_unknown_parent_falls_back_to_root() {
        let mut scene = SceneGraph::new();
        let node = scene.add(NodeKind::Light, NodeId(99));
        assert_eq!(scene.parent_of(node), Some(scene.root()));
    }

    #[test]
    fn test_light_direction() {
        let light = DirectionalLight::new(NodeId(1), Vec3::new(0.0, 10.0, 0.0), Vec3::ZERO);
        assert!((light.direction() - Vec3::NEG_Y).length() < 1e-6);
        assert_eq!(light_up_vector(light.direction()), Vec3::Z);
    }
}
