//! Transform Node Graph
//!
//! [`NodeGraph`] owns every node, scene, camera and point light, plus the
//! identity registry correlating nodes with native handles. All structural
//! and transform mutations go through it so that:
//!
//! - both sides of every parent/child link stay consistent (the graph is
//!   always a forest and a node appears at most once in any children list)
//! - every local transform write marks the subtree stale and is forwarded
//!   to the native engine through the [`Gateway`]
//!
//! # Threading
//!
//! The graph is single-writer and holds no locks. It must only be mutated
//! from the thread driving the engine loop; other threads hand work over
//! through the bridge's event queue.

use glam::{Affine3A, EulerRot, Quat, Vec3};
use slotmap::SlotMap;

use crate::errors::{PgeError, ResourceKind, Result};
use crate::gateway::Gateway;
use crate::registry::{Handle, IdentityRegistry};
use crate::resources::{MeshKey, TextureKey};
use crate::scene::node::{Node, NodeChild, NodeParent};
use crate::scene::transform::Transform;
use crate::scene::transform_system;
use crate::scene::{Camera, CameraKey, LightKey, NodeKey, PointLight, Scene, SceneKey};

/// An attachment value together with the node that carries it.
#[derive(Debug, Clone)]
struct Attached<T> {
    node: NodeKey,
    value: T,
}

pub struct NodeGraph {
    nodes: SlotMap<NodeKey, Node>,
    scenes: SlotMap<SceneKey, Scene>,
    cameras: SlotMap<CameraKey, Attached<Camera>>,
    lights: SlotMap<LightKey, Attached<PointLight>>,
    handles: IdentityRegistry<NodeKey>,
    gateway: Gateway,
}

impl std::fmt::Debug for NodeGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeGraph")
            .field("nodes", &self.nodes.len())
            .field("scenes", &self.scenes.len())
            .field("cameras", &self.cameras.len())
            .field("lights", &self.lights.len())
            .finish_non_exhaustive()
    }
}

const STALE_NODE: PgeError = PgeError::StaleHandle(ResourceKind::Node);
const STALE_SCENE: PgeError = PgeError::StaleHandle(ResourceKind::Scene);

impl NodeGraph {
    #[must_use]
    pub fn new(gateway: Gateway) -> Self {
        Self {
            nodes: SlotMap::with_key(),
            scenes: SlotMap::with_key(),
            cameras: SlotMap::with_key(),
            lights: SlotMap::with_key(),
            handles: IdentityRegistry::new(),
            gateway,
        }
    }

    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    // ========================================================================
    // Node lifecycle
    // ========================================================================

    /// Creates an orphan node with an identity transform and a fresh handle.
    pub fn create_node(&mut self) -> NodeKey {
        let handles = &mut self.handles;
        let key = self.nodes.insert_with_key(|key| Node::new(handles.register(key)));
        log::debug!("Created node {}", self.nodes[key].handle);
        key
    }

    pub fn create_named_node(&mut self, name: impl Into<String>) -> NodeKey {
        let key = self.create_node();
        self.nodes[key].name = Some(name.into());
        key
    }

    /// Destroys `key` and its whole subtree, attachments included, and
    /// releases every handle. Returns how many nodes were removed.
    pub fn destroy_node(&mut self, key: NodeKey) -> Result<usize> {
        if !self.nodes.contains_key(key) {
            return Err(STALE_NODE);
        }
        self.unlink(key);

        let subtree = transform_system::collect_subtree(&self.nodes, key);
        for &k in &subtree {
            let Some(node) = self.nodes.remove(k) else {
                continue;
            };
            for child in &node.children {
                match *child {
                    NodeChild::Camera(c) => {
                        self.cameras.remove(c);
                    }
                    NodeChild::PointLight(l) => {
                        self.lights.remove(l);
                    }
                    NodeChild::Node(_) | NodeChild::Texture(_) => {}
                }
            }
            self.handles.release(node.handle);
        }

        log::debug!("Destroyed {} node(s)", subtree.len());
        Ok(subtree.len())
    }

    #[must_use]
    pub fn contains(&self, key: NodeKey) -> bool {
        self.nodes.contains_key(key)
    }

    pub fn node(&self, key: NodeKey) -> Result<&Node> {
        self.nodes.get(key).ok_or(STALE_NODE)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (NodeKey, &Node)> {
        self.nodes.iter()
    }

    pub fn handle_of(&self, key: NodeKey) -> Result<Handle> {
        self.handles.resolve(key).ok_or(STALE_NODE)
    }

    #[must_use]
    pub fn node_by_handle(&self, handle: Handle) -> Option<NodeKey> {
        self.handles.lookup(handle)
    }

    #[must_use]
    pub fn registry(&self) -> &IdentityRegistry<NodeKey> {
        &self.handles
    }

    // ========================================================================
    // Transform mutation
    // ========================================================================

    /// Sets the local translation and forwards it to the native engine.
    ///
    /// The local value is written before the native call; on
    /// [`PgeError::NativeCallFailed`] the script-side value is kept.
    pub fn set_translation(&mut self, key: NodeKey, translation: Vec3) -> Result<()> {
        let handle = self.write_transform(key, |t| t.translation = translation)?;
        self.gateway.set_node_translation(handle, translation)
    }

    pub fn set_rotation(&mut self, key: NodeKey, rotation: Quat) -> Result<()> {
        let handle = self.write_transform(key, |t| t.rotation = rotation)?;
        self.gateway.set_node_rotation(handle, rotation)
    }

    pub fn set_scale(&mut self, key: NodeKey, scale: Vec3) -> Result<()> {
        let handle = self.write_transform(key, |t| t.scale = scale)?;
        self.gateway.set_node_scale(handle, scale)
    }

    /// Replaces the whole local transform, forwarding each component.
    pub fn set_transform(&mut self, key: NodeKey, transform: Transform) -> Result<()> {
        let handle = self.write_transform(key, |t| *t = transform)?;
        self.push_transform(handle, &transform)
    }

    pub fn translate(&mut self, key: NodeKey, delta: Vec3) -> Result<()> {
        let current = self.node(key)?.translation();
        self.set_translation(key, current + delta)
    }

    /// Applies `delta` after the current rotation (local axes).
    pub fn rotate(&mut self, key: NodeKey, delta: Quat) -> Result<()> {
        let current = self.node(key)?.rotation();
        self.set_rotation(key, (current * delta).normalize())
    }

    pub fn rotate_euler(&mut self, key: NodeKey, order: EulerRot, a: f32, b: f32, c: f32) -> Result<()> {
        self.rotate(key, Transform::euler_rotation(order, a, b, c))
    }

    /// Turns the node so -Z points at `target` (parent space). Leaves the
    /// rotation untouched if `target` lies along `up`.
    pub fn look_at(&mut self, key: NodeKey, target: Vec3, up: Vec3) -> Result<()> {
        match self.node(key)?.transform().look_at_rotation(target, up) {
            Some(rotation) => self.set_rotation(key, rotation),
            None => Ok(()),
        }
    }

    pub fn set_name(&mut self, key: NodeKey, name: Option<String>) -> Result<()> {
        self.node_mut(key)?.name = name;
        Ok(())
    }

    pub fn set_mesh(&mut self, key: NodeKey, mesh: Option<MeshKey>) -> Result<()> {
        self.node_mut(key)?.mesh = mesh;
        Ok(())
    }

    fn write_transform(&mut self, key: NodeKey, f: impl FnOnce(&mut Transform)) -> Result<Handle> {
        let node = self.node_mut(key)?;
        f(&mut node.transform);
        let handle = node.handle;
        transform_system::mark_subtree_stale(&mut self.nodes, key);
        Ok(handle)
    }

    fn push_transform(&self, handle: Handle, transform: &Transform) -> Result<()> {
        self.gateway.set_node_translation(handle, transform.translation)?;
        self.gateway.set_node_rotation(handle, transform.rotation)?;
        self.gateway.set_node_scale(handle, transform.scale)
    }

    fn node_mut(&mut self, key: NodeKey) -> Result<&mut Node> {
        self.nodes.get_mut(key).ok_or(STALE_NODE)
    }

    // ========================================================================
    // Hierarchy
    // ========================================================================

    /// Makes `child` the last child of `parent`.
    ///
    /// `child` is first removed from its former parent's children (or its
    /// scene's roots). Fails with [`PgeError::CycleDetected`], leaving the
    /// graph untouched, if `parent` is `child` or one of its descendants.
    pub fn attach(&mut self, child: NodeKey, parent: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(child) || !self.nodes.contains_key(parent) {
            return Err(STALE_NODE);
        }
        if self.is_ancestor_or_self(child, parent) {
            log::warn!("Refusing to attach a node below itself");
            return Err(PgeError::CycleDetected);
        }

        self.unlink(child);
        self.nodes[parent].children.push(NodeChild::Node(child));
        self.nodes[child].parent = NodeParent::Node(parent);
        transform_system::mark_subtree_stale(&mut self.nodes, child);
        Ok(())
    }

    /// Turns `key` into an orphan, removing it from its parent or scene.
    pub fn detach(&mut self, key: NodeKey) -> Result<()> {
        if !self.nodes.contains_key(key) {
            return Err(STALE_NODE);
        }
        if self.unlink(key) {
            transform_system::mark_subtree_stale(&mut self.nodes, key);
        }
        Ok(())
    }

    /// Whether `ancestor` is `node` or lies on its parent chain.
    #[must_use]
    pub fn is_ancestor_or_self(&self, ancestor: NodeKey, node: NodeKey) -> bool {
        let mut current = Some(node);
        while let Some(key) = current {
            if key == ancestor {
                return true;
            }
            current = self.nodes.get(key).and_then(Node::parent_node);
        }
        false
    }

    /// Removes `key` from whoever owns it. Returns `false` if it was
    /// already an orphan.
    fn unlink(&mut self, key: NodeKey) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            return false;
        };
        let parent = std::mem::replace(&mut node.parent, NodeParent::Orphan);
        match parent {
            NodeParent::Orphan => false,
            NodeParent::Node(p) => {
                if let Some(p) = self.nodes.get_mut(p) {
                    p.remove_child(NodeChild::Node(key));
                }
                true
            }
            NodeParent::Scene(s) => {
                if let Some(scene) = self.scenes.get_mut(s) {
                    scene.remove_root(key);
                }
                true
            }
        }
    }

    pub fn attach_camera(&mut self, node: NodeKey, camera: Camera) -> Result<CameraKey> {
        self.node(node)?;
        let key = self.cameras.insert(Attached { node, value: camera });
        self.nodes[node].children.push(NodeChild::Camera(key));
        Ok(key)
    }

    pub fn attach_point_light(&mut self, node: NodeKey, light: PointLight) -> Result<LightKey> {
        self.node(node)?;
        let key = self.lights.insert(Attached { node, value: light });
        self.nodes[node].children.push(NodeChild::PointLight(key));
        Ok(key)
    }

    /// Adds a texture reference to the node's children. The texture itself
    /// stays owned by the resource catalog.
    pub fn attach_texture(&mut self, node: NodeKey, texture: TextureKey) -> Result<()> {
        let node = self.node_mut(node)?;
        if !node.children.contains(&NodeChild::Texture(texture)) {
            node.children.push(NodeChild::Texture(texture));
        }
        Ok(())
    }

    /// Removes a camera, light or texture reference from its node.
    pub fn remove_attachment(&mut self, node: NodeKey, child: NodeChild) -> Result<bool> {
        if matches!(child, NodeChild::Node(_)) {
            return Ok(false);
        }
        if !self.node_mut(node)?.remove_child(child) {
            return Ok(false);
        }
        match child {
            NodeChild::Camera(c) => {
                self.cameras.remove(c);
            }
            NodeChild::PointLight(l) => {
                self.lights.remove(l);
            }
            NodeChild::Node(_) | NodeChild::Texture(_) => {}
        }
        Ok(true)
    }

    pub fn camera(&self, key: CameraKey) -> Result<&Camera> {
        self.cameras
            .get(key)
            .map(|a| &a.value)
            .ok_or(PgeError::StaleHandle(ResourceKind::Camera))
    }

    pub fn camera_mut(&mut self, key: CameraKey) -> Result<&mut Camera> {
        self.cameras
            .get_mut(key)
            .map(|a| &mut a.value)
            .ok_or(PgeError::StaleHandle(ResourceKind::Camera))
    }

    /// The node carrying `camera`; its world transform positions the view.
    pub fn camera_node(&self, key: CameraKey) -> Result<NodeKey> {
        self.cameras
            .get(key)
            .map(|a| a.node)
            .ok_or(PgeError::StaleHandle(ResourceKind::Camera))
    }

    pub fn point_light(&self, key: LightKey) -> Result<&PointLight> {
        self.lights
            .get(key)
            .map(|a| &a.value)
            .ok_or(PgeError::StaleHandle(ResourceKind::Light))
    }

    pub fn point_light_mut(&mut self, key: LightKey) -> Result<&mut PointLight> {
        self.lights
            .get_mut(key)
            .map(|a| &mut a.value)
            .ok_or(PgeError::StaleHandle(ResourceKind::Light))
    }

    // ========================================================================
    // World transforms
    // ========================================================================

    /// World matrix of `key`, recomputed lazily and cached until the next
    /// mutation of the node or one of its ancestors.
    pub fn world_transform(&mut self, key: NodeKey) -> Result<Affine3A> {
        transform_system::resolve_world(&mut self.nodes, key).ok_or(STALE_NODE)
    }

    /// Recomputes every stale world matrix across all trees. Returns how
    /// many nodes were recomputed.
    pub fn update_world_transforms(&mut self) -> usize {
        let roots: Vec<NodeKey> = self.tree_roots().collect();
        transform_system::update_hierarchy(&mut self.nodes, &roots)
    }

    /// Nodes that have no parent node (orphans and scene roots).
    pub fn tree_roots(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.nodes
            .iter()
            .filter(|(_, n)| n.parent_node().is_none())
            .map(|(k, _)| k)
    }

    // ========================================================================
    // Queries
    // ========================================================================

    /// Descendant nodes of `key` in pre-order, excluding `key` itself.
    pub fn descendants(&self, key: NodeKey) -> Result<Vec<NodeKey>> {
        self.node(key)?;
        let mut out = transform_system::collect_subtree(&self.nodes, key);
        out.remove(0);
        Ok(out)
    }

    #[must_use]
    pub fn nodes_with_mesh(&self, mesh: MeshKey) -> Vec<NodeKey> {
        self.nodes
            .iter()
            .filter(|(_, n)| n.mesh == Some(mesh))
            .map(|(k, _)| k)
            .collect()
    }

    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<NodeKey> {
        self.nodes
            .iter()
            .find(|(_, n)| n.name.as_deref() == Some(name))
            .map(|(k, _)| k)
    }

    /// Deep-copies `key` and its node descendants into a new orphan tree.
    ///
    /// Clones get fresh handles; cameras and lights are duplicated, texture
    /// references shared. Each clone's transform is pushed to the native
    /// engine. If a push fails, the clone is destroyed and the error
    /// returned.
    pub fn clone_subtree(&mut self, key: NodeKey) -> Result<NodeKey> {
        let root = self.clone_node_fields(key).ok_or(STALE_NODE)?;
        let mut stack: Vec<(NodeKey, NodeKey)> = vec![(key, root)];

        while let Some((source, clone)) = stack.pop() {
            let Some(children) = self.nodes.get(source).map(|n| n.children.clone()) else {
                continue;
            };
            for child in children {
                match child {
                    NodeChild::Node(c) => {
                        let Some(child_clone) = self.clone_node_fields(c) else {
                            continue;
                        };
                        self.nodes[clone].children.push(NodeChild::Node(child_clone));
                        self.nodes[child_clone].parent = NodeParent::Node(clone);
                        stack.push((c, child_clone));
                    }
                    NodeChild::Camera(c) => {
                        if let Some(camera) = self.cameras.get(c).map(|a| a.value.clone()) {
                            self.attach_camera(clone, camera)?;
                        }
                    }
                    NodeChild::PointLight(l) => {
                        if let Some(light) = self.lights.get(l).map(|a| a.value.clone()) {
                            self.attach_point_light(clone, light)?;
                        }
                    }
                    NodeChild::Texture(t) => self.attach_texture(clone, t)?,
                }
            }
        }

        let clones = transform_system::collect_subtree(&self.nodes, root);
        for k in clones {
            let node = &self.nodes[k];
            if let Err(e) = self.push_transform(node.handle, &node.transform) {
                self.destroy_node(root)?;
                return Err(e);
            }
        }
        Ok(root)
    }

    /// New orphan node carrying `source`'s name, transform and mesh.
    fn clone_node_fields(&mut self, source: NodeKey) -> Option<NodeKey> {
        let src = self.nodes.get(source)?;
        let (name, transform, mesh) = (src.name.clone(), src.transform, src.mesh);
        let clone = self.create_node();
        let node = &mut self.nodes[clone];
        node.name = name;
        node.transform = transform;
        node.mesh = mesh;
        Some(clone)
    }

    // ========================================================================
    // Scenes
    // ========================================================================

    /// Creates a scene owning `roots`, in order.
    ///
    /// Validation is all-or-nothing: if any root is stale, listed twice,
    /// parented or already a root of another scene, nothing changes.
    pub fn create_scene(&mut self, name: impl Into<String>, roots: &[NodeKey]) -> Result<SceneKey> {
        for (i, &root) in roots.iter().enumerate() {
            let node = self.node(root)?;
            if node.parent != NodeParent::Orphan || roots[..i].contains(&root) {
                return Err(PgeError::AlreadyOwned);
            }
        }

        let mut scene = Scene::new(name);
        scene.roots.extend_from_slice(roots);
        let key = self.scenes.insert(scene);
        for &root in roots {
            self.nodes[root].parent = NodeParent::Scene(key);
        }
        log::debug!("Created scene {:?} with {} root(s)", self.scenes[key].name, roots.len());
        Ok(key)
    }

    /// Appends `node` to the scene's roots. `node` must be an orphan, or
    /// already a root of this scene (no-op).
    pub fn add_root(&mut self, scene: SceneKey, node: NodeKey) -> Result<()> {
        if !self.scenes.contains_key(scene) {
            return Err(STALE_SCENE);
        }
        match self.node(node)?.parent {
            NodeParent::Scene(s) if s == scene => return Ok(()),
            NodeParent::Orphan => {}
            NodeParent::Node(_) | NodeParent::Scene(_) => return Err(PgeError::AlreadyOwned),
        }
        self.scenes[scene].roots.push(node);
        self.nodes[node].parent = NodeParent::Scene(scene);
        Ok(())
    }

    /// Removes `node` from the scene's roots, leaving it an orphan. Returns
    /// `false` if it was not a root of this scene.
    pub fn remove_root(&mut self, scene: SceneKey, node: NodeKey) -> Result<bool> {
        if !self.scenes.contains_key(scene) {
            return Err(STALE_SCENE);
        }
        if self.node(node)?.parent != NodeParent::Scene(scene) {
            return Ok(false);
        }
        Ok(self.unlink(node))
    }

    /// Deletes the scene. Its roots become orphans and are returned.
    pub fn remove_scene(&mut self, scene: SceneKey) -> Result<Vec<NodeKey>> {
        let scene = self.scenes.remove(scene).ok_or(STALE_SCENE)?;
        for &root in &scene.roots {
            if let Some(node) = self.nodes.get_mut(root) {
                node.parent = NodeParent::Orphan;
            }
        }
        Ok(scene.roots)
    }

    pub fn scene(&self, key: SceneKey) -> Result<&Scene> {
        self.scenes.get(key).ok_or(STALE_SCENE)
    }

    pub fn scenes(&self) -> impl Iterator<Item = (SceneKey, &Scene)> {
        self.scenes.iter()
    }

    /// The scene whose tree contains `node`, if any.
    pub fn scene_of(&self, node: NodeKey) -> Result<Option<SceneKey>> {
        let mut current = self.node(node)?;
        loop {
            match current.parent {
                NodeParent::Node(p) => current = self.node(p)?,
                NodeParent::Scene(s) => return Ok(Some(s)),
                NodeParent::Orphan => return Ok(None),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn graph() -> NodeGraph {
        NodeGraph::new(Gateway::headless().0)
    }

    #[test]
    fn reattach_moves_rather_than_duplicates() {
        let mut g = graph();
        let a = g.create_node();
        let b = g.create_node();
        let c = g.create_node();

        g.attach(c, a).unwrap();
        g.attach(c, b).unwrap();

        assert_eq!(g.node(a).unwrap().child_nodes().count(), 0);
        assert_eq!(g.node(b).unwrap().child_nodes().collect::<Vec<_>>(), vec![c]);
        assert_eq!(g.node(c).unwrap().parent(), NodeParent::Node(b));
    }

    #[test]
    fn attaching_scene_root_removes_it_from_scene() {
        let mut g = graph();
        let root = g.create_node();
        let other = g.create_node();
        let scene = g.create_scene("main", &[root]).unwrap();

        g.attach(root, other).unwrap();
        assert!(g.scene(scene).unwrap().roots().is_empty());
    }

    #[test]
    fn unlink_keeps_attachments_of_parent() {
        let mut g = graph();
        let parent = g.create_node();
        let cam = g.attach_camera(parent, Camera::default()).unwrap();
        let child = g.create_node();
        g.attach(child, parent).unwrap();
        g.detach(child).unwrap();

        assert_eq!(g.node(parent).unwrap().children(), &[NodeChild::Camera(cam)]);
        assert_eq!(g.camera_node(cam).unwrap(), parent);
    }
}
