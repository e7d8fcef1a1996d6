use glam::{Affine3A, Quat, Vec3};
use smallvec::SmallVec;

use crate::registry::Handle;
use crate::resources::{MeshKey, TextureKey};
use crate::scene::transform::Transform;
use crate::scene::{CameraKey, LightKey, NodeKey, SceneKey};

/// Who owns a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeParent {
    /// Not attached anywhere; the root of its own tree.
    Orphan,
    /// Child of another node.
    Node(NodeKey),
    /// Root of a scene.
    Scene(SceneKey),
}

/// One entry in a node's ordered children list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeChild {
    Node(NodeKey),
    Camera(CameraKey),
    PointLight(LightKey),
    Texture(TextureKey),
}

/// A scene node.
///
/// # Hierarchy
///
/// Nodes form a forest through parent-child links:
/// - `parent`: unique owner of the node (another node, a scene, or nobody)
/// - `children`: ordered list of child nodes and attachments
///
/// Both sides of a link are maintained by [`NodeGraph`](crate::scene::NodeGraph),
/// which is why the fields are crate-private.
///
/// # Transform
///
/// The local [`Transform`] is authoritative. The world matrix is derived
/// from it and cached; `None` means the cache is stale.
#[derive(Debug, Clone)]
pub struct Node {
    pub(crate) handle: Handle,
    pub(crate) name: Option<String>,

    pub(crate) parent: NodeParent,
    pub(crate) children: SmallVec<[NodeChild; 4]>,

    pub(crate) transform: Transform,
    pub(crate) mesh: Option<MeshKey>,

    pub(crate) world: Option<Affine3A>,
}

impl Node {
    pub(crate) fn new(handle: Handle) -> Self {
        Self {
            handle,
            name: None,
            parent: NodeParent::Orphan,
            children: SmallVec::new(),
            transform: Transform::IDENTITY,
            mesh: None,
            world: None,
        }
    }

    /// The native handle this node is known by.
    #[inline]
    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn parent(&self) -> NodeParent {
        self.parent
    }

    /// Parent node, if the node is a child of another node.
    #[inline]
    #[must_use]
    pub fn parent_node(&self) -> Option<NodeKey> {
        match self.parent {
            NodeParent::Node(parent) => Some(parent),
            NodeParent::Orphan | NodeParent::Scene(_) => None,
        }
    }

    #[inline]
    #[must_use]
    pub fn children(&self) -> &[NodeChild] {
        &self.children
    }

    /// Child nodes only, in order, skipping attachments.
    pub fn child_nodes(&self) -> impl Iterator<Item = NodeKey> + '_ {
        self.children.iter().filter_map(|child| match child {
            NodeChild::Node(key) => Some(*key),
            _ => None,
        })
    }

    #[inline]
    #[must_use]
    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    #[inline]
    #[must_use]
    pub fn translation(&self) -> Vec3 {
        self.transform.translation
    }

    #[inline]
    #[must_use]
    pub fn rotation(&self) -> Quat {
        self.transform.rotation
    }

    #[inline]
    #[must_use]
    pub fn scale(&self) -> Vec3 {
        self.transform.scale
    }

    #[inline]
    #[must_use]
    pub fn mesh(&self) -> Option<MeshKey> {
        self.mesh
    }

    #[inline]
    #[must_use]
    pub fn local_matrix(&self) -> Affine3A {
        self.transform.local_matrix()
    }

    /// Cached world matrix, `None` while stale.
    #[inline]
    #[must_use]
    pub fn cached_world_matrix(&self) -> Option<&Affine3A> {
        self.world.as_ref()
    }

    #[inline]
    #[must_use]
    pub fn is_world_stale(&self) -> bool {
        self.world.is_none()
    }

    pub(crate) fn remove_child(&mut self, child: NodeChild) -> bool {
        if let Some(pos) = self.children.iter().position(|&c| c == child) {
            self.children.remove(pos);
            true
        } else {
            false
        }
    }
}
