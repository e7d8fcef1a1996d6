//! Scene Graph Module
//!
//! Manages the retained-mode node forest and the scenes that present it:
//! - [`Node`]: a scene node (local TRS transform, parent/child links, handle)
//! - [`Transform`]: the local translation/rotation/scale value
//! - [`NodeGraph`]: owns every node, scene and attachment; the mutation path
//!   that forwards transform changes to the native engine
//! - [`Scene`]: a named, ordered list of root nodes
//! - [`Camera`] / [`PointLight`]: node attachments
//! - `transform_system`: world-matrix propagation, decoupled from the graph

pub mod camera;
pub mod graph;
pub mod light;
pub mod node;
pub mod scene;
pub mod transform;
pub mod transform_system;

pub use camera::Camera;
pub use graph::NodeGraph;
pub use light::PointLight;
pub use node::{Node, NodeChild, NodeParent};
pub use scene::Scene;
pub use transform::Transform;

use slotmap::new_key_type;

new_key_type! {
    pub struct NodeKey;
    pub struct SceneKey;
    pub struct CameraKey;
    pub struct LightKey;
}
