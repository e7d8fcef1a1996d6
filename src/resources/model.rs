use crate::animation::AnimationKey;
use crate::resources::{MaterialKey, MeshKey, TextureKey};
use crate::scene::SceneKey;

/// Everything an external model loader produced for one asset.
///
/// Only keys are stored: the descriptors live in the catalog, the scenes in
/// the node graph and the animations in the animator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model3D {
    pub name: String,
    pub textures: Vec<TextureKey>,
    pub materials: Vec<MaterialKey>,
    pub meshes: Vec<MeshKey>,
    pub scenes: Vec<SceneKey>,
    pub animations: Vec<AnimationKey>,
}

impl Model3D {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// The scene a viewer shows first.
    #[must_use]
    pub fn default_scene(&self) -> Option<SceneKey> {
        self.scenes.first().copied()
    }
}
