use std::sync::Arc;

use slotmap::SlotMap;

use crate::errors::{PgeError, ResourceKind, Result};
use crate::resources::{Material, MaterialKey, Mesh, MeshKey, Model3D, ModelKey, Texture, TextureKey};

/// Owns every mesh, texture, material and model descriptor.
///
/// Inserted descriptors are wrapped in `Arc` and never handed out mutably.
#[derive(Debug, Default)]
pub struct ResourceCatalog {
    meshes: SlotMap<MeshKey, Arc<Mesh>>,
    textures: SlotMap<TextureKey, Arc<Texture>>,
    materials: SlotMap<MaterialKey, Arc<Material>>,
    models: SlotMap<ModelKey, Arc<Model3D>>,
}

impl ResourceCatalog {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_mesh(&mut self, mesh: Mesh) -> MeshKey {
        log::debug!("Catalog: mesh {:?} ({} triangles)", mesh.name, mesh.triangle_count());
        self.meshes.insert(Arc::new(mesh))
    }

    pub fn insert_texture(&mut self, texture: Texture) -> TextureKey {
        log::debug!("Catalog: texture {:?} {}x{}", texture.name, texture.width, texture.height);
        self.textures.insert(Arc::new(texture))
    }

    /// Fails with [`PgeError::InvalidResource`] if the material references
    /// a texture that is not in the catalog.
    pub fn insert_material(&mut self, material: Material) -> Result<MaterialKey> {
        if let Some(missing) = material.textures().find(|&t| !self.textures.contains_key(t)) {
            return Err(PgeError::InvalidResource(format!(
                "material {:?} references unknown texture {missing:?}",
                material.name
            )));
        }
        Ok(self.materials.insert(Arc::new(material)))
    }

    /// Registers a loaded model bundle. Its mesh, texture and material keys
    /// must already be in the catalog.
    pub fn insert_model(&mut self, model: Model3D) -> Result<ModelKey> {
        let dangling = model.meshes.iter().any(|&k| !self.meshes.contains_key(k))
            || model.textures.iter().any(|&k| !self.textures.contains_key(k))
            || model.materials.iter().any(|&k| !self.materials.contains_key(k));
        if dangling {
            return Err(PgeError::InvalidResource(format!(
                "model {:?} references resources missing from the catalog",
                model.name
            )));
        }
        Ok(self.models.insert(Arc::new(model)))
    }

    pub fn mesh(&self, key: MeshKey) -> Result<Arc<Mesh>> {
        self.meshes
            .get(key)
            .cloned()
            .ok_or(PgeError::StaleHandle(ResourceKind::Mesh))
    }

    pub fn texture(&self, key: TextureKey) -> Result<Arc<Texture>> {
        self.textures
            .get(key)
            .cloned()
            .ok_or(PgeError::StaleHandle(ResourceKind::Texture))
    }

    pub fn material(&self, key: MaterialKey) -> Result<Arc<Material>> {
        self.materials
            .get(key)
            .cloned()
            .ok_or(PgeError::StaleHandle(ResourceKind::Material))
    }

    #[must_use]
    pub fn model(&self, key: ModelKey) -> Option<Arc<Model3D>> {
        self.models.get(key).cloned()
    }

    /// Removed descriptors stay alive for holders of their `Arc`.
    pub fn remove_mesh(&mut self, key: MeshKey) -> Option<Arc<Mesh>> {
        self.meshes.remove(key)
    }

    pub fn remove_texture(&mut self, key: TextureKey) -> Option<Arc<Texture>> {
        self.textures.remove(key)
    }

    pub fn remove_material(&mut self, key: MaterialKey) -> Option<Arc<Material>> {
        self.materials.remove(key)
    }

    pub fn remove_model(&mut self, key: ModelKey) -> Option<Arc<Model3D>> {
        self.models.remove(key)
    }

    #[must_use]
    pub fn find_mesh(&self, name: &str) -> Option<MeshKey> {
        self.meshes.iter().find(|(_, m)| m.name == name).map(|(k, _)| k)
    }

    #[must_use]
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    #[must_use]
    pub fn texture_count(&self) -> usize {
        self.textures.len()
    }

    #[must_use]
    pub fn material_count(&self) -> usize {
        self.materials.len()
    }
}
