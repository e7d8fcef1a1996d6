use glam::{Vec3, Vec4};
use uuid::Uuid;

use crate::resources::TextureKey;

/// Surface description. Textures are referenced by catalog key.
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    pub uuid: Uuid,
    pub name: Option<String>,
    pub base_color: Vec4,
    pub base_color_texture: Option<TextureKey>,
    pub normal_texture: Option<TextureKey>,
    pub occlusion_texture: Option<TextureKey>,
    pub emissive_texture: Option<TextureKey>,
    pub emissive_factor: Vec3,
}

impl Material {
    #[must_use]
    pub fn builder() -> MaterialBuilder {
        MaterialBuilder::new()
    }

    /// Every texture the material points at.
    pub fn textures(&self) -> impl Iterator<Item = TextureKey> {
        [
            self.base_color_texture,
            self.normal_texture,
            self.occlusion_texture,
            self.emissive_texture,
        ]
        .into_iter()
        .flatten()
    }
}

impl Default for Material {
    fn default() -> Self {
        MaterialBuilder::new().build()
    }
}

pub struct MaterialBuilder {
    name: Option<String>,
    base_color: Vec4,
    base_color_texture: Option<TextureKey>,
    normal_texture: Option<TextureKey>,
    occlusion_texture: Option<TextureKey>,
    emissive_texture: Option<TextureKey>,
    emissive_factor: Vec3,
}

impl Default for MaterialBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl MaterialBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self {
            name: None,
            base_color: Vec4::ONE,
            base_color_texture: None,
            normal_texture: None,
            occlusion_texture: None,
            emissive_texture: None,
            emissive_factor: Vec3::ZERO,
        }
    }

    #[must_use]
    pub fn name(mut self, name: &str) -> Self { self.name = Some(name.to_owned()); self }
    #[must_use]
    pub fn base_color(mut self, color: Vec4) -> Self { self.base_color = color; self }
    #[must_use]
    pub fn base_color_texture(mut self, texture: TextureKey) -> Self { self.base_color_texture = Some(texture); self }
    #[must_use]
    pub fn normal_texture(mut self, texture: TextureKey) -> Self { self.normal_texture = Some(texture); self }
    #[must_use]
    pub fn occlusion_texture(mut self, texture: TextureKey) -> Self { self.occlusion_texture = Some(texture); self }
    #[must_use]
    pub fn emissive_texture(mut self, texture: TextureKey) -> Self { self.emissive_texture = Some(texture); self }
    #[must_use]
    pub fn emissive_factor(mut self, factor: Vec3) -> Self { self.emissive_factor = factor; self }

    #[must_use]
    pub fn build(self) -> Material {
        Material {
            uuid: Uuid::new_v4(),
            name: self.name,
            base_color: self.base_color,
            base_color_texture: self.base_color_texture,
            normal_texture: self.normal_texture,
            occlusion_texture: self.occlusion_texture,
            emissive_texture: self.emissive_texture,
            emissive_factor: self.emissive_factor,
        }
    }
}
