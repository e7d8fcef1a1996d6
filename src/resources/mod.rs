//! Resource Catalog
//!
//! Immutable descriptors referenced by nodes:
//! - [`Mesh`]: vertex positions and triangle indices
//! - [`Texture`]: image metadata and source URI
//! - [`Material`]: surface parameters referencing textures by key
//! - [`Model3D`]: the bundle an external loader produces
//!
//! Descriptors are frozen once inserted into the [`ResourceCatalog`]; it
//! hands out `Arc`s and never mutable access. Nothing tracks which nodes use
//! a descriptor.

pub mod catalog;
pub mod material;
pub mod mesh;
pub mod model;
pub mod texture;

pub use catalog::ResourceCatalog;
pub use material::{Material, MaterialBuilder};
pub use mesh::Mesh;
pub use model::Model3D;
pub use texture::Texture;

use slotmap::new_key_type;

new_key_type! {
    pub struct MeshKey;
    pub struct TextureKey;
    pub struct MaterialKey;
    pub struct ModelKey;
}
