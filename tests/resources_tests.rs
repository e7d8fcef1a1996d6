//! Resource Catalog Tests
//!
//! Tests for:
//! - Mesh validation and geometry queries
//! - Material texture references and catalog validation
//! - Model bundles and removal semantics

use glam::{Vec3, Vec4};

use pge::errors::{PgeError, ResourceKind};
use pge::resources::{Material, Mesh, Model3D, ResourceCatalog, Texture};

// ============================================================================
// Meshes
// ============================================================================

#[test]
fn mesh_index_count_must_form_triangles() {
    let result = Mesh::new("strip", vec![Vec3::ZERO; 4], vec![0, 1, 2, 3]);
    assert!(matches!(result, Err(PgeError::InvalidResource(_))));
}

#[test]
fn meshes_get_distinct_uuids() {
    let a = Mesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]).unwrap();
    let b = a.clone();
    let c = Mesh::new("tri", vec![Vec3::ZERO, Vec3::X, Vec3::Y], vec![0, 1, 2]).unwrap();
    assert_eq!(a.uuid, b.uuid);
    assert_ne!(a.uuid, c.uuid);
    assert_eq!(a.triangle_count(), 1);
}

#[test]
fn empty_mesh_has_no_bounds() {
    let mesh = Mesh::new("empty", vec![], vec![]).unwrap();
    assert_eq!(mesh.bounds(), None);
}

#[test]
fn catalog_finds_meshes_by_name() {
    let mut catalog = ResourceCatalog::new();
    let cube = catalog.insert_mesh(Mesh::cube(1.0));
    assert_eq!(catalog.find_mesh("Cube"), Some(cube));
    assert_eq!(catalog.mesh(cube).unwrap().vertices().len(), 8);
    assert_eq!(catalog.mesh_count(), 1);
}

// ============================================================================
// Textures & Materials
// ============================================================================

#[test]
fn texture_aspect() {
    let tex = Texture::new("sky", 2048, 1024).with_uri("textures/sky.png");
    assert_eq!(tex.aspect(), Some(2.0));
    assert_eq!(tex.uri.as_deref(), Some("textures/sky.png"));
    assert_eq!(Texture::new("broken", 4, 0).aspect(), None);
}

#[test]
fn material_lists_its_textures() {
    let mut catalog = ResourceCatalog::new();
    let albedo = catalog.insert_texture(Texture::new("albedo", 512, 512));
    let normal = catalog.insert_texture(Texture::new("normal", 512, 512));

    let material = Material::builder()
        .name("brick")
        .base_color(Vec4::new(0.8, 0.3, 0.2, 1.0))
        .base_color_texture(albedo)
        .normal_texture(normal)
        .build();

    assert_eq!(material.textures().collect::<Vec<_>>(), vec![albedo, normal]);
    let key = catalog.insert_material(material).unwrap();
    assert_eq!(catalog.material(key).unwrap().name.as_deref(), Some("brick"));
}

#[test]
fn material_with_unknown_texture_is_rejected() {
    let mut catalog = ResourceCatalog::new();
    let tex = catalog.insert_texture(Texture::new("gone", 1, 1));
    catalog.remove_texture(tex);

    let material = Material::builder().emissive_texture(tex).build();
    assert!(matches!(
        catalog.insert_material(material),
        Err(PgeError::InvalidResource(_))
    ));
    assert_eq!(catalog.material_count(), 0);
}

#[test]
fn default_material_is_white_and_untextured() {
    let material = Material::default();
    assert_eq!(material.base_color, Vec4::ONE);
    assert_eq!(material.textures().count(), 0);
}

// ============================================================================
// Models & Removal
// ============================================================================

#[test]
fn model_must_reference_catalog_entries() {
    let mut catalog = ResourceCatalog::new();
    let mesh = catalog.insert_mesh(Mesh::cube(1.0));
    let tex = catalog.insert_texture(Texture::new("t", 1, 1));

    let mut model = Model3D::new("crate.glb");
    model.meshes.push(mesh);
    model.textures.push(tex);
    let key = catalog.insert_model(model.clone()).unwrap();
    assert_eq!(catalog.model(key).unwrap().name, "crate.glb");

    catalog.remove_mesh(mesh);
    assert!(matches!(catalog.insert_model(model), Err(PgeError::InvalidResource(_))));
}

#[test]
fn removed_descriptor_outlives_its_holders() {
    let mut catalog = ResourceCatalog::new();
    let key = catalog.insert_texture(Texture::new("albedo", 16, 16));
    let held = catalog.texture(key).unwrap();

    let removed = catalog.remove_texture(key).unwrap();
    assert_eq!(held.name, removed.name);
    assert_eq!(catalog.texture(key), Err(PgeError::StaleHandle(ResourceKind::Texture)));
    assert_eq!(catalog.texture_count(), 0);
}
