//! Transform Tests
//!
//! Tests for:
//! - World transform composition (parent world * child local)
//! - Lazy recompute and cache invalidation after ancestor mutation
//! - Eager propagation with `update_world_transforms`
//! - Forwarding of translation/rotation/scale to the native engine

use std::f32::consts::FRAC_PI_2;

use glam::{Affine3A, EulerRot, Quat, Vec3};

use pge::gateway::{Gateway, NativeCall};
use pge::scene::{NodeGraph, Transform};

const EPSILON: f32 = 1e-4;

fn approx_vec3(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

fn approx_affine(a: &Affine3A, b: &Affine3A) -> bool {
    a.abs_diff_eq(*b, EPSILON)
}

fn graph() -> (NodeGraph, std::sync::Arc<pge::HeadlessEngine>) {
    let (gateway, engine) = Gateway::headless();
    (NodeGraph::new(gateway), engine)
}

// ============================================================================
// Composition
// ============================================================================

#[test]
fn child_world_follows_parent_translation() {
    let (mut g, _) = graph();
    let a = g.create_node();
    let b = g.create_node();
    g.attach(b, a).unwrap();
    g.set_translation(b, Vec3::new(1.0, 0.0, 0.0)).unwrap();

    g.set_translation(a, Vec3::new(5.0, 0.0, 0.0)).unwrap();

    let world = g.world_transform(b).unwrap();
    assert!(approx_vec3(world.translation.into(), Vec3::new(6.0, 0.0, 0.0)));
}

#[test]
fn world_is_parent_world_times_local_after_mutations() {
    let (mut g, _) = graph();
    let root = g.create_node();
    let mid = g.create_node();
    let leaf = g.create_node();
    g.attach(mid, root).unwrap();
    g.attach(leaf, mid).unwrap();

    g.set_rotation(root, Quat::from_rotation_y(FRAC_PI_2)).unwrap();
    g.set_scale(mid, Vec3::splat(2.0)).unwrap();
    g.set_translation(mid, Vec3::new(0.0, 1.0, 0.0)).unwrap();
    g.set_translation(leaf, Vec3::new(1.0, 0.0, 0.0)).unwrap();
    g.rotate_euler(leaf, EulerRot::XYZ, 0.3, 0.0, 0.1).unwrap();
    g.set_translation(root, Vec3::new(-3.0, 0.0, 2.0)).unwrap();

    for (child, parent) in [(mid, root), (leaf, mid)] {
        let parent_world = g.world_transform(parent).unwrap();
        let local = g.node(child).unwrap().local_matrix();
        let child_world = g.world_transform(child).unwrap();
        assert!(approx_affine(&child_world, &(parent_world * local)));
    }
}

#[test]
fn reparenting_recomputes_world() {
    let (mut g, _) = graph();
    let a = g.create_node();
    let b = g.create_node();
    let child = g.create_node();
    g.set_translation(a, Vec3::X).unwrap();
    g.set_translation(b, Vec3::Y).unwrap();

    g.attach(child, a).unwrap();
    assert!(approx_vec3(g.world_transform(child).unwrap().translation.into(), Vec3::X));

    g.attach(child, b).unwrap();
    assert!(approx_vec3(g.world_transform(child).unwrap().translation.into(), Vec3::Y));

    g.detach(child).unwrap();
    assert!(approx_vec3(g.world_transform(child).unwrap().translation.into(), Vec3::ZERO));
}

// ============================================================================
// Caching
// ============================================================================

#[test]
fn ancestor_mutation_marks_subtree_stale() {
    let (mut g, _) = graph();
    let a = g.create_node();
    let b = g.create_node();
    let c = g.create_node();
    g.attach(b, a).unwrap();
    g.attach(c, b).unwrap();

    g.world_transform(c).unwrap();
    assert!(!g.node(a).unwrap().is_world_stale());
    assert!(!g.node(c).unwrap().is_world_stale());

    g.set_translation(a, Vec3::Z).unwrap();
    assert!(g.node(a).unwrap().is_world_stale());
    assert!(g.node(b).unwrap().is_world_stale());
    assert!(g.node(c).unwrap().is_world_stale());
}

#[test]
fn sibling_mutation_keeps_cache() {
    let (mut g, _) = graph();
    let root = g.create_node();
    let left = g.create_node();
    let right = g.create_node();
    g.attach(left, root).unwrap();
    g.attach(right, root).unwrap();
    g.update_world_transforms();

    g.set_translation(left, Vec3::X).unwrap();
    assert!(!g.node(right).unwrap().is_world_stale());
    assert!(g.node(left).unwrap().is_world_stale());
}

#[test]
fn update_world_transforms_only_touches_stale_nodes() {
    let (mut g, _) = graph();
    let roots: Vec<_> = (0..3).map(|_| g.create_node()).collect();
    for &r in &roots {
        let child = g.create_node();
        g.attach(child, r).unwrap();
    }
    assert_eq!(g.update_world_transforms(), 6);
    assert_eq!(g.update_world_transforms(), 0);

    g.set_scale(roots[1], Vec3::splat(3.0)).unwrap();
    assert_eq!(g.update_world_transforms(), 2);
}

#[test]
fn cached_matrix_matches_lazy_query() {
    let (mut g, _) = graph();
    let a = g.create_node();
    let b = g.create_node();
    g.attach(b, a).unwrap();
    g.set_transform(
        a,
        Transform {
            translation: Vec3::new(1.0, 2.0, 3.0),
            rotation: Quat::from_rotation_z(0.5),
            scale: Vec3::splat(1.5),
        },
    )
    .unwrap();

    g.update_world_transforms();
    let cached = *g.node(b).unwrap().cached_world_matrix().unwrap();
    assert!(approx_affine(&cached, &g.world_transform(b).unwrap()));
}

// ============================================================================
// Native forwarding
// ============================================================================

#[test]
fn every_component_setter_reaches_the_engine() {
    let (mut g, engine) = graph();
    let node = g.create_node();
    let handle = g.handle_of(node).unwrap();
    engine.take_calls();

    let rotation = Quat::from_rotation_x(0.25);
    g.set_translation(node, Vec3::new(1.0, 2.0, 3.0)).unwrap();
    g.set_rotation(node, rotation).unwrap();
    g.set_scale(node, Vec3::splat(2.0)).unwrap();

    assert_eq!(
        engine.calls(),
        vec![
            NativeCall::SetTranslation {
                node: handle.raw(),
                value: Vec3::new(1.0, 2.0, 3.0)
            },
            NativeCall::SetRotation {
                node: handle.raw(),
                value: rotation
            },
            NativeCall::SetScale {
                node: handle.raw(),
                value: Vec3::splat(2.0)
            },
        ]
    );
}

#[test]
fn translate_accumulates() {
    let (mut g, engine) = graph();
    let node = g.create_node();
    g.translate(node, Vec3::X).unwrap();
    g.translate(node, Vec3::X).unwrap();
    let handle = g.handle_of(node).unwrap();
    assert_eq!(engine.last_translation(handle), Some(Vec3::new(2.0, 0.0, 0.0)));
}

#[test]
fn look_at_points_negative_z_at_target() {
    let (mut g, _) = graph();
    let node = g.create_node();
    g.look_at(node, Vec3::new(10.0, 0.0, 0.0), Vec3::Y).unwrap();
    let forward = g.node(node).unwrap().rotation() * Vec3::NEG_Z;
    assert!(approx_vec3(forward, Vec3::X));
}
