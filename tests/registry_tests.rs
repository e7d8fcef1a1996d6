//! Identity Registry Tests
//!
//! Tests for:
//! - Handle issue and lookup in both directions
//! - Release semantics (double release, reuse order)
//! - Adopting natively allocated handles

use slotmap::{SlotMap, new_key_type};

use pge::registry::{Handle, IdentityRegistry};

new_key_type! {
    struct ThingKey;
}

fn setup(n: usize) -> (SlotMap<ThingKey, ()>, Vec<ThingKey>) {
    let mut things = SlotMap::with_key();
    let keys = (0..n).map(|_| things.insert(())).collect();
    (things, keys)
}

// ============================================================================
// Issue / Lookup
// ============================================================================

#[test]
fn register_maps_both_ways() {
    let (_things, keys) = setup(3);
    let mut registry = IdentityRegistry::new();
    let handles: Vec<Handle> = keys.iter().map(|&k| registry.register(k)).collect();

    for (&key, &handle) in keys.iter().zip(&handles) {
        assert_eq!(registry.resolve(key), Some(handle));
        assert_eq!(registry.lookup(handle), Some(key));
    }
    assert_eq!(registry.len(), 3);
    assert!(handles.iter().all(|h| h.raw() != Handle::SENTINEL));
}

#[test]
fn registering_same_key_twice_keeps_handle() {
    let (_things, keys) = setup(1);
    let mut registry = IdentityRegistry::new();
    let first = registry.register(keys[0]);
    assert_eq!(registry.register(keys[0]), first);
    assert_eq!(registry.len(), 1);
}

// ============================================================================
// Release
// ============================================================================

#[test]
fn double_release_is_a_no_op() {
    let (_things, keys) = setup(2);
    let mut registry = IdentityRegistry::new();
    let a = registry.register(keys[0]);
    let b = registry.register(keys[1]);

    assert!(registry.release(a));
    assert!(!registry.release(a));

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.lookup(a), None);
    assert_eq!(registry.resolve(keys[0]), None);
    assert_eq!(registry.lookup(b), Some(keys[1]));
}

#[test]
fn released_handles_are_reused_in_release_order() {
    let (_things, keys) = setup(5);
    let mut registry = IdentityRegistry::new();
    let h: Vec<Handle> = keys[..3].iter().map(|&k| registry.register(k)).collect();

    registry.release(h[1]);
    registry.release(h[0]);

    assert_eq!(registry.register(keys[3]), h[1]);
    assert_eq!(registry.register(keys[4]), h[0]);
    assert_eq!(registry.lookup(h[1]), Some(keys[3]));
}

#[test]
fn release_key_returns_the_handle() {
    let (_things, keys) = setup(1);
    let mut registry = IdentityRegistry::new();
    let handle = registry.register(keys[0]);
    assert_eq!(registry.release_key(keys[0]), Some(handle));
    assert_eq!(registry.release_key(keys[0]), None);
    assert!(registry.is_empty());
}

// ============================================================================
// Adopted handles
// ============================================================================

#[test]
fn adopted_handles_are_never_reissued() {
    let (_things, keys) = setup(3);
    let mut registry = IdentityRegistry::new();
    let native = Handle::from_raw(500).unwrap();

    assert!(registry.register_with(keys[0], native));
    assert!(!registry.register_with(keys[1], native));
    assert_eq!(registry.lookup(native), Some(keys[0]));

    registry.release(native);
    let issued = registry.register(keys[2]);
    assert_ne!(issued, native);
}

#[test]
fn iter_lists_live_pairs() {
    let (_things, keys) = setup(3);
    let mut registry = IdentityRegistry::new();
    for &k in &keys {
        registry.register(k);
    }
    registry.release_key(keys[1]);

    let mut live: Vec<ThingKey> = registry.iter().map(|(k, _)| k).collect();
    live.sort();
    let mut expected = vec![keys[0], keys[2]];
    expected.sort();
    assert_eq!(live, expected);
}
