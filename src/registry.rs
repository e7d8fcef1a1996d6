//! Identity Registry
//!
//! Correlates script-side keys (slot-map keys owned by the node graph or the
//! window registry) with the opaque [`Handle`]s the native engine knows
//! resources by.
//!
//! # Handle Lifecycle
//!
//! - [`IdentityRegistry::register`] issues a fresh handle, exactly once per
//!   resource creation. Released handles are reissued in release order.
//! - [`IdentityRegistry::register_with`] adopts a handle that the native
//!   engine allocated itself (windows). Adopted handles are never reissued.
//! - [`IdentityRegistry::release`] invalidates a mapping. Releasing twice is
//!   a no-op.

use std::collections::VecDeque;
use std::fmt;

use rustc_hash::FxHashMap;
use slotmap::{Key, SecondaryMap};

/// Opaque identifier of a native-engine resource.
///
/// `0` is reserved as the invalid sentinel and never wraps a live resource.
/// Handles are compared and hashed, never computed with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Handle(u32);

impl Handle {
    /// The raw value the native engine uses to signal failure.
    pub const SENTINEL: u32 = 0;

    /// Wraps a raw native value, rejecting the sentinel.
    #[inline]
    #[must_use]
    pub fn from_raw(raw: u32) -> Option<Self> {
        (raw != Self::SENTINEL).then_some(Self(raw))
    }

    /// Returns the value passed across the FFI boundary.
    #[inline]
    #[must_use]
    pub fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy)]
struct Entry<K> {
    key: K,
    issued: bool,
}

/// Bidirectional `K <-> Handle` map.
///
/// Single-writer: the registry is mutated only from the thread driving the
/// engine loop and holds no locks.
#[derive(Debug)]
pub struct IdentityRegistry<K: Key> {
    by_key: SecondaryMap<K, Handle>,
    by_handle: FxHashMap<Handle, Entry<K>>,
    free: VecDeque<Handle>,
    next: u32,
}

impl<K: Key> Default for IdentityRegistry<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Key> IdentityRegistry<K> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            by_key: SecondaryMap::new(),
            by_handle: FxHashMap::default(),
            free: VecDeque::new(),
            next: 1,
        }
    }

    /// Issues a handle for `key`.
    ///
    /// A key that is already registered keeps its current handle.
    pub fn register(&mut self, key: K) -> Handle {
        if let Some(&existing) = self.by_key.get(key) {
            log::warn!("Key registered twice, keeping handle {existing}");
            return existing;
        }

        let handle = match self.free.pop_front() {
            Some(handle) => handle,
            None => {
                let handle = Handle(self.next);
                self.next = self.next.wrapping_add(1).max(1);
                handle
            }
        };

        self.by_key.insert(key, handle);
        self.by_handle.insert(handle, Entry { key, issued: true });
        handle
    }

    /// Adopts a natively allocated handle for `key`.
    ///
    /// Returns `false` (and changes nothing) if the handle is still mapped to
    /// another live key, or if `key` already has a handle.
    pub fn register_with(&mut self, key: K, handle: Handle) -> bool {
        if self.by_handle.contains_key(&handle) || self.by_key.contains_key(key) {
            return false;
        }
        self.by_key.insert(key, handle);
        self.by_handle.insert(handle, Entry { key, issued: false });
        true
    }

    /// Invalidates the mapping for `handle`.
    ///
    /// Returns `true` if a mapping was removed. A second release of the same
    /// handle returns `false` and leaves the registry untouched.
    pub fn release(&mut self, handle: Handle) -> bool {
        let Some(entry) = self.by_handle.remove(&handle) else {
            return false;
        };
        self.by_key.remove(entry.key);
        if entry.issued {
            self.free.push_back(handle);
        }
        true
    }

    /// Releases whatever handle `key` holds.
    pub fn release_key(&mut self, key: K) -> Option<Handle> {
        let handle = *self.by_key.get(key)?;
        self.release(handle);
        Some(handle)
    }

    #[inline]
    #[must_use]
    pub fn resolve(&self, key: K) -> Option<Handle> {
        self.by_key.get(key).copied()
    }

    #[inline]
    #[must_use]
    pub fn lookup(&self, handle: Handle) -> Option<K> {
        self.by_handle.get(&handle).map(|e| e.key)
    }

    #[inline]
    #[must_use]
    pub fn contains(&self, handle: Handle) -> bool {
        self.by_handle.contains_key(&handle)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_handle.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_handle.is_empty()
    }

    /// Iterates over live `(key, handle)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (K, Handle)> + '_ {
        self.by_key.iter().map(|(k, &h)| (k, h))
    }
}
