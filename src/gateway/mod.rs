//! Native Engine Gateway
//!
//! The only component allowed to cross the FFI boundary. Everything that
//! must reach the native engine (node transform pushes, window creation,
//! callback registration) funnels through [`Gateway`].
//!
//! # Seam
//!
//! [`NativeEngine`] mirrors the exported native call surface one method per
//! entry point. Two implementations ship with the crate:
//!
//! - `FfiEngine` (feature `native`): calls the real `pge_*` symbols
//! - [`HeadlessEngine`]: in-process engine that records calls and lets a
//!   host or test fire callbacks by hand
//!
//! # Call Semantics
//!
//! Every call is direct, synchronous and non-blocking. The gateway performs
//! no retries: native side effects may not be idempotent, so a failure is
//! reported as [`PgeError::NativeCallFailed`] and the caller decides.

pub mod callbacks;
#[cfg(feature = "native")]
pub mod ffi;
pub mod headless;

#[cfg(feature = "native")]
pub use ffi::FfiEngine;
pub use headless::{HeadlessEngine, NativeCall};

use std::fmt;
use std::sync::Arc;

use glam::{Quat, Vec3};

use crate::bridge::events::EventSink;
use crate::errors::{PgeError, Result};
use crate::registry::Handle;

/// Outcome of a native call that returns nothing on the wire.
pub type NativeStatus = std::result::Result<(), String>;

/// Event kinds the native engine can call back for.
///
/// The discriminant is the tag passed to `pge_register_callback`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum CallbackKind {
    Keyboard = 0,
    MouseMoved = 1,
    Process = 2,
    Window = 3,
    Generic = 4,
}

impl CallbackKind {
    pub const ALL: [CallbackKind; 5] = [
        CallbackKind::Keyboard,
        CallbackKind::MouseMoved,
        CallbackKind::Process,
        CallbackKind::Window,
        CallbackKind::Generic,
    ];

    #[inline]
    #[must_use]
    pub fn tag(self) -> u32 {
        self as u32
    }
}

/// The native engine call surface.
///
/// Implementations are called only from the thread driving the engine loop.
pub trait NativeEngine: Send + Sync {
    /// Creates or acquires a native window. Returns [`Handle::SENTINEL`] on
    /// failure.
    fn create_window(&self) -> u32;

    fn set_node_translation(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus;

    fn set_node_rotation(&self, node: u32, x: f32, y: f32, z: f32, w: f32) -> NativeStatus;

    fn set_node_scale(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus;

    /// Routes callbacks of `kind` into `sink`.
    fn register_callback(&self, kind: CallbackKind, sink: &EventSink);

    /// Stops routing callbacks. Events fired afterwards are dropped.
    fn unregister_callbacks(&self);
}

/// Cheap, cloneable front for a [`NativeEngine`].
#[derive(Clone)]
pub struct Gateway {
    engine: Arc<dyn NativeEngine>,
    trace_calls: bool,
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("trace_calls", &self.trace_calls)
            .finish_non_exhaustive()
    }
}

impl Gateway {
    #[must_use]
    pub fn new(engine: Arc<dyn NativeEngine>) -> Self {
        Self {
            engine,
            trace_calls: true,
        }
    }

    /// Gateway over a fresh [`HeadlessEngine`], returned alongside it.
    #[must_use]
    pub fn headless() -> (Self, Arc<HeadlessEngine>) {
        let engine = Arc::new(HeadlessEngine::new());
        (Self::new(engine.clone()), engine)
    }

    /// Enables or disables `trace` logging of every native call.
    #[must_use]
    pub fn with_call_tracing(mut self, enabled: bool) -> Self {
        self.trace_calls = enabled;
        self
    }

    pub fn create_window(&self) -> Result<Handle> {
        let raw = self.engine.create_window();
        if self.trace_calls {
            log::trace!("pge_window_create() -> {raw}");
        }
        Handle::from_raw(raw)
            .ok_or_else(|| PgeError::native("pge_window_create", "engine returned the invalid handle"))
    }

    pub fn set_node_translation(&self, node: Handle, value: Vec3) -> Result<()> {
        if self.trace_calls {
            log::trace!("pge_set_node_translation({node}, {value})");
        }
        self.engine
            .set_node_translation(node.raw(), value.x, value.y, value.z)
            .map_err(|reason| PgeError::native("pge_set_node_translation", reason))
    }

    pub fn set_node_rotation(&self, node: Handle, value: Quat) -> Result<()> {
        if self.trace_calls {
            log::trace!("pge_set_node_rotation({node}, {value})");
        }
        self.engine
            .set_node_rotation(node.raw(), value.x, value.y, value.z, value.w)
            .map_err(|reason| PgeError::native("pge_set_node_rotation", reason))
    }

    pub fn set_node_scale(&self, node: Handle, value: Vec3) -> Result<()> {
        if self.trace_calls {
            log::trace!("pge_set_node_scale({node}, {value})");
        }
        self.engine
            .set_node_scale(node.raw(), value.x, value.y, value.z)
            .map_err(|reason| PgeError::native("pge_set_node_scale", reason))
    }

    /// Registers every callback kind against `sink`.
    pub fn register_callbacks(&self, sink: &EventSink) {
        for kind in CallbackKind::ALL {
            if self.trace_calls {
                log::trace!("pge_register_callback({kind:?})");
            }
            self.engine.register_callback(kind, sink);
        }
    }

    pub fn unregister_callbacks(&self) {
        self.engine.unregister_callbacks();
    }
}
