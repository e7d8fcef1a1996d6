//! Bindings to the native engine's exported C symbols.
//!
//! Linked only with the `native` feature; the host build must provide the
//! `pge_*` symbols at link time.

use std::ffi::c_void;

use crate::bridge::events::EventSink;
use crate::gateway::callbacks;
use crate::gateway::{CallbackKind, NativeEngine, NativeStatus};

unsafe extern "C" {
    fn pge_window_create() -> u32;
    fn pge_set_node_translation(node: u32, x: f32, y: f32, z: f32);
    fn pge_set_node_rotation(node: u32, x: f32, y: f32, z: f32, w: f32);
    fn pge_set_node_scale(node: u32, x: f32, y: f32, z: f32);
    fn pge_register_callback(callback: *const c_void, kind: u32);
}

/// [`NativeEngine`] backed by the real engine.
///
/// The native side reports no status for transform pushes, so those always
/// succeed from our point of view.
#[derive(Debug, Default, Clone, Copy)]
pub struct FfiEngine;

impl FfiEngine {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn callback_ptr(kind: CallbackKind) -> *const c_void {
        match kind {
            CallbackKind::Keyboard => {
                callbacks::on_keyboard_event as extern "C" fn(u32, bool) as *const c_void
            }
            CallbackKind::MouseMoved => {
                callbacks::on_mouse_moved as extern "C" fn(f32, f32) as *const c_void
            }
            CallbackKind::Process => callbacks::on_process as extern "C" fn() as *const c_void,
            CallbackKind::Window => {
                callbacks::on_window_event as extern "C" fn(u32, u32) as *const c_void
            }
            CallbackKind::Generic => {
                callbacks::on_event as unsafe extern "C" fn(*const u8, usize) as *const c_void
            }
        }
    }
}

impl NativeEngine for FfiEngine {
    fn create_window(&self) -> u32 {
        // SAFETY: no arguments; returns a handle or the sentinel.
        unsafe { pge_window_create() }
    }

    fn set_node_translation(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus {
        // SAFETY: plain values; unknown handles are ignored natively.
        unsafe { pge_set_node_translation(node, x, y, z) };
        Ok(())
    }

    fn set_node_rotation(&self, node: u32, x: f32, y: f32, z: f32, w: f32) -> NativeStatus {
        // SAFETY: as above.
        unsafe { pge_set_node_rotation(node, x, y, z, w) };
        Ok(())
    }

    fn set_node_scale(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus {
        // SAFETY: as above.
        unsafe { pge_set_node_scale(node, x, y, z) };
        Ok(())
    }

    fn register_callback(&self, kind: CallbackKind, sink: &EventSink) {
        callbacks::install(sink.clone());
        // SAFETY: the pointer is a `'static` extern "C" fn whose signature
        // matches the one the engine expects for `kind`.
        unsafe { pge_register_callback(Self::callback_ptr(kind), kind.tag()) };
    }

    fn unregister_callbacks(&self) {
        callbacks::uninstall();
    }
}
