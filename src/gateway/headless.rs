use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

use glam::{Quat, Vec3};
use parking_lot::Mutex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::bridge::events::{EventSink, NativeEvent, WindowLifecycle};
use crate::gateway::{CallbackKind, NativeEngine, NativeStatus};
use crate::registry::Handle;

/// A call the headless engine received, in arrival order.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeCall {
    CreateWindow { handle: u32 },
    SetTranslation { node: u32, value: Vec3 },
    SetRotation { node: u32, value: Quat },
    SetScale { node: u32, value: Vec3 },
    RegisterCallback(CallbackKind),
    UnregisterCallbacks,
}

#[derive(Default)]
struct Callbacks {
    sink: Option<EventSink>,
    kinds: FxHashSet<CallbackKind>,
}

/// In-process [`NativeEngine`] with no renderer behind it.
///
/// Records every call, allocates window handles from a counter and lets the
/// host fire callbacks directly with the `fire_*` helpers. Window creation
/// is acknowledged with a [`WindowLifecycle::Created`] event unless
/// [`HeadlessEngine::set_auto_ack_windows`] turns it off.
///
/// Each instance keeps its own callback sink, so independent engines never
/// see each other's events.
pub struct HeadlessEngine {
    calls: Mutex<Vec<NativeCall>>,
    callbacks: Mutex<Callbacks>,
    next_window: AtomicU32,
    auto_ack_windows: AtomicBool,
    fail_windows: AtomicBool,
    failing_nodes: Mutex<FxHashMap<u32, String>>,
}

impl Default for HeadlessEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessEngine {
    #[must_use]
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            callbacks: Mutex::new(Callbacks::default()),
            next_window: AtomicU32::new(1),
            auto_ack_windows: AtomicBool::new(true),
            fail_windows: AtomicBool::new(false),
            failing_nodes: Mutex::new(FxHashMap::default()),
        }
    }

    pub fn set_auto_ack_windows(&self, enabled: bool) {
        self.auto_ack_windows.store(enabled, Ordering::Relaxed);
    }

    /// Makes window creation return the sentinel handle.
    pub fn fail_window_creation(&self, fail: bool) {
        self.fail_windows.store(fail, Ordering::Relaxed);
    }

    /// Makes every transform call for `node` fail with `reason`.
    pub fn fail_node(&self, node: Handle, reason: impl Into<String>) {
        self.failing_nodes.lock().insert(node.raw(), reason.into());
    }

    pub fn clear_failures(&self) {
        self.fail_windows.store(false, Ordering::Relaxed);
        self.failing_nodes.lock().clear();
    }

    // ========================================================================
    // Call log
    // ========================================================================

    #[must_use]
    pub fn calls(&self) -> Vec<NativeCall> {
        self.calls.lock().clone()
    }

    /// Returns and clears the call log.
    pub fn take_calls(&self) -> Vec<NativeCall> {
        std::mem::take(&mut *self.calls.lock())
    }

    /// Most recent translation pushed for `node`.
    #[must_use]
    pub fn last_translation(&self, node: Handle) -> Option<Vec3> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            NativeCall::SetTranslation { node: n, value } if *n == node.raw() => Some(*value),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_rotation(&self, node: Handle) -> Option<Quat> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            NativeCall::SetRotation { node: n, value } if *n == node.raw() => Some(*value),
            _ => None,
        })
    }

    #[must_use]
    pub fn last_scale(&self, node: Handle) -> Option<Vec3> {
        self.calls.lock().iter().rev().find_map(|call| match call {
            NativeCall::SetScale { node: n, value } if *n == node.raw() => Some(*value),
            _ => None,
        })
    }

    #[must_use]
    pub fn is_registered(&self, kind: CallbackKind) -> bool {
        self.callbacks.lock().kinds.contains(&kind)
    }

    // ========================================================================
    // Callback simulation
    // ========================================================================

    /// Delivers `event` as if the native engine had called back.
    ///
    /// Returns `false` if no sink is registered for the event's kind.
    pub fn fire(&self, event: NativeEvent) -> bool {
        let kind = event.callback_kind();
        let callbacks = self.callbacks.lock();
        match &callbacks.sink {
            Some(sink) if callbacks.kinds.contains(&kind) => sink.send(event),
            _ => {
                log::debug!("Dropping {event:?}: no {kind:?} callback registered");
                false
            }
        }
    }

    pub fn fire_keyboard(&self, key_code: u32, pressed: bool) -> bool {
        self.fire(NativeEvent::keyboard(key_code, pressed))
    }

    pub fn fire_mouse_moved(&self, dx: f32, dy: f32) -> bool {
        self.fire(NativeEvent::mouse_moved(dx, dy))
    }

    pub fn fire_process(&self) -> bool {
        self.fire(NativeEvent::Process)
    }

    pub fn fire_window_event(&self, handle: Handle, lifecycle: WindowLifecycle) -> bool {
        self.fire(NativeEvent::Window { handle, lifecycle })
    }

    pub fn fire_custom(&self, payload: &[u8]) -> bool {
        self.fire(NativeEvent::Custom(payload.to_vec()))
    }

    fn record(&self, call: NativeCall) {
        self.calls.lock().push(call);
    }

    fn node_status(&self, node: u32) -> NativeStatus {
        match self.failing_nodes.lock().get(&node) {
            Some(reason) => Err(reason.clone()),
            None => Ok(()),
        }
    }
}

impl NativeEngine for HeadlessEngine {
    fn create_window(&self) -> u32 {
        if self.fail_windows.load(Ordering::Relaxed) {
            self.record(NativeCall::CreateWindow {
                handle: Handle::SENTINEL,
            });
            return Handle::SENTINEL;
        }

        let raw = self.next_window.fetch_add(1, Ordering::Relaxed);
        self.record(NativeCall::CreateWindow { handle: raw });

        if self.auto_ack_windows.load(Ordering::Relaxed)
            && let Some(handle) = Handle::from_raw(raw)
        {
            self.fire_window_event(handle, WindowLifecycle::Created);
        }
        raw
    }

    fn set_node_translation(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus {
        self.record(NativeCall::SetTranslation {
            node,
            value: Vec3::new(x, y, z),
        });
        self.node_status(node)
    }

    fn set_node_rotation(&self, node: u32, x: f32, y: f32, z: f32, w: f32) -> NativeStatus {
        self.record(NativeCall::SetRotation {
            node,
            value: Quat::from_xyzw(x, y, z, w),
        });
        self.node_status(node)
    }

    fn set_node_scale(&self, node: u32, x: f32, y: f32, z: f32) -> NativeStatus {
        self.record(NativeCall::SetScale {
            node,
            value: Vec3::new(x, y, z),
        });
        self.node_status(node)
    }

    fn register_callback(&self, kind: CallbackKind, sink: &EventSink) {
        self.record(NativeCall::RegisterCallback(kind));
        let mut callbacks = self.callbacks.lock();
        callbacks.sink = Some(sink.clone());
        callbacks.kinds.insert(kind);
    }

    fn unregister_callbacks(&self) {
        self.record(NativeCall::UnregisterCallbacks);
        let mut callbacks = self.callbacks.lock();
        callbacks.sink = None;
        callbacks.kinds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bridge::events::EventQueue;

    #[test]
    fn window_creation_is_acknowledged_through_the_sink() {
        let engine = HeadlessEngine::new();
        let queue = EventQueue::new();
        engine.register_callback(CallbackKind::Window, &queue.sink());

        let raw = engine.create_window();
        let events = queue.drain(None);
        assert_eq!(
            events,
            vec![NativeEvent::Window {
                handle: Handle::from_raw(raw).unwrap(),
                lifecycle: WindowLifecycle::Created,
            }]
        );
    }

    #[test]
    fn unregistered_kinds_are_dropped() {
        let engine = HeadlessEngine::new();
        let queue = EventQueue::new();
        engine.register_callback(CallbackKind::Process, &queue.sink());

        assert!(engine.fire_process());
        assert!(!engine.fire_keyboard(87, true));

        engine.unregister_callbacks();
        assert!(!engine.fire_process());
        assert_eq!(queue.drain(None).len(), 1);
    }

    #[test]
    fn failing_node_reports_reason() {
        let engine = HeadlessEngine::new();
        let handle = Handle::from_raw(3).unwrap();
        engine.fail_node(handle, "node not found");
        assert_eq!(
            engine.set_node_scale(3, 1.0, 1.0, 1.0),
            Err("node not found".to_owned())
        );
        assert_eq!(engine.last_scale(handle), Some(Vec3::ONE));
    }
}
