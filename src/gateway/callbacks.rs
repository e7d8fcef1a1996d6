//! Native → bridge callback entry points.
//!
//! These are the function pointers handed to `pge_register_callback`. The
//! native engine calls them on its loop thread, outside our scheduling
//! control, so each one only decodes its arguments and enqueues a
//! [`NativeEvent`]; user handlers run later from the runtime tick.
//!
//! Native callbacks carry no context pointer, so the destination sink lives
//! in a process-wide slot installed by the engine implementation.

use parking_lot::Mutex;

use crate::bridge::events::{EventSink, NativeEvent};

static SINK: Mutex<Option<EventSink>> = parking_lot::const_mutex(None);

/// Routes subsequent callbacks into `sink`, replacing any previous sink.
pub fn install(sink: EventSink) {
    *SINK.lock() = Some(sink);
}

/// Drops the installed sink; callbacks fired afterwards are discarded.
pub fn uninstall() {
    SINK.lock().take();
}

#[must_use]
pub fn is_installed() -> bool {
    SINK.lock().is_some()
}

fn forward(event: Option<NativeEvent>) {
    let Some(event) = event else {
        return;
    };
    match SINK.lock().as_ref() {
        Some(sink) => {
            sink.send(event);
        }
        None => log::warn!("Native callback fired with no sink installed, dropping {event:?}"),
    }
}

pub extern "C" fn on_keyboard_event(key_code: u32, pressed: bool) {
    forward(Some(NativeEvent::keyboard(key_code, pressed)));
}

pub extern "C" fn on_mouse_moved(dx: f32, dy: f32) {
    forward(Some(NativeEvent::mouse_moved(dx, dy)));
}

pub extern "C" fn on_process() {
    forward(Some(NativeEvent::Process));
}

pub extern "C" fn on_window_event(handle: u32, kind: u32) {
    forward(NativeEvent::window(handle, kind));
}

/// Generic event envelope.
///
/// # Safety
///
/// `payload` must be null or point to `len` readable bytes for the duration
/// of the call. The bytes are copied before returning.
pub unsafe extern "C" fn on_event(payload: *const u8, len: usize) {
    let bytes = if payload.is_null() || len == 0 {
        Vec::new()
    } else {
        // SAFETY: guaranteed by the caller contract above.
        unsafe { std::slice::from_raw_parts(payload, len) }.to_vec()
    };
    forward(Some(NativeEvent::Custom(bytes)));
}
