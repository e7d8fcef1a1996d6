//! Decoded native events and the queue that carries them to the loop thread.

use crate::gateway::CallbackKind;
use crate::registry::Handle;

/// Key codes the engine reports for the keys scripts commonly bind.
///
/// Unknown codes are still delivered; [`KeyboardEvent::key`] just returns
/// `None` for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum KeyCode {
    ArrowLeft = 37,
    ArrowUp = 38,
    ArrowRight = 39,
    ArrowDown = 40,
    A = 65,
    D = 68,
    S = 83,
    W = 87,
}

impl KeyCode {
    #[must_use]
    pub fn from_code(code: u32) -> Option<Self> {
        Some(match code {
            37 => KeyCode::ArrowLeft,
            38 => KeyCode::ArrowUp,
            39 => KeyCode::ArrowRight,
            40 => KeyCode::ArrowDown,
            65 => KeyCode::A,
            68 => KeyCode::D,
            83 => KeyCode::S,
            87 => KeyCode::W,
            _ => return None,
        })
    }

    #[inline]
    #[must_use]
    pub fn code(self) -> u32 {
        self as u32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyboardEvent {
    pub key_code: u32,
    pub pressed: bool,
}

impl KeyboardEvent {
    #[inline]
    #[must_use]
    pub fn key(&self) -> Option<KeyCode> {
        KeyCode::from_code(self.key_code)
    }

    #[inline]
    #[must_use]
    pub fn is(&self, key: KeyCode) -> bool {
        self.key_code == key.code()
    }
}

/// Relative pointer motion since the previous event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseMovedEvent {
    pub dx: f32,
    pub dy: f32,
}

/// Window lifecycle notifications from the native side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowLifecycle {
    /// Acknowledges a `pge_window_create` request.
    Created,
    /// The user asked the OS to close the window.
    CloseRequested,
    Focused,
}

impl WindowLifecycle {
    #[must_use]
    pub fn from_tag(tag: u32) -> Option<Self> {
        match tag {
            0 => Some(WindowLifecycle::Created),
            1 => Some(WindowLifecycle::CloseRequested),
            2 => Some(WindowLifecycle::Focused),
            _ => None,
        }
    }
}

/// A native callback invocation, decoded into owned values.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeEvent {
    Keyboard(KeyboardEvent),
    MouseMoved(MouseMovedEvent),
    /// Per-tick heartbeat.
    Process,
    Window {
        handle: Handle,
        lifecycle: WindowLifecycle,
    },
    /// Generic envelope; also used by background producers to hand work to
    /// the loop thread.
    Custom(Vec<u8>),
}

impl NativeEvent {
    #[must_use]
    pub fn keyboard(key_code: u32, pressed: bool) -> Self {
        NativeEvent::Keyboard(KeyboardEvent { key_code, pressed })
    }

    #[must_use]
    pub fn mouse_moved(dx: f32, dy: f32) -> Self {
        NativeEvent::MouseMoved(MouseMovedEvent { dx, dy })
    }

    /// Decodes a raw window callback. Returns `None` for the sentinel handle
    /// or an unknown lifecycle tag.
    #[must_use]
    pub fn window(handle: u32, tag: u32) -> Option<Self> {
        let Some(handle) = Handle::from_raw(handle) else {
            log::warn!("Window event for the invalid handle, ignoring");
            return None;
        };
        let Some(lifecycle) = WindowLifecycle::from_tag(tag) else {
            log::warn!("Unknown window event tag {tag} for {handle}, ignoring");
            return None;
        };
        Some(NativeEvent::Window { handle, lifecycle })
    }

    /// The callback registration this event arrives through.
    #[must_use]
    pub fn callback_kind(&self) -> CallbackKind {
        match self {
            NativeEvent::Keyboard(_) => CallbackKind::Keyboard,
            NativeEvent::MouseMoved(_) => CallbackKind::MouseMoved,
            NativeEvent::Process => CallbackKind::Process,
            NativeEvent::Window { .. } => CallbackKind::Window,
            NativeEvent::Custom(_) => CallbackKind::Generic,
        }
    }
}

/// Producer side of the event queue.
///
/// Cloneable and `Send`; sending never blocks.
#[derive(Debug, Clone)]
pub struct EventSink {
    sender: flume::Sender<NativeEvent>,
}

impl EventSink {
    /// Enqueues `event`. Returns `false` if the queue has been dropped.
    pub fn send(&self, event: NativeEvent) -> bool {
        log::trace!("Enqueue {event:?}");
        if let Err(e) = self.sender.send(event) {
            log::warn!("Event queue disconnected, dropping {:?}", e.into_inner());
            return false;
        }
        true
    }
}

/// Unbounded multi-producer queue drained by the loop thread.
#[derive(Debug)]
pub struct EventQueue {
    sender: flume::Sender<NativeEvent>,
    receiver: flume::Receiver<NativeEvent>,
}

impl Default for EventQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl EventQueue {
    #[must_use]
    pub fn new() -> Self {
        let (sender, receiver) = flume::unbounded();
        Self { sender, receiver }
    }

    #[must_use]
    pub fn sink(&self) -> EventSink {
        EventSink {
            sender: self.sender.clone(),
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Takes queued events in arrival order, at most `limit` if given.
    pub fn drain(&self, limit: Option<usize>) -> Vec<NativeEvent> {
        let limit = limit.unwrap_or(usize::MAX);
        self.receiver.try_iter().take(limit).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_codes_decode() {
        let event = KeyboardEvent {
            key_code: 87,
            pressed: true,
        };
        assert_eq!(event.key(), Some(KeyCode::W));
        assert!(event.is(KeyCode::W));
        assert_eq!(KeyCode::from_code(38), Some(KeyCode::ArrowUp));
        assert_eq!(KeyCode::from_code(1), None);
    }

    #[test]
    fn drain_respects_limit_and_order() {
        let queue = EventQueue::new();
        let sink = queue.sink();
        for i in 0..5 {
            sink.send(NativeEvent::keyboard(i, true));
        }
        let first = queue.drain(Some(2));
        assert_eq!(first.len(), 2);
        assert_eq!(first[0], NativeEvent::keyboard(0, true));
        assert_eq!(queue.len(), 3);
        assert_eq!(queue.drain(None)[0], NativeEvent::keyboard(2, true));
        assert!(queue.is_empty());
    }

    #[test]
    fn invalid_window_events_are_rejected() {
        assert!(NativeEvent::window(0, 0).is_none());
        assert!(NativeEvent::window(3, 9).is_none());
        assert!(NativeEvent::window(3, 1).is_some());
    }
}
