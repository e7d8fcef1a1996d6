use slotmap::SlotMap;

use crate::bridge::WindowKey;
use crate::bridge::window::Window;
use crate::errors::{PgeError, ResourceKind, Result};
use crate::registry::{Handle, IdentityRegistry};

/// The bounded set of live windows.
///
/// Created with the runtime and emptied at shutdown; there is no global
/// window list. Also tracks which window receives input.
#[derive(Debug)]
pub struct WindowRegistry {
    windows: SlotMap<WindowKey, Window>,
    handles: IdentityRegistry<WindowKey>,
    focused: Option<WindowKey>,
    max_windows: usize,
}

impl WindowRegistry {
    #[must_use]
    pub fn new(max_windows: usize) -> Self {
        Self {
            windows: SlotMap::with_key(),
            handles: IdentityRegistry::new(),
            focused: None,
            max_windows,
        }
    }

    #[must_use]
    pub fn max_windows(&self) -> usize {
        self.max_windows
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.windows.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.windows.len() >= self.max_windows
    }

    /// Adds a window under the handle the engine allocated for it.
    pub(crate) fn insert(&mut self, window: Window) -> Result<WindowKey> {
        if self.is_full() {
            return Err(PgeError::WindowLimit(self.max_windows));
        }
        let handle = window.handle;
        if self.handles.contains(handle) {
            return Err(PgeError::native(
                "pge_window_create",
                format!("engine returned live window handle {handle}"),
            ));
        }
        let key = self.windows.insert(window);
        self.handles.register_with(key, handle);
        Ok(key)
    }

    /// Removes a window and releases its handle. Focus moves to another
    /// open window, if any.
    pub(crate) fn remove(&mut self, key: WindowKey) -> Option<Window> {
        let window = self.windows.remove(key)?;
        self.handles.release(window.handle);
        if self.focused == Some(key) {
            self.focused = self.windows.iter().find(|(_, w)| w.is_open()).map(|(k, _)| k);
        }
        Some(window)
    }

    pub fn get(&self, key: WindowKey) -> Result<&Window> {
        self.windows
            .get(key)
            .ok_or(PgeError::StaleHandle(ResourceKind::Window))
    }

    pub(crate) fn get_mut(&mut self, key: WindowKey) -> Result<&mut Window> {
        self.windows
            .get_mut(key)
            .ok_or(PgeError::StaleHandle(ResourceKind::Window))
    }

    #[must_use]
    pub fn contains(&self, key: WindowKey) -> bool {
        self.windows.contains_key(key)
    }

    #[must_use]
    pub fn by_handle(&self, handle: Handle) -> Option<WindowKey> {
        self.handles.lookup(handle)
    }

    /// The window keyboard, mouse and custom events are routed to.
    #[must_use]
    pub fn focused(&self) -> Option<WindowKey> {
        self.focused
    }

    /// Only open windows can take focus.
    pub(crate) fn set_focused(&mut self, key: WindowKey) -> bool {
        match self.windows.get(key) {
            Some(w) if w.is_open() => {
                self.focused = Some(key);
                true
            }
            _ => false,
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = WindowKey> + '_ {
        self.windows.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (WindowKey, &Window)> {
        self.windows.iter()
    }
}
