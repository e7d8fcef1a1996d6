//! Input & Lifecycle Bridge
//!
//! Turns native callback invocations into calls of user handlers.
//!
//! # Flow
//!
//! ```text
//! native loop thread          gateway::callbacks / HeadlessEngine
//!        |                              |
//!        +--> NativeEvent --> EventSink (flume) --> EventQueue
//!                                                      |
//! Runtime::tick ---> Bridge::dispatch_pending ---------+--> window handlers
//! ```
//!
//! Callbacks never run user code: they only decode and enqueue. Handlers run
//! later on the thread driving the runtime, with mutable access to the node
//! graph and animator through a [`HandlerContext`].
//!
//! # Routing
//!
//! Each window holds at most one handler per event kind; registering again
//! replaces it. Keyboard, mouse and custom events go to the focused window
//! (the most recently opened one, or the last one the engine reported as
//! focused). Process handlers run on every open window each tick.

pub mod events;
pub mod registry;
pub mod window;

pub use events::{EventQueue, EventSink, KeyCode, KeyboardEvent, MouseMovedEvent, NativeEvent, WindowLifecycle};
pub use registry::WindowRegistry;
pub use window::{HandlerContext, PendingWindow, UiRoot, Window, WindowConfig, WindowState};

use futures::channel::oneshot;
use slotmap::new_key_type;

use crate::animation::Animator;
use crate::bridge::window::Handlers;
use crate::errors::{PgeError, ResourceKind, Result};
use crate::gateway::Gateway;
use crate::scene::NodeGraph;

new_key_type! {
    pub struct WindowKey;
}

pub struct Bridge {
    windows: WindowRegistry,
    queue: EventQueue,
    gateway: Gateway,
    shut_down: bool,
}

impl std::fmt::Debug for Bridge {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Bridge")
            .field("windows", &self.windows)
            .field("queued", &self.queue.len())
            .finish_non_exhaustive()
    }
}

impl Bridge {
    #[must_use]
    pub fn new(gateway: Gateway, max_windows: usize) -> Self {
        Self {
            windows: WindowRegistry::new(max_windows),
            queue: EventQueue::new(),
            gateway,
            shut_down: false,
        }
    }

    /// Producer handle for native callbacks and background threads.
    #[must_use]
    pub fn sink(&self) -> EventSink {
        self.queue.sink()
    }

    #[must_use]
    pub fn queued_events(&self) -> usize {
        self.queue.len()
    }

    #[must_use]
    pub fn windows(&self) -> &WindowRegistry {
        &self.windows
    }

    pub fn window(&self, key: WindowKey) -> Result<&Window> {
        self.windows.get(key)
    }

    // ========================================================================
    // Window lifecycle
    // ========================================================================

    /// Requests a native window.
    ///
    /// The returned future resolves once the engine acknowledges the window.
    /// It resolves right away with an error if the window limit is reached
    /// or the engine returns the invalid handle, and without reaching the
    /// engine once the bridge has shut down.
    pub fn create_window(&mut self, config: WindowConfig) -> PendingWindow {
        if self.shut_down {
            log::warn!("Window request after shutdown rejected");
            return PendingWindow::failed(PgeError::StaleHandle(ResourceKind::Window));
        }
        if self.windows.is_full() {
            log::warn!("Window request rejected: {} windows already live", self.windows.len());
            return PendingWindow::failed(PgeError::WindowLimit(self.windows.max_windows()));
        }

        let handle = match self.gateway.create_window() {
            Ok(handle) => handle,
            Err(e) => {
                log::error!("{e}");
                return PendingWindow::failed(e);
            }
        };

        let (tx, rx) = oneshot::channel();
        match self.windows.insert(Window::new(handle, config, tx)) {
            Ok(key) => {
                log::info!("Window {handle} requested");
                PendingWindow::waiting(key, rx)
            }
            Err(e) => PendingWindow::failed(e),
        }
    }

    /// Closes the window. Its handle and handlers are gone immediately; any
    /// later call with `key` fails with `StaleHandle`.
    pub fn close_window(&mut self, key: WindowKey) -> Result<()> {
        self.windows.get(key)?;
        if let Some(window) = self.windows.remove(key) {
            log::info!("Window {} closed", window.handle);
        }
        Ok(())
    }

    pub fn show_window(&mut self, key: WindowKey) -> Result<()> {
        self.windows.get_mut(key)?.visible = true;
        Ok(())
    }

    pub fn hide_window(&mut self, key: WindowKey) -> Result<()> {
        self.windows.get_mut(key)?.visible = false;
        Ok(())
    }

    pub fn set_title(&mut self, key: WindowKey, title: impl Into<String>) -> Result<()> {
        self.windows.get_mut(key)?.title = Some(title.into());
        Ok(())
    }

    pub fn set_ui(&mut self, key: WindowKey, ui: impl UiRoot) -> Result<()> {
        self.windows.get_mut(key)?.ui = Some(Box::new(ui));
        Ok(())
    }

    /// Closes every window and stops listening to native callbacks.
    /// Pending window requests resolve to `StaleHandle`.
    pub fn shutdown(&mut self) {
        self.shut_down = true;
        let keys: Vec<WindowKey> = self.windows.keys().collect();
        for key in keys {
            if let Some(window) = self.windows.remove(key) {
                log::info!("Window {} closed at shutdown", window.handle);
            }
        }
        self.gateway.unregister_callbacks();
        let dropped = self.queue.drain(None).len();
        if dropped > 0 {
            log::debug!("Discarded {dropped} undelivered event(s) at shutdown");
        }
    }

    // ========================================================================
    // Handler registration (last write wins)
    // ========================================================================

    pub fn on_keyboard(
        &mut self,
        key: WindowKey,
        handler: impl FnMut(&mut HandlerContext<'_>, KeyboardEvent) -> Result<()> + 'static,
    ) -> Result<()> {
        self.windows.get_mut(key)?.handlers.keyboard = Some(Box::new(handler));
        Ok(())
    }

    pub fn on_mouse_moved(
        &mut self,
        key: WindowKey,
        handler: impl FnMut(&mut HandlerContext<'_>, MouseMovedEvent) -> Result<()> + 'static,
    ) -> Result<()> {
        self.windows.get_mut(key)?.handlers.mouse_moved = Some(Box::new(handler));
        Ok(())
    }

    pub fn on_process(
        &mut self,
        key: WindowKey,
        handler: impl FnMut(&mut HandlerContext<'_>, f32) -> Result<()> + 'static,
    ) -> Result<()> {
        self.windows.get_mut(key)?.handlers.process = Some(Box::new(handler));
        Ok(())
    }

    /// Runs when the engine reports a close request, right before the window
    /// closes.
    pub fn on_close(
        &mut self,
        key: WindowKey,
        handler: impl FnMut(&mut HandlerContext<'_>) -> Result<()> + 'static,
    ) -> Result<()> {
        self.windows.get_mut(key)?.handlers.close = Some(Box::new(handler));
        Ok(())
    }

    pub fn on_custom(
        &mut self,
        key: WindowKey,
        handler: impl FnMut(&mut HandlerContext<'_>, &[u8]) -> Result<()> + 'static,
    ) -> Result<()> {
        self.windows.get_mut(key)?.handlers.custom = Some(Box::new(handler));
        Ok(())
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    /// Dispatches queued events in arrival order, at most `limit` of them.
    ///
    /// Returns how many process heartbeats were among them; process
    /// handlers themselves run from [`Bridge::run_process_handlers`].
    pub fn dispatch_pending(&mut self, graph: &mut NodeGraph, animator: &mut Animator, limit: Option<usize>) -> usize {
        let mut heartbeats = 0;
        for event in self.queue.drain(limit) {
            match event {
                NativeEvent::Process => heartbeats += 1,
                NativeEvent::Keyboard(e) => {
                    self.dispatch_focused(graph, animator, Handlers::keyboard_slot, |h, ctx| h(ctx, e));
                }
                NativeEvent::MouseMoved(e) => {
                    self.dispatch_focused(graph, animator, Handlers::mouse_moved_slot, |h, ctx| h(ctx, e));
                }
                NativeEvent::Custom(payload) => {
                    self.dispatch_focused(graph, animator, Handlers::custom_slot, |h, ctx| h(ctx, &payload));
                }
                NativeEvent::Window { handle, lifecycle } => {
                    let Some(key) = self.windows.by_handle(handle) else {
                        log::warn!("{lifecycle:?} for unknown window {handle}");
                        continue;
                    };
                    self.handle_lifecycle(key, lifecycle, graph, animator);
                }
            }
        }
        heartbeats
    }

    /// Runs the process handler of every open window.
    pub fn run_process_handlers(&mut self, graph: &mut NodeGraph, animator: &mut Animator, dt: f32) {
        let keys: Vec<WindowKey> = self
            .windows
            .iter()
            .filter(|(_, w)| w.is_open())
            .map(|(k, _)| k)
            .collect();
        for key in keys {
            self.invoke(key, graph, animator, Handlers::process_slot, |h, ctx| h(ctx, dt));
        }
    }

    fn handle_lifecycle(
        &mut self,
        key: WindowKey,
        lifecycle: WindowLifecycle,
        graph: &mut NodeGraph,
        animator: &mut Animator,
    ) {
        match lifecycle {
            WindowLifecycle::Created => {
                let Ok(window) = self.windows.get_mut(key) else {
                    return;
                };
                if window.is_open() {
                    log::debug!("Duplicate creation ack for window {}", window.handle);
                    return;
                }
                window.acknowledge(key);
                log::info!("Window {} open", window.handle);
                self.windows.set_focused(key);
            }
            WindowLifecycle::Focused => {
                self.windows.set_focused(key);
            }
            WindowLifecycle::CloseRequested => {
                self.invoke(key, graph, animator, Handlers::close_slot, |h, ctx| h(ctx));
                // The close handler may have closed it already.
                if self.windows.contains(key) {
                    let _ = self.close_window(key);
                }
            }
        }
    }

    fn dispatch_focused<H: ?Sized>(
        &mut self,
        graph: &mut NodeGraph,
        animator: &mut Animator,
        slot: fn(&mut Handlers) -> &mut Option<Box<H>>,
        call: impl FnOnce(&mut H, &mut HandlerContext<'_>) -> Result<()>,
    ) {
        match self.windows.focused() {
            Some(key) => {
                self.invoke(key, graph, animator, slot, call);
            }
            None => log::warn!("Input event with no focused window, dropping"),
        }
    }

    /// Calls one handler of `key`, if registered. The handler is taken out
    /// of its slot for the call and put back unless the window is gone.
    fn invoke<H: ?Sized>(
        &mut self,
        key: WindowKey,
        graph: &mut NodeGraph,
        animator: &mut Animator,
        slot: fn(&mut Handlers) -> &mut Option<Box<H>>,
        call: impl FnOnce(&mut H, &mut HandlerContext<'_>) -> Result<()>,
    ) -> bool {
        let Ok(window) = self.windows.get_mut(key) else {
            return false;
        };
        let Some(mut handler) = slot(&mut window.handlers).take() else {
            return false;
        };

        let mut ctx = HandlerContext::new(graph, animator, key);
        if let Err(e) = call(handler.as_mut(), &mut ctx) {
            log::error!("Handler on window {} failed: {e}", window_handle_or_dash(&self.windows, key));
        }
        let close = ctx.close_requested();

        if let Ok(window) = self.windows.get_mut(key) {
            let slot = slot(&mut window.handlers);
            if slot.is_none() {
                *slot = Some(handler);
            }
        }
        if close && self.windows.contains(key) {
            let _ = self.close_window(key);
        }
        true
    }
}

fn window_handle_or_dash(windows: &WindowRegistry, key: WindowKey) -> String {
    windows
        .get(key)
        .map_or_else(|_| "-".to_owned(), |w| w.handle().to_string())
}
