use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures::FutureExt;
use futures::channel::oneshot;

use crate::animation::Animator;
use crate::bridge::WindowKey;
use crate::bridge::events::{KeyboardEvent, MouseMovedEvent};
use crate::errors::{PgeError, ResourceKind, Result};
use crate::registry::Handle;
use crate::scene::{CameraKey, NodeGraph};

/// Opaque UI tree a window presents.
///
/// The binding layer stores and forwards it but never looks inside, so the
/// trait has no methods. UI toolkits implement it for their root type.
pub trait UiRoot: 'static {}

/// A bare camera view is the simplest UI root.
impl UiRoot for CameraKey {}

/// What user handlers get to touch while they run.
pub struct HandlerContext<'a> {
    pub graph: &'a mut NodeGraph,
    pub animator: &'a mut Animator,
    window: WindowKey,
    close_requested: bool,
}

impl<'a> HandlerContext<'a> {
    pub(crate) fn new(graph: &'a mut NodeGraph, animator: &'a mut Animator, window: WindowKey) -> Self {
        Self {
            graph,
            animator,
            window,
            close_requested: false,
        }
    }

    /// The window whose handler is running.
    #[must_use]
    pub fn window(&self) -> WindowKey {
        self.window
    }

    /// Closes the window once the handler returns.
    pub fn request_close(&mut self) {
        self.close_requested = true;
    }

    pub(crate) fn close_requested(&self) -> bool {
        self.close_requested
    }
}

pub type KeyboardHandler = dyn FnMut(&mut HandlerContext<'_>, KeyboardEvent) -> Result<()>;
pub type MouseMovedHandler = dyn FnMut(&mut HandlerContext<'_>, MouseMovedEvent) -> Result<()>;
/// Receives the tick's `dt` in seconds.
pub type ProcessHandler = dyn FnMut(&mut HandlerContext<'_>, f32) -> Result<()>;
pub type CloseHandler = dyn FnMut(&mut HandlerContext<'_>) -> Result<()>;
pub type CustomHandler = dyn FnMut(&mut HandlerContext<'_>, &[u8]) -> Result<()>;

/// One slot per event kind. Registering again replaces the slot.
#[derive(Default)]
pub(crate) struct Handlers {
    pub(crate) keyboard: Option<Box<KeyboardHandler>>,
    pub(crate) mouse_moved: Option<Box<MouseMovedHandler>>,
    pub(crate) process: Option<Box<ProcessHandler>>,
    pub(crate) close: Option<Box<CloseHandler>>,
    pub(crate) custom: Option<Box<CustomHandler>>,
}

impl Handlers {
    pub(crate) fn keyboard_slot(&mut self) -> &mut Option<Box<KeyboardHandler>> {
        &mut self.keyboard
    }

    pub(crate) fn mouse_moved_slot(&mut self) -> &mut Option<Box<MouseMovedHandler>> {
        &mut self.mouse_moved
    }

    pub(crate) fn process_slot(&mut self) -> &mut Option<Box<ProcessHandler>> {
        &mut self.process
    }

    pub(crate) fn close_slot(&mut self) -> &mut Option<Box<CloseHandler>> {
        &mut self.close
    }

    pub(crate) fn custom_slot(&mut self) -> &mut Option<Box<CustomHandler>> {
        &mut self.custom
    }
}

impl fmt::Debug for Handlers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handlers")
            .field("keyboard", &self.keyboard.is_some())
            .field("mouse_moved", &self.mouse_moved.is_some())
            .field("process", &self.process.is_some())
            .field("close", &self.close.is_some())
            .field("custom", &self.custom.is_some())
            .finish()
    }
}

/// Window creation options.
#[derive(Default)]
pub struct WindowConfig {
    pub title: Option<String>,
    pub ui: Option<Box<dyn UiRoot>>,
    /// `Some(false)` creates the window hidden; it stays hidden until
    /// shown explicitly.
    pub show: Option<bool>,
}

impl WindowConfig {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    #[must_use]
    pub fn ui(mut self, ui: impl UiRoot) -> Self {
        self.ui = Some(Box::new(ui));
        self
    }

    #[must_use]
    pub fn show(mut self, show: bool) -> Self {
        self.show = Some(show);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    /// Requested, waiting for the native acknowledgement.
    Pending,
    Open,
}

/// A live native window and the handlers registered on it.
pub struct Window {
    pub(crate) handle: Handle,
    pub(crate) title: Option<String>,
    pub(crate) ui: Option<Box<dyn UiRoot>>,
    pub(crate) visible: bool,
    pub(crate) show_on_open: bool,
    pub(crate) state: WindowState,
    pub(crate) handlers: Handlers,
    pub(crate) completion: Option<oneshot::Sender<Result<WindowKey>>>,
}

impl fmt::Debug for Window {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Window")
            .field("handle", &self.handle)
            .field("title", &self.title)
            .field("has_ui", &self.ui.is_some())
            .field("visible", &self.visible)
            .field("state", &self.state)
            .field("handlers", &self.handlers)
            .finish_non_exhaustive()
    }
}

impl Window {
    pub(crate) fn new(handle: Handle, config: WindowConfig, completion: oneshot::Sender<Result<WindowKey>>) -> Self {
        Self {
            handle,
            title: config.title,
            ui: config.ui,
            visible: false,
            show_on_open: config.show.unwrap_or(true),
            state: WindowState::Pending,
            handlers: Handlers::default(),
            completion: Some(completion),
        }
    }

    #[must_use]
    pub fn handle(&self) -> Handle {
        self.handle
    }

    #[must_use]
    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    #[must_use]
    pub fn ui(&self) -> Option<&dyn UiRoot> {
        self.ui.as_deref()
    }

    #[must_use]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[must_use]
    pub fn state(&self) -> WindowState {
        self.state
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state == WindowState::Open
    }

    /// Marks the window open and resolves its [`PendingWindow`].
    pub(crate) fn acknowledge(&mut self, key: WindowKey) {
        self.state = WindowState::Open;
        self.visible = self.show_on_open;
        if let Some(tx) = self.completion.take() {
            // The requester may have dropped its future; nothing to do then.
            let _ = tx.send(Ok(key));
        }
    }
}

enum Pending {
    Ready(Option<Result<WindowKey>>),
    Waiting(oneshot::Receiver<Result<WindowKey>>),
}

/// Result of [`Bridge::create_window`](crate::bridge::Bridge::create_window).
///
/// Resolves to the window's key once the native engine acknowledges the
/// creation. If the window is closed (or the runtime shut down) before that,
/// it resolves to [`PgeError::StaleHandle`]. Failed requests resolve
/// immediately with their error.
pub struct PendingWindow {
    key: Option<WindowKey>,
    inner: Pending,
}

impl fmt::Debug for PendingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingWindow").field("key", &self.key).finish_non_exhaustive()
    }
}

impl PendingWindow {
    pub(crate) fn failed(error: PgeError) -> Self {
        Self {
            key: None,
            inner: Pending::Ready(Some(Err(error))),
        }
    }

    pub(crate) fn waiting(key: WindowKey, rx: oneshot::Receiver<Result<WindowKey>>) -> Self {
        Self {
            key: Some(key),
            inner: Pending::Waiting(rx),
        }
    }

    /// Key of the requested window, usable for handler registration before
    /// the acknowledgement arrives. `None` if the request already failed.
    #[must_use]
    pub fn window_key(&self) -> Option<WindowKey> {
        self.key
    }

    /// Non-blocking poll: `None` while still waiting.
    pub fn try_take(&mut self) -> Option<Result<WindowKey>> {
        match &mut self.inner {
            Pending::Ready(result) => result.take(),
            Pending::Waiting(rx) => match rx.try_recv() {
                Ok(Some(result)) => Some(result),
                Ok(None) => None,
                Err(oneshot::Canceled) => Some(Err(PgeError::StaleHandle(ResourceKind::Window))),
            },
        }
    }
}

impl Future for PendingWindow {
    type Output = Result<WindowKey>;

    fn poll(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.get_mut().inner {
            Pending::Ready(result) => {
                Poll::Ready(result.take().unwrap_or(Err(PgeError::StaleHandle(ResourceKind::Window))))
            }
            Pending::Waiting(rx) => rx
                .poll_unpin(cx)
                .map(|r| r.unwrap_or(Err(PgeError::StaleHandle(ResourceKind::Window)))),
        }
    }
}
