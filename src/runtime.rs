//! Runtime Module
//!
//! [`Runtime`] is the coordinator the host drives from the native loop. It
//! owns every subsystem and performs the per-tick sequence.
//!
//! # Tick Order
//!
//! 1. Queued native events are dispatched to input handlers
//! 2. Process handlers run
//! 3. Playing animations advance and push their transforms
//! 4. Stale world transforms are recomputed
//!
//! The native engine renders after `tick` returns, so animation output
//! overwrites manual writes to the same property made earlier in the tick.
//!
//! # Threading
//!
//! Everything here is single-writer. The node graph, identity registries,
//! animator and window registry hold no locks and must only be mutated from
//! the thread that drives the runtime. A multi-threaded host (for instance a
//! background asset loader) must hand work over through
//! [`Runtime::event_sink`] as [`NativeEvent::Custom`](crate::bridge::NativeEvent::Custom)
//! payloads instead of mutating directly. `Runtime` is neither `Send` nor
//! `Sync`, which enforces this at compile time.
//!
//! # Example
//!
//! ```rust,ignore
//! use pge::{Runtime, RuntimeSettings, WindowConfig};
//!
//! let (mut runtime, engine) = Runtime::headless(RuntimeSettings::default());
//! let window = pollster::block_on(runtime.create_window(WindowConfig::new().title("demo")))?;
//!
//! loop {
//!     engine.fire_process();
//!     runtime.pump()?;
//! }
//! ```

use std::sync::Arc;

use crate::animation::Animator;
use crate::bridge::{Bridge, EventSink, PendingWindow, WindowConfig};
use crate::errors::Result;
use crate::gateway::{Gateway, HeadlessEngine, NativeEngine};
use crate::resources::ResourceCatalog;
use crate::scene::NodeGraph;
use crate::settings::RuntimeSettings;
use crate::utils::TickClock;

/// The binding layer's top-level instance.
///
/// # Lifecycle
///
/// 1. Create with [`Runtime::new`] (or [`Runtime::headless`]); this registers
///    the native callbacks
/// 2. Build scenes, request windows, register handlers
/// 3. Call [`Runtime::pump`] from the native loop (or [`Runtime::tick`] with
///    an explicit delta)
/// 4. [`Runtime::shutdown`], or drop the runtime
pub struct Runtime {
    pub graph: NodeGraph,
    pub catalog: ResourceCatalog,
    pub animator: Animator,
    bridge: Bridge,

    gateway: Gateway,
    settings: RuntimeSettings,
    clock: TickClock,

    time: f32,
    frame_count: u64,
    shut_down: bool,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("graph", &self.graph)
            .field("bridge", &self.bridge)
            .field("settings", &self.settings)
            .field("time", &self.time)
            .field("frame_count", &self.frame_count)
            .finish_non_exhaustive()
    }
}

impl Runtime {
    #[must_use]
    pub fn new(engine: Arc<dyn NativeEngine>, settings: RuntimeSettings) -> Self {
        let gateway = Gateway::new(engine).with_call_tracing(settings.log_native_calls);
        let bridge = Bridge::new(gateway.clone(), settings.max_windows);
        gateway.register_callbacks(&bridge.sink());

        log::info!(
            "Runtime started (max {} windows, event budget {:?})",
            settings.max_windows,
            settings.max_events_per_tick
        );

        Self {
            graph: NodeGraph::new(gateway.clone()),
            catalog: ResourceCatalog::new(),
            animator: Animator::new(),
            bridge,
            gateway,
            clock: TickClock::new(settings.max_tick_seconds),
            settings,
            time: 0.0,
            frame_count: 0,
            shut_down: false,
        }
    }

    /// Runtime over a [`HeadlessEngine`], returned alongside it so the host
    /// can fire callbacks and inspect native calls.
    #[must_use]
    pub fn headless(settings: RuntimeSettings) -> (Self, Arc<HeadlessEngine>) {
        let engine = Arc::new(HeadlessEngine::new());
        (Self::new(engine.clone(), settings), engine)
    }

    /// Runtime over the real engine symbols.
    #[cfg(feature = "native")]
    #[must_use]
    pub fn native(settings: RuntimeSettings) -> Self {
        Self::new(Arc::new(crate::gateway::FfiEngine::new()), settings)
    }

    #[inline]
    #[must_use]
    pub fn settings(&self) -> &RuntimeSettings {
        &self.settings
    }

    #[inline]
    #[must_use]
    pub fn gateway(&self) -> &Gateway {
        &self.gateway
    }

    #[inline]
    #[must_use]
    pub fn bridge(&self) -> &Bridge {
        &self.bridge
    }

    #[inline]
    pub fn bridge_mut(&mut self) -> &mut Bridge {
        &mut self.bridge
    }

    /// Producer handle for threads that need to reach the loop thread.
    #[must_use]
    pub fn event_sink(&self) -> EventSink {
        self.bridge.sink()
    }

    /// Simulated seconds since startup.
    #[inline]
    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[inline]
    #[must_use]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// See [`Bridge::create_window`].
    pub fn create_window(&mut self, config: WindowConfig) -> PendingWindow {
        self.bridge.create_window(config)
    }

    /// Dispatches queued events without running a simulation step. Returns
    /// the number of process heartbeats seen.
    pub fn process_events(&mut self) -> usize {
        self.bridge
            .dispatch_pending(&mut self.graph, &mut self.animator, self.settings.max_events_per_tick)
    }

    /// Runs one full tick with an explicit delta, in seconds.
    ///
    /// Animation errors (a failed native push, a destroyed target) are
    /// returned after the tick has completed; the tick is never cut short.
    pub fn tick(&mut self, dt: f32) -> Result<()> {
        self.process_events();
        self.step(dt)
    }

    /// Drives the runtime from native heartbeats.
    ///
    /// Dispatches queued events, then runs one simulation step if at least
    /// one process heartbeat arrived, with `dt` measured from the wall clock.
    /// Several heartbeats queued since the last pump are coalesced into one
    /// step. Returns whether a step ran.
    pub fn pump(&mut self) -> Result<bool> {
        let heartbeats = self.process_events();
        if heartbeats == 0 {
            return Ok(false);
        }
        if heartbeats > 1 {
            log::debug!("Coalesced {heartbeats} heartbeats into one tick");
        }
        let dt = self.clock.tick();
        self.step(dt)?;
        Ok(true)
    }

    fn step(&mut self, dt: f32) -> Result<()> {
        self.time += dt;
        self.frame_count += 1;

        self.bridge.run_process_handlers(&mut self.graph, &mut self.animator, dt);
        let animated = self.animator.tick(dt, &mut self.graph);
        self.graph.update_world_transforms();

        if let Err(e) = &animated {
            log::error!("Animation tick {}: {e}", self.frame_count);
        }
        animated
    }

    /// Closes all windows and detaches from native callbacks. Idempotent;
    /// also runs on drop.
    pub fn shutdown(&mut self) {
        if self.shut_down {
            return;
        }
        self.shut_down = true;
        self.bridge.shutdown();
        log::info!("Runtime shut down after {} ticks", self.frame_count);
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.shutdown();
    }
}
