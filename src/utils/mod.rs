//! Utility Module
//!
//! - [`TickClock`]: wall-clock delta measurement for heartbeat-driven ticks

pub mod time;

pub use time::TickClock;
