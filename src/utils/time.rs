use std::time::{Duration, Instant};

/// Measures wall-clock time between ticks.
///
/// The native engine only says *that* a tick happened, not how long it has
/// been, so the runtime derives `dt` here. Deltas are clamped to
/// `max_delta`.
#[derive(Debug, Clone)]
pub struct TickClock {
    last_tick: Option<Instant>,
    max_delta: Duration,
    /// Total number of ticks
    pub tick_count: u64,
}

impl TickClock {
    #[must_use]
    pub fn new(max_delta_seconds: f32) -> Self {
        let max_delta = Duration::try_from_secs_f32(max_delta_seconds.max(0.0)).unwrap_or(Duration::MAX);
        Self {
            last_tick: None,
            max_delta,
            tick_count: 0,
        }
    }

    /// Seconds since the previous call, clamped. The first call returns `0`.
    pub fn tick(&mut self) -> f32 {
        self.tick_at(Instant::now())
    }

    pub(crate) fn tick_at(&mut self, now: Instant) -> f32 {
        let delta = self
            .last_tick
            .map_or(Duration::ZERO, |last| now.saturating_duration_since(last));
        self.last_tick = Some(now);
        self.tick_count += 1;
        delta.min(self.max_delta).as_secs_f32()
    }

    /// Forgets the previous tick, so the next delta is `0`.
    pub fn reset(&mut self) {
        self.last_tick = None;
    }
}
