//! Runtime Settings
//!
//! [`RuntimeSettings`] configures a [`Runtime`](crate::Runtime) at startup.
//! It derives serde traits so hosts can keep it in a config file.
//!
//! ```rust,ignore
//! use pge::RuntimeSettings;
//!
//! let settings = RuntimeSettings::default()
//!     .with_max_windows(1)
//!     .with_max_events_per_tick(Some(256));
//!
//! let settings: RuntimeSettings = serde_json::from_str(r#"{ "max_windows": 2 }"#)?;
//! ```

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeSettings {
    /// Upper bound on simultaneously live windows.
    pub max_windows: usize,
    /// Events dispatched per tick before the rest wait for the next one.
    /// `None` drains the whole queue.
    pub max_events_per_tick: Option<usize>,
    /// Log every native call at `trace` level.
    pub log_native_calls: bool,
    /// Longest simulation step `Runtime::pump` will take, in seconds. Longer
    /// wall-clock gaps (debugger pauses, window drags) are clamped to this.
    pub max_tick_seconds: f32,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self {
            max_windows: 4,
            max_events_per_tick: None,
            log_native_calls: true,
            max_tick_seconds: 0.25,
        }
    }
}

impl RuntimeSettings {
    #[must_use]
    pub fn with_max_windows(mut self, max_windows: usize) -> Self {
        self.max_windows = max_windows;
        self
    }

    #[must_use]
    pub fn with_max_events_per_tick(mut self, limit: Option<usize>) -> Self {
        self.max_events_per_tick = limit;
        self
    }

    #[must_use]
    pub fn with_native_call_logging(mut self, enabled: bool) -> Self {
        self.log_native_calls = enabled;
        self
    }

    #[must_use]
    pub fn with_max_tick_seconds(mut self, seconds: f32) -> Self {
        self.max_tick_seconds = seconds;
        self
    }
}
