use std::sync::Arc;

use crate::animation::channel::TargetPath;
use crate::animation::clip::Animation;
use crate::animation::sampler::{KeyframeCursor, SampledValue};
use crate::errors::Result;
use crate::scene::NodeGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopMode {
    /// Play to the end, then stop.
    Once,
    Loop,
    /// Play forward, then backward, then forward again.
    PingPong,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
}

/// Playback state for one independently driven instance of an animation.
///
/// ```text
/// Stopped --play--> Playing --pause--> Paused --play--> Playing
///    ^                 |                  |
///    +------stop-------+-------stop-------+
///    +-- end reached (LoopMode::Once) ----+
/// ```
#[derive(Debug, Clone)]
pub struct AnimationPlayer {
    animation: Arc<Animation>,

    time: f32,
    state: PlaybackState,
    pub loop_mode: LoopMode,
    pub time_scale: f32,

    /// `1.0` or `-1.0`; only `PingPong` ever flips it.
    direction: f32,
    cursors: Vec<KeyframeCursor>,
}

impl AnimationPlayer {
    #[must_use]
    pub fn new(animation: Arc<Animation>) -> Self {
        let channels = animation.channels().len();
        Self {
            animation,
            time: 0.0,
            state: PlaybackState::Stopped,
            loop_mode: LoopMode::Once,
            time_scale: 1.0,
            direction: 1.0,
            cursors: vec![KeyframeCursor::default(); channels],
        }
    }

    #[must_use]
    pub fn with_loop_mode(mut self, loop_mode: LoopMode) -> Self {
        self.loop_mode = loop_mode;
        self
    }

    #[must_use]
    pub fn animation(&self) -> &Arc<Animation> {
        &self.animation
    }

    #[must_use]
    pub fn time(&self) -> f32 {
        self.time
    }

    #[must_use]
    pub fn state(&self) -> PlaybackState {
        self.state
    }

    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.state == PlaybackState::Playing
    }

    /// Starts or resumes playback.
    ///
    /// From `Stopped` playback restarts at the beginning (the end, for a
    /// negative time scale); from `Paused` it resumes where it was.
    pub fn play(&mut self) {
        match self.state {
            PlaybackState::Stopped => {
                self.time = if self.time_scale < 0.0 {
                    self.animation.duration()
                } else {
                    0.0
                };
                self.direction = 1.0;
                self.state = PlaybackState::Playing;
            }
            PlaybackState::Paused => self.state = PlaybackState::Playing,
            PlaybackState::Playing => {}
        }
    }

    pub fn pause(&mut self) {
        if self.state == PlaybackState::Playing {
            self.state = PlaybackState::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.state = PlaybackState::Stopped;
        self.time = 0.0;
        self.direction = 1.0;
        self.cursors.iter_mut().for_each(KeyframeCursor::reset);
    }

    /// Moves the playhead, clamped to `[0, duration]`. NaN is ignored.
    pub fn seek(&mut self, time: f32) {
        if time.is_nan() {
            return;
        }
        self.time = time.clamp(0.0, self.animation.duration());
    }

    /// Advances the playhead by `dt * time_scale` seconds. Has no effect
    /// unless `Playing`.
    pub fn advance(&mut self, dt: f32) {
        if self.state != PlaybackState::Playing || !dt.is_finite() {
            return;
        }

        let duration = self.animation.duration();
        if duration <= 0.0 {
            if self.loop_mode == LoopMode::Once {
                self.state = PlaybackState::Stopped;
            }
            return;
        }

        let step = dt * self.time_scale;
        match self.loop_mode {
            LoopMode::Once => {
                let t = self.time + step;
                if t >= duration {
                    self.time = duration;
                    self.state = PlaybackState::Stopped;
                } else if t <= 0.0 && step < 0.0 {
                    self.time = 0.0;
                    self.state = PlaybackState::Stopped;
                } else {
                    self.time = t;
                }
            }
            LoopMode::Loop => {
                let t = self.time + step;
                self.time = if (0.0..=duration).contains(&t) {
                    t
                } else {
                    t.rem_euclid(duration)
                };
            }
            LoopMode::PingPong => {
                // Unfold onto a forward-only cycle of length 2d, then fold back.
                let period = duration * 2.0;
                let unfolded = if self.direction > 0.0 {
                    self.time
                } else {
                    period - self.time
                };
                let phase = (unfolded + step).rem_euclid(period);
                if phase <= duration {
                    self.time = phase;
                    self.direction = 1.0;
                } else {
                    self.time = period - phase;
                    self.direction = -1.0;
                }
            }
        }
    }

    /// Samples every channel at the current time and writes the values
    /// through the graph's setters.
    ///
    /// Every channel is attempted; the first error is returned.
    pub fn apply(&mut self, graph: &mut NodeGraph) -> Result<()> {
        let time = self.time;
        let mut first_error = None;

        for (channel, cursor) in self.animation.channels().iter().zip(self.cursors.iter_mut()) {
            let sampler = &self.animation.samplers()[channel.sampler];
            let node = channel.target.node;
            let result = match (channel.target.path, sampler.sample_with_cursor(time, cursor)) {
                (TargetPath::Translation, SampledValue::Vec3(v)) => graph.set_translation(node, v),
                (TargetPath::Scale, SampledValue::Vec3(v)) => graph.set_scale(node, v),
                (TargetPath::Rotation, SampledValue::Quat(q)) => graph.set_rotation(node, q),
                // Ruled out by `Animation::new`.
                _ => Ok(()),
            };
            if let Err(e) = result {
                first_error.get_or_insert(e);
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}
