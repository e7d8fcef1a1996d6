use glam::{Quat, Vec3};

use crate::animation::values::Interpolatable;
use crate::errors::{PgeError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interpolation {
    Linear,
    /// Holds the left keyframe's value until the next keyframe.
    Step,
    /// Hermite spline; every keyframe stores `[in_tangent, value, out_tangent]`.
    CubicSpline,
}

/// Keyframe values of a sampler.
///
/// For [`Interpolation::CubicSpline`] the vector holds three entries per
/// keyframe, in the order in-tangent, value, out-tangent.
#[derive(Debug, Clone, PartialEq)]
pub enum AnimationOutput {
    Vec3(Vec<Vec3>),
    Quat(Vec<Quat>),
}

impl AnimationOutput {
    fn raw_len(&self) -> usize {
        match self {
            AnimationOutput::Vec3(v) => v.len(),
            AnimationOutput::Quat(v) => v.len(),
        }
    }
}

/// The value a sampler produced for one point in time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SampledValue {
    Vec3(Vec3),
    Quat(Quat),
}

const MAX_SCAN_OFFSET: usize = 3;

/// Last keyframe interval a sampler was read at.
///
/// Playback mostly moves forward by a frame at a time, so a short linear
/// scan from the previous index usually finds the interval without a
/// binary search.
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyframeCursor {
    last_index: usize,
}

impl KeyframeCursor {
    pub fn reset(&mut self) {
        self.last_index = 0;
    }
}

/// A keyframe curve: time stamps, values and an interpolation mode.
///
/// Validated on construction; a `Sampler` value always has at least one
/// keyframe, finite non-decreasing times and matching value counts.
#[derive(Debug, Clone, PartialEq)]
pub struct Sampler {
    input: Vec<f32>,
    output: AnimationOutput,
    interpolation: Interpolation,
}

impl Sampler {
    pub fn new(input: Vec<f32>, output: AnimationOutput, interpolation: Interpolation) -> Result<Self> {
        if input.is_empty() {
            return Err(PgeError::InvalidSampler("no keyframes".to_owned()));
        }
        if let Some(bad) = input.iter().find(|t| !t.is_finite()) {
            return Err(PgeError::InvalidSampler(format!("non-finite time stamp {bad}")));
        }
        if let Some(i) = input.windows(2).position(|w| w[1] < w[0]) {
            return Err(PgeError::InvalidSampler(format!(
                "time stamps decrease at keyframe {}",
                i + 1
            )));
        }

        let per_key = if interpolation == Interpolation::CubicSpline { 3 } else { 1 };
        let expected = input.len() * per_key;
        if output.raw_len() != expected {
            return Err(PgeError::InvalidSampler(format!(
                "{} time stamps need {expected} output values for {interpolation:?}, got {}",
                input.len(),
                output.raw_len()
            )));
        }

        Ok(Self {
            input,
            output,
            interpolation,
        })
    }

    /// Linear sampler over `Vec3` keyframes.
    pub fn linear_vec3(keys: &[(f32, Vec3)]) -> Result<Self> {
        let (times, values) = keys.iter().copied().unzip();
        Self::new(times, AnimationOutput::Vec3(values), Interpolation::Linear)
    }

    /// Linear (spherical) sampler over rotation keyframes.
    pub fn linear_quat(keys: &[(f32, Quat)]) -> Result<Self> {
        let (times, values) = keys.iter().copied().unzip();
        Self::new(times, AnimationOutput::Quat(values), Interpolation::Linear)
    }

    #[must_use]
    pub fn input(&self) -> &[f32] {
        &self.input
    }

    #[must_use]
    pub fn output(&self) -> &AnimationOutput {
        &self.output
    }

    #[must_use]
    pub fn interpolation(&self) -> Interpolation {
        self.interpolation
    }

    #[must_use]
    pub fn keyframe_count(&self) -> usize {
        self.input.len()
    }

    /// Time of the last keyframe.
    #[must_use]
    pub fn end_time(&self) -> f32 {
        self.input[self.input.len() - 1]
    }

    /// Samples at `time` with a binary search.
    #[must_use]
    pub fn sample(&self, time: f32) -> SampledValue {
        self.sample_with_cursor(time, &mut KeyframeCursor::default())
    }

    /// Samples at `time`, starting the keyframe search at `cursor` and
    /// updating it.
    pub fn sample_with_cursor(&self, time: f32, cursor: &mut KeyframeCursor) -> SampledValue {
        match &self.output {
            AnimationOutput::Vec3(values) => {
                SampledValue::Vec3(sample_keys(&self.input, values, self.interpolation, time, cursor))
            }
            AnimationOutput::Quat(values) => {
                SampledValue::Quat(sample_keys(&self.input, values, self.interpolation, time, cursor))
            }
        }
    }
}

#[inline]
fn value_at<T: Interpolatable>(values: &[T], interpolation: Interpolation, index: usize) -> T {
    match interpolation {
        Interpolation::CubicSpline => values[index * 3 + 1],
        Interpolation::Linear | Interpolation::Step => values[index],
    }
}

fn sample_keys<T: Interpolatable>(
    times: &[f32],
    values: &[T],
    interpolation: Interpolation,
    time: f32,
    cursor: &mut KeyframeCursor,
) -> T {
    let len = times.len();
    let last = len - 1;

    // `!(time > first)` also catches NaN.
    if len == 1 || !(time > times[0]) {
        cursor.last_index = 0;
        return value_at(values, interpolation, 0);
    }
    if time >= times[last] {
        cursor.last_index = last;
        return value_at(values, interpolation, last);
    }

    let index = find_interval(times, time, cursor);
    let next = index + 1;
    let t0 = times[index];
    let dt = times[next] - t0;
    let t = if dt > 1e-6 { ((time - t0) / dt).clamp(0.0, 1.0) } else { 0.0 };

    match interpolation {
        Interpolation::Step => values[index],
        Interpolation::Linear => T::interpolate_linear(values[index], values[next], t),
        Interpolation::CubicSpline => {
            let v0 = values[index * 3 + 1];
            let out_tangent0 = values[index * 3 + 2];
            let in_tangent1 = values[next * 3];
            let v1 = values[next * 3 + 1];
            T::interpolate_cubic(v0, out_tangent0, in_tangent1, v1, t, dt)
        }
    }
}

/// Index `i` with `times[i] <= time < times[i + 1]`.
///
/// `time` must lie strictly inside `(times[0], times[last])`.
fn find_interval(times: &[f32], time: f32, cursor: &mut KeyframeCursor) -> usize {
    let last = times.len() - 1;
    let start = cursor.last_index.min(last - 1);

    let local = if time >= times[start] {
        (start..(start + MAX_SCAN_OFFSET).min(last)).find(|&i| time < times[i + 1])
    } else {
        (start.saturating_sub(MAX_SCAN_OFFSET)..start)
            .rev()
            .find(|&i| time >= times[i])
    };

    let index = local.unwrap_or_else(|| times.partition_point(|&t| t <= time).saturating_sub(1));
    cursor.last_index = index;
    index
}
