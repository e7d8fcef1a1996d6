use crate::animation::channel::Channel;
use crate::animation::sampler::Sampler;
use crate::errors::{PgeError, Result};

/// A named bundle of samplers and the channels that drive node properties
/// with them.
///
/// Immutable after construction; players share it through an `Arc`.
#[derive(Debug, Clone, PartialEq)]
pub struct Animation {
    name: String,
    samplers: Vec<Sampler>,
    channels: Vec<Channel>,
    duration: f32,
}

impl Animation {
    /// Fails with [`PgeError::InvalidSampler`] if a channel points past the
    /// sampler list or at a sampler whose value kind does not fit the
    /// target property.
    pub fn new(name: impl Into<String>, samplers: Vec<Sampler>, channels: Vec<Channel>) -> Result<Self> {
        let name = name.into();
        for (i, channel) in channels.iter().enumerate() {
            let Some(sampler) = samplers.get(channel.sampler) else {
                return Err(PgeError::InvalidSampler(format!(
                    "{name}: channel {i} references sampler {} of {}",
                    channel.sampler,
                    samplers.len()
                )));
            };
            if !channel.target.path.accepts(sampler.output()) {
                return Err(PgeError::InvalidSampler(format!(
                    "{name}: channel {i} drives {:?} with the wrong value kind",
                    channel.target.path
                )));
            }
        }

        let duration = samplers.iter().map(Sampler::end_time).fold(0.0_f32, f32::max);
        Ok(Self {
            name,
            samplers,
            channels,
            duration,
        })
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn samplers(&self) -> &[Sampler] {
        &self.samplers
    }

    #[must_use]
    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    /// Latest keyframe time across all samplers.
    #[must_use]
    pub fn duration(&self) -> f32 {
        self.duration
    }
}
