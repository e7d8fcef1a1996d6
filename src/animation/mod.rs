//! Animation Subsystem
//!
//! - [`Sampler`]: keyframe times, values and an [`Interpolation`] mode
//! - [`Channel`]: binds a sampler to one node property ([`Target`])
//! - [`Animation`]: a named, validated bundle of samplers and channels
//! - [`AnimationPlayer`]: playback state for one driven instance
//! - [`Animator`]: owns animations and players, advances them every tick
//!
//! Sampled values are written through [`NodeGraph`](crate::scene::NodeGraph)
//! setters, so animated transforms reach the native engine exactly like
//! script mutations do.

mod values;

pub mod animator;
pub mod channel;
pub mod clip;
pub mod player;
pub mod sampler;

pub use animator::Animator;
pub use channel::{Channel, Target, TargetPath};
pub use clip::Animation;
pub use player::{AnimationPlayer, LoopMode, PlaybackState};
pub use sampler::{AnimationOutput, Interpolation, KeyframeCursor, SampledValue, Sampler};
pub use values::Interpolatable;

use slotmap::new_key_type;

new_key_type! {
    pub struct AnimationKey;
    pub struct PlayerKey;
}
