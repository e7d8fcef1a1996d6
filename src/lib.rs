//! Scripting-facing bindings for the `pge` native 3D engine.
//!
//! The engine core (renderer, window system, event pump) lives in native
//! code. This crate holds the retained-mode model scripts work with and
//! forwards the mutations the engine tracks across the FFI boundary:
//!
//! - [`scene`]: node forest with hierarchical transforms, scenes, attachments
//! - [`animation`]: keyframe samplers, channels and players
//! - [`resources`]: immutable mesh, texture and material descriptors
//! - [`bridge`]: native callbacks turned into typed, per-window handlers
//! - [`gateway`]: the only code that calls native entry points
//! - [`registry`]: key to native handle correlation
//! - [`runtime`]: owns all of the above and runs the tick
//!
//! All state is single-writer; see [`runtime`] for the threading contract.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod animation;
pub mod bridge;
pub mod errors;
pub mod gateway;
pub mod registry;
pub mod resources;
pub mod runtime;
pub mod scene;
pub mod settings;
pub mod utils;

pub use animation::{
    Animation, AnimationOutput, AnimationPlayer, Animator, Channel, Interpolation, LoopMode, PlaybackState, Sampler,
    TargetPath,
};
pub use bridge::{
    HandlerContext, KeyCode, KeyboardEvent, MouseMovedEvent, PendingWindow, UiRoot, WindowConfig, WindowKey,
};
pub use errors::{PgeError, ResourceKind, Result};
pub use gateway::{Gateway, HeadlessEngine, NativeEngine};
pub use registry::{Handle, IdentityRegistry};
pub use resources::{Material, Mesh, Model3D, ResourceCatalog, Texture};
pub use runtime::Runtime;
pub use scene::{Camera, Node, NodeGraph, NodeKey, PointLight, Scene, SceneKey, Transform};
pub use settings::RuntimeSettings;
