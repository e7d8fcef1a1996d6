//! Error Types
//!
//! This module defines the error type shared by every subsystem of the
//! binding layer.
//!
//! # Overview
//!
//! [`PgeError`] covers four families of failure:
//! - identity failures (a key or handle that no longer refers to a live resource)
//! - structural violations of the node forest or scene ownership
//! - native engine call failures
//! - malformed data rejected at construction time (samplers, resources)
//!
//! # Usage
//!
//! All fallible public APIs return [`Result<T>`], an alias for
//! `std::result::Result<T, PgeError>`.
//!
//! ```rust,ignore
//! use pge::errors::{PgeError, Result};
//!
//! fn move_player(graph: &mut NodeGraph, node: NodeKey) -> Result<()> {
//!     graph.set_translation(node, Vec3::X)?;
//!     Ok(())
//! }
//! ```

use std::fmt;

use thiserror::Error;

/// The kind of resource an identity error refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Node,
    Scene,
    Window,
    Camera,
    Light,
    Mesh,
    Texture,
    Material,
    Animation,
    Player,
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ResourceKind::Node => "node",
            ResourceKind::Scene => "scene",
            ResourceKind::Window => "window",
            ResourceKind::Camera => "camera",
            ResourceKind::Light => "light",
            ResourceKind::Mesh => "mesh",
            ResourceKind::Texture => "texture",
            ResourceKind::Material => "material",
            ResourceKind::Animation => "animation",
            ResourceKind::Player => "animation player",
        };
        f.write_str(name)
    }
}

/// The main error type of the binding layer.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum PgeError {
    // ========================================================================
    // Identity Errors
    // ========================================================================
    /// The resource was destroyed (or never existed). Callers should drop
    /// any references they still hold to it.
    #[error("Stale {0} handle")]
    StaleHandle(ResourceKind),

    // ========================================================================
    // Structural Errors
    // ========================================================================
    /// Attaching the node would make it an ancestor of itself.
    #[error("Cycle detected: a node cannot be attached below itself or its descendants")]
    CycleDetected,

    /// The node is already owned by a parent or by another scene.
    #[error("Node is already owned by another parent or scene")]
    AlreadyOwned,

    // ========================================================================
    // Native Engine Errors
    // ========================================================================
    /// A call across the FFI boundary failed or returned a sentinel.
    #[error("Native call `{call}` failed: {reason}")]
    NativeCallFailed {
        /// Name of the native entry point
        call: &'static str,
        /// What the engine reported
        reason: String,
    },

    /// The bounded set of live windows is full.
    #[error("Window limit reached ({0} live windows)")]
    WindowLimit(usize),

    // ========================================================================
    // Data Validation Errors
    // ========================================================================
    /// Malformed keyframe data, rejected before playback.
    #[error("Invalid sampler: {0}")]
    InvalidSampler(String),

    /// A resource descriptor references missing data.
    #[error("Invalid resource: {0}")]
    InvalidResource(String),
}

impl PgeError {
    /// Shorthand for a failed native call.
    pub(crate) fn native(call: &'static str, reason: impl Into<String>) -> Self {
        PgeError::NativeCallFailed {
            call,
            reason: reason.into(),
        }
    }
}

/// Alias for `Result<T, PgeError>`.
pub type Result<T> = std::result::Result<T, PgeError>;
