//! Error Types
//!
//! The main error type [`RdgError`] covers the failure modes that can
//! short-circuit a frame: resource and pipeline creation failures surfaced by
//! the device layer, and device loss. Each frame is built from scratch, so
//! none of these are retried by the graph itself; the engine's outer loop
//! decides whether to log and continue or to tear down.
//!
//! Logic errors (invalid handle kinds, out-of-range ids, dependency cycles,
//! arena overflow, read/write conflicts within a dependency level) are bugs
//! in render code and panic instead of returning an error.

use thiserror::Error;

/// The main error type for the render graph core.
#[derive(Error, Debug)]
pub enum RdgError {
    // ========================================================================
    // Device Errors
    // ========================================================================
    /// The device failed to create a texture.
    #[error("failed to create texture '{name}' ({width}x{height}, {format}): {reason}")]
    TextureCreation {
        name: String,
        width: u32,
        height: u32,
        format: &'static str,
        reason: String,
    },

    /// The device failed to create a buffer.
    #[error("failed to create buffer of {size_in_bytes} bytes: {reason}")]
    BufferCreation { size_in_bytes: u64, reason: String },

    /// The device failed to create a resource view.
    #[error("failed to create {kind} over resource '{resource}': {reason}")]
    ViewCreation {
        kind: &'static str,
        resource: String,
        reason: String,
    },

    /// The device failed to create a root signature or pipeline state.
    #[error("failed to create pipeline object '{name}': {reason}")]
    PipelineCreation { name: String, reason: String },

    /// The device was lost or removed; the client is expected to drop the
    /// graph and recreate device resources.
    #[error("device lost: {0}")]
    DeviceLost(String),
}

/// Convenience alias used by all fallible APIs in this crate.
pub type Result<T> = std::result::Result<T, RdgError>;
