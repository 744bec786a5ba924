//! Ember RDG, the render graph core of the Ember renderer.
//!
//! Rendering code declares logical passes with typed resource dependencies;
//! the graph schedules them into dependency levels, realizes the physical GPU
//! resources and views they need, issues the state-transition barriers
//! between levels, and replays each pass's recorded closure against a command
//! context.
//!
//! # Frame Lifecycle
//!
//! 1. **Build**: create a [`RenderGraph`] over the frame allocator, create or
//!    import resource handles, add passes with reads, writes, and an execute
//!    closure
//! 2. **Execute**: [`RenderGraph::execute`] appends the epilogue, compiles
//!    the dependency levels, realizes dirty resources through the
//!    [`hal::Device`], and replays every pass within per-level barrier
//!    batches
//! 3. **Drop**: pass objects are freed in bulk when the graph is dropped and
//!    the allocator is reset by the next frame's graph
//!
//! Physical resources live in the [`RenderGraphRegistry`] and persist across
//! frames; they are recreated only when their descriptor changes.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::too_many_arguments)]

pub mod allocator;
pub mod errors;
pub mod graph;
pub mod hal;
pub mod resource;

pub use allocator::FrameAllocator;
pub use errors::{RdgError, Result};
pub use graph::dgml;
pub use graph::pass::RenderPass;
pub use graph::registry::RenderGraphRegistry;
pub use graph::scheduler::{DependencyLevel, Schedule};
pub use graph::RenderGraph;
pub use resource::{
    RenderTargetDesc, ResourceFlags, ResourceKind, RgBufferDesc, RgResourceHandle, RgTextureDesc,
    RgTextureKind, RgViewDesc, RgViewInfo, RgViewKind,
};
