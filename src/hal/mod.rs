//! Hardware Abstraction Layer
//!
//! The interfaces the graph core consumes, shaped after a Direct3D-12-class
//! explicit API: a [`Device`] that creates resources, views, and pipeline
//! objects; a [`CommandContext`] that records barriers, render passes, and
//! dispatches; a [`Swapchain`] that surfaces back buffers; and [`SyncHandle`]
//! fence values for cross-queue ordering.
//!
//! Physical GPU objects ([`GpuTexture`], [`GpuBuffer`], [`GpuView`], pipeline
//! objects) are opaque shared owners managed by the device layer; the graph
//! holds them for a frame's duration and never touches driver memory
//! directly.
//!
//! The [`null`] backend is a headless implementation that records every
//! operation instead of executing it; the reference target for tests and
//! graph dry-runs.

pub mod context;
pub mod device;
pub mod null;
pub mod resources;
pub mod swapchain;
pub mod sync;
pub mod types;

pub use context::{CommandContext, DispatchRaysDesc};
pub use device::Device;
pub use null::{ContextEvent, NullCommandContext, NullDevice, NullSwapchain};
pub use resources::{
    GpuBuffer, GpuResource, GpuTexture, GpuView, GpuViewKind, PipelineState, PipelineStateDesc,
    RaytracingPipelineState, RaytracingPipelineStateDesc, RootSignature, RootSignatureDesc,
};
pub use swapchain::{PresentHooks, Swapchain};
pub use sync::{Fence, SyncHandle};
pub use types::{
    BindFlags, BufferDesc, ClearValue, Format, ResourceStates, TextureDesc, TextureDimension,
};
