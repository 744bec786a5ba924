//! Device interface.
//!
//! The factory side of the target API: resource, view, and pipeline creation
//! plus command context acquisition for the three queue classes. Creation
//! failures surface as [`RdgError`](crate::RdgError) values and short-circuit
//! the frame being realized.

use crate::errors::Result;

use super::context::CommandContext;
use super::resources::{
    GpuBuffer, GpuTexture, GpuView, PipelineState, PipelineStateDesc, RaytracingPipelineState,
    RaytracingPipelineStateDesc, RootSignature, RootSignatureDesc,
};
use super::types::{BufferDesc, ClearValue, TextureDesc};

/// A logical GPU device.
///
/// Creation methods take `&self`; device backends are internally synchronized
/// the way driver objects are. Contexts are created per recording site and
/// share the device's queues.
pub trait Device {
    fn create_buffer(&self, desc: &BufferDesc) -> Result<GpuBuffer>;

    fn create_texture(
        &self,
        desc: &TextureDesc,
        clear_value: Option<&ClearValue>,
    ) -> Result<GpuTexture>;

    fn create_render_target_view(
        &self,
        texture: &GpuTexture,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
        srgb: bool,
    ) -> Result<GpuView>;

    fn create_depth_stencil_view(
        &self,
        texture: &GpuTexture,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
    ) -> Result<GpuView>;

    fn create_texture_srv(
        &self,
        texture: &GpuTexture,
        srgb: bool,
        most_detailed_mip: Option<u32>,
        mip_levels: Option<u32>,
    ) -> Result<GpuView>;

    fn create_texture_uav(
        &self,
        texture: &GpuTexture,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
    ) -> Result<GpuView>;

    fn create_buffer_srv(
        &self,
        buffer: &GpuBuffer,
        raw: bool,
        first_element: u32,
        num_elements: u32,
    ) -> Result<GpuView>;

    fn create_buffer_uav(
        &self,
        buffer: &GpuBuffer,
        num_elements: u32,
        counter_offset_in_bytes: u64,
    ) -> Result<GpuView>;

    fn create_root_signature(&self, desc: &RootSignatureDesc) -> Result<RootSignature>;

    fn create_pipeline_state(&self, desc: &PipelineStateDesc) -> Result<PipelineState>;

    fn create_raytracing_pipeline_state(
        &self,
        desc: &RaytracingPipelineStateDesc,
    ) -> Result<RaytracingPipelineState>;

    /// A context recording onto the direct (graphics) queue.
    fn create_graphics_context(&self) -> Box<dyn CommandContext>;

    /// A context recording onto the async compute queue.
    fn create_async_compute_context(&self) -> Box<dyn CommandContext>;

    /// A context recording onto the copy queue.
    fn create_copy_context(&self) -> Box<dyn CommandContext>;

    /// Blocks until every queue drains. Used at teardown and device loss.
    fn wait_idle(&self);
}
