//! Headless reference backend.
//!
//! Executes nothing: resource creation hands out opaque objects with
//! monotonic ids, contexts record every operation into an inspectable event
//! log, and queue fences signal the moment work is "submitted". Used by the
//! test suites and for dry-running a graph without a GPU.

use std::sync::atomic::{AtomicU32, AtomicU64, Ordering};
use std::sync::Arc;

use crate::errors::Result;
use crate::resource::RenderTargetDesc;

use super::context::{CommandContext, DispatchRaysDesc};
use super::device::Device;
use super::resources::{
    GpuBuffer, GpuResource, GpuTexture, GpuView, GpuViewKind, PipelineState, PipelineStateDesc,
    RaytracingPipelineState, RaytracingPipelineStateDesc, RootSignature, RootSignatureDesc,
};
use super::swapchain::{PresentHooks, Swapchain};
use super::sync::{Fence, SyncHandle};
use super::types::{BindFlags, BufferDesc, ClearValue, Format, ResourceStates, TextureDesc};

// ============================================================================
// Device
// ============================================================================

/// One simulated queue: a timeline fence that retires submissions instantly.
struct NullQueue {
    name: &'static str,
    fence: Arc<Fence>,
    next_value: AtomicU64,
}

impl NullQueue {
    fn new(name: &'static str) -> Arc<Self> {
        Arc::new(Self {
            name,
            fence: Fence::new(),
            next_value: AtomicU64::new(0),
        })
    }

    fn submit(&self) -> SyncHandle {
        let value = self.next_value.fetch_add(1, Ordering::Relaxed) + 1;
        self.fence.signal(value);
        SyncHandle::new(self.fence.clone(), value)
    }
}

/// Headless device. Creation methods count what they hand out so tests can
/// assert realization behavior (cache hits create nothing).
pub struct NullDevice {
    next_resource_id: AtomicU64,
    next_view_id: AtomicU64,
    heap_cursors: [AtomicU32; 4],
    textures_created: AtomicU64,
    buffers_created: AtomicU64,
    views_created: AtomicU64,
    pipelines_created: AtomicU64,
    graphics_queue: Arc<NullQueue>,
    compute_queue: Arc<NullQueue>,
    copy_queue: Arc<NullQueue>,
}

impl NullDevice {
    #[must_use]
    pub fn new() -> Self {
        Self {
            next_resource_id: AtomicU64::new(1),
            next_view_id: AtomicU64::new(1),
            heap_cursors: Default::default(),
            textures_created: AtomicU64::new(0),
            buffers_created: AtomicU64::new(0),
            views_created: AtomicU64::new(0),
            pipelines_created: AtomicU64::new(0),
            graphics_queue: NullQueue::new("graphics"),
            compute_queue: NullQueue::new("compute"),
            copy_queue: NullQueue::new("copy"),
        }
    }

    /// Number of textures created so far.
    #[must_use]
    pub fn textures_created(&self) -> u64 {
        self.textures_created.load(Ordering::Relaxed)
    }

    /// Number of buffers created so far.
    #[must_use]
    pub fn buffers_created(&self) -> u64 {
        self.buffers_created.load(Ordering::Relaxed)
    }

    /// Number of views created so far.
    #[must_use]
    pub fn views_created(&self) -> u64 {
        self.views_created.load(Ordering::Relaxed)
    }

    /// Number of root signatures and pipeline states created so far.
    #[must_use]
    pub fn pipelines_created(&self) -> u64 {
        self.pipelines_created.load(Ordering::Relaxed)
    }

    /// Concrete graphics-queue context whose event log tests can inspect.
    #[must_use]
    pub fn graphics_context(&self) -> NullCommandContext {
        NullCommandContext::new(self.graphics_queue.clone())
    }

    /// Concrete async-compute context.
    #[must_use]
    pub fn async_compute_context(&self) -> NullCommandContext {
        NullCommandContext::new(self.compute_queue.clone())
    }

    /// Concrete copy-queue context.
    #[must_use]
    pub fn copy_context(&self) -> NullCommandContext {
        NullCommandContext::new(self.copy_queue.clone())
    }

    fn next_resource_id(&self) -> u64 {
        self.next_resource_id.fetch_add(1, Ordering::Relaxed)
    }

    fn make_view(&self, kind: GpuViewKind, resource_id: u64) -> GpuView {
        let heap = match kind {
            GpuViewKind::RenderTarget => 0,
            GpuViewKind::DepthStencil => 1,
            GpuViewKind::ShaderResource => 2,
            GpuViewKind::UnorderedAccess => 3,
        };
        let heap_index = self.heap_cursors[heap].fetch_add(1, Ordering::Relaxed);
        let id = self.next_view_id.fetch_add(1, Ordering::Relaxed);
        self.views_created.fetch_add(1, Ordering::Relaxed);
        GpuView::new(id, kind, resource_id, heap_index)
    }
}

impl Default for NullDevice {
    fn default() -> Self {
        Self::new()
    }
}

impl Device for NullDevice {
    fn create_buffer(&self, desc: &BufferDesc) -> Result<GpuBuffer> {
        self.buffers_created.fetch_add(1, Ordering::Relaxed);
        Ok(GpuBuffer::new(self.next_resource_id(), *desc))
    }

    fn create_texture(
        &self,
        desc: &TextureDesc,
        clear_value: Option<&ClearValue>,
    ) -> Result<GpuTexture> {
        self.textures_created.fetch_add(1, Ordering::Relaxed);
        log::trace!("null device: create texture '{}'", desc.name);
        Ok(GpuTexture::new(
            self.next_resource_id(),
            desc.clone(),
            clear_value.copied(),
        ))
    }

    fn create_render_target_view(
        &self,
        texture: &GpuTexture,
        _array_slice: Option<u32>,
        _mip_slice: Option<u32>,
        _array_size: Option<u32>,
        _srgb: bool,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::RenderTarget, texture.resource().id()))
    }

    fn create_depth_stencil_view(
        &self,
        texture: &GpuTexture,
        _array_slice: Option<u32>,
        _mip_slice: Option<u32>,
        _array_size: Option<u32>,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::DepthStencil, texture.resource().id()))
    }

    fn create_texture_srv(
        &self,
        texture: &GpuTexture,
        _srgb: bool,
        _most_detailed_mip: Option<u32>,
        _mip_levels: Option<u32>,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::ShaderResource, texture.resource().id()))
    }

    fn create_texture_uav(
        &self,
        texture: &GpuTexture,
        _array_slice: Option<u32>,
        _mip_slice: Option<u32>,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::UnorderedAccess, texture.resource().id()))
    }

    fn create_buffer_srv(
        &self,
        buffer: &GpuBuffer,
        _raw: bool,
        _first_element: u32,
        _num_elements: u32,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::ShaderResource, buffer.resource().id()))
    }

    fn create_buffer_uav(
        &self,
        buffer: &GpuBuffer,
        _num_elements: u32,
        _counter_offset_in_bytes: u64,
    ) -> Result<GpuView> {
        Ok(self.make_view(GpuViewKind::UnorderedAccess, buffer.resource().id()))
    }

    fn create_root_signature(&self, desc: &RootSignatureDesc) -> Result<RootSignature> {
        self.pipelines_created.fetch_add(1, Ordering::Relaxed);
        Ok(RootSignature::new(self.next_resource_id(), desc.clone()))
    }

    fn create_pipeline_state(&self, desc: &PipelineStateDesc) -> Result<PipelineState> {
        self.pipelines_created.fetch_add(1, Ordering::Relaxed);
        Ok(PipelineState::new(self.next_resource_id(), desc.clone()))
    }

    fn create_raytracing_pipeline_state(
        &self,
        desc: &RaytracingPipelineStateDesc,
    ) -> Result<RaytracingPipelineState> {
        self.pipelines_created.fetch_add(1, Ordering::Relaxed);
        Ok(RaytracingPipelineState::new(
            self.next_resource_id(),
            desc.clone(),
        ))
    }

    fn create_graphics_context(&self) -> Box<dyn CommandContext> {
        Box::new(self.graphics_context())
    }

    fn create_async_compute_context(&self) -> Box<dyn CommandContext> {
        Box::new(self.async_compute_context())
    }

    fn create_copy_context(&self) -> Box<dyn CommandContext> {
        Box::new(self.copy_context())
    }

    fn wait_idle(&self) {
        // Submissions retire instantly; nothing outstanding to drain.
    }
}

// ============================================================================
// Command Context
// ============================================================================

/// One recorded operation, in call order.
#[derive(Clone, PartialEq, Debug)]
pub enum ContextEvent {
    Open,
    Close,
    Execute {
        wait: bool,
    },
    WaitForSyncHandle {
        value: u64,
    },
    TransitionBarrier {
        resource_id: u64,
        resource_name: String,
        states: ResourceStates,
    },
    FlushBarriers {
        count: usize,
    },
    UavBarrier {
        resource_id: Option<u64>,
    },
    BeginRenderPass {
        render_targets: usize,
        has_depth_stencil: bool,
    },
    EndRenderPass,
    SetPipelineState {
        name: String,
    },
    SetGraphicsRootSignature {
        name: String,
    },
    SetComputeRootSignature {
        name: String,
    },
    Dispatch {
        groups_x: u32,
        groups_y: u32,
        groups_z: u32,
    },
    DispatchRays {
        width: u32,
        height: u32,
        depth: u32,
    },
    BeginEvent {
        name: String,
    },
    EndEvent,
}

/// Recording command context over a simulated queue.
pub struct NullCommandContext {
    queue: Arc<NullQueue>,
    events: Vec<ContextEvent>,
    pending_barriers: usize,
}

impl NullCommandContext {
    fn new(queue: Arc<NullQueue>) -> Self {
        Self {
            queue,
            events: Vec::new(),
            pending_barriers: 0,
        }
    }

    /// Everything recorded since creation (or the last
    /// [`clear_events`](Self::clear_events)).
    #[must_use]
    pub fn events(&self) -> &[ContextEvent] {
        &self.events
    }

    pub fn clear_events(&mut self) {
        self.events.clear();
    }

    /// Name of the queue this context records onto.
    #[must_use]
    pub fn queue_name(&self) -> &'static str {
        self.queue.name
    }
}

impl CommandContext for NullCommandContext {
    fn open(&mut self) {
        self.events.push(ContextEvent::Open);
    }

    fn close(&mut self) {
        self.events.push(ContextEvent::Close);
    }

    fn execute(&mut self, wait: bool) -> SyncHandle {
        self.events.push(ContextEvent::Execute { wait });
        let handle = self.queue.submit();
        if wait {
            handle.wait();
        }
        handle
    }

    fn wait_for_sync_handle(&mut self, handle: &SyncHandle) {
        if handle.is_valid() {
            self.events.push(ContextEvent::WaitForSyncHandle {
                value: handle.value(),
            });
        }
    }

    fn transition_barrier(&mut self, resource: &GpuResource, states: ResourceStates) {
        self.pending_barriers += 1;
        self.events.push(ContextEvent::TransitionBarrier {
            resource_id: resource.id(),
            resource_name: resource.name().to_owned(),
            states,
        });
    }

    fn flush_resource_barriers(&mut self) {
        let count = self.pending_barriers;
        self.pending_barriers = 0;
        self.events.push(ContextEvent::FlushBarriers { count });
    }

    fn uav_barrier(&mut self, resource: Option<&GpuResource>) {
        self.events.push(ContextEvent::UavBarrier {
            resource_id: resource.map(GpuResource::id),
        });
    }

    fn begin_render_pass(&mut self, desc: &RenderTargetDesc) {
        self.events.push(ContextEvent::BeginRenderPass {
            render_targets: desc.render_targets.len(),
            has_depth_stencil: desc.depth_stencil.is_some(),
        });
    }

    fn end_render_pass(&mut self) {
        self.events.push(ContextEvent::EndRenderPass);
    }

    fn set_pipeline_state(&mut self, pipeline: &PipelineState) {
        self.events.push(ContextEvent::SetPipelineState {
            name: pipeline.name().to_owned(),
        });
    }

    fn set_graphics_root_signature(&mut self, root_signature: &RootSignature) {
        self.events.push(ContextEvent::SetGraphicsRootSignature {
            name: root_signature.name().to_owned(),
        });
    }

    fn set_compute_root_signature(&mut self, root_signature: &RootSignature) {
        self.events.push(ContextEvent::SetComputeRootSignature {
            name: root_signature.name().to_owned(),
        });
    }

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32) {
        self.events.push(ContextEvent::Dispatch {
            groups_x,
            groups_y,
            groups_z,
        });
    }

    fn dispatch_rays(&mut self, desc: &DispatchRaysDesc) {
        self.events.push(ContextEvent::DispatchRays {
            width: desc.width,
            height: desc.height,
            depth: desc.depth,
        });
    }

    fn begin_event(&mut self, name: &str) {
        self.events.push(ContextEvent::BeginEvent {
            name: name.to_owned(),
        });
    }

    fn end_event(&mut self) {
        self.events.push(ContextEvent::EndEvent);
    }
}

// ============================================================================
// Swapchain
// ============================================================================

/// Headless swapchain: a rotating ring of render-target textures.
pub struct NullSwapchain {
    back_buffers: Vec<(GpuTexture, GpuView)>,
    index: usize,
    frames_presented: u64,
}

impl NullSwapchain {
    pub fn new(device: &NullDevice, width: u32, height: u32, buffer_count: usize) -> Result<Self> {
        let mut back_buffers = Vec::with_capacity(buffer_count);
        for i in 0..buffer_count {
            let desc = TextureDesc {
                name: format!("Back Buffer {i}"),
                format: Format::Rgba8Unorm,
                dimension: super::types::TextureDimension::Texture2D,
                width,
                height,
                depth_or_array_size: 1,
                mip_levels: 1,
                bind_flags: BindFlags::RENDER_TARGET,
            };
            let texture = device.create_texture(&desc, Some(&ClearValue::BLACK))?;
            let rtv = device.create_render_target_view(&texture, None, None, None, false)?;
            back_buffers.push((texture, rtv));
        }
        Ok(Self {
            back_buffers,
            index: 0,
            frames_presented: 0,
        })
    }

    #[must_use]
    pub fn frames_presented(&self) -> u64 {
        self.frames_presented
    }
}

impl Swapchain for NullSwapchain {
    fn current_back_buffer(&self) -> (&GpuTexture, &GpuView) {
        let (texture, rtv) = &self.back_buffers[self.index];
        (texture, rtv)
    }

    fn present(&mut self, _vsync: bool, hooks: &mut dyn PresentHooks) -> Result<()> {
        let handle = hooks.pre_present();
        self.index = (self.index + 1) % self.back_buffers.len();
        self.frames_presented += 1;
        hooks.post_present(handle);
        Ok(())
    }
}
