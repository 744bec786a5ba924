//! Command recording interface.
//!
//! The target-API abstraction over a command list / encoder. The executor
//! assumes exactly these operations; pass closures receive the context and
//! are responsible for pipeline binding, draws and dispatches, and render
//! pass scoping for passes that declared an attachment set.

use crate::resource::RenderTargetDesc;

use super::resources::{GpuResource, PipelineState, RootSignature};
use super::sync::SyncHandle;
use super::types::ResourceStates;

/// Parameters for a raytracing dispatch.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct DispatchRaysDesc {
    pub width: u32,
    pub height: u32,
    pub depth: u32,
}

/// A recorded command list bound to one queue.
///
/// Barrier calls batch until [`flush_resource_barriers`](Self::flush_resource_barriers);
/// [`execute`](Self::execute) submits the recorded work and returns the
/// [`SyncHandle`] other queues (or the CPU) can wait on. With `wait = true`
/// the call blocks until the GPU finishes; otherwise it is non-blocking.
pub trait CommandContext {
    fn open(&mut self);

    fn close(&mut self);

    /// Submits recorded work. Blocks only when `wait` is set.
    fn execute(&mut self, wait: bool) -> SyncHandle;

    /// Makes this context's queue block at submission time until `handle`
    /// signals. No-op for the null handle.
    fn wait_for_sync_handle(&mut self, handle: &SyncHandle);

    /// Queues a transition barrier to `states` for `resource`.
    fn transition_barrier(&mut self, resource: &GpuResource, states: ResourceStates);

    /// Flushes all queued barriers as one batch.
    fn flush_resource_barriers(&mut self);

    /// UAV barrier; `None` fences all UAV accesses on the queue.
    fn uav_barrier(&mut self, resource: Option<&GpuResource>);

    fn begin_render_pass(&mut self, desc: &RenderTargetDesc);

    fn end_render_pass(&mut self);

    fn set_pipeline_state(&mut self, pipeline: &PipelineState);

    fn set_graphics_root_signature(&mut self, root_signature: &RootSignature);

    fn set_compute_root_signature(&mut self, root_signature: &RootSignature);

    fn dispatch(&mut self, groups_x: u32, groups_y: u32, groups_z: u32);

    fn dispatch_rays(&mut self, desc: &DispatchRaysDesc);

    /// Opens a named debug event scope (PIX-style marker).
    fn begin_event(&mut self, name: &str);

    fn end_event(&mut self);

    /// Two-dimensional dispatch over pre-divided group counts.
    fn dispatch_2d(&mut self, groups_x: u32, groups_y: u32) {
        self.dispatch(groups_x, groups_y, 1);
    }
}
