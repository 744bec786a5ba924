//! Render Graph
//!
//! The per-frame graph object. Built fresh each frame over the frame
//! allocator: rendering code creates virtual handles for transient resources,
//! imports externally-owned textures, and adds passes declaring reads,
//! writes, and a recorder closure. [`RenderGraph::execute`] then appends the
//! implicit epilogue, compiles the schedule, realizes physical resources
//! through the registry, and replays every dependency level against the
//! command context.

use crate::allocator::FrameAllocator;
use crate::errors::Result;
use crate::hal::{BindFlags, CommandContext, Device, GpuTexture};
use crate::resource::{
    RenderTargetDesc, ResourceFlags, ResourceKind, RgBuffer, RgBufferDesc, RgResourceHandle,
    RgTexture, RgTextureDesc, RgView, RgViewDesc, RgViewKind,
};

use super::dgml;
use super::executor;
use super::pass::{PassBox, RenderPass};
use super::registry::RenderGraphRegistry;
use super::scheduler::{self, Schedule};

// ============================================================================
// Frame Resource Declarations
// ============================================================================

/// Everything the frame declared, per kind, indexed by handle id.
#[derive(Default)]
pub(crate) struct GraphResources {
    pub buffers: Vec<RgBuffer>,
    pub textures: Vec<RgTexture>,
    pub render_target_views: Vec<RgView>,
    pub depth_stencil_views: Vec<RgView>,
    pub shader_resource_views: Vec<RgView>,
    pub unordered_access_views: Vec<RgView>,
    pub imported_textures: Vec<GpuTexture>,
}

impl GraphResources {
    pub(crate) fn allow_render_target(&self, handle: RgResourceHandle) -> bool {
        assert_eq!(handle.kind(), ResourceKind::Texture);
        if handle.is_imported() {
            self.imported_texture(handle)
                .desc()
                .bind_flags
                .contains(BindFlags::RENDER_TARGET)
        } else {
            self.texture_desc(handle).allow_render_target
        }
    }

    pub(crate) fn allow_depth_stencil(&self, handle: RgResourceHandle) -> bool {
        assert_eq!(handle.kind(), ResourceKind::Texture);
        if handle.is_imported() {
            self.imported_texture(handle)
                .desc()
                .bind_flags
                .contains(BindFlags::DEPTH_STENCIL)
        } else {
            self.texture_desc(handle).allow_depth_stencil
        }
    }

    pub(crate) fn allow_unordered_access(&self, handle: RgResourceHandle) -> bool {
        match handle.kind() {
            ResourceKind::Buffer => {
                self.buffers[handle.id() as usize].desc.allow_unordered_access
            }
            ResourceKind::Texture => {
                if handle.is_imported() {
                    self.imported_texture(handle)
                        .desc()
                        .bind_flags
                        .contains(BindFlags::UNORDERED_ACCESS)
                } else {
                    self.texture_desc(handle).allow_unordered_access
                }
            }
            kind => panic!("handle kind {kind:?} has no unordered access bit"),
        }
    }

    /// Human-readable name of the resource a handle refers to; used for DGML
    /// edge labels and diagnostics.
    pub(crate) fn resource_name(&self, handle: RgResourceHandle) -> &str {
        match handle.kind() {
            ResourceKind::Texture => {
                if handle.is_imported() {
                    self.imported_texture(handle).name()
                } else {
                    &self.texture_desc(handle).name
                }
            }
            _ => "<unknown>",
        }
    }

    fn texture_desc(&self, handle: RgResourceHandle) -> &RgTextureDesc {
        &self.textures[handle.id() as usize].desc
    }

    fn imported_texture(&self, handle: RgResourceHandle) -> &GpuTexture {
        &self.imported_textures[handle.id() as usize]
    }
}

// ============================================================================
// Render Graph
// ============================================================================

/// The per-frame render graph.
///
/// Created fresh each frame over the (reset) frame allocator and the
/// persistent registry. Pass objects live in the arena and are dropped in
/// bulk with the graph.
pub struct RenderGraph<'fr> {
    allocator: &'fr FrameAllocator,
    registry: &'fr mut RenderGraphRegistry,
    resources: GraphResources,
    passes: Vec<PassBox<'fr>>,
    epilogue: Option<PassBox<'fr>>,
    schedule: Option<Schedule>,
}

impl<'fr> RenderGraph<'fr> {
    /// Starts a new frame. Resets the allocator and allocates the implicit
    /// prologue and epilogue passes from it.
    pub fn new(
        allocator: &'fr mut FrameAllocator,
        registry: &'fr mut RenderGraphRegistry,
    ) -> Self {
        allocator.reset();
        let allocator: &'fr FrameAllocator = allocator;

        let mut graph = Self {
            allocator,
            registry,
            resources: GraphResources::default(),
            passes: Vec::new(),
            epilogue: None,
            schedule: None,
        };
        let prologue = graph.alloc_pass("Prologue");
        let epilogue = graph.alloc_pass("Epilogue");
        graph.passes.push(prologue);
        graph.epilogue = Some(epilogue);
        graph
    }

    fn alloc_pass(&self, name: &str) -> PassBox<'fr> {
        let allocator = self.allocator;
        let name = allocator.alloc_str(name);
        bumpalo::boxed::Box::new_in(RenderPass::new(name), allocator.bump())
    }

    // ========================================================================
    // Resource Declaration
    // ========================================================================

    /// Declares a transient buffer and returns its handle at version 0.
    pub fn create_buffer(&mut self, desc: RgBufferDesc) -> RgResourceHandle {
        let handle = RgResourceHandle::new(
            ResourceKind::Buffer,
            ResourceFlags::empty(),
            self.resources.buffers.len() as u32,
        );
        self.resources.buffers.push(RgBuffer { handle, desc });
        handle
    }

    /// Declares a transient texture and returns its handle at version 0.
    pub fn create_texture(&mut self, desc: RgTextureDesc) -> RgResourceHandle {
        let handle = RgResourceHandle::new(
            ResourceKind::Texture,
            ResourceFlags::empty(),
            self.resources.textures.len() as u32,
        );
        self.resources.textures.push(RgTexture { handle, desc });
        handle
    }

    /// Declares a view over a declared buffer or texture.
    ///
    /// # Panics
    ///
    /// Panics if the backing handle is invalid or its kind does not match the
    /// view variant (texture views over textures, buffer views over buffers).
    pub fn create_view(&mut self, desc: RgViewDesc) -> RgResourceHandle {
        assert!(desc.resource.is_valid(), "view over an invalid handle");
        let expected = match desc.kind() {
            RgViewKind::BufferSrv | RgViewKind::BufferUav => ResourceKind::Buffer,
            _ => ResourceKind::Texture,
        };
        assert_eq!(
            desc.resource.kind(),
            expected,
            "view variant does not match the backing resource kind"
        );

        let container = match desc.kind() {
            RgViewKind::Rtv => &mut self.resources.render_target_views,
            RgViewKind::Dsv => &mut self.resources.depth_stencil_views,
            RgViewKind::BufferSrv | RgViewKind::TextureSrv => {
                &mut self.resources.shader_resource_views
            }
            RgViewKind::BufferUav | RgViewKind::TextureUav => {
                &mut self.resources.unordered_access_views
            }
        };
        let handle = RgResourceHandle::new(
            desc.handle_kind(),
            ResourceFlags::empty(),
            container.len() as u32,
        );
        container.push(RgView { handle, desc });
        handle
    }

    /// Imports an externally-owned texture (e.g. the swapchain back buffer).
    /// The registry will never allocate or free it.
    pub fn import_texture(&mut self, texture: &GpuTexture) -> RgResourceHandle {
        let handle = RgResourceHandle::new(
            ResourceKind::Texture,
            ResourceFlags::IMPORTED,
            self.resources.imported_textures.len() as u32,
        );
        self.resources.imported_textures.push(texture.clone());
        handle
    }

    #[must_use]
    pub fn allow_render_target(&self, handle: RgResourceHandle) -> bool {
        self.resources.allow_render_target(handle)
    }

    #[must_use]
    pub fn allow_depth_stencil(&self, handle: RgResourceHandle) -> bool {
        self.resources.allow_depth_stencil(handle)
    }

    #[must_use]
    pub fn allow_unordered_access(&self, handle: RgResourceHandle) -> bool {
        self.resources.allow_unordered_access(handle)
    }

    // ========================================================================
    // Passes
    // ========================================================================

    /// Adds a pass. Passes execute in dependency order; independent passes
    /// keep their declaration order.
    pub fn add_pass(&mut self, name: &str) -> &mut RenderPass<'fr> {
        let pass = self.alloc_pass(name);
        self.passes.push(pass);
        self.passes.last_mut().unwrap()
    }

    /// The implicit first pass (the topological source).
    pub fn prologue(&mut self) -> &mut RenderPass<'fr> {
        &mut self.passes[0]
    }

    /// The implicit last pass. Declare reads on it to give presented or
    /// read-back resources a defined final reader.
    pub fn epilogue(&mut self) -> &mut RenderPass<'fr> {
        self.epilogue
            .as_mut()
            .expect("the epilogue is consumed once the graph executes")
    }

    #[must_use]
    pub fn pass_count(&self) -> usize {
        self.passes.len() + usize::from(self.epilogue.is_some())
    }

    /// A pass by index (declaration order; the epilogue is last after
    /// execution).
    #[must_use]
    pub fn pass(&self, index: usize) -> &RenderPass<'fr> {
        &self.passes[index]
    }

    /// Mutable access to an already-added pass, for code that declares
    /// dependencies after more passes were added. Index 0 is the prologue.
    pub fn pass_mut(&mut self, index: usize) -> &mut RenderPass<'fr> {
        &mut self.passes[index]
    }

    // ========================================================================
    // Execution
    // ========================================================================

    /// Compiles and runs the frame: appends the epilogue, schedules the DAG,
    /// realizes dirty physical resources, then replays each dependency level
    /// (barrier batch first, then the member passes) on `context`.
    pub fn execute(
        &mut self,
        device: &dyn Device,
        context: &mut dyn CommandContext,
    ) -> Result<()> {
        let epilogue = self
            .epilogue
            .take()
            .expect("RenderGraph::execute called twice");
        self.passes.push(epilogue);

        let schedule = scheduler::build_schedule(&mut self.passes);
        self.registry.realize_resources(&self.resources, device)?;

        context.begin_event("Render Graph");
        for level in schedule.levels() {
            executor::execute_level(
                level,
                &mut self.passes,
                &self.resources,
                &*self.registry,
                context,
            );
        }
        context.end_event();

        self.schedule = Some(schedule);
        Ok(())
    }

    /// The compiled schedule, available after [`execute`](Self::execute).
    #[must_use]
    pub fn schedule(&self) -> Option<&Schedule> {
        self.schedule.as_ref()
    }

    /// The registry this graph realizes into.
    #[must_use]
    pub fn registry(&self) -> &RenderGraphRegistry {
        self.registry
    }

    pub fn registry_mut(&mut self) -> &mut RenderGraphRegistry {
        self.registry
    }

    // ========================================================================
    // Debug Export
    // ========================================================================

    /// Serializes the dependency DAG to a DGML document. Edge labels name the
    /// resource that caused the edge; implicit prologue/epilogue ordering
    /// edges carry no label.
    ///
    /// # Panics
    ///
    /// Panics if called before [`execute`](Self::execute).
    #[must_use]
    pub fn export_dgml(&self, title: &str) -> dgml::Graph {
        let schedule = self
            .schedule
            .as_ref()
            .expect("export_dgml requires the graph to have executed");

        let mut graph = dgml::Graph::new(title, dgml::GraphDirection::LeftToRight);
        for (index, pass) in self.passes.iter().enumerate() {
            graph.add_node(pass.name(), pass.name());
            for &successor in schedule.adjacency(index) {
                let neighbor = &self.passes[successor];
                let label = pass
                    .writes
                    .iter()
                    .find(|&&written| {
                        neighbor.reads_from(written)
                            || neighbor.writes_to(written.next_version())
                    })
                    .map_or("", |&written| self.resources.resource_name(written));
                graph.add_link(pass.name(), neighbor.name(), label);
            }
        }
        graph
    }
}

impl std::fmt::Debug for RenderGraph<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderGraph")
            .field("passes", &self.passes.len())
            .field("textures", &self.resources.textures.len())
            .field("buffers", &self.resources.buffers.len())
            .field("scheduled", &self.schedule.is_some())
            .finish()
    }
}

/// Bundles render-target attachments for a pass, checking handle kinds as
/// they are added. Free function mirror of [`RenderTargetDesc`] building, for
/// closures that assemble the bundle inline.
#[must_use]
pub fn render_target(rtvs: &[RgResourceHandle], dsv: Option<RgResourceHandle>) -> RenderTargetDesc {
    let mut desc = RenderTargetDesc::new();
    for &rtv in rtvs {
        desc.add_render_target(rtv);
    }
    if let Some(dsv) = dsv {
        desc.set_depth_stencil(dsv);
    }
    desc
}
