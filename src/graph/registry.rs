//! Resource Registry
//!
//! Maps virtual handles to physical GPU resources and views, and keeps those
//! physical objects alive across frames. Realization is lazy and cached: a
//! resource is (re)created only when its descriptor differs from the one
//! recorded last frame, and a view is rebuilt only when its own descriptor
//! changed or its backing resource was realized dirty this frame.
//!
//! The registry also owns the process-lifetime pipeline registries: root
//! signatures and (raytracing) pipeline states are appended once and referred
//! to by permanent handles.

use rustc_hash::{FxHashMap, FxHashSet};

use crate::errors::Result;
use crate::hal::{
    BindFlags, BufferDesc, Device, GpuBuffer, GpuResource, GpuTexture, GpuView, PipelineState,
    PipelineStateDesc, RaytracingPipelineState, RaytracingPipelineStateDesc, RootSignature,
    RootSignatureDesc, TextureDesc, TextureDimension,
};
use crate::resource::{
    ResourceFlags, ResourceKind, RgBufferDesc, RgResourceHandle, RgTextureDesc, RgTextureKind,
    RgView, RgViewDesc, RgViewInfo,
};

use super::graph::GraphResources;

/// Key identifying a backing resource independent of handle version.
type DirtyKey = (ResourceKind, bool, u32);

fn dirty_key(handle: RgResourceHandle) -> DirtyKey {
    (handle.kind(), handle.is_imported(), handle.id())
}

/// Handle → physical resource mapping with cross-frame caching.
pub struct RenderGraphRegistry {
    // Process-lifetime pipeline registries (append-only).
    root_signatures: Vec<RootSignature>,
    pipeline_states: Vec<PipelineState>,
    raytracing_pipeline_states: Vec<RaytracingPipelineState>,

    // Cached descriptors deciding whether last frame's objects survive.
    buffer_desc_cache: FxHashMap<RgResourceHandle, RgBufferDesc>,
    texture_desc_cache: FxHashMap<RgResourceHandle, RgTextureDesc>,
    view_desc_cache: FxHashMap<RgResourceHandle, RgViewDesc>,
    // Physical identity of imported textures seen last frame, by handle id.
    imported_ids: FxHashMap<u32, u64>,

    // Realized objects, indexed by handle id.
    buffers: Vec<Option<GpuBuffer>>,
    textures: Vec<Option<GpuTexture>>,
    render_target_views: Vec<Option<GpuView>>,
    depth_stencil_views: Vec<Option<GpuView>>,
    shader_resource_views: Vec<Option<GpuView>>,
    unordered_access_views: Vec<Option<GpuView>>,

    // Externally-owned textures for the current frame.
    imported_textures: Vec<GpuTexture>,
}

impl RenderGraphRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self {
            root_signatures: Vec::new(),
            pipeline_states: Vec::new(),
            raytracing_pipeline_states: Vec::new(),
            buffer_desc_cache: FxHashMap::default(),
            texture_desc_cache: FxHashMap::default(),
            view_desc_cache: FxHashMap::default(),
            imported_ids: FxHashMap::default(),
            buffers: Vec::new(),
            textures: Vec::new(),
            render_target_views: Vec::new(),
            depth_stencil_views: Vec::new(),
            shader_resource_views: Vec::new(),
            unordered_access_views: Vec::new(),
            imported_textures: Vec::new(),
        }
    }

    // ========================================================================
    // Pipeline Registries
    // ========================================================================

    /// Creates a root signature and registers it under a permanent handle.
    pub fn create_root_signature(
        &mut self,
        device: &dyn Device,
        desc: &RootSignatureDesc,
    ) -> Result<RgResourceHandle> {
        let object = device.create_root_signature(desc)?;
        let handle = RgResourceHandle::new(
            ResourceKind::RootSignature,
            ResourceFlags::empty(),
            self.root_signatures.len() as u32,
        );
        self.root_signatures.push(object);
        Ok(handle)
    }

    /// Creates a pipeline state and registers it under a permanent handle.
    pub fn create_pipeline_state(
        &mut self,
        device: &dyn Device,
        desc: &PipelineStateDesc,
    ) -> Result<RgResourceHandle> {
        let object = device.create_pipeline_state(desc)?;
        let handle = RgResourceHandle::new(
            ResourceKind::PipelineState,
            ResourceFlags::empty(),
            self.pipeline_states.len() as u32,
        );
        self.pipeline_states.push(object);
        Ok(handle)
    }

    /// Creates a raytracing pipeline state and registers it under a permanent
    /// handle.
    pub fn create_raytracing_pipeline_state(
        &mut self,
        device: &dyn Device,
        desc: &RaytracingPipelineStateDesc,
    ) -> Result<RgResourceHandle> {
        let object = device.create_raytracing_pipeline_state(desc)?;
        let handle = RgResourceHandle::new(
            ResourceKind::RaytracingPipelineState,
            ResourceFlags::empty(),
            self.raytracing_pipeline_states.len() as u32,
        );
        self.raytracing_pipeline_states.push(object);
        Ok(handle)
    }

    #[must_use]
    pub fn root_signature(&self, handle: RgResourceHandle) -> &RootSignature {
        assert_eq!(
            handle.kind(),
            ResourceKind::RootSignature,
            "handle does not name a root signature"
        );
        &self.root_signatures[handle.id() as usize]
    }

    #[must_use]
    pub fn pipeline_state(&self, handle: RgResourceHandle) -> &PipelineState {
        assert_eq!(
            handle.kind(),
            ResourceKind::PipelineState,
            "handle does not name a pipeline state"
        );
        &self.pipeline_states[handle.id() as usize]
    }

    #[must_use]
    pub fn raytracing_pipeline_state(&self, handle: RgResourceHandle) -> &RaytracingPipelineState {
        assert_eq!(
            handle.kind(),
            ResourceKind::RaytracingPipelineState,
            "handle does not name a raytracing pipeline state"
        );
        &self.raytracing_pipeline_states[handle.id() as usize]
    }

    // ========================================================================
    // Realized Resource Access
    // ========================================================================

    /// The physical texture behind `handle`. Imported handles resolve through
    /// the imported table; the handle version is ignored.
    #[must_use]
    pub fn texture(&self, handle: RgResourceHandle) -> &GpuTexture {
        assert_eq!(
            handle.kind(),
            ResourceKind::Texture,
            "handle does not name a texture"
        );
        if handle.is_imported() {
            self.imported_textures
                .get(handle.id() as usize)
                .expect("imported texture id out of range")
        } else {
            self.textures
                .get(handle.id() as usize)
                .and_then(Option::as_ref)
                .expect("texture not realized for this frame")
        }
    }

    /// The physical buffer behind `handle`.
    #[must_use]
    pub fn buffer(&self, handle: RgResourceHandle) -> &GpuBuffer {
        assert_eq!(
            handle.kind(),
            ResourceKind::Buffer,
            "handle does not name a buffer"
        );
        self.buffers
            .get(handle.id() as usize)
            .and_then(Option::as_ref)
            .expect("buffer not realized for this frame")
    }

    /// The physical view behind any of the four view handle kinds.
    #[must_use]
    pub fn view(&self, handle: RgResourceHandle) -> &GpuView {
        let container = match handle.kind() {
            ResourceKind::RenderTargetView => &self.render_target_views,
            ResourceKind::DepthStencilView => &self.depth_stencil_views,
            ResourceKind::ShaderResourceView => &self.shader_resource_views,
            ResourceKind::UnorderedAccessView => &self.unordered_access_views,
            kind => panic!("handle kind {kind:?} is not a view"),
        };
        container
            .get(handle.id() as usize)
            .and_then(Option::as_ref)
            .expect("view not realized for this frame")
    }

    /// Typed access over any realizable kind:
    /// `registry.get::<GpuTexture>(handle)` and friends.
    #[must_use]
    pub fn get<T: RegistryResource>(&self, handle: RgResourceHandle) -> &T {
        T::fetch(self, handle)
    }

    /// The barrier target behind a buffer or texture handle.
    pub(crate) fn resource(&self, handle: RgResourceHandle) -> &GpuResource {
        match handle.kind() {
            ResourceKind::Texture => self.texture(handle).resource(),
            ResourceKind::Buffer => self.buffer(handle).resource(),
            kind => panic!("handle kind {kind:?} has no barrier target"),
        }
    }

    // ========================================================================
    // Realization
    // ========================================================================

    /// Realizes this frame's declared resources, reusing last frame's
    /// physical objects wherever descriptors are unchanged. Called once per
    /// frame by [`RenderGraph::execute`](crate::RenderGraph::execute) before
    /// any pass runs.
    pub(crate) fn realize_resources(
        &mut self,
        frame: &GraphResources,
        device: &dyn Device,
    ) -> Result<()> {
        let mut dirty: FxHashSet<DirtyKey> = FxHashSet::default();

        // Imported textures never allocate, but a different physical object
        // under the same id (swapchain rotation, external resize) must dirty
        // the views built over it.
        self.imported_textures = frame.imported_textures.clone();
        for (id, texture) in self.imported_textures.iter().enumerate() {
            let physical = texture.resource().id();
            let previous = self.imported_ids.insert(id as u32, physical);
            if previous != Some(physical) {
                dirty.insert((ResourceKind::Texture, true, id as u32));
            }
        }

        self.realize_textures(frame, device, &mut dirty)?;
        self.realize_buffers(frame, device, &mut dirty)?;

        let slots = std::mem::take(&mut self.render_target_views);
        self.render_target_views =
            self.realize_view_table(&frame.render_target_views, slots, device, &dirty)?;
        let slots = std::mem::take(&mut self.depth_stencil_views);
        self.depth_stencil_views =
            self.realize_view_table(&frame.depth_stencil_views, slots, device, &dirty)?;
        let slots = std::mem::take(&mut self.shader_resource_views);
        self.shader_resource_views =
            self.realize_view_table(&frame.shader_resource_views, slots, device, &dirty)?;
        let slots = std::mem::take(&mut self.unordered_access_views);
        self.unordered_access_views =
            self.realize_view_table(&frame.unordered_access_views, slots, device, &dirty)?;

        Ok(())
    }

    fn realize_textures(
        &mut self,
        frame: &GraphResources,
        device: &dyn Device,
        dirty: &mut FxHashSet<DirtyKey>,
    ) -> Result<()> {
        self.textures.resize(frame.textures.len(), None);
        for (i, rg_texture) in frame.textures.iter().enumerate() {
            let handle = rg_texture.handle;
            assert!(!handle.is_imported());

            let cache_dirty = self
                .texture_desc_cache
                .get(&handle)
                .is_none_or(|previous| *previous != rg_texture.desc);
            self.texture_desc_cache
                .insert(handle, rg_texture.desc.clone());
            if !cache_dirty && self.textures[i].is_some() {
                continue;
            }
            dirty.insert(dirty_key(handle));

            let desc = &rg_texture.desc;
            let mut bind_flags = BindFlags::empty();
            if desc.allow_render_target {
                bind_flags |= BindFlags::RENDER_TARGET;
            }
            if desc.allow_depth_stencil {
                bind_flags |= BindFlags::DEPTH_STENCIL;
            }
            if desc.allow_unordered_access {
                bind_flags |= BindFlags::UNORDERED_ACCESS;
            }

            let (dimension, depth_or_array_size) = match desc.kind {
                RgTextureKind::Texture2D => (TextureDimension::Texture2D, 1),
                RgTextureKind::Texture2DArray => {
                    (TextureDimension::Texture2D, desc.depth_or_array_size)
                }
                RgTextureKind::Texture3D => {
                    (TextureDimension::Texture3D, desc.depth_or_array_size)
                }
                RgTextureKind::TextureCube => (TextureDimension::Texture2D, 6),
            };

            let physical = TextureDesc {
                name: desc.name.clone(),
                format: desc.format,
                dimension,
                width: desc.width,
                height: desc.height,
                depth_or_array_size,
                mip_levels: desc.mip_levels,
                bind_flags,
            };
            log::debug!(
                "realizing texture '{}' ({}x{}, {})",
                desc.name,
                desc.width,
                desc.height,
                desc.format.as_str()
            );
            self.textures[i] = Some(device.create_texture(&physical, desc.clear_value.as_ref())?);
        }
        Ok(())
    }

    fn realize_buffers(
        &mut self,
        frame: &GraphResources,
        device: &dyn Device,
        dirty: &mut FxHashSet<DirtyKey>,
    ) -> Result<()> {
        self.buffers.resize(frame.buffers.len(), None);
        for (i, rg_buffer) in frame.buffers.iter().enumerate() {
            let handle = rg_buffer.handle;
            let cache_dirty = self
                .buffer_desc_cache
                .get(&handle)
                .is_none_or(|previous| *previous != rg_buffer.desc);
            self.buffer_desc_cache.insert(handle, rg_buffer.desc);
            if !cache_dirty && self.buffers[i].is_some() {
                continue;
            }
            dirty.insert(dirty_key(handle));

            let mut bind_flags = BindFlags::empty();
            if rg_buffer.desc.allow_unordered_access {
                bind_flags |= BindFlags::UNORDERED_ACCESS;
            }
            log::debug!(
                "realizing buffer #{} ({} bytes)",
                handle.id(),
                rg_buffer.desc.size_in_bytes
            );
            self.buffers[i] = Some(device.create_buffer(&BufferDesc {
                size_in_bytes: rg_buffer.desc.size_in_bytes,
                bind_flags,
            })?);
        }
        Ok(())
    }

    fn realize_view_table(
        &mut self,
        frame_views: &[RgView],
        mut slots: Vec<Option<GpuView>>,
        device: &dyn Device,
        dirty: &FxHashSet<DirtyKey>,
    ) -> Result<Vec<Option<GpuView>>> {
        slots.resize(frame_views.len(), None);
        for (i, rg_view) in frame_views.iter().enumerate() {
            let cache_dirty = self
                .view_desc_cache
                .get(&rg_view.handle)
                .is_none_or(|previous| *previous != rg_view.desc);
            self.view_desc_cache.insert(rg_view.handle, rg_view.desc);

            let backing_dirty = dirty.contains(&dirty_key(rg_view.desc.resource));
            if !cache_dirty && !backing_dirty && slots[i].is_some() {
                continue;
            }
            slots[i] = Some(self.create_view_object(device, &rg_view.desc)?);
        }
        Ok(slots)
    }

    fn create_view_object(&self, device: &dyn Device, desc: &RgViewDesc) -> Result<GpuView> {
        match desc.info {
            RgViewInfo::Rtv {
                srgb,
                array_slice,
                mip_slice,
                array_size,
            } => {
                let texture = self.texture(desc.resource);
                device.create_render_target_view(texture, array_slice, mip_slice, array_size, srgb)
            }
            RgViewInfo::Dsv {
                array_slice,
                mip_slice,
                array_size,
            } => {
                let texture = self.texture(desc.resource);
                device.create_depth_stencil_view(texture, array_slice, mip_slice, array_size)
            }
            RgViewInfo::TextureSrv {
                srgb,
                most_detailed_mip,
                mip_levels,
            } => {
                let texture = self.texture(desc.resource);
                device.create_texture_srv(texture, srgb, most_detailed_mip, mip_levels)
            }
            RgViewInfo::TextureUav {
                array_slice,
                mip_slice,
            } => {
                let texture = self.texture(desc.resource);
                device.create_texture_uav(texture, array_slice, mip_slice)
            }
            RgViewInfo::BufferSrv {
                raw,
                first_element,
                num_elements,
            } => {
                let buffer = self.buffer(desc.resource);
                device.create_buffer_srv(buffer, raw, first_element, num_elements)
            }
            RgViewInfo::BufferUav {
                num_elements,
                counter_offset_in_bytes,
            } => {
                let buffer = self.buffer(desc.resource);
                device.create_buffer_uav(buffer, num_elements, counter_offset_in_bytes)
            }
        }
    }
}

impl Default for RenderGraphRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// Typed Access
// ============================================================================

mod sealed {
    pub trait Sealed {}
    impl Sealed for crate::hal::GpuTexture {}
    impl Sealed for crate::hal::GpuBuffer {}
    impl Sealed for crate::hal::GpuView {}
    impl Sealed for crate::hal::RootSignature {}
    impl Sealed for crate::hal::PipelineState {}
    impl Sealed for crate::hal::RaytracingPipelineState {}
}

/// Resource kinds retrievable through [`RenderGraphRegistry::get`]. Sealed;
/// the closed set mirrors [`ResourceKind`].
pub trait RegistryResource: sealed::Sealed {
    #[doc(hidden)]
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self;
}

impl RegistryResource for GpuTexture {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.texture(handle)
    }
}

impl RegistryResource for GpuBuffer {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.buffer(handle)
    }
}

impl RegistryResource for GpuView {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.view(handle)
    }
}

impl RegistryResource for RootSignature {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.root_signature(handle)
    }
}

impl RegistryResource for PipelineState {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.pipeline_state(handle)
    }
}

impl RegistryResource for RaytracingPipelineState {
    fn fetch(registry: &RenderGraphRegistry, handle: RgResourceHandle) -> &Self {
        registry.raytracing_pipeline_state(handle)
    }
}
