//! Physical GPU objects.
//!
//! Opaque shared owners over driver objects. Cloning is an `Arc` bump; the
//! actual GPU allocation lives (and dies) with the device layer that created
//! it. The graph registry stores these across frames and hands out references
//! for a frame's duration.

use std::sync::Arc;

use smallvec::SmallVec;

use super::types::{BufferDesc, ClearValue, Format, TextureDesc};

// ============================================================================
// Base Resource
// ============================================================================

/// The barrier target: the device-unique identity of a GPU allocation.
///
/// Both textures and buffers embed one; transition barriers operate on it
/// regardless of the resource's concrete kind.
#[derive(Clone, Debug)]
pub struct GpuResource {
    inner: Arc<ResourceInner>,
}

#[derive(Debug)]
struct ResourceInner {
    id: u64,
    name: String,
}

impl GpuResource {
    /// Called by device backends when they allocate a resource.
    #[must_use]
    pub fn new(id: u64, name: impl Into<String>) -> Self {
        Self {
            inner: Arc::new(ResourceInner {
                id,
                name: name.into(),
            }),
        }
    }

    /// Device-unique id of the allocation.
    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    /// Debug name, as visible to the API debug layer.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.name
    }
}

// ============================================================================
// Texture / Buffer
// ============================================================================

/// A physical texture.
#[derive(Clone, Debug)]
pub struct GpuTexture {
    inner: Arc<TextureInner>,
}

#[derive(Debug)]
struct TextureInner {
    resource: GpuResource,
    desc: TextureDesc,
    clear_value: Option<ClearValue>,
}

impl GpuTexture {
    #[must_use]
    pub fn new(id: u64, desc: TextureDesc, clear_value: Option<ClearValue>) -> Self {
        let resource = GpuResource::new(id, desc.name.clone());
        Self {
            inner: Arc::new(TextureInner {
                resource,
                desc,
                clear_value,
            }),
        }
    }

    #[must_use]
    pub fn resource(&self) -> &GpuResource {
        &self.inner.resource
    }

    #[must_use]
    pub fn desc(&self) -> &TextureDesc {
        &self.inner.desc
    }

    #[must_use]
    pub fn clear_value(&self) -> Option<&ClearValue> {
        self.inner.clear_value.as_ref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.inner.resource.name()
    }
}

/// A physical buffer.
#[derive(Clone, Debug)]
pub struct GpuBuffer {
    inner: Arc<BufferInner>,
}

#[derive(Debug)]
struct BufferInner {
    resource: GpuResource,
    desc: BufferDesc,
}

impl GpuBuffer {
    #[must_use]
    pub fn new(id: u64, desc: BufferDesc) -> Self {
        let resource = GpuResource::new(id, format!("buffer#{id}"));
        Self {
            inner: Arc::new(BufferInner { resource, desc }),
        }
    }

    #[must_use]
    pub fn resource(&self) -> &GpuResource {
        &self.inner.resource
    }

    #[must_use]
    pub fn desc(&self) -> &BufferDesc {
        &self.inner.desc
    }
}

// ============================================================================
// Views
// ============================================================================

/// Physical view categories, one per descriptor heap kind.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum GpuViewKind {
    RenderTarget,
    DepthStencil,
    ShaderResource,
    UnorderedAccess,
}

/// A descriptor created over a resource, addressable by heap index.
#[derive(Clone, Debug)]
pub struct GpuView {
    inner: Arc<ViewInner>,
}

#[derive(Debug)]
struct ViewInner {
    id: u64,
    kind: GpuViewKind,
    resource_id: u64,
    heap_index: u32,
}

impl GpuView {
    #[must_use]
    pub fn new(id: u64, kind: GpuViewKind, resource_id: u64, heap_index: u32) -> Self {
        Self {
            inner: Arc::new(ViewInner {
                id,
                kind,
                resource_id,
                heap_index,
            }),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.id
    }

    #[must_use]
    pub fn kind(&self) -> GpuViewKind {
        self.inner.kind
    }

    /// Id of the resource the view was created over.
    #[must_use]
    pub fn resource_id(&self) -> u64 {
        self.inner.resource_id
    }

    /// Index into the view's descriptor heap, the value shaders use for
    /// bindless access.
    #[must_use]
    pub fn heap_index(&self) -> u32 {
        self.inner.heap_index
    }
}

// ============================================================================
// Pipeline Objects
// ============================================================================

/// Root signature creation parameters.
#[derive(Clone, Debug, Default)]
pub struct RootSignatureDesc {
    pub name: String,
    pub num_parameters: u32,
    pub num_static_samplers: u32,
    pub allow_input_layout: bool,
}

/// An immutable root signature service object.
#[derive(Clone, Debug)]
pub struct RootSignature {
    inner: Arc<(u64, RootSignatureDesc)>,
}

impl RootSignature {
    #[must_use]
    pub fn new(id: u64, desc: RootSignatureDesc) -> Self {
        Self {
            inner: Arc::new((id, desc)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.0
    }

    #[must_use]
    pub fn desc(&self) -> &RootSignatureDesc {
        &self.inner.1
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.1.name
    }
}

/// Graphics or compute pipeline creation parameters.
///
/// Shader fields name compiled blobs owned by the engine's shader cache; the
/// core never touches shader source.
#[derive(Clone, Debug, Default)]
pub struct PipelineStateDesc {
    pub name: String,
    pub vertex_shader: Option<String>,
    pub pixel_shader: Option<String>,
    pub compute_shader: Option<String>,
    pub render_target_formats: SmallVec<[Format; 8]>,
    pub depth_stencil_format: Option<Format>,
}

/// An immutable pipeline state service object.
#[derive(Clone, Debug)]
pub struct PipelineState {
    inner: Arc<(u64, PipelineStateDesc)>,
}

impl PipelineState {
    #[must_use]
    pub fn new(id: u64, desc: PipelineStateDesc) -> Self {
        Self {
            inner: Arc::new((id, desc)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.0
    }

    #[must_use]
    pub fn desc(&self) -> &PipelineStateDesc {
        &self.inner.1
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.1.name
    }
}

/// Raytracing pipeline creation parameters (DXR-style state object).
#[derive(Clone, Debug, Default)]
pub struct RaytracingPipelineStateDesc {
    pub name: String,
    pub ray_generation_shader: String,
    pub miss_shaders: Vec<String>,
    pub hit_groups: Vec<String>,
    pub max_recursion_depth: u32,
}

/// An immutable raytracing pipeline service object.
#[derive(Clone, Debug)]
pub struct RaytracingPipelineState {
    inner: Arc<(u64, RaytracingPipelineStateDesc)>,
}

impl RaytracingPipelineState {
    #[must_use]
    pub fn new(id: u64, desc: RaytracingPipelineStateDesc) -> Self {
        Self {
            inner: Arc::new((id, desc)),
        }
    }

    #[must_use]
    pub fn id(&self) -> u64 {
        self.inner.0
    }

    #[must_use]
    pub fn desc(&self) -> &RaytracingPipelineStateDesc {
        &self.inner.1
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.inner.1.name
    }
}
