//! Virtual Resource Model
//!
//! Handles and structural descriptors for everything the graph schedules.
//! A [`RgResourceHandle`] is a stable, copyable 64-bit value naming a logical
//! resource at a version; the physical realization behind it is done by the
//! [`RenderGraphRegistry`](crate::RenderGraphRegistry). Descriptors are
//! immutable once given to the graph and are compared structurally to decide
//! whether a realized resource from the previous frame can be reused.

use smallvec::SmallVec;

use crate::hal::{ClearValue, Format};

// ============================================================================
// Handles
// ============================================================================

/// The closed set of resource kinds a handle can name.
///
/// Views and pipeline objects are handles like any other; the registry keeps
/// one dense container per kind, indexed by the handle id.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[repr(u8)]
pub enum ResourceKind {
    #[default]
    Unknown,
    Buffer,
    Texture,
    RenderTargetView,
    DepthStencilView,
    ShaderResourceView,
    UnorderedAccessView,
    RootSignature,
    PipelineState,
    RaytracingPipelineState,
}

bitflags::bitflags! {
    /// Per-handle flags.
    #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
    pub struct ResourceFlags: u8 {
        /// The physical resource is owned outside the graph (e.g. a swapchain
        /// back buffer); the registry never allocates or frees it.
        const IMPORTED = 1 << 0;
    }
}

/// A virtual resource handle.
///
/// Value type, 64 bits total. Two equal handles refer to the same logical
/// resource at the same version. The `version` is bumped by every
/// [`RenderPass::write`](crate::RenderPass::write) and exists purely to
/// disambiguate read-before-write from read-after-write during scheduling;
/// the registry ignores it and consults only `kind` and `id`.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RgResourceHandle {
    kind: ResourceKind,
    flags: ResourceFlags,
    version: u16,
    id: u32,
}

const _: () = assert!(std::mem::size_of::<RgResourceHandle>() == 8);

impl RgResourceHandle {
    /// The invalid sentinel: `Unknown` kind, `u32::MAX` id.
    pub const INVALID: Self = Self {
        kind: ResourceKind::Unknown,
        flags: ResourceFlags::empty(),
        version: 0,
        id: u32::MAX,
    };

    pub(crate) fn new(kind: ResourceKind, flags: ResourceFlags, id: u32) -> Self {
        Self {
            kind,
            flags,
            version: 0,
            id,
        }
    }

    #[must_use]
    pub fn kind(self) -> ResourceKind {
        self.kind
    }

    #[must_use]
    pub fn id(self) -> u32 {
        self.id
    }

    #[must_use]
    pub fn version(self) -> u16 {
        self.version
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.kind != ResourceKind::Unknown && self.id != u32::MAX
    }

    #[must_use]
    pub fn is_imported(self) -> bool {
        self.flags.contains(ResourceFlags::IMPORTED)
    }

    /// The same logical resource one write later.
    #[must_use]
    pub(crate) fn next_version(self) -> Self {
        Self {
            version: self.version + 1,
            ..self
        }
    }

    pub(crate) fn bump_version(&mut self) {
        self.version += 1;
    }

    /// Resets the handle to [`Self::INVALID`].
    pub fn invalidate(&mut self) {
        *self = Self::INVALID;
    }
}

impl Default for RgResourceHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

// ============================================================================
// Buffer / Texture Descriptors
// ============================================================================

/// Structural description of a graph-owned buffer.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub struct RgBufferDesc {
    pub size_in_bytes: u64,
    pub allow_unordered_access: bool,
}

impl RgBufferDesc {
    #[must_use]
    pub fn new(size_in_bytes: u64) -> Self {
        Self {
            size_in_bytes,
            allow_unordered_access: false,
        }
    }

    #[must_use]
    pub fn with_unordered_access(mut self) -> Self {
        self.allow_unordered_access = true;
        self
    }
}

/// Texture dimensionality.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum RgTextureKind {
    #[default]
    Texture2D,
    Texture2DArray,
    Texture3D,
    TextureCube,
}

/// Structural description of a graph-owned texture.
///
/// Compared field-by-field across frames; any difference (a resize, a format
/// change, a new allow-bit) frees the previous physical texture and realizes
/// a new one.
#[derive(Clone, PartialEq, Debug)]
pub struct RgTextureDesc {
    /// Debug name, also applied to the realized GPU resource.
    pub name: String,
    pub format: Format,
    pub kind: RgTextureKind,
    pub width: u32,
    pub height: u32,
    pub depth_or_array_size: u32,
    pub mip_levels: u16,
    pub clear_value: Option<ClearValue>,
    pub allow_render_target: bool,
    pub allow_depth_stencil: bool,
    pub allow_unordered_access: bool,
}

impl Default for RgTextureDesc {
    fn default() -> Self {
        Self {
            name: String::new(),
            format: Format::Unknown,
            kind: RgTextureKind::Texture2D,
            width: 1,
            height: 1,
            depth_or_array_size: 1,
            mip_levels: 1,
            clear_value: None,
            allow_render_target: false,
            allow_depth_stencil: false,
            allow_unordered_access: false,
        }
    }
}

impl RgTextureDesc {
    /// Shorthand for a 2D texture description.
    #[must_use]
    pub fn texture_2d(
        name: impl Into<String>,
        format: Format,
        width: u32,
        height: u32,
        mip_levels: u16,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            kind: RgTextureKind::Texture2D,
            width,
            height,
            mip_levels,
            ..Self::default()
        }
    }

    /// Shorthand for a 2D array texture description.
    #[must_use]
    pub fn texture_2d_array(
        name: impl Into<String>,
        format: Format,
        width: u32,
        height: u32,
        array_size: u32,
        mip_levels: u16,
    ) -> Self {
        Self {
            name: name.into(),
            format,
            kind: RgTextureKind::Texture2DArray,
            width,
            height,
            depth_or_array_size: array_size,
            mip_levels,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn with_clear_value(mut self, clear_value: ClearValue) -> Self {
        self.clear_value = Some(clear_value);
        self
    }

    #[must_use]
    pub fn allow_render_target(mut self) -> Self {
        self.allow_render_target = true;
        self
    }

    #[must_use]
    pub fn allow_depth_stencil(mut self) -> Self {
        self.allow_depth_stencil = true;
        self
    }

    #[must_use]
    pub fn allow_unordered_access(mut self) -> Self {
        self.allow_unordered_access = true;
        self
    }
}

// ============================================================================
// View Descriptors
// ============================================================================

/// View categories a [`RgViewDesc`] can describe.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RgViewKind {
    Rtv,
    Dsv,
    BufferSrv,
    BufferUav,
    TextureSrv,
    TextureUav,
}

/// Variant payload of a view descriptor.
///
/// `None` in a subresource field means "use the API default" (full mip chain,
/// slice zero, and so on); the registry maps it when constructing the view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum RgViewInfo {
    Rtv {
        srgb: bool,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
    },
    Dsv {
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
    },
    BufferSrv {
        raw: bool,
        first_element: u32,
        num_elements: u32,
    },
    BufferUav {
        num_elements: u32,
        counter_offset_in_bytes: u64,
    },
    TextureSrv {
        srgb: bool,
        most_detailed_mip: Option<u32>,
        mip_levels: Option<u32>,
    },
    TextureUav {
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
    },
}

/// Structural description of a view over a graph resource.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct RgViewDesc {
    /// The buffer or texture handle the view is created over.
    pub resource: RgResourceHandle,
    pub info: RgViewInfo,
}

impl RgViewDesc {
    #[must_use]
    pub fn rtv(
        resource: RgResourceHandle,
        srgb: bool,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::Rtv {
                srgb,
                array_slice,
                mip_slice,
                array_size,
            },
        }
    }

    #[must_use]
    pub fn dsv(
        resource: RgResourceHandle,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
        array_size: Option<u32>,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::Dsv {
                array_slice,
                mip_slice,
                array_size,
            },
        }
    }

    #[must_use]
    pub fn buffer_srv(
        resource: RgResourceHandle,
        raw: bool,
        first_element: u32,
        num_elements: u32,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::BufferSrv {
                raw,
                first_element,
                num_elements,
            },
        }
    }

    #[must_use]
    pub fn buffer_uav(
        resource: RgResourceHandle,
        num_elements: u32,
        counter_offset_in_bytes: u64,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::BufferUav {
                num_elements,
                counter_offset_in_bytes,
            },
        }
    }

    #[must_use]
    pub fn texture_srv(
        resource: RgResourceHandle,
        srgb: bool,
        most_detailed_mip: Option<u32>,
        mip_levels: Option<u32>,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::TextureSrv {
                srgb,
                most_detailed_mip,
                mip_levels,
            },
        }
    }

    #[must_use]
    pub fn texture_uav(
        resource: RgResourceHandle,
        array_slice: Option<u32>,
        mip_slice: Option<u32>,
    ) -> Self {
        Self {
            resource,
            info: RgViewInfo::TextureUav {
                array_slice,
                mip_slice,
            },
        }
    }

    #[must_use]
    pub fn kind(&self) -> RgViewKind {
        match self.info {
            RgViewInfo::Rtv { .. } => RgViewKind::Rtv,
            RgViewInfo::Dsv { .. } => RgViewKind::Dsv,
            RgViewInfo::BufferSrv { .. } => RgViewKind::BufferSrv,
            RgViewInfo::BufferUav { .. } => RgViewKind::BufferUav,
            RgViewInfo::TextureSrv { .. } => RgViewKind::TextureSrv,
            RgViewInfo::TextureUav { .. } => RgViewKind::TextureUav,
        }
    }

    /// The handle kind produced when this view is registered with a graph.
    #[must_use]
    pub fn handle_kind(&self) -> ResourceKind {
        match self.kind() {
            RgViewKind::Rtv => ResourceKind::RenderTargetView,
            RgViewKind::Dsv => ResourceKind::DepthStencilView,
            RgViewKind::BufferSrv | RgViewKind::TextureSrv => ResourceKind::ShaderResourceView,
            RgViewKind::BufferUav | RgViewKind::TextureUav => ResourceKind::UnorderedAccessView,
        }
    }
}

// ============================================================================
// Render Target Bundles
// ============================================================================

/// The attachment set a pass renders into.
///
/// Holds render-target-view and depth-stencil-view *handles*; sRGB
/// interpretation and subresource selection live in the view descriptors, so
/// there is a single source of truth for how an attachment is bound.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct RenderTargetDesc {
    pub render_targets: SmallVec<[RgResourceHandle; 8]>,
    pub depth_stencil: Option<RgResourceHandle>,
}

impl RenderTargetDesc {
    /// Maximum number of simultaneous color attachments.
    pub const MAX_RENDER_TARGETS: usize = 8;

    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a color attachment.
    ///
    /// # Panics
    ///
    /// Panics if `rtv` is not a render-target-view handle or more than
    /// [`Self::MAX_RENDER_TARGETS`] attachments are added.
    pub fn add_render_target(&mut self, rtv: RgResourceHandle) -> &mut Self {
        assert_eq!(rtv.kind(), ResourceKind::RenderTargetView);
        assert!(self.render_targets.len() < Self::MAX_RENDER_TARGETS);
        self.render_targets.push(rtv);
        self
    }

    /// Sets the depth-stencil attachment.
    ///
    /// # Panics
    ///
    /// Panics if `dsv` is not a depth-stencil-view handle.
    pub fn set_depth_stencil(&mut self, dsv: RgResourceHandle) -> &mut Self {
        assert_eq!(dsv.kind(), ResourceKind::DepthStencilView);
        self.depth_stencil = Some(dsv);
        self
    }
}

// ============================================================================
// Graph-side Resource Records
// ============================================================================

/// A buffer declaration recorded by the graph.
#[derive(Clone, Debug)]
pub(crate) struct RgBuffer {
    pub handle: RgResourceHandle,
    pub desc: RgBufferDesc,
}

/// A texture declaration recorded by the graph.
#[derive(Clone, Debug)]
pub(crate) struct RgTexture {
    pub handle: RgResourceHandle,
    pub desc: RgTextureDesc,
}

/// A view declaration recorded by the graph.
#[derive(Clone, Debug)]
pub(crate) struct RgView {
    pub handle: RgResourceHandle,
    pub desc: RgViewDesc,
}
