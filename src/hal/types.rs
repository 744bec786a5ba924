//! Device-facing value types: formats, resource states, clear values, and the
//! physical descriptors the registry hands to [`Device`](super::Device)
//! creation calls.

/// Pixel and depth formats the core understands.
///
/// A closed subset of what the target API offers; extend as renderers need
/// more.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug, Default)]
pub enum Format {
    #[default]
    Unknown,
    R8Unorm,
    Rg8Unorm,
    Rgba8Unorm,
    Rgba8UnormSrgb,
    Bgra8Unorm,
    R16Float,
    Rg16Float,
    Rgba16Float,
    R32Float,
    Rg32Float,
    Rgba32Float,
    R32Uint,
    R11G11B10Float,
    D32Float,
    D24UnormS8Uint,
}

impl Format {
    /// Stable name for logs and error messages.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unknown => "Unknown",
            Self::R8Unorm => "R8Unorm",
            Self::Rg8Unorm => "Rg8Unorm",
            Self::Rgba8Unorm => "Rgba8Unorm",
            Self::Rgba8UnormSrgb => "Rgba8UnormSrgb",
            Self::Bgra8Unorm => "Bgra8Unorm",
            Self::R16Float => "R16Float",
            Self::Rg16Float => "Rg16Float",
            Self::Rgba16Float => "Rgba16Float",
            Self::R32Float => "R32Float",
            Self::Rg32Float => "Rg32Float",
            Self::Rgba32Float => "Rgba32Float",
            Self::R32Uint => "R32Uint",
            Self::R11G11B10Float => "R11G11B10Float",
            Self::D32Float => "D32Float",
            Self::D24UnormS8Uint => "D24UnormS8Uint",
        }
    }

    /// Whether this is a depth or depth-stencil format.
    #[must_use]
    pub fn is_depth(self) -> bool {
        matches!(self, Self::D32Float | Self::D24UnormS8Uint)
    }
}

/// Clear color or depth-stencil value baked into a texture at creation.
#[derive(Clone, Copy, PartialEq, Debug)]
pub enum ClearValue {
    Color([f32; 4]),
    DepthStencil { depth: f32, stencil: u8 },
}

impl ClearValue {
    pub const BLACK: Self = Self::Color([0.0, 0.0, 0.0, 0.0]);
    pub const DEPTH_ONE: Self = Self::DepthStencil {
        depth: 1.0,
        stencil: 0,
    };
}

bitflags::bitflags! {
    /// Resource states used by transition barriers.
    ///
    /// Bit values follow `D3D12_RESOURCE_STATES`; `COMMON` is the zero state.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct ResourceStates: u32 {
        const VERTEX_AND_CONSTANT_BUFFER = 0x1;
        const INDEX_BUFFER = 0x2;
        const RENDER_TARGET = 0x4;
        const UNORDERED_ACCESS = 0x8;
        const DEPTH_WRITE = 0x10;
        const DEPTH_READ = 0x20;
        const NON_PIXEL_SHADER_RESOURCE = 0x40;
        const PIXEL_SHADER_RESOURCE = 0x80;
        const INDIRECT_ARGUMENT = 0x200;
        const COPY_DEST = 0x400;
        const COPY_SOURCE = 0x800;
        const RAYTRACING_ACCELERATION_STRUCTURE = 0x40_0000;
    }
}

impl ResourceStates {
    /// The common (decayed) state, also used for presentation.
    pub const COMMON: Self = Self::empty();
    pub const PRESENT: Self = Self::empty();
}

bitflags::bitflags! {
    /// Usage bits a physical resource is created with.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
    pub struct BindFlags: u8 {
        const RENDER_TARGET = 1 << 0;
        const DEPTH_STENCIL = 1 << 1;
        const UNORDERED_ACCESS = 1 << 2;
    }
}

/// Physical texture dimensionality.
///
/// 2D arrays and cube maps are 2D textures with an array size; the registry
/// does that translation before reaching the device.
#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum TextureDimension {
    #[default]
    Texture2D,
    Texture3D,
}

/// Physical texture descriptor handed to [`Device::create_texture`](super::Device::create_texture).
#[derive(Clone, PartialEq, Debug)]
pub struct TextureDesc {
    /// Debug name, applied to the GPU object.
    pub name: String,
    pub format: Format,
    pub dimension: TextureDimension,
    pub width: u32,
    pub height: u32,
    pub depth_or_array_size: u32,
    pub mip_levels: u16,
    pub bind_flags: BindFlags,
}

/// Physical buffer descriptor handed to [`Device::create_buffer`](super::Device::create_buffer).
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct BufferDesc {
    pub size_in_bytes: u64,
    pub bind_flags: BindFlags,
}
