//! Registry Integration Tests
//!
//! Tests for:
//! - Realization caching: unchanged descriptors create nothing
//! - Resize churn: a changed texture descriptor rebuilds the texture and
//!   every view over it
//! - Imported resources: no allocation, rotation rebuilds dependent views
//! - Pipeline registries and typed access

mod common;

use common::{color_target, init_logger, uav_target, BlockingHooks};
use ember_rdg::hal::{
    Format, GpuTexture, GpuViewKind, NullDevice, NullSwapchain, RootSignatureDesc, Swapchain,
};
use ember_rdg::{
    FrameAllocator, RenderGraph, RenderGraphRegistry, ResourceKind, RgBufferDesc, RgTextureDesc,
    RgViewDesc,
};

// ============================================================================
// Realization Caching
// ============================================================================

#[test]
fn unchanged_descriptors_create_nothing() {
    init_logger();
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();

    for frame in 0..3 {
        let mut context = device.graphics_context();
        let mut graph = RenderGraph::new(&mut allocator, &mut registry);
        let mut t = graph.create_texture(color_target("Scene Color"));
        let _srv = graph.create_view(RgViewDesc::texture_srv(t, false, None, None));
        graph.add_pass("Draw").write(&mut t);
        graph.execute(&device, &mut context).unwrap();

        assert_eq!(
            device.textures_created(),
            1,
            "frame {frame}: identical descriptors must reuse the physical texture"
        );
        assert_eq!(device.views_created(), 1);
    }
}

#[test]
fn resize_rebuilds_texture_and_all_views_over_it() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();

    let mut run_frame = |width: u32, height: u32| {
        let mut context = device.graphics_context();
        let mut graph = RenderGraph::new(&mut allocator, &mut registry);
        let mut t = graph.create_texture(
            RgTextureDesc::texture_2d("Scene Color", Format::Rgba16Float, width, height, 1)
                .allow_render_target(),
        );
        // Two views with frame-invariant descriptors.
        let _srv = graph.create_view(RgViewDesc::texture_srv(t, false, None, None));
        let _rtv = graph.create_view(RgViewDesc::rtv(t, false, None, None, None));
        graph.add_pass("Draw").write(&mut t);
        graph.execute(&device, &mut context).unwrap();
    };

    run_frame(1920, 1080);
    assert_eq!(device.textures_created(), 1);
    assert_eq!(device.views_created(), 2);

    run_frame(1280, 720);
    assert_eq!(device.textures_created(), 2, "resize must recreate the texture");
    assert_eq!(
        device.views_created(),
        4,
        "every view over a recreated texture must be rebuilt"
    );

    run_frame(1280, 720);
    assert_eq!(device.textures_created(), 2);
    assert_eq!(device.views_created(), 4);
}

#[test]
fn noop_frame_realizes_nothing() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    graph.execute(&device, &mut context).unwrap();

    assert_eq!(device.textures_created(), 0);
    assert_eq!(device.buffers_created(), 0);
    assert_eq!(device.views_created(), 0);
}

#[test]
fn buffers_realize_and_cache_like_textures() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();

    let mut run_frame = |size: u64| {
        let mut context = device.graphics_context();
        let mut graph = RenderGraph::new(&mut allocator, &mut registry);
        let mut b = graph.create_buffer(RgBufferDesc::new(size).with_unordered_access());
        let _uav = graph.create_view(RgViewDesc::buffer_uav(b, 1024, 0));
        graph.add_pass("Scatter").write(&mut b);
        graph.execute(&device, &mut context).unwrap();
    };

    run_frame(64 * 1024);
    run_frame(64 * 1024);
    assert_eq!(device.buffers_created(), 1);
    assert_eq!(device.views_created(), 1);

    run_frame(128 * 1024);
    assert_eq!(device.buffers_created(), 2, "size change must recreate");
    assert_eq!(device.views_created(), 2, "buffer views follow their buffer");
}

// ============================================================================
// Imported Resources
// ============================================================================

#[test]
fn imported_textures_never_allocate() {
    let device = NullDevice::new();
    let swapchain = NullSwapchain::new(&device, 1280, 720, 2).unwrap();
    let baseline = device.textures_created();

    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let (back_buffer, _rtv) = swapchain.current_back_buffer();
    let expected_id = back_buffer.resource().id();
    let mut target = graph.import_texture(back_buffer);
    graph.add_pass("Composite").write(&mut target);
    graph.epilogue().read(target);
    graph.execute(&device, &mut context).unwrap();

    assert_eq!(
        device.textures_created(),
        baseline,
        "realization must not allocate for imported textures"
    );
    assert_eq!(
        graph.registry().texture(target).resource().id(),
        expected_id,
        "the imported handle must resolve to the external physical object"
    );
}

#[test]
fn swapchain_rotation_rebuilds_views_over_the_import() {
    let device = NullDevice::new();
    let mut swapchain = NullSwapchain::new(&device, 1280, 720, 2).unwrap();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let baseline_views = device.views_created();

    let run_frame = |swapchain: &mut NullSwapchain,
                         allocator: &mut FrameAllocator,
                         registry: &mut RenderGraphRegistry| {
        let mut context = device.graphics_context();
        let mut graph = RenderGraph::new(allocator, registry);
        let (back_buffer, _) = swapchain.current_back_buffer();
        let mut target = graph.import_texture(back_buffer);
        let _rtv = graph.create_view(RgViewDesc::rtv(target, true, None, None, None));
        graph.add_pass("Composite").write(&mut target);
        graph.execute(&device, &mut context).unwrap();
        swapchain.present(true, &mut BlockingHooks).unwrap();
    };

    run_frame(&mut swapchain, &mut allocator, &mut registry);
    assert_eq!(device.views_created(), baseline_views + 1);

    // The back buffer rotated: same import id, different physical object.
    run_frame(&mut swapchain, &mut allocator, &mut registry);
    assert_eq!(
        device.views_created(),
        baseline_views + 2,
        "a rotated back buffer must rebuild the views over it"
    );
}

// ============================================================================
// Pipeline Registries & Typed Access
// ============================================================================

#[test]
fn pipeline_registries_hand_out_permanent_handles() {
    let device = NullDevice::new();
    let mut registry = RenderGraphRegistry::new();

    let rs = registry
        .create_root_signature(
            &device,
            &RootSignatureDesc {
                name: "Global".to_owned(),
                num_parameters: 4,
                ..Default::default()
            },
        )
        .unwrap();
    assert_eq!(rs.kind(), ResourceKind::RootSignature);
    assert_eq!(rs.id(), 0);
    assert_eq!(registry.root_signature(rs).name(), "Global");

    // Handles stay valid across frames.
    let mut allocator = FrameAllocator::new();
    let mut context = device.graphics_context();
    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    graph.execute(&device, &mut context).unwrap();
    assert_eq!(graph.registry().root_signature(rs).name(), "Global");
}

#[test]
fn realized_texture_carries_the_descriptor_name() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(uav_target("Path Trace Output"));
    graph.add_pass("Trace").write(&mut t);
    graph.execute(&device, &mut context).unwrap();

    // Storage ignores the handle version; `t` is at version 1 here.
    assert_eq!(t.version(), 1);
    assert_eq!(
        graph.registry().get::<GpuTexture>(t).name(),
        "Path Trace Output"
    );
    let view = graph.registry();
    assert_eq!(view.texture(t).desc().width, 1920);
}

#[test]
fn views_carry_descriptor_heap_indices() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(
        RgTextureDesc::texture_2d("History", Format::Rgba16Float, 1920, 1080, 4)
            .allow_unordered_access(),
    );
    let srv = graph.create_view(RgViewDesc::texture_srv(t, false, None, None));
    let uav = graph.create_view(RgViewDesc::texture_uav(t, None, None));
    let mip_uav = graph.create_view(RgViewDesc::texture_uav(t, None, Some(1)));
    graph.add_pass("Accumulate").write(&mut t);
    graph.execute(&device, &mut context).unwrap();

    let registry = graph.registry();
    assert_eq!(registry.view(srv).kind(), GpuViewKind::ShaderResource);
    assert_eq!(registry.view(uav).kind(), GpuViewKind::UnorderedAccess);
    // Bindless access: each view in a heap gets its own slot.
    assert_ne!(
        registry.view(uav).heap_index(),
        registry.view(mip_uav).heap_index()
    );
    assert_eq!(
        registry.view(srv).resource_id(),
        registry.texture(t).resource().id()
    );
}

#[test]
#[should_panic(expected = "does not name a texture")]
fn texture_access_with_a_buffer_handle_is_a_logic_error() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let buffer = {
        let mut graph = RenderGraph::new(&mut allocator, &mut registry);
        let b = graph.create_buffer(RgBufferDesc::new(256));
        graph.execute(&device, &mut context).unwrap();
        b
    };
    let _ = registry.texture(buffer);
}
