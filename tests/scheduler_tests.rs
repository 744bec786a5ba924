//! Scheduler Integration Tests
//!
//! Tests for:
//! - Topological ordering and dependency levels for chains and diamonds
//! - Handle versioning and the most-recent-writer tie-break
//! - Determinism of repeated builds
//! - Cycle detection

mod common;

use common::{color_target, edge_names, execution_order, level_names};
use ember_rdg::hal::NullDevice;
use ember_rdg::{FrameAllocator, RenderGraph, RenderGraphRegistry};

// ============================================================================
// Ordering Scenarios
// ============================================================================

#[test]
fn linear_chain_orders_and_levels() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t1 = graph.create_texture(color_target("T1"));
    let mut t2 = graph.create_texture(color_target("T2"));

    graph.add_pass("A").write(&mut t1);
    graph.add_pass("B").read(t1).write(&mut t2);
    graph.add_pass("C").read(t2);
    graph.execute(&device, &mut context).unwrap();

    assert_eq!(
        execution_order(&graph),
        ["Prologue", "A", "B", "C", "Epilogue"]
    );
    assert_eq!(
        level_names(&graph),
        [
            vec!["Prologue"],
            vec!["A"],
            vec!["B"],
            vec!["C"],
            vec!["Epilogue"]
        ]
    );
}

#[test]
fn diamond_groups_parallel_passes_into_one_level() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(color_target("T"));
    let mut u = graph.create_texture(color_target("U"));
    let mut v = graph.create_texture(color_target("V"));

    graph.add_pass("A").write(&mut t);
    graph.add_pass("B").read(t).write(&mut u);
    graph.add_pass("C").read(t).write(&mut v);
    graph.add_pass("D").read(u).read(v);
    graph.execute(&device, &mut context).unwrap();

    assert_eq!(
        level_names(&graph),
        [
            vec!["Prologue"],
            vec!["A"],
            vec!["B", "C"],
            vec!["D"],
            vec!["Epilogue"]
        ]
    );
}

#[test]
fn independent_passes_keep_declaration_order() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    graph.add_pass("A");
    graph.add_pass("B");
    graph.add_pass("C");
    graph.execute(&device, &mut context).unwrap();

    assert_eq!(
        execution_order(&graph),
        ["Prologue", "A", "B", "C", "Epilogue"]
    );
    assert_eq!(
        level_names(&graph),
        [
            vec!["Prologue"],
            vec!["A", "B", "C"],
            vec!["Epilogue"]
        ]
    );
}

// ============================================================================
// Versioning & Tie-break
// ============================================================================

#[test]
fn write_bumps_handle_version() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(color_target("T"));
    assert_eq!(t.version(), 0);

    graph.add_pass("A").write(&mut t);
    graph.add_pass("B").write(&mut t);
    graph.add_pass("C").write(&mut t);
    assert_eq!(t.version(), 3);

    graph.execute(&device, &mut context).unwrap();
}

#[test]
fn rewrite_tie_break_picks_most_recent_writer() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(color_target("T"));

    graph.add_pass("A").write(&mut t); // version 1
    graph.add_pass("B").write(&mut t); // version 2
    graph.add_pass("C").read(t); // sees version 2
    graph.execute(&device, &mut context).unwrap();

    let edges = edge_names(&graph);
    let has = |from: &str, to: &str| {
        edges
            .iter()
            .any(|(a, b)| a == from && b == to)
    };
    assert!(has("A", "B"), "write-after-write must order the rewrites");
    assert!(has("B", "C"), "the reader depends on the latest writer");
    assert!(!has("A", "C"), "the stale writer must not feed the reader");
}

#[test]
fn topological_index_respects_every_edge() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut t = graph.create_texture(color_target("T"));
    let mut u = graph.create_texture(color_target("U"));
    let mut v = graph.create_texture(color_target("V"));

    graph.add_pass("A").write(&mut t);
    graph.add_pass("B").read(t).write(&mut u);
    graph.add_pass("C").read(t).write(&mut v);
    graph.add_pass("D").read(u).read(v);
    graph.execute(&device, &mut context).unwrap();

    let schedule = graph.schedule().unwrap();
    for (from, to) in schedule.edges() {
        assert!(
            graph.pass(from).topological_index() < graph.pass(to).topological_index(),
            "edge {} -> {} violates the topological order",
            graph.pass(from).name(),
            graph.pass(to).name()
        );
    }
}

// ============================================================================
// Determinism
// ============================================================================

#[test]
fn identical_graphs_schedule_identically() {
    let device = NullDevice::new();
    let mut registry = RenderGraphRegistry::new();

    let build_and_run = |allocator: &mut FrameAllocator,
                         registry: &mut RenderGraphRegistry|
     -> (Vec<String>, Vec<Vec<String>>) {
        let device_ref = &device;
        let mut context = device_ref.graphics_context();
        let mut graph = RenderGraph::new(allocator, registry);
        let mut t = graph.create_texture(color_target("T"));
        let mut u = graph.create_texture(color_target("U"));
        let mut v = graph.create_texture(color_target("V"));
        graph.add_pass("A").write(&mut t);
        graph.add_pass("B").read(t).write(&mut u);
        graph.add_pass("C").read(t).write(&mut v);
        graph.add_pass("D").read(u).read(v);
        graph.execute(device_ref, &mut context).unwrap();
        (execution_order(&graph), level_names(&graph))
    };

    let mut allocator = FrameAllocator::new();
    let first = build_and_run(&mut allocator, &mut registry);
    let second = build_and_run(&mut allocator, &mut registry);
    assert_eq!(first, second);
}

// ============================================================================
// Failure Modes
// ============================================================================

#[test]
#[should_panic(expected = "cycle")]
fn dependency_cycle_is_fatal() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let mut x = graph.create_texture(color_target("X"));
    let mut z = graph.create_texture(color_target("Z"));

    graph.add_pass("A"); // index 1
    graph.add_pass("B"); // index 2
    graph.pass_mut(1).write(&mut x);
    graph.pass_mut(2).read(x);
    graph.pass_mut(2).write(&mut z);
    graph.pass_mut(1).read(z); // A <-> B

    let _ = graph.execute(&device, &mut context);
}

#[test]
#[should_panic(expected = "can only read")]
fn reading_a_view_handle_is_a_logic_error() {
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    let t = graph.create_texture(color_target("T"));
    let srv = graph.create_view(ember_rdg::RgViewDesc::texture_srv(t, false, None, None));
    graph.add_pass("A").read(srv);
}

#[test]
#[should_panic(expected = "called twice")]
fn double_execute_is_a_logic_error() {
    let device = NullDevice::new();
    let mut allocator = FrameAllocator::new();
    let mut registry = RenderGraphRegistry::new();
    let mut context = device.graphics_context();

    let mut graph = RenderGraph::new(&mut allocator, &mut registry);
    graph.execute(&device, &mut context).unwrap();
    let _ = graph.execute(&device, &mut context);
}
