//! Shared helpers for the integration suites.

#![allow(dead_code)]

use ember_rdg::hal::{Format, PresentHooks, SyncHandle};
use ember_rdg::{RenderGraph, RgTextureDesc};

/// Present hooks that wait inline, for single-threaded frame loops.
pub struct BlockingHooks;

impl PresentHooks for BlockingHooks {
    fn pre_present(&mut self) -> SyncHandle {
        SyncHandle::default()
    }

    fn post_present(&mut self, handle: SyncHandle) {
        handle.wait();
    }
}

/// Opt-in logging for debugging test runs (`RUST_LOG=trace cargo test`).
pub fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// A plain sampled color target at render resolution.
pub fn color_target(name: &str) -> RgTextureDesc {
    RgTextureDesc::texture_2d(name, Format::Rgba16Float, 1920, 1080, 1).allow_render_target()
}

/// A compute-writable target at render resolution.
pub fn uav_target(name: &str) -> RgTextureDesc {
    RgTextureDesc::texture_2d(name, Format::Rgba16Float, 1920, 1080, 1).allow_unordered_access()
}

/// Pass names in execution order, resolved through the compiled schedule.
pub fn execution_order(graph: &RenderGraph<'_>) -> Vec<String> {
    graph
        .schedule()
        .expect("graph must have executed")
        .execution_order()
        .iter()
        .map(|&index| graph.pass(index).name().to_owned())
        .collect()
}

/// Pass names per dependency level, in level order.
pub fn level_names(graph: &RenderGraph<'_>) -> Vec<Vec<String>> {
    graph
        .schedule()
        .expect("graph must have executed")
        .levels()
        .iter()
        .map(|level| {
            level
                .pass_indices()
                .iter()
                .map(|&index| graph.pass(index).name().to_owned())
                .collect()
        })
        .collect()
}

/// All DAG edges as pass-name pairs.
pub fn edge_names(graph: &RenderGraph<'_>) -> Vec<(String, String)> {
    graph
        .schedule()
        .expect("graph must have executed")
        .edges()
        .map(|(from, to)| {
            (
                graph.pass(from).name().to_owned(),
                graph.pass(to).name().to_owned(),
            )
        })
        .collect()
}
