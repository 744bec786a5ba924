//! Level Executor
//!
//! Replays one dependency level: computes the required resource state for
//! every handle the level touches, emits the transitions as a single barrier
//! batch, then invokes each member pass's recorder closure in topological
//! order, wrapped in a named debug event.
//!
//! A pass may assume that on entry every resource in its reads is in the
//! combined read state and every resource in its writes is in the combined
//! write state. Passes within one level see each other's writes only through
//! an explicit UAV barrier the pass itself records.

use crate::hal::{CommandContext, ResourceStates};
use crate::resource::ResourceKind;

use super::graph::GraphResources;
use super::pass::PassBox;
use super::registry::RenderGraphRegistry;
use super::scheduler::DependencyLevel;

pub(crate) fn execute_level(
    level: &DependencyLevel,
    passes: &mut [PassBox<'_>],
    resources: &GraphResources,
    registry: &RenderGraphRegistry,
    context: &mut dyn CommandContext,
) {
    for &read in &level.reads {
        assert!(
            !level.writes.contains(&read),
            "resource '{}' is both read and written at version {} within one dependency level",
            resources.resource_name(read),
            read.version()
        );

        // Reads land in the pixel-shader state; anything that allows UAV is
        // assumed to also be sampled from compute, so the non-pixel state is
        // OR-ed in. This can over-transition pure pixel-shader reads.
        let mut states = ResourceStates::PIXEL_SHADER_RESOURCE;
        if resources.allow_unordered_access(read) {
            states |= ResourceStates::NON_PIXEL_SHADER_RESOURCE;
        }
        context.transition_barrier(registry.resource(read), states);
    }

    for &write in &level.writes {
        let mut states = ResourceStates::COMMON;
        if write.kind() == ResourceKind::Texture {
            if resources.allow_render_target(write) {
                states |= ResourceStates::RENDER_TARGET;
            }
            if resources.allow_depth_stencil(write) {
                states |= ResourceStates::DEPTH_WRITE;
            }
        }
        if resources.allow_unordered_access(write) {
            states |= ResourceStates::UNORDERED_ACCESS;
        }
        context.transition_barrier(registry.resource(write), states);
    }

    context.flush_resource_barriers();

    for &index in &level.passes {
        let pass = &mut passes[index];
        if let Some(callback) = pass.callback.take() {
            log::trace!("executing pass '{}'", pass.name);
            context.begin_event(pass.name);
            callback(registry, &mut *context);
            context.end_event();
        }
    }
}
