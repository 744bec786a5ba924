//! Render Graph
//!
//! Per-frame declaration and execution of GPU work:
//!
//! - [`RenderGraph`]: the per-frame graph: handle creation, imports, passes
//! - [`RenderPass`](pass::RenderPass): one declared unit of work with reads,
//!   writes, and a recorder closure
//! - [`Schedule`](scheduler::Schedule): adjacency, topological order, and
//!   dependency levels produced at execute time
//! - [`RenderGraphRegistry`](registry::RenderGraphRegistry): handle → physical
//!   resource mapping, cached across frames
//! - [`dgml`]: dependency-graph export for graph debugging

pub mod dgml;
pub mod executor;
pub mod graph;
pub mod pass;
pub mod registry;
pub mod scheduler;

pub use graph::RenderGraph;
