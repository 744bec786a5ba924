//! Render Pass
//!
//! A pass is a named unit of GPU work with explicit resource dependencies and
//! a recorder closure. Pass objects live in the frame allocator and are freed
//! in bulk when the graph drops.

use rustc_hash::FxHashSet;

use crate::graph::registry::RenderGraphRegistry;
use crate::hal::CommandContext;
use crate::resource::{ResourceKind, RgResourceHandle};

/// Recorder closure invoked during execution. Responsible for pipeline
/// binding, root arguments, draws and dispatches, and render pass scoping.
pub type PassCallback<'fr> = Box<dyn FnOnce(&RenderGraphRegistry, &mut dyn CommandContext) + 'fr>;

pub(crate) type PassBox<'fr> = bumpalo::boxed::Box<'fr, RenderPass<'fr>>;

/// A user-declared render pass.
///
/// Obtained from [`RenderGraph::add_pass`](crate::RenderGraph::add_pass);
/// declare dependencies with [`read`](Self::read) / [`write`](Self::write)
/// and attach the recorder with [`execute`](Self::execute).
pub struct RenderPass<'fr> {
    pub(crate) name: &'fr str,
    pub(crate) topological_index: usize,
    pub(crate) reads: FxHashSet<RgResourceHandle>,
    pub(crate) writes: FxHashSet<RgResourceHandle>,
    pub(crate) read_writes: FxHashSet<RgResourceHandle>,
    pub(crate) callback: Option<PassCallback<'fr>>,
}

impl<'fr> RenderPass<'fr> {
    pub(crate) fn new(name: &'fr str) -> Self {
        Self {
            name,
            topological_index: 0,
            reads: FxHashSet::default(),
            writes: FxHashSet::default(),
            read_writes: FxHashSet::default(),
            callback: None,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        self.name
    }

    /// Position in the execution order, valid after the graph is scheduled.
    #[must_use]
    pub fn topological_index(&self) -> usize {
        self.topological_index
    }

    /// Declares that this pass reads `resource`.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid or not a buffer/texture handle.
    pub fn read(&mut self, resource: RgResourceHandle) -> &mut Self {
        assert!(resource.is_valid(), "read of an invalid resource handle");
        assert!(
            matches!(
                resource.kind(),
                ResourceKind::Buffer | ResourceKind::Texture
            ),
            "pass '{}' can only read buffers and textures, got {:?}",
            self.name,
            resource.kind()
        );
        self.reads.insert(resource);
        self.read_writes.insert(resource);
        self
    }

    /// Declares that this pass writes `resource`, bumping its version in
    /// place. Passes that subsequently read the bumped handle depend on this
    /// pass.
    ///
    /// # Panics
    ///
    /// Panics if the handle is invalid or not a buffer/texture handle.
    pub fn write(&mut self, resource: &mut RgResourceHandle) -> &mut Self {
        assert!(resource.is_valid(), "write of an invalid resource handle");
        assert!(
            matches!(
                resource.kind(),
                ResourceKind::Buffer | ResourceKind::Texture
            ),
            "pass '{}' can only write buffers and textures, got {:?}",
            self.name,
            resource.kind()
        );
        resource.bump_version();
        self.writes.insert(*resource);
        self.read_writes.insert(*resource);
        self
    }

    /// Attaches the recorder closure. The closure runs at most once, when the
    /// graph executes this pass's dependency level.
    pub fn execute<F>(&mut self, callback: F)
    where
        F: FnOnce(&RenderGraphRegistry, &mut dyn CommandContext) + 'fr,
    {
        self.callback = Some(Box::new(callback));
    }

    #[must_use]
    pub fn reads_from(&self, resource: RgResourceHandle) -> bool {
        self.reads.contains(&resource)
    }

    #[must_use]
    pub fn writes_to(&self, resource: RgResourceHandle) -> bool {
        self.writes.contains(&resource)
    }

    /// Whether the pass declared any dependency at all.
    #[must_use]
    pub fn has_any_dependencies(&self) -> bool {
        !self.read_writes.is_empty()
    }
}
