//! Swapchain interface.
//!
//! The windowing layer owns the swapchain; the graph only imports its current
//! back buffer each frame and the render loop presents through it. Present
//! hooks let the renderer fence GPU work around the flip:
//! [`PresentHooks::pre_present`] returns the [`SyncHandle`] the presentation
//! depends on, and [`PresentHooks::post_present`] receives it back to wait
//! after the flip is queued.

use crate::errors::Result;

use super::resources::{GpuTexture, GpuView};
use super::sync::SyncHandle;

/// Renderer callbacks bracketing a present.
pub trait PresentHooks {
    /// Called before the flip; returns the handle presentation must wait for.
    fn pre_present(&mut self) -> SyncHandle;

    /// Called after the flip with the handle from
    /// [`pre_present`](Self::pre_present).
    fn post_present(&mut self, handle: SyncHandle);
}

/// A window-sized chain of presentable back buffers.
pub trait Swapchain {
    /// The back buffer to render into this frame, with its render target
    /// view.
    fn current_back_buffer(&self) -> (&GpuTexture, &GpuView);

    /// Presents the current back buffer and advances the chain.
    fn present(&mut self, vsync: bool, hooks: &mut dyn PresentHooks) -> Result<()>;
}
