//! Availability tracking for external renderers (equation typesetting,
//! diagram services) that load asynchronously.
//!
//! Render requests issued before the renderer is ready queue up and are
//! flushed exactly once when it becomes available.

use tracing::debug;

/// Load state of an external renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RendererState {
    #[default]
    NotLoaded,
    Loading,
    Ready,
}

/// Pending-render queue keyed by block index.
#[derive(Debug, Default)]
pub struct ExternalRenderer {
    state: RendererState,
    pending: Vec<usize>,
}

impl ExternalRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> RendererState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == RendererState::Ready
    }

    /// Record that the renderer's script has started loading.
    pub fn loading(&mut self) {
        if self.state == RendererState::NotLoaded {
            self.state = RendererState::Loading;
        }
    }

    /// Request a render for a block. Returns true when the renderer is
    /// ready and the caller should render now; otherwise the request is
    /// queued for the ready flush.
    pub fn request(&mut self, block_index: usize) -> bool {
        if self.is_ready() {
            return true;
        }
        if !self.pending.contains(&block_index) {
            self.pending.push(block_index);
        }
        false
    }

    /// Mark the renderer available and drain the queued requests, in
    /// request order. Subsequent calls return an empty list.
    pub fn ready(&mut self) -> Vec<usize> {
        self.state = RendererState::Ready;
        let drained = std::mem::take(&mut self.pending);
        if !drained.is_empty() {
            debug!(count = drained.len(), "flushing queued renders");
        }
        drained
    }
}
