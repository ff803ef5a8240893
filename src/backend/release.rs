//! Release queue for GPU resources whose owner was dropped.
//!
//! Owners that are torn down without an explicit release cannot reach the backend
//! from `Drop`. They push their handles here instead and the backend destroys them
//! on the next [`GraphicsBackend::collect_released`] call.
//!
//! [`GraphicsBackend::collect_released`]: crate::backend::GraphicsBackend::collect_released

use crate::backend::traits::{
    BindGroupHandle, BindGroupLayoutHandle, BufferHandle, RenderPipelineHandle,
};
use parking_lot::Mutex;
use std::sync::Arc;

/// A resource handle waiting for destruction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleasedResource {
    Buffer(BufferHandle),
    BindGroup(BindGroupHandle),
    BindGroupLayout(BindGroupLayoutHandle),
    RenderPipeline(RenderPipelineHandle),
}

/// Shared, cloneable queue of released resources
#[derive(Debug, Clone, Default)]
pub struct ReleaseQueue {
    pending: Arc<Mutex<Vec<ReleasedResource>>>,
}

impl ReleaseQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand a batch of resources over for destruction
    pub fn push_all(&self, resources: impl IntoIterator<Item = ReleasedResource>) {
        self.pending.lock().extend(resources);
    }

    /// Number of resources waiting for destruction
    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.lock().is_empty()
    }

    pub(crate) fn drain(&self) -> Vec<ReleasedResource> {
        std::mem::take(&mut *self.pending.lock())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_pending_resources() {
        let queue = ReleaseQueue::new();
        let owner_side = queue.clone();
        owner_side.push_all([
            ReleasedResource::Buffer(BufferHandle(3)),
            ReleasedResource::BindGroup(BindGroupHandle(1)),
        ]);

        assert_eq!(queue.len(), 2);
        assert_eq!(queue.drain().len(), 2);
        assert!(owner_side.is_empty());
    }
}
