//! Dummy GPU backend for testing and development.
//!
//! This backend doesn't talk to a GPU. Buffers live in CPU memory so their contents
//! can be read back, and draw commands are recorded instead of executed.

use crate::backend::release::ReleaseQueue;
use crate::backend::traits::*;
use crate::backend::types::*;
use std::collections::HashMap;

/// A command recorded inside a render pass
#[derive(Debug, Clone, PartialEq)]
pub enum RecordedCommand {
    SetPipeline(RenderPipelineHandle),
    SetBindGroup { index: u32, bind_group: BindGroupHandle },
    SetVertexBuffer { slot: u32, buffer: BufferHandle },
    SetIndexBuffer { buffer: BufferHandle, format: IndexFormat },
    DrawIndexed { indices: std::ops::Range<u32>, instances: std::ops::Range<u32> },
}

/// Dummy GPU backend.
#[derive(Debug, Default)]
pub struct DummyBackend {
    buffers: HashMap<u64, Vec<u8>>,
    bind_group_layouts: HashMap<u64, usize>,
    bind_groups: HashMap<u64, BindGroupLayoutHandle>,
    render_pipelines: HashMap<u64, RenderPipelineDescriptor>,
    next_id: u64,
    commands: Vec<RecordedCommand>,
    in_render_pass: bool,
    release_queue: ReleaseQueue,
    /// Fail the next buffer creation, to exercise allocation error paths
    fail_next_buffer: bool,
}

impl DummyBackend {
    /// Create a new dummy backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the backend name.
    pub fn name(&self) -> &'static str {
        "Dummy Backend"
    }

    fn next_handle(&mut self) -> u64 {
        self.next_id += 1;
        self.next_id
    }

    /// Contents of a live buffer
    pub fn buffer_data(&self, buffer: BufferHandle) -> Option<&[u8]> {
        self.buffers.get(&buffer.0).map(Vec::as_slice)
    }

    /// Contents of a live buffer, read back as `T` values
    pub fn read_buffer<T: bytemuck::Pod>(&self, buffer: BufferHandle) -> Option<Vec<T>> {
        let data = self.buffers.get(&buffer.0)?;
        Some(
            data.chunks_exact(std::mem::size_of::<T>())
                .map(bytemuck::pod_read_unaligned)
                .collect(),
        )
    }

    /// Number of buffers not yet destroyed
    pub fn live_buffer_count(&self) -> usize {
        self.buffers.len()
    }

    /// Number of bind groups not yet destroyed
    pub fn live_bind_group_count(&self) -> usize {
        self.bind_groups.len()
    }

    /// Number of bind group layouts not yet destroyed
    pub fn live_bind_group_layout_count(&self) -> usize {
        self.bind_group_layouts.len()
    }

    /// Descriptor a live pipeline was created from
    pub fn pipeline_descriptor(&self, pipeline: RenderPipelineHandle) -> Option<&RenderPipelineDescriptor> {
        self.render_pipelines.get(&pipeline.0)
    }

    pub fn live_pipeline_count(&self) -> usize {
        self.render_pipelines.len()
    }

    /// Every resource not yet destroyed
    pub fn live_resource_count(&self) -> usize {
        self.buffers.len()
            + self.bind_group_layouts.len()
            + self.bind_groups.len()
            + self.render_pipelines.len()
    }

    /// Commands recorded since the last call
    pub fn take_commands(&mut self) -> Vec<RecordedCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Make the next `create_buffer_init` call fail with `OutOfMemory`
    pub fn fail_next_buffer_creation(&mut self) {
        self.fail_next_buffer = true;
    }

    fn record(&mut self, command: RecordedCommand) {
        if !self.in_render_pass {
            log::warn!("DummyBackend: {:?} recorded outside of a render pass", command);
        }
        self.commands.push(command);
    }
}

impl GraphicsBackend for DummyBackend {
    fn create_buffer_init(
        &mut self,
        desc: &BufferDescriptor,
        data: &[u8],
    ) -> BackendResult<BufferHandle> {
        if std::mem::take(&mut self.fail_next_buffer) {
            return Err(BackendError::OutOfMemory);
        }
        log::trace!(
            "DummyBackend: creating buffer {:?} (size: {})",
            desc.label,
            data.len()
        );
        let id = self.next_handle();
        self.buffers.insert(id, data.to_vec());
        Ok(BufferHandle(id))
    }

    fn write_buffer(&mut self, buffer: BufferHandle, offset: u64, data: &[u8]) {
        let Some(contents) = self.buffers.get_mut(&buffer.0) else {
            log::warn!("DummyBackend: write to unknown buffer {:?}", buffer);
            return;
        };
        let start = offset as usize;
        let end = start + data.len();
        if end > contents.len() {
            log::warn!(
                "DummyBackend: write of {} bytes at {} overflows buffer of {} bytes",
                data.len(),
                offset,
                contents.len()
            );
            return;
        }
        contents[start..end].copy_from_slice(data);
    }

    fn create_bind_group_layout(
        &mut self,
        entries: &[BindGroupLayoutEntry],
    ) -> BackendResult<BindGroupLayoutHandle> {
        log::trace!("DummyBackend: creating bind group layout ({} entries)", entries.len());
        let id = self.next_handle();
        self.bind_group_layouts.insert(id, entries.len());
        Ok(BindGroupLayoutHandle(id))
    }

    fn create_bind_group(
        &mut self,
        layout: BindGroupLayoutHandle,
        entries: &[(u32, BindGroupEntry)],
    ) -> BackendResult<BindGroupHandle> {
        if !self.bind_group_layouts.contains_key(&layout.0) {
            return Err(BackendError::PipelineCreationFailed(format!(
                "unknown bind group layout {:?}",
                layout
            )));
        }
        for (_, entry) in entries {
            let BindGroupEntry::Buffer { buffer, .. } = entry;
            if !self.buffers.contains_key(&buffer.0) {
                return Err(BackendError::PipelineCreationFailed(format!(
                    "bind group references unknown buffer {:?}",
                    buffer
                )));
            }
        }
        let id = self.next_handle();
        self.bind_groups.insert(id, layout);
        Ok(BindGroupHandle(id))
    }

    fn create_render_pipeline(
        &mut self,
        desc: &RenderPipelineDescriptor,
    ) -> BackendResult<RenderPipelineHandle> {
        log::trace!("DummyBackend: creating render pipeline {:?}", desc.label);
        let id = self.next_handle();
        self.render_pipelines.insert(id, desc.clone());
        Ok(RenderPipelineHandle(id))
    }

    fn begin_render_pass(&mut self, desc: &RenderPassDescriptor) {
        log::trace!("DummyBackend: begin render pass {:?}", desc.label);
        self.in_render_pass = true;
    }

    fn end_render_pass(&mut self) {
        self.in_render_pass = false;
    }

    fn set_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.record(RecordedCommand::SetPipeline(pipeline));
    }

    fn set_bind_group(&mut self, index: u32, bind_group: BindGroupHandle) {
        self.record(RecordedCommand::SetBindGroup { index, bind_group });
    }

    fn set_vertex_buffer(&mut self, slot: u32, buffer: BufferHandle, _offset: u64) {
        self.record(RecordedCommand::SetVertexBuffer { slot, buffer });
    }

    fn set_index_buffer(&mut self, buffer: BufferHandle, _offset: u64, format: IndexFormat) {
        self.record(RecordedCommand::SetIndexBuffer { buffer, format });
    }

    fn draw_indexed(
        &mut self,
        indices: std::ops::Range<u32>,
        _base_vertex: i32,
        instances: std::ops::Range<u32>,
    ) {
        self.record(RecordedCommand::DrawIndexed { indices, instances });
    }

    fn destroy_buffer(&mut self, buffer: BufferHandle) {
        self.buffers.remove(&buffer.0);
    }

    fn destroy_bind_group(&mut self, bind_group: BindGroupHandle) {
        self.bind_groups.remove(&bind_group.0);
    }

    fn destroy_bind_group_layout(&mut self, layout: BindGroupLayoutHandle) {
        self.bind_group_layouts.remove(&layout.0);
    }

    fn destroy_render_pipeline(&mut self, pipeline: RenderPipelineHandle) {
        self.render_pipelines.remove(&pipeline.0);
    }

    fn release_queue(&self) -> &ReleaseQueue {
        &self.release_queue
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn buffers_keep_written_contents() {
        let mut backend = DummyBackend::new();
        let data = [1u8, 2, 3, 4, 5, 6, 7, 8];
        let desc = BufferDescriptor::for_data("test", &data, BufferUsage::VERTEX);
        let buffer = backend.create_buffer_init(&desc, &data).unwrap();

        backend.write_buffer(buffer, 4, &[9, 9]);
        assert_eq!(backend.buffer_data(buffer), Some(&[1, 2, 3, 4, 9, 9, 7, 8][..]));

        // Out of bounds writes are ignored
        backend.write_buffer(buffer, 7, &[0, 0]);
        assert_eq!(backend.buffer_data(buffer).unwrap()[7], 8);
    }

    #[test]
    fn collect_released_destroys_queued_resources() {
        let mut backend = DummyBackend::new();
        let buffer = backend
            .create_buffer_init(&BufferDescriptor::for_data("a", &[0; 4], BufferUsage::UNIFORM), &[0; 4])
            .unwrap();
        backend
            .release_queue()
            .push_all([crate::backend::ReleasedResource::Buffer(buffer)]);

        assert_eq!(backend.collect_released(), 1);
        assert_eq!(backend.live_buffer_count(), 0);
        assert_eq!(backend.collect_released(), 0);
    }

    #[test]
    fn failed_allocation_is_reported_once() {
        let mut backend = DummyBackend::new();
        backend.fail_next_buffer_creation();
        let desc = BufferDescriptor::for_data("a", &[0; 4], BufferUsage::VERTEX);
        assert!(matches!(
            backend.create_buffer_init(&desc, &[0; 4]),
            Err(BackendError::OutOfMemory)
        ));
        assert!(backend.create_buffer_init(&desc, &[0; 4]).is_ok());
    }
}
