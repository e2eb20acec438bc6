use crate::gpu::{
    BufferHandle, GpuSink, ProgramHandle, ProgramSource, TextureHandle, UniformLocation,
    UniformValue, VertexArrayHandle, VertexAttribute,
};
use crate::mesh::DrawMode;
use crate::texture::{TexelData, TextureDesc};

use super::{DrawSkip, RenderCtx, RenderTarget, WgpuBackend};

/// Per-frame [`GpuSink`] over a [`WgpuBackend`].
pub struct WgpuSink<'s, 'c> {
    backend: &'s mut WgpuBackend,
    ctx: &'s RenderCtx<'c>,
    target: Option<&'s mut RenderTarget<'c>>,
}

impl<'s, 'c> WgpuSink<'s, 'c> {
    pub fn new(
        backend: &'s mut WgpuBackend,
        ctx: &'s RenderCtx<'c>,
        target: &'s mut RenderTarget<'c>,
    ) -> Self {
        Self {
            backend,
            ctx,
            target: Some(target),
        }
    }

    /// A sink without a color target: objects and uploads work, draws are dropped.
    pub fn offscreen(backend: &'s mut WgpuBackend, ctx: &'s RenderCtx<'c>) -> Self {
        Self {
            backend,
            ctx,
            target: None,
        }
    }

    #[inline]
    pub fn has_target(&self) -> bool {
        self.target.is_some()
    }
}

impl GpuSink for WgpuSink<'_, '_> {
    fn create_vertex_array(&mut self) -> Option<VertexArrayHandle> {
        Some(self.backend.create_vertex_array())
    }

    fn create_buffer(&mut self) -> Option<BufferHandle> {
        Some(self.backend.create_buffer())
    }

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) {
        self.backend.delete_vertex_array(handle);
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        self.backend.delete_buffer(handle);
    }

    fn bind_vertex_array(&mut self, handle: Option<VertexArrayHandle>) {
        self.backend.bind_vertex_array(handle);
    }

    fn bind_vertex_buffer(&mut self, handle: Option<BufferHandle>) {
        self.backend.bind_vertex_buffer(handle);
    }

    fn bind_index_buffer(&mut self, handle: Option<BufferHandle>) {
        self.backend.bind_index_buffer(handle);
    }

    fn vertex_attribute(&mut self, location: u32, attribute: &VertexAttribute) {
        self.backend.vertex_attribute(location, attribute);
    }

    fn upload_vertex_data(&mut self, bytes: &[u8]) {
        self.backend.upload_vertex_data(self.ctx, bytes);
    }

    fn upload_index_data(&mut self, bytes: &[u8]) {
        self.backend.upload_index_data(self.ctx, bytes);
    }

    fn draw_indexed(&mut self, mode: DrawMode, index_count: u32) {
        if index_count == 0 {
            return;
        }

        let result = match self.target.as_deref_mut() {
            Some(target) => self.backend.draw(self.ctx, target, mode, index_count),
            None => Err(DrawSkip::Offscreen),
        };
        if let Err(reason) = result {
            log::debug!("dropped {mode:?} draw of {index_count} indices: {reason}");
        }
    }

    fn create_program(&mut self, source: &ProgramSource<'_>) -> Option<ProgramHandle> {
        self.backend.create_program(self.ctx, source)
    }

    fn delete_program(&mut self, handle: ProgramHandle) {
        self.backend.delete_program(handle);
    }

    fn use_program(&mut self, handle: Option<ProgramHandle>) {
        self.backend.use_program(handle);
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        self.backend.uniform_location(program, name)
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.backend.set_uniform(location, value);
    }

    fn create_texture(&mut self, desc: &TextureDesc, texels: TexelData<'_>) -> Option<TextureHandle> {
        self.backend.create_texture(self.ctx, desc, texels)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        self.backend.delete_texture(handle);
    }

    fn bind_texture(&mut self, handle: Option<TextureHandle>, slot: u32) {
        self.backend.bind_texture(handle, slot);
    }
}
