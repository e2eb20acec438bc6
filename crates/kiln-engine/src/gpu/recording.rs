use std::collections::HashMap;

use crate::mesh::DrawMode;
use crate::texture::{TexelData, TextureDesc, TextureFormat};

use super::{
    BufferHandle, GpuSink, ProgramHandle, ProgramSource, TextureHandle, UniformLocation,
    UniformValue, VertexArrayHandle, VertexAttribute,
};

/// One call received by a [`RecordingSink`].
#[derive(Debug, Clone, PartialEq)]
pub enum GpuCommand {
    CreateVertexArray(VertexArrayHandle),
    CreateBuffer(BufferHandle),
    DeleteVertexArray(VertexArrayHandle),
    DeleteBuffer(BufferHandle),
    BindVertexArray(Option<VertexArrayHandle>),
    BindVertexBuffer(Option<BufferHandle>),
    BindIndexBuffer(Option<BufferHandle>),
    VertexAttribute { location: u32, attribute: VertexAttribute },
    UploadVertexData { buffer: Option<BufferHandle>, bytes: Vec<u8> },
    UploadIndexData { buffer: Option<BufferHandle>, bytes: Vec<u8> },
    DrawIndexed { vertex_array: Option<VertexArrayHandle>, mode: DrawMode, index_count: u32 },
    CreateProgram(ProgramHandle),
    DeleteProgram(ProgramHandle),
    UseProgram(Option<ProgramHandle>),
    SetUniform { location: UniformLocation, value: UniformValue },
    CreateTexture { handle: TextureHandle, width: u32, height: u32, format: TextureFormat },
    DeleteTexture(TextureHandle),
    BindTexture { handle: Option<TextureHandle>, slot: u32 },
}

/// Headless sink that records every call in order.
///
/// Tracks the bind state so uploads and draws record which object they hit.
/// Useful for tests and for inspecting the command stream of a mesh without a GPU.
#[derive(Debug, Default)]
pub struct RecordingSink {
    commands: Vec<GpuCommand>,
    next_id: u32,
    fail_creation: bool,

    vertex_array: Option<VertexArrayHandle>,
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,

    /// Uniform names (block members, then the texture) per program.
    program_uniforms: HashMap<ProgramHandle, Vec<String>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose object creation always fails.
    pub fn failing() -> Self {
        Self {
            fail_creation: true,
            ..Self::default()
        }
    }

    /// Toggles object-creation failure for subsequent calls.
    pub fn set_fail_creation(&mut self, fail: bool) {
        self.fail_creation = fail;
    }

    #[inline]
    pub fn commands(&self) -> &[GpuCommand] {
        &self.commands
    }

    /// Returns and clears the recorded commands; bind state is kept.
    pub fn take_commands(&mut self) -> Vec<GpuCommand> {
        std::mem::take(&mut self.commands)
    }

    /// `(mode, index_count)` of every draw call, in order.
    pub fn draw_calls(&self) -> Vec<(DrawMode, u32)> {
        self.commands
            .iter()
            .filter_map(|c| match c {
                GpuCommand::DrawIndexed { mode, index_count, .. } => Some((*mode, *index_count)),
                _ => None,
            })
            .collect()
    }

    pub fn last_vertex_upload(&self) -> Option<&[u8]> {
        self.commands.iter().rev().find_map(|c| match c {
            GpuCommand::UploadVertexData { bytes, .. } => Some(bytes.as_slice()),
            _ => None,
        })
    }

    pub fn last_index_upload(&self) -> Option<Vec<u32>> {
        self.commands.iter().rev().find_map(|c| match c {
            GpuCommand::UploadIndexData { bytes, .. } => Some(
                bytes
                    .chunks_exact(4)
                    .map(bytemuck::pod_read_unaligned::<u32>)
                    .collect(),
            ),
            _ => None,
        })
    }

    fn allocate(&mut self) -> Option<u32> {
        if self.fail_creation {
            return None;
        }
        self.next_id += 1;
        Some(self.next_id)
    }
}

impl GpuSink for RecordingSink {
    fn create_vertex_array(&mut self) -> Option<VertexArrayHandle> {
        let handle = VertexArrayHandle::from_raw(self.allocate()?);
        self.commands.push(GpuCommand::CreateVertexArray(handle));
        Some(handle)
    }

    fn create_buffer(&mut self) -> Option<BufferHandle> {
        let handle = BufferHandle::from_raw(self.allocate()?);
        self.commands.push(GpuCommand::CreateBuffer(handle));
        Some(handle)
    }

    fn delete_vertex_array(&mut self, handle: VertexArrayHandle) {
        if self.vertex_array == Some(handle) {
            self.vertex_array = None;
        }
        self.commands.push(GpuCommand::DeleteVertexArray(handle));
    }

    fn delete_buffer(&mut self, handle: BufferHandle) {
        if self.vertex_buffer == Some(handle) {
            self.vertex_buffer = None;
        }
        if self.index_buffer == Some(handle) {
            self.index_buffer = None;
        }
        self.commands.push(GpuCommand::DeleteBuffer(handle));
    }

    fn bind_vertex_array(&mut self, handle: Option<VertexArrayHandle>) {
        self.vertex_array = handle;
        self.commands.push(GpuCommand::BindVertexArray(handle));
    }

    fn bind_vertex_buffer(&mut self, handle: Option<BufferHandle>) {
        self.vertex_buffer = handle;
        self.commands.push(GpuCommand::BindVertexBuffer(handle));
    }

    fn bind_index_buffer(&mut self, handle: Option<BufferHandle>) {
        self.index_buffer = handle;
        self.commands.push(GpuCommand::BindIndexBuffer(handle));
    }

    fn vertex_attribute(&mut self, location: u32, attribute: &VertexAttribute) {
        self.commands.push(GpuCommand::VertexAttribute {
            location,
            attribute: *attribute,
        });
    }

    fn upload_vertex_data(&mut self, bytes: &[u8]) {
        self.commands.push(GpuCommand::UploadVertexData {
            buffer: self.vertex_buffer,
            bytes: bytes.to_vec(),
        });
    }

    fn upload_index_data(&mut self, bytes: &[u8]) {
        self.commands.push(GpuCommand::UploadIndexData {
            buffer: self.index_buffer,
            bytes: bytes.to_vec(),
        });
    }

    fn draw_indexed(&mut self, mode: DrawMode, index_count: u32) {
        self.commands.push(GpuCommand::DrawIndexed {
            vertex_array: self.vertex_array,
            mode,
            index_count,
        });
    }

    fn create_program(&mut self, source: &ProgramSource<'_>) -> Option<ProgramHandle> {
        let handle = ProgramHandle::from_raw(self.allocate()?);
        let names = source
            .uniforms
            .iter()
            .map(|u| u.name.to_string())
            .chain(source.texture.map(str::to_string))
            .collect();
        self.program_uniforms.insert(handle, names);
        self.commands.push(GpuCommand::CreateProgram(handle));
        Some(handle)
    }

    fn delete_program(&mut self, handle: ProgramHandle) {
        self.program_uniforms.remove(&handle);
        self.commands.push(GpuCommand::DeleteProgram(handle));
    }

    fn use_program(&mut self, handle: Option<ProgramHandle>) {
        self.commands.push(GpuCommand::UseProgram(handle));
    }

    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation> {
        let index = self
            .program_uniforms
            .get(&program)?
            .iter()
            .position(|n| n == name)?;
        Some(UniformLocation {
            program,
            index: index as u32,
        })
    }

    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        self.commands.push(GpuCommand::SetUniform { location, value });
    }

    fn create_texture(&mut self, desc: &TextureDesc, texels: TexelData<'_>) -> Option<TextureHandle> {
        if texels.len() != desc.component_count() {
            return None;
        }
        let handle = TextureHandle::from_raw(self.allocate()?);
        self.commands.push(GpuCommand::CreateTexture {
            handle,
            width: desc.width,
            height: desc.height,
            format: desc.format,
        });
        Some(handle)
    }

    fn delete_texture(&mut self, handle: TextureHandle) {
        self.commands.push(GpuCommand::DeleteTexture(handle));
    }

    fn bind_texture(&mut self, handle: Option<TextureHandle>, slot: u32) {
        self.commands.push(GpuCommand::BindTexture { handle, slot });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn uploads_record_the_bound_buffer() {
        let mut sink = RecordingSink::new();
        let vbo = sink.create_buffer();
        sink.bind_vertex_buffer(vbo);
        sink.upload_vertex_data(&[1, 2, 3]);
        sink.bind_vertex_buffer(None);
        sink.upload_vertex_data(&[4]);

        let uploads: Vec<_> = sink
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::UploadVertexData { buffer, .. } => Some(*buffer),
                _ => None,
            })
            .collect();
        assert_eq!(uploads, vec![vbo, None]);
    }

    #[test]
    fn failing_sink_creates_nothing() {
        let mut sink = RecordingSink::failing();
        assert!(sink.create_buffer().is_none());
        assert!(sink.create_vertex_array().is_none());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn handles_are_unique() {
        let mut sink = RecordingSink::new();
        let a = sink.create_buffer().map(|h| h.raw());
        let b = sink.create_vertex_array().map(|h| h.raw());
        assert_ne!(a, b);
    }

    #[test]
    fn last_index_upload_decodes_u32() {
        let mut sink = RecordingSink::new();
        sink.upload_index_data(bytemuck::cast_slice(&[5u32, 6, 7]));
        assert_eq!(sink.last_index_upload(), Some(vec![5, 6, 7]));
    }
}
