use crate::mesh::{Attrib, DrawMode};
use crate::texture::{TexelData, TextureDesc};

use super::{
    BufferHandle, ProgramHandle, TextureHandle, UniformDecl, UniformLocation, UniformValue,
    VertexArrayHandle,
};

/// Attribute pointer recorded into a vertex array.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct VertexAttribute {
    pub attrib: Attrib,
    /// Vertex record size in bytes.
    pub stride: u32,
    /// Attribute offset inside the record.
    pub offset: u32,
}

/// Sources and interface of a shader program.
///
/// Vertex and fragment stages are separate WGSL sources with entry points
/// `vs_main` and `fs_main`. Uniforms live in one block at `@group(0) @binding(0)`;
/// an optional sampled texture binds at `@binding(1)` with its sampler at
/// `@binding(2)`.
#[derive(Debug, Copy, Clone)]
pub struct ProgramSource<'a> {
    pub label: &'a str,
    pub vertex: &'a str,
    pub fragment: &'a str,
    pub uniforms: &'a [UniformDecl<'a>],
    /// Uniform name of the sampled texture, if the program samples one.
    pub texture: Option<&'a str>,
}

/// Graphics binding context consumed by meshes, shaders and textures.
///
/// The model is bind-to-edit: uploads target the currently bound buffer and
/// attribute pointers go into the currently bound vertex array. Passing `None` to a
/// bind call unbinds.
///
/// Object creation returns `None` when the backend cannot provide the object;
/// callers surface that as an absent result instead of failing hard.
pub trait GpuSink {
    // ── objects ───────────────────────────────────────────────────────────

    fn create_vertex_array(&mut self) -> Option<VertexArrayHandle>;
    fn create_buffer(&mut self) -> Option<BufferHandle>;
    fn delete_vertex_array(&mut self, handle: VertexArrayHandle);
    fn delete_buffer(&mut self, handle: BufferHandle);

    // ── binding ───────────────────────────────────────────────────────────

    fn bind_vertex_array(&mut self, handle: Option<VertexArrayHandle>);
    fn bind_vertex_buffer(&mut self, handle: Option<BufferHandle>);

    /// Selects the index upload target; while a vertex array is bound the buffer
    /// is also attached to it.
    fn bind_index_buffer(&mut self, handle: Option<BufferHandle>);

    /// Records an attribute of the bound vertex buffer into the bound vertex array.
    fn vertex_attribute(&mut self, location: u32, attribute: &VertexAttribute);

    // ── data ──────────────────────────────────────────────────────────────

    /// Replaces the bound vertex buffer's contents (dynamic draw data).
    fn upload_vertex_data(&mut self, bytes: &[u8]);

    /// Replaces the bound index buffer's contents with packed `u32` indices.
    fn upload_index_data(&mut self, bytes: &[u8]);

    /// Draws `index_count` indices from the bound vertex array.
    fn draw_indexed(&mut self, mode: DrawMode, index_count: u32);

    // ── programs ──────────────────────────────────────────────────────────

    fn create_program(&mut self, source: &ProgramSource<'_>) -> Option<ProgramHandle>;
    fn delete_program(&mut self, handle: ProgramHandle);
    fn use_program(&mut self, handle: Option<ProgramHandle>);

    /// Looks up a uniform; `None` if the program does not declare it.
    fn uniform_location(&mut self, program: ProgramHandle, name: &str) -> Option<UniformLocation>;
    fn set_uniform(&mut self, location: UniformLocation, value: UniformValue);

    // ── textures ──────────────────────────────────────────────────────────

    fn create_texture(&mut self, desc: &TextureDesc, texels: TexelData<'_>) -> Option<TextureHandle>;
    fn delete_texture(&mut self, handle: TextureHandle);
    fn bind_texture(&mut self, handle: Option<TextureHandle>, slot: u32);
}
