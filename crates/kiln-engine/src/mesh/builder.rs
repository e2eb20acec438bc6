use crate::coords::{ColorRgba, Vec2, Vec3};
use crate::gpu::{BufferHandle, GpuSink, VertexArrayHandle, VertexAttribute};
use crate::shader::Shader;

use super::hooks::{RenderHooks, ShaderHooks};
use super::index::IndexBuffer;
use super::vertex::VertexBuffer;
use super::{Attrib, AttributeLayout, DrawMode, MeshError};

/// Initial buffer sizes, in whole primitives.
///
/// Buffers grow past these on demand and never shrink.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct MeshCapacity {
    pub vertex_primitives: usize,
    pub index_primitives: usize,
}

impl Default for MeshCapacity {
    fn default() -> Self {
        Self {
            vertex_primitives: 1024,
            index_primitives: 512,
        }
    }
}

/// Dynamic mesh assembled on the CPU and flushed to a [`GpuSink`].
///
/// Build protocol:
///
/// ```ignore
/// mesh.begin()?;
/// let a = mesh.vec3(0.0, 0.0, 0.0)?.next()?;
/// let b = mesh.vec3(1.0, 0.0, 0.0)?.next()?;
/// let c = mesh.vec3(0.0, 1.0, 0.0)?.next()?;
/// mesh.triangle(a, b, c)?;
/// mesh.end(gpu)?;
/// mesh.render(gpu);
/// ```
///
/// Attribute writes must follow the layout order and types. Release builds do not
/// check this; debug builds assert it.
///
/// CPU buffers are reused across cycles. GPU objects are released by
/// [`dispose`](Self::dispose); dropping the builder without it leaks them on the
/// sink side.
pub struct MeshBuilder {
    draw_mode: DrawMode,
    layout: AttributeLayout,

    vertices: VertexBuffer,
    indices: IndexBuffer,

    vertex_array: VertexArrayHandle,
    vertex_buffer: BufferHandle,
    index_buffer: BufferHandle,

    hooks: Option<Box<dyn RenderHooks>>,

    building: bool,
    vertex_count: u32,

    /// Next attribute of the current vertex, for layout assertions.
    #[cfg(debug_assertions)]
    next_attrib: usize,
}

impl MeshBuilder {
    /// Creates a mesh with default capacities.
    ///
    /// Returns `None` if the sink cannot create the GPU objects.
    pub fn new(gpu: &mut dyn GpuSink, draw_mode: DrawMode, attribs: &[Attrib]) -> Option<Self> {
        Self::with_capacity(gpu, draw_mode, attribs, MeshCapacity::default())
    }

    pub fn with_capacity(
        gpu: &mut dyn GpuSink,
        draw_mode: DrawMode,
        attribs: &[Attrib],
        capacity: MeshCapacity,
    ) -> Option<Self> {
        let layout = AttributeLayout::new(attribs);
        let (vertex_array, vertex_buffer, index_buffer) = create_gpu_objects(gpu, &layout)?;

        let per_primitive = draw_mode.indices_per_primitive();

        Some(Self {
            draw_mode,
            vertices: VertexBuffer::new(layout.stride(), per_primitive, capacity.vertex_primitives),
            indices: IndexBuffer::new(per_primitive, capacity.index_primitives),
            layout,
            vertex_array,
            vertex_buffer,
            index_buffer,
            hooks: None,
            building: false,
            vertex_count: 0,
            #[cfg(debug_assertions)]
            next_attrib: 0,
        })
    }

    /// Creates a mesh that binds `shader` (and its defaults) before every draw.
    pub fn with_shader<S>(
        gpu: &mut dyn GpuSink,
        shader: S,
        draw_mode: DrawMode,
        attribs: &[Attrib],
    ) -> Option<Self>
    where
        S: Shader + 'static,
    {
        Some(Self::new(gpu, draw_mode, attribs)?.with_hooks(ShaderHooks::new(shader)))
    }

    /// Replaces the render hooks.
    pub fn with_hooks(mut self, hooks: impl RenderHooks + 'static) -> Self {
        self.hooks = Some(Box::new(hooks));
        self
    }

    // ── accessors ─────────────────────────────────────────────────────────

    #[inline]
    pub fn draw_mode(&self) -> DrawMode {
        self.draw_mode
    }

    #[inline]
    pub fn layout(&self) -> &AttributeLayout {
        &self.layout
    }

    #[inline]
    pub fn is_building(&self) -> bool {
        self.building
    }

    /// Vertices finished so far in the current (or last) cycle.
    #[inline]
    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }

    /// Indices emitted so far in the current (or last) cycle.
    #[inline]
    pub fn index_count(&self) -> u32 {
        self.indices.count()
    }

    #[inline]
    pub fn vertex_capacity(&self) -> usize {
        self.vertices.capacity()
    }

    #[inline]
    pub fn index_capacity(&self) -> usize {
        self.indices.capacity()
    }

    /// Vertex bytes that `end()` uploads: `vertex_count * stride`.
    #[inline]
    pub fn vertex_bytes(&self) -> &[u8] {
        self.vertices.vertices(self.vertex_count as usize)
    }

    #[inline]
    pub fn index_bytes(&self) -> &[u8] {
        self.indices.bytes()
    }

    // ── build cycle ───────────────────────────────────────────────────────

    /// Starts a build cycle, discarding the previous cycle's geometry.
    pub fn begin(&mut self) -> Result<(), MeshError> {
        if self.building {
            return Err(MeshError::AlreadyBuilding);
        }

        self.vertices.reset();
        self.indices.reset();
        self.vertex_count = 0;
        #[cfg(debug_assertions)]
        {
            self.next_attrib = 0;
        }

        self.building = true;
        Ok(())
    }

    /// Ends the build cycle and uploads the geometry.
    ///
    /// Nothing is uploaded if no index was emitted.
    pub fn end(&mut self, gpu: &mut dyn GpuSink) -> Result<(), MeshError> {
        if !self.building {
            return Err(MeshError::NotBuilding { op: "end" });
        }
        self.flush(gpu);
        Ok(())
    }

    /// Draws the last completed cycle, ending the current one first if needed.
    pub fn render(&mut self, gpu: &mut dyn GpuSink) {
        if self.building {
            self.flush(gpu);
        }

        let index_count = self.indices.count();
        if index_count == 0 {
            return;
        }

        if let Some(hooks) = self.hooks.as_mut() {
            hooks.before_render(gpu);
        }

        gpu.bind_vertex_array(Some(self.vertex_array));
        gpu.draw_indexed(self.draw_mode, index_count);
        gpu.bind_vertex_array(None);

        if let Some(hooks) = self.hooks.as_mut() {
            hooks.after_render(gpu);
        }
    }

    /// Releases the GPU objects and the CPU buffers.
    ///
    /// Disposing mid-cycle is a caller error: the pending geometry is discarded.
    pub fn dispose(self, gpu: &mut dyn GpuSink) {
        if self.building {
            log::warn!("MeshBuilder disposed while building; pending geometry discarded");
        }
        gpu.delete_vertex_array(self.vertex_array);
        gpu.delete_buffer(self.vertex_buffer);
        gpu.delete_buffer(self.index_buffer);
    }

    fn flush(&mut self, gpu: &mut dyn GpuSink) {
        #[cfg(debug_assertions)]
        if self.next_attrib != 0 {
            log::debug!("MeshBuilder: cycle ended with an unfinished vertex; it is not uploaded");
        }

        if self.indices.count() > 0 {
            gpu.bind_vertex_buffer(Some(self.vertex_buffer));
            gpu.upload_vertex_data(self.vertices.vertices(self.vertex_count as usize));
            gpu.bind_vertex_buffer(None);

            gpu.bind_index_buffer(Some(self.index_buffer));
            gpu.upload_index_data(self.indices.bytes());
            gpu.bind_index_buffer(None);
        }

        self.building = false;
    }

    // ── vertex writers ────────────────────────────────────────────────────

    pub fn ubyte(&mut self, v: u8) -> Result<&mut Self, MeshError> {
        self.begin_write("ubyte", Attrib::UBYTE)?;
        self.vertices.put_u8(v);
        Ok(self)
    }

    pub fn float(&mut self, v: f32) -> Result<&mut Self, MeshError> {
        self.begin_write("float", Attrib::FLOAT)?;
        self.vertices.put_f32(v);
        Ok(self)
    }

    pub fn vec2(&mut self, x: f32, y: f32) -> Result<&mut Self, MeshError> {
        self.begin_write("vec2", Attrib::VEC2)?;
        self.vertices.put_f32x2([x, y]);
        Ok(self)
    }

    #[inline]
    pub fn vec2_from(&mut self, v: Vec2) -> Result<&mut Self, MeshError> {
        self.vec2(v.x, v.y)
    }

    pub fn vec3(&mut self, x: f32, y: f32, z: f32) -> Result<&mut Self, MeshError> {
        self.begin_write("vec3", Attrib::VEC3)?;
        self.vertices.put_f32x3([x, y, z]);
        Ok(self)
    }

    #[inline]
    pub fn vec3_from(&mut self, v: Vec3) -> Result<&mut Self, MeshError> {
        self.vec3(v.x, v.y, v.z)
    }

    pub fn vec4(&mut self, x: f32, y: f32, z: f32, w: f32) -> Result<&mut Self, MeshError> {
        self.begin_write("vec4", Attrib::VEC4)?;
        self.vertices.put_f32x4([x, y, z, w]);
        Ok(self)
    }

    /// Writes an RGBA color as four floats.
    pub fn color(&mut self, color: ColorRgba) -> Result<&mut Self, MeshError> {
        self.begin_write("color", Attrib::VEC4)?;
        self.vertices.put_color(color);
        Ok(self)
    }

    /// Finishes the current vertex and returns its ordinal.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> Result<u32, MeshError> {
        self.expect_building("next")?;

        #[cfg(debug_assertions)]
        {
            debug_assert!(
                self.next_attrib == self.layout.len(),
                "MeshBuilder::next: vertex has {} of {} attributes",
                self.next_attrib,
                self.layout.len()
            );
            self.next_attrib = 0;
        }

        let index = self.vertex_count;
        self.vertex_count += 1;
        Ok(index)
    }

    // ── primitives ────────────────────────────────────────────────────────

    pub fn line(&mut self, i1: u32, i2: u32) -> Result<(), MeshError> {
        self.expect_primitive("line", DrawMode::Lines)?;
        self.indices.line(i1, i2);
        Ok(())
    }

    pub fn triangle(&mut self, i1: u32, i2: u32, i3: u32) -> Result<(), MeshError> {
        self.expect_primitive("triangle", DrawMode::Triangles)?;
        self.indices.triangle(i1, i2, i3);
        Ok(())
    }

    /// Emits two triangles sharing the `i1`–`i3` diagonal.
    pub fn quad(&mut self, i1: u32, i2: u32, i3: u32, i4: u32) -> Result<(), MeshError> {
        self.expect_primitive("quad", DrawMode::Triangles)?;
        self.indices.quad(i1, i2, i3, i4);
        Ok(())
    }

    // ── preconditions ─────────────────────────────────────────────────────

    #[inline]
    fn expect_building(&self, op: &'static str) -> Result<(), MeshError> {
        if self.building {
            Ok(())
        } else {
            Err(MeshError::NotBuilding { op })
        }
    }

    #[inline]
    fn expect_primitive(&self, op: &'static str, mode: DrawMode) -> Result<(), MeshError> {
        self.expect_building(op)?;
        if self.draw_mode != mode {
            return Err(MeshError::WrongDrawMode {
                op,
                mode: self.draw_mode,
            });
        }
        Ok(())
    }

    #[inline]
    fn begin_write(&mut self, op: &'static str, written: Attrib) -> Result<(), MeshError> {
        self.expect_building(op)?;

        #[cfg(debug_assertions)]
        {
            let expected = self.layout.get(self.next_attrib);
            debug_assert!(
                expected.is_some_and(|e| e.accepts(written)),
                "MeshBuilder::{op}: layout expects {:?} at attribute {}",
                expected,
                self.next_attrib
            );
            self.next_attrib += 1;
        }
        #[cfg(not(debug_assertions))]
        let _ = written;

        Ok(())
    }
}

/// Creates the vertex array and both buffers and records the attribute layout.
///
/// On partial failure the objects created so far are deleted again.
fn create_gpu_objects(
    gpu: &mut dyn GpuSink,
    layout: &AttributeLayout,
) -> Option<(VertexArrayHandle, BufferHandle, BufferHandle)> {
    let Some(vertex_array) = gpu.create_vertex_array() else {
        log::warn!("failed to create vertex array");
        return None;
    };
    let Some(vertex_buffer) = gpu.create_buffer() else {
        log::warn!("failed to create vertex buffer");
        gpu.delete_vertex_array(vertex_array);
        return None;
    };
    let Some(index_buffer) = gpu.create_buffer() else {
        log::warn!("failed to create index buffer");
        gpu.delete_buffer(vertex_buffer);
        gpu.delete_vertex_array(vertex_array);
        return None;
    };

    gpu.bind_vertex_array(Some(vertex_array));
    gpu.bind_vertex_buffer(Some(vertex_buffer));
    gpu.bind_index_buffer(Some(index_buffer));

    let stride = layout.stride() as u32;
    for entry in layout.entries() {
        gpu.vertex_attribute(
            entry.location,
            &VertexAttribute {
                attrib: entry.attrib,
                stride,
                offset: entry.offset as u32,
            },
        );
    }

    gpu.bind_vertex_array(None);
    gpu.bind_vertex_buffer(None);
    gpu.bind_index_buffer(None);

    Some((vertex_array, vertex_buffer, index_buffer))
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::gpu::{
        GpuCommand, ProgramSource, RecordingSink, UniformDecl, UniformKind, UniformValue,
    };
    use crate::shader::Program;

    fn positions(sink: &mut RecordingSink) -> MeshBuilder {
        let mesh = MeshBuilder::new(sink, DrawMode::Triangles, &[Attrib::VEC3]).unwrap();
        sink.take_commands();
        mesh
    }

    fn build_triangle(mesh: &mut MeshBuilder, sink: &mut RecordingSink) {
        mesh.begin().unwrap();
        let a = mesh.vec3(0.0, 0.0, 0.0).unwrap().next().unwrap();
        let b = mesh.vec3(1.0, 0.0, 0.0).unwrap().next().unwrap();
        let c = mesh.vec3(0.0, 1.0, 0.0).unwrap().next().unwrap();
        mesh.triangle(a, b, c).unwrap();
        mesh.end(sink).unwrap();
    }

    // ── construction ──────────────────────────────────────────────────────

    #[test]
    fn construction_records_attribute_layout() {
        let mut sink = RecordingSink::new();
        let _mesh =
            MeshBuilder::new(&mut sink, DrawMode::Triangles, &[Attrib::VEC2, Attrib::VEC4]).unwrap();

        let attrs: Vec<(u32, u32, u32)> = sink
            .commands()
            .iter()
            .filter_map(|c| match c {
                GpuCommand::VertexAttribute { location, attribute } => {
                    Some((*location, attribute.offset, attribute.stride))
                }
                _ => None,
            })
            .collect();
        assert_eq!(attrs, vec![(0, 0, 24), (1, 8, 24)]);
        assert_eq!(sink.commands().last(), Some(&GpuCommand::BindIndexBuffer(None)));
    }

    #[test]
    fn construction_fails_without_gpu_objects() {
        let mut sink = RecordingSink::failing();
        assert!(MeshBuilder::new(&mut sink, DrawMode::Lines, &[Attrib::VEC2]).is_none());
    }

    #[test]
    fn initial_capacities_follow_mesh_capacity() {
        let mut sink = RecordingSink::new();
        let mesh = MeshBuilder::with_capacity(
            &mut sink,
            DrawMode::Triangles,
            &[Attrib::VEC3],
            MeshCapacity { vertex_primitives: 4, index_primitives: 2 },
        )
        .unwrap();
        assert_eq!(mesh.vertex_capacity(), 12 * 3 * 4);
        assert_eq!(mesh.index_capacity(), 3 * 4 * 2);
    }

    // ── single triangle scenario ──────────────────────────────────────────

    #[test]
    fn triangle_cycle_uploads_and_draws() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);

        build_triangle(&mut mesh, &mut sink);
        assert_eq!(sink.last_vertex_upload().map(<[u8]>::len), Some(36));
        assert_eq!(sink.last_index_upload(), Some(vec![0, 1, 2]));

        mesh.render(&mut sink);
        assert_eq!(sink.draw_calls(), vec![(DrawMode::Triangles, 3)]);
    }

    #[test]
    fn end_binds_uploads_and_unbinds_each_buffer() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        build_triangle(&mut mesh, &mut sink);

        let shape: Vec<&'static str> = sink
            .commands()
            .iter()
            .map(|c| match c {
                GpuCommand::BindVertexBuffer(Some(_)) => "bind vbo",
                GpuCommand::BindVertexBuffer(None) => "unbind vbo",
                GpuCommand::BindIndexBuffer(Some(_)) => "bind ibo",
                GpuCommand::BindIndexBuffer(None) => "unbind ibo",
                GpuCommand::UploadVertexData { buffer: Some(_), .. } => "upload vertices",
                GpuCommand::UploadIndexData { buffer: Some(_), .. } => "upload indices",
                _ => "other",
            })
            .collect();
        assert_eq!(
            shape,
            vec!["bind vbo", "upload vertices", "unbind vbo", "bind ibo", "upload indices", "unbind ibo"]
        );
    }

    #[test]
    fn vertex_upload_is_count_times_stride() {
        let mut sink = RecordingSink::new();
        let mut mesh =
            MeshBuilder::new(&mut sink, DrawMode::Lines, &[Attrib::VEC2, Attrib::VEC4, Attrib::UBYTE])
                .unwrap();

        mesh.begin().unwrap();
        for i in 0..37u32 {
            mesh.vec2(i as f32, 0.0)
                .unwrap()
                .color(ColorRgba::white())
                .unwrap()
                .ubyte(i as u8)
                .unwrap();
            let v = mesh.next().unwrap();
            if v > 0 {
                mesh.line(v - 1, v).unwrap();
            }
        }
        mesh.end(&mut sink).unwrap();

        assert_eq!(sink.last_vertex_upload().map(<[u8]>::len), Some(37 * 25));
        assert_eq!(mesh.index_count(), 36 * 2);
    }

    #[test]
    fn color_is_written_as_rgba_floats() {
        let mut sink = RecordingSink::new();
        let mut mesh = MeshBuilder::new(&mut sink, DrawMode::Lines, &[Attrib::VEC4]).unwrap();
        mesh.begin().unwrap();
        let a = mesh.color(ColorRgba::new(0.1, 0.2, 0.3, 0.4)).unwrap().next().unwrap();
        let b = mesh.color(ColorRgba::black()).unwrap().next().unwrap();
        mesh.line(a, b).unwrap();
        mesh.end(&mut sink).unwrap();

        let bytes = sink.last_vertex_upload().unwrap();
        let floats: Vec<f32> = bytes.chunks_exact(4).map(bytemuck::pod_read_unaligned).collect();
        assert_eq!(floats, [0.1, 0.2, 0.3, 0.4, 0.0, 0.0, 0.0, 1.0]);
    }

    // ── protocol violations ───────────────────────────────────────────────

    #[test]
    fn begin_twice_fails() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        mesh.begin().unwrap();
        assert_eq!(mesh.begin(), Err(MeshError::AlreadyBuilding));
        assert!(mesh.is_building());
    }

    #[test]
    fn end_without_begin_fails() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        assert_eq!(mesh.end(&mut sink), Err(MeshError::NotBuilding { op: "end" }));
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn writes_while_idle_fail() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        assert!(matches!(mesh.vec3(0.0, 0.0, 0.0), Err(MeshError::NotBuilding { op: "vec3" })));
        assert_eq!(mesh.next(), Err(MeshError::NotBuilding { op: "next" }));
        assert_eq!(mesh.triangle(0, 1, 2), Err(MeshError::NotBuilding { op: "triangle" }));
    }

    #[test]
    fn primitive_must_match_draw_mode() {
        let mut sink = RecordingSink::new();
        let mut tris = positions(&mut sink);
        tris.begin().unwrap();
        assert_eq!(
            tris.line(0, 1),
            Err(MeshError::WrongDrawMode { op: "line", mode: DrawMode::Triangles })
        );

        let mut lines = MeshBuilder::new(&mut sink, DrawMode::Lines, &[Attrib::VEC2]).unwrap();
        lines.begin().unwrap();
        assert!(lines.triangle(0, 1, 2).is_err());
        assert!(lines.quad(0, 1, 2, 3).is_err());
        assert_eq!(lines.index_count(), 0);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "layout expects")]
    fn mismatched_attribute_write_asserts_in_debug() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        mesh.begin().unwrap();
        let _ = mesh.vec2(0.0, 0.0);
    }

    // ── quad / empty cycles ───────────────────────────────────────────────

    #[test]
    fn quad_emits_two_triangles() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        mesh.begin().unwrap();
        mesh.quad(1, 2, 3, 4).unwrap();
        mesh.end(&mut sink).unwrap();
        assert_eq!(sink.last_index_upload(), Some(vec![1, 2, 3, 3, 4, 1]));
    }

    #[test]
    fn empty_cycle_skips_upload_and_draw() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        mesh.begin().unwrap();
        mesh.vec3(1.0, 2.0, 3.0).unwrap().next().unwrap();
        mesh.end(&mut sink).unwrap();
        mesh.render(&mut sink);

        assert!(!mesh.is_building());
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn render_while_building_flushes_first() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink);
        mesh.begin().unwrap();
        let a = mesh.vec3(0.0, 0.0, 0.0).unwrap().next().unwrap();
        mesh.triangle(a, a, a).unwrap();
        mesh.render(&mut sink);

        assert!(!mesh.is_building());
        let upload = sink
            .commands()
            .iter()
            .position(|c| matches!(c, GpuCommand::UploadIndexData { .. }));
        let draw = sink
            .commands()
            .iter()
            .position(|c| matches!(c, GpuCommand::DrawIndexed { .. }));
        assert!(upload.is_some() && draw.is_some() && upload < draw);
    }

    // ── growth across cycles ──────────────────────────────────────────────

    #[test]
    fn growth_preserves_vertex_contents() {
        let mut sink = RecordingSink::new();
        let mut mesh = MeshBuilder::with_capacity(
            &mut sink,
            DrawMode::Triangles,
            &[Attrib::VEC2, Attrib::FLOAT],
            MeshCapacity { vertex_primitives: 1, index_primitives: 1 },
        )
        .unwrap();

        let mut expected = Vec::new();
        mesh.begin().unwrap();
        for i in 0..3000u32 {
            let (x, y, w) = (i as f32, -(i as f32), i as f32 * 0.5);
            expected.extend_from_slice(bytemuck::cast_slice(&[x, y, w]));
            mesh.vec2(x, y).unwrap().float(w).unwrap();
            let v = mesh.next().unwrap();
            if v % 3 == 2 {
                mesh.triangle(v - 2, v - 1, v).unwrap();
            }
        }
        mesh.end(&mut sink).unwrap();

        assert_eq!(sink.last_vertex_upload(), Some(expected.as_slice()));
        assert_eq!(mesh.vertex_capacity() % 12, 0);
        assert_eq!(
            sink.last_index_upload(),
            Some((0..3000u32).collect::<Vec<_>>())
        );
    }

    #[test]
    fn repeated_cycles_never_shrink_and_draw_latest() {
        let mut sink = RecordingSink::new();
        let mut mesh = MeshBuilder::with_capacity(
            &mut sink,
            DrawMode::Triangles,
            &[Attrib::VEC3],
            MeshCapacity { vertex_primitives: 1, index_primitives: 1 },
        )
        .unwrap();

        let mut vertex_capacity = mesh.vertex_capacity();
        let mut index_capacity = mesh.index_capacity();
        let mut last_count = 0;

        for cycle in 0..10_000u32 {
            let triangles = cycle % 5 + 1;
            mesh.begin().unwrap();
            for t in 0..triangles {
                let base = t * 3;
                for k in 0..3 {
                    mesh.vec3((base + k) as f32, 0.0, 0.0).unwrap().next().unwrap();
                }
                mesh.triangle(base, base + 1, base + 2).unwrap();
            }
            mesh.end(&mut sink).unwrap();

            assert!(mesh.vertex_capacity() >= vertex_capacity);
            assert!(mesh.index_capacity() >= index_capacity);
            vertex_capacity = mesh.vertex_capacity();
            index_capacity = mesh.index_capacity();
            last_count = triangles * 3;

            sink.take_commands();
        }

        // Largest cycle is 180 vertex bytes and 60 index bytes; both doubled from one primitive.
        assert_eq!(vertex_capacity, 288);
        assert_eq!(index_capacity, 96);

        mesh.render(&mut sink);
        assert_eq!(sink.draw_calls(), vec![(DrawMode::Triangles, last_count)]);
    }

    // ── hooks ─────────────────────────────────────────────────────────────

    struct MarkerHooks;

    impl RenderHooks for MarkerHooks {
        fn before_render(&mut self, gpu: &mut dyn GpuSink) {
            gpu.bind_texture(None, 100);
        }

        fn after_render(&mut self, gpu: &mut dyn GpuSink) {
            gpu.bind_texture(None, 200);
        }
    }

    #[test]
    fn hooks_wrap_the_draw_call() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink).with_hooks(MarkerHooks);
        build_triangle(&mut mesh, &mut sink);
        sink.take_commands();

        mesh.render(&mut sink);
        let commands = sink.take_commands();
        assert_eq!(commands.len(), 5);
        assert_eq!(commands[0], GpuCommand::BindTexture { handle: None, slot: 100 });
        assert!(matches!(commands[1], GpuCommand::BindVertexArray(Some(_))));
        assert!(matches!(commands[2], GpuCommand::DrawIndexed { vertex_array: Some(_), index_count: 3, .. }));
        assert_eq!(commands[3], GpuCommand::BindVertexArray(None));
        assert_eq!(commands[4], GpuCommand::BindTexture { handle: None, slot: 200 });
    }

    #[test]
    fn hooks_do_not_run_without_geometry() {
        let mut sink = RecordingSink::new();
        let mut mesh = positions(&mut sink).with_hooks(MarkerHooks);
        mesh.render(&mut sink);
        assert!(sink.commands().is_empty());
    }

    #[test]
    fn shader_mesh_binds_program_and_defaults() {
        const UNIFORMS: [UniformDecl<'static>; 1] = [UniformDecl::new("time", UniformKind::Float)];
        let mut sink = RecordingSink::new();
        let source = ProgramSource {
            label: "flat",
            vertex: "",
            fragment: "",
            uniforms: &UNIFORMS,
            texture: None,
        };
        let program = Rc::new(
            Program::new(&mut sink, &source)
                .unwrap()
                .with_default("time", UniformValue::Float(0.25)),
        );

        let mut mesh =
            MeshBuilder::with_shader(&mut sink, Rc::clone(&program), DrawMode::Triangles, &[Attrib::VEC3])
                .unwrap();
        build_triangle(&mut mesh, &mut sink);
        sink.take_commands();

        mesh.render(&mut sink);
        let commands = sink.take_commands();
        assert_eq!(commands[0], GpuCommand::UseProgram(Some(program.handle())));
        assert!(matches!(
            commands[1],
            GpuCommand::SetUniform { value: UniformValue::Float(v), .. } if v == 0.25
        ));
        assert!(matches!(commands[3], GpuCommand::DrawIndexed { .. }));
    }

    // ── dispose ───────────────────────────────────────────────────────────

    #[test]
    fn dispose_deletes_gpu_objects() {
        let mut sink = RecordingSink::new();
        let mesh = positions(&mut sink);
        mesh.dispose(&mut sink);

        let deletes = sink
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::DeleteVertexArray(_) | GpuCommand::DeleteBuffer(_)))
            .count();
        assert_eq!(deletes, 3);
    }
}
