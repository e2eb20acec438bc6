use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::num::NonZeroU64;

use thiserror::Error;
use wgpu::util::DeviceExt;

use crate::gpu::{
    BufferHandle, ProgramHandle, ProgramSource, TextureHandle, UniformBlockLayout, UniformLocation,
    UniformValue, VertexArrayHandle, VertexAttribute,
};
use crate::mesh::{Attrib, DrawMode, INDEX_SIZE};
use crate::texture::{TexelData, TextureDesc};

use super::convert;
use super::{RenderCtx, RenderTarget, WgpuSink};

/// Reason a draw call was dropped.
///
/// Dropped draws are logged at debug level; they never abort the frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DrawSkip {
    #[error("no render target")]
    Offscreen,
    #[error("no vertex array bound")]
    NoVertexArray,
    #[error("no program in use")]
    NoProgram,
    #[error("vertex array has no uploaded vertex data")]
    NoVertexData,
    #[error("vertex array has no uploaded index data")]
    NoIndexData,
    #[error("{requested} indices requested, {available} uploaded")]
    IndexRange { requested: u32, available: u64 },
    #[error("attribute {0:?} has no wgpu vertex format")]
    UnsupportedAttribute(Attrib),
    #[error("no texture bound to slot {0}")]
    NoTexture(u32),
}

#[derive(Default)]
struct BufferSlot {
    /// Allocated lazily on first upload; grows, never shrinks.
    buffer: Option<wgpu::Buffer>,
    /// Bytes of the last upload.
    len: u64,
}

#[derive(Default)]
struct VertexArraySlot {
    vertex_buffer: Option<BufferHandle>,
    index_buffer: Option<BufferHandle>,
    /// Sorted by shader location.
    attributes: Vec<(u32, VertexAttribute)>,
}

struct ProgramShader {
    label: String,
    vertex: wgpu::ShaderModule,
    fragment: wgpu::ShaderModule,
    uniform_size: usize,
    has_texture: bool,
}

#[derive(Clone, PartialEq, Eq, Hash)]
struct PipelineKey {
    attributes: Vec<(u32, VertexAttribute)>,
    mode: DrawMode,
    format: wgpu::TextureFormat,
    filterable: bool,
}

struct CachedPipeline {
    pipeline: wgpu::RenderPipeline,
    bind_group_layout: wgpu::BindGroupLayout,
}

struct ProgramSlot {
    shader: ProgramShader,
    uniforms: UniformBlockLayout,
    /// CPU copy of the uniform block, copied into a fresh buffer per draw.
    uniform_data: Vec<u8>,
    texture: Option<String>,
    sampler_slot: u32,
    pipelines: HashMap<PipelineKey, CachedPipeline>,
}

struct TextureSlot {
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    sampler: wgpu::Sampler,
    filterable: bool,
}

/// Registry of every GPU object created through a [`WgpuSink`], plus bind state.
///
/// Handles are plain ids; the backend maps them to wgpu objects and builds render
/// pipelines on demand, cached per program, vertex layout, draw mode, target
/// format and texture filterability.
#[derive(Default)]
pub struct WgpuBackend {
    next_id: u32,

    buffers: HashMap<BufferHandle, BufferSlot>,
    vertex_arrays: HashMap<VertexArrayHandle, VertexArraySlot>,
    programs: HashMap<ProgramHandle, ProgramSlot>,
    textures: HashMap<TextureHandle, TextureSlot>,

    bound_vertex_array: Option<VertexArrayHandle>,
    bound_vertex_buffer: Option<BufferHandle>,
    bound_index_buffer: Option<BufferHandle>,
    current_program: Option<ProgramHandle>,
    /// Texture slot -> bound texture.
    texture_units: HashMap<u32, TextureHandle>,
}

impl WgpuBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lends the backend out for one frame, drawing into `target`.
    pub fn sink<'s, 'c>(
        &'s mut self,
        ctx: &'s RenderCtx<'c>,
        target: &'s mut RenderTarget<'c>,
    ) -> WgpuSink<'s, 'c> {
        WgpuSink::new(self, ctx, target)
    }

    /// Lends the backend out without a target (setup, uploads); draws are dropped.
    pub fn offscreen<'s, 'c>(&'s mut self, ctx: &'s RenderCtx<'c>) -> WgpuSink<'s, 'c> {
        WgpuSink::offscreen(self, ctx)
    }

    /// Number of live GPU objects (buffers, vertex arrays, programs, textures).
    pub fn object_count(&self) -> usize {
        self.buffers.len() + self.vertex_arrays.len() + self.programs.len() + self.textures.len()
    }

    fn alloc_id(&mut self) -> u32 {
        self.next_id += 1;
        self.next_id
    }

    // ── objects ───────────────────────────────────────────────────────────

    pub(super) fn create_vertex_array(&mut self) -> VertexArrayHandle {
        let handle = VertexArrayHandle::from_raw(self.alloc_id());
        self.vertex_arrays.insert(handle, VertexArraySlot::default());
        handle
    }

    pub(super) fn create_buffer(&mut self) -> BufferHandle {
        let handle = BufferHandle::from_raw(self.alloc_id());
        self.buffers.insert(handle, BufferSlot::default());
        handle
    }

    pub(super) fn delete_vertex_array(&mut self, handle: VertexArrayHandle) {
        self.vertex_arrays.remove(&handle);
        if self.bound_vertex_array == Some(handle) {
            self.bound_vertex_array = None;
        }
    }

    pub(super) fn delete_buffer(&mut self, handle: BufferHandle) {
        // Dropped, not destroyed: commands already encoded this frame may still
        // reference the buffer.
        self.buffers.remove(&handle);
        if self.bound_vertex_buffer == Some(handle) {
            self.bound_vertex_buffer = None;
        }
        if self.bound_index_buffer == Some(handle) {
            self.bound_index_buffer = None;
        }
    }

    // ── binding ───────────────────────────────────────────────────────────

    pub(super) fn bind_vertex_array(&mut self, handle: Option<VertexArrayHandle>) {
        self.bound_vertex_array = handle;
    }

    pub(super) fn bind_vertex_buffer(&mut self, handle: Option<BufferHandle>) {
        self.bound_vertex_buffer = handle;
    }

    pub(super) fn bind_index_buffer(&mut self, handle: Option<BufferHandle>) {
        self.bound_index_buffer = handle;
        if let Some(vao) = self.bound_vertex_array_mut() {
            vao.index_buffer = handle;
        }
    }

    pub(super) fn vertex_attribute(&mut self, location: u32, attribute: &VertexAttribute) {
        let vertex_buffer = self.bound_vertex_buffer;
        let Some(vao) = self.bound_vertex_array_mut() else {
            log::debug!("vertex attribute {location} recorded with no vertex array bound");
            return;
        };

        if vao.vertex_buffer.is_some() && vao.vertex_buffer != vertex_buffer {
            log::warn!("vertex array attributes span several buffers; only the last one is used");
        }
        vao.vertex_buffer = vertex_buffer;

        match vao.attributes.binary_search_by_key(&location, |(l, _)| *l) {
            Ok(i) => vao.attributes[i].1 = *attribute,
            Err(i) => vao.attributes.insert(i, (location, *attribute)),
        }
    }

    fn bound_vertex_array_mut(&mut self) -> Option<&mut VertexArraySlot> {
        self.bound_vertex_array
            .and_then(|h| self.vertex_arrays.get_mut(&h))
    }

    // ── data ──────────────────────────────────────────────────────────────

    pub(super) fn upload_vertex_data(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8]) {
        self.upload(ctx, self.bound_vertex_buffer, bytes, "vertex");
    }

    pub(super) fn upload_index_data(&mut self, ctx: &RenderCtx<'_>, bytes: &[u8]) {
        self.upload(ctx, self.bound_index_buffer, bytes, "index");
    }

    fn upload(
        &mut self,
        ctx: &RenderCtx<'_>,
        handle: Option<BufferHandle>,
        bytes: &[u8],
        what: &'static str,
    ) {
        let Some(handle) = handle else {
            log::debug!("{what} upload with no buffer bound; ignored");
            return;
        };
        let Some(slot) = self.buffers.get_mut(&handle) else {
            log::debug!("{what} upload to deleted buffer {}; ignored", handle.raw());
            return;
        };

        slot.len = bytes.len() as u64;
        if bytes.is_empty() {
            return;
        }

        let padded = convert::pad_to_copy_alignment(bytes);
        let required = padded.len() as u64;

        if slot.buffer.as_ref().is_none_or(|b| b.size() < required) {
            let max = ctx.device.limits().max_buffer_size;
            let Some(size) = convert::buffer_size_within(required, max) else {
                log::warn!(
                    "{what} buffer {}: {required} bytes exceed the device limit of {max}; upload dropped",
                    handle.raw()
                );
                slot.len = 0;
                return;
            };
            log::debug!("{what} buffer {}: allocating {size} bytes", handle.raw());

            // The old buffer is dropped; wgpu keeps it alive for pending work.
            slot.buffer = Some(ctx.device.create_buffer(&wgpu::BufferDescriptor {
                label: Some("kiln mesh buffer"),
                size,
                usage: wgpu::BufferUsages::VERTEX
                    | wgpu::BufferUsages::INDEX
                    | wgpu::BufferUsages::COPY_DST,
                mapped_at_creation: false,
            }));
        }

        if let Some(buffer) = slot.buffer.as_ref() {
            ctx.queue.write_buffer(buffer, 0, &padded);
        }
    }

    // ── programs ──────────────────────────────────────────────────────────

    pub(super) fn create_program(
        &mut self,
        ctx: &RenderCtx<'_>,
        source: &ProgramSource<'_>,
    ) -> Option<ProgramHandle> {
        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let vertex = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label),
            source: wgpu::ShaderSource::Wgsl(source.vertex.into()),
        });
        let fragment = ctx.device.create_shader_module(wgpu::ShaderModuleDescriptor {
            label: Some(source.label),
            source: wgpu::ShaderSource::Wgsl(source.fragment.into()),
        });
        if let Some(err) = pollster::block_on(scope.pop()) {
            log::warn!("shader program '{}' failed to compile: {err}", source.label);
            return None;
        }

        let uniforms = UniformBlockLayout::new(source.uniforms);
        let handle = ProgramHandle::from_raw(self.alloc_id());

        self.programs.insert(
            handle,
            ProgramSlot {
                shader: ProgramShader {
                    label: source.label.to_string(),
                    vertex,
                    fragment,
                    uniform_size: uniforms.size(),
                    has_texture: source.texture.is_some(),
                },
                uniform_data: vec![0; uniforms.size()],
                uniforms,
                texture: source.texture.map(str::to_string),
                sampler_slot: 0,
                pipelines: HashMap::new(),
            },
        );
        Some(handle)
    }

    pub(super) fn delete_program(&mut self, handle: ProgramHandle) {
        self.programs.remove(&handle);
        if self.current_program == Some(handle) {
            self.current_program = None;
        }
    }

    pub(super) fn use_program(&mut self, handle: Option<ProgramHandle>) {
        self.current_program = handle;
    }

    /// Block members resolve to their index; the texture resolves to one past the
    /// last member.
    pub(super) fn uniform_location(
        &self,
        program: ProgramHandle,
        name: &str,
    ) -> Option<UniformLocation> {
        let slot = self.programs.get(&program)?;
        let index = slot.uniforms.index_of(name).or_else(|| {
            (slot.texture.as_deref() == Some(name)).then(|| slot.uniforms.slots().len())
        })?;
        Some(UniformLocation {
            program,
            index: index as u32,
        })
    }

    pub(super) fn set_uniform(&mut self, location: UniformLocation, value: UniformValue) {
        let Some(program) = self.programs.get_mut(&location.program) else {
            return;
        };
        let index = location.index as usize;

        if let Some(slot) = program.uniforms.slot(index) {
            if value.kind() != Some(slot.kind) {
                log::debug!(
                    "program '{}': uniform '{}' is {:?}, got {:?}",
                    program.shader.label,
                    slot.name,
                    slot.kind,
                    value
                );
                return;
            }
            let bytes = value.to_bytes();
            program.uniform_data[slot.offset..slot.offset + bytes.len()].copy_from_slice(&bytes);
            return;
        }

        if index == program.uniforms.slots().len() && program.texture.is_some() {
            match value {
                UniformValue::Sampler(unit) => program.sampler_slot = unit,
                UniformValue::Int(unit) if unit >= 0 => program.sampler_slot = unit as u32,
                other => log::debug!(
                    "program '{}': texture uniform expects a slot, got {:?}",
                    program.shader.label,
                    other
                ),
            }
        }
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub(super) fn create_texture(
        &mut self,
        ctx: &RenderCtx<'_>,
        desc: &TextureDesc,
        texels: TexelData<'_>,
    ) -> Option<TextureHandle> {
        let limits = ctx.device.limits();
        if !convert::texture_within_limits(desc, &limits) {
            log::warn!(
                "texture {}x{} exceeds the device limit of {} texels per side",
                desc.width,
                desc.height,
                limits.max_texture_dimension_2d
            );
            return None;
        }

        let Some(upload) = convert::texture_upload(desc, texels) else {
            log::warn!(
                "texture {}x{} {:?}: texel data does not match",
                desc.width,
                desc.height,
                desc.format
            );
            return None;
        };

        let scope = ctx.device.push_error_scope(wgpu::ErrorFilter::Validation);
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some("kiln texture"),
            size: wgpu::Extent3d {
                width: desc.width,
                height: desc.height,
                depth_or_array_layers: 1,
            },
            mip_level_count: upload.levels.len() as u32,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: upload.format,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (mip, level) in upload.levels.iter().enumerate() {
            ctx.queue.write_texture(
                wgpu::TexelCopyTextureInfo {
                    texture: &texture,
                    mip_level: mip as u32,
                    origin: wgpu::Origin3d::ZERO,
                    aspect: wgpu::TextureAspect::All,
                },
                &level.bytes,
                wgpu::TexelCopyBufferLayout {
                    offset: 0,
                    bytes_per_row: Some(level.width * upload.bytes_per_texel),
                    rows_per_image: Some(level.height),
                },
                wgpu::Extent3d {
                    width: level.width,
                    height: level.height,
                    depth_or_array_layers: 1,
                },
            );
        }

        if let Some(err) = pollster::block_on(scope.pop()) {
            log::warn!("texture {}x{} {:?}: {err}", desc.width, desc.height, desc.format);
            return None;
        }

        let (min_filter, mag_filter, mipmap_filter) =
            convert::sampler_filters(desc.min_filter, desc.mag_filter, upload.filterable);
        let sampler = ctx.device.create_sampler(&wgpu::SamplerDescriptor {
            label: Some("kiln texture sampler"),
            address_mode_u: wgpu::AddressMode::Repeat,
            address_mode_v: wgpu::AddressMode::Repeat,
            address_mode_w: wgpu::AddressMode::Repeat,
            mag_filter,
            min_filter,
            mipmap_filter,
            ..Default::default()
        });

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let handle = TextureHandle::from_raw(self.alloc_id());
        self.textures.insert(
            handle,
            TextureSlot {
                _texture: texture,
                view,
                sampler,
                filterable: upload.filterable,
            },
        );
        Some(handle)
    }

    pub(super) fn delete_texture(&mut self, handle: TextureHandle) {
        self.textures.remove(&handle);
        self.texture_units.retain(|_, bound| *bound != handle);
    }

    pub(super) fn bind_texture(&mut self, handle: Option<TextureHandle>, slot: u32) {
        match handle {
            Some(h) => {
                self.texture_units.insert(slot, h);
            }
            None => {
                self.texture_units.remove(&slot);
            }
        }
    }

    // ── draw ──────────────────────────────────────────────────────────────

    /// Encodes one indexed draw of the bound vertex array with the current program.
    pub(super) fn draw(
        &mut self,
        ctx: &RenderCtx<'_>,
        target: &mut RenderTarget<'_>,
        mode: DrawMode,
        index_count: u32,
    ) -> Result<(), DrawSkip> {
        let vao = self
            .bound_vertex_array
            .and_then(|h| self.vertex_arrays.get(&h))
            .ok_or(DrawSkip::NoVertexArray)?;

        let vertex_buffer = vao
            .vertex_buffer
            .and_then(|h| self.buffers.get(&h))
            .filter(|slot| slot.len > 0)
            .and_then(|slot| slot.buffer.as_ref())
            .ok_or(DrawSkip::NoVertexData)?;

        let index_slot = vao
            .index_buffer
            .and_then(|h| self.buffers.get(&h))
            .ok_or(DrawSkip::NoIndexData)?;
        let index_buffer = index_slot.buffer.as_ref().ok_or(DrawSkip::NoIndexData)?;
        let available = index_slot.len / INDEX_SIZE as u64;
        if u64::from(index_count) > available {
            return Err(DrawSkip::IndexRange {
                requested: index_count,
                available,
            });
        }

        let program = self
            .current_program
            .and_then(|h| self.programs.get_mut(&h))
            .ok_or(DrawSkip::NoProgram)?;

        let texture = match program.texture {
            Some(_) => Some(
                self.texture_units
                    .get(&program.sampler_slot)
                    .and_then(|h| self.textures.get(h))
                    .ok_or(DrawSkip::NoTexture(program.sampler_slot))?,
            ),
            None => None,
        };

        let key = PipelineKey {
            attributes: vao.attributes.clone(),
            mode,
            format: ctx.surface_format,
            filterable: texture.is_none_or(|t| t.filterable),
        };
        let cached = match program.pipelines.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(e) => {
                let built = build_pipeline(ctx, &program.shader, e.key())?;
                e.insert(built)
            }
        };

        let uniform_buffer = (!program.uniform_data.is_empty()).then(|| {
            ctx.device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some("kiln uniforms"),
                contents: &program.uniform_data,
                usage: wgpu::BufferUsages::UNIFORM,
            })
        });

        let mut entries = Vec::with_capacity(3);
        if let Some(buffer) = uniform_buffer.as_ref() {
            entries.push(wgpu::BindGroupEntry {
                binding: 0,
                resource: buffer.as_entire_binding(),
            });
        }
        if let Some(texture) = texture {
            entries.push(wgpu::BindGroupEntry {
                binding: 1,
                resource: wgpu::BindingResource::TextureView(&texture.view),
            });
            entries.push(wgpu::BindGroupEntry {
                binding: 2,
                resource: wgpu::BindingResource::Sampler(&texture.sampler),
            });
        }

        let bind_group = ctx.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("kiln mesh bind group"),
            layout: &cached.bind_group_layout,
            entries: &entries,
        });

        let mut rpass = target.color_pass("kiln mesh pass", wgpu::LoadOp::Load);

        rpass.set_pipeline(&cached.pipeline);
        rpass.set_bind_group(0, &bind_group, &[]);
        rpass.set_vertex_buffer(0, vertex_buffer.slice(..));
        rpass.set_index_buffer(index_buffer.slice(..), wgpu::IndexFormat::Uint32);
        rpass.draw_indexed(0..index_count, 0, 0..1);

        Ok(())
    }
}

fn build_pipeline(
    ctx: &RenderCtx<'_>,
    shader: &ProgramShader,
    key: &PipelineKey,
) -> Result<CachedPipeline, DrawSkip> {
    let attributes = key
        .attributes
        .iter()
        .map(|(location, a)| {
            let format =
                convert::vertex_format(a.attrib).ok_or(DrawSkip::UnsupportedAttribute(a.attrib))?;
            Ok(wgpu::VertexAttribute {
                format,
                offset: u64::from(a.offset),
                shader_location: *location,
            })
        })
        .collect::<Result<Vec<_>, DrawSkip>>()?;
    let stride = key.attributes.first().map_or(0, |(_, a)| u64::from(a.stride));

    log::debug!(
        "building pipeline for '{}' ({:?}, {:?}, stride {})",
        shader.label,
        key.mode,
        key.format,
        stride
    );

    let mut layout_entries = Vec::with_capacity(3);
    if let Some(size) = NonZeroU64::new(shader.uniform_size as u64) {
        layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 0,
            visibility: wgpu::ShaderStages::VERTEX_FRAGMENT,
            ty: wgpu::BindingType::Buffer {
                ty: wgpu::BufferBindingType::Uniform,
                has_dynamic_offset: false,
                min_binding_size: Some(size),
            },
            count: None,
        });
    }
    if shader.has_texture {
        layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 1,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Texture {
                sample_type: wgpu::TextureSampleType::Float {
                    filterable: key.filterable,
                },
                view_dimension: wgpu::TextureViewDimension::D2,
                multisampled: false,
            },
            count: None,
        });
        layout_entries.push(wgpu::BindGroupLayoutEntry {
            binding: 2,
            visibility: wgpu::ShaderStages::FRAGMENT,
            ty: wgpu::BindingType::Sampler(if key.filterable {
                wgpu::SamplerBindingType::Filtering
            } else {
                wgpu::SamplerBindingType::NonFiltering
            }),
            count: None,
        });
    }

    let bind_group_layout = ctx
        .device
        .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
            label: Some("kiln mesh bgl"),
            entries: &layout_entries,
        });

    let pipeline_layout = ctx
        .device
        .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
            label: Some("kiln mesh pipeline layout"),
            bind_group_layouts: &[&bind_group_layout],
            immediate_size: 0,
        });

    let pipeline = ctx
        .device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(shader.label.as_str()),
            layout: Some(&pipeline_layout),

            vertex: wgpu::VertexState {
                module: &shader.vertex,
                entry_point: Some("vs_main"),
                compilation_options: Default::default(),
                buffers: &[wgpu::VertexBufferLayout {
                    array_stride: stride,
                    step_mode: wgpu::VertexStepMode::Vertex,
                    attributes: &attributes,
                }],
            },

            fragment: Some(wgpu::FragmentState {
                module: &shader.fragment,
                entry_point: Some("fs_main"),
                compilation_options: Default::default(),
                targets: &[Some(wgpu::ColorTargetState {
                    format: key.format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
            }),

            primitive: wgpu::PrimitiveState {
                topology: convert::topology(key.mode),
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode: None,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },

            depth_stencil: None,
            multisample: wgpu::MultisampleState::default(),
            multiview_mask: None,
            cache: None,
        });

    Ok(CachedPipeline {
        pipeline,
        bind_group_layout,
    })
}
