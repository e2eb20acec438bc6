use std::f32::consts::TAU;
use std::path::Path;
use std::rc::Rc;

use kiln_engine::coords::{ColorRgba, Mat4, Vec2, Vec3};
use kiln_engine::gpu::{GpuSink, ProgramSource, UniformDecl, UniformKind, UniformValue};
use kiln_engine::mesh::{Attrib, DrawMode, MeshBuilder, MeshError};
use kiln_engine::shader::{Program, Shader};
use kiln_engine::texture::{MagFilter, MinFilter, TexelData, Texture, TextureFormat};
use kiln_engine::time::FrameTime;

const FLAT_WGSL: &str = include_str!("shaders/flat.wgsl");
const TEXTURED_WGSL: &str = include_str!("shaders/textured.wgsl");

const UNIFORMS: [UniformDecl<'static>; 2] = [
    UniformDecl::new("transform", UniformKind::Mat4),
    UniformDecl::new("time", UniformKind::Float),
];

const HEX_SIDES: u32 = 6;
const GRID_HALF_LINES: i32 = 8;
const GRID_STEP: f32 = 0.25;
const CHECKER_SIZE: u32 = 64;

/// Everything drawn by the studio window.
pub struct Scene {
    flat: Rc<Program>,
    textured: Rc<Program>,

    /// Rebuilt every frame.
    fan: MeshBuilder,
    /// Built once at setup.
    grid: MeshBuilder,
    quad: MeshBuilder,

    texture: Texture,
}

impl Scene {
    /// Creates programs, meshes and the quad texture; `None` if any GPU object fails.
    pub fn new(gpu: &mut dyn GpuSink, texture_path: Option<&Path>) -> Option<Self> {
        let flat = Rc::new(Program::new(
            gpu,
            &ProgramSource {
                label: "flat",
                vertex: FLAT_WGSL,
                fragment: FLAT_WGSL,
                uniforms: &UNIFORMS,
                texture: None,
            },
        )?);

        let textured = Rc::new(
            Program::new(
                gpu,
                &ProgramSource {
                    label: "textured",
                    vertex: TEXTURED_WGSL,
                    fragment: TEXTURED_WGSL,
                    uniforms: &UNIFORMS,
                    texture: Some("tex"),
                },
            )?
            .with_default("tex", UniformValue::Sampler(0)),
        );

        let colored = [Attrib::VEC2, Attrib::VEC4];
        let fan = MeshBuilder::with_shader(gpu, Rc::clone(&flat), DrawMode::Triangles, &colored)?;
        let mut grid = MeshBuilder::with_shader(gpu, Rc::clone(&flat), DrawMode::Lines, &colored)?;
        let mut quad = MeshBuilder::with_shader(
            gpu,
            Rc::clone(&textured),
            DrawMode::Triangles,
            &[Attrib::VEC2, Attrib::VEC2],
        )?;

        let texture = texture_path
            .and_then(|path| {
                Texture::from_file(
                    gpu,
                    path,
                    TextureFormat::Rgba,
                    MinFilter::MipMapLinear,
                    MagFilter::Linear,
                )
            })
            .or_else(|| checker_texture(gpu))?;

        if let Err(e) = build_grid(gpu, &mut grid).and_then(|()| build_quad(gpu, &mut quad)) {
            log::error!("static mesh setup failed: {e}");
            return None;
        }

        log::info!(
            "scene ready: grid {} indices, quad {}x{} texture",
            grid.index_count(),
            texture.width(),
            texture.height()
        );

        Some(Self {
            flat,
            textured,
            fan,
            grid,
            quad,
            texture,
        })
    }

    /// Rebuilds the dynamic mesh and draws the frame.
    pub fn draw(
        &mut self,
        gpu: &mut dyn GpuSink,
        time: FrameTime,
        width: f32,
        height: f32,
    ) -> Result<(), MeshError> {
        let projection = Mat4::fit_aspect(width, height, 1.2);

        // Uniforms are captured per draw, so the shared program can change
        // transform between the grid and the fan.
        self.flat.set_float(gpu, "time", time.elapsed);
        self.flat.set_mat4(gpu, "transform", projection.to_cols_array());
        self.grid.render(gpu);

        build_fan(gpu, &mut self.fan, time.elapsed)?;
        let spin = projection * Mat4::rotation_z(time.elapsed * 0.5);
        self.flat.set_mat4(gpu, "transform", spin.to_cols_array());
        self.fan.render(gpu);

        let placed = projection
            * Mat4::translation(Vec3::new(0.75, -0.55, 0.0))
            * Mat4::scale(Vec3::new(0.35, 0.35, 1.0));
        self.textured.set_float(gpu, "time", time.elapsed);
        self.textured.set_mat4(gpu, "transform", placed.to_cols_array());
        self.texture.bind(gpu);
        self.quad.render(gpu);

        Ok(())
    }

    pub fn dispose(self, gpu: &mut dyn GpuSink) {
        self.fan.dispose(gpu);
        self.grid.dispose(gpu);
        self.quad.dispose(gpu);
        self.texture.dispose(gpu);
        if let Ok(flat) = Rc::try_unwrap(self.flat) {
            flat.dispose(gpu);
        }
        if let Ok(textured) = Rc::try_unwrap(self.textured) {
            textured.dispose(gpu);
        }
    }
}

/// Hexagon fan around a white center, hues cycling with time.
fn build_fan(gpu: &mut dyn GpuSink, mesh: &mut MeshBuilder, t: f32) -> Result<(), MeshError> {
    mesh.begin()?;

    let center = mesh.vec2(0.0, 0.0)?.color(ColorRgba::white())?.next()?;
    let radius = 0.6 + 0.08 * (t * 1.7).sin();

    let mut ring = Vec::with_capacity(HEX_SIDES as usize);
    for i in 0..HEX_SIDES {
        let turn = i as f32 / HEX_SIDES as f32;
        let p = Vec2::from_angle(turn * TAU) * radius;
        let color = ColorRgba::from_hue(turn + t * 0.1);
        ring.push(mesh.vec2_from(p)?.color(color)?.next()?);
    }

    for i in 0..ring.len() {
        mesh.triangle(center, ring[i], ring[(i + 1) % ring.len()])?;
    }

    mesh.end(gpu)
}

fn build_grid(gpu: &mut dyn GpuSink, mesh: &mut MeshBuilder) -> Result<(), MeshError> {
    let extent = GRID_HALF_LINES as f32 * GRID_STEP;
    let minor = ColorRgba::new(0.5, 0.5, 0.55, 0.25);
    let axis = ColorRgba::new(0.8, 0.8, 0.85, 0.6);

    mesh.begin()?;
    for i in -GRID_HALF_LINES..=GRID_HALF_LINES {
        let c = i as f32 * GRID_STEP;
        let color = if i == 0 { axis } else { minor };

        let a = mesh.vec2(c, -extent)?.color(color)?.next()?;
        let b = mesh.vec2(c, extent)?.color(color)?.next()?;
        mesh.line(a, b)?;

        let a = mesh.vec2(-extent, c)?.color(color)?.next()?;
        let b = mesh.vec2(extent, c)?.color(color)?.next()?;
        mesh.line(a, b)?;
    }
    mesh.end(gpu)
}

/// Unit quad centered on the origin with `[0, 1]` texture coordinates.
fn build_quad(gpu: &mut dyn GpuSink, mesh: &mut MeshBuilder) -> Result<(), MeshError> {
    mesh.begin()?;
    let bl = mesh.vec2(-1.0, -1.0)?.vec2(0.0, 0.0)?.next()?;
    let br = mesh.vec2(1.0, -1.0)?.vec2(1.0, 0.0)?.next()?;
    let tr = mesh.vec2(1.0, 1.0)?.vec2(1.0, 1.0)?.next()?;
    let tl = mesh.vec2(-1.0, 1.0)?.vec2(0.0, 1.0)?.next()?;
    mesh.quad(bl, br, tr, tl)?;
    mesh.end(gpu)
}

fn checker_texture(gpu: &mut dyn GpuSink) -> Option<Texture> {
    let light = [230u8, 225, 210, 255];
    let dark = [60u8, 70, 95, 255];

    let mut texels = Vec::with_capacity((CHECKER_SIZE * CHECKER_SIZE * 4) as usize);
    for y in 0..CHECKER_SIZE {
        for x in 0..CHECKER_SIZE {
            let cell = (x / 8 + y / 8) % 2 == 0;
            texels.extend_from_slice(if cell { &light } else { &dark });
        }
    }

    Texture::from_pixels(
        gpu,
        CHECKER_SIZE,
        CHECKER_SIZE,
        TexelData::U8(&texels),
        TextureFormat::Rgba,
        MinFilter::MipMapLinear,
        MagFilter::Nearest,
    )
}
