//! Shader programs.
//!
//! Meshes only see the [`Shader`] trait (bind + defaults before drawing). [`Program`]
//! is the stock implementation over a [`GpuSink`](crate::gpu::GpuSink).

mod program;

use std::rc::Rc;

use crate::gpu::{GpuSink, UniformValue};
use crate::texture::Texture;

pub use program::Program;

/// Bindable shader with named uniforms.
pub trait Shader {
    /// Makes the program current.
    fn bind(&self, gpu: &mut dyn GpuSink);

    /// Assigns a uniform by name; unknown names are ignored.
    fn set(&self, gpu: &mut dyn GpuSink, name: &str, value: UniformValue);

    /// Applies the program's default uniform values.
    fn set_defaults(&self, gpu: &mut dyn GpuSink) {
        let _ = gpu;
    }

    fn set_int(&self, gpu: &mut dyn GpuSink, name: &str, v: i32) {
        self.set(gpu, name, UniformValue::Int(v));
    }

    fn set_float(&self, gpu: &mut dyn GpuSink, name: &str, v: f32) {
        self.set(gpu, name, UniformValue::Float(v));
    }

    fn set_vec2(&self, gpu: &mut dyn GpuSink, name: &str, x: f32, y: f32) {
        self.set(gpu, name, UniformValue::Vec2([x, y]));
    }

    fn set_mat4(&self, gpu: &mut dyn GpuSink, name: &str, m: [[f32; 4]; 4]) {
        self.set(gpu, name, UniformValue::Mat4(m));
    }

    /// Points a sampler uniform at the slot the texture was last bound to.
    fn set_texture(&self, gpu: &mut dyn GpuSink, name: &str, texture: &Texture) {
        self.set(gpu, name, UniformValue::Sampler(texture.slot()));
    }
}

impl<T: Shader + ?Sized> Shader for Rc<T> {
    fn bind(&self, gpu: &mut dyn GpuSink) {
        (**self).bind(gpu);
    }

    fn set(&self, gpu: &mut dyn GpuSink, name: &str, value: UniformValue) {
        (**self).set(gpu, name, value);
    }

    fn set_defaults(&self, gpu: &mut dyn GpuSink) {
        (**self).set_defaults(gpu);
    }
}
