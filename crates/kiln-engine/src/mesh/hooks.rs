use crate::gpu::GpuSink;
use crate::shader::Shader;

/// Callbacks invoked around a mesh's draw call.
///
/// Both default to no-ops. They only run when the mesh actually draws.
pub trait RenderHooks {
    fn before_render(&mut self, gpu: &mut dyn GpuSink) {
        let _ = gpu;
    }

    fn after_render(&mut self, gpu: &mut dyn GpuSink) {
        let _ = gpu;
    }
}

/// Binds a shader and applies its default uniforms right before drawing.
#[derive(Debug)]
pub struct ShaderHooks<S> {
    shader: S,
}

impl<S: Shader> ShaderHooks<S> {
    pub fn new(shader: S) -> Self {
        Self { shader }
    }

    #[inline]
    pub fn shader(&self) -> &S {
        &self.shader
    }
}

impl<S: Shader> RenderHooks for ShaderHooks<S> {
    fn before_render(&mut self, gpu: &mut dyn GpuSink) {
        self.shader.bind(gpu);
        self.shader.set_defaults(gpu);
    }
}
