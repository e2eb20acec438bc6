use std::cell::RefCell;
use std::collections::HashMap;

use crate::gpu::{GpuSink, ProgramHandle, ProgramSource, UniformLocation, UniformValue};

use super::Shader;

/// Linked program with cached uniform lookups and default uniform values.
///
/// Lookups are cached per name, including misses, so setting an undeclared
/// uniform costs one sink query and is otherwise a no-op.
#[derive(Debug)]
pub struct Program {
    handle: ProgramHandle,
    label: String,
    locations: RefCell<HashMap<String, Option<UniformLocation>>>,
    defaults: Vec<(String, UniformValue)>,
}

impl Program {
    /// Creates the program on `gpu`.
    ///
    /// Returns `None` (with a warning) if the sink cannot create it.
    pub fn new(gpu: &mut dyn GpuSink, source: &ProgramSource<'_>) -> Option<Self> {
        let Some(handle) = gpu.create_program(source) else {
            log::warn!("failed to create shader program '{}'", source.label);
            return None;
        };

        Some(Self {
            handle,
            label: source.label.to_string(),
            locations: RefCell::new(HashMap::new()),
            defaults: Vec::new(),
        })
    }

    /// Adds a value applied by [`Shader::set_defaults`].
    pub fn with_default(mut self, name: impl Into<String>, value: UniformValue) -> Self {
        self.defaults.push((name.into(), value));
        self
    }

    #[inline]
    pub fn handle(&self) -> ProgramHandle {
        self.handle
    }

    #[inline]
    pub fn label(&self) -> &str {
        &self.label
    }

    /// Resolves (and caches) a uniform location.
    pub fn location(&self, gpu: &mut dyn GpuSink, name: &str) -> Option<UniformLocation> {
        if let Some(cached) = self.locations.borrow().get(name) {
            return *cached;
        }

        let location = gpu.uniform_location(self.handle, name);
        if location.is_none() {
            log::debug!("program '{}' has no uniform '{}'", self.label, name);
        }
        self.locations.borrow_mut().insert(name.to_string(), location);
        location
    }

    /// Deletes the GPU program.
    pub fn dispose(self, gpu: &mut dyn GpuSink) {
        gpu.delete_program(self.handle);
    }
}

impl Shader for Program {
    fn bind(&self, gpu: &mut dyn GpuSink) {
        gpu.use_program(Some(self.handle));
    }

    fn set(&self, gpu: &mut dyn GpuSink, name: &str, value: UniformValue) {
        if let Some(location) = self.location(gpu, name) {
            gpu.set_uniform(location, value);
        }
    }

    fn set_defaults(&self, gpu: &mut dyn GpuSink) {
        for (name, value) in &self.defaults {
            self.set(gpu, name, *value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gpu::{GpuCommand, RecordingSink, UniformDecl, UniformKind};

    const UNIFORMS: [UniformDecl<'static>; 2] = [
        UniformDecl::new("transform", UniformKind::Mat4),
        UniformDecl::new("time", UniformKind::Float),
    ];

    fn source() -> ProgramSource<'static> {
        ProgramSource {
            label: "test",
            vertex: "",
            fragment: "",
            uniforms: &UNIFORMS,
            texture: Some("tex"),
        }
    }

    #[test]
    fn new_returns_none_when_sink_fails() {
        let mut sink = RecordingSink::failing();
        assert!(Program::new(&mut sink, &source()).is_none());
    }

    #[test]
    fn bind_uses_program() {
        let mut sink = RecordingSink::new();
        let program = Program::new(&mut sink, &source()).unwrap();
        sink.take_commands();

        program.bind(&mut sink);
        assert_eq!(sink.commands(), &[GpuCommand::UseProgram(Some(program.handle()))]);
    }

    #[test]
    fn set_resolves_declared_uniforms() {
        let mut sink = RecordingSink::new();
        let program = Program::new(&mut sink, &source()).unwrap();
        sink.take_commands();

        program.set_float(&mut sink, "time", 2.5);
        program.set_int(&mut sink, "tex", 3);
        assert_eq!(
            sink.commands(),
            &[
                GpuCommand::SetUniform {
                    location: UniformLocation { program: program.handle(), index: 1 },
                    value: UniformValue::Float(2.5),
                },
                GpuCommand::SetUniform {
                    location: UniformLocation { program: program.handle(), index: 2 },
                    value: UniformValue::Int(3),
                },
            ]
        );
    }

    #[test]
    fn unknown_uniform_is_ignored_and_cached() {
        let mut sink = RecordingSink::new();
        let program = Program::new(&mut sink, &source()).unwrap();
        sink.take_commands();

        program.set_float(&mut sink, "missing", 1.0);
        program.set_float(&mut sink, "missing", 2.0);
        assert!(sink.commands().is_empty());
        assert_eq!(program.locations.borrow().get("missing"), Some(&None));
    }

    #[test]
    fn set_defaults_applies_every_default() {
        let mut sink = RecordingSink::new();
        let program = Program::new(&mut sink, &source())
            .unwrap()
            .with_default("time", UniformValue::Float(0.0))
            .with_default("tex", UniformValue::Sampler(0));
        sink.take_commands();

        program.set_defaults(&mut sink);
        let set_count = sink
            .commands()
            .iter()
            .filter(|c| matches!(c, GpuCommand::SetUniform { .. }))
            .count();
        assert_eq!(set_count, 2);
    }
}
