//! Graphics binding interface.
//!
//! Everything that touches GPU objects goes through a [`GpuSink`] passed in
//! explicitly by the caller; there is no global renderer instance. Backends:
//! - [`RecordingSink`]: headless command recorder (tests, tooling)
//! - `render::WgpuSink`: wgpu-backed implementation

mod handle;
mod recording;
mod sink;
mod uniform;

pub use handle::{BufferHandle, ProgramHandle, TextureHandle, UniformLocation, VertexArrayHandle};
pub use recording::{GpuCommand, RecordingSink};
pub use sink::{GpuSink, ProgramSource, VertexAttribute};
pub use uniform::{UniformBlockLayout, UniformDecl, UniformKind, UniformSlot, UniformValue};
