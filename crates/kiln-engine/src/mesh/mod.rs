//! Dynamic mesh assembly.
//!
//! A [`MeshBuilder`] packs interleaved vertex records and 32-bit indices into
//! CPU-side [`GrowableBuffer`]s, then uploads them to a
//! [`GpuSink`](crate::gpu::GpuSink) once per build cycle. Buffers are reused
//! across cycles and only grow, so steady-state rebuilding does not allocate.

mod buffer;
mod builder;
mod error;
mod hooks;
mod index;
mod layout;
mod mode;
mod vertex;

pub use buffer::GrowableBuffer;
pub use builder::{MeshBuilder, MeshCapacity};
pub use error::MeshError;
pub use hooks::{RenderHooks, ShaderHooks};
pub use index::{INDEX_SIZE, IndexBuffer};
pub use layout::{Attrib, AttributeLayout, ElementType, LayoutEntry};
pub use mode::DrawMode;
pub use vertex::VertexBuffer;
