//! wgpu implementation of [`GpuSink`](crate::gpu::GpuSink).
//!
//! [`WgpuBackend`] lives as long as the application and owns every GPU object
//! created through it. Each frame, [`WgpuBackend::sink`] lends it out as a
//! [`WgpuSink`] bound to that frame's [`RenderCtx`] and [`RenderTarget`].
//!
//! Conventions:
//! - Uploads use `Queue::write_buffer` and land at submission, so a mesh should
//!   be rebuilt at most once per frame.
//! - Every draw opens its own render pass with `LoadOp::Load`.

mod backend;
mod convert;
mod ctx;
mod sink;

pub use backend::{DrawSkip, WgpuBackend};
pub use ctx::{RenderCtx, RenderTarget};
pub use sink::WgpuSink;
