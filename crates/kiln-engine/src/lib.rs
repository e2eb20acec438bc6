//! Kiln engine crate.
//!
//! Dynamic mesh assembly on top of a small platform layer. The [`mesh`] module
//! builds interleaved vertex and index data on the CPU and hands it to a
//! [`gpu::GpuSink`]; [`render`] provides the wgpu implementation of that sink, and
//! [`window`] drives a winit event loop around it.

pub mod device;
pub mod window;
pub mod time;
pub mod core;

pub mod logging;
pub mod coords;
pub mod gpu;
pub mod mesh;
pub mod render;
pub mod shader;
pub mod texture;
