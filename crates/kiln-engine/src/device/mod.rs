//! GPU device + surface management.
//!
//! [`Gpu`] opens a wgpu device for one window, keeps its surface configured and
//! hands out one [`GpuFrame`] (encoder + view) per redraw.

mod config;
mod context;
mod error;
mod surface;

pub use config::GpuInit;
pub use context::{Gpu, GpuFrame};
pub use error::{DeviceError, SurfaceErrorAction};
