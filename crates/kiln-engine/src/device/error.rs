use thiserror::Error;

/// Failure while bringing up the GPU for a window.
#[derive(Debug, Error)]
pub enum DeviceError {
    #[error("window has zero size")]
    ZeroSize,

    #[error("failed to create surface: {0}")]
    Surface(#[from] wgpu::CreateSurfaceError),

    #[error("no suitable GPU adapter: {0}")]
    Adapter(#[from] wgpu::RequestAdapterError),

    #[error("failed to open device: {0}")]
    Device(#[from] wgpu::RequestDeviceError),

    #[error("surface reports no supported formats")]
    NoSurfaceFormat,
}

/// What the caller should do after a surface error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SurfaceErrorAction {
    /// Surface was reconfigured; the next frame can render.
    Reconfigured,
    /// Drop this frame only.
    SkipFrame,
    /// Out of memory; shut down.
    Fatal,
}
