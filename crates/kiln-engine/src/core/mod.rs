//! Contract between the runtime loop and applications.
//!
//! Applications implement [`App`]; the runtime hands them a [`FrameCtx`] per
//! redraw.

mod app;
mod ctx;

pub use app::{App, AppControl};
pub use ctx::{FrameCtx, WindowCtx};
