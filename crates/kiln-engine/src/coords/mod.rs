//! Small math types fed into vertex writers and uniforms.
//!
//! Conventions:
//! - Column-major matrices, column vectors (`clip = m * v`)
//! - Clip space with +Y up, depth range `[0, 1]`
//! - Colors in linear space

mod color;
mod mat4;
mod vec2;
mod vec3;

pub use color::ColorRgba;
pub use mat4::Mat4;
pub use vec2::Vec2;
pub use vec3::Vec3;
