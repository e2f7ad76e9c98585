//! Math primitives for the softgl rasterizer.
//!
//! Plain `Copy` value types. Vectors and matrices are `#[repr(C)]` and
//! `bytemuck::Pod` so shader registers and vertex buffers can move them as
//! raw bytes.

mod geom;
mod mat;
mod vec;

pub use geom::{edge_function, nonzero_w, Box2, Triangle};
pub use mat::{Mat3, Mat4};
pub use vec::{clamp, Vec2, Vec3, Vec4};
