//! softgl engine crate.
//!
//! A CPU rasterizer behind a GL-style state machine. A [`Context`] owns
//! buffers, textures, framebuffers and programs; shaders are Rust types
//! implementing [`ShaderSource`] that declare their fields and run once per
//! vertex or fragment. Draw calls fetch attributes, run the vertex stage,
//! rasterize triangles with perspective-correct interpolation, depth test,
//! run the fragment stage and write the result into the bound framebuffer.

pub mod config;
pub mod context;
pub mod draw;
pub mod error;
pub mod logging;
pub mod object;
pub mod resource;
pub mod sampler;
pub mod shader;
pub mod state;

pub use softgl_math as math;

pub use config::ContextConfig;
pub use context::Context;
pub use draw::{DrawStats, IndexType, Primitive};
pub use error::{GlError, LinkError, NotReady, Result, ShaderError};
pub use shader::{DescriptorBuilder, Invocation, ShaderKind, ShaderSource, UniformLocation, Value, ValueKind};
pub use state::{Capability, ClearMask, CullFace, DepthFunc, FrontFace, Viewport};
