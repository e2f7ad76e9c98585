//! Pipeline state: bindings, toggles and fixed-function settings.
//!
//! Owned by a [`Context`](crate::Context) and read by the draw engine at the
//! start of every draw call.

mod pipeline;

pub use pipeline::{
    Capability, ClearMask, CullFace, DepthFunc, FrontFace, PipelineState, Viewport,
};
