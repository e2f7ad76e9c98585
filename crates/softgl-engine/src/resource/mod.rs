//! Resource objects: buffers, textures, framebuffers, renderbuffers and
//! vertex arrays.
//!
//! These are plain data holders. Creation, binding and the checks that tie
//! them together live on [`Context`](crate::Context).

mod buffer;
mod framebuffer;
mod renderbuffer;
mod texture;
mod vertex_array;

pub use buffer::{Buffer, BufferTarget, BufferUsage};
pub use framebuffer::{Attachment, AttachmentRef, Framebuffer};
pub use renderbuffer::{Renderbuffer, RenderbufferFormat};
pub use texture::{
    DataType, Filter, Image, PixelFormat, SamplerParams, Texture, TextureParameter, TextureTarget,
    Wrap, MAX_TEXTURE_LEVELS,
};
pub use vertex_array::{AttribType, VertexArray, VertexAttrib};
