use crate::object::TextureId;

use super::texture::{DataType, PixelFormat};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderbufferFormat {
    DepthComponent32F,
    Rgba8,
}

impl RenderbufferFormat {
    pub const fn layout(self) -> (PixelFormat, DataType) {
        match self {
            RenderbufferFormat::DepthComponent32F => (PixelFormat::DepthComponent, DataType::Float),
            RenderbufferFormat::Rgba8 => (PixelFormat::Rgba, DataType::UnsignedByte),
        }
    }
}

/// A renderbuffer: a texture only reachable through framebuffer attachment.
#[derive(Debug, Clone)]
pub struct Renderbuffer {
    texture: TextureId,
    format: Option<RenderbufferFormat>,
}

impl Renderbuffer {
    pub(crate) fn new(texture: TextureId) -> Self {
        Self { texture, format: None }
    }

    /// Backing texture; level 0 holds the storage.
    #[inline]
    pub fn texture(&self) -> TextureId {
        self.texture
    }

    /// `None` until storage has been allocated.
    #[inline]
    pub fn format(&self) -> Option<RenderbufferFormat> {
        self.format
    }

    pub(crate) fn set_format(&mut self, format: RenderbufferFormat) {
        self.format = Some(format);
    }
}
