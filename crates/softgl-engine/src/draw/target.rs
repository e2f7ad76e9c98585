use softgl_math::Vec4;

use crate::error::NotReady;
use crate::resource::{DataType, Image, PixelFormat};
use crate::state::ClearMask;

/// Checks that a set of attachments can be rendered into together.
pub(crate) fn check_attachments(color: Option<&Image>, depth: Option<&Image>) -> Result<(), NotReady> {
    if color.is_none() && depth.is_none() {
        return Err(NotReady::IncompleteFramebuffer("no attachments"));
    }
    if let Some(c) = color {
        if c.format() != PixelFormat::Rgba {
            return Err(NotReady::IncompleteFramebuffer("color attachment is not RGBA"));
        }
    }
    if let Some(d) = depth {
        if d.format() != PixelFormat::DepthComponent || d.data_type() != DataType::Float {
            return Err(NotReady::IncompleteFramebuffer("depth attachment is not a float depth plane"));
        }
    }
    if let (Some(c), Some(d)) = (color, depth) {
        if (c.width(), c.height()) != (d.width(), d.height()) {
            return Err(NotReady::IncompleteFramebuffer("attachment sizes differ"));
        }
    }
    Ok(())
}

/// Attachment images moved out of their owners for the duration of a draw
/// or clear.
#[derive(Debug)]
pub(crate) struct RenderTarget {
    pub color: Option<Image>,
    pub depth: Option<Image>,
}

impl RenderTarget {
    /// Callers validate with [`check_attachments`] first.
    pub fn new(color: Option<Image>, depth: Option<Image>) -> Self {
        Self { color, depth }
    }

    pub fn into_parts(self) -> (Option<Image>, Option<Image>) {
        (self.color, self.depth)
    }

    fn any(&self) -> Option<&Image> {
        self.color.as_ref().or(self.depth.as_ref())
    }

    pub fn width(&self) -> u32 {
        self.any().map_or(0, Image::width)
    }

    pub fn height(&self) -> u32 {
        self.any().map_or(0, Image::height)
    }

    /// Fills whole attachments; the viewport does not restrict clears.
    pub fn clear(&mut self, mask: ClearMask, color: Vec4, depth: f32) {
        if mask.contains(ClearMask::COLOR) {
            if let Some(image) = self.color.as_mut() {
                image.fill(color);
            }
        }
        if mask.contains(ClearMask::DEPTH) {
            if let Some(image) = self.depth.as_mut() {
                image.fill(Vec4::splat(depth));
            }
        }
    }
}
