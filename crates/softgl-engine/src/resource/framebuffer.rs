use crate::object::{RenderbufferId, TextureId};

/// Attachment slot of a framebuffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Attachment {
    Color0,
    Depth,
}

/// A texture level attached to a framebuffer slot.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AttachmentRef {
    pub texture: TextureId,
    pub level: usize,
    /// Set when the texture is the backing store of a renderbuffer.
    pub renderbuffer: Option<RenderbufferId>,
}

/// A framebuffer object. It only references its attachments; the textures
/// stay owned by the texture store.
#[derive(Debug, Clone, Default)]
pub struct Framebuffer {
    color: Option<AttachmentRef>,
    depth: Option<AttachmentRef>,
}

impl Framebuffer {
    #[inline]
    pub fn attachment(&self, slot: Attachment) -> Option<AttachmentRef> {
        match slot {
            Attachment::Color0 => self.color,
            Attachment::Depth => self.depth,
        }
    }

    pub(crate) fn attach(&mut self, slot: Attachment, target: Option<AttachmentRef>) {
        match slot {
            Attachment::Color0 => self.color = target,
            Attachment::Depth => self.depth = target,
        }
    }

    pub fn references_texture(&self, texture: TextureId) -> bool {
        [self.color, self.depth]
            .iter()
            .flatten()
            .any(|a| a.texture == texture)
    }

    pub fn references_renderbuffer(&self, rb: RenderbufferId) -> bool {
        [self.color, self.depth]
            .iter()
            .flatten()
            .any(|a| a.renderbuffer == Some(rb))
    }
}
