use crate::state::Viewport;

/// Construction-time limits and initial state of a [`Context`](crate::Context).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextConfig {
    /// Initial viewport; the default framebuffer is sized from it.
    pub viewport: Viewport,
    pub texture_units: usize,
    pub max_vertex_attribs: usize,
    /// Largest width or height accepted for texture, renderbuffer and
    /// default framebuffer storage.
    pub max_texture_size: u32,
}

impl Default for ContextConfig {
    fn default() -> Self {
        Self {
            viewport: Viewport::default(),
            texture_units: 16,
            max_vertex_attribs: 16,
            max_texture_size: 8192,
        }
    }
}

impl ContextConfig {
    /// Default limits with a `width × height` viewport at the origin.
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            viewport: Viewport::new(0, 0, width, height),
            ..Self::default()
        }
    }
}
