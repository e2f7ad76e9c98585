use softgl_math::Vec4;

use crate::object::{BufferId, FramebufferId, ProgramId, RenderbufferId, TextureId, VertexArrayId};

/// Destination rectangle in framebuffer pixels; `(x, y)` is the lower-left
/// corner.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Viewport {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[inline]
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }
}

impl Default for Viewport {
    fn default() -> Self {
        Viewport::new(0, 0, 300, 150)
    }
}

/// Toggles for `enable` / `disable`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Capability {
    DepthTest,
    CullFace,
}

/// Comparison between an incoming depth and the stored one; the fragment
/// passes when `incoming <op> stored` holds.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum DepthFunc {
    Never,
    Less,
    Equal,
    #[default]
    LessEqual,
    Greater,
    NotEqual,
    GreaterEqual,
    Always,
}

impl DepthFunc {
    #[inline]
    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            DepthFunc::Never => false,
            DepthFunc::Less => incoming < stored,
            DepthFunc::Equal => incoming == stored,
            DepthFunc::LessEqual => incoming <= stored,
            DepthFunc::Greater => incoming > stored,
            DepthFunc::NotEqual => incoming != stored,
            DepthFunc::GreaterEqual => incoming >= stored,
            DepthFunc::Always => true,
        }
    }
}

/// Which faces are dropped when culling is enabled.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum CullFace {
    Front,
    #[default]
    Back,
    FrontAndBack,
}

/// Winding that counts as front-facing, as seen in window coordinates.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum FrontFace {
    Cw,
    #[default]
    Ccw,
}

bitflags::bitflags! {
    /// Buffers affected by `clear`.
    #[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
    pub struct ClearMask: u32 {
        const COLOR = 0x1;
        const DEPTH = 0x2;
    }
}

/// Everything a draw call reads besides the objects themselves.
#[derive(Debug, Clone)]
pub struct PipelineState {
    pub viewport: Viewport,
    pub clear_color: Vec4,
    pub clear_depth: f32,

    pub array_buffer: Option<BufferId>,
    pub vertex_array: Option<VertexArrayId>,
    pub current_program: Option<ProgramId>,
    pub framebuffer: Option<FramebufferId>,
    pub renderbuffer: Option<RenderbufferId>,

    pub active_texture: usize,
    pub texture_units: Vec<Option<TextureId>>,

    pub depth_test: bool,
    pub depth_func: DepthFunc,
    pub depth_mask: bool,
    pub cull_face: bool,
    pub cull_mode: CullFace,
    pub front_face: FrontFace,

    /// Values read by attributes whose vertex-array slot is disabled.
    pub generic_attribs: Vec<Vec4>,
}

impl PipelineState {
    pub fn new(viewport: Viewport, texture_units: usize, max_vertex_attribs: usize) -> Self {
        Self {
            viewport,
            clear_color: Vec4::ZERO,
            clear_depth: 1.0,
            array_buffer: None,
            vertex_array: None,
            current_program: None,
            framebuffer: None,
            renderbuffer: None,
            active_texture: 0,
            texture_units: vec![None; texture_units],
            depth_test: false,
            depth_func: DepthFunc::default(),
            depth_mask: true,
            cull_face: false,
            cull_mode: CullFace::default(),
            front_face: FrontFace::default(),
            generic_attribs: vec![Vec4::UNIT_W; max_vertex_attribs],
        }
    }

    #[inline]
    pub fn is_enabled(&self, cap: Capability) -> bool {
        match cap {
            Capability::DepthTest => self.depth_test,
            Capability::CullFace => self.cull_face,
        }
    }

    pub(crate) fn set_enabled(&mut self, cap: Capability, on: bool) {
        match cap {
            Capability::DepthTest => self.depth_test = on,
            Capability::CullFace => self.cull_face = on,
        }
    }

    /// Texture bound to the active unit.
    #[inline]
    pub fn bound_texture(&self) -> Option<TextureId> {
        self.texture_units.get(self.active_texture).copied().flatten()
    }
}
