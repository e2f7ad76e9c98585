//! The rendering context: object stores, pipeline state and the GL-style
//! entry points.
//!
//! The methods are split by concern:
//! - `mod.rs`: construction and fixed-function state setters
//! - `objects.rs`: buffers, vertex arrays, textures, framebuffers, renderbuffers
//! - `programs.rs`: shaders, programs and uniforms
//! - `draw.rs`: clears, draw calls and readback

mod draw;
mod objects;
mod programs;

use softgl_math::{clamp, Vec4};

use crate::config::ContextConfig;
use crate::error::{GlError, Result};
use crate::object::{
    BufferId, FramebufferId, ProgramId, RenderbufferId, ShaderId, Store, TextureId, VertexArrayId,
};
use crate::resource::{Buffer, Framebuffer, Image, Renderbuffer, Texture, VertexArray};
use crate::shader::{Program, Shader};
use crate::state::{Capability, CullFace, DepthFunc, FrontFace, PipelineState, Viewport};

/// Colour and depth planes used while no framebuffer object is bound.
#[derive(Debug)]
struct DefaultFramebuffer {
    width: u32,
    height: u32,
    /// `None` only while the plane is lent to a draw.
    color: Option<Image>,
    depth: Option<Image>,
}

/// A software GL context.
///
/// Owns every object it creates and the pipeline state that binds them
/// together. All calls are synchronous; a draw call returns once every
/// fragment has been written.
#[derive(Debug)]
pub struct Context {
    config: ContextConfig,
    state: PipelineState,

    buffers: Store<BufferId, Buffer>,
    textures: Store<TextureId, Texture>,
    framebuffers: Store<FramebufferId, Framebuffer>,
    renderbuffers: Store<RenderbufferId, Renderbuffer>,
    vertex_arrays: Store<VertexArrayId, VertexArray>,
    shaders: Store<ShaderId, Shader>,
    programs: Store<ProgramId, Program>,

    /// Used while no vertex array object is bound.
    default_vertex_array: VertexArray,
    default_framebuffer: Option<DefaultFramebuffer>,
}

impl Default for Context {
    fn default() -> Self {
        Self::new(ContextConfig::default())
    }
}

impl Context {
    pub fn new(config: ContextConfig) -> Self {
        let state = PipelineState::new(config.viewport, config.texture_units, config.max_vertex_attribs);
        log::debug!(
            "context: created ({} texture units, {} vertex attributes, viewport {:?})",
            config.texture_units,
            config.max_vertex_attribs,
            config.viewport
        );

        Self {
            config,
            state,
            buffers: Store::default(),
            textures: Store::default(),
            framebuffers: Store::default(),
            renderbuffers: Store::default(),
            vertex_arrays: Store::default(),
            shaders: Store::default(),
            programs: Store::default(),
            default_vertex_array: VertexArray::default(),
            default_framebuffer: None,
        }
    }

    #[inline]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Current pipeline state. Mutate it through the setters.
    #[inline]
    pub fn state(&self) -> &PipelineState {
        &self.state
    }

    // ── fixed-function state ──────────────────────────────────────────────

    /// Sets the viewport. The default framebuffer grows to cover it on the
    /// next clear, draw or read.
    pub fn viewport(&mut self, x: i32, y: i32, width: u32, height: u32) {
        self.state.viewport = Viewport::new(x, y, width, height);
    }

    pub fn clear_color(&mut self, r: f32, g: f32, b: f32, a: f32) {
        self.state.clear_color = Vec4::new(r, g, b, a);
    }

    /// Clamped to `[0, 1]`.
    pub fn clear_depth(&mut self, depth: f32) {
        self.state.clear_depth = clamp(depth, 0.0, 1.0);
    }

    pub fn enable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, true);
    }

    pub fn disable(&mut self, cap: Capability) {
        self.state.set_enabled(cap, false);
    }

    pub fn depth_func(&mut self, func: DepthFunc) {
        self.state.depth_func = func;
    }

    pub fn depth_mask(&mut self, write: bool) {
        self.state.depth_mask = write;
    }

    pub fn cull_face(&mut self, mode: CullFace) {
        self.state.cull_mode = mode;
    }

    pub fn front_face(&mut self, front: FrontFace) {
        self.state.front_face = front;
    }

    /// Selects the texture unit `bind_texture` acts on.
    pub fn active_texture(&mut self, unit: usize) -> Result<()> {
        if unit >= self.state.texture_units.len() {
            return Err(GlError::invalid_value(format!(
                "texture unit {unit} out of range (0..{})",
                self.state.texture_units.len()
            )));
        }
        self.state.active_texture = unit;
        Ok(())
    }

    /// Sets the value read by attribute `location` while its vertex array
    /// slot is disabled.
    pub fn vertex_attrib_4f(&mut self, location: usize, value: Vec4) -> Result<()> {
        let slot = self
            .state
            .generic_attribs
            .get_mut(location)
            .ok_or_else(|| GlError::invalid_value(format!("attribute location {location} out of range")))?;
        *slot = value;
        Ok(())
    }

    // ── shared lookups ────────────────────────────────────────────────────

    fn check_attrib_location(&self, location: usize) -> Result<()> {
        if location >= self.config.max_vertex_attribs {
            return Err(GlError::invalid_value(format!(
                "attribute location {location} out of range (0..{})",
                self.config.max_vertex_attribs
            )));
        }
        Ok(())
    }

    fn check_image_size(&self, width: u32, height: u32) -> Result<()> {
        let max = self.config.max_texture_size;
        if width > max || height > max {
            return Err(GlError::invalid_value(format!("{width}x{height} exceeds the {max}x{max} size limit")));
        }
        Ok(())
    }

    fn current_vertex_array(&self) -> Result<&VertexArray> {
        match self.state.vertex_array {
            Some(id) => self.vertex_arrays.get(id),
            None => Ok(&self.default_vertex_array),
        }
    }

    fn current_vertex_array_mut(&mut self) -> Result<&mut VertexArray> {
        match self.state.vertex_array {
            Some(id) => self.vertex_arrays.get_mut(id),
            None => Ok(&mut self.default_vertex_array),
        }
    }
}
