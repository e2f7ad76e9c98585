use std::fmt;
use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use softgl_math::{Vec2, Vec4};

use crate::error::ShaderError;
use crate::sampler::TextureLookup;

use super::descriptor::{DescriptorBuilder, ShaderDescriptor};
use super::registers::Registers;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ShaderKind {
    Vertex,
    Fragment,
}

impl fmt::Display for ShaderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderKind::Vertex => "vertex",
            ShaderKind::Fragment => "fragment",
        })
    }
}

/// User shader code for one stage.
///
/// `declare` lists the fields once, at compile time; the returned indices
/// are what `main` uses to read and write them. `main` runs once per vertex
/// (vertex stage) or once per covered pixel (fragment stage).
///
/// ```ignore
/// struct Flat;
///
/// impl ShaderSource for Flat {
///     fn declare(&self, fields: &mut DescriptorBuilder) {
///         fields.uniform("color", ValueKind::Vec4);
///     }
///
///     fn main(&self, inv: &mut Invocation<'_>) {
///         let c = inv.vec4(0);
///         inv.set_color(c);
///     }
/// }
/// ```
pub trait ShaderSource: Send + Sync {
    fn declare(&self, fields: &mut DescriptorBuilder);
    fn main(&self, inv: &mut Invocation<'_>);
}

/// State of a single shader run: the stage's registers plus the built-in
/// outputs. Dereferences to [`Registers`] for field access.
pub struct Invocation<'a> {
    registers: &'a mut Registers,
    textures: TextureLookup<'a>,
    position: Vec4,
    color: Vec4,
    discarded: bool,
}

impl<'a> Invocation<'a> {
    pub fn new(registers: &'a mut Registers, textures: TextureLookup<'a>) -> Self {
        Self {
            registers,
            textures,
            position: Vec4::ZERO,
            color: Vec4::ZERO,
            discarded: false,
        }
    }

    /// Clip-space position written by the vertex stage.
    #[inline]
    pub fn position(&self) -> Vec4 {
        self.position
    }

    #[inline]
    pub fn set_position(&mut self, position: Vec4) {
        self.position = position;
    }

    /// RGBA color written by the fragment stage.
    #[inline]
    pub fn color(&self) -> Vec4 {
        self.color
    }

    #[inline]
    pub fn set_color(&mut self, color: Vec4) {
        self.color = color;
    }

    /// Drops the current fragment: nothing is written for it.
    #[inline]
    pub fn discard(&mut self) {
        self.discarded = true;
    }

    #[inline]
    pub fn is_discarded(&self) -> bool {
        self.discarded
    }

    /// Samples the texture bound to texture unit `unit`.
    #[inline]
    pub fn texture_2d(&self, unit: i32, uv: Vec2) -> Vec4 {
        self.textures.sample(unit, uv)
    }
}

impl Deref for Invocation<'_> {
    type Target = Registers;

    fn deref(&self) -> &Registers {
        self.registers
    }
}

impl DerefMut for Invocation<'_> {
    fn deref_mut(&mut self) -> &mut Registers {
        self.registers
    }
}

/// A shader object: a stage kind, its source once provided, and the
/// descriptor table once compiled.
pub struct Shader {
    kind: ShaderKind,
    source: Option<Arc<dyn ShaderSource>>,
    descriptor: Option<Arc<ShaderDescriptor>>,
}

impl fmt::Debug for Shader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Shader")
            .field("kind", &self.kind)
            .field("has_source", &self.source.is_some())
            .field("descriptor", &self.descriptor)
            .finish()
    }
}

impl Shader {
    pub(crate) fn new(kind: ShaderKind) -> Self {
        Self { kind, source: None, descriptor: None }
    }

    #[inline]
    pub fn kind(&self) -> ShaderKind {
        self.kind
    }

    #[inline]
    pub fn has_source(&self) -> bool {
        self.source.is_some()
    }

    #[inline]
    pub fn is_compiled(&self) -> bool {
        self.descriptor.is_some()
    }

    #[inline]
    pub fn descriptor(&self) -> Option<&ShaderDescriptor> {
        self.descriptor.as_deref()
    }

    pub(crate) fn source(&self) -> Option<&Arc<dyn ShaderSource>> {
        self.source.as_ref()
    }

    pub(crate) fn shared_descriptor(&self) -> Option<&Arc<ShaderDescriptor>> {
        self.descriptor.as_ref()
    }

    /// Replaces the source; the shader must be compiled again.
    pub(crate) fn set_source(&mut self, source: Arc<dyn ShaderSource>) {
        self.source = Some(source);
        self.descriptor = None;
    }

    /// Builds and validates the descriptor table. `id` is only used for the
    /// error message.
    pub(crate) fn compile(&mut self, id: u32) -> Result<(), ShaderError> {
        self.descriptor = None;
        let source = self.source.as_ref().ok_or(ShaderError::MissingSource(id))?;
        let mut builder = DescriptorBuilder::default();
        source.declare(&mut builder);
        self.descriptor = Some(Arc::new(builder.build()?));
        Ok(())
    }
}
