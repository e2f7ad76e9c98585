use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::error::LinkError;
use crate::object::ShaderId;

use super::descriptor::{FieldRole, ShaderDescriptor};
use super::registers::Registers;
use super::source::{Shader, ShaderKind, ShaderSource};
use super::value::{Value, ValueKind};

/// Location of a uniform in a linked program.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct UniformLocation(pub(crate) u32);

impl UniformLocation {
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

/// A vertex attribute and the vertex-array slot it reads.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeBinding {
    pub name: String,
    pub location: u32,
    pub kind: ValueKind,
    /// Field index in the vertex stage.
    pub field: usize,
}

/// One uniform location and the field it maps to in each stage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniformSlot {
    pub name: String,
    pub kind: ValueKind,
    pub vertex_field: Option<usize>,
    pub fragment_field: Option<usize>,
}

/// Shader code, its descriptor and this program's copy of its registers.
#[derive(Clone)]
pub(crate) struct StageInstance {
    pub source: Arc<dyn ShaderSource>,
    pub descriptor: Arc<ShaderDescriptor>,
    pub registers: Registers,
}

impl StageInstance {
    fn new(shader: &Shader, kind: ShaderKind) -> Result<Self, LinkError> {
        let source = shader.source().ok_or(LinkError::MissingEntryPoint(kind))?;
        let descriptor = shader.shared_descriptor().ok_or(LinkError::NotCompiled(kind))?;
        Ok(Self {
            source: Arc::clone(source),
            descriptor: Arc::clone(descriptor),
            registers: Registers::new(descriptor),
        })
    }
}

/// Result of a successful link.
#[derive(Clone)]
pub struct LinkedProgram {
    pub(crate) vertex: StageInstance,
    pub(crate) fragment: StageInstance,
    attributes: Vec<AttributeBinding>,
    uniforms: Vec<UniformSlot>,
    uniform_names: HashMap<String, UniformLocation>,
}

impl fmt::Debug for LinkedProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LinkedProgram")
            .field("attributes", &self.attributes)
            .field("uniforms", &self.uniforms)
            .finish_non_exhaustive()
    }
}

impl LinkedProgram {
    #[inline]
    pub fn attributes(&self) -> &[AttributeBinding] {
        &self.attributes
    }

    #[inline]
    pub fn uniforms(&self) -> &[UniformSlot] {
        &self.uniforms
    }

    pub fn attribute_location(&self, name: &str) -> Option<u32> {
        self.attributes.iter().find(|a| a.name == name).map(|a| a.location)
    }

    pub fn uniform_location(&self, name: &str) -> Option<UniformLocation> {
        self.uniform_names.get(name).copied()
    }

    pub fn uniform_slot(&self, location: UniformLocation) -> Option<&UniformSlot> {
        self.uniforms.get(location.0 as usize)
    }

    /// Current value of the uniform at `location`, read from the first stage
    /// that declares it.
    pub fn uniform_value(&self, location: UniformLocation) -> Option<Value> {
        let slot = self.uniform_slot(location)?;
        match (slot.vertex_field, slot.fragment_field) {
            (Some(f), _) => self.vertex.registers.get(f),
            (None, Some(f)) => self.fragment.registers.get(f),
            (None, None) => None,
        }
    }

    /// Writes `value` into every stage that declares the uniform. The caller
    /// has checked the kind against the slot.
    pub(crate) fn write_uniform(&mut self, location: UniformLocation, value: Value) -> bool {
        let Some(slot) = self.uniforms.get(location.0 as usize) else {
            return false;
        };
        let mut written = false;
        if let Some(f) = slot.vertex_field {
            written |= self.vertex.registers.set(f, value);
        }
        if let Some(f) = slot.fragment_field {
            written |= self.fragment.registers.set(f, value);
        }
        written
    }
}

/// A program object: attached shaders and, after a successful link, the
/// linked state.
#[derive(Debug, Default)]
pub struct Program {
    pub(crate) vertex: Option<ShaderId>,
    pub(crate) fragment: Option<ShaderId>,
    linked: Option<LinkedProgram>,
}

impl Program {
    #[inline]
    pub fn attached(&self, kind: ShaderKind) -> Option<ShaderId> {
        match kind {
            ShaderKind::Vertex => self.vertex,
            ShaderKind::Fragment => self.fragment,
        }
    }

    pub fn references(&self, shader: ShaderId) -> bool {
        self.vertex == Some(shader) || self.fragment == Some(shader)
    }

    #[inline]
    pub fn is_linked(&self) -> bool {
        self.linked.is_some()
    }

    #[inline]
    pub fn linked(&self) -> Option<&LinkedProgram> {
        self.linked.as_ref()
    }

    #[inline]
    pub(crate) fn linked_mut(&mut self) -> Option<&mut LinkedProgram> {
        self.linked.as_mut()
    }

    pub(crate) fn set_attached(&mut self, kind: ShaderKind, shader: Option<ShaderId>) {
        match kind {
            ShaderKind::Vertex => self.vertex = shader,
            ShaderKind::Fragment => self.fragment = shader,
        }
    }

    pub(crate) fn set_linked(&mut self, linked: Option<LinkedProgram>) {
        self.linked = linked;
    }
}

/// Links a vertex and fragment shader.
///
/// Attribute locations number the vertex stage's attributes in declaration
/// order. Uniform locations number unique uniform names, vertex stage first;
/// a name declared by both stages gets a single location that writes to both.
pub fn link(vertex: Option<&Shader>, fragment: Option<&Shader>) -> Result<LinkedProgram, LinkError> {
    let vertex = vertex.ok_or(LinkError::MissingStage(ShaderKind::Vertex))?;
    let fragment = fragment.ok_or(LinkError::MissingStage(ShaderKind::Fragment))?;
    let vs = StageInstance::new(vertex, ShaderKind::Vertex)?;
    let fs = StageInstance::new(fragment, ShaderKind::Fragment)?;

    if let Some(attr) = fs.descriptor.with_role(FieldRole::Attribute).next() {
        return Err(LinkError::FragmentAttribute(attr.name.clone()));
    }

    let attributes = vs
        .descriptor
        .with_role(FieldRole::Attribute)
        .enumerate()
        .map(|(location, f)| AttributeBinding {
            name: f.name.clone(),
            location: location as u32,
            kind: f.kind,
            field: f.index,
        })
        .collect();

    let mut uniforms: Vec<UniformSlot> = Vec::new();
    let mut uniform_names = HashMap::new();
    for (stage, descriptor) in [(ShaderKind::Vertex, &vs.descriptor), (ShaderKind::Fragment, &fs.descriptor)] {
        for f in descriptor.with_role(FieldRole::Uniform) {
            let location = *uniform_names.entry(f.name.clone()).or_insert_with(|| {
                uniforms.push(UniformSlot {
                    name: f.name.clone(),
                    kind: f.kind,
                    vertex_field: None,
                    fragment_field: None,
                });
                UniformLocation((uniforms.len() - 1) as u32)
            });

            let slot = &mut uniforms[location.0 as usize];
            if slot.kind != f.kind {
                return Err(LinkError::UniformMismatch {
                    name: f.name.clone(),
                    vertex: slot.kind,
                    fragment: f.kind,
                });
            }
            match stage {
                ShaderKind::Vertex => slot.vertex_field = Some(f.index),
                ShaderKind::Fragment => slot.fragment_field = Some(f.index),
            }
        }
    }

    for f in fs.descriptor.with_role(FieldRole::Varying) {
        let out = vs
            .descriptor
            .find_role(&f.name, FieldRole::Varying)
            .ok_or_else(|| LinkError::UnmatchedVarying(f.name.clone()))?;
        if out.kind != f.kind {
            return Err(LinkError::VaryingMismatch {
                name: f.name.clone(),
                vertex: out.kind,
                fragment: f.kind,
            });
        }
    }

    Ok(LinkedProgram {
        vertex: vs,
        fragment: fs,
        attributes,
        uniforms,
        uniform_names,
    })
}
