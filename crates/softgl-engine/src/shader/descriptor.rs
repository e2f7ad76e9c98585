use std::fmt;

use crate::error::ShaderError;

use super::value::ValueKind;

/// What a shader field is used for.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum FieldRole {
    /// Per-vertex input fetched from a vertex array.
    Attribute,
    /// Per-draw constant set through a uniform location.
    Uniform,
    /// Vertex output interpolated into the fragment input of the same name.
    Varying,
}

impl fmt::Display for FieldRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FieldRole::Attribute => "attribute",
            FieldRole::Uniform => "uniform",
            FieldRole::Varying => "varying",
        })
    }
}

/// One row of a shader's descriptor table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDesc {
    pub name: String,
    pub role: FieldRole,
    pub kind: ValueKind,
    /// Stable index into the shader's registers.
    pub index: usize,
    /// Offset in the packed byte layout of all fields.
    pub byte_offset: usize,
}

impl FieldDesc {
    #[inline]
    pub fn byte_size(&self) -> usize {
        self.kind.byte_size()
    }
}

/// The static table of fields a shader declares, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ShaderDescriptor {
    fields: Vec<FieldDesc>,
}

impl ShaderDescriptor {
    #[inline]
    pub fn fields(&self) -> &[FieldDesc] {
        &self.fields
    }

    #[inline]
    pub fn field(&self, index: usize) -> Option<&FieldDesc> {
        self.fields.get(index)
    }

    pub fn find(&self, name: &str) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn find_role(&self, name: &str, role: FieldRole) -> Option<&FieldDesc> {
        self.fields.iter().find(|f| f.role == role && f.name == name)
    }

    pub fn with_role(&self, role: FieldRole) -> impl Iterator<Item = &FieldDesc> {
        self.fields.iter().filter(move |f| f.role == role)
    }

    /// Size of all fields packed back to back.
    pub fn byte_size(&self) -> usize {
        self.fields.last().map_or(0, |f| f.byte_offset + f.byte_size())
    }
}

/// Collects field declarations from [`ShaderSource::declare`](super::ShaderSource::declare).
///
/// Each declaration returns the field's index, which stays valid for the
/// lifetime of the shader. Validation errors are reported by [`build`](Self::build).
#[derive(Debug, Default)]
pub struct DescriptorBuilder {
    fields: Vec<FieldDesc>,
    byte_len: usize,
    error: Option<ShaderError>,
}

impl DescriptorBuilder {
    pub fn attribute(&mut self, name: &str, kind: ValueKind) -> usize {
        self.push(name, FieldRole::Attribute, kind)
    }

    pub fn uniform(&mut self, name: &str, kind: ValueKind) -> usize {
        self.push(name, FieldRole::Uniform, kind)
    }

    pub fn varying(&mut self, name: &str, kind: ValueKind) -> usize {
        self.push(name, FieldRole::Varying, kind)
    }

    fn push(&mut self, name: &str, role: FieldRole, kind: ValueKind) -> usize {
        let index = self.fields.len();

        if self.error.is_none() {
            let allowed = match role {
                FieldRole::Attribute => kind.is_vector(),
                FieldRole::Varying => kind.float_count().is_some(),
                FieldRole::Uniform => true,
            };
            if self.fields.iter().any(|f| f.name == name) {
                self.error = Some(ShaderError::DuplicateField(name.to_owned()));
            } else if !allowed {
                self.error = Some(ShaderError::InvalidKind { name: name.to_owned(), role, kind });
            }
        }

        self.fields.push(FieldDesc {
            name: name.to_owned(),
            role,
            kind,
            index,
            byte_offset: self.byte_len,
        });
        self.byte_len += kind.byte_size();
        index
    }

    pub fn build(self) -> Result<ShaderDescriptor, ShaderError> {
        match self.error {
            Some(err) => Err(err),
            None => Ok(ShaderDescriptor { fields: self.fields }),
        }
    }
}
