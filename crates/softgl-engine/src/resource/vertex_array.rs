use crate::object::BufferId;

/// Component type of a vertex attribute in its buffer.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum AttribType {
    Byte,
    UnsignedByte,
    Short,
    UnsignedShort,
    #[default]
    Float,
}

impl AttribType {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            AttribType::Byte | AttribType::UnsignedByte => 1,
            AttribType::Short | AttribType::UnsignedShort => 2,
            AttribType::Float => 4,
        }
    }
}

/// How one attribute location reads its buffer.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct VertexAttrib {
    pub enabled: bool,
    /// Components per vertex, 1..=4.
    pub size: usize,
    pub ty: AttribType,
    pub normalized: bool,
    /// Byte distance between vertices; 0 means tightly packed.
    pub stride: usize,
    pub offset: usize,
    pub buffer: Option<BufferId>,
}

impl Default for VertexAttrib {
    fn default() -> Self {
        Self {
            enabled: false,
            size: 4,
            ty: AttribType::Float,
            normalized: false,
            stride: 0,
            offset: 0,
            buffer: None,
        }
    }
}

impl VertexAttrib {
    #[inline]
    pub fn element_size(&self) -> usize {
        self.size * self.ty.size()
    }

    #[inline]
    pub fn effective_stride(&self) -> usize {
        if self.stride == 0 { self.element_size() } else { self.stride }
    }
}

/// Attribute layout plus the index buffer binding.
#[derive(Debug, Clone, Default)]
pub struct VertexArray {
    attribs: Vec<VertexAttrib>,
    pub(crate) index_buffer: Option<BufferId>,
}

impl VertexArray {
    /// Layout at `location`; untouched locations report the defaults.
    pub fn attrib(&self, location: usize) -> VertexAttrib {
        self.attribs.get(location).copied().unwrap_or_default()
    }

    pub(crate) fn attrib_mut(&mut self, location: usize) -> &mut VertexAttrib {
        if self.attribs.len() <= location {
            self.attribs.resize_with(location + 1, VertexAttrib::default);
        }
        &mut self.attribs[location]
    }

    #[inline]
    pub fn index_buffer(&self) -> Option<BufferId> {
        self.index_buffer
    }

    pub fn references(&self, buffer: BufferId) -> bool {
        self.index_buffer == Some(buffer) || self.attribs.iter().any(|a| a.buffer == Some(buffer))
    }
}
