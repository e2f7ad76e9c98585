use crate::error::{GlError, Result};

/// Binding point a buffer is attached to.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum BufferTarget {
    /// Vertex attribute data.
    Array,
    /// Index data; the binding lives in the current vertex array.
    ElementArray,
}

/// Usage hint. Stored for introspection; the rasterizer treats all
/// buffers the same.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum BufferUsage {
    #[default]
    StaticDraw,
    DynamicDraw,
    StreamDraw,
}

/// A buffer object. Owns a copy of the bytes it was given.
#[derive(Debug, Clone, Default)]
pub struct Buffer {
    data: Vec<u8>,
    usage: BufferUsage,
}

impl Buffer {
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    #[inline]
    pub fn usage(&self) -> BufferUsage {
        self.usage
    }

    pub(crate) fn replace(&mut self, bytes: &[u8], usage: BufferUsage) {
        self.data.clear();
        self.data.extend_from_slice(bytes);
        self.usage = usage;
    }

    /// Overwrites `bytes.len()` bytes starting at `offset`; the range must
    /// lie inside the current contents.
    pub(crate) fn write(&mut self, offset: usize, bytes: &[u8]) -> Result<()> {
        let end = offset
            .checked_add(bytes.len())
            .filter(|end| *end <= self.data.len())
            .ok_or_else(|| {
                GlError::invalid_value(format!(
                    "sub-data range {offset}..{} exceeds buffer size {}",
                    offset.saturating_add(bytes.len()),
                    self.data.len()
                ))
            })?;
        self.data[offset..end].copy_from_slice(bytes);
        Ok(())
    }
}
