use softgl_math::Vec4;

use crate::error::NotReady;
use crate::object::{BufferId, Store};
use crate::resource::{AttribType, Buffer, VertexArray, VertexAttrib};
use crate::shader::{AttributeBinding, Registers, Value, ValueKind};

/// Element type of index data.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IndexType {
    UnsignedByte,
    UnsignedShort,
    UnsignedInt,
}

impl IndexType {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            IndexType::UnsignedByte => 1,
            IndexType::UnsignedShort => 2,
            IndexType::UnsignedInt => 4,
        }
    }
}

/// Reads the first `count` indices out of `bytes` (native endian).
pub(crate) fn decode_indices(ty: IndexType, bytes: &[u8], count: usize) -> Result<Vec<u32>, NotReady> {
    let size = ty.size();
    let available = bytes.len() / size;
    if available < count {
        return Err(NotReady::IndexDataTooShort { available, required: count });
    }

    Ok(bytes
        .chunks_exact(size)
        .take(count)
        .map(|c| match ty {
            IndexType::UnsignedByte => u32::from(c[0]),
            IndexType::UnsignedShort => u32::from(bytemuck::pod_read_unaligned::<u16>(c)),
            IndexType::UnsignedInt => bytemuck::pod_read_unaligned::<u32>(c),
        })
        .collect())
}

fn read_component(bytes: &[u8], ty: AttribType, normalized: bool) -> f32 {
    match ty {
        AttribType::Float => bytemuck::pod_read_unaligned::<f32>(bytes),
        AttribType::UnsignedByte => {
            let v = f32::from(bytes[0]);
            if normalized { v / 255.0 } else { v }
        }
        AttribType::Byte => {
            let v = f32::from(bytes[0] as i8);
            if normalized { (v / 127.0).max(-1.0) } else { v }
        }
        AttribType::UnsignedShort => {
            let v = f32::from(bytemuck::pod_read_unaligned::<u16>(bytes));
            if normalized { v / 65535.0 } else { v }
        }
        AttribType::Short => {
            let v = f32::from(bytemuck::pod_read_unaligned::<i16>(bytes));
            if normalized { (v / 32767.0).max(-1.0) } else { v }
        }
    }
}

/// Reads one vertex's attribute out of `data`. Components the layout does
/// not supply default to `(0, 0, 0, 1)`. `None` when the read would run
/// past the end of the buffer.
pub(crate) fn read_attribute(data: &[u8], attrib: &VertexAttrib, vertex: u32) -> Option<Vec4> {
    let start = (vertex as usize)
        .checked_mul(attrib.effective_stride())?
        .checked_add(attrib.offset)?;
    let end = start.checked_add(attrib.element_size())?;
    let bytes = data.get(start..end)?;

    let width = attrib.ty.size();
    let mut comps = [0.0f32; 4];
    for (i, chunk) in bytes.chunks_exact(width).take(4).enumerate() {
        comps[i] = read_component(chunk, attrib.ty, attrib.normalized);
    }
    Some(Vec4::from_slice_or(&comps[..attrib.size.min(4)], Vec4::UNIT_W))
}

enum Source<'a> {
    Buffer { data: &'a [u8], attrib: VertexAttrib },
    Constant(Vec4),
}

struct Binding<'a> {
    location: u32,
    field: usize,
    kind: ValueKind,
    source: Source<'a>,
}

/// Resolved attribute sources for one draw.
pub(crate) struct AttributeFetcher<'a> {
    bindings: Vec<Binding<'a>>,
}

impl<'a> AttributeFetcher<'a> {
    /// Enabled slots read their buffer; disabled slots read the generic
    /// attribute value.
    pub fn new(
        attributes: &[AttributeBinding],
        vertex_array: &VertexArray,
        buffers: &'a Store<BufferId, Buffer>,
        generic: &[Vec4],
    ) -> Result<Self, NotReady> {
        let mut bindings = Vec::with_capacity(attributes.len());
        let mut any_enabled = false;

        for attr in attributes {
            let layout = vertex_array.attrib(attr.location as usize);
            let source = if layout.enabled {
                any_enabled = true;
                let buffer = layout
                    .buffer
                    .and_then(|id| buffers.get(id).ok())
                    .ok_or(NotReady::AttributeWithoutBuffer { location: attr.location })?;
                Source::Buffer { data: buffer.data(), attrib: layout }
            } else {
                let value = generic
                    .get(attr.location as usize)
                    .copied()
                    .unwrap_or(Vec4::UNIT_W);
                Source::Constant(value)
            };
            bindings.push(Binding {
                location: attr.location,
                field: attr.field,
                kind: attr.kind,
                source,
            });
        }

        if !attributes.is_empty() && !any_enabled {
            return Err(NotReady::NoEnabledAttributes);
        }
        Ok(Self { bindings })
    }

    /// Writes every attribute of `vertex` into the vertex stage registers.
    pub fn fetch_into(&self, vertex: u32, registers: &mut Registers) -> Result<(), NotReady> {
        for b in &self.bindings {
            let v = match &b.source {
                Source::Buffer { data, attrib } => read_attribute(data, attrib, vertex)
                    .ok_or(NotReady::AttributeOutOfRange { location: b.location, vertex })?,
                Source::Constant(v) => *v,
            };
            registers.set(b.field, Value::from_attribute(b.kind, v));
        }
        Ok(())
    }
}
