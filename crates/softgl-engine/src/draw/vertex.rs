use softgl_math::Vec4;

use crate::error::NotReady;
use crate::sampler::TextureLookup;
use crate::shader::{FieldRole, Invocation, ShaderDescriptor, StageInstance, ValueKind};

use super::fetch::AttributeFetcher;

/// Where one vertex varying sits in the per-vertex float block and which
/// fragment field receives it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct VaryingSlot {
    pub kind: ValueKind,
    pub offset: usize,
    pub len: usize,
    pub vertex_field: usize,
    pub fragment_field: Option<usize>,
}

/// Packing of all vertex-stage varyings, in declaration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct VaryingLayout {
    pub slots: Vec<VaryingSlot>,
    /// Floats per vertex.
    pub stride: usize,
}

impl VaryingLayout {
    pub fn new(vertex: &ShaderDescriptor, fragment: &ShaderDescriptor) -> Self {
        let mut slots = Vec::new();
        let mut stride = 0;
        for f in vertex.with_role(FieldRole::Varying) {
            let len = f.kind.float_count().unwrap_or(0);
            slots.push(VaryingSlot {
                kind: f.kind,
                offset: stride,
                len,
                vertex_field: f.index,
                fragment_field: fragment.find_role(&f.name, FieldRole::Varying).map(|t| t.index),
            });
            stride += len;
        }
        Self { slots, stride }
    }
}

/// Output of the vertex stage for every vertex of a draw.
#[derive(Debug, Clone, Default)]
pub(crate) struct ShadedVertices {
    pub positions: Vec<Vec4>,
    /// `positions.len() × stride` floats.
    pub varyings: Vec<f32>,
    pub stride: usize,
}

impl ShadedVertices {
    #[inline]
    pub fn len(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn varyings_of(&self, vertex: usize) -> &[f32] {
        let start = vertex * self.stride;
        &self.varyings[start..start + self.stride]
    }
}

/// Runs the vertex stage once per entry of `vertices`.
pub(crate) fn shade_vertices(
    stage: &mut StageInstance,
    fetcher: &AttributeFetcher<'_>,
    layout: &VaryingLayout,
    textures: TextureLookup<'_>,
    vertices: impl ExactSizeIterator<Item = u32>,
) -> Result<ShadedVertices, NotReady> {
    let count = vertices.len();
    let mut out = ShadedVertices {
        positions: Vec::with_capacity(count),
        varyings: vec![0.0; count * layout.stride],
        stride: layout.stride,
    };

    let StageInstance { source, registers, .. } = stage;
    for (slot, vertex) in vertices.enumerate() {
        fetcher.fetch_into(vertex, registers)?;

        let mut inv = Invocation::new(registers, textures);
        source.main(&mut inv);
        out.positions.push(inv.position());

        let block = &mut out.varyings[slot * layout.stride..(slot + 1) * layout.stride];
        for v in &layout.slots {
            if let Some(value) = registers.get(v.vertex_field) {
                value.write_floats(&mut block[v.offset..v.offset + v.len]);
            }
        }
    }

    log::trace!("vertex stage: {count} vertices, {} varying floats each", layout.stride);
    Ok(out)
}
