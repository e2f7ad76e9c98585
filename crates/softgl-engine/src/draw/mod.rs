//! The draw engine.
//!
//! A draw runs in two phases. The fallible phase fetches attributes and runs
//! the vertex stage for every vertex; any configuration error surfaces here,
//! before the render target is touched. The second phase assembles triangles
//! in submission order and rasterizes them: clip-to-window projection, edge
//! coverage, depth test, varying interpolation, fragment stage, merge.

mod fetch;
mod raster;
mod target;
mod vertex;

pub use fetch::IndexType;

pub(crate) use fetch::{decode_indices, AttributeFetcher};
pub(crate) use raster::{RasterState, Rasterizer};
pub(crate) use target::{check_attachments, RenderTarget};
pub(crate) use vertex::{shade_vertices, ShadedVertices, VaryingLayout};

/// Primitive topology. Only triangle lists are rasterized.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Primitive {
    #[default]
    Triangles,
}

/// Counters reported by a draw call.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct DrawStats {
    pub vertices: usize,
    /// Assembled triangles, including the ones dropped below.
    pub triangles: usize,
    pub degenerate: usize,
    pub culled: usize,
    /// Samples inside a triangle.
    pub fragments: usize,
    /// Samples whose depth fell outside `[0, 1]`.
    pub depth_clipped: usize,
    pub depth_rejected: usize,
    pub discarded: usize,
    /// Fragments merged into the target.
    pub written: usize,
}

/// Rasterizes every complete triangle of `shaded`; a trailing partial
/// triangle is ignored.
pub(crate) fn rasterize_triangles(
    rasterizer: &mut Rasterizer<'_>,
    shaded: &ShadedVertices,
    target: &mut RenderTarget,
    stats: &mut DrawStats,
) {
    let triangles = shaded.len() / 3;
    for t in 0..triangles {
        let base = t * 3;
        rasterizer.draw_triangle([base, base + 1, base + 2], shaded, target, stats);
    }
}
