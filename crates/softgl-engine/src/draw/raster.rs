use softgl_math::{edge_function, Mat4, Triangle, Vec2, Vec3};

use crate::sampler::TextureLookup;
use crate::shader::{Invocation, StageInstance, Value};
use crate::state::{CullFace, DepthFunc, FrontFace, Viewport};

use super::target::RenderTarget;
use super::vertex::{ShadedVertices, VaryingLayout};
use super::DrawStats;

/// Fixed-function state sampled at the start of a draw.
#[derive(Debug, Copy, Clone, PartialEq)]
pub(crate) struct RasterState {
    pub viewport: Viewport,
    pub depth_test: bool,
    pub depth_func: DepthFunc,
    pub depth_mask: bool,
    pub cull: Option<(CullFace, FrontFace)>,
}

/// Screen barycentrics divided by per-corner W and renormalized, so
/// attributes interpolate linearly in clip space. `None` if the weights
/// collapse.
pub(crate) fn perspective_weights(screen: Vec3, w: Vec3) -> Option<Vec3> {
    let c = screen / w;
    let sum = c.sum();
    if sum == 0.0 || !sum.is_finite() {
        return None;
    }
    Some(c / sum)
}

/// Top-left fill rule for a counter-clockwise (y-up) triangle: samples
/// exactly on an edge belong to the triangle only for left or top edges.
#[inline]
fn is_top_left(a: Vec2, b: Vec2) -> bool {
    let d = b - a;
    d.y < 0.0 || (d.y == 0.0 && d.x < 0.0)
}

#[inline]
fn covers(e: f32, top_left: bool) -> bool {
    e > 0.0 || (e == 0.0 && top_left)
}

fn is_culled(area: f32, cull: Option<(CullFace, FrontFace)>) -> bool {
    let Some((mode, front)) = cull else {
        return false;
    };
    let front_facing = (area > 0.0) == (front == FrontFace::Ccw);
    match mode {
        CullFace::Front => front_facing,
        CullFace::Back => !front_facing,
        CullFace::FrontAndBack => true,
    }
}

/// Scan-converts triangles into a render target, running the fragment
/// stage for every covered sample.
pub(crate) struct Rasterizer<'a> {
    stage: &'a mut StageInstance,
    layout: &'a VaryingLayout,
    textures: TextureLookup<'a>,
    state: RasterState,
    viewport_matrix: Mat4,
    /// Inclusive pixel bounds: viewport ∩ target.
    bounds: Option<(i64, i64, i64, i64)>,
    scratch: Vec<f32>,
}

impl<'a> Rasterizer<'a> {
    pub fn new(
        stage: &'a mut StageInstance,
        layout: &'a VaryingLayout,
        textures: TextureLookup<'a>,
        state: RasterState,
        target: &RenderTarget,
    ) -> Self {
        let vp = state.viewport;
        let x0 = i64::from(vp.x).max(0);
        let y0 = i64::from(vp.y).max(0);
        let x1 = (i64::from(vp.x) + i64::from(vp.width)).min(i64::from(target.width())) - 1;
        let y1 = (i64::from(vp.y) + i64::from(vp.height)).min(i64::from(target.height())) - 1;
        let bounds = (x0 <= x1 && y0 <= y1).then_some((x0, y0, x1, y1));

        Self {
            stage,
            layout,
            textures,
            state,
            viewport_matrix: Mat4::viewport(vp.x as f32, vp.y as f32, vp.width as f32, vp.height as f32),
            bounds,
            scratch: vec![0.0; layout.stride],
        }
    }

    /// Draws the triangle made of shaded vertices `corners`.
    pub fn draw_triangle(
        &mut self,
        corners: [usize; 3],
        shaded: &ShadedVertices,
        target: &mut RenderTarget,
        stats: &mut DrawStats,
    ) {
        stats.triangles += 1;

        let clip = Triangle::new(
            shaded.positions[corners[0]],
            shaded.positions[corners[1]],
            shaded.positions[corners[2]],
        );
        let w = clip.safe_w();
        let z_over_w = Vec3::new(clip.a.z / w.x, clip.b.z / w.y, clip.c.z / w.z);
        let screen = clip.transform(&self.viewport_matrix).perspective_divide(w);

        let pts = [screen.a.xy(), screen.b.xy(), screen.c.xy()];
        let area = screen.signed_area();
        if area == 0.0 || !area.is_finite() || !pts.iter().all(|p| p.is_finite()) {
            stats.degenerate += 1;
            log::trace!("raster: dropped degenerate triangle {corners:?}");
            return;
        }
        if is_culled(area, self.state.cull) {
            stats.culled += 1;
            log::trace!("raster: culled triangle {corners:?}");
            return;
        }

        let Some((bx0, by0, bx1, by1)) = self.bounds else {
            return;
        };
        let bbox = screen.bounding_box();
        let min_x = (bbox.min.x.floor() as i64).max(bx0);
        let min_y = (bbox.min.y.floor() as i64).max(by0);
        let max_x = (bbox.max.x.ceil() as i64).min(bx1);
        let max_y = (bbox.max.y.ceil() as i64).min(by1);
        if min_x > max_x || min_y > max_y {
            return;
        }

        // Work in counter-clockwise order so every edge function is
        // positive inside.
        let order = if area > 0.0 { [0, 1, 2] } else { [0, 2, 1] };
        let area = area.abs();
        let v = order.map(|i| pts[i]);
        let w = Vec3::from(order.map(|i| w.to_array()[i]));
        let z = Vec3::from(order.map(|i| z_over_w.to_array()[i]));
        let ids = order.map(|i| corners[i]);
        let top_left = [is_top_left(v[1], v[2]), is_top_left(v[2], v[0]), is_top_left(v[0], v[1])];

        for y in min_y..=max_y {
            for x in min_x..=max_x {
                let p = Vec2::new(x as f32, y as f32);
                let e0 = edge_function(v[1], v[2], p);
                let e1 = edge_function(v[2], v[0], p);
                let e2 = edge_function(v[0], v[1], p);
                if !(covers(e0, top_left[0]) && covers(e1, top_left[1]) && covers(e2, top_left[2])) {
                    continue;
                }

                let Some(weights) = perspective_weights(Vec3::new(e0, e1, e2) / area, w) else {
                    continue;
                };
                self.shade_sample(x as u32, y as u32, weights, z, ids, shaded, target, stats);
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn shade_sample(
        &mut self,
        x: u32,
        y: u32,
        weights: Vec3,
        z_over_w: Vec3,
        ids: [usize; 3],
        shaded: &ShadedVertices,
        target: &mut RenderTarget,
        stats: &mut DrawStats,
    ) {
        stats.fragments += 1;

        let depth = z_over_w.lerp_barycentric(weights) * 0.5 + 0.5;
        if !(0.0..=1.0).contains(&depth) {
            stats.depth_clipped += 1;
            return;
        }
        if self.state.depth_test {
            if let Some(plane) = target.depth.as_ref() {
                if !self.state.depth_func.passes(depth, plane.depth(x, y)) {
                    stats.depth_rejected += 1;
                    return;
                }
            }
        }

        let (a, b, c) = (shaded.varyings_of(ids[0]), shaded.varyings_of(ids[1]), shaded.varyings_of(ids[2]));
        for (i, out) in self.scratch.iter_mut().enumerate() {
            *out = a[i] * weights.x + b[i] * weights.y + c[i] * weights.z;
        }

        let StageInstance { source, registers, .. } = &mut *self.stage;
        for slot in &self.layout.slots {
            let Some(field) = slot.fragment_field else { continue };
            if let Some(value) = Value::from_floats(slot.kind, &self.scratch[slot.offset..slot.offset + slot.len]) {
                registers.set(field, value);
            }
        }

        let mut inv = Invocation::new(registers, self.textures);
        source.main(&mut inv);
        if inv.is_discarded() {
            stats.discarded += 1;
            return;
        }
        let color = inv.color();

        if self.state.depth_mask {
            if let Some(plane) = target.depth.as_mut() {
                plane.set_depth(x, y, depth);
            }
        }
        if let Some(image) = target.color.as_mut() {
            image.set_texel(x, y, color);
        }
        stats.written += 1;
    }
}
