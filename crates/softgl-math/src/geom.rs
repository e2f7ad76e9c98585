use crate::mat::Mat4;
use crate::vec::{Vec2, Vec3, Vec4};

/// Axis-aligned box in screen space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Box2 {
    pub min: Vec2,
    pub max: Vec2,
}

impl Default for Box2 {
    fn default() -> Self {
        Box2::EMPTY
    }
}

impl Box2 {
    /// Contains nothing; expanding it by a point yields that point.
    pub const EMPTY: Box2 = Box2 {
        min: Vec2::new(f32::INFINITY, f32::INFINITY),
        max: Vec2::new(f32::NEG_INFINITY, f32::NEG_INFINITY),
    };

    #[inline]
    pub const fn new(min: Vec2, max: Vec2) -> Self {
        Self { min, max }
    }

    #[inline]
    pub fn expand(self, p: Vec2) -> Box2 {
        Box2::new(
            Vec2::new(self.min.x.min(p.x), self.min.y.min(p.y)),
            Vec2::new(self.max.x.max(p.x), self.max.y.max(p.y)),
        )
    }

    #[inline]
    pub fn intersect(self, other: Box2) -> Box2 {
        Box2::new(
            Vec2::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Vec2::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        )
    }

    /// Inclusive on both ends, so a single point is not empty.
    #[inline]
    pub fn is_empty(self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }
}

/// Twice the signed area of `(a, b, p)`. Positive when `p` lies to the
/// left of the directed edge `a → b` in a y-up frame.
#[inline]
pub fn edge_function(a: Vec2, b: Vec2, p: Vec2) -> f32 {
    (b - a).perp_dot(p - a)
}

/// Replaces a W of exactly zero with 1.0 so the perspective divide stays finite.
#[inline]
pub fn nonzero_w(w: f32) -> f32 {
    if w == 0.0 { 1.0 } else { w }
}

/// Three corners of a primitive, in whatever space the caller is working in.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Triangle {
    pub a: Vec4,
    pub b: Vec4,
    pub c: Vec4,
}

impl Triangle {
    #[inline]
    pub const fn new(a: Vec4, b: Vec4, c: Vec4) -> Self {
        Self { a, b, c }
    }

    #[inline]
    pub fn corners(&self) -> [Vec4; 3] {
        [self.a, self.b, self.c]
    }

    pub fn transform(&self, m: &Mat4) -> Triangle {
        Triangle::new(*m * self.a, *m * self.b, *m * self.c)
    }

    /// Divides each corner by the matching component of `w`.
    pub fn perspective_divide(&self, w: Vec3) -> Triangle {
        Triangle::new(self.a / w.x, self.b / w.y, self.c / w.z)
    }

    /// The W component of every corner, with zero replaced by one.
    pub fn safe_w(&self) -> Vec3 {
        Vec3::new(nonzero_w(self.a.w), nonzero_w(self.b.w), nonzero_w(self.c.w))
    }

    pub fn bounding_box(&self) -> Box2 {
        Box2::EMPTY.expand(self.a.xy()).expand(self.b.xy()).expand(self.c.xy())
    }

    /// Twice the signed XY area; positive for counter-clockwise corners (y up).
    pub fn signed_area(&self) -> f32 {
        edge_function(self.a.xy(), self.b.xy(), self.c.xy())
    }

    /// Barycentric weights of `p` for corners `(a, b, c)`, or `None` when the
    /// corners are collinear.
    ///
    /// Point queries only; the engine's rasterizer derives its weights from
    /// [`edge_function`] values instead.
    pub fn barycentric(&self, p: Vec2) -> Option<Vec3> {
        let v0 = self.b.xy() - self.a.xy();
        let v1 = self.c.xy() - self.a.xy();
        let v2 = p - self.a.xy();

        let d00 = v0.dot(v0);
        let d01 = v0.dot(v1);
        let d11 = v1.dot(v1);
        let d20 = v2.dot(v0);
        let d21 = v2.dot(v1);

        let denom = d00 * d11 - d01 * d01;
        if denom == 0.0 {
            return None;
        }

        let v = (d11 * d20 - d01 * d21) / denom;
        let w = (d00 * d21 - d01 * d20) / denom;
        Some(Vec3::new(1.0 - v - w, v, w))
    }

    /// Weighted sum of the corners.
    #[inline]
    pub fn lerp(&self, weights: Vec3) -> Vec4 {
        self.a * weights.x + self.b * weights.y + self.c * weights.z
    }
}
