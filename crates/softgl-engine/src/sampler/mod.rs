//! Texture sampling for shader code.
//!
//! Only level 0 is read. Coordinates use the GL convention: `v = 0` is the
//! last row of the image and `v = 1` the first, so rows are flipped on read.
//! Any lookup that cannot be resolved yields opaque white.

use softgl_math::{clamp, Vec2, Vec4};

use crate::object::{Store, TextureId};
use crate::resource::{Filter, Image, Texture, Wrap};

/// Result of a lookup that has nothing to sample.
pub const FALLBACK_COLOR: Vec4 = Vec4::ONE;

/// Read-only view of the texture units handed to shader invocations.
#[derive(Debug, Clone, Copy)]
pub struct TextureLookup<'a> {
    units: &'a [Option<TextureId>],
    textures: Option<&'a Store<TextureId, Texture>>,
}

impl<'a> TextureLookup<'a> {
    pub(crate) fn new(units: &'a [Option<TextureId>], textures: &'a Store<TextureId, Texture>) -> Self {
        Self { units, textures: Some(textures) }
    }

    /// A lookup with no units; every sample is [`FALLBACK_COLOR`].
    pub fn none() -> Self {
        Self { units: &[], textures: None }
    }

    fn resolve(&self, unit: i32) -> Option<&'a Texture> {
        let unit = usize::try_from(unit).ok()?;
        let id = (*self.units.get(unit)?)?;
        self.textures?.get(id).ok()
    }

    /// Samples the texture bound to `unit` at `uv`.
    pub fn sample(&self, unit: i32, uv: Vec2) -> Vec4 {
        self.resolve(unit)
            .map_or(FALLBACK_COLOR, |texture| sample_texture(texture, uv))
    }
}

/// Samples level 0 of `texture` with its magnification filter.
pub fn sample_texture(texture: &Texture, uv: Vec2) -> Vec4 {
    let Some(image) = texture.level(0) else {
        return FALLBACK_COLOR;
    };
    if image.width() == 0 || image.height() == 0 {
        return FALLBACK_COLOR;
    }

    let params = texture.params();
    match params.mag_filter {
        Filter::Nearest => sample_nearest(image, params.wrap_s, params.wrap_t, uv),
        Filter::Linear => sample_linear(image, params.wrap_s, params.wrap_t, uv),
    }
}

fn wrap_coord(c: f32, mode: Wrap) -> f32 {
    match mode {
        Wrap::ClampToEdge => clamp(c, 0.0, 1.0),
        Wrap::Repeat => c - c.floor(),
        Wrap::MirroredRepeat => {
            let t = c.floor();
            let f = c - t;
            if (t as i64) & 1 != 0 { 1.0 - f } else { f }
        }
    }
}

fn wrap_index(i: i64, size: u32, mode: Wrap) -> u32 {
    let n = i64::from(size);
    let wrapped = match mode {
        Wrap::ClampToEdge => i.clamp(0, n - 1),
        Wrap::Repeat => i.rem_euclid(n),
        Wrap::MirroredRepeat => {
            let m = i.rem_euclid(2 * n);
            if m >= n { 2 * n - 1 - m } else { m }
        }
    };
    wrapped as u32
}

fn sample_nearest(image: &Image, wrap_s: Wrap, wrap_t: Wrap, uv: Vec2) -> Vec4 {
    let (w, h) = (image.width(), image.height());
    let u = wrap_coord(uv.x, wrap_s);
    let v = wrap_coord(uv.y, wrap_t);
    let x = ((u * w as f32).floor() as i64).clamp(0, i64::from(w) - 1) as u32;
    let y = (((1.0 - v) * h as f32).floor() as i64).clamp(0, i64::from(h) - 1) as u32;
    image.texel(x, y)
}

fn sample_linear(image: &Image, wrap_s: Wrap, wrap_t: Wrap, uv: Vec2) -> Vec4 {
    let (w, h) = (image.width(), image.height());
    let fx = uv.x * w as f32 - 0.5;
    let fy = (1.0 - uv.y) * h as f32 - 0.5;
    let x0 = fx.floor();
    let y0 = fy.floor();
    let tx = fx - x0;
    let ty = fy - y0;

    let (x0, y0) = (x0 as i64, y0 as i64);
    let xa = wrap_index(x0, w, wrap_s);
    let xb = wrap_index(x0 + 1, w, wrap_s);
    let ya = wrap_index(y0, h, wrap_t);
    let yb = wrap_index(y0 + 1, h, wrap_t);

    let top = image.texel(xa, ya) * (1.0 - tx) + image.texel(xb, ya) * tx;
    let bottom = image.texel(xa, yb) * (1.0 - tx) + image.texel(xb, yb) * tx;
    top * (1.0 - ty) + bottom * ty
}
