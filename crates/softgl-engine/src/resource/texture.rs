use softgl_math::{clamp, Vec4};

use crate::error::{GlError, Result};

/// Upper bound on mip levels accepted by `tex_image_2d`.
pub const MAX_TEXTURE_LEVELS: usize = 16;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureTarget {
    Texture2D,
}

/// Channel layout of a texel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum PixelFormat {
    Luminance,
    Rgb,
    Rgba,
    DepthComponent,
}

impl PixelFormat {
    #[inline]
    pub const fn components(self) -> usize {
        match self {
            PixelFormat::Luminance | PixelFormat::DepthComponent => 1,
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Storage type of one channel.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DataType {
    UnsignedByte,
    Float,
}

impl DataType {
    #[inline]
    pub const fn size(self) -> usize {
        match self {
            DataType::UnsignedByte => 1,
            DataType::Float => 4,
        }
    }
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    Nearest,
    Linear,
}

#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum Wrap {
    ClampToEdge,
    #[default]
    Repeat,
    MirroredRepeat,
}

/// One `tex_parameter` setting.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TextureParameter {
    MinFilter(Filter),
    MagFilter(Filter),
    WrapS(Wrap),
    WrapT(Wrap),
}

/// Filtering and addressing state of a texture.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub struct SamplerParams {
    pub min_filter: Filter,
    pub mag_filter: Filter,
    pub wrap_s: Wrap,
    pub wrap_t: Wrap,
}

/// A single mip level: tightly packed rows, row 0 first.
#[derive(Debug, Clone, PartialEq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data_type: DataType,
    data: Vec<u8>,
}

impl Image {
    /// Fails with `InvalidValue` if the byte size does not fit in `usize`.
    pub fn zeroed(width: u32, height: u32, format: PixelFormat, data_type: DataType) -> Result<Self> {
        let len = (width as usize)
            .checked_mul(height as usize)
            .and_then(|n| n.checked_mul(format.components() * data_type.size()))
            .ok_or_else(|| GlError::invalid_value(format!("{width}x{height} {format:?}/{data_type:?} image is too large")))?;
        Ok(Self { width, height, format, data_type, data: vec![0; len] })
    }

    /// Copies the first `width * height` texels out of `bytes`.
    pub fn from_bytes(
        width: u32,
        height: u32,
        format: PixelFormat,
        data_type: DataType,
        bytes: &[u8],
    ) -> Result<Self> {
        let mut image = Image::zeroed(width, height, format, data_type)?;
        let needed = image.data.len();
        let src = bytes.get(..needed).ok_or_else(|| {
            GlError::invalid_value(format!(
                "{width}x{height} {format:?}/{data_type:?} image needs {needed} bytes, got {}",
                bytes.len()
            ))
        })?;
        image.data.copy_from_slice(src);
        Ok(image)
    }

    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    #[inline]
    pub fn format(&self) -> PixelFormat {
        self.format
    }

    #[inline]
    pub fn data_type(&self) -> DataType {
        self.data_type
    }

    /// Raw texel bytes, as handed to a presentation layer.
    #[inline]
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    #[inline]
    pub fn texel_size(&self) -> usize {
        self.format.components() * self.data_type.size()
    }

    #[inline]
    fn offset(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * self.texel_size()
    }

    fn channel(&self, at: usize) -> f32 {
        match self.data_type {
            DataType::UnsignedByte => self.data[at] as f32 / 255.0,
            DataType::Float => bytemuck::pod_read_unaligned(&self.data[at..at + 4]),
        }
    }

    fn set_channel(&mut self, at: usize, v: f32) {
        match self.data_type {
            DataType::UnsignedByte => self.data[at] = (clamp(v, 0.0, 1.0) * 255.0).round() as u8,
            DataType::Float => self.data[at..at + 4].copy_from_slice(&v.to_ne_bytes()),
        }
    }

    /// Texel at `(x, y)` expanded to RGBA: single-channel formats replicate
    /// into RGB, missing alpha reads as 1.
    pub fn texel(&self, x: u32, y: u32) -> Vec4 {
        let at = self.offset(x, y);
        let step = self.data_type.size();
        match self.format {
            PixelFormat::Luminance | PixelFormat::DepthComponent => {
                let v = self.channel(at);
                Vec4::new(v, v, v, 1.0)
            }
            PixelFormat::Rgb => Vec4::new(
                self.channel(at),
                self.channel(at + step),
                self.channel(at + 2 * step),
                1.0,
            ),
            PixelFormat::Rgba => Vec4::new(
                self.channel(at),
                self.channel(at + step),
                self.channel(at + 2 * step),
                self.channel(at + 3 * step),
            ),
        }
    }

    /// Stores the leading channels of `value` (R for single-channel formats).
    pub fn set_texel(&mut self, x: u32, y: u32, value: Vec4) {
        let at = self.offset(x, y);
        let step = self.data_type.size();
        let channels = value.to_array();
        for (i, v) in channels.iter().take(self.format.components()).enumerate() {
            self.set_channel(at + i * step, *v);
        }
    }

    /// First channel at `(x, y)`; the stored value of a depth plane.
    #[inline]
    pub fn depth(&self, x: u32, y: u32) -> f32 {
        self.channel(self.offset(x, y))
    }

    #[inline]
    pub fn set_depth(&mut self, x: u32, y: u32, depth: f32) {
        let at = self.offset(x, y);
        self.set_channel(at, depth);
    }

    pub fn fill(&mut self, value: Vec4) {
        if self.data.is_empty() {
            return;
        }
        self.set_texel(0, 0, value);
        let size = self.texel_size();
        let (first, rest) = self.data.split_at_mut(size);
        for chunk in rest.chunks_exact_mut(size) {
            chunk.copy_from_slice(first);
        }
    }
}

/// A texture object: mip levels plus sampling parameters.
#[derive(Debug, Clone, Default)]
pub struct Texture {
    levels: Vec<Option<Image>>,
    params: SamplerParams,
}

impl Texture {
    pub(crate) fn with_level(level: usize, image: Image) -> Self {
        let mut t = Texture::default();
        t.set_level(level, image);
        t
    }

    #[inline]
    pub fn level(&self, level: usize) -> Option<&Image> {
        self.levels.get(level).and_then(Option::as_ref)
    }

    #[inline]
    pub(crate) fn level_mut(&mut self, level: usize) -> Option<&mut Image> {
        self.levels.get_mut(level).and_then(Option::as_mut)
    }

    #[inline]
    pub fn params(&self) -> SamplerParams {
        self.params
    }

    pub(crate) fn set_level(&mut self, level: usize, image: Image) {
        if self.levels.len() <= level {
            self.levels.resize_with(level + 1, || None);
        }
        self.levels[level] = Some(image);
    }

    /// Moves a level out so it can be rendered into while other textures
    /// are sampled; pair with [`Texture::restore_level`].
    pub(crate) fn take_level(&mut self, level: usize) -> Option<Image> {
        self.levels.get_mut(level).and_then(Option::take)
    }

    pub(crate) fn restore_level(&mut self, level: usize, image: Image) {
        self.set_level(level, image);
    }

    pub(crate) fn apply(&mut self, param: TextureParameter) {
        match param {
            TextureParameter::MinFilter(f) => self.params.min_filter = f,
            TextureParameter::MagFilter(f) => self.params.mag_filter = f,
            TextureParameter::WrapS(w) => self.params.wrap_s = w,
            TextureParameter::WrapT(w) => self.params.wrap_t = w,
        }
    }
}
