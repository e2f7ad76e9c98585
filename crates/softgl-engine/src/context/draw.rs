use softgl_math::Vec4;

use crate::draw::{
    check_attachments, decode_indices, rasterize_triangles, shade_vertices, AttributeFetcher, DrawStats,
    IndexType, Primitive, RasterState, Rasterizer, RenderTarget, ShadedVertices, VaryingLayout,
};
use crate::error::{GlError, NotReady, Result};
use crate::object::{ObjectId, ProgramId};
use crate::resource::{Attachment, AttachmentRef, DataType, Image, PixelFormat};
use crate::sampler::TextureLookup;
use crate::state::ClearMask;

use super::{Context, DefaultFramebuffer};

/// Where the images of a [`RenderTarget`] go back to.
enum TargetSource {
    Default,
    Framebuffer {
        color: Option<AttachmentRef>,
        depth: Option<AttachmentRef>,
    },
}

impl DefaultFramebuffer {
    fn allocate(width: u32, height: u32, clear_color: Vec4, clear_depth: f32) -> Result<Self> {
        let mut color = Image::zeroed(width, height, PixelFormat::Rgba, DataType::Float)?;
        color.fill(clear_color);
        let mut depth = Image::zeroed(width, height, PixelFormat::DepthComponent, DataType::Float)?;
        depth.fill(Vec4::splat(clear_depth));
        log::debug!("default framebuffer: allocated {width}x{height}");

        Ok(Self { width, height, color: Some(color), depth: Some(depth) })
    }

    /// Copies the region both framebuffers cover out of `old`.
    fn copy_from(&mut self, old: &DefaultFramebuffer) {
        let width = self.width.min(old.width);
        let height = self.height.min(old.height);
        let planes = [
            (self.color.as_mut(), old.color.as_ref()),
            (self.depth.as_mut(), old.depth.as_ref()),
        ];
        for (dst, src) in planes {
            let (Some(dst), Some(src)) = (dst, src) else {
                continue;
            };
            for y in 0..height {
                for x in 0..width {
                    dst.set_texel(x, y, src.texel(x, y));
                }
            }
        }
    }
}

fn read_region<T>(
    image: &Image,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
    read: impl Fn(&Image, u32, u32) -> T,
) -> Result<Vec<T>> {
    let fits = u64::from(x) + u64::from(width) <= u64::from(image.width())
        && u64::from(y) + u64::from(height) <= u64::from(image.height());
    if !fits {
        return Err(GlError::invalid_value(format!(
            "region {x},{y} {width}x{height} exceeds {}x{} attachment",
            image.width(),
            image.height()
        )));
    }

    let mut out = Vec::with_capacity(width as usize * height as usize);
    for row in y..y + height {
        for col in x..x + width {
            out.push(read(image, col, row));
        }
    }
    Ok(out)
}

impl Context {
    // ── render targets ────────────────────────────────────────────────────

    /// Default framebuffer large enough to cover the viewport. It is
    /// allocated on first use and only ever grows: the old contents are
    /// kept and the new area is cleared.
    fn ensure_default_framebuffer(&mut self) -> Result<&mut DefaultFramebuffer> {
        let vp = self.state.viewport;
        let width = (i64::from(vp.x) + i64::from(vp.width)).clamp(0, i64::from(u32::MAX)) as u32;
        let height = (i64::from(vp.y) + i64::from(vp.height)).clamp(0, i64::from(u32::MAX)) as u32;

        let grow_to = match &self.default_framebuffer {
            Some(fb) if fb.width >= width && fb.height >= height => None,
            Some(fb) => Some((fb.width.max(width), fb.height.max(height))),
            None => Some((width, height)),
        };
        if let Some((width, height)) = grow_to {
            self.check_image_size(width, height)?;
            let mut fb =
                DefaultFramebuffer::allocate(width, height, self.state.clear_color, self.state.clear_depth)?;
            if let Some(old) = &self.default_framebuffer {
                fb.copy_from(old);
            }
            self.default_framebuffer = Some(fb);
        }

        self.default_framebuffer
            .as_mut()
            .ok_or_else(|| NotReady::IncompleteFramebuffer("default framebuffer is not available").into())
    }

    fn attached_image(&self, r: Option<AttachmentRef>) -> Result<Option<&Image>> {
        let Some(r) = r else {
            return Ok(None);
        };
        self.textures
            .get(r.texture)?
            .level(r.level)
            .map(Some)
            .ok_or_else(|| NotReady::IncompleteFramebuffer("attachment level has no image").into())
    }

    /// Moves the attachment images of the bound framebuffer out of their
    /// owners. Nothing is moved unless the framebuffer is complete.
    fn acquire_target(&mut self) -> Result<(RenderTarget, TargetSource)> {
        let Some(id) = self.state.framebuffer else {
            let fb = self.ensure_default_framebuffer()?;
            let target = RenderTarget::new(fb.color.take(), fb.depth.take());
            return Ok((target, TargetSource::Default));
        };

        let framebuffer = self.framebuffers.get(id)?;
        let color = framebuffer.attachment(Attachment::Color0);
        let depth = framebuffer.attachment(Attachment::Depth);

        if let Err(e) = check_attachments(self.attached_image(color)?, self.attached_image(depth)?) {
            log::warn!("framebuffer {id}: {e}");
            return Err(e.into());
        }

        let mut take = |r: Option<AttachmentRef>| {
            r.and_then(|r| self.textures.get_mut(r.texture).ok()?.take_level(r.level))
        };
        let target = RenderTarget::new(take(color), take(depth));
        Ok((target, TargetSource::Framebuffer { color, depth }))
    }

    fn release_target(&mut self, source: TargetSource, target: RenderTarget) {
        let (color_image, depth_image) = target.into_parts();
        match source {
            TargetSource::Default => {
                if let Some(fb) = self.default_framebuffer.as_mut() {
                    fb.color = color_image;
                    fb.depth = depth_image;
                }
            }
            TargetSource::Framebuffer { color, depth } => {
                for (r, image) in [(color, color_image), (depth, depth_image)] {
                    if let (Some(r), Some(image)) = (r, image) {
                        if let Ok(texture) = self.textures.get_mut(r.texture) {
                            texture.restore_level(r.level, image);
                        }
                    }
                }
            }
        }
    }

    /// Attachment image of the bound (or default) framebuffer.
    fn attachment_image(&mut self, slot: Attachment) -> Result<&Image> {
        let Some(id) = self.state.framebuffer else {
            let fb = self.ensure_default_framebuffer()?;
            let image = match slot {
                Attachment::Color0 => fb.color.as_ref(),
                Attachment::Depth => fb.depth.as_ref(),
            };
            return image.ok_or_else(|| NotReady::IncompleteFramebuffer("default framebuffer is not available").into());
        };

        let missing = match slot {
            Attachment::Color0 => "no color attachment",
            Attachment::Depth => "no depth attachment",
        };
        let r = self
            .framebuffers
            .get(id)?
            .attachment(slot)
            .ok_or(NotReady::IncompleteFramebuffer(missing))?;
        self.textures
            .get(r.texture)?
            .level(r.level)
            .ok_or_else(|| NotReady::IncompleteFramebuffer("attachment level has no image").into())
    }

    // ── clears and draws ──────────────────────────────────────────────────

    /// Fills the selected attachments of the bound (or default) framebuffer
    /// with the clear colour and clear depth.
    pub fn clear(&mut self, mask: ClearMask) -> Result<()> {
        let (mut target, source) = self.acquire_target()?;
        target.clear(mask, self.state.clear_color, self.state.clear_depth);
        self.release_target(source, target);
        Ok(())
    }

    /// Draws `count` vertices starting at vertex `first`.
    pub fn draw_arrays(&mut self, mode: Primitive, first: usize, count: usize) -> Result<DrawStats> {
        let end = first
            .checked_add(count)
            .and_then(|end| u32::try_from(end).ok())
            .ok_or_else(|| GlError::invalid_value("vertex range exceeds u32"))?;
        let start = end - count as u32;
        self.draw(mode, start..end)
    }

    /// Draws `count` indexed vertices. `indices` holds the index data;
    /// `None` reads the current vertex array's element buffer.
    pub fn draw_elements(
        &mut self,
        mode: Primitive,
        count: usize,
        index_type: IndexType,
        indices: Option<&[u8]>,
    ) -> Result<DrawStats> {
        let decoded = match indices {
            Some(bytes) => decode_indices(index_type, bytes, count)?,
            None => {
                let id = self.current_vertex_array()?.index_buffer().ok_or(NotReady::NoIndexData)?;
                decode_indices(index_type, self.buffers.get(id)?.data(), count)?
            }
        };
        self.draw(mode, decoded.into_iter())
    }

    fn draw(&mut self, mode: Primitive, vertices: impl ExactSizeIterator<Item = u32>) -> Result<DrawStats> {
        let Primitive::Triangles = mode;
        let program = self.state.current_program.ok_or(NotReady::NoProgram)?;

        let (layout, shaded) = self.run_vertex_stage(program, vertices)?;
        let (mut target, source) = self.acquire_target()?;
        let stats = self.rasterize(program, &layout, &shaded, &mut target);
        self.release_target(source, target);

        log::debug!(
            "draw: {} vertices, {} triangles ({} culled, {} degenerate), {} of {} fragments written",
            stats.vertices,
            stats.triangles,
            stats.culled,
            stats.degenerate,
            stats.written,
            stats.fragments
        );
        Ok(stats)
    }

    /// Fetch and vertex stage. Every draw-time configuration error surfaces
    /// here.
    fn run_vertex_stage(
        &mut self,
        program: ProgramId,
        vertices: impl ExactSizeIterator<Item = u32>,
    ) -> Result<(VaryingLayout, ShadedVertices)> {
        let vertex_array = match self.state.vertex_array {
            Some(id) => self.vertex_arrays.get(id)?,
            None => &self.default_vertex_array,
        };
        let linked = self
            .programs
            .get_mut(program)?
            .linked_mut()
            .ok_or(NotReady::ProgramNotLinked(program.get()))?;

        let layout = VaryingLayout::new(&linked.vertex.descriptor, &linked.fragment.descriptor);
        let fetcher = AttributeFetcher::new(
            linked.attributes(),
            vertex_array,
            &self.buffers,
            &self.state.generic_attribs,
        )?;
        let textures = TextureLookup::new(&self.state.texture_units, &self.textures);
        let shaded = shade_vertices(&mut linked.vertex, &fetcher, &layout, textures, vertices)?;
        Ok((layout, shaded))
    }

    fn rasterize(
        &mut self,
        program: ProgramId,
        layout: &VaryingLayout,
        shaded: &ShadedVertices,
        target: &mut RenderTarget,
    ) -> DrawStats {
        let mut stats = DrawStats { vertices: shaded.len(), ..DrawStats::default() };
        let Self { programs, textures, state, .. } = self;
        let Some(linked) = programs.get_mut(program).ok().and_then(|p| p.linked_mut()) else {
            return stats;
        };

        let raster_state = RasterState {
            viewport: state.viewport,
            depth_test: state.depth_test,
            depth_func: state.depth_func,
            depth_mask: state.depth_mask,
            cull: state.cull_face.then_some((state.cull_mode, state.front_face)),
        };
        let lookup = TextureLookup::new(&state.texture_units, textures);
        let mut rasterizer = Rasterizer::new(&mut linked.fragment, layout, lookup, raster_state, target);
        rasterize_triangles(&mut rasterizer, shaded, target, &mut stats);
        stats
    }

    // ── readback ──────────────────────────────────────────────────────────

    /// Colour of a region of the bound (or default) framebuffer as 8-bit
    /// RGBA, rows bottom-up.
    pub fn read_pixels(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<Vec<[u8; 4]>> {
        let image = self.attachment_image(Attachment::Color0)?;
        read_region(image, x, y, width, height, |img, col, row| {
            let c = img.texel(col, row).clamp(0.0, 1.0) * 255.0;
            [c.x.round() as u8, c.y.round() as u8, c.z.round() as u8, c.w.round() as u8]
        })
    }

    /// Colour of a region as stored, without quantization.
    pub fn read_pixels_f32(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<Vec<Vec4>> {
        let image = self.attachment_image(Attachment::Color0)?;
        read_region(image, x, y, width, height, Image::texel)
    }

    /// Window depth of a region, rows bottom-up.
    pub fn read_depth(&mut self, x: u32, y: u32, width: u32, height: u32) -> Result<Vec<f32>> {
        let image = self.attachment_image(Attachment::Depth)?;
        read_region(image, x, y, width, height, Image::depth)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ContextConfig;
    use crate::resource::{RenderbufferFormat, TextureTarget};

    // ── default framebuffer ───────────────────────────────────────────────

    #[test]
    fn default_framebuffer_is_allocated_cleared() {
        let mut ctx = Context::new(ContextConfig::with_size(2, 2));
        ctx.clear_color(0.0, 0.0, 1.0, 1.0);
        assert_eq!(ctx.read_pixels(0, 0, 2, 2).unwrap(), vec![[0, 0, 255, 255]; 4]);
        assert_eq!(ctx.read_depth(1, 1, 1, 1).unwrap(), vec![1.0]);
    }

    #[test]
    fn default_framebuffer_follows_viewport_size() {
        let mut ctx = Context::new(ContextConfig::with_size(2, 2));
        ctx.clear(ClearMask::COLOR).unwrap();
        assert!(ctx.read_pixels(0, 0, 3, 1).is_err());

        ctx.viewport(1, 0, 3, 4);
        let pixels = ctx.read_pixels_f32(0, 0, 4, 4).unwrap();
        assert_eq!(pixels.len(), 16);
    }

    #[test]
    fn default_framebuffer_keeps_contents_across_viewports() {
        let mut ctx = Context::new(ContextConfig::with_size(2, 2));
        ctx.clear_color(1.0, 0.0, 0.0, 1.0);
        ctx.clear(ClearMask::COLOR).unwrap();

        ctx.viewport(0, 0, 1, 1);
        ctx.clear_color(0.0, 1.0, 0.0, 1.0);
        assert_eq!(ctx.read_pixels(0, 0, 2, 2).unwrap(), vec![[255, 0, 0, 255]; 4]);

        ctx.viewport(0, 0, 3, 2);
        let pixels = ctx.read_pixels(0, 0, 3, 2).unwrap();
        assert_eq!(pixels[0], [255, 0, 0, 255]);
        assert_eq!(pixels[4], [255, 0, 0, 255]);
        assert_eq!(pixels[2], [0, 255, 0, 255]);
        assert_eq!(pixels[5], [0, 255, 0, 255]);
    }

    #[test]
    fn oversized_viewport_is_rejected() {
        let mut ctx = Context::new(ContextConfig::with_size(2, 2));
        ctx.viewport(0, 0, u32::MAX, 1);
        assert!(matches!(ctx.clear(ClearMask::COLOR), Err(GlError::InvalidValue(_))));
    }

    #[test]
    fn clear_depth_only_keeps_color() {
        let mut ctx = Context::new(ContextConfig::with_size(1, 1));
        ctx.clear_color(1.0, 0.0, 0.0, 1.0);
        ctx.clear(ClearMask::COLOR).unwrap();
        ctx.clear_color(0.0, 1.0, 0.0, 1.0);
        ctx.clear_depth(0.25);
        ctx.clear(ClearMask::DEPTH).unwrap();
        assert_eq!(ctx.read_pixels(0, 0, 1, 1).unwrap(), vec![[255, 0, 0, 255]]);
        assert_eq!(ctx.read_depth(0, 0, 1, 1).unwrap(), vec![0.25]);
    }

    // ── framebuffer objects ───────────────────────────────────────────────

    #[test]
    fn clear_writes_through_attachments() {
        let mut ctx = Context::default();
        let tex = ctx.create_texture();
        ctx.bind_texture(TextureTarget::Texture2D, Some(tex)).unwrap();
        ctx.tex_image_2d(
            TextureTarget::Texture2D,
            0,
            PixelFormat::Rgba,
            2,
            1,
            0,
            PixelFormat::Rgba,
            DataType::UnsignedByte,
            None,
        )
        .unwrap();
        let fb = ctx.create_framebuffer();
        ctx.bind_framebuffer(Some(fb)).unwrap();
        ctx.framebuffer_texture_2d(Attachment::Color0, Some(tex), 0).unwrap();

        ctx.clear_color(1.0, 1.0, 0.0, 1.0);
        ctx.clear(ClearMask::COLOR | ClearMask::DEPTH).unwrap();
        assert_eq!(ctx.texture(tex).unwrap().level(0).unwrap().data(), &[255, 255, 0, 255, 255, 255, 0, 255]);
        assert!(ctx.read_depth(0, 0, 1, 1).is_err());
    }

    #[test]
    fn mismatched_attachments_are_incomplete() {
        let mut ctx = Context::default();
        let color = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(Some(color)).unwrap();
        ctx.renderbuffer_storage(RenderbufferFormat::Rgba8, 4, 4).unwrap();
        let depth = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(Some(depth)).unwrap();
        ctx.renderbuffer_storage(RenderbufferFormat::DepthComponent32F, 2, 2).unwrap();

        let fb = ctx.create_framebuffer();
        ctx.bind_framebuffer(Some(fb)).unwrap();
        ctx.framebuffer_renderbuffer(Attachment::Color0, Some(color)).unwrap();
        ctx.framebuffer_renderbuffer(Attachment::Depth, Some(depth)).unwrap();

        assert_eq!(
            ctx.clear(ClearMask::COLOR),
            Err(GlError::PipelineNotReady(NotReady::IncompleteFramebuffer("attachment sizes differ")))
        );
        // Nothing was moved out of the store.
        assert_eq!(ctx.read_pixels(0, 0, 4, 4).unwrap().len(), 16);
    }

    #[test]
    fn empty_framebuffer_is_incomplete() {
        let mut ctx = Context::default();
        let fb = ctx.create_framebuffer();
        ctx.bind_framebuffer(Some(fb)).unwrap();
        assert!(matches!(
            ctx.clear(ClearMask::COLOR),
            Err(GlError::PipelineNotReady(NotReady::IncompleteFramebuffer(_)))
        ));
    }

    // ── draw validation ───────────────────────────────────────────────────

    #[test]
    fn draw_without_program_fails() {
        let mut ctx = Context::default();
        assert_eq!(
            ctx.draw_arrays(Primitive::Triangles, 0, 3),
            Err(GlError::PipelineNotReady(NotReady::NoProgram))
        );
    }

    #[test]
    fn draw_elements_needs_index_data() {
        let mut ctx = Context::default();
        let p = ctx.create_program();
        ctx.use_program(Some(p)).unwrap();
        assert_eq!(
            ctx.draw_elements(Primitive::Triangles, 3, IndexType::UnsignedShort, None),
            Err(GlError::PipelineNotReady(NotReady::NoIndexData))
        );
        assert_eq!(
            ctx.draw_arrays(Primitive::Triangles, 0, 3),
            Err(GlError::PipelineNotReady(NotReady::ProgramNotLinked(p.get())))
        );
    }
}
