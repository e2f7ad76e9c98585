//! End-to-end draws through the public API.

use std::sync::Arc;

use anyhow::Result;

use softgl_engine::logging::{init_logging, LoggingConfig};
use softgl_engine::math::{Vec2, Vec4};
use softgl_engine::object::{BufferId, ProgramId, TextureId};
use softgl_engine::resource::{
    AttribType, Attachment, BufferTarget, BufferUsage, DataType, PixelFormat, RenderbufferFormat,
    TextureTarget,
};
use softgl_engine::{
    Capability, ClearMask, Context, ContextConfig, DescriptorBuilder, FrontFace, GlError, IndexType,
    Invocation, NotReady, Primitive, ShaderKind, ShaderSource, ValueKind,
};

const RED: [u8; 4] = [255, 0, 0, 255];
const GREEN: [u8; 4] = [0, 255, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];
const WHITE: [u8; 4] = [255, 255, 255, 255];
const BLACK: [u8; 4] = [0, 0, 0, 255];

fn approx(a: f32, b: f32, eps: f32) -> bool {
    (a - b).abs() <= eps
}

// ── shaders ───────────────────────────────────────────────────────────────

/// Position straight through.
struct SolidVs;

impl ShaderSource for SolidVs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.attribute("position", ValueKind::Vec4);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let p = inv.vec4(0);
        inv.set_position(p);
    }
}

/// Uniform colour; zero alpha discards.
struct SolidFs;

impl ShaderSource for SolidFs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.uniform("color", ValueKind::Vec4);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let c = inv.vec4(0);
        if c.w == 0.0 {
            inv.discard();
            return;
        }
        inv.set_color(c);
    }
}

/// Forwards clip W as a varying.
struct ClipWVs;

impl ShaderSource for ClipWVs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.attribute("position", ValueKind::Vec4);
        f.varying("clip_w", ValueKind::Float);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let p = inv.vec4(0);
        inv.set_position(p);
        inv.set_float(1, p.w);
    }
}

struct ClipWFs;

impl ShaderSource for ClipWFs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.varying("clip_w", ValueKind::Float);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let w = inv.float(0);
        inv.set_color(Vec4::new(w, 0.0, 0.0, 1.0));
    }
}

/// Per-vertex colour.
struct ColorVs;

impl ShaderSource for ColorVs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.attribute("position", ValueKind::Vec4);
        f.attribute("color", ValueKind::Vec4);
        f.varying("v_color", ValueKind::Vec4);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let p = inv.vec4(0);
        let c = inv.vec4(1);
        inv.set_position(p);
        inv.set_vec4(2, c);
    }
}

struct ColorFs;

impl ShaderSource for ColorFs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.varying("v_color", ValueKind::Vec4);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let c = inv.vec4(0);
        inv.set_color(c);
    }
}

struct TexturedVs;

impl ShaderSource for TexturedVs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.attribute("position", ValueKind::Vec4);
        f.attribute("uv", ValueKind::Vec2);
        f.varying("v_uv", ValueKind::Vec2);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let p = inv.vec4(0);
        let uv = inv.vec2(1);
        inv.set_position(p);
        inv.set_vec2(2, uv);
    }
}

struct TexturedFs;

impl ShaderSource for TexturedFs {
    fn declare(&self, f: &mut DescriptorBuilder) {
        f.varying("v_uv", ValueKind::Vec2);
        f.uniform("albedo", ValueKind::Sampler2D);
    }

    fn main(&self, inv: &mut Invocation<'_>) {
        let uv: Vec2 = inv.vec2(0);
        let c = inv.texture_2d(inv.sampler(1), uv);
        inv.set_color(c);
    }
}

// ── helpers ───────────────────────────────────────────────────────────────

fn context(width: u32, height: u32) -> Context {
    init_logging(LoggingConfig::for_tests());
    Context::new(ContextConfig::with_size(width, height))
}

fn program(ctx: &mut Context, vs: impl ShaderSource + 'static, fs: impl ShaderSource + 'static) -> Result<ProgramId> {
    let v = ctx.create_shader(ShaderKind::Vertex);
    ctx.shader_source(v, Arc::new(vs))?;
    ctx.compile_shader(v)?;
    let f = ctx.create_shader(ShaderKind::Fragment);
    ctx.shader_source(f, Arc::new(fs))?;
    ctx.compile_shader(f)?;

    let p = ctx.create_program();
    ctx.attach_shader(p, v)?;
    ctx.attach_shader(p, f)?;
    ctx.link_program(p)?;
    ctx.use_program(Some(p))?;
    Ok(p)
}

/// Uploads tightly packed floats and points attribute `location` at them.
fn attribute(ctx: &mut Context, location: usize, size: usize, data: &[f32]) -> Result<BufferId> {
    let buf = ctx.create_buffer();
    ctx.bind_buffer(BufferTarget::Array, Some(buf))?;
    ctx.buffer_data(BufferTarget::Array, data, BufferUsage::StaticDraw)?;
    ctx.vertex_attrib_pointer(location, size, AttribType::Float, false, 0, 0)?;
    ctx.enable_vertex_attrib_array(location)?;
    ctx.bind_buffer(BufferTarget::Array, None)?;
    Ok(buf)
}

fn set_color(ctx: &mut Context, program: ProgramId, c: [f32; 4]) -> Result<()> {
    let loc = ctx.get_uniform_location(program, "color")?.expect("color uniform");
    ctx.uniform_4fv(loc, &c)?;
    Ok(())
}

/// Binds a framebuffer with an RGBA8 colour texture and, optionally, a
/// float depth renderbuffer.
fn offscreen(ctx: &mut Context, width: u32, height: u32, with_depth: bool) -> Result<TextureId> {
    let tex = ctx.create_texture();
    ctx.bind_texture(TextureTarget::Texture2D, Some(tex))?;
    ctx.tex_image_2d(
        TextureTarget::Texture2D,
        0,
        PixelFormat::Rgba,
        width,
        height,
        0,
        PixelFormat::Rgba,
        DataType::UnsignedByte,
        None,
    )?;
    ctx.bind_texture(TextureTarget::Texture2D, None)?;

    let fb = ctx.create_framebuffer();
    ctx.bind_framebuffer(Some(fb))?;
    ctx.framebuffer_texture_2d(Attachment::Color0, Some(tex), 0)?;

    if with_depth {
        let rb = ctx.create_renderbuffer();
        ctx.bind_renderbuffer(Some(rb))?;
        ctx.renderbuffer_storage(RenderbufferFormat::DepthComponent32F, width, height)?;
        ctx.framebuffer_renderbuffer(Attachment::Depth, Some(rb))?;
    }
    Ok(tex)
}

fn pixel(ctx: &mut Context, x: u32, y: u32) -> Result<[u8; 4]> {
    Ok(ctx.read_pixels(x, y, 1, 1)?[0])
}

// ── flat fill ─────────────────────────────────────────────────────────────

#[test]
fn flat_triangle_covers_pixel_centres() -> Result<()> {
    let mut ctx = context(4, 4);
    offscreen(&mut ctx, 4, 4, false)?;
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 1.0])?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 1.0, -1.0, 0.0, 1.0])?;

    ctx.clear_color(0.0, 0.0, 0.0, 1.0);
    ctx.clear(ClearMask::COLOR)?;
    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.triangles, 1);
    assert_eq!(stats.written, 8);

    let expected_red = [(0, 0), (1, 0), (2, 0), (3, 0), (1, 1), (2, 1), (1, 2), (2, 2)];
    for y in 0..4 {
        for x in 0..4 {
            let want = if expected_red.contains(&(x, y)) { RED } else { BLACK };
            assert_eq!(pixel(&mut ctx, x, y)?, want, "pixel ({x}, {y})");
        }
    }
    Ok(())
}

#[test]
fn shared_edge_samples_are_written_once() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [0.0, 1.0, 0.0, 1.0])?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, 1.0])?;

    // Lower-right half through client-side indices.
    let first: [u8; 3] = [0, 1, 2];
    let stats = ctx.draw_elements(Primitive::Triangles, 3, IndexType::UnsignedByte, Some(&first[..]))?;
    assert_eq!(stats.written, 10);

    // Whole quad through an element buffer.
    ctx.clear(ClearMask::COLOR)?;
    let ibo = ctx.create_buffer();
    ctx.bind_buffer(BufferTarget::ElementArray, Some(ibo))?;
    ctx.buffer_data(BufferTarget::ElementArray, &[0u16, 1, 2, 0, 2, 3], BufferUsage::StaticDraw)?;
    let stats = ctx.draw_elements(Primitive::Triangles, 6, IndexType::UnsignedShort, None)?;
    assert_eq!(stats.triangles, 2);
    assert_eq!(stats.written, 16);
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == GREEN));
    Ok(())
}

#[test]
fn trailing_partial_triangle_is_ignored() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 1.0, 1.0, 1.0])?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 1.0, -1.0, 0.0, 1.0, 0.5, 0.5, 0.0, 0.0])?;

    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 5)?;
    assert_eq!(stats.vertices, 5);
    assert_eq!(stats.triangles, 1);
    Ok(())
}

#[test]
fn collinear_triangle_is_dropped() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 1.0])?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 0.0, 0.0, 1.0, 1.0])?;
    ctx.clear_color(0.0, 0.0, 1.0, 1.0);
    ctx.clear(ClearMask::COLOR)?;

    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.triangles, 1);
    assert_eq!(stats.degenerate, 1);
    assert_eq!(stats.fragments, 0);
    assert_eq!(stats.written, 0);
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == BLUE));
    Ok(())
}

#[test]
fn zero_w_corners_stay_finite() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 1.0])?;
    // Apex has W = 0; it is treated as W = 1.
    let buf = attribute(
        &mut ctx,
        0,
        4,
        &[-1.0, -1.0, 0.0, 1.0, 1.0, -1.0, 0.0, 1.0, 0.0, 1.0, 0.0, 0.0],
    )?;
    ctx.clear_color(0.0, 0.0, 0.0, 1.0);
    ctx.clear(ClearMask::COLOR)?;

    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.degenerate, 0);
    assert_eq!(stats.written, 8);
    assert_eq!(pixel(&mut ctx, 1, 2)?, RED);
    assert_eq!(pixel(&mut ctx, 0, 3)?, BLACK);

    // Every corner at the origin with W = 0 collapses to a point.
    ctx.bind_buffer(BufferTarget::Array, Some(buf))?;
    ctx.buffer_data(BufferTarget::Array, &[0.0f32; 12], BufferUsage::DynamicDraw)?;
    ctx.bind_buffer(BufferTarget::Array, None)?;
    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.degenerate, 1);
    assert_eq!(stats.written, 0);

    let pixels = ctx.read_pixels_f32(0, 0, 4, 4)?;
    assert!(pixels.iter().all(|c| c.to_array().iter().all(|v| v.is_finite())));
    Ok(())
}

// ── viewport ──────────────────────────────────────────────────────────────

#[test]
fn sub_viewport_draw_keeps_earlier_output() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0])?;

    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 1.0])?;
    assert_eq!(ctx.draw_arrays(Primitive::Triangles, 0, 3)?.written, 16);

    ctx.viewport(0, 0, 2, 2);
    set_color(&mut ctx, p, [0.0, 1.0, 0.0, 1.0])?;
    assert_eq!(ctx.draw_arrays(Primitive::Triangles, 0, 3)?.written, 4);

    ctx.viewport(0, 0, 4, 4);
    for y in 0..4 {
        for x in 0..4 {
            let want = if x < 2 && y < 2 { GREEN } else { RED };
            assert_eq!(pixel(&mut ctx, x, y)?, want, "pixel ({x}, {y})");
        }
    }
    Ok(())
}

// ── depth ─────────────────────────────────────────────────────────────────

fn draw_cover(ctx: &mut Context, program: ProgramId, buf: BufferId, z: f32, color: [f32; 4]) -> Result<()> {
    ctx.bind_buffer(BufferTarget::Array, Some(buf))?;
    ctx.buffer_data(
        BufferTarget::Array,
        &[-1.0f32, -1.0, z, 3.0, -1.0, z, -1.0, 3.0, z],
        BufferUsage::DynamicDraw,
    )?;
    ctx.bind_buffer(BufferTarget::Array, None)?;
    set_color(ctx, program, color)?;
    ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    Ok(())
}

fn check_nearest_wins(mut ctx: Context) -> Result<()> {
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    let buf = attribute(&mut ctx, 0, 3, &[0.0; 9])?;
    ctx.enable(Capability::DepthTest);
    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH)?;

    draw_cover(&mut ctx, p, buf, 0.1, [1.0, 0.0, 0.0, 1.0])?;
    draw_cover(&mut ctx, p, buf, 0.9, [0.0, 1.0, 0.0, 1.0])?;
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == RED));
    assert!(ctx.read_depth(0, 0, 4, 4)?.iter().all(|&d| approx(d, 0.55, 1e-5)));

    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH)?;
    draw_cover(&mut ctx, p, buf, 0.9, [0.0, 1.0, 0.0, 1.0])?;
    draw_cover(&mut ctx, p, buf, 0.1, [1.0, 0.0, 0.0, 1.0])?;
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == RED));

    // Equal depth: the later triangle wins.
    draw_cover(&mut ctx, p, buf, 0.1, [0.0, 0.0, 1.0, 1.0])?;
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == BLUE));
    Ok(())
}

#[test]
fn nearer_fragment_survives_on_default_framebuffer() -> Result<()> {
    check_nearest_wins(context(4, 4))
}

#[test]
fn nearer_fragment_survives_on_framebuffer_object() -> Result<()> {
    let mut ctx = context(4, 4);
    offscreen(&mut ctx, 4, 4, true)?;
    check_nearest_wins(ctx)
}

#[test]
fn depth_outside_unit_range_is_clipped() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    let buf = attribute(&mut ctx, 0, 3, &[0.0; 9])?;
    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH)?;

    draw_cover(&mut ctx, p, buf, -1.5, [1.0, 0.0, 0.0, 1.0])?;
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == [0, 0, 0, 0]));
    Ok(())
}

// ── discard ───────────────────────────────────────────────────────────────

#[test]
fn discarded_fragments_leave_target_untouched() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0])?;
    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 0.0])?;

    ctx.enable(Capability::DepthTest);
    ctx.clear_color(0.0, 0.0, 1.0, 1.0);
    ctx.clear(ClearMask::COLOR | ClearMask::DEPTH)?;
    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;

    assert_eq!(stats.fragments, 16);
    assert_eq!(stats.discarded, 16);
    assert_eq!(stats.written, 0);
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == BLUE));
    assert!(ctx.read_depth(0, 0, 4, 4)?.iter().all(|&d| d == 1.0));
    Ok(())
}

// ── interpolation ─────────────────────────────────────────────────────────

#[test]
fn varyings_are_perspective_correct() -> Result<()> {
    let mut ctx = context(8, 8);
    program(&mut ctx, ClipWVs, ClipWFs)?;
    // NDC corners (-1,-1), (1,-1), (-1,1) with W = 1, 2, 4.
    attribute(
        &mut ctx,
        0,
        4,
        &[-1.0, -1.0, 0.0, 1.0, 2.0, -2.0, 0.0, 2.0, -4.0, 4.0, 0.0, 4.0],
    )?;
    ctx.clear(ClearMask::COLOR)?;
    ctx.draw_arrays(Primitive::Triangles, 0, 3)?;

    let at = |ctx: &mut Context, x: u32, y: u32| -> Result<f32> { Ok(ctx.read_pixels_f32(x, y, 1, 1)?[0].x) };

    let centre = at(&mut ctx, 2, 2)?;
    assert!(approx(centre, 1.0 / (0.375 + 0.3125 / 2.0 + 0.3125 / 4.0), 1e-4), "got {centre}");
    assert!(!approx(centre, 2.25, 0.1), "screen-linear interpolation");

    for y in 0..8u32 {
        for x in 0..8u32 {
            if x + y > 5 {
                continue;
            }
            let b1 = (x as f32 + 0.5) / 8.0;
            let b2 = (y as f32 + 0.5) / 8.0;
            let b0 = 1.0 - b1 - b2;
            let expected = 1.0 / (b0 + b1 / 2.0 + b2 / 4.0);
            let got = at(&mut ctx, x, y)?;
            assert!(approx(got, expected, 1e-4), "({x}, {y}): {got} vs {expected}");
        }
    }
    Ok(())
}

#[test]
fn normalized_byte_colors_reach_full_intensity() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, ColorVs, ColorFs)?;
    assert_eq!(ctx.get_attrib_location(p, "color")?, Some(1));
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0])?;

    let colors = ctx.create_buffer();
    ctx.bind_buffer(BufferTarget::Array, Some(colors))?;
    ctx.buffer_data(
        BufferTarget::Array,
        &[255u8, 128, 0, 255, 255, 128, 0, 255, 255, 128, 0, 255],
        BufferUsage::StaticDraw,
    )?;
    ctx.vertex_attrib_pointer(1, 4, AttribType::UnsignedByte, true, 0, 0)?;
    ctx.enable_vertex_attrib_array(1)?;

    ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(pixel(&mut ctx, 1, 2)?, [255, 128, 0, 255]);
    let c = ctx.read_pixels_f32(1, 2, 1, 1)?[0];
    assert!(approx(c.x, 1.0, 1e-6));
    assert!(approx(c.y, 128.0 / 255.0, 1e-6));
    Ok(())
}

#[test]
fn disabled_attribute_reads_generic_value() -> Result<()> {
    let mut ctx = context(4, 4);
    program(&mut ctx, ColorVs, ColorFs)?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0])?;

    ctx.vertex_attrib_4f(1, Vec4::new(0.0, 0.0, 1.0, 1.0))?;
    ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == BLUE));
    Ok(())
}

// ── textures ──────────────────────────────────────────────────────────────

#[test]
fn textured_quad_samples_with_flipped_rows() -> Result<()> {
    let mut ctx = context(2, 2);
    let p = program(&mut ctx, TexturedVs, TexturedFs)?;
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 1.0, -1.0, 1.0, 1.0, -1.0, -1.0, 1.0, 1.0, -1.0, 1.0])?;
    attribute(&mut ctx, 1, 2, &[0.0, 0.0, 1.0, 0.0, 1.0, 1.0, 0.0, 0.0, 1.0, 1.0, 0.0, 1.0])?;

    // First row is the top of the image (v = 1).
    let texels = [RED, GREEN, BLUE, WHITE].concat();
    let tex = ctx.create_texture();
    ctx.active_texture(2)?;
    ctx.bind_texture(TextureTarget::Texture2D, Some(tex))?;
    ctx.tex_image_2d(
        TextureTarget::Texture2D,
        0,
        PixelFormat::Rgba,
        2,
        2,
        0,
        PixelFormat::Rgba,
        DataType::UnsignedByte,
        Some(texels.as_slice()),
    )?;
    let albedo = ctx.get_uniform_location(p, "albedo")?.expect("sampler uniform");
    ctx.uniform_1i(albedo, 2)?;

    ctx.draw_arrays(Primitive::Triangles, 0, 6)?;
    assert_eq!(ctx.read_pixels(0, 0, 2, 2)?, vec![BLUE, WHITE, RED, GREEN]);

    // An unbound unit samples opaque white.
    ctx.uniform_1i(albedo, 5)?;
    ctx.draw_arrays(Primitive::Triangles, 0, 6)?;
    assert!(ctx.read_pixels(0, 0, 2, 2)?.iter().all(|&c| c == WHITE));
    Ok(())
}

// ── culling ───────────────────────────────────────────────────────────────

#[test]
fn back_faces_are_culled_when_enabled() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 1.0, 1.0, 1.0])?;
    // Clockwise on screen.
    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, -1.0, 3.0, 3.0, -1.0])?;

    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.written, 16);

    ctx.enable(Capability::CullFace);
    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.culled, 1);
    assert_eq!(stats.written, 0);

    ctx.front_face(FrontFace::Cw);
    let stats = ctx.draw_arrays(Primitive::Triangles, 0, 3)?;
    assert_eq!(stats.culled, 0);
    assert_eq!(stats.written, 16);
    Ok(())
}

// ── errors ────────────────────────────────────────────────────────────────

#[test]
fn configuration_errors_leave_target_untouched() -> Result<()> {
    let mut ctx = context(4, 4);
    ctx.clear_color(0.0, 0.0, 1.0, 1.0);
    ctx.clear(ClearMask::COLOR)?;

    assert_eq!(
        ctx.draw_arrays(Primitive::Triangles, 0, 3),
        Err(GlError::PipelineNotReady(NotReady::NoProgram))
    );

    let p = program(&mut ctx, SolidVs, SolidFs)?;
    set_color(&mut ctx, p, [1.0, 0.0, 0.0, 1.0])?;
    assert_eq!(
        ctx.draw_arrays(Primitive::Triangles, 0, 3),
        Err(GlError::PipelineNotReady(NotReady::NoEnabledAttributes))
    );

    ctx.enable_vertex_attrib_array(0)?;
    assert_eq!(
        ctx.draw_arrays(Primitive::Triangles, 0, 3),
        Err(GlError::PipelineNotReady(NotReady::AttributeWithoutBuffer { location: 0 }))
    );

    attribute(&mut ctx, 0, 2, &[-1.0, -1.0, 3.0, -1.0, -1.0, 3.0])?;
    assert_eq!(
        ctx.draw_arrays(Primitive::Triangles, 1, 3),
        Err(GlError::PipelineNotReady(NotReady::AttributeOutOfRange { location: 0, vertex: 3 }))
    );
    assert_eq!(
        ctx.draw_elements(Primitive::Triangles, 3, IndexType::UnsignedShort, Some(&[0u8, 0, 1, 0][..])),
        Err(GlError::PipelineNotReady(NotReady::IndexDataTooShort { available: 2, required: 3 }))
    );

    assert!(ctx.read_pixels(0, 0, 4, 4)?.iter().all(|&c| c == BLUE));
    Ok(())
}

#[test]
fn bound_resources_cannot_be_deleted() -> Result<()> {
    let mut ctx = context(4, 4);
    let p = program(&mut ctx, SolidVs, SolidFs)?;
    let buf = ctx.create_buffer();
    ctx.bind_buffer(BufferTarget::Array, Some(buf))?;

    assert!(matches!(ctx.delete_buffer(buf), Err(GlError::ResourceInUse { .. })));
    assert!(matches!(ctx.delete_program(p), Err(GlError::ResourceInUse { .. })));

    ctx.bind_buffer(BufferTarget::Array, None)?;
    ctx.delete_buffer(buf)?;
    ctx.use_program(None)?;
    ctx.delete_program(p)?;
    assert!(matches!(
        ctx.use_program(Some(p)),
        Err(GlError::UnknownObject { .. })
    ));
    Ok(())
}
