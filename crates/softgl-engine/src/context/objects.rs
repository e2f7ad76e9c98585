use bytemuck::Pod;

use crate::error::{GlError, Result};
use crate::object::{BufferId, FramebufferId, ObjectId, RenderbufferId, TextureId, VertexArrayId};
use crate::resource::{
    Attachment, AttachmentRef, AttribType, Buffer, BufferTarget, BufferUsage, DataType, Framebuffer,
    Image, PixelFormat, Renderbuffer, RenderbufferFormat, Texture, TextureParameter, TextureTarget,
    VertexArray, VertexAttrib, MAX_TEXTURE_LEVELS,
};

use super::Context;

fn in_use<I: ObjectId>(id: I, reason: &'static str) -> GlError {
    log::warn!("cannot delete {} {}: {reason}", I::KIND, id.get());
    GlError::ResourceInUse { kind: I::KIND, id: id.get(), reason }
}

impl Context {
    // ── buffers ───────────────────────────────────────────────────────────

    pub fn create_buffer(&mut self) -> BufferId {
        let id = self.buffers.insert(Buffer::default());
        log::debug!("created buffer {id}");
        id
    }

    /// Binds `buffer` to `target`. The element array binding is part of the
    /// current vertex array.
    pub fn bind_buffer(&mut self, target: BufferTarget, buffer: Option<BufferId>) -> Result<()> {
        if let Some(id) = buffer {
            self.buffers.get(id)?;
        }
        match target {
            BufferTarget::Array => self.state.array_buffer = buffer,
            BufferTarget::ElementArray => self.current_vertex_array_mut()?.index_buffer = buffer,
        }
        Ok(())
    }

    fn bound_buffer(&self, target: BufferTarget) -> Result<BufferId> {
        let bound = match target {
            BufferTarget::Array => self.state.array_buffer,
            BufferTarget::ElementArray => self.current_vertex_array()?.index_buffer(),
        };
        bound.ok_or_else(|| GlError::invalid_operation(format!("no buffer bound to {target:?}")))
    }

    /// Replaces the contents of the buffer bound to `target` with a copy of
    /// `data`.
    pub fn buffer_data<T: Pod>(&mut self, target: BufferTarget, data: &[T], usage: BufferUsage) -> Result<()> {
        let id = self.bound_buffer(target)?;
        let bytes: &[u8] = bytemuck::cast_slice(data);
        self.buffers.get_mut(id)?.replace(bytes, usage);
        log::debug!("buffer {id}: {} bytes ({usage:?})", bytes.len());
        Ok(())
    }

    /// Overwrites part of the buffer bound to `target`, starting at byte
    /// `offset`.
    pub fn buffer_sub_data<T: Pod>(&mut self, target: BufferTarget, offset: usize, data: &[T]) -> Result<()> {
        let id = self.bound_buffer(target)?;
        self.buffers.get_mut(id)?.write(offset, bytemuck::cast_slice(data))
    }

    pub fn buffer(&self, id: BufferId) -> Result<&Buffer> {
        self.buffers.get(id)
    }

    pub fn delete_buffer(&mut self, id: BufferId) -> Result<()> {
        self.buffers.get(id)?;
        if self.state.array_buffer == Some(id) {
            return Err(in_use(id, "bound to the array buffer target"));
        }
        let referenced = self.default_vertex_array.references(id)
            || self.vertex_arrays.iter().any(|(_, vao)| vao.references(id));
        if referenced {
            return Err(in_use(id, "referenced by a vertex array"));
        }
        self.buffers.remove(id)?;
        log::debug!("deleted buffer {id}");
        Ok(())
    }

    // ── vertex arrays ─────────────────────────────────────────────────────

    pub fn create_vertex_array(&mut self) -> VertexArrayId {
        let id = self.vertex_arrays.insert(VertexArray::default());
        log::debug!("created vertex array {id}");
        id
    }

    /// `None` returns to the context's default vertex array.
    pub fn bind_vertex_array(&mut self, vertex_array: Option<VertexArrayId>) -> Result<()> {
        if let Some(id) = vertex_array {
            self.vertex_arrays.get(id)?;
        }
        self.state.vertex_array = vertex_array;
        Ok(())
    }

    pub fn delete_vertex_array(&mut self, id: VertexArrayId) -> Result<()> {
        self.vertex_arrays.get(id)?;
        if self.state.vertex_array == Some(id) {
            return Err(in_use(id, "currently bound"));
        }
        self.vertex_arrays.remove(id)?;
        log::debug!("deleted vertex array {id}");
        Ok(())
    }

    /// Layout of attribute `location` in the current vertex array.
    pub fn vertex_attrib(&self, location: usize) -> Result<VertexAttrib> {
        Ok(self.current_vertex_array()?.attrib(location))
    }

    pub fn enable_vertex_attrib_array(&mut self, location: usize) -> Result<()> {
        self.set_attrib_enabled(location, true)
    }

    pub fn disable_vertex_attrib_array(&mut self, location: usize) -> Result<()> {
        self.set_attrib_enabled(location, false)
    }

    fn set_attrib_enabled(&mut self, location: usize, enabled: bool) -> Result<()> {
        self.check_attrib_location(location)?;
        self.current_vertex_array_mut()?.attrib_mut(location).enabled = enabled;
        Ok(())
    }

    /// Describes where attribute `location` reads from: the buffer bound to
    /// the array target, `size` components of `ty` per vertex, starting at
    /// byte `offset`. A `stride` of 0 means tightly packed.
    pub fn vertex_attrib_pointer(
        &mut self,
        location: usize,
        size: usize,
        ty: AttribType,
        normalized: bool,
        stride: usize,
        offset: usize,
    ) -> Result<()> {
        self.check_attrib_location(location)?;
        if !(1..=4).contains(&size) {
            return Err(GlError::invalid_value(format!("attribute size {size} not in 1..=4")));
        }
        let buffer = self
            .state
            .array_buffer
            .ok_or_else(|| GlError::invalid_operation("vertex_attrib_pointer with no array buffer bound"))?;

        let attrib = self.current_vertex_array_mut()?.attrib_mut(location);
        attrib.size = size;
        attrib.ty = ty;
        attrib.normalized = normalized;
        attrib.stride = stride;
        attrib.offset = offset;
        attrib.buffer = Some(buffer);
        Ok(())
    }

    // ── textures ──────────────────────────────────────────────────────────

    pub fn create_texture(&mut self) -> TextureId {
        let id = self.textures.insert(Texture::default());
        log::debug!("created texture {id}");
        id
    }

    /// Binds `texture` to the active texture unit.
    pub fn bind_texture(&mut self, _target: TextureTarget, texture: Option<TextureId>) -> Result<()> {
        if let Some(id) = texture {
            self.textures.get(id)?;
        }
        let unit = self.state.active_texture;
        if let Some(slot) = self.state.texture_units.get_mut(unit) {
            *slot = texture;
        }
        Ok(())
    }

    fn bound_texture_mut(&mut self) -> Result<&mut Texture> {
        let id = self.state.bound_texture().ok_or_else(|| {
            GlError::invalid_operation(format!("no texture bound to unit {}", self.state.active_texture))
        })?;
        self.textures.get_mut(id)
    }

    pub fn texture(&self, id: TextureId) -> Result<&Texture> {
        self.textures.get(id)
    }

    /// Defines mip `level` of the bound texture. `None` data allocates
    /// zeroed storage.
    #[allow(clippy::too_many_arguments)]
    pub fn tex_image_2d(
        &mut self,
        _target: TextureTarget,
        level: usize,
        internal_format: PixelFormat,
        width: u32,
        height: u32,
        border: i32,
        format: PixelFormat,
        data_type: DataType,
        data: Option<&[u8]>,
    ) -> Result<()> {
        if level >= MAX_TEXTURE_LEVELS {
            return Err(GlError::invalid_value(format!("mip level {level} out of range")));
        }
        if border != 0 {
            return Err(GlError::invalid_value("texture border must be 0"));
        }
        if internal_format != format {
            return Err(GlError::invalid_operation(format!(
                "internal format {internal_format:?} does not match {format:?}"
            )));
        }

        self.check_image_size(width, height)?;

        let image = match data {
            Some(bytes) => Image::from_bytes(width, height, format, data_type, bytes)?,
            None => Image::zeroed(width, height, format, data_type)?,
        };
        self.bound_texture_mut()?.set_level(level, image);
        log::debug!("texture level {level}: {width}x{height} {format:?}/{data_type:?}");
        Ok(())
    }

    pub fn tex_parameter(&mut self, _target: TextureTarget, param: TextureParameter) -> Result<()> {
        self.bound_texture_mut()?.apply(param);
        Ok(())
    }

    pub fn delete_texture(&mut self, id: TextureId) -> Result<()> {
        self.textures.get(id)?;
        if self.state.texture_units.contains(&Some(id)) {
            return Err(in_use(id, "bound to a texture unit"));
        }
        if self.framebuffers.iter().any(|(_, fb)| fb.references_texture(id)) {
            return Err(in_use(id, "attached to a framebuffer"));
        }
        if self.renderbuffers.iter().any(|(_, rb)| rb.texture() == id) {
            return Err(in_use(id, "backs a renderbuffer"));
        }
        self.textures.remove(id)?;
        log::debug!("deleted texture {id}");
        Ok(())
    }

    // ── framebuffers ──────────────────────────────────────────────────────

    pub fn create_framebuffer(&mut self) -> FramebufferId {
        let id = self.framebuffers.insert(Framebuffer::default());
        log::debug!("created framebuffer {id}");
        id
    }

    /// `None` selects the default framebuffer.
    pub fn bind_framebuffer(&mut self, framebuffer: Option<FramebufferId>) -> Result<()> {
        if let Some(id) = framebuffer {
            self.framebuffers.get(id)?;
        }
        self.state.framebuffer = framebuffer;
        Ok(())
    }

    fn bound_framebuffer_mut(&mut self) -> Result<&mut Framebuffer> {
        let id = self
            .state
            .framebuffer
            .ok_or_else(|| GlError::invalid_operation("the default framebuffer has no attachment points"))?;
        self.framebuffers.get_mut(id)
    }

    pub fn framebuffer(&self, id: FramebufferId) -> Result<&Framebuffer> {
        self.framebuffers.get(id)
    }

    /// Attaches `level` of `texture` to the bound framebuffer; `None`
    /// detaches.
    pub fn framebuffer_texture_2d(
        &mut self,
        attachment: Attachment,
        texture: Option<TextureId>,
        level: usize,
    ) -> Result<()> {
        let target = match texture {
            Some(id) => {
                self.textures.get(id)?;
                if level >= MAX_TEXTURE_LEVELS {
                    return Err(GlError::invalid_value(format!("mip level {level} out of range")));
                }
                Some(AttachmentRef { texture: id, level, renderbuffer: None })
            }
            None => None,
        };
        self.bound_framebuffer_mut()?.attach(attachment, target);
        Ok(())
    }

    /// Attaches the storage of `renderbuffer` to the bound framebuffer;
    /// `None` detaches.
    pub fn framebuffer_renderbuffer(
        &mut self,
        attachment: Attachment,
        renderbuffer: Option<RenderbufferId>,
    ) -> Result<()> {
        let target = match renderbuffer {
            Some(id) => Some(AttachmentRef {
                texture: self.renderbuffers.get(id)?.texture(),
                level: 0,
                renderbuffer: Some(id),
            }),
            None => None,
        };
        self.bound_framebuffer_mut()?.attach(attachment, target);
        Ok(())
    }

    pub fn delete_framebuffer(&mut self, id: FramebufferId) -> Result<()> {
        self.framebuffers.get(id)?;
        if self.state.framebuffer == Some(id) {
            return Err(in_use(id, "currently bound"));
        }
        self.framebuffers.remove(id)?;
        log::debug!("deleted framebuffer {id}");
        Ok(())
    }

    // ── renderbuffers ─────────────────────────────────────────────────────

    /// Creates a renderbuffer together with the texture that will hold its
    /// storage.
    pub fn create_renderbuffer(&mut self) -> RenderbufferId {
        let texture = self.textures.insert(Texture::default());
        let id = self.renderbuffers.insert(Renderbuffer::new(texture));
        log::debug!("created renderbuffer {id} (storage texture {texture})");
        id
    }

    pub fn bind_renderbuffer(&mut self, renderbuffer: Option<RenderbufferId>) -> Result<()> {
        if let Some(id) = renderbuffer {
            self.renderbuffers.get(id)?;
        }
        self.state.renderbuffer = renderbuffer;
        Ok(())
    }

    /// Allocates zeroed storage for the bound renderbuffer.
    pub fn renderbuffer_storage(&mut self, format: RenderbufferFormat, width: u32, height: u32) -> Result<()> {
        let id = self
            .state
            .renderbuffer
            .ok_or_else(|| GlError::invalid_operation("no renderbuffer bound"))?;
        self.check_image_size(width, height)?;
        let (pixel_format, data_type) = format.layout();
        let image = Image::zeroed(width, height, pixel_format, data_type)?;

        let rb = self.renderbuffers.get_mut(id)?;
        rb.set_format(format);
        let texture = rb.texture();

        self.textures.get_mut(texture)?.set_level(0, image);
        log::debug!("renderbuffer {id}: {width}x{height} {format:?}");
        Ok(())
    }

    pub fn renderbuffer(&self, id: RenderbufferId) -> Result<&Renderbuffer> {
        self.renderbuffers.get(id)
    }

    /// Deletes the renderbuffer and its storage texture.
    pub fn delete_renderbuffer(&mut self, id: RenderbufferId) -> Result<()> {
        let texture = self.renderbuffers.get(id)?.texture();
        if self.state.renderbuffer == Some(id) {
            return Err(in_use(id, "currently bound"));
        }
        if self.framebuffers.iter().any(|(_, fb)| fb.references_renderbuffer(id)) {
            return Err(in_use(id, "attached to a framebuffer"));
        }
        self.renderbuffers.remove(id)?;
        if self.textures.contains(texture) {
            self.textures.remove(texture)?;
        }
        log::debug!("deleted renderbuffer {id}");
        Ok(())
    }
}
