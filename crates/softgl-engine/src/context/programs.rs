use std::sync::Arc;

use crate::error::{GlError, Result};
use crate::object::{ObjectId, ObjectKind, ProgramId, ShaderId};
use crate::shader::{
    link, LinkedProgram, Program, Shader, ShaderKind, ShaderSource, UniformLocation, Value, ValueKind,
};

use super::Context;

fn uniform_floats(location: UniformLocation, kind: ValueKind, floats: &[f32]) -> Result<Value> {
    Value::from_floats(kind, floats).ok_or_else(|| {
        GlError::invalid_value(format!(
            "{kind} uniform {} needs {} floats, got {}",
            location.index(),
            kind.float_count().unwrap_or(0),
            floats.len()
        ))
    })
}

impl Context {
    // ── shaders ───────────────────────────────────────────────────────────

    pub fn create_shader(&mut self, kind: ShaderKind) -> ShaderId {
        let id = self.shaders.insert(Shader::new(kind));
        log::debug!("created {kind} shader {id}");
        id
    }

    /// Replaces the shader's source. It must be compiled again before the
    /// next link.
    pub fn shader_source(&mut self, id: ShaderId, source: Arc<dyn ShaderSource>) -> Result<()> {
        self.shaders.get_mut(id)?.set_source(source);
        Ok(())
    }

    /// Builds and validates the shader's descriptor table.
    pub fn compile_shader(&mut self, id: ShaderId) -> Result<()> {
        let shader = self.shaders.get_mut(id)?;
        if let Err(e) = shader.compile(id.get()) {
            log::warn!("shader {id}: {e}");
            return Err(e.into());
        }
        log::debug!(
            "shader {id}: compiled {} fields",
            shader.descriptor().map_or(0, |d| d.fields().len())
        );
        Ok(())
    }

    pub fn shader(&self, id: ShaderId) -> Result<&Shader> {
        self.shaders.get(id)
    }

    pub fn delete_shader(&mut self, id: ShaderId) -> Result<()> {
        self.shaders.get(id)?;
        if self.programs.iter().any(|(_, p)| p.references(id)) {
            return Err(GlError::ResourceInUse {
                kind: ObjectKind::Shader,
                id: id.get(),
                reason: "attached to a program",
            });
        }
        self.shaders.remove(id)?;
        log::debug!("deleted shader {id}");
        Ok(())
    }

    // ── programs ──────────────────────────────────────────────────────────

    pub fn create_program(&mut self) -> ProgramId {
        let id = self.programs.insert(Program::default());
        log::debug!("created program {id}");
        id
    }

    /// Attaches `shader` to the stage slot matching its kind.
    pub fn attach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<()> {
        let kind = self.shaders.get(shader)?.kind();
        let p = self.programs.get_mut(program)?;
        if p.attached(kind).is_some() {
            return Err(GlError::invalid_operation(format!(
                "program {program} already has a {kind} shader attached"
            )));
        }
        p.set_attached(kind, Some(shader));
        Ok(())
    }

    pub fn detach_shader(&mut self, program: ProgramId, shader: ShaderId) -> Result<()> {
        let kind = self.shaders.get(shader)?.kind();
        let p = self.programs.get_mut(program)?;
        if p.attached(kind) != Some(shader) {
            return Err(GlError::invalid_operation(format!(
                "shader {shader} is not attached to program {program}"
            )));
        }
        p.set_attached(kind, None);
        Ok(())
    }

    /// Links the attached shaders. On failure the program is left unlinked.
    pub fn link_program(&mut self, id: ProgramId) -> Result<()> {
        let program = self.programs.get(id)?;
        let vertex = program.vertex.map(|s| self.shaders.get(s)).transpose()?;
        let fragment = program.fragment.map(|s| self.shaders.get(s)).transpose()?;
        let result = link(vertex, fragment);

        let program = self.programs.get_mut(id)?;
        match result {
            Ok(linked) => {
                log::debug!(
                    "program {id}: linked ({} attributes, {} uniforms)",
                    linked.attributes().len(),
                    linked.uniforms().len()
                );
                program.set_linked(Some(linked));
                Ok(())
            }
            Err(e) => {
                log::warn!("program {id}: {e}");
                program.set_linked(None);
                Err(e.into())
            }
        }
    }

    /// Selects the program used by draw calls. Linking is checked at draw
    /// time.
    pub fn use_program(&mut self, program: Option<ProgramId>) -> Result<()> {
        if let Some(id) = program {
            self.programs.get(id)?;
        }
        self.state.current_program = program;
        Ok(())
    }

    pub fn program(&self, id: ProgramId) -> Result<&Program> {
        self.programs.get(id)
    }

    pub fn delete_program(&mut self, id: ProgramId) -> Result<()> {
        self.programs.get(id)?;
        if self.state.current_program == Some(id) {
            return Err(GlError::ResourceInUse {
                kind: ObjectKind::Program,
                id: id.get(),
                reason: "currently in use",
            });
        }
        self.programs.remove(id)?;
        log::debug!("deleted program {id}");
        Ok(())
    }

    fn linked(&self, id: ProgramId) -> Result<&LinkedProgram> {
        self.programs
            .get(id)?
            .linked()
            .ok_or_else(|| GlError::invalid_operation(format!("program {id} is not linked")))
    }

    /// Location of a vertex attribute, or `None` if the program does not
    /// declare it.
    pub fn get_attrib_location(&self, program: ProgramId, name: &str) -> Result<Option<u32>> {
        Ok(self.linked(program)?.attribute_location(name))
    }

    /// Location of a uniform, or `None` if neither stage declares it.
    pub fn get_uniform_location(&self, program: ProgramId, name: &str) -> Result<Option<UniformLocation>> {
        Ok(self.linked(program)?.uniform_location(name))
    }

    /// Current value of a uniform of the program in use.
    pub fn get_uniform(&self, location: UniformLocation) -> Result<Value> {
        let id = self
            .state
            .current_program
            .ok_or_else(|| GlError::invalid_operation("no program in use"))?;
        self.linked(id)?
            .uniform_value(location)
            .ok_or_else(|| GlError::invalid_operation(format!("unknown uniform location {}", location.index())))
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    fn current_linked_mut(&mut self) -> Result<&mut LinkedProgram> {
        let id = self
            .state
            .current_program
            .ok_or_else(|| GlError::invalid_operation("no program in use"))?;
        self.programs
            .get_mut(id)?
            .linked_mut()
            .ok_or_else(|| GlError::invalid_operation(format!("program {id} is not linked")))
    }

    fn uniform_kind(&mut self, location: UniformLocation) -> Result<ValueKind> {
        self.current_linked_mut()?
            .uniform_slot(location)
            .map(|slot| slot.kind)
            .ok_or_else(|| GlError::invalid_operation(format!("unknown uniform location {}", location.index())))
    }

    /// Writes `value` to the uniform at `location` of the program in use, in
    /// every stage that declares it.
    pub fn uniform(&mut self, location: UniformLocation, value: Value) -> Result<()> {
        let kind = self.uniform_kind(location)?;
        if kind != value.kind() {
            return Err(GlError::invalid_operation(format!(
                "uniform {} is {kind}, got {}",
                location.index(),
                value.kind()
            )));
        }
        self.current_linked_mut()?.write_uniform(location, value);
        Ok(())
    }

    /// Copies the uniform's declared byte size out of `bytes`.
    pub fn uniform_bytes(&mut self, location: UniformLocation, bytes: &[u8]) -> Result<()> {
        let kind = self.uniform_kind(location)?;
        let value = Value::from_bytes(kind, bytes).ok_or_else(|| {
            GlError::invalid_value(format!("{kind} uniform needs {} bytes, got {}", kind.byte_size(), bytes.len()))
        })?;
        self.current_linked_mut()?.write_uniform(location, value);
        Ok(())
    }

    /// Sets an `int` or `sampler2D` uniform.
    pub fn uniform_1i(&mut self, location: UniformLocation, v: i32) -> Result<()> {
        let value = match self.uniform_kind(location)? {
            ValueKind::Sampler2D => Value::Sampler2D(v),
            _ => Value::Int(v),
        };
        self.uniform(location, value)
    }

    pub fn uniform_1f(&mut self, location: UniformLocation, v: f32) -> Result<()> {
        self.uniform(location, Value::Float(v))
    }

    pub fn uniform_2fv(&mut self, location: UniformLocation, v: &[f32]) -> Result<()> {
        let value = uniform_floats(location, ValueKind::Vec2, v)?;
        self.uniform(location, value)
    }

    pub fn uniform_3fv(&mut self, location: UniformLocation, v: &[f32]) -> Result<()> {
        let value = uniform_floats(location, ValueKind::Vec3, v)?;
        self.uniform(location, value)
    }

    pub fn uniform_4fv(&mut self, location: UniformLocation, v: &[f32]) -> Result<()> {
        let value = uniform_floats(location, ValueKind::Vec4, v)?;
        self.uniform(location, value)
    }

    /// `m` is column-major unless `transpose` is set.
    pub fn uniform_matrix3fv(&mut self, location: UniformLocation, transpose: bool, m: &[f32]) -> Result<()> {
        let value = uniform_floats(location, ValueKind::Mat3, m)?;
        self.uniform(location, if transpose { value.transposed() } else { value })
    }

    /// `m` is column-major unless `transpose` is set.
    pub fn uniform_matrix4fv(&mut self, location: UniformLocation, transpose: bool, m: &[f32]) -> Result<()> {
        let value = uniform_floats(location, ValueKind::Mat4, m)?;
        self.uniform(location, if transpose { value.transposed() } else { value })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LinkError;
    use crate::shader::{DescriptorBuilder, Invocation};
    use softgl_math::{Mat4, Vec4};

    struct Vs;

    impl ShaderSource for Vs {
        fn declare(&self, f: &mut DescriptorBuilder) {
            f.attribute("position", ValueKind::Vec4);
            f.uniform("mvp", ValueKind::Mat4);
            f.uniform("tint", ValueKind::Vec4);
            f.varying("color", ValueKind::Vec4);
        }

        fn main(&self, inv: &mut Invocation<'_>) {
            let p = inv.mat4(1) * inv.vec4(0);
            inv.set_position(p);
            let tint = inv.vec4(2);
            inv.set_vec4(3, tint);
        }
    }

    struct Fs;

    impl ShaderSource for Fs {
        fn declare(&self, f: &mut DescriptorBuilder) {
            f.varying("color", ValueKind::Vec4);
            f.uniform("tint", ValueKind::Vec4);
            f.uniform("albedo", ValueKind::Sampler2D);
        }

        fn main(&self, inv: &mut Invocation<'_>) {
            let c = inv.vec4(0);
            inv.set_color(c);
        }
    }

    struct BadFs;

    impl ShaderSource for BadFs {
        fn declare(&self, f: &mut DescriptorBuilder) {
            f.varying("normal", ValueKind::Vec3);
        }

        fn main(&self, _inv: &mut Invocation<'_>) {}
    }

    fn shader(ctx: &mut Context, kind: ShaderKind, src: Arc<dyn ShaderSource>) -> ShaderId {
        let id = ctx.create_shader(kind);
        ctx.shader_source(id, src).unwrap();
        ctx.compile_shader(id).unwrap();
        id
    }

    fn linked_program(ctx: &mut Context) -> ProgramId {
        let vs = shader(ctx, ShaderKind::Vertex, Arc::new(Vs));
        let fs = shader(ctx, ShaderKind::Fragment, Arc::new(Fs));
        let p = ctx.create_program();
        ctx.attach_shader(p, vs).unwrap();
        ctx.attach_shader(p, fs).unwrap();
        ctx.link_program(p).unwrap();
        p
    }

    // ── linking ───────────────────────────────────────────────────────────

    #[test]
    fn link_assigns_locations() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        assert_eq!(ctx.get_attrib_location(p, "position").unwrap(), Some(0));
        assert_eq!(ctx.get_attrib_location(p, "normal").unwrap(), None);
        assert_eq!(ctx.get_uniform_location(p, "mvp").unwrap().map(UniformLocation::index), Some(0));
        assert_eq!(ctx.get_uniform_location(p, "tint").unwrap().map(UniformLocation::index), Some(1));
        assert_eq!(ctx.get_uniform_location(p, "albedo").unwrap().map(UniformLocation::index), Some(2));
    }

    #[test]
    fn link_failure_leaves_program_unlinked() {
        let mut ctx = Context::default();
        let vs = shader(&mut ctx, ShaderKind::Vertex, Arc::new(Vs));
        let fs = shader(&mut ctx, ShaderKind::Fragment, Arc::new(BadFs));
        let p = ctx.create_program();
        ctx.attach_shader(p, vs).unwrap();
        assert_eq!(ctx.link_program(p), Err(LinkError::MissingStage(ShaderKind::Fragment).into()));

        ctx.attach_shader(p, fs).unwrap();
        assert_eq!(
            ctx.link_program(p),
            Err(LinkError::UnmatchedVarying("normal".into()).into())
        );
        assert!(!ctx.program(p).unwrap().is_linked());
        assert!(ctx.get_attrib_location(p, "position").is_err());
    }

    #[test]
    fn uncompiled_shader_fails_link() {
        let mut ctx = Context::default();
        let vs = ctx.create_shader(ShaderKind::Vertex);
        ctx.shader_source(vs, Arc::new(Vs)).unwrap();
        let fs = shader(&mut ctx, ShaderKind::Fragment, Arc::new(Fs));
        let p = ctx.create_program();
        ctx.attach_shader(p, vs).unwrap();
        ctx.attach_shader(p, fs).unwrap();
        assert_eq!(ctx.link_program(p), Err(LinkError::NotCompiled(ShaderKind::Vertex).into()));
    }

    #[test]
    fn attach_and_detach_follow_stage_slots() {
        let mut ctx = Context::default();
        let a = shader(&mut ctx, ShaderKind::Vertex, Arc::new(Vs));
        let b = shader(&mut ctx, ShaderKind::Vertex, Arc::new(Vs));
        let p = ctx.create_program();
        ctx.attach_shader(p, a).unwrap();
        assert!(ctx.attach_shader(p, b).is_err());
        assert!(ctx.detach_shader(p, b).is_err());

        assert!(matches!(ctx.delete_shader(a), Err(GlError::ResourceInUse { .. })));
        ctx.detach_shader(p, a).unwrap();
        ctx.delete_shader(a).unwrap();
    }

    // ── uniforms ──────────────────────────────────────────────────────────

    #[test]
    fn uniform_requires_program_in_use() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        let loc = ctx.get_uniform_location(p, "tint").unwrap().unwrap();
        assert!(matches!(ctx.uniform_4fv(loc, &[1.0; 4]), Err(GlError::InvalidOperation(_))));
    }

    #[test]
    fn shared_uniform_reaches_both_stages() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        let loc = ctx.get_uniform_location(p, "tint").unwrap().unwrap();
        ctx.uniform_4fv(loc, &[0.1, 0.2, 0.3, 0.4]).unwrap();

        let linked = ctx.program(p).unwrap().linked().unwrap();
        let slot = linked.uniform_slot(loc).unwrap();
        let expected = Value::Vec4(Vec4::new(0.1, 0.2, 0.3, 0.4));
        assert_eq!(linked.vertex.registers.get(slot.vertex_field.unwrap()), Some(expected));
        assert_eq!(linked.fragment.registers.get(slot.fragment_field.unwrap()), Some(expected));
    }

    #[test]
    fn uniform_kind_mismatch_is_rejected() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        let tint = ctx.get_uniform_location(p, "tint").unwrap().unwrap();
        assert!(matches!(ctx.uniform_1f(tint, 1.0), Err(GlError::InvalidOperation(_))));
        assert!(matches!(ctx.uniform_4fv(tint, &[1.0, 2.0]), Err(GlError::InvalidValue(_))));
        assert!(matches!(ctx.uniform_bytes(tint, &[0; 8]), Err(GlError::InvalidValue(_))));
    }

    #[test]
    fn sampler_uniform_takes_an_int() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        let albedo = ctx.get_uniform_location(p, "albedo").unwrap().unwrap();
        ctx.uniform_1i(albedo, 3).unwrap();
        assert_eq!(ctx.get_uniform(albedo).unwrap(), Value::Sampler2D(3));
    }

    #[test]
    fn matrix_uniform_honours_transpose() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        let mvp = ctx.get_uniform_location(p, "mvp").unwrap().unwrap();

        let t = Mat4::from_translation(softgl_math::Vec3::new(1.0, 2.0, 3.0));
        let rows = t.transpose().to_cols_array();
        ctx.uniform_matrix4fv(mvp, true, &rows).unwrap();
        assert_eq!(ctx.get_uniform(mvp).unwrap(), Value::Mat4(t));

        ctx.uniform_matrix4fv(mvp, false, &t.to_cols_array()).unwrap();
        assert_eq!(ctx.get_uniform(mvp).unwrap(), Value::Mat4(t));
    }

    #[test]
    fn uniform_bytes_reads_declared_size() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        let tint = ctx.get_uniform_location(p, "tint").unwrap().unwrap();
        let bytes: &[u8] = bytemuck::cast_slice(&[1.0f32, 0.5, 0.25, 1.0, 99.0]);
        ctx.uniform_bytes(tint, bytes).unwrap();
        assert_eq!(ctx.get_uniform(tint).unwrap(), Value::Vec4(Vec4::new(1.0, 0.5, 0.25, 1.0)));
    }

    #[test]
    fn program_in_use_cannot_be_deleted() {
        let mut ctx = Context::default();
        let p = linked_program(&mut ctx);
        ctx.use_program(Some(p)).unwrap();
        assert!(matches!(ctx.delete_program(p), Err(GlError::ResourceInUse { .. })));
        ctx.use_program(None).unwrap();
        ctx.delete_program(p).unwrap();
    }
}
