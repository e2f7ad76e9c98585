//! Shader binding model.
//!
//! A shader is a [`ShaderSource`] that declares its fields into a
//! [`ShaderDescriptor`] (name, role, kind, index, byte offset) and reads or
//! writes them through an [`Invocation`] by index. Field values live in
//! [`Registers`], one set per stage per linked program, so uniforms set on
//! one program never leak into another that shares the same shader.

mod descriptor;
mod program;
mod registers;
mod source;
mod value;

pub use descriptor::{DescriptorBuilder, FieldDesc, FieldRole, ShaderDescriptor};
pub use program::{link, AttributeBinding, LinkedProgram, Program, UniformLocation, UniformSlot};
pub use registers::Registers;
pub use source::{Invocation, Shader, ShaderKind, ShaderSource};
pub use value::{Value, ValueKind};

pub(crate) use program::StageInstance;
