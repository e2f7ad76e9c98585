use thiserror::Error;

use crate::object::ObjectKind;
use crate::shader::{FieldRole, ShaderKind, ValueKind};

pub type Result<T> = std::result::Result<T, GlError>;

/// Error returned by every fallible [`Context`](crate::Context) call.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GlError {
    #[error("unknown {kind} {id}")]
    UnknownObject { kind: ObjectKind, id: u32 },

    #[error("{kind} {id} is still in use ({reason})")]
    ResourceInUse {
        kind: ObjectKind,
        id: u32,
        reason: &'static str,
    },

    #[error("invalid value: {0}")]
    InvalidValue(String),

    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("pipeline not ready: {0}")]
    PipelineNotReady(#[from] NotReady),

    #[error("shader compilation failed: {0}")]
    Compile(#[from] ShaderError),

    #[error("program link failed: {0}")]
    Link(#[from] LinkError),
}

/// Draw-time configuration problems. All of them are detected before the
/// first fragment is written.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NotReady {
    #[error("no program in use")]
    NoProgram,

    #[error("program {0} is not linked")]
    ProgramNotLinked(u32),

    #[error("the vertex stage declares attributes but none is enabled")]
    NoEnabledAttributes,

    #[error("attribute {location} is enabled but has no buffer")]
    AttributeWithoutBuffer { location: u32 },

    #[error("attribute {location} reads past the end of its buffer for vertex {vertex}")]
    AttributeOutOfRange { location: u32, vertex: u32 },

    #[error("no index data: pass indices or bind an element array buffer")]
    NoIndexData,

    #[error("index data holds {available} indices but the draw needs {required}")]
    IndexDataTooShort { available: usize, required: usize },

    #[error("framebuffer incomplete: {0}")]
    IncompleteFramebuffer(&'static str),
}

/// Problems found while building a shader's descriptor table.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ShaderError {
    #[error("shader {0} has no source")]
    MissingSource(u32),

    #[error("field `{0}` is declared more than once")]
    DuplicateField(String),

    #[error("{role} `{name}` cannot have type {kind}")]
    InvalidKind {
        name: String,
        role: FieldRole,
        kind: ValueKind,
    },
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum LinkError {
    #[error("no {0} shader attached")]
    MissingStage(ShaderKind),

    #[error("{0} shader has no main entry point")]
    MissingEntryPoint(ShaderKind),

    #[error("{0} shader is not compiled")]
    NotCompiled(ShaderKind),

    #[error("fragment varying `{0}` has no vertex counterpart")]
    UnmatchedVarying(String),

    #[error("varying `{name}` is {vertex} in the vertex stage but {fragment} in the fragment stage")]
    VaryingMismatch {
        name: String,
        vertex: ValueKind,
        fragment: ValueKind,
    },

    #[error("uniform `{name}` is {vertex} in the vertex stage but {fragment} in the fragment stage")]
    UniformMismatch {
        name: String,
        vertex: ValueKind,
        fragment: ValueKind,
    },

    #[error("fragment stage declares attribute `{0}`")]
    FragmentAttribute(String),
}

impl GlError {
    pub(crate) fn invalid_value(msg: impl Into<String>) -> Self {
        GlError::InvalidValue(msg.into())
    }

    pub(crate) fn invalid_operation(msg: impl Into<String>) -> Self {
        GlError::InvalidOperation(msg.into())
    }
}
