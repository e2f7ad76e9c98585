use std::fmt;
use std::num::NonZeroU32;

/// Category of a context object, used in error messages and logs.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Buffer,
    Texture,
    Framebuffer,
    Renderbuffer,
    VertexArray,
    Shader,
    Program,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ObjectKind::Buffer => "buffer",
            ObjectKind::Texture => "texture",
            ObjectKind::Framebuffer => "framebuffer",
            ObjectKind::Renderbuffer => "renderbuffer",
            ObjectKind::VertexArray => "vertex array",
            ObjectKind::Shader => "shader",
            ObjectKind::Program => "program",
        };
        f.write_str(name)
    }
}

/// Opaque handle to an object owned by a [`Store`](super::Store).
pub trait ObjectId: Copy + Eq + fmt::Debug {
    const KIND: ObjectKind;

    fn from_raw(raw: NonZeroU32) -> Self;
    fn raw(self) -> NonZeroU32;

    #[inline]
    fn get(self) -> u32 {
        self.raw().get()
    }
}

macro_rules! object_id {
    ($(#[$meta:meta])* $name:ident => $kind:ident) => {
        $(#[$meta])*
        #[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(NonZeroU32);

        impl ObjectId for $name {
            const KIND: ObjectKind = ObjectKind::$kind;

            #[inline]
            fn from_raw(raw: NonZeroU32) -> Self {
                Self(raw)
            }

            #[inline]
            fn raw(self) -> NonZeroU32 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{} {}", ObjectKind::$kind, self.0)
            }
        }
    };
}

object_id!(
    /// Handle to a vertex or index buffer.
    BufferId => Buffer
);
object_id!(
    /// Handle to a 2D texture (also backs renderbuffers and framebuffer attachments).
    TextureId => Texture
);
object_id!(FramebufferId => Framebuffer);
object_id!(RenderbufferId => Renderbuffer);
object_id!(VertexArrayId => VertexArray);
object_id!(ShaderId => Shader);
object_id!(ProgramId => Program);
