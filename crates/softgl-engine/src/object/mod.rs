//! Typed object handles and the slot stores behind them.

mod id;
mod store;

pub use id::{
    BufferId, FramebufferId, ObjectId, ObjectKind, ProgramId, RenderbufferId, ShaderId, TextureId,
    VertexArrayId,
};
pub use store::Store;
