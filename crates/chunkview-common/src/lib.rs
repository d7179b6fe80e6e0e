pub mod buffers;
pub mod chunk;
pub mod error;
pub mod types;

pub use buffers::{RenderTarget, TileBuffers};
pub use error::ChunkviewError;
pub use types::Result;
