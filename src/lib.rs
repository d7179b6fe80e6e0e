pub mod config;
pub mod engine;

// Re-export commonly used items
pub use chunkview_anvil::{BlockColors, ChunkDecoder, ChunkFilter, ChunkFormat, ChunkRenderer, LegacyMapping};
pub use chunkview_common::{ChunkviewError, RenderTarget, Result, TileBuffers};
pub use chunkview_nbt::Tag;
pub use config::{Config, RenderOptions};
pub use engine::Engine;
