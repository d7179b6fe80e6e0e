//! Chunk decoding for both block storage generations of Anvil region data.

pub mod bits;
pub mod block_state;
pub mod colors;
pub mod dispatch;
pub mod filter;
pub mod legacy;
pub mod level;
pub mod mapping;
pub mod names;
pub mod paletted;
pub mod render;

pub use colors::{BlockColors, ColorMapping};
pub use dispatch::{ChunkDecoder, ChunkFormat};
pub use filter::{ChunkFilter, ChunkRenderer};
pub use legacy::LegacyDecoder;
pub use mapping::{BlockData, LegacyMapping};
pub use names::parse_block_names;
pub use paletted::PalettedDecoder;
