//! Chunk, section and tile geometry shared by every decoder.

/// Width of a chunk and edge length of a section, in blocks.
pub const CHUNK_SIZE: usize = 16;
/// Blocks per 16x16x16 section.
pub const SECTION_VOLUME: usize = CHUNK_SIZE * CHUNK_SIZE * CHUNK_SIZE;
/// Columns per chunk.
pub const COLUMN_COUNT: usize = CHUNK_SIZE * CHUNK_SIZE;
/// Sections `0..16` make up a pre-1.18 chunk.
pub const SECTION_COUNT: i32 = 16;

/// Edge length of a biome cell in the downsampled layout.
pub const BIOME_CELL: usize = 4;
/// 4x4x4 cells covering 256 blocks of height.
pub const BIOME_VOLUME_LEN: usize = 1024;
/// One biome per column.
pub const BIOME_COLUMN_LEN: usize = COLUMN_COUNT;

/// Tile edge in pixels: one region of 32x32 chunks.
pub const DEFAULT_TILE_SIZE: usize = 512;

/// Index of a block inside a section, `y * 256 + z * 16 + x`.
#[inline]
pub fn block_index(x: usize, y: usize, z: usize) -> usize {
    y * COLUMN_COUNT + z * CHUNK_SIZE + x
}

#[inline]
pub fn column_index(x: usize, z: usize) -> usize {
    z * CHUNK_SIZE + x
}

/// Index into a 1024 entry biome volume for a block at chunk-relative `x`,
/// absolute `y`, chunk-relative `z`.
#[inline]
pub fn biome_cell_index(x: usize, y: usize, z: usize) -> usize {
    let (cx, cy, cz) = (x / BIOME_CELL, y / BIOME_CELL, z / BIOME_CELL);
    cy * (CHUNK_SIZE / BIOME_CELL) * (CHUNK_SIZE / BIOME_CELL) + cz * (CHUNK_SIZE / BIOME_CELL) + cx
}
