//! Format-independent operations every chunk decoder provides.

use crate::colors::ColorMapping;
use chunkview_common::RenderTarget;
use chunkview_nbt::Tag;
use std::collections::BTreeMap;

/// Selection queries and in-place edits over one chunk.
///
/// None of these fail: a chunk without the expected structure yields the
/// no-match value (`false`, `0`) or is left untouched, and a malformed section
/// is skipped. Mutating calls take the chunk by `&mut`, so a chunk cannot be
/// read elsewhere while it is being edited.
pub trait ChunkFilter: Send + Sync {
    /// Every name occurs at least once. An unmapped name never occurs.
    fn match_all_block_names(&self, chunk: &Tag, names: &[&str]) -> bool;

    fn match_any_block_name(&self, chunk: &Tag, names: &[&str]) -> bool;

    /// The non-air blocks of the chunk are exactly `names`.
    fn palette_equals(&self, chunk: &Tag, names: &[&str]) -> bool;

    fn match_biome_ids(&self, chunk: &Tag, ids: &[i32]) -> bool;

    fn match_any_biome_id(&self, chunk: &Tag, ids: &[i32]) -> bool;

    /// Overwrites existing biome entries only.
    fn change_biome(&self, chunk: &mut Tag, id: i32);

    /// Writes a full biome array, creating it if absent.
    fn force_biome(&self, chunk: &mut Tag, id: i32);

    /// Replaces every block named by a key with the block named by its value.
    fn replace_blocks(&self, chunk: &mut Tag, replace: &BTreeMap<String, String>);

    /// Matching positions summed over all names.
    fn block_amount(&self, chunk: &Tag, names: &[&str]) -> usize;

    /// Mean height of the topmost non-empty block over all 256 columns.
    fn average_height(&self, chunk: &Tag) -> i32;
}

/// Top-down projection of one chunk into tile buffers.
pub trait ChunkRenderer: Send + Sync {
    /// Paints the chunk at pixel offset `(x, z)` of `target`. Columns with no
    /// visible block keep whatever the buffers held.
    fn draw_chunk(
        &self,
        chunk: &Tag,
        colors: &dyn ColorMapping,
        x: usize,
        z: usize,
        target: &mut RenderTarget<'_>,
        water: bool,
    );
}
