//! Picks the decoder for a chunk once, then forwards every operation to it.

use crate::colors::ColorMapping;
use crate::filter::{ChunkFilter, ChunkRenderer};
use crate::legacy::LegacyDecoder;
use crate::level::{self, FLATTENING_VERSION};
use crate::mapping::LegacyMapping;
use crate::paletted::PalettedDecoder;
use chunkview_common::RenderTarget;
use chunkview_nbt::Tag;
use std::collections::BTreeMap;
use std::sync::Arc;

/// On-disk block storage generation of a chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChunkFormat {
    /// Byte ids and data nibbles.
    Legacy,
    /// Palettes and packed indices.
    Paletted,
}

impl ChunkFormat {
    /// Uses `DataVersion` when present, otherwise looks at what the sections carry.
    pub fn detect(chunk: &Tag) -> Option<Self> {
        if let Some(version) = level::data_version(chunk) {
            return Some(if version < FLATTENING_VERSION {
                ChunkFormat::Legacy
            } else {
                ChunkFormat::Paletted
            });
        }
        level::sections(chunk)?.iter().find_map(|section| {
            if section.get("Blocks").is_some() {
                Some(ChunkFormat::Legacy)
            } else if section.get("Palette").is_some() && section.get("BlockStates").is_some() {
                Some(ChunkFormat::Paletted)
            } else {
                None
            }
        })
    }
}

/// Both decoders behind one [`ChunkFilter`] and [`ChunkRenderer`].
#[derive(Debug, Clone)]
pub struct ChunkDecoder {
    legacy: LegacyDecoder,
    paletted: PalettedDecoder,
}

impl ChunkDecoder {
    pub fn new(mapping: Arc<LegacyMapping>) -> Self {
        ChunkDecoder {
            legacy: LegacyDecoder::new(mapping),
            paletted: PalettedDecoder::new(),
        }
    }

    /// The decoder for `chunk`, or `None` when its layout is unrecognizable.
    pub fn for_chunk(&self, chunk: &Tag) -> Option<&dyn ChunkFilter> {
        Some(match ChunkFormat::detect(chunk)? {
            ChunkFormat::Legacy => &self.legacy,
            ChunkFormat::Paletted => &self.paletted,
        })
    }

    pub fn renderer_for(&self, chunk: &Tag) -> Option<&dyn ChunkRenderer> {
        Some(match ChunkFormat::detect(chunk)? {
            ChunkFormat::Legacy => &self.legacy,
            ChunkFormat::Paletted => &self.paletted,
        })
    }
}

impl ChunkFilter for ChunkDecoder {
    fn match_all_block_names(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.for_chunk(chunk)
            .is_some_and(|d| d.match_all_block_names(chunk, names))
    }

    fn match_any_block_name(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.for_chunk(chunk)
            .is_some_and(|d| d.match_any_block_name(chunk, names))
    }

    fn palette_equals(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.for_chunk(chunk).is_some_and(|d| d.palette_equals(chunk, names))
    }

    fn match_biome_ids(&self, chunk: &Tag, ids: &[i32]) -> bool {
        self.for_chunk(chunk).is_some_and(|d| d.match_biome_ids(chunk, ids))
    }

    fn match_any_biome_id(&self, chunk: &Tag, ids: &[i32]) -> bool {
        self.for_chunk(chunk).is_some_and(|d| d.match_any_biome_id(chunk, ids))
    }

    fn change_biome(&self, chunk: &mut Tag, id: i32) {
        if let Some(d) = self.for_chunk(chunk) {
            d.change_biome(chunk, id);
        }
    }

    fn force_biome(&self, chunk: &mut Tag, id: i32) {
        if let Some(d) = self.for_chunk(chunk) {
            d.force_biome(chunk, id);
        }
    }

    fn replace_blocks(&self, chunk: &mut Tag, replace: &BTreeMap<String, String>) {
        if let Some(d) = self.for_chunk(chunk) {
            d.replace_blocks(chunk, replace);
        }
    }

    fn block_amount(&self, chunk: &Tag, names: &[&str]) -> usize {
        self.for_chunk(chunk).map_or(0, |d| d.block_amount(chunk, names))
    }

    fn average_height(&self, chunk: &Tag) -> i32 {
        self.for_chunk(chunk).map_or(0, |d| d.average_height(chunk))
    }
}

impl ChunkRenderer for ChunkDecoder {
    fn draw_chunk(
        &self,
        chunk: &Tag,
        colors: &dyn ColorMapping,
        x: usize,
        z: usize,
        target: &mut RenderTarget<'_>,
        water: bool,
    ) {
        if let Some(r) = self.renderer_for(chunk) {
            r.draw_chunk(chunk, colors, x, z, target, water);
        }
    }
}
