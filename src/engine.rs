//! Process-level entry point: owns the shared tables and the chunk decoder.

use crate::config::{Config, RenderOptions};
use chunkview_anvil::mapping::qualify;
use chunkview_anvil::{
    parse_block_names, BlockColors, ChunkDecoder, ChunkFilter, ChunkRenderer, LegacyMapping,
};
use chunkview_common::chunk::CHUNK_SIZE;
use chunkview_common::{ChunkviewError, RenderTarget, Result, TileBuffers};
use chunkview_logger::{log, LogSeverity::{Debug, Info}};
use chunkview_nbt::{Compression, NbtFile, Tag};
use std::collections::BTreeMap;
use std::io::{self, Read};
use std::sync::Arc;

/// Built once at startup, then shared by reference across worker threads.
/// Every operation is read-only on the engine itself.
#[derive(Debug, Clone)]
pub struct Engine {
    mapping: Arc<LegacyMapping>,
    colors: BlockColors,
    decoder: ChunkDecoder,
    render: RenderOptions,
}

impl Engine {
    /// Initializes logging and loads both tables. A mapping file that cannot
    /// be read, or that yields no entries, is fatal.
    pub fn from_config(config: &Config) -> Result<Self> {
        if !chunkview_logger::init(config.log_severity()?) {
            log("log threshold already set; keeping it".to_owned(), Debug);
        }

        let mapping = match &config.mapping_path {
            Some(path) => LegacyMapping::load(path)?,
            None => LegacyMapping::bundled(),
        };
        if mapping.is_empty() {
            return Err(ChunkviewError::MappingError(
                "block id mapping contains no usable lines".to_owned(),
            ));
        }
        let colors = match &config.colors_path {
            Some(path) => BlockColors::load(path)?,
            None => BlockColors::bundled(),
        };
        log(
            format!("Loaded {} block mappings and {} block colors", mapping.len(), colors.len()),
            Info,
        );

        Ok(Self::new(mapping, colors, config.render))
    }

    pub fn new(mapping: LegacyMapping, colors: BlockColors, render: RenderOptions) -> Self {
        let mapping = Arc::new(mapping);
        Engine {
            colors: colors.with_legacy(&mapping),
            decoder: ChunkDecoder::new(Arc::clone(&mapping)),
            mapping,
            render,
        }
    }

    pub fn mapping(&self) -> &Arc<LegacyMapping> {
        &self.mapping
    }

    pub fn colors(&self) -> &BlockColors {
        &self.colors
    }

    pub fn decoder_for(&self, chunk: &Tag) -> Option<&dyn ChunkFilter> {
        self.decoder.for_chunk(chunk)
    }

    /// Parses a user-typed list, accepting names either table knows.
    pub fn parse_block_names(&self, raw: &str) -> Option<Vec<String>> {
        parse_block_names(raw, |bare| {
            let name = qualify(bare);
            self.mapping.contains(&name) || self.colors.contains(&name)
        })
    }

    /// Zeroed buffers sized for one tile.
    pub fn new_tile(&self) -> TileBuffers {
        TileBuffers::new(self.render.tile_size, self.render.tile_size)
    }

    /// Draws the chunk at chunk coordinates `(chunk_x, chunk_z)` inside the tile.
    pub fn render_chunk(
        &self,
        chunk: &Tag,
        chunk_x: usize,
        chunk_z: usize,
        target: &mut RenderTarget<'_>,
    ) {
        self.decoder.draw_chunk(
            chunk,
            &self.colors,
            chunk_x * CHUNK_SIZE,
            chunk_z * CHUNK_SIZE,
            target,
            self.render.water,
        );
    }

    /// Reads one chunk record. Malformed data is an `NbtError`.
    pub fn read_chunk<R: Read>(reader: &mut R, compression: Compression) -> Result<Tag> {
        NbtFile::read_compressed(reader, compression)
            .map(|file| file.root)
            .map_err(|e| match e.kind() {
                io::ErrorKind::InvalidData | io::ErrorKind::UnexpectedEof => {
                    ChunkviewError::NbtError(e.to_string())
                }
                _ => ChunkviewError::IoError(e),
            })
    }
}

impl ChunkFilter for Engine {
    fn match_all_block_names(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.decoder.match_all_block_names(chunk, names)
    }

    fn match_any_block_name(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.decoder.match_any_block_name(chunk, names)
    }

    fn palette_equals(&self, chunk: &Tag, names: &[&str]) -> bool {
        self.decoder.palette_equals(chunk, names)
    }

    fn match_biome_ids(&self, chunk: &Tag, ids: &[i32]) -> bool {
        self.decoder.match_biome_ids(chunk, ids)
    }

    fn match_any_biome_id(&self, chunk: &Tag, ids: &[i32]) -> bool {
        self.decoder.match_any_biome_id(chunk, ids)
    }

    fn change_biome(&self, chunk: &mut Tag, id: i32) {
        self.decoder.change_biome(chunk, id)
    }

    fn force_biome(&self, chunk: &mut Tag, id: i32) {
        self.decoder.force_biome(chunk, id)
    }

    fn replace_blocks(&self, chunk: &mut Tag, replace: &BTreeMap<String, String>) {
        self.decoder.replace_blocks(chunk, replace)
    }

    fn block_amount(&self, chunk: &Tag, names: &[&str]) -> usize {
        self.decoder.block_amount(chunk, names)
    }

    fn average_height(&self, chunk: &Tag) -> i32 {
        self.decoder.average_height(chunk)
    }
}
