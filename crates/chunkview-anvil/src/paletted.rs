//! Post-flattening chunks: per-section palettes indexed by packed long arrays.

use crate::bits::{self, PackedIndices, PackingLayout};
use crate::block_state::{self, BlockState, AIR};
use crate::colors::ColorMapping;
use crate::filter::{ChunkFilter, ChunkRenderer};
use crate::level::{self, BIOME_VOLUME_VERSION};
use crate::render::{ColumnPainter, Surface};
use chunkview_common::chunk::{
    biome_cell_index, block_index, column_index, BIOME_COLUMN_LEN, BIOME_VOLUME_LEN, CHUNK_SIZE,
    COLUMN_COUNT, SECTION_COUNT, SECTION_VOLUME,
};
use chunkview_common::RenderTarget;
use chunkview_logger::{log, LogSeverity::Warning};
use chunkview_nbt::Tag;
use std::collections::BTreeMap;

/// Palette and index array of one well-formed section.
struct Section<'a> {
    y: Option<i32>,
    palette: &'a [Tag],
    states: PackedIndices<'a>,
}

impl<'a> Section<'a> {
    fn from_tag(tag: &'a Tag, layout: PackingLayout) -> Option<Self> {
        let palette = tag.get("Palette")?.as_list()?;
        let states = tag
            .get("BlockStates")
            .and_then(Tag::as_long_array)
            .and_then(|words| PackedIndices::new(words, palette.len(), layout));
        if states.is_none() {
            log(
                format!("skipping section at Y={:?} with unusable BlockStates", level::section_y(tag)),
                Warning,
            );
        }
        Some(Section {
            y: level::section_y(tag),
            palette,
            states: states?,
        })
    }

    #[inline]
    fn state(&self, index: usize) -> Option<BlockState<'a>> {
        self.palette.get(self.states.get(index)?).map(BlockState::new)
    }

    /// How many of the 4096 positions use each palette entry.
    fn usage(&self) -> Vec<usize> {
        let mut counts = vec![0; self.palette.len()];
        for index in self.states.iter().flatten() {
            if let Some(count) = counts.get_mut(index) {
                *count += 1;
            }
        }
        counts
    }
}

/// Palettes of the sections whose indices decode. `None` without a section list.
fn palettes(chunk: &Tag) -> Option<Vec<&[Tag]>> {
    let layout = layout(chunk);
    Some(
        level::sections(chunk)?
            .iter()
            .filter_map(|s| Section::from_tag(s, layout))
            .map(|s| s.palette)
            .collect(),
    )
}

fn palette_names<'a>(palettes: &'a [&'a [Tag]]) -> impl Iterator<Item = &'a str> {
    palettes
        .iter()
        .flat_map(|palette| palette.iter())
        .map(|entry| BlockState::new(entry).name())
}

fn biomes(chunk: &Tag) -> Option<&[i32]> {
    level::level(chunk)?.get("Biomes")?.as_int_array()
}

/// Biome at a block position. 1024 entries are 4x4x4 cells, 256 are columns.
fn biome_at(biomes: Option<&[i32]>, x: usize, y: i32, z: usize) -> i32 {
    let Some(biomes) = biomes else {
        return -1;
    };
    let index = match biomes.len() {
        BIOME_VOLUME_LEN => usize::try_from(y).ok().map(|y| biome_cell_index(x, y, z)),
        BIOME_COLUMN_LEN => Some(column_index(x, z)),
        _ => None,
    };
    index.and_then(|i| biomes.get(i)).copied().unwrap_or(-1)
}

fn layout(chunk: &Tag) -> PackingLayout {
    level::data_version(chunk).map_or(PackingLayout::Spanning, PackingLayout::for_version)
}

fn air_state() -> Tag {
    Tag::compound([("Name", Tag::String(AIR.to_owned()))])
}

/// Every index is zero, so both layouts produce the same words.
fn empty_section(y: i32) -> Tag {
    let words = SECTION_VOLUME * bits::MIN_BITS as usize / 64;
    Tag::compound([
        ("Y", Tag::Byte(y as i8)),
        ("Palette", Tag::List(vec![air_state()])),
        ("BlockStates", Tag::LongArray(vec![0; words])),
    ])
}

/// Rewrites one section's palette and re-packs its indices. Sections whose
/// indices point outside the palette are left untouched.
fn replace_in_section(section: &mut Tag, replace: &BTreeMap<String, String>, layout: PackingLayout) {
    let (palette, indices) = {
        let Some(parsed) = Section::from_tag(section, layout) else {
            return;
        };
        let touched = parsed
            .palette
            .iter()
            .any(|entry| replace.contains_key(BlockState::new(entry).name()));
        if !touched {
            return;
        }
        let indices: Option<Vec<usize>> = parsed
            .states
            .iter()
            .map(|i| i.filter(|&i| i < parsed.palette.len()))
            .collect();
        let Some(indices) = indices else {
            log(
                format!("not replacing in section at Y={:?}: index outside palette", parsed.y),
                Warning,
            );
            return;
        };
        (parsed.palette.to_vec(), indices)
    };

    let mut new_palette: Vec<Tag> = Vec::with_capacity(palette.len());
    let remap: Vec<usize> = palette
        .into_iter()
        .map(|entry| {
            let entry = match replace.get(BlockState::new(&entry).name()) {
                Some(to) => Tag::compound([("Name", Tag::String(to.clone()))]),
                None => entry,
            };
            match new_palette.iter().position(|e| *e == entry) {
                Some(existing) => existing,
                None => {
                    new_palette.push(entry);
                    new_palette.len() - 1
                }
            }
        })
        .collect();

    let values: Vec<usize> = indices.into_iter().map(|i| remap[i]).collect();
    let width = bits::bits_for_palette(new_palette.len());
    let Some(words) = bits::pack(&values, width, layout) else {
        log(format!("not replacing in section: palette of {} is too large", new_palette.len()), Warning);
        return;
    };
    section.insert("BlockStates", Tag::LongArray(words));
    section.insert("Palette", Tag::List(new_palette));
}

#[derive(Debug, Clone, Copy, Default)]
pub struct PalettedDecoder;

impl PalettedDecoder {
    pub fn new() -> Self {
        PalettedDecoder
    }

    fn present(palettes: &[&[Tag]], name: &str) -> bool {
        palette_names(palettes).any(|n| n == name)
    }
}

impl ChunkFilter for PalettedDecoder {
    fn match_all_block_names(&self, chunk: &Tag, names: &[&str]) -> bool {
        palettes(chunk).is_some_and(|p| names.iter().all(|name| Self::present(&p, name)))
    }

    fn match_any_block_name(&self, chunk: &Tag, names: &[&str]) -> bool {
        palettes(chunk).is_some_and(|p| names.iter().any(|name| Self::present(&p, name)))
    }

    fn palette_equals(&self, chunk: &Tag, names: &[&str]) -> bool {
        let Some(palettes) = palettes(chunk) else {
            return false;
        };
        let mut found = vec![false; names.len()];
        for name in palette_names(&palettes) {
            if block_state::is_air(name) {
                continue;
            }
            match names.iter().position(|n| *n == name) {
                Some(i) => found[i] = true,
                None => return false,
            }
        }
        names
            .iter()
            .zip(found)
            .all(|(name, found)| found || block_state::is_air(name))
    }

    fn match_biome_ids(&self, chunk: &Tag, ids: &[i32]) -> bool {
        let Some(biomes) = biomes(chunk) else {
            return false;
        };
        ids.iter().all(|id| biomes.contains(id))
    }

    fn match_any_biome_id(&self, chunk: &Tag, ids: &[i32]) -> bool {
        let Some(biomes) = biomes(chunk) else {
            return false;
        };
        ids.iter().any(|id| biomes.contains(id))
    }

    fn change_biome(&self, chunk: &mut Tag, id: i32) {
        if let Some(biomes) = level::level_mut(chunk)
            .and_then(|l| l.get_mut("Biomes"))
            .and_then(Tag::as_int_array_mut)
        {
            biomes.fill(id);
        }
    }

    fn force_biome(&self, chunk: &mut Tag, id: i32) {
        let len = match level::data_version(chunk) {
            Some(version) if version < BIOME_VOLUME_VERSION => BIOME_COLUMN_LEN,
            Some(_) => BIOME_VOLUME_LEN,
            None => match biomes(chunk).map(<[_]>::len) {
                Some(BIOME_COLUMN_LEN) => BIOME_COLUMN_LEN,
                _ => BIOME_VOLUME_LEN,
            },
        };
        if let Some(level) = level::level_mut(chunk) {
            level.insert("Biomes", Tag::IntArray(vec![id; len]));
        }
    }

    fn replace_blocks(&self, chunk: &mut Tag, replace: &BTreeMap<String, String>) {
        let layout = layout(chunk);
        let Some(sections) = level::sections_mut(chunk) else {
            return;
        };
        if replace.contains_key(AIR) {
            level::materialize_sections(
                sections,
                |s| Section::from_tag(s, layout).is_some(),
                empty_section,
            );
        }
        for section in sections.iter_mut() {
            replace_in_section(section, replace, layout);
        }

        level::remove_tile_entities(chunk, |id| replace.contains_key(id));
    }

    fn block_amount(&self, chunk: &Tag, names: &[&str]) -> usize {
        let Some(sections) = level::sections(chunk) else {
            return 0;
        };
        let layout = layout(chunk);
        sections
            .iter()
            .filter_map(|s| Section::from_tag(s, layout))
            .map(|section| {
                section
                    .palette
                    .iter()
                    .zip(section.usage())
                    .map(|(entry, count)| {
                        let name = BlockState::new(entry).name();
                        names.iter().filter(|n| **n == name).count() * count
                    })
                    .sum::<usize>()
            })
            .sum()
    }

    fn average_height(&self, chunk: &Tag) -> i32 {
        let Some(section_list) = level::sections(chunk) else {
            return 0;
        };
        let layout = layout(chunk);
        let sections: Vec<(i32, Section<'_>)> = level::sorted_sections(section_list)
            .into_iter()
            .filter_map(|s| Section::from_tag(s, layout))
            .filter_map(|s| Some((s.y?, s)))
            .collect();

        let mut total = 0i32;
        for cz in 0..CHUNK_SIZE {
            for cx in 0..CHUNK_SIZE {
                let top = sections.iter().find_map(|(y, section)| {
                    (0..CHUNK_SIZE)
                        .rev()
                        .find(|&cy| {
                            section
                                .state(block_index(cx, cy, cz))
                                .is_some_and(|state| !state.is_empty())
                        })
                        .map(|cy| y * CHUNK_SIZE as i32 + cy as i32)
                });
                total += top.unwrap_or(0);
            }
        }
        total.div_euclid(COLUMN_COUNT as i32)
    }
}

impl ChunkRenderer for PalettedDecoder {
    fn draw_chunk(
        &self,
        chunk: &Tag,
        colors: &dyn ColorMapping,
        x: usize,
        z: usize,
        target: &mut RenderTarget<'_>,
        water: bool,
    ) {
        let Some(level) = level::level(chunk) else {
            return;
        };
        match level.get_string("Status") {
            None | Some("empty") => return,
            Some(_) => {}
        }
        let Some(section_list) = level::sections(chunk) else {
            return;
        };

        let layout = layout(chunk);
        let sections: Vec<(i32, Section<'_>)> = level::sorted_sections(section_list)
            .into_iter()
            .filter_map(|s| Section::from_tag(s, layout))
            .filter_map(|s| s.y.filter(|y| (0..SECTION_COUNT).contains(y)).map(|y| (y, s)))
            .collect();
        let biomes = biomes(chunk);
        let water_rgb = colors.water_rgb();

        for cz in 0..CHUNK_SIZE {
            'column: for cx in 0..CHUNK_SIZE {
                let Some(index) = target.index(x + cx, z + cz) else {
                    continue;
                };
                let mut painter = ColumnPainter::new(index, water);

                for (y, section) in &sections {
                    let base = y * CHUNK_SIZE as i32;
                    for cy in (0..CHUNK_SIZE).rev() {
                        let Some(state) = section.state(block_index(cx, cy, cz)) else {
                            continue;
                        };
                        let height = base + cy as i32;
                        let biome = biome_at(biomes, cx, height, cz);
                        if block_state::is_ignored_in_nether(biome, state.name(), height) {
                            continue;
                        }
                        if state.is_empty() {
                            continue;
                        }
                        let surface = if state.is_water() {
                            Surface::Water
                        } else if state.is_waterlogged() {
                            Surface::Waterlogged
                        } else {
                            Surface::Solid
                        };
                        let rgb = colors.state_rgb(&state);
                        if painter.paint(target, surface, rgb, water_rgb, height) {
                            continue 'column;
                        }
                    }
                }
            }
        }
    }
}
