//! Pre-flattening chunks: 4096 byte ids plus 2048 bytes of data nibbles per section.

use crate::block_state::legacy::{self as ids, AIR};
use crate::colors::ColorMapping;
use crate::filter::{ChunkFilter, ChunkRenderer};
use crate::level;
use crate::mapping::{BlockData, LegacyMapping};
use crate::render::{ColumnPainter, Surface};
use chunkview_common::chunk::{block_index, column_index, CHUNK_SIZE, COLUMN_COUNT, SECTION_COUNT, SECTION_VOLUME};
use chunkview_common::RenderTarget;
use chunkview_logger::{log, LogSeverity::{Debug, Warning}};
use chunkview_nbt::Tag;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

const DATA_LEN: usize = SECTION_VOLUME / 2;

/// Even indices live in the low nibble, odd ones in the high nibble.
#[inline]
fn nibble(data: &[i8], index: usize) -> u8 {
    let byte = data[index / 2] as u8;
    if index % 2 == 0 {
        byte & 0x0F
    } else {
        byte >> 4
    }
}

#[inline]
fn set_nibble(data: &mut [i8], index: usize, value: u8) {
    let byte = data[index / 2] as u8;
    let byte = if index % 2 == 0 {
        (byte & 0xF0) | (value & 0x0F)
    } else {
        (byte & 0x0F) | (value << 4)
    };
    data[index / 2] = byte as i8;
}

/// Borrowed id and data arrays of one well-formed section.
struct Section<'a> {
    y: Option<i32>,
    blocks: &'a [i8],
    data: &'a [i8],
}

impl<'a> Section<'a> {
    fn from_tag(tag: &'a Tag) -> Option<Self> {
        let blocks = tag.get("Blocks")?.as_byte_array()?;
        let data = tag.get("Data").and_then(Tag::as_byte_array);
        match data {
            Some(data) if blocks.len() == SECTION_VOLUME && data.len() == DATA_LEN => Some(Section {
                y: level::section_y(tag),
                blocks,
                data,
            }),
            _ => {
                log(
                    format!("skipping malformed legacy section at Y={:?}", level::section_y(tag)),
                    Warning,
                );
                None
            }
        }
    }

    #[inline]
    fn block(&self, index: usize) -> (u8, u8) {
        (self.blocks[index] as u8, nibble(self.data, index))
    }

    fn blocks(&self) -> impl Iterator<Item = (u8, u8)> + '_ {
        (0..SECTION_VOLUME).map(|i| self.block(i))
    }
}

fn sections(chunk: &Tag) -> Option<Vec<Section<'_>>> {
    Some(level::sections(chunk)?.iter().filter_map(Section::from_tag).collect())
}

fn biomes(chunk: &Tag) -> Option<&[i8]> {
    level::level(chunk)?.get("Biomes")?.as_byte_array()
}

fn empty_section(y: i32) -> Tag {
    Tag::compound([
        ("Y", Tag::Byte(y as i8)),
        ("Blocks", Tag::ByteArray(vec![0; SECTION_VOLUME])),
        ("Data", Tag::ByteArray(vec![0; DATA_LEN])),
    ])
}

fn matches_any(entries: &[BlockData], (id, data): (u8, u8)) -> bool {
    entries.iter().any(|bd| bd.matches(id, data))
}

#[derive(Debug, Clone)]
pub struct LegacyDecoder {
    mapping: Arc<LegacyMapping>,
}

impl LegacyDecoder {
    pub fn new(mapping: Arc<LegacyMapping>) -> Self {
        LegacyDecoder { mapping }
    }

    pub fn mapping(&self) -> &LegacyMapping {
        &self.mapping
    }

    fn lookup(&self, name: &str) -> Option<&[BlockData]> {
        let entries = self.mapping.lookup(name);
        if entries.is_none() {
            log(format!("no mapping found for {}", name), Debug);
        }
        entries
    }

    fn contains(&self, sections: &[Section<'_>], entries: &[BlockData]) -> bool {
        sections
            .iter()
            .any(|section| section.blocks().any(|block| matches_any(entries, block)))
    }
}

fn replace_in_section(section: &mut Tag, rules: &[(&[BlockData], BlockData)]) {
    let Some(compound) = section.as_compound_mut() else {
        return;
    };
    // Data is lifted out so both arrays can be borrowed mutably.
    let Some(mut data_tag) = compound.remove("Data") else {
        return;
    };
    let blocks = compound.get_mut("Blocks").and_then(Tag::as_byte_array_mut);
    if let (Some(blocks), Some(data)) = (blocks, data_tag.as_byte_array_mut()) {
        if blocks.len() == SECTION_VOLUME && data.len() == DATA_LEN {
            for i in 0..SECTION_VOLUME {
                let block = (blocks[i] as u8, nibble(data, i));
                let target = rules
                    .iter()
                    .find(|(sources, _)| matches_any(sources, block))
                    .map(|(_, target)| target);
                if let Some(target) = target {
                    blocks[i] = target.id as i8;
                    set_nibble(data, i, target.first_data());
                }
            }
        }
    }
    compound.insert("Data".to_owned(), data_tag);
}

impl ChunkFilter for LegacyDecoder {
    fn match_all_block_names(&self, chunk: &Tag, names: &[&str]) -> bool {
        let Some(sections) = sections(chunk) else {
            return false;
        };
        names.iter().all(|name| {
            self.lookup(name)
                .is_some_and(|entries| self.contains(&sections, entries))
        })
    }

    fn match_any_block_name(&self, chunk: &Tag, names: &[&str]) -> bool {
        let Some(sections) = sections(chunk) else {
            return false;
        };
        names.iter().any(|name| {
            self.lookup(name)
                .is_some_and(|entries| self.contains(&sections, entries))
        })
    }

    fn palette_equals(&self, chunk: &Tag, names: &[&str]) -> bool {
        let Some(sections) = sections(chunk) else {
            return false;
        };
        let mut wanted = Vec::with_capacity(names.len());
        for name in names {
            match self.lookup(name) {
                Some(entries) => wanted.push(entries),
                None => return false,
            }
        }

        let mut present = HashSet::new();
        for section in &sections {
            for block in section.blocks() {
                if block.0 == AIR {
                    continue;
                }
                if !wanted.iter().any(|entries| matches_any(entries, block)) {
                    return false;
                }
                present.insert(block);
            }
        }

        wanted.iter().all(|entries| {
            entries.iter().any(|bd| bd.id == AIR)
                || present.iter().any(|&block| matches_any(entries, block))
        })
    }

    fn match_biome_ids(&self, chunk: &Tag, ids: &[i32]) -> bool {
        let Some(biomes) = biomes(chunk) else {
            return false;
        };
        ids.iter()
            .all(|&id| biomes.iter().any(|&b| b as u8 as i32 == id))
    }

    fn match_any_biome_id(&self, chunk: &Tag, ids: &[i32]) -> bool {
        let Some(biomes) = biomes(chunk) else {
            return false;
        };
        ids.iter()
            .any(|&id| biomes.iter().any(|&b| b as u8 as i32 == id))
    }

    fn change_biome(&self, chunk: &mut Tag, id: i32) {
        if let Some(biomes) = level::level_mut(chunk)
            .and_then(|l| l.get_mut("Biomes"))
            .and_then(Tag::as_byte_array_mut)
        {
            biomes.fill(id as i8);
        }
    }

    fn force_biome(&self, chunk: &mut Tag, id: i32) {
        if let Some(level) = level::level_mut(chunk) {
            level.insert("Biomes", Tag::ByteArray(vec![id as i8; COLUMN_COUNT]));
        }
    }

    fn replace_blocks(&self, chunk: &mut Tag, replace: &BTreeMap<String, String>) {
        let mut rules = Vec::with_capacity(replace.len());
        for (from, to) in replace {
            let Some(sources) = self.lookup(from) else {
                continue;
            };
            let Some(&target) = self.lookup(to).and_then(<[_]>::first) else {
                continue;
            };
            rules.push((sources, target));
        }

        let Some(section_list) = level::sections_mut(chunk) else {
            return;
        };
        if replace.contains_key(crate::block_state::AIR) {
            // air is implicit, so missing sections have to exist before they can be filled
            level::materialize_sections(
                section_list,
                |s| s.get("Blocks").is_some() && s.get("Data").is_some(),
                empty_section,
            );
        }
        for section in section_list.iter_mut() {
            replace_in_section(section, &rules);
        }

        level::remove_tile_entities(chunk, |id| replace.contains_key(id));
    }

    fn block_amount(&self, chunk: &Tag, names: &[&str]) -> usize {
        let Some(sections) = sections(chunk) else {
            return 0;
        };
        names
            .iter()
            .filter_map(|name| self.lookup(name))
            .map(|entries| {
                sections
                    .iter()
                    .map(|s| s.blocks().filter(|&b| matches_any(entries, b)).count())
                    .sum::<usize>()
            })
            .sum()
    }

    fn average_height(&self, chunk: &Tag) -> i32 {
        let Some(section_list) = level::sections(chunk) else {
            return 0;
        };
        let sorted = level::sorted_sections(section_list);
        let sections: Vec<(i32, &[i8])> = sorted
            .into_iter()
            .filter_map(|s| {
                let blocks = s.get("Blocks")?.as_byte_array()?;
                (blocks.len() == SECTION_VOLUME).then_some((level::section_y(s)?, blocks))
            })
            .collect();

        let mut total = 0i32;
        for cz in 0..CHUNK_SIZE {
            for cx in 0..CHUNK_SIZE {
                let top = sections.iter().find_map(|&(y, blocks)| {
                    (0..CHUNK_SIZE)
                        .rev()
                        .find(|&cy| !ids::is_empty(blocks[block_index(cx, cy, cz)] as u8))
                        .map(|cy| y * CHUNK_SIZE as i32 + cy as i32)
                });
                total += top.unwrap_or(0);
            }
        }
        total.div_euclid(COLUMN_COUNT as i32)
    }
}

impl ChunkRenderer for LegacyDecoder {
    fn draw_chunk(
        &self,
        chunk: &Tag,
        colors: &dyn ColorMapping,
        x: usize,
        z: usize,
        target: &mut RenderTarget<'_>,
        water: bool,
    ) {
        let Some(section_list) = level::sections(chunk) else {
            return;
        };
        let sections: Vec<Section<'_>> = level::sorted_sections(section_list)
            .into_iter()
            .filter_map(Section::from_tag)
            .filter(|s| s.y.is_some_and(|y| (0..SECTION_COUNT).contains(&y)))
            .collect();
        let biomes = biomes(chunk).filter(|b| b.len() == COLUMN_COUNT);
        let water_rgb = colors.water_rgb();

        for cz in 0..CHUNK_SIZE {
            'column: for cx in 0..CHUNK_SIZE {
                let Some(index) = target.index(x + cx, z + cz) else {
                    continue;
                };
                let biome = biomes.map(|b| b[column_index(cx, cz)] as u8);
                let mut painter = ColumnPainter::new(index, water);

                for section in &sections {
                    let base = section.y.unwrap_or(0) * CHUNK_SIZE as i32;
                    for cy in (0..CHUNK_SIZE).rev() {
                        let (id, data) = section.block(block_index(cx, cy, cz));
                        let height = base + cy as i32;
                        if biome.is_some_and(|b| ids::is_ignored_in_nether(b, id, height)) {
                            continue;
                        }
                        if ids::is_empty(id) {
                            continue;
                        }
                        let surface = if ids::is_water(id) {
                            Surface::Water
                        } else {
                            Surface::Solid
                        };
                        let rgb = colors.legacy_rgb(id, data);
                        if painter.paint(target, surface, rgb, water_rgb, height) {
                            continue 'column;
                        }
                    }
                }
            }
        }
    }
}
