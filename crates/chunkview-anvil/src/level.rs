//! Structural access to a chunk record: `DataVersion`, `Level`, `Sections`.

use chunkview_nbt::Tag;
use std::collections::BTreeMap;

/// First version storing named palettes instead of byte ids.
pub const FLATTENING_VERSION: i32 = 1451;
/// First version storing 1024 biome cells instead of 256 columns.
pub const BIOME_VOLUME_VERSION: i32 = 2203;
/// First version that stops packed fields from straddling words.
pub const PADDED_STATES_VERSION: i32 = 2529;

pub fn data_version(chunk: &Tag) -> Option<i32> {
    chunk.get("DataVersion").and_then(Tag::as_number).and_then(|v| i32::try_from(v).ok())
}

pub fn level(chunk: &Tag) -> Option<&Tag> {
    chunk.get("Level").filter(|l| l.as_compound().is_some())
}

pub fn level_mut(chunk: &mut Tag) -> Option<&mut Tag> {
    chunk.get_mut("Level").filter(|l| l.as_compound().is_some())
}

pub fn sections(chunk: &Tag) -> Option<&Vec<Tag>> {
    level(chunk)?.get("Sections")?.as_list()
}

pub fn sections_mut(chunk: &mut Tag) -> Option<&mut Vec<Tag>> {
    level_mut(chunk)?.get_mut("Sections")?.as_list_mut()
}

pub fn section_y(section: &Tag) -> Option<i32> {
    section.get("Y").and_then(Tag::as_number).and_then(|y| i32::try_from(y).ok())
}

/// Sections ordered top-down. A section without `Y` sorts as `-1`.
pub fn sorted_sections(sections: &[Tag]) -> Vec<&Tag> {
    let mut sorted: Vec<&Tag> = sections.iter().collect();
    sorted.sort_by_key(|s| std::cmp::Reverse(section_y(s).unwrap_or(-1)));
    sorted
}

/// Ensures sections `0..16` all exist, creating missing ones with `make_empty`
/// and rebuilding ones `is_valid` rejects. The list ends up sorted by `Y`.
pub fn materialize_sections(
    sections: &mut Vec<Tag>,
    is_valid: impl Fn(&Tag) -> bool,
    make_empty: impl Fn(i32) -> Tag,
) {
    let mut by_y: BTreeMap<i32, Tag> = BTreeMap::new();
    let mut unplaced = Vec::new();
    for section in sections.drain(..) {
        match section_y(&section) {
            Some(y) => {
                by_y.insert(y, section);
            }
            None => unplaced.push(section),
        }
    }

    for y in 0..chunkview_common::chunk::SECTION_COUNT {
        let rebuild = by_y.get(&y).map_or(true, |s| !is_valid(s));
        if rebuild {
            by_y.insert(y, make_empty(y));
        }
    }

    sections.extend(unplaced);
    sections.extend(by_y.into_values());
}

/// Deletes `Level.TileEntities` entries whose `id` satisfies `is_replaced`.
pub fn remove_tile_entities(chunk: &mut Tag, mut is_replaced: impl FnMut(&str) -> bool) {
    let Some(entities) = level_mut(chunk)
        .and_then(|l| l.get_mut("TileEntities"))
        .and_then(Tag::as_list_mut)
    else {
        return;
    };
    entities.retain(|entity| !entity.get_string("id").is_some_and(&mut is_replaced));
}
