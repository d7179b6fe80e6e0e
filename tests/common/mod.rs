#![allow(dead_code)]

use chunkview::{Engine, RenderOptions, Tag};
use chunkview_anvil::bits::{self, PackingLayout};
use chunkview_anvil::{BlockColors, LegacyMapping};
use chunkview_common::chunk::{BIOME_VOLUME_LEN, COLUMN_COUNT, SECTION_VOLUME};
use std::collections::BTreeMap;

pub const LEGACY_VERSION: i32 = 1343;
pub const SPANNING_VERSION: i32 = 2230;
pub const PADDED_VERSION: i32 = 2586;

pub fn engine() -> Engine {
    Engine::new(LegacyMapping::bundled(), BlockColors::bundled(), RenderOptions::default())
}

pub fn replace(pairs: &[(&str, &str)]) -> BTreeMap<String, String> {
    pairs
        .iter()
        .map(|(from, to)| (from.to_string(), to.to_string()))
        .collect()
}

/// Block index inside a section, `y * 256 + z * 16 + x`.
pub fn at(x: usize, y: usize, z: usize) -> usize {
    y * 256 + z * 16 + x
}

pub fn legacy_section(y: i8, fill: impl Fn(usize) -> (u8, u8)) -> Tag {
    let mut blocks = vec![0i8; SECTION_VOLUME];
    let mut data = vec![0i8; SECTION_VOLUME / 2];
    for (i, block) in blocks.iter_mut().enumerate() {
        let (id, d) = fill(i);
        *block = id as i8;
        let shift = if i % 2 == 0 { 0 } else { 4 };
        data[i / 2] = (data[i / 2] as u8 | (d & 0x0F) << shift) as i8;
    }
    Tag::compound([
        ("Y", Tag::Byte(y)),
        ("Blocks", Tag::ByteArray(blocks)),
        ("Data", Tag::ByteArray(data)),
    ])
}

pub fn legacy_chunk(sections: Vec<Tag>) -> Tag {
    Tag::compound([
        ("DataVersion", Tag::Int(LEGACY_VERSION)),
        (
            "Level",
            Tag::compound([
                ("Sections", Tag::List(sections)),
                ("Biomes", Tag::ByteArray(vec![1; COLUMN_COUNT])),
                ("TileEntities", Tag::List(vec![])),
            ]),
        ),
    ])
}

pub fn state(name: &str) -> Tag {
    Tag::compound([("Name", Tag::String(format!("minecraft:{}", name)))])
}

pub fn state_with(name: &str, properties: &[(&str, &str)]) -> Tag {
    let mut tag = state(name);
    let properties = Tag::compound(
        properties
            .iter()
            .map(|(k, v)| (k.to_string(), Tag::String(v.to_string()))),
    );
    tag.insert("Properties", properties);
    tag
}

pub fn paletted_section(
    y: i8,
    palette: Vec<Tag>,
    fill: impl Fn(usize) -> usize,
    layout: PackingLayout,
) -> Tag {
    let values: Vec<usize> = (0..SECTION_VOLUME).map(fill).collect();
    let width = bits::bits_for_palette(palette.len());
    Tag::compound([
        ("Y", Tag::Byte(y)),
        ("Palette", Tag::List(palette)),
        ("BlockStates", Tag::LongArray(bits::pack(&values, width, layout).unwrap())),
    ])
}

pub fn paletted_chunk(version: i32, sections: Vec<Tag>) -> Tag {
    Tag::compound([
        ("DataVersion", Tag::Int(version)),
        (
            "Level",
            Tag::compound([
                ("Status", Tag::String("full".to_owned())),
                ("Sections", Tag::List(sections)),
                ("Biomes", Tag::IntArray(vec![1; BIOME_VOLUME_LEN])),
                ("TileEntities", Tag::List(vec![])),
            ]),
        ),
    ])
}

pub fn tile_entity(id: &str) -> Tag {
    Tag::compound([("id", Tag::String(id.to_owned()))])
}

pub fn push_tile_entity(chunk: &mut Tag, entity: Tag) {
    if let Some(list) = chunk
        .get_path_mut(&["Level", "TileEntities"])
        .and_then(Tag::as_list_mut)
    {
        list.push(entity);
    }
}

pub fn section_count(chunk: &Tag) -> usize {
    chunk
        .get_path(&["Level", "Sections"])
        .and_then(Tag::as_list)
        .map_or(0, Vec::len)
}
