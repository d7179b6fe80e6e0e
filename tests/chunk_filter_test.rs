mod common;

use chunkview::{ChunkFilter, ChunkFormat, Tag};
use chunkview_anvil::bits::PackingLayout;
use chunkview_common::chunk::SECTION_VOLUME;
use common::*;

#[test]
fn test_match_all_requires_every_name() {
    let engine = engine();
    let legacy = legacy_chunk(vec![legacy_section(0, |i| if i == 0 { (1, 0) } else { (0, 0) })]);
    let paletted = paletted_chunk(
        SPANNING_VERSION,
        vec![paletted_section(0, vec![state("air"), state("stone")], |i| (i == 0) as usize, PackingLayout::Spanning)],
    );

    for chunk in [&legacy, &paletted] {
        let names = ["minecraft:stone", "minecraft:dirt"];
        assert!(!engine.match_all_block_names(chunk, &names));
        assert!(engine.match_any_block_name(chunk, &names));
        assert!(engine.match_all_block_names(chunk, &["minecraft:stone"]));
        assert!(engine.match_all_block_names(chunk, &[]));
    }
}

#[test]
fn test_unmapped_name_never_matches() {
    let engine = engine();
    let chunk = legacy_chunk(vec![legacy_section(0, |_| (1, 0))]);
    assert!(!engine.match_all_block_names(&chunk, &["minecraft:unobtainium"]));
    assert!(!engine.match_any_block_name(&chunk, &["minecraft:unobtainium"]));
    assert!(engine.match_any_block_name(&chunk, &["minecraft:unobtainium", "minecraft:stone"]));
    assert_eq!(engine.block_amount(&chunk, &["minecraft:unobtainium"]), 0);
}

#[test]
fn test_palette_equals_rejects_stray_block() {
    let engine = engine();
    // stone and dirt fill the section except one stray sand block
    let legacy_fill = |i: usize| match i {
        0 => (12, 0),
        i if i % 2 == 0 => (1, 0),
        _ => (3, 0),
    };
    let legacy = legacy_chunk(vec![legacy_section(2, legacy_fill)]);
    let clean = legacy_chunk(vec![legacy_section(2, |i| if i % 2 == 0 { (1, 0) } else { (3, 0) })]);

    let palette = vec![state("stone"), state("dirt"), state("sand")];
    let paletted_fill = |i: usize| match i {
        0 => 2,
        i => i % 2,
    };
    let paletted = paletted_chunk(
        SPANNING_VERSION,
        vec![paletted_section(2, palette, paletted_fill, PackingLayout::Spanning)],
    );

    let names = ["minecraft:stone", "minecraft:dirt"];
    assert!(!engine.palette_equals(&legacy, &names));
    assert!(!engine.palette_equals(&paletted, &names));
    assert!(engine.palette_equals(&clean, &names));
    assert!(!engine.palette_equals(&clean, &["minecraft:stone", "minecraft:dirt", "minecraft:sand"]));
}

#[test]
fn test_field_spanning_two_words() {
    // palette of 5 at 3 bits: 192 words. Position 21 occupies bits 63..=65.
    let mut words = vec![0i64; 192];
    words[0] = (1u64 << 63 | 0b100) as i64;
    words[1] = 0b01;
    let palette = vec![state("air"), state("stone"), state("dirt"), state("grass_block"), state("sand")];
    let section = Tag::compound([
        ("Y", Tag::Byte(0)),
        ("Palette", Tag::List(palette)),
        ("BlockStates", Tag::LongArray(words)),
    ]);
    let chunk = paletted_chunk(SPANNING_VERSION, vec![section]);

    let engine = engine();
    assert_eq!(engine.block_amount(&chunk, &["minecraft:sand"]), 1);
    assert_eq!(engine.block_amount(&chunk, &["minecraft:grass_block"]), 1);
    assert_eq!(engine.block_amount(&chunk, &["minecraft:stone", "minecraft:dirt"]), 0);

    // position 21 is x = 5, z = 1 on the bottom layer
    assert_eq!(at(5, 0, 1), 21);
    let mut tile = engine.new_tile();
    engine.render_chunk(&chunk, 0, 0, &mut tile.target());
    assert_eq!(tile.terrain_heights[512 + 5], 0);
    assert_eq!(tile.colors[512 + 5], 0xFF00_0000 | 0x7fb238);
    assert_eq!(tile.colors[0], 0xFF00_0000 | 0xdbd3a0);
}

#[test]
fn test_every_mapped_name_matches_its_own_block() {
    let engine = engine();
    for (name, entries) in engine.mapping().entries() {
        for entry in entries {
            let (id, data) = (entry.id, entry.first_data());
            let chunk = legacy_chunk(vec![legacy_section(0, |i| if i == 0 { (id, data) } else { (0, 0) })]);
            assert!(
                engine.match_any_block_name(&chunk, &[name]),
                "{} did not match ({}, {})",
                name,
                id,
                data
            );
        }
    }
}

#[test]
fn test_replace_air_materializes_sections() {
    let engine = engine();
    let mut legacy = legacy_chunk(vec![
        legacy_section(0, |_| (7, 0)),
        legacy_section(3, |i| if i < 256 { (1, 0) } else { (0, 0) }),
    ]);
    engine.replace_blocks(&mut legacy, &replace(&[("minecraft:air", "minecraft:stone")]));
    assert_eq!(section_count(&legacy), 16);
    assert_eq!(engine.block_amount(&legacy, &["minecraft:bedrock"]), SECTION_VOLUME);
    assert_eq!(engine.block_amount(&legacy, &["minecraft:stone"]), 15 * SECTION_VOLUME);
    assert!(!engine.match_any_block_name(&legacy, &["minecraft:air"]));

    let mut paletted = paletted_chunk(
        PADDED_VERSION,
        vec![paletted_section(5, vec![state("air"), state("dirt")], |i| (i < 256) as usize, PackingLayout::Padded)],
    );
    engine.replace_blocks(&mut paletted, &replace(&[("minecraft:air", "minecraft:stone")]));
    assert_eq!(section_count(&paletted), 16);
    assert_eq!(engine.block_amount(&paletted, &["minecraft:stone"]), 16 * SECTION_VOLUME - 256);
    assert_eq!(engine.block_amount(&paletted, &["minecraft:dirt"]), 256);
}

#[test]
fn test_replace_removes_tile_entities() {
    let engine = engine();
    let mut chunk = legacy_chunk(vec![legacy_section(0, |i| if i == 0 { (54, 2) } else { (1, 0) })]);
    push_tile_entity(&mut chunk, tile_entity("minecraft:chest"));
    push_tile_entity(&mut chunk, tile_entity("minecraft:furnace"));

    engine.replace_blocks(&mut chunk, &replace(&[("minecraft:chest", "minecraft:stone")]));
    assert_eq!(engine.block_amount(&chunk, &["minecraft:stone"]), SECTION_VOLUME);
    let entities = chunk.get_path(&["Level", "TileEntities"]).and_then(Tag::as_list).unwrap();
    assert_eq!(entities, &vec![tile_entity("minecraft:furnace")]);
}

#[test]
fn test_average_height_of_flat_layer() {
    let engine = engine();
    let legacy = legacy_chunk(vec![
        legacy_section(0, |_| (0, 0)),
        legacy_section(4, |i| if i < 256 { (1, 0) } else { (0, 0) }),
    ]);
    let paletted = paletted_chunk(
        SPANNING_VERSION,
        vec![paletted_section(4, vec![state("air"), state("stone")], |i| (i < 256) as usize, PackingLayout::Spanning)],
    );
    assert_eq!(engine.average_height(&legacy), 64);
    assert_eq!(engine.average_height(&paletted), 64);
}

#[test]
fn test_average_height_counts_empty_columns_as_zero() {
    let engine = engine();
    // one column at y = 64, everything else air
    let chunk = legacy_chunk(vec![legacy_section(4, |i| if i == 0 { (1, 0) } else { (0, 0) })]);
    assert_eq!(engine.average_height(&chunk), 0);
    let chunk = legacy_chunk(vec![legacy_section(15, |i| if i / 256 == 15 && i % 2 == 0 { (1, 0) } else { (0, 0) })]);
    assert_eq!(engine.average_height(&chunk), 127);
}

#[test]
fn test_biome_operations_by_format() {
    let engine = engine();
    let mut legacy = legacy_chunk(vec![]);
    let mut paletted = paletted_chunk(SPANNING_VERSION, vec![]);
    for chunk in [&mut legacy, &mut paletted] {
        assert!(engine.match_biome_ids(chunk, &[1]));
        engine.change_biome(chunk, 6);
        assert!(engine.match_biome_ids(chunk, &[6]));
        assert!(!engine.match_any_biome_id(chunk, &[1, 2]));
    }
    assert_eq!(
        legacy.get_path(&["Level", "Biomes"]).and_then(Tag::as_byte_array).map(<[_]>::len),
        Some(256)
    );
    assert_eq!(
        paletted.get_path(&["Level", "Biomes"]).and_then(Tag::as_int_array).map(<[_]>::len),
        Some(1024)
    );
}

#[test]
fn test_structural_dispatch_without_version() {
    let engine = engine();
    let mut chunk = legacy_chunk(vec![legacy_section(0, |_| (1, 0))]);
    chunk.as_compound_mut().unwrap().remove("DataVersion");
    assert_eq!(ChunkFormat::detect(&chunk), Some(ChunkFormat::Legacy));
    assert!(engine.match_any_block_name(&chunk, &["minecraft:stone"]));
}

#[test]
fn test_concurrent_queries_on_shared_engine() {
    let engine = engine();
    let chunks: Vec<Tag> = (0..8)
        .map(|n| {
            paletted_chunk(
                SPANNING_VERSION,
                vec![paletted_section(
                    n,
                    vec![state("air"), state("stone")],
                    |i| (i < 256) as usize,
                    PackingLayout::Spanning,
                )],
            )
        })
        .collect();

    let heights: Vec<i32> = std::thread::scope(|scope| {
        let handles: Vec<_> = chunks
            .iter()
            .map(|chunk| {
                let engine = &engine;
                scope.spawn(move || {
                    let mut tile = engine.new_tile();
                    engine.render_chunk(chunk, 0, 0, &mut tile.target());
                    assert!(engine.match_any_block_name(chunk, &["minecraft:stone"]));
                    engine.average_height(chunk)
                })
            })
            .collect();
        handles.into_iter().map(|h| h.join().unwrap()).collect()
    });
    assert_eq!(heights, (0..8).map(|n| n * 16).collect::<Vec<_>>());
}
