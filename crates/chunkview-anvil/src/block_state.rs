//! Classification of blocks for top-down scans.

use chunkview_nbt::Tag;

/// Heights above this are cleared of nether ceiling blocks.
pub const NETHER_CEILING: i32 = 75;

/// nether_wastes, soul_sand_valley, crimson_forest, warped_forest, basalt_deltas
const NETHER_BIOMES: [i32; 5] = [8, 170, 171, 172, 173];

const NETHER_CLUTTER: [&str; 5] = [
    "minecraft:bedrock",
    "minecraft:flowing_lava",
    "minecraft:lava",
    "minecraft:netherrack",
    "minecraft:nether_quartz_ore",
];

const EMPTY_BLOCKS: [&str; 4] = [
    "minecraft:air",
    "minecraft:cave_air",
    "minecraft:barrier",
    "minecraft:structure_void",
];

pub const AIR: &str = "minecraft:air";
const AIR_NAMES: [&str; 3] = [AIR, "minecraft:cave_air", "minecraft:void_air"];
pub const WATER: &str = "minecraft:water";

/// A palette entry: `{Name, Properties?}`.
#[derive(Debug, Clone, Copy)]
pub struct BlockState<'a> {
    tag: &'a Tag,
}

impl<'a> BlockState<'a> {
    pub fn new(tag: &'a Tag) -> Self {
        BlockState { tag }
    }

    /// Empty string for an entry without a name.
    pub fn name(&self) -> &'a str {
        self.tag.get_string("Name").unwrap_or("")
    }

    pub fn property(&self, key: &str) -> Option<&'a str> {
        self.tag.get("Properties")?.get_string(key)
    }

    fn has_properties(&self) -> bool {
        self.tag
            .as_compound()
            .is_some_and(|c| c.keys().any(|k| k != "Name"))
    }

    /// Air-like with nothing but a name.
    pub fn is_empty(&self) -> bool {
        EMPTY_BLOCKS.contains(&self.name()) && !self.has_properties()
    }

    pub fn is_water(&self) -> bool {
        matches!(self.name(), "minecraft:water" | "minecraft:bubble_column")
    }

    pub fn is_waterlogged(&self) -> bool {
        self.property("waterlogged") == Some("true")
    }
}

/// Any of the air variants, regardless of properties.
pub fn is_air(name: &str) -> bool {
    AIR_NAMES.contains(&name)
}

pub fn is_nether_biome(biome: i32) -> bool {
    NETHER_BIOMES.contains(&biome)
}

/// Nether ceiling blocks are skipped so the scan reaches the cave floor.
pub fn is_ignored_in_nether(biome: i32, name: &str, height: i32) -> bool {
    is_nether_biome(biome) && NETHER_CLUTTER.contains(&name) && height > NETHER_CEILING
}

pub mod legacy {
    //! The same predicates over pre-flattening ids.

    use super::NETHER_CEILING;

    pub const AIR: u8 = 0;
    const EMPTY: [u8; 3] = [AIR, 166, 217];
    const WATER: [u8; 2] = [8, 9];
    /// bedrock, flowing lava, lava, netherrack, quartz ore
    const NETHER_CLUTTER: [u8; 5] = [7, 10, 11, 87, 153];
    const HELL: u8 = 8;

    pub fn is_empty(id: u8) -> bool {
        EMPTY.contains(&id)
    }

    pub fn is_water(id: u8) -> bool {
        WATER.contains(&id)
    }

    pub fn is_ignored_in_nether(biome: u8, id: u8, height: i32) -> bool {
        biome == HELL && NETHER_CLUTTER.contains(&id) && height > NETHER_CEILING
    }
}
