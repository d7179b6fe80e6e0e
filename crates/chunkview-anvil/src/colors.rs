//! Top-down map colors per block.

use crate::block_state::{BlockState, WATER};
use crate::mapping::{for_each_line, qualify, LegacyMapping};
use chunkview_common::{ChunkviewError, Result};
use chunkview_logger::{log, LogSeverity::Warning};
use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

const BUNDLED: &str = include_str!("../resources/block_colors.txt");

/// Magenta, so unmapped blocks stand out on the map.
pub const DEFAULT_RGB: u32 = 0xFF00FF;

/// Source of `0xRRGGBB` colors for the renderer. Alpha is added by the caller.
pub trait ColorMapping: Send + Sync {
    fn rgb(&self, name: &str) -> u32;

    fn state_rgb(&self, state: &BlockState<'_>) -> u32 {
        self.rgb(state.name())
    }

    fn legacy_rgb(&self, id: u8, data: u8) -> u32;

    /// Color painted over a waterlogged block.
    fn water_rgb(&self) -> u32 {
        self.rgb(WATER)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BlockColors {
    by_name: HashMap<String, u32>,
    by_legacy: HashMap<(u8, u8), u32>,
    default_rgb: u32,
}

impl Default for BlockColors {
    fn default() -> Self {
        BlockColors {
            by_name: HashMap::new(),
            by_legacy: HashMap::new(),
            default_rgb: DEFAULT_RGB,
        }
    }
}

impl BlockColors {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ChunkviewError::MappingError(format!("failed to open {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut colors = BlockColors::default();
        for_each_line(reader, "block color file", |line| colors.add_line(line))?;
        Ok(colors)
    }

    pub fn parse(text: &str) -> Self {
        let mut colors = BlockColors::default();
        text.lines().for_each(|line| colors.add_line(line));
        colors
    }

    fn add_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        let parsed = line
            .split_once(';')
            .and_then(|(name, hex)| Some((name.trim(), u32::from_str_radix(hex.trim(), 16).ok()?)))
            .filter(|(name, rgb)| !name.is_empty() && *rgb <= 0xFF_FFFF);
        match parsed {
            Some((name, rgb)) => {
                self.by_name.insert(qualify(name), rgb);
            }
            None => log(format!("invalid line in block color file: \"{}\"", line), Warning),
        }
    }

    pub fn bundled() -> Self {
        Self::parse(BUNDLED)
    }

    /// Builds the `(id, data)` index from a name table. Names are visited in
    /// sorted order so a pair claimed by several names resolves the same way
    /// on every run.
    pub fn with_legacy(mut self, mapping: &LegacyMapping) -> Self {
        let mut entries: Vec<_> = mapping.entries().collect();
        entries.sort_unstable_by_key(|(name, _)| *name);
        for (name, block_data) in entries {
            let Some(&rgb) = self.by_name.get(name) else {
                continue;
            };
            for bd in block_data {
                for data in bd.data_values() {
                    self.by_legacy.entry((bd.id, data)).or_insert(rgb);
                }
            }
        }
        self
    }

    pub fn with_default(mut self, rgb: u32) -> Self {
        self.default_rgb = rgb & 0xFF_FFFF;
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.by_name.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl ColorMapping for BlockColors {
    fn rgb(&self, name: &str) -> u32 {
        self.by_name.get(name).copied().unwrap_or(self.default_rgb)
    }

    fn legacy_rgb(&self, id: u8, data: u8) -> u32 {
        self.by_legacy
            .get(&(id, data))
            .or_else(|| self.by_legacy.get(&(id, 0)))
            .copied()
            .unwrap_or(self.default_rgb)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_parse_colors() {
        let colors = BlockColors::parse("# c\nstone;7d7d7d\nmod:glow;ffffff\nbad\nworse;zz\n");
        assert_eq!(colors.len(), 2);
        assert_eq!(colors.rgb("minecraft:stone"), 0x7d7d7d);
        assert_eq!(colors.rgb("mod:glow"), 0xffffff);
        assert_eq!(colors.rgb("minecraft:unknown"), DEFAULT_RGB);
        assert_eq!(colors.with_default(0x123456).rgb("minecraft:unknown"), 0x123456);
    }

    #[test]
    fn test_legacy_index() {
        let mapping = LegacyMapping::parse("stone;1;0\ngranite;1;1\nwater;8\nwater;9\n");
        let colors = BlockColors::parse("stone;111111\ngranite;222222\nwater;3f76e4\n").with_legacy(&mapping);
        assert_eq!(colors.legacy_rgb(1, 0), 0x111111);
        assert_eq!(colors.legacy_rgb(1, 1), 0x222222);
        // unlisted data value falls back to data 0
        assert_eq!(colors.legacy_rgb(1, 7), 0x111111);
        assert_eq!(colors.legacy_rgb(9, 15), 0x3f76e4);
        assert_eq!(colors.legacy_rgb(200, 0), DEFAULT_RGB);
        assert_eq!(colors.water_rgb(), 0x3f76e4);
    }

    #[test]
    fn test_bundled_covers_bundled_mapping() {
        let mapping = LegacyMapping::bundled();
        let colors = BlockColors::bundled();
        let missing: Vec<_> = mapping.entries().map(|(n, _)| n).filter(|n| !colors.contains(n)).collect();
        assert!(missing.is_empty(), "no color for {:?}", missing);
    }

    #[test]
    fn test_non_utf8_line_skipped() {
        let bytes: &[u8] = b"stone;7d7d7d\n\xc0glass;ffffff\nsand;dbd3a0\n";
        let colors = BlockColors::from_reader(bytes).unwrap();
        assert_eq!(colors.len(), 2);
        assert_eq!(colors.rgb("minecraft:sand"), 0xdbd3a0);

        let path = std::env::temp_dir().join(format!("chunkview-colors-{}.txt", std::process::id()));
        std::fs::write(&path, bytes).unwrap();
        let loaded = BlockColors::load(&path);
        std::fs::remove_file(&path).unwrap();
        assert_eq!(loaded.unwrap(), colors);
    }

    #[test]
    fn test_missing_file() {
        assert_matches!(
            BlockColors::load("/nonexistent/block_colors.txt"),
            Err(ChunkviewError::MappingError(_))
        );
    }
}
