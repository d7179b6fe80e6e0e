//! Name to legacy `(id, data)` table for pre-flattening chunks.

use chunkview_common::{ChunkviewError, Result};
use chunkview_logger::{log, LogSeverity::Warning};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

const BUNDLED: &str = include_str!("../resources/block_name_to_id.txt");

pub const NAMESPACE: &str = "minecraft:";

/// Hands every line of `reader` to `each`. A line that is not valid UTF-8 is
/// logged and skipped; only read failures are returned.
pub(crate) fn for_each_line<R: BufRead>(
    reader: R,
    source: &str,
    mut each: impl FnMut(&str),
) -> io::Result<()> {
    for (number, line) in reader.split(b'\n').enumerate() {
        let line = line?;
        match std::str::from_utf8(&line) {
            Ok(text) => each(text),
            Err(e) => log(
                format!("skipping line {} of {}: {}", number + 1, source, e),
                Warning,
            ),
        }
    }
    Ok(())
}

/// Prefixes `minecraft:` unless the name already carries a namespace.
pub fn qualify(name: &str) -> String {
    if name.contains(':') {
        name.to_owned()
    } else {
        format!("{}{}", NAMESPACE, name)
    }
}

/// A legacy block id together with the 4-bit data values it accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockData {
    pub id: u8,
    /// Bit `n` set means data value `n` belongs to this entry.
    data_mask: u16,
}

impl BlockData {
    pub fn new(id: u8, data_values: impl IntoIterator<Item = u8>) -> Self {
        let data_mask = data_values
            .into_iter()
            .filter(|&d| d < 16)
            .fold(0u16, |mask, d| mask | 1 << d);
        BlockData { id, data_mask }
    }

    /// Entry accepting all sixteen data values.
    pub fn any_data(id: u8) -> Self {
        BlockData {
            id,
            data_mask: u16::MAX,
        }
    }

    #[inline]
    pub fn contains_data(&self, data: u8) -> bool {
        data < 16 && self.data_mask & (1 << data) != 0
    }

    #[inline]
    pub fn matches(&self, id: u8, data: u8) -> bool {
        self.id == id && self.contains_data(data)
    }

    /// Lowest accepted data value; used when writing this entry into a chunk.
    pub fn first_data(&self) -> u8 {
        self.data_mask.trailing_zeros().min(15) as u8
    }

    pub fn data_values(&self) -> impl Iterator<Item = u8> + '_ {
        (0..16u8).filter(move |&d| self.contains_data(d))
    }
}

/// Read-only table built once at startup and shared by reference.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegacyMapping {
    blocks: HashMap<String, Vec<BlockData>>,
}

impl LegacyMapping {
    /// Loads the table from a file. Failing to open or read the file is
    /// fatal; malformed lines are logged and skipped.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| {
            ChunkviewError::MappingError(format!("failed to open {}: {}", path.display(), e))
        })?;
        Self::from_reader(BufReader::new(file))
    }

    pub fn from_reader<R: BufRead>(reader: R) -> Result<Self> {
        let mut mapping = LegacyMapping::default();
        for_each_line(reader, "block id mapping file", |line| mapping.add_line(line))?;
        Ok(mapping)
    }

    pub fn parse(text: &str) -> Self {
        let mut mapping = LegacyMapping::default();
        text.lines().for_each(|line| mapping.add_line(line));
        mapping
    }

    /// Table compiled into the binary.
    pub fn bundled() -> Self {
        Self::parse(BUNDLED)
    }

    fn add_line(&mut self, line: &str) {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return;
        }
        match parse_line(line) {
            Ok((names, block_data)) => {
                for name in names {
                    self.blocks.entry(qualify(name)).or_default().push(block_data);
                }
            }
            Err(reason) => log(
                format!("invalid line in block id mapping file: \"{}\" ({})", line, reason),
                Warning,
            ),
        }
    }

    /// Every entry for a fully-qualified name, or `None` if the name is unknown.
    pub fn lookup(&self, name: &str) -> Option<&[BlockData]> {
        self.blocks.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.blocks.contains_key(name)
    }

    pub fn entries(&self) -> impl Iterator<Item = (&str, &[BlockData])> {
        self.blocks.iter().map(|(name, data)| (name.as_str(), data.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

fn parse_line(line: &str) -> std::result::Result<(Vec<&str>, BlockData), String> {
    let mut fields: Vec<&str> = line.split(';').collect();
    // a trailing ';' only terminates the line
    while fields.len() > 1 && fields.last().is_some_and(|f| f.trim().is_empty()) {
        fields.pop();
    }
    if fields.len() != 2 && fields.len() != 3 {
        return Err(format!("expected 2 or 3 fields, found {}", fields.len()));
    }

    let names: Vec<&str> = fields[0]
        .split(',')
        .map(str::trim)
        .filter(|n| !n.is_empty())
        .collect();
    if names.is_empty() {
        return Err("no block name".to_owned());
    }

    let id = fields[1]
        .trim()
        .parse::<u8>()
        .map_err(|e| format!("bad block id: {}", e))?;

    let block_data = match fields.get(2) {
        None => BlockData::any_data(id),
        Some(raw) => {
            let mut values = Vec::new();
            for value in raw.split(',').map(str::trim).filter(|v| !v.is_empty()) {
                let data = value
                    .parse::<u8>()
                    .map_err(|e| format!("bad data value: {}", e))?;
                if data > 15 {
                    return Err(format!("data value {} out of range", data));
                }
                values.push(data);
            }
            if values.is_empty() {
                BlockData::any_data(id)
            } else {
                BlockData::new(id, values)
            }
        }
    };

    Ok((names, block_data))
}
