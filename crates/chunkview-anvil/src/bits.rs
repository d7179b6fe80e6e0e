//! Palette index packing for block-state long arrays.

use chunkview_common::chunk::SECTION_VOLUME;

/// Smallest width the game ever writes.
pub const MIN_BITS: u32 = 4;
/// Widths past this cannot index a real palette.
pub const MAX_BITS: u32 = 32;

/// How fixed-width fields are laid out across 64-bit words.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackingLayout {
    /// Fields are packed back to back and may straddle two words.
    Spanning,
    /// Each word holds `64 / width` whole fields; leftover high bits are padding.
    Padded,
}

impl PackingLayout {
    pub fn for_version(data_version: i32) -> Self {
        if data_version >= crate::level::PADDED_STATES_VERSION {
            PackingLayout::Padded
        } else {
            PackingLayout::Spanning
        }
    }
}

#[inline]
fn valid_width(width: u32) -> bool {
    (1..=MAX_BITS).contains(&width)
}

/// Bits needed to index a palette of `len` entries, never below [`MIN_BITS`].
pub fn bits_for_palette(len: usize) -> u32 {
    let needed = usize::BITS - len.saturating_sub(1).leading_zeros();
    needed.max(MIN_BITS)
}

/// Field width implied by the length of a spanning array: `words * 64 / 4096`.
pub fn spanning_width(words: usize) -> Option<u32> {
    let bits = words * 64;
    if bits % SECTION_VOLUME != 0 {
        return None;
    }
    let width = u32::try_from(bits / SECTION_VOLUME).ok()?;
    valid_width(width).then_some(width)
}

#[inline]
fn mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Reads field `index` from a spanning array. A field crossing a word boundary
/// takes its low bits from the top of word `n` and its high bits from the bottom
/// of word `n + 1`. Returns `None` rather than reading past the array, and for
/// widths outside `1..=MAX_BITS`.
pub fn extract_spanning(words: &[i64], width: u32, index: usize) -> Option<u64> {
    if !valid_width(width) {
        return None;
    }
    let bit = index * width as usize;
    let word = bit / 64;
    let start = (bit % 64) as u32;
    let current = *words.get(word)? as u64;

    if start + width > 64 {
        let next = *words.get(word + 1)? as u64;
        let high = next & mask(start + width - 64);
        Some((current >> start) | (high << (64 - start)))
    } else {
        Some((current >> start) & mask(width))
    }
}

pub fn extract_padded(words: &[i64], width: u32, index: usize) -> Option<u64> {
    if !valid_width(width) {
        return None;
    }
    let per_word = (64 / width) as usize;
    let word = *words.get(index / per_word)? as u64;
    let start = (index % per_word) as u32 * width;
    Some((word >> start) & mask(width))
}

/// Packs `values` at `width` bits each. Values wider than `width` are truncated.
/// `None` for widths outside `1..=MAX_BITS`.
pub fn pack(values: &[usize], width: u32, layout: PackingLayout) -> Option<Vec<i64>> {
    if !valid_width(width) {
        return None;
    }
    let w = width as usize;
    let words = match layout {
        PackingLayout::Spanning => {
            let mut words = vec![0u64; (values.len() * w).div_ceil(64)];
            for (i, &value) in values.iter().enumerate() {
                let value = value as u64 & mask(width);
                let bit = i * w;
                let (word, start) = (bit / 64, bit % 64);
                words[word] |= value << start;
                if start + w > 64 {
                    words[word + 1] |= value >> (64 - start);
                }
            }
            words
        }
        PackingLayout::Padded => {
            let per_word = 64 / w;
            let mut words = vec![0u64; values.len().div_ceil(per_word)];
            for (i, &value) in values.iter().enumerate() {
                words[i / per_word] |= (value as u64 & mask(width)) << ((i % per_word) * w);
            }
            words
        }
    };
    Some(words.into_iter().map(|word| word as i64).collect())
}

/// Read view over one section's packed palette indices.
#[derive(Debug, Clone, Copy)]
pub struct PackedIndices<'a> {
    words: &'a [i64],
    width: u32,
    layout: PackingLayout,
}

impl<'a> PackedIndices<'a> {
    /// Returns `None` when the array cannot hold 4096 fields for this palette.
    pub fn new(words: &'a [i64], palette_len: usize, layout: PackingLayout) -> Option<Self> {
        let width = match layout {
            PackingLayout::Spanning => spanning_width(words.len())?,
            PackingLayout::Padded => {
                let width = bits_for_palette(palette_len);
                if !valid_width(width) {
                    return None;
                }
                let per_word = (64 / width) as usize;
                if words.len() < SECTION_VOLUME.div_ceil(per_word) {
                    return None;
                }
                width
            }
        };
        Some(PackedIndices {
            words,
            width,
            layout,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    #[inline]
    pub fn get(&self, index: usize) -> Option<usize> {
        let value = match self.layout {
            PackingLayout::Spanning => extract_spanning(self.words, self.width, index)?,
            PackingLayout::Padded => extract_padded(self.words, self.width, index)?,
        };
        usize::try_from(value).ok()
    }

    pub fn iter(&self) -> impl Iterator<Item = Option<usize>> + '_ {
        (0..SECTION_VOLUME).map(move |i| self.get(i))
    }
}
