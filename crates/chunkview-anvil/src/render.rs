//! Per-column compositing shared by both decoders.

use chunkview_common::types::opaque;
use chunkview_common::RenderTarget;

/// What the scan found at one position of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Surface {
    /// Water or a bubble column.
    Water,
    /// A solid block sharing its space with water.
    Waterlogged,
    Solid,
}

/// Tracks one column while it is scanned from the top down.
#[derive(Debug)]
pub struct ColumnPainter {
    index: usize,
    water: bool,
    under_water: bool,
}

impl ColumnPainter {
    pub fn new(index: usize, water: bool) -> Self {
        ColumnPainter {
            index,
            water,
            under_water: false,
        }
    }

    /// Records a non-empty block at `height`. Returns `true` once the column
    /// is finished.
    pub fn paint(
        &mut self,
        target: &mut RenderTarget<'_>,
        surface: Surface,
        rgb: u32,
        water_rgb: u32,
        height: i32,
    ) -> bool {
        let i = self.index;
        let height = height as i16;

        if !self.water {
            target.colors[i] = opaque(rgb);
            target.terrain_heights[i] = height;
            return true;
        }

        if !self.under_water {
            target.colors[i] = opaque(rgb);
            target.water_heights[i] = height;
        }

        match surface {
            Surface::Water => {
                self.under_water = true;
                false
            }
            Surface::Waterlogged => {
                target.colors[i] = opaque(water_rgb);
                target.water_colors[i] = opaque(rgb);
                target.water_heights[i] = height;
                // one below so shading sees a water column
                target.terrain_heights[i] = height - 1;
                true
            }
            Surface::Solid => {
                target.water_colors[i] = opaque(rgb);
                target.terrain_heights[i] = height;
                true
            }
        }
    }
}
