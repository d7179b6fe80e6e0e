//! Caller-owned pixel buffers the renderer writes into.

/// Owning storage for one tile: terrain color, color under water, terrain
/// height and water height, all `width * height` long and indexed
/// `row * width + col`.
#[derive(Debug, Clone, PartialEq)]
pub struct TileBuffers {
    width: usize,
    pub colors: Vec<u32>,
    pub water_colors: Vec<u32>,
    pub terrain_heights: Vec<i16>,
    pub water_heights: Vec<i16>,
}

impl TileBuffers {
    pub fn new(width: usize, height: usize) -> Self {
        let len = width * height;
        TileBuffers {
            width,
            colors: vec![0; len],
            water_colors: vec![0; len],
            terrain_heights: vec![0; len],
            water_heights: vec![0; len],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn target(&mut self) -> RenderTarget<'_> {
        RenderTarget {
            width: self.width,
            colors: &mut self.colors,
            water_colors: &mut self.water_colors,
            terrain_heights: &mut self.terrain_heights,
            water_heights: &mut self.water_heights,
        }
    }
}

/// Borrowed view over four equally sized buffers.
#[derive(Debug)]
pub struct RenderTarget<'a> {
    width: usize,
    pub colors: &'a mut [u32],
    pub water_colors: &'a mut [u32],
    pub terrain_heights: &'a mut [i16],
    pub water_heights: &'a mut [i16],
}

impl<'a> RenderTarget<'a> {
    /// Returns `None` unless all four slices share one length that is a
    /// multiple of `width`.
    pub fn new(
        width: usize,
        colors: &'a mut [u32],
        water_colors: &'a mut [u32],
        terrain_heights: &'a mut [i16],
        water_heights: &'a mut [i16],
    ) -> Option<Self> {
        let len = colors.len();
        if width == 0
            || len % width != 0
            || water_colors.len() != len
            || terrain_heights.len() != len
            || water_heights.len() != len
        {
            return None;
        }
        Some(RenderTarget {
            width,
            colors,
            water_colors,
            terrain_heights,
            water_heights,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.colors.len() / self.width
    }

    /// Buffer index of pixel `(col, row)`, if inside the tile.
    #[inline]
    pub fn index(&self, col: usize, row: usize) -> Option<usize> {
        (col < self.width && row < self.height()).then(|| row * self.width + col)
    }
}
