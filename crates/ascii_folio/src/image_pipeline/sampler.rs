use serde::{Deserialize, Serialize};

use super::frame::RasterFrame;
use super::resize;
use crate::ascii::grid::{CellGlyph, CharacterGrid};
use crate::ascii::quantize::{self, Orientation};
use crate::ascii::ramp::GlyphRamp;
use crate::AsciiError;

/// Alpha threshold used by the masked avatar and icon renderers.
pub const DEFAULT_ALPHA_THRESHOLD: u8 = 128;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AlphaPolicy {
    /// Every pixel counts, whatever its alpha.
    #[default]
    Ignore,
    /// Pixels with alpha below `threshold` are skipped. A cell left with no
    /// pixels renders as the lightest glyph with no colour.
    Mask { threshold: u8 },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    #[default]
    Monochrome,
    /// Keep the unaveraged RGB of the first contributing pixel in each cell.
    Source,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SamplerOptions {
    /// Cell width in pixels.
    pub cell_size: u32,
    /// Cells are `cell_size` wide and `2 * cell_size` tall.
    pub vertical_decimation: bool,
    pub orientation: Orientation,
    pub alpha: AlphaPolicy,
    pub color: ColorMode,
    /// Uniform pre-shrink in `(0, 1]` applied before sampling.
    pub downsample: f32,
}

impl Default for SamplerOptions {
    fn default() -> Self {
        Self {
            cell_size: 8,
            vertical_decimation: false,
            orientation: Orientation::Normal,
            alpha: AlphaPolicy::Ignore,
            color: ColorMode::Monochrome,
            downsample: 1.0,
        }
    }
}

/// Averages luminance over fixed-size cells and quantizes each cell.
#[derive(Clone, Debug)]
pub struct BlockSampler {
    ramp: GlyphRamp,
    options: SamplerOptions,
}

impl BlockSampler {
    pub fn new(ramp: GlyphRamp, options: SamplerOptions) -> Result<Self, AsciiError> {
        if options.cell_size == 0
            || (options.vertical_decimation && options.cell_size.checked_mul(2).is_none())
        {
            return Err(AsciiError::InvalidCellSize);
        }
        if !(options.downsample > 0.0 && options.downsample <= 1.0) {
            return Err(AsciiError::InvalidDownsample(options.downsample));
        }
        Ok(Self { ramp, options })
    }

    pub fn ramp(&self) -> &GlyphRamp {
        &self.ramp
    }

    pub fn options(&self) -> &SamplerOptions {
        &self.options
    }

    /// Cell width and height in pixels.
    pub fn cell_dimensions(&self) -> (u32, u32) {
        let width = self.options.cell_size;
        let height = if self.options.vertical_decimation { width.saturating_mul(2) } else { width };
        (width, height)
    }

    /// Columns and rows produced for a frame of the given size, before any
    /// downsampling.
    pub fn grid_dimensions(&self, width: u32, height: u32) -> (usize, usize) {
        let (cell_w, cell_h) = self.cell_dimensions();
        (width.div_ceil(cell_w) as usize, height.div_ceil(cell_h) as usize)
    }

    /// Samples one frame into a fresh grid. A zero-area frame yields an empty
    /// grid.
    pub fn sample(&self, frame: &RasterFrame) -> CharacterGrid {
        match resize::downsample(frame, self.options.downsample) {
            Some(small) => self.sample_blocks(&small),
            None => self.sample_blocks(frame),
        }
    }

    fn sample_blocks(&self, frame: &RasterFrame) -> CharacterGrid {
        if frame.is_empty() {
            return CharacterGrid::empty();
        }

        let (width, height) = frame.dimensions();
        let (cell_w, cell_h) = self.cell_dimensions();
        let (columns, rows) = self.grid_dimensions(width, height);
        let mut cells = Vec::with_capacity(columns * rows);

        for row in 0..rows as u32 {
            let start_y = row * cell_h;
            let end_y = start_y.saturating_add(cell_h).min(height);

            for column in 0..columns as u32 {
                let start_x = column * cell_w;
                let end_x = start_x.saturating_add(cell_w).min(width);
                cells.push(self.sample_cell(frame, start_x..end_x, start_y..end_y));
            }
        }

        CharacterGrid::new(columns, rows, cells)
    }

    fn sample_cell(
        &self,
        frame: &RasterFrame,
        xs: std::ops::Range<u32>,
        ys: std::ops::Range<u32>,
    ) -> CellGlyph {
        let mut total = 0.0f64;
        let mut count = 0u32;
        let mut representative = None;

        for y in ys {
            for x in xs.clone() {
                let [r, g, b, a] = frame.pixel(x, y);
                if let AlphaPolicy::Mask { threshold } = self.options.alpha {
                    if a < threshold {
                        continue;
                    }
                }

                total += quantize::luminance(r, g, b);
                count += 1;
                if representative.is_none() {
                    representative = Some([r, g, b]);
                }
            }
        }

        if count == 0 {
            return CellGlyph::new(self.ramp.lightest());
        }

        let average = total / f64::from(count);
        let ch = quantize::glyph_for(average, &self.ramp, self.options.orientation);
        match (self.options.color, representative) {
            (ColorMode::Source, Some(color)) => CellGlyph::colored(ch, color),
            _ => CellGlyph::new(ch),
        }
    }
}
