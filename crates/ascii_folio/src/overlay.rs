//! Glyph-texture overlay for finished raster images.
//!
//! Each `pixel_size` block takes the colour at its centre, picks one of nine
//! glyphs by luminance and shades the block through that glyph's 5x7 density
//! mask. The result is a mix of the original and the masked colour.

use serde::{Deserialize, Serialize};

use crate::ascii::quantize::luminance;
use crate::image_pipeline::frame::RasterFrame;

/// Glyphs of the overlay ramp, darkest first.
pub const OVERLAY_GLYPHS: usize = 9;

const MASK_COLUMNS: f32 = 5.0;
const MASK_ROWS: f32 = 7.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Off unless explicitly enabled.
    pub enabled: bool,
    /// Side of one glyph block in pixels.
    pub pixel_size: u32,
    /// Weight of the glyph-shaded colour; `0.0` keeps the source untouched.
    pub mix: f32,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self { enabled: false, pixel_size: 10, mix: 0.7 }
    }
}

fn near(value: f32, target: f32) -> bool {
    (value - target).abs() < 0.5
}

fn flag(on: bool) -> f32 {
    if on {
        1.0
    } else {
        0.0
    }
}

/// Coverage of glyph `index` at mask cell `(x, y)` of the 5x7 grid.
///
/// Values above 1 are possible where strokes cross.
pub fn glyph_density(index: usize, x: f32, y: f32) -> f32 {
    match index {
        // @
        0 => {
            let distance = (x - 2.0).hypot(y - 3.0);
            flag(distance < 2.5) - flag(distance < 1.5)
        },
        // %
        1 => flag((x - y).abs() < 1.0) + flag((x - (6.0 - y)).abs() < 1.0),
        // #
        2 => {
            let vertical = flag(x == 1.0 || x == 3.0);
            let horizontal = flag((1.0..=5.0).contains(&y));
            vertical.max(horizontal * 0.3)
        },
        // *
        3 => {
            let cross = flag(near(x, 2.0) || near(y, 3.0));
            let diagonal = flag(near(x - y, -1.0) || near(x + y, 5.0));
            cross.max(diagonal)
        },
        // +
        4 => {
            let vertical = flag(near(x, 2.0) && (1.0..=5.0).contains(&y));
            let horizontal = flag(near(y, 3.0) && (0.0..=4.0).contains(&x));
            vertical.max(horizontal)
        },
        // =
        5 => flag((near(y, 2.0) || near(y, 4.0)) && (0.0..=4.0).contains(&x)),
        // :
        6 => flag((near(y, 2.0) || near(y, 4.0)) && near(x, 2.0)),
        // -
        7 => flag(near(y, 3.0) && (1.0..=3.0).contains(&x)),
        // .
        8 => flag(near(x, 2.0) && near(y, 4.0)),
        _ => 0.0,
    }
}

/// Overlay glyph for a luminance in `[0, 1]`: 0 is `@`, 8 is `.`.
pub fn overlay_index(luminance: f64) -> usize {
    let index = (luminance * (OVERLAY_GLYPHS - 1) as f64) as i64;
    index.clamp(0, OVERLAY_GLYPHS as i64 - 1) as usize
}

/// Applies the overlay to a copy of `frame`. Returns the frame unchanged when
/// the overlay is disabled or the block size is zero.
pub fn composite(frame: &RasterFrame, config: &OverlayConfig) -> RasterFrame {
    if !config.enabled || config.pixel_size == 0 || frame.is_empty() {
        return frame.clone();
    }

    let (width, height) = frame.dimensions();
    let size = config.pixel_size;
    let mix = config.mix.clamp(0.0, 1.0);
    let mut out = RasterFrame::new(width, height);

    for y in 0..height {
        let cell_y = y / size * size;
        let sample_y = (cell_y + size / 2).min(height - 1);
        let mask_y = ((y - cell_y) as f32 / size as f32 * MASK_ROWS).floor();

        for x in 0..width {
            let cell_x = x / size * size;
            let sample_x = (cell_x + size / 2).min(width - 1);
            let mask_x = ((x - cell_x) as f32 / size as f32 * MASK_COLUMNS).floor();

            let [r, g, b, a] = frame.pixel(sample_x, sample_y);
            let index = overlay_index(luminance(r, g, b));
            let density = glyph_density(index, mask_x, mask_y);

            // mix(c, c * d, m) == c * (1 - m + m * d)
            let scale = 1.0 - mix + mix * density;
            let shade = |channel: u8| (f32::from(channel) * scale).round().clamp(0.0, 255.0) as u8;
            out.as_image_mut().put_pixel(x, y, image::Rgba([shade(r), shade(g), shade(b), a]));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> RasterFrame {
        let data = rgba.iter().copied().cycle().take((width * height * 4) as usize).collect();
        RasterFrame::from_raw(width, height, data).unwrap()
    }

    #[test]
    fn disabled_overlay_is_identity() {
        let frame = solid(12, 12, [10, 200, 30, 255]);
        assert_eq!(composite(&frame, &OverlayConfig::default()), frame);
    }

    #[test]
    fn index_follows_luminance() {
        assert_eq!(overlay_index(0.0), 0);
        assert_eq!(overlay_index(0.5), 4);
        assert_eq!(overlay_index(1.0), 8);
        assert_eq!(overlay_index(2.0), 8);
    }

    #[test]
    fn glyph_masks() {
        // Ring of '@' skips its centre.
        assert_eq!(glyph_density(0, 2.0, 3.0), 0.0);
        assert_eq!(glyph_density(0, 2.0, 1.0), 1.0);
        // '.' is a single dot low in the cell.
        assert_eq!(glyph_density(8, 2.0, 4.0), 1.0);
        assert_eq!(glyph_density(8, 2.0, 3.0), 0.0);
        assert_eq!(glyph_density(42, 0.0, 0.0), 0.0);
    }

    #[test]
    fn white_blocks_keep_only_the_dot() {
        let frame = solid(10, 14, [255, 255, 255, 255]);
        let config = OverlayConfig { enabled: true, pixel_size: 10, mix: 0.7 };
        let out = composite(&frame, &config);

        // Mask cell (2, 4) of the first block covers x 4..6, y 5.7..7.1.
        assert_eq!(out.pixel(4, 6), [255, 255, 255, 255]);
        // Everywhere else keeps 30% of the source.
        let [r, g, b, a] = out.pixel(0, 0);
        assert!((76..=77).contains(&r), "{r}");
        assert_eq!((r, a), (g, 255));
        assert_eq!(g, b);
    }
}
