use serde::{Deserialize, Serialize};

use super::ramp::GlyphRamp;

/// How luminance maps onto the ramp.
///
/// `Normal` sends dark pixels to the dense end (`@`), which suits light
/// backgrounds. `Inverted` sends dark pixels to the light end so bright
/// strokes on a black canvas come out dense.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    #[default]
    Normal,
    Inverted,
}

/// Perceptual luminance of an RGB triple, normalized to `[0, 1]`.
pub fn luminance(r: u8, g: u8, b: u8) -> f64 {
    (0.299 * f64::from(r) + 0.587 * f64::from(g) + 0.114 * f64::from(b)) / 255.0
}

/// Maps a normalized luminance to a ramp index in `[0, levels - 1]`.
///
/// The clamp runs after inversion, so `1.0`, small negative averages and NaN
/// all stay in range.
pub fn quantize(luminance: f64, levels: usize, orientation: Orientation) -> usize {
    if levels <= 1 {
        return 0;
    }

    let max_index = (levels - 1) as i64;
    // NaN casts to 0.
    let mut index = (luminance * max_index as f64).floor() as i64;
    if orientation == Orientation::Inverted {
        index = max_index - index;
    }

    index.clamp(0, max_index) as usize
}

/// Quantizes luminance straight to a glyph.
pub fn glyph_for(luminance: f64, ramp: &GlyphRamp, orientation: Orientation) -> char {
    ramp.char_at(quantize(luminance, ramp.len(), orientation))
}
