use serde::{Deserialize, Serialize};

use crate::AsciiError;

/// Ordered glyph ramp, densest glyph first.
///
/// The order is fixed at construction. Whether dark pixels land on the dense
/// or the light end is decided by [`Orientation`](super::quantize::Orientation),
/// not by the ramp.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GlyphRamp {
    chars: Vec<char>,
}

impl GlyphRamp {
    pub fn new(chars: impl Into<String>) -> Result<Self, AsciiError> {
        let chars: Vec<char> = chars.into().chars().collect();
        if chars.is_empty() {
            return Err(AsciiError::EmptyRamp);
        }
        Ok(Self { chars })
    }

    /// `@%#*+=:-. `, the ramp used by every canvas animation.
    pub fn standard() -> Self {
        Self::from_static(&['@', '%', '#', '*', '+', '=', ':', '-', '.', ' '])
    }

    /// Nine glyphs without the trailing space, matching the overlay glyph masks.
    pub fn overlay() -> Self {
        Self::from_static(&['@', '%', '#', '*', '+', '=', ':', '-', '.'])
    }

    /// Planet ring ramp. Symmetric, so orientation does not matter.
    pub fn ring() -> Self {
        Self::from_static(&['-', '=', '~', '~', '=', '-'])
    }

    pub fn blocks() -> Self {
        Self::from_static(&['█', '▓', '▒', '░', ' '])
    }

    fn from_static(chars: &[char]) -> Self {
        Self { chars: chars.to_vec() }
    }

    pub fn len(&self) -> usize {
        self.chars.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chars.is_empty()
    }

    pub fn chars(&self) -> &[char] {
        &self.chars
    }

    pub fn char_at(&self, index: usize) -> char {
        self.chars[index.min(self.chars.len() - 1)]
    }

    /// Lowest-density glyph, used for empty and masked-out cells.
    pub fn lightest(&self) -> char {
        self.chars[self.chars.len() - 1]
    }

    pub fn densest(&self) -> char {
        self.chars[0]
    }
}

impl Default for GlyphRamp {
    fn default() -> Self {
        Self::standard()
    }
}

/// Named ramp presets, as they appear in config files and on the command line.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RampPreset {
    #[default]
    Standard,
    Overlay,
    Blocks,
}

impl RampPreset {
    pub fn to_ramp(self) -> GlyphRamp {
        match self {
            RampPreset::Standard => GlyphRamp::standard(),
            RampPreset::Overlay => GlyphRamp::overlay(),
            RampPreset::Blocks => GlyphRamp::blocks(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_ramp_is_rejected() {
        assert!(matches!(GlyphRamp::new(""), Err(AsciiError::EmptyRamp)));
    }

    #[test]
    fn single_glyph_ramp_is_allowed() {
        let ramp = GlyphRamp::new("#").unwrap();
        assert_eq!(ramp.densest(), '#');
        assert_eq!(ramp.lightest(), '#');
    }

    #[test]
    fn standard_ramp_runs_dense_to_light() {
        let ramp = GlyphRamp::standard();
        assert_eq!(ramp.len(), 10);
        assert_eq!(ramp.densest(), '@');
        assert_eq!(ramp.lightest(), ' ');
        assert_eq!(ramp.char_at(99), ' ');
    }
}
