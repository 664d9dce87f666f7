//! Procedural planet art computed directly in glyph space.
//!
//! Unlike the canvas scenes these never touch a raster: each frame is a pure
//! function of the rotation counter, built from a latitude band table and an
//! optional tilted ring.

use super::grid::{CellGlyph, CharacterGrid, Rgb};
use super::ramp::GlyphRamp;
use crate::image_pipeline::loader::ProduceError;
use crate::render::source::GridSource;

/// Rotation counter wraps after this many frames.
pub const ROTATION_PERIOD: u64 = 250;

pub const RING_COLOR: Rgb = [0xD4, 0xA5, 0x74];

struct Band {
    y: usize,
    height: usize,
    ch: char,
    color: Rgb,
}

const fn band(y: usize, height: usize, ch: char, color: u32) -> Band {
    Band { y, height, ch, color: [(color >> 16) as u8, (color >> 8) as u8, color as u8] }
}

const BANDS: [Band; 12] = [
    band(0, 2, ' ', 0x000000),
    band(2, 1, '.', 0x4a3828),
    band(3, 2, ':', 0x6b4c35),
    band(5, 1, '-', 0x8b5d3d),
    band(6, 2, '=', 0xa67b52),
    band(8, 2, ':', 0xc9946b),
    band(10, 3, '=', 0xc88a60),
    band(13, 2, '#', 0xb87852),
    band(15, 2, ':', 0xa67b52),
    band(17, 2, '-', 0x6b4c35),
    band(19, 1, '.', 0x4a3828),
    band(20, 2, ' ', 0x000000),
];

/// Rows carrying the great red spot.
const SPOT_ROWS: std::ops::RangeInclusive<usize> = 13..=14;

fn band_at(y: usize) -> Option<&'static Band> {
    BANDS.iter().find(|band| y >= band.y && y < band.y + band.height)
}

/// Column of the red spot's centre for a grid `width` wide.
fn spot_center(rotation: u64, width: usize) -> f64 {
    let width = width as f64;
    let spot_x = ((rotation as f64 / 10.0) % width).floor();
    ((spot_x + width / 2.0) % width).floor()
}

/// Band glyph at `(x, y)` with the spot and stripe texture applied.
fn surface_glyph(band: &Band, x: usize, y: usize, rotation: u64, spot: f64) -> char {
    let mut ch = band.ch;

    if SPOT_ROWS.contains(&y) {
        let distance = (x as f64 - spot).abs();
        if distance < 4.0 {
            ch = '@';
        } else if distance < 5.0 {
            ch = '#';
        } else if distance < 6.0 {
            ch = '*';
        }
    }

    match ((x as u64 + rotation) % 3, ch) {
        (0, '=') => '-',
        (1, ':') => '.',
        (_, ch) => ch,
    }
}

fn surface_cell(ch: char, color: Rgb) -> CellGlyph {
    if ch == ' ' {
        CellGlyph::new(ch)
    } else {
        CellGlyph::colored(ch, color)
    }
}

/// Banded sphere, 25 columns by 18 rows.
pub fn jupiter(rotation: u64) -> CharacterGrid {
    const WIDTH: usize = 25;
    const HEIGHT: usize = 18;

    let spot = spot_center(rotation, WIDTH);
    let center_y = HEIGHT as f64 / 2.0;
    let mut cells = Vec::with_capacity(WIDTH * HEIGHT);

    for y in 0..HEIGHT {
        let normalized_y = (y as f64 - center_y) / center_y;
        let radius = (1.0 - normalized_y * normalized_y).sqrt();
        let row_width = (WIDTH as f64 * radius).floor() as usize;
        let left = (WIDTH - row_width) / 2;

        for x in 0..WIDTH {
            if x < left || x >= left + row_width {
                cells.push(CellGlyph::new(' '));
                continue;
            }

            match band_at(y) {
                Some(band) => {
                    let ch = surface_glyph(band, x, y, rotation, spot);
                    cells.push(surface_cell(ch, band.color));
                },
                None => cells.push(CellGlyph::new(' ')),
            }
        }
    }

    CharacterGrid::new(WIDTH, HEIGHT, cells)
}

/// Banded sphere with a tilted ring passing behind and in front of it,
/// 35 columns by 28 rows.
pub fn ringed_jupiter(rotation: u64) -> CharacterGrid {
    const WIDTH: usize = 35;
    const HEIGHT: usize = 28;
    const RING_TILT: f64 = 0.3;
    const RING_INNER: f64 = 10.0;
    const RING_OUTER: f64 = 17.0;
    const PLANET_WIDTH: f64 = 22.0;

    let ramp = GlyphRamp::ring();
    let ring_levels = ramp.len() as f64 - 1.0;
    let spot = spot_center(rotation, WIDTH);
    let mid_x = WIDTH as f64 / 2.0;
    let center_y = HEIGHT as f64 / 2.0;
    let mut cells = Vec::with_capacity(WIDTH * HEIGHT);

    let ring_glyph = |x: usize| -> Option<char> {
        let distance = (x as f64 - mid_x).abs();
        if distance < RING_INNER {
            return None;
        }
        let index = (distance / RING_OUTER * ring_levels).floor();
        let wave = ((x as f64 + rotation as f64) * 0.2).sin() * 2.0;
        let index = (index + wave).floor().clamp(0.0, ring_levels) as usize;
        Some(ramp.char_at(index))
    };

    for y in 0..HEIGHT {
        let ring_y = (y as f64 - center_y) / center_y / RING_TILT;
        let ring_span = (ring_y.abs() <= 1.0).then(|| {
            let half = (1.0 - ring_y * ring_y).sqrt() * RING_OUTER;
            ((mid_x - half).floor(), (mid_x + half).ceil())
        });

        // The sphere sits one row above centre and spans two rows less.
        let planet_y = (y as f64 - (center_y - 1.0)) / (center_y - 2.0);
        let planet_span = (planet_y.abs() <= 1.0).then(|| {
            let width = (PLANET_WIDTH * (1.0 - planet_y * planet_y).sqrt()).floor();
            let left = ((WIDTH as f64 - width) / 2.0).floor();
            (left, left + width)
        });

        for x in 0..WIDTH {
            let fx = x as f64;
            let in_ring = ring_span.is_some_and(|(left, right)| fx >= left && fx <= right);
            let mut cell = CellGlyph::new(' ');

            let behind = planet_span.is_some_and(|(left, right)| fx < left || fx > right);
            if in_ring && behind {
                if let Some(ch) = ring_glyph(x) {
                    cell = CellGlyph::colored(ch, RING_COLOR);
                }
            }

            if let Some((left, right)) = planet_span {
                if fx >= left && fx <= right {
                    if let Some(band) = band_at(y) {
                        let ch = surface_glyph(band, x, y, rotation, spot);
                        cell = surface_cell(ch, band.color);
                    }
                }
            }

            let in_front = planet_span.is_some_and(|(left, right)| fx > left && fx < right);
            if in_ring && in_front {
                if let Some(ch) = ring_glyph(x) {
                    cell = CellGlyph::colored(ch, RING_COLOR);
                }
            }

            cells.push(cell);
        }
    }

    CharacterGrid::new(WIDTH, HEIGHT, cells)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PlanetStyle {
    #[default]
    Plain,
    Ringed,
}

/// Grid source advancing the rotation counter once per tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct PlanetSource {
    pub style: PlanetStyle,
}

impl PlanetSource {
    pub fn new(style: PlanetStyle) -> Self {
        Self { style }
    }

    pub fn frame(&self, rotation: u64) -> CharacterGrid {
        match self.style {
            PlanetStyle::Plain => jupiter(rotation),
            PlanetStyle::Ringed => ringed_jupiter(rotation),
        }
    }
}

impl GridSource for PlanetSource {
    fn next_grid(&mut self, tick: u64) -> Result<CharacterGrid, ProduceError> {
        Ok(self.frame(tick % ROTATION_PERIOD))
    }
}
