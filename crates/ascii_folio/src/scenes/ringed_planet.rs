use std::f32::consts::PI;

use crate::sketch::{Canvas, Color, Point, Sketch};

const ROTATION_STEP: f32 = 0.02;
const RING_TILT: f32 = 0.3;
const RING_SQUASH: f32 = 0.3;
const RING_COUNT: usize = 8;
const ARC_STEP: f32 = 0.1;
const CHORD_SEGMENTS: usize = 12;

/// Relative band offset, relative height and colour.
const BANDS: [(f32, f32, Color); 8] = [
    (-0.7, 0.1, Color::rgb(100, 70, 50)),
    (-0.5, 0.15, Color::rgb(140, 100, 70)),
    (-0.3, 0.12, Color::rgb(160, 120, 80)),
    (-0.1, 0.08, Color::rgb(180, 140, 100)),
    (0.05, 0.1, Color::rgb(150, 110, 75)),
    (0.2, 0.12, Color::rgb(170, 130, 90)),
    (0.4, 0.15, Color::rgb(140, 100, 70)),
    (0.65, 0.1, Color::rgb(120, 85, 60)),
];

/// Vector-drawn banded planet with a tilted ring, split into the half drawn
/// behind the disc and the half drawn over it.
#[derive(Clone, Debug, Default)]
pub struct RingedPlanet;

impl RingedPlanet {
    /// Canvas width fitting the ring for a given height.
    pub fn canvas_width(height: u32) -> u32 {
        (height as f32 * 1.6).round() as u32
    }
}

/// Outline of the horizontal slab `[top, bottom]` clipped to a disc of
/// `radius` centred on the origin.
fn clipped_band(radius: f32, top: f32, bottom: f32) -> Vec<Point> {
    let top = top.max(-radius);
    let bottom = bottom.min(radius);
    if top >= bottom {
        return Vec::new();
    }

    let half_width = |y: f32| (radius * radius - y * y).max(0.0).sqrt();
    let step = (bottom - top) / CHORD_SEGMENTS as f32;
    let ys: Vec<f32> = (0..=CHORD_SEGMENTS).map(|k| top + step * k as f32).collect();

    let right = ys.iter().map(|&y| (half_width(y), y));
    let left = ys.iter().rev().map(|&y| (-half_width(y), y));
    right.chain(left).collect()
}

fn draw_body(canvas: &mut dyn Canvas, radius: f32, rotation: f32) {
    canvas.set_stroke(None);
    canvas.set_fill(Some(Color::rgb(180, 140, 100)));
    canvas.ellipse((0.0, 0.0), radius * 2.0, radius * 2.0);

    for (offset, height, color) in BANDS {
        let center = offset * radius;
        let half = height * radius / 2.0;
        canvas.set_fill(Some(color));
        canvas.polygon(&clipped_band(radius, center - half, center + half));
    }

    let spot_x = (rotation * 0.5).sin() * radius * 0.3;
    let spot_size = radius * 0.2;
    canvas.set_fill(Some(Color::rgb(180, 80, 60)));
    canvas.ellipse((spot_x, radius * 0.1), spot_size, spot_size * 0.6);

    canvas.set_fill(Some(Color::rgba(255, 255, 255, 30)));
    canvas.ellipse((-radius * 0.3, -radius * 0.3), radius * 0.4, radius * 0.4);
}

/// Angles from `start` towards `end` in fixed steps, never past `end`.
fn ring_arc(start: f32, end: f32) -> impl Iterator<Item = f32> {
    let steps = ((end - start) / ARC_STEP).floor() as usize;
    (0..=steps).map(move |k| start + ARC_STEP * k as f32)
}

fn draw_ring(canvas: &mut dyn Canvas, planet_radius: f32, rotation: f32, back: bool) {
    let inner = planet_radius * 1.4;
    let outer = planet_radius * 2.2;
    let thickness = (outer - inner) / RING_COUNT as f32 * 0.8;
    let (start, end) = if back { (0.0, PI) } else { (PI, 2.0 * PI) };

    canvas.push();
    canvas.rotate(RING_TILT);
    canvas.set_stroke(None);

    for i in 0..RING_COUNT {
        if back != (i >= RING_COUNT / 2) {
            continue;
        }

        let t = i as f32 / (RING_COUNT - 1) as f32;
        let radius = inner + t * (outer - inner);
        let brightness = 150.0 + (rotation + i as f32).sin() * 50.0;
        canvas.set_fill(Some(Color::rgba(
            brightness as u8,
            (brightness * 0.9) as u8,
            (brightness * 0.7) as u8,
            200,
        )));

        let angles: Vec<f32> = ring_arc(start, end).collect();
        let outer_edge = angles.iter().map(|&a| (a.cos() * radius, a.sin() * radius * RING_SQUASH));
        let inner_radius = radius - thickness;
        let inner_edge = angles
            .iter()
            .rev()
            .map(|&a| (a.cos() * inner_radius, a.sin() * inner_radius * RING_SQUASH));
        let outline: Vec<Point> = outer_edge.chain(inner_edge).collect();
        canvas.polygon(&outline);
    }

    canvas.pop();
}

impl Sketch for RingedPlanet {
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64) {
        let rotation = frame as f32 * ROTATION_STEP;
        let radius = canvas.width().min(canvas.height()) * 0.35;

        canvas.background(Color::BLACK);
        canvas.translate(canvas.width() / 2.0, canvas.height() / 2.0);

        draw_ring(canvas, radius, rotation, true);
        draw_body(canvas, radius, rotation);
        draw_ring(canvas, radius, rotation, false);
    }
}
