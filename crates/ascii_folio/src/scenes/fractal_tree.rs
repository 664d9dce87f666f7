use std::f32::consts::FRAC_PI_3;

use crate::sketch::{Canvas, Color, Sketch};

const TRUNK: f32 = 100.0;
const SHRINK: f32 = 0.67;
const MIN_BRANCH: f32 = 10.0;

/// Binary tree whose branch angle swings between 0 and 60 degrees.
#[derive(Clone, Debug, Default)]
pub struct FractalTree;

impl FractalTree {
    pub fn branch_angle(frame: u64) -> f32 {
        let swing = (frame as f32 * 0.02).sin();
        (swing + 1.0) / 2.0 * FRAC_PI_3
    }
}

fn branch(canvas: &mut dyn Canvas, len: f32, angle: f32) {
    canvas.line((0.0, 0.0), (0.0, -len));
    canvas.translate(0.0, -len);

    if len > MIN_BRANCH {
        for turn in [angle, -angle] {
            canvas.push();
            canvas.rotate(turn);
            branch(canvas, len * SHRINK, angle);
            canvas.pop();
        }
    }
}

impl Sketch for FractalTree {
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64) {
        canvas.background(Color::BLACK);
        canvas.translate(canvas.width() / 2.0, canvas.height());
        canvas.set_stroke(Some(Color::WHITE));
        canvas.set_stroke_weight(2.0);

        branch(canvas, TRUNK, Self::branch_angle(frame));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn branch_angle_stays_within_sixty_degrees() {
        for frame in 0..400 {
            let angle = FractalTree::branch_angle(frame);
            assert!((0.0..=FRAC_PI_3 + f32::EPSILON).contains(&angle), "{angle}");
        }
        assert!((FractalTree::branch_angle(0) - FRAC_PI_3 / 2.0).abs() < 1e-6);
    }
}
