use crate::sketch::{Canvas, Color, Sketch};

const SQUARES: u32 = 5;
const ANGLE_STEP: f32 = 0.02;

/// Nested squares counter-rotating around the centre.
#[derive(Clone, Debug, Default)]
pub struct RotatingSquares;

impl Sketch for RotatingSquares {
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64) {
        let angle = frame.saturating_sub(1) as f32 * ANGLE_STEP;
        let width = canvas.width();

        canvas.background(Color::BLACK);
        canvas.translate(width / 2.0, canvas.height() / 2.0);
        canvas.rotate(angle);

        for i in 0..SQUARES {
            let side = width / SQUARES as f32 * (SQUARES - i) as f32 * 0.7;
            let direction = if i % 2 == 0 { 1.0 } else { -1.0 };

            canvas.push();
            canvas.rotate(angle * direction * 0.5);
            canvas.set_fill(None);
            canvas.set_stroke(Some(Color::gray(255 - i as u8 * 40)));
            canvas.set_stroke_weight(3.0);
            canvas.rect(-side / 2.0, -side / 2.0, side, side);
            canvas.pop();
        }
    }
}
