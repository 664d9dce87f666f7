//! Procedural frame producers.
//!
//! A [`Sketch`] draws one frame through the narrow [`Canvas`] interface; a
//! [`SketchProducer`] replays it every tick into a reusable raster.

mod skia;

pub use skia::SkiaCanvas;

use crate::image_pipeline::frame::RasterFrame;
use crate::image_pipeline::loader::{FrameProducer, ProduceError};
use crate::AsciiError;

pub type Point = (f32, f32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::gray(0);
    pub const WHITE: Color = Color::gray(255);

    pub const fn gray(value: u8) -> Self {
        Self { r: value, g: value, b: value, a: 255 }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }
}

/// Drawing primitives available to sketches.
///
/// Stroke and fill settings, plus the current transform, are part of the
/// state saved by [`push`](Canvas::push) and restored by [`pop`](Canvas::pop).
pub trait Canvas {
    fn width(&self) -> f32;
    fn height(&self) -> f32;

    /// Fills the whole surface, ignoring the transform.
    fn background(&mut self, color: Color);

    fn set_stroke(&mut self, color: Option<Color>);
    fn set_stroke_weight(&mut self, weight: f32);
    fn set_fill(&mut self, color: Option<Color>);

    fn line(&mut self, from: Point, to: Point);
    /// Open path through `points`; stroked only.
    fn polyline(&mut self, points: &[Point]);
    /// Closed shape through `points`; filled and stroked.
    fn polygon(&mut self, points: &[Point]);
    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32);
    /// Ellipse centred on `center`.
    fn ellipse(&mut self, center: Point, width: f32, height: f32);

    fn translate(&mut self, dx: f32, dy: f32);
    /// Rotates clockwise by `radians` in screen space.
    fn rotate(&mut self, radians: f32);
    fn push(&mut self);
    fn pop(&mut self);
}

/// One frame of a procedural animation.
pub trait Sketch {
    /// Draws frame number `frame` (1 on the first tick).
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64);
}

impl<F: FnMut(&mut dyn Canvas, u64)> Sketch for F {
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64) {
        self(canvas, frame)
    }
}

/// Redraws a sketch each tick and exposes the pixels as a [`RasterFrame`].
pub struct SketchProducer<S> {
    sketch: S,
    canvas: SkiaCanvas,
    frame: RasterFrame,
}

impl<S: Sketch> SketchProducer<S> {
    pub fn new(sketch: S, width: u32, height: u32) -> Result<Self, AsciiError> {
        let canvas = SkiaCanvas::new(width, height)?;
        Ok(Self { sketch, canvas, frame: RasterFrame::new(width, height) })
    }

    pub fn canvas(&self) -> &SkiaCanvas {
        &self.canvas
    }
}

impl<S: Sketch> FrameProducer for SketchProducer<S> {
    fn next_frame(&mut self, tick: u64) -> Result<&RasterFrame, ProduceError> {
        self.canvas.begin_frame();
        self.sketch.draw(&mut self.canvas, tick);
        self.canvas.copy_into(&mut self.frame);
        Ok(&self.frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn producer_reuses_its_frame_buffer() {
        let sketch = |canvas: &mut dyn Canvas, frame: u64| {
            canvas.background(Color::gray((frame * 10) as u8));
        };
        let mut producer = SketchProducer::new(sketch, 4, 4).unwrap();

        let first = producer.next_frame(1).unwrap().pixel(0, 0);
        assert_eq!(first, [10, 10, 10, 255]);
        let second = producer.next_frame(2).unwrap().pixel(3, 3);
        assert_eq!(second, [20, 20, 20, 255]);
    }

    #[test]
    fn zero_sized_canvas_is_rejected() {
        let sketch = |_: &mut dyn Canvas, _: u64| {};
        assert!(SketchProducer::new(sketch, 0, 10).is_err());
    }
}
