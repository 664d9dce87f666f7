use tiny_skia::{FillRule, Paint, Path, PathBuilder, Pixmap, Rect, Stroke, Transform};

use super::{Canvas, Color, Point};
use crate::image_pipeline::frame::RasterFrame;
use crate::AsciiError;

#[derive(Clone, Copy, Debug)]
struct DrawState {
    stroke: Option<Color>,
    stroke_weight: f32,
    fill: Option<Color>,
    transform: Transform,
}

impl Default for DrawState {
    fn default() -> Self {
        Self {
            stroke: Some(Color::BLACK),
            stroke_weight: 1.0,
            fill: Some(Color::WHITE),
            transform: Transform::identity(),
        }
    }
}

/// [`Canvas`] backed by a tiny-skia pixmap.
pub struct SkiaCanvas {
    pixmap: Pixmap,
    state: DrawState,
    saved: Vec<DrawState>,
}

impl SkiaCanvas {
    pub fn new(width: u32, height: u32) -> Result<Self, AsciiError> {
        let pixmap =
            Pixmap::new(width, height).ok_or(AsciiError::InvalidCanvasSize { width, height })?;
        Ok(Self { pixmap, state: DrawState::default(), saved: Vec::new() })
    }

    /// Resets the draw state; pixels are left for the sketch to clear.
    pub fn begin_frame(&mut self) {
        self.state = DrawState::default();
        self.saved.clear();
    }

    pub fn pixmap(&self) -> &Pixmap {
        &self.pixmap
    }

    /// Copies the surface into `frame` as straight (non-premultiplied) RGBA.
    pub fn copy_into(&self, frame: &mut RasterFrame) {
        frame.ensure_size(self.pixmap.width(), self.pixmap.height());
        let raw = frame.as_raw_mut();
        for (dst, pixel) in raw.chunks_exact_mut(4).zip(self.pixmap.pixels()) {
            let color = pixel.demultiply();
            dst.copy_from_slice(&[color.red(), color.green(), color.blue(), color.alpha()]);
        }
    }

    pub fn to_frame(&self) -> RasterFrame {
        let mut frame = RasterFrame::new(self.pixmap.width(), self.pixmap.height());
        self.copy_into(&mut frame);
        frame
    }

    fn draw_path(&mut self, path: &Path, fill: bool) {
        let transform = self.state.transform;

        if let Some(color) = self.state.fill.filter(|_| fill) {
            let paint = paint_for(color);
            self.pixmap.fill_path(path, &paint, FillRule::Winding, transform, None);
        }

        if let Some(color) = self.state.stroke {
            if self.state.stroke_weight > 0.0 {
                let paint = paint_for(color);
                let stroke = Stroke { width: self.state.stroke_weight, ..Stroke::default() };
                self.pixmap.stroke_path(path, &paint, &stroke, transform, None);
            }
        }
    }
}

fn paint_for(color: Color) -> Paint<'static> {
    let mut paint = Paint::default();
    paint.set_color_rgba8(color.r, color.g, color.b, color.a);
    paint.anti_alias = true;
    paint
}

fn path_through(points: &[Point], close: bool) -> Option<Path> {
    let (first, rest) = points.split_first()?;
    let mut builder = PathBuilder::new();
    builder.move_to(first.0, first.1);
    for &(x, y) in rest {
        builder.line_to(x, y);
    }
    if close {
        builder.close();
    }
    builder.finish()
}

impl Canvas for SkiaCanvas {
    fn width(&self) -> f32 {
        self.pixmap.width() as f32
    }

    fn height(&self) -> f32 {
        self.pixmap.height() as f32
    }

    fn background(&mut self, color: Color) {
        self.pixmap.fill(tiny_skia::Color::from_rgba8(color.r, color.g, color.b, color.a));
    }

    fn set_stroke(&mut self, color: Option<Color>) {
        self.state.stroke = color;
    }

    fn set_stroke_weight(&mut self, weight: f32) {
        self.state.stroke_weight = weight.max(0.0);
    }

    fn set_fill(&mut self, color: Option<Color>) {
        self.state.fill = color;
    }

    fn line(&mut self, from: Point, to: Point) {
        if let Some(path) = path_through(&[from, to], false) {
            self.draw_path(&path, false);
        }
    }

    fn polyline(&mut self, points: &[Point]) {
        if let Some(path) = path_through(points, false) {
            self.draw_path(&path, false);
        }
    }

    fn polygon(&mut self, points: &[Point]) {
        if let Some(path) = path_through(points, true) {
            self.draw_path(&path, true);
        }
    }

    fn rect(&mut self, x: f32, y: f32, width: f32, height: f32) {
        if let Some(rect) = Rect::from_xywh(x, y, width, height) {
            let path = PathBuilder::from_rect(rect);
            self.draw_path(&path, true);
        }
    }

    fn ellipse(&mut self, center: Point, width: f32, height: f32) {
        let bounds = Rect::from_xywh(center.0 - width / 2.0, center.1 - height / 2.0, width, height);
        if let Some(path) = bounds.and_then(PathBuilder::from_oval) {
            self.draw_path(&path, true);
        }
    }

    fn translate(&mut self, dx: f32, dy: f32) {
        self.state.transform = self.state.transform.pre_translate(dx, dy);
    }

    fn rotate(&mut self, radians: f32) {
        self.state.transform = self.state.transform.pre_rotate(radians.to_degrees());
    }

    fn push(&mut self) {
        self.saved.push(self.state);
    }

    fn pop(&mut self) {
        if let Some(state) = self.saved.pop() {
            self.state = state;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gray_at(canvas: &SkiaCanvas, x: u32, y: u32) -> [u8; 4] {
        canvas.to_frame().pixel(x, y)
    }

    #[test]
    fn background_covers_the_surface() {
        let mut canvas = SkiaCanvas::new(8, 8).unwrap();
        canvas.background(Color::gray(40));
        assert_eq!(gray_at(&canvas, 0, 0), [40, 40, 40, 255]);
        assert_eq!(gray_at(&canvas, 7, 7), [40, 40, 40, 255]);
    }

    #[test]
    fn filled_rect_without_stroke() {
        let mut canvas = SkiaCanvas::new(20, 20).unwrap();
        canvas.background(Color::BLACK);
        canvas.set_stroke(None);
        canvas.set_fill(Some(Color::WHITE));
        canvas.rect(5.0, 5.0, 10.0, 10.0);

        assert_eq!(gray_at(&canvas, 10, 10), [255, 255, 255, 255]);
        assert_eq!(gray_at(&canvas, 1, 1), [0, 0, 0, 255]);
    }

    #[test]
    fn translate_moves_later_shapes_and_pop_restores() {
        let mut canvas = SkiaCanvas::new(20, 20).unwrap();
        canvas.background(Color::BLACK);
        canvas.set_stroke(None);

        canvas.push();
        canvas.translate(10.0, 10.0);
        canvas.rect(0.0, 0.0, 4.0, 4.0);
        canvas.pop();
        canvas.rect(0.0, 0.0, 4.0, 4.0);

        assert_eq!(gray_at(&canvas, 12, 12), [255, 255, 255, 255]);
        assert_eq!(gray_at(&canvas, 2, 2), [255, 255, 255, 255]);
        assert_eq!(gray_at(&canvas, 7, 7), [0, 0, 0, 255]);
    }

    #[test]
    fn degenerate_shapes_are_skipped() {
        let mut canvas = SkiaCanvas::new(4, 4).unwrap();
        canvas.background(Color::BLACK);
        canvas.polyline(&[]);
        canvas.polygon(&[(1.0, 1.0)]);
        canvas.rect(0.0, 0.0, 0.0, 0.0);
        assert_eq!(gray_at(&canvas, 1, 1), [0, 0, 0, 255]);
    }
}
