use image::imageops::{self, FilterType};

use super::frame::RasterFrame;

/// Pixel dimensions a producer renders at.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TargetSize {
    pub width: u32,
    pub height: u32,
}

impl TargetSize {
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn square(side: u32) -> Self {
        Self { width: side, height: side }
    }

    /// Size after a uniform scale, truncated toward zero.
    pub fn scaled(self, factor: f32) -> Self {
        Self {
            width: (self.width as f32 * factor).floor() as u32,
            height: (self.height as f32 * factor).floor() as u32,
        }
    }
}

/// Shrinks a frame by `factor` before block sampling.
///
/// Returns `None` when no resize is needed (`factor >= 1.0`). Only a throughput
/// knob: glyph selection on content without sub-pixel detail is unaffected.
pub fn downsample(frame: &RasterFrame, factor: f32) -> Option<RasterFrame> {
    if factor >= 1.0 || frame.is_empty() {
        return None;
    }

    let target = TargetSize::new(frame.width(), frame.height()).scaled(factor);
    Some(stretch(frame, target))
}

/// Stretches a frame to exactly `target`, ignoring aspect ratio.
pub fn stretch(frame: &RasterFrame, target: TargetSize) -> RasterFrame {
    if target.width == 0 || target.height == 0 {
        return RasterFrame::new(0, 0);
    }
    if frame.dimensions() == (target.width, target.height) {
        return frame.clone();
    }

    imageops::resize(frame.as_image(), target.width, target.height, FilterType::Triangle).into()
}
