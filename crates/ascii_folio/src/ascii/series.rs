use std::time::Duration;

use log::warn;

use super::grid::CharacterGrid;
use crate::image_pipeline::loader::ProduceError;
use crate::render::source::GridSource;

#[derive(Clone, Debug)]
pub struct SeriesFrame {
    pub grid: CharacterGrid,
    pub duration: Duration,
}

/// Recorded grids with per-frame display durations.
#[derive(Clone, Debug, Default)]
pub struct FrameSeries {
    frames: Vec<SeriesFrame>,
    total_duration: Duration,
    dimensions: Option<(usize, usize)>,
}

impl FrameSeries {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pulls `frame_count` grids from `source`, one per tick starting at 1.
    ///
    /// Ticks that report [`ProduceError::NotReady`] are retried up to
    /// `frame_count` extra times before giving up on the remaining frames.
    pub fn record(
        source: &mut dyn GridSource,
        frame_count: usize,
        frame_duration: Duration,
    ) -> Result<Self, ProduceError> {
        let mut series = Self::new();
        let mut tick = 0u64;
        let mut retries = frame_count;

        while series.len() < frame_count {
            tick += 1;
            match source.next_grid(tick) {
                Ok(grid) => {
                    series.push_frame(SeriesFrame { grid, duration: frame_duration });
                },
                Err(ProduceError::NotReady) if retries > 0 => retries -= 1,
                Err(ProduceError::NotReady) => break,
                Err(err) => return Err(err),
            }
        }

        Ok(series)
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    /// Columns and rows shared by every frame.
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.dimensions
    }

    pub fn clear(&mut self) {
        self.frames.clear();
        self.total_duration = Duration::ZERO;
        self.dimensions = None;
    }

    /// Appends a frame. Frames whose size differs from the first one are
    /// dropped and `false` is returned.
    pub fn push_frame(&mut self, frame: SeriesFrame) -> bool {
        let size = (frame.grid.width, frame.grid.height);
        match self.dimensions {
            Some(expected) if expected != size => {
                warn!(
                    "skipping frame with mismatched dimensions {}x{} (expected {}x{})",
                    size.0, size.1, expected.0, expected.1
                );
                return false;
            },
            Some(_) => {},
            None => self.dimensions = Some(size),
        }

        self.total_duration += frame.duration;
        self.frames.push(frame);
        true
    }

    pub fn total_duration(&self) -> Duration {
        self.total_duration
    }

    /// Index of the frame showing `elapsed` into the loop. Playback wraps after
    /// [`total_duration`](Self::total_duration); zero-length frames are never
    /// chosen unless every frame has zero length.
    pub fn frame_index_at(&self, elapsed: Duration) -> Option<usize> {
        let last = self.frames.len().checked_sub(1)?;
        let total = self.total_duration.as_nanos();
        if total == 0 {
            return Some(0);
        }

        let offset = elapsed.as_nanos() % total;
        let mut frame_end = 0;
        let index = self.frames.iter().position(|frame| {
            frame_end += frame.duration.as_nanos();
            offset < frame_end
        });
        Some(index.unwrap_or(last))
    }

    pub fn frame_at(&self, elapsed: Duration) -> Option<&CharacterGrid> {
        let index = self.frame_index_at(elapsed)?;
        self.frame(index)
    }

    pub fn frame(&self, index: usize) -> Option<&CharacterGrid> {
        self.frames.get(index).map(|frame| &frame.grid)
    }

    pub fn frames(&self) -> impl Iterator<Item = &SeriesFrame> {
        self.frames.iter()
    }
}
