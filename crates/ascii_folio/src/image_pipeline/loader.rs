use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use image::{DynamicImage, GenericImageView};
use log::{debug, warn};

use super::frame::RasterFrame;
use super::resize::{self, TargetSize};

/// Why a producer could not hand out a frame this tick.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ProduceError {
    /// Nothing to sample yet; try again next tick.
    #[error("frame not ready")]
    NotReady,
    /// The asset could not be read or decoded.
    #[error("failed to load {}: {reason}", path.display())]
    AssetLoad { path: PathBuf, reason: String },
    /// Decoded, but the pixels could not be extracted.
    #[error("pixel data unavailable: {0}")]
    PixelAccess(String),
}

impl ProduceError {
    /// Transient errors are retried on the next tick instead of settling the
    /// loop on a placeholder.
    pub fn is_transient(&self) -> bool {
        matches!(self, ProduceError::NotReady)
    }
}

/// Source of raster frames for the render loop.
///
/// The returned frame is borrowed for one sampling pass only; producers are
/// free to redraw into the same buffer on the next call.
pub trait FrameProducer {
    fn next_frame(&mut self, tick: u64) -> Result<&RasterFrame, ProduceError>;
}

/// Producer that hands out the same frame every tick.
pub struct StaticFrame {
    frame: RasterFrame,
}

impl StaticFrame {
    pub fn new(frame: impl Into<RasterFrame>) -> Self {
        Self { frame: frame.into() }
    }
}

impl FrameProducer for StaticFrame {
    fn next_frame(&mut self, _tick: u64) -> Result<&RasterFrame, ProduceError> {
        Ok(&self.frame)
    }
}

/// How a decoded image is fitted before sampling.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ImagePrep {
    /// Size the image is stretched to.
    pub target: TargetSize,
    /// Clear every pixel outside the inscribed circle.
    pub circle_mask: bool,
}

impl ImagePrep {
    pub fn stretch(target: TargetSize) -> Self {
        Self { target, circle_mask: false }
    }

    pub fn circle(target: TargetSize) -> Self {
        Self { target, circle_mask: true }
    }
}

pub fn load_image(path: &Path) -> Result<DynamicImage, ProduceError> {
    let image = image::open(path)
        .map_err(|err| ProduceError::AssetLoad { path: path.to_path_buf(), reason: err.to_string() })?;
    let (w, h) = image.dimensions();
    debug!("loaded asset {}x{} from {}", w, h, path.display());
    Ok(image)
}

/// Stretches `image` to the prep target and applies the optional mask.
pub fn prepare_image(image: &DynamicImage, prep: ImagePrep) -> Result<RasterFrame, ProduceError> {
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
        return Err(ProduceError::PixelAccess(format!("source image is {w}x{h}")));
    }
    if prep.target.width == 0 || prep.target.height == 0 {
        return Err(ProduceError::PixelAccess(format!(
            "target surface is {}x{}",
            prep.target.width, prep.target.height
        )));
    }

    let mut frame = resize::stretch(&RasterFrame::from(image.to_rgba8()), prep.target);
    if prep.circle_mask {
        circular_mask(&mut frame);
    }
    Ok(frame)
}

/// Zeroes the alpha of every pixel whose centre falls outside the circle
/// inscribed in the frame.
pub fn circular_mask(frame: &mut RasterFrame) {
    let (width, height) = frame.dimensions();
    let cx = width as f32 / 2.0;
    let cy = height as f32 / 2.0;
    let radius = width.min(height) as f32 / 2.0;
    let radius_sq = radius * radius;

    let stride = width as usize * 4;
    let data = frame.as_raw_mut();
    for y in 0..height {
        for x in 0..width {
            let dx = x as f32 + 0.5 - cx;
            let dy = y as f32 + 0.5 - cy;
            if dx * dx + dy * dy > radius_sq {
                data[y as usize * stride + x as usize * 4 + 3] = 0;
            }
        }
    }
}

enum AssetState {
    Loading(Receiver<Result<RasterFrame, ProduceError>>),
    Ready(RasterFrame),
    Failed(ProduceError),
}

/// Decodes an image on a background thread.
///
/// Reports [`ProduceError::NotReady`] until the pixels arrive, then serves the
/// prepared frame every tick. A failed load is reported on every later call.
pub struct AssetProducer {
    path: PathBuf,
    state: AssetState,
}

impl AssetProducer {
    pub fn spawn(path: impl Into<PathBuf>, prep: ImagePrep) -> Self {
        let path = path.into();
        let (tx, rx) = mpsc::channel();

        let worker_path = path.clone();
        let spawned = thread::Builder::new().name("asset-loader".into()).spawn(move || {
            let result = load_image(&worker_path).and_then(|image| prepare_image(&image, prep));
            let _ = tx.send(result);
        });

        let state = match spawned {
            Ok(_) => AssetState::Loading(rx),
            Err(err) => {
                warn!("failed to spawn asset loader, loading {} inline: {err}", path.display());
                match load_image(&path).and_then(|image| prepare_image(&image, prep)) {
                    Ok(frame) => AssetState::Ready(frame),
                    Err(err) => AssetState::Failed(err),
                }
            },
        };

        Self { path, state }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_loading(&self) -> bool {
        matches!(self.state, AssetState::Loading(_))
    }

    fn poll(&mut self) {
        let AssetState::Loading(rx) = &self.state else {
            return;
        };

        self.state = match rx.try_recv() {
            Ok(Ok(frame)) => AssetState::Ready(frame),
            Ok(Err(err)) => {
                warn!("asset {} unavailable: {err}", self.path.display());
                AssetState::Failed(err)
            },
            Err(TryRecvError::Empty) => return,
            Err(TryRecvError::Disconnected) => AssetState::Failed(ProduceError::AssetLoad {
                path: self.path.clone(),
                reason: "loader exited without a result".into(),
            }),
        };
    }
}

impl FrameProducer for AssetProducer {
    fn next_frame(&mut self, _tick: u64) -> Result<&RasterFrame, ProduceError> {
        self.poll();
        match &self.state {
            AssetState::Loading(_) => Err(ProduceError::NotReady),
            AssetState::Ready(frame) => Ok(frame),
            AssetState::Failed(err) => Err(err.clone()),
        }
    }
}
