pub mod ascii;
pub mod config;
pub mod image_pipeline;
pub mod overlay;
pub mod render;
pub mod scenes;
pub mod sketch;

use std::path::Path;

use image::DynamicImage;
use log::warn;

pub use ascii::{
    grid::{CellGlyph, CharacterGrid, Rgb},
    planet::{PlanetSource, PlanetStyle},
    quantize::Orientation,
    ramp::{GlyphRamp, RampPreset},
    series::FrameSeries,
};
pub use config::{AppConfig, ConfigError, RendererConfig};
pub use image_pipeline::{
    frame::RasterFrame,
    loader::{AssetProducer, FrameProducer, ImagePrep, ProduceError, StaticFrame},
    sampler::{AlphaPolicy, BlockSampler, ColorMode, SamplerOptions},
};
pub use overlay::OverlayConfig;
pub use render::{DisplayTarget, GridSource, LoopState, RenderHandle, RenderLoop, RepaintClock};
pub use scenes::SceneKind;

use image_pipeline::loader;

#[derive(Debug, thiserror::Error)]
pub enum AsciiError {
    #[error("failed to load image: {0}")]
    Image(#[from] image::ImageError),
    #[error("glyph ramp must contain at least one character")]
    EmptyRamp,
    #[error("cell size must be at least one pixel")]
    InvalidCellSize,
    #[error("downsample factor {0} outside (0, 1]")]
    InvalidDownsample(f32),
    #[error("cannot allocate a {width}x{height} canvas")]
    InvalidCanvasSize { width: u32, height: u32 },
    #[error(transparent)]
    Produce(#[from] ProduceError),
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// A single rendered grid plus the colour it should be shown in.
#[derive(Clone, Debug)]
pub struct RenderOutput {
    pub grid: CharacterGrid,
    /// Applied to cells without their own colour.
    pub tint: Option<Rgb>,
}

impl RenderOutput {
    pub fn to_text(&self) -> String {
        self.grid.to_text()
    }

    pub fn to_ansi(&self) -> String {
        self.grid.to_ansi(self.tint)
    }
}

/// One-shot rendering of still images with a renderer profile.
#[derive(Default)]
pub struct AsciiRenderer;

impl AsciiRenderer {
    pub fn render_path<P: AsRef<Path>>(
        &self,
        path: P,
        config: &RendererConfig,
    ) -> Result<RenderOutput, AsciiError> {
        let image = loader::load_image(path.as_ref())?;
        self.render_image(&image, config)
    }

    pub fn render_image(
        &self,
        image: &DynamicImage,
        config: &RendererConfig,
    ) -> Result<RenderOutput, AsciiError> {
        let tint = config.tint_rgb()?;
        let sampler = config.sampler()?;
        let frame = loader::prepare_image(image, config.image_prep())?;
        Ok(RenderOutput { grid: sampler.sample(&frame), tint })
    }

    /// Like [`render_path`](Self::render_path), but a load or pixel failure
    /// yields the profile's placeholder text instead of an error.
    pub fn render_or_placeholder<P: AsRef<Path>>(
        &self,
        path: P,
        config: &RendererConfig,
    ) -> Result<RenderOutput, AsciiError> {
        match self.render_path(path, config) {
            Err(AsciiError::Produce(err)) => {
                warn!("rendering placeholder: {err}");
                let text = config.placeholders.for_error(&err);
                Ok(RenderOutput { grid: CharacterGrid::from_text(text), tint: config.tint_rgb()? })
            },
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    #[test]
    fn renders_a_profile_at_its_cell_grid() {
        let image = DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 255])));
        let config = RendererConfig { width: 32, height: 16, ..RendererConfig::default() };
        let output = AsciiRenderer.render_image(&image, &config).unwrap();

        assert_eq!((output.grid.width, output.grid.height), (4, 2));
        assert!(output.to_text().chars().all(|c| c == '@' || c == '\n'));
    }

    #[test]
    fn missing_file_falls_back_to_placeholder() {
        let config = RendererConfig::icon();
        let output = AsciiRenderer.render_or_placeholder("/nonexistent/icon.png", &config).unwrap();
        assert_eq!(output.to_text(), "[?]");
        assert!(AsciiRenderer.render_path("/nonexistent/icon.png", &config).is_err());
    }
}
