//! Renderer profiles and their TOML file.
//!
//! ```toml
//! [renderers.avatar]
//! width = 256
//! height = 256
//!
//! [overlay]
//! enabled = true
//! ```
//!
//! A profile named in the file replaces the built-in profile of the same name;
//! fields it leaves out take the generic defaults.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::ascii::grid::{parse_hex_color, Rgb};
use crate::ascii::quantize::Orientation;
use crate::ascii::ramp::RampPreset;
use crate::image_pipeline::loader::ImagePrep;
use crate::image_pipeline::resize::TargetSize;
use crate::image_pipeline::sampler::{
    AlphaPolicy, BlockSampler, ColorMode, SamplerOptions, DEFAULT_ALPHA_THRESHOLD,
};
use crate::overlay::OverlayConfig;
use crate::render::{Activation, LoopSettings, Pacing, Placeholders};
use crate::AsciiError;

pub const BUILTIN_PROFILES: [&str; 3] = ["avatar", "icon", "animation"];

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io { path: PathBuf, source: std::io::Error },
    #[error("failed to parse config {}: {source}", path.display())]
    Parse { path: PathBuf, source: toml::de::Error },
    #[error("invalid tint colour {0:?}, expected #RRGGBB")]
    InvalidTint(String),
}

/// Options for one renderer instance.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RendererConfig {
    pub ramp: RampPreset,
    /// Pixels per glyph horizontally.
    pub cell_size: u32,
    /// Size the source is stretched or drawn to before sampling.
    pub width: u32,
    pub height: u32,
    pub orientation: Orientation,
    /// `#RRGGBB` applied to monochrome output.
    pub tint: Option<String>,
    /// Pixels below this alpha are skipped. `None` samples every pixel.
    pub alpha_threshold: Option<u8>,
    pub activation: Activation,
    pub downsample: f32,
    /// Cells twice as tall as they are wide.
    pub vertical_decimation: bool,
    pub color: ColorMode,
    pub circle_mask: bool,
    pub pacing: Pacing,
    pub placeholders: Placeholders,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            ramp: RampPreset::Standard,
            cell_size: 8,
            width: 400,
            height: 400,
            orientation: Orientation::Normal,
            tint: None,
            alpha_threshold: None,
            activation: Activation::Immediate,
            downsample: 1.0,
            vertical_decimation: false,
            color: ColorMode::Monochrome,
            circle_mask: false,
            pacing: Pacing::Repaint,
            placeholders: Placeholders::default(),
        }
    }
}

impl RendererConfig {
    /// Circular, full-colour portrait rendered once the view scrolls in.
    pub fn avatar() -> Self {
        Self {
            cell_size: 1,
            width: 128,
            height: 128,
            orientation: Orientation::Inverted,
            alpha_threshold: Some(DEFAULT_ALPHA_THRESHOLD),
            activation: Activation::ViewportLazy,
            downsample: 0.5,
            vertical_decimation: true,
            color: ColorMode::Source,
            circle_mask: true,
            ..Self::default()
        }
    }

    /// Small monochrome logo with transparent pixels left blank.
    pub fn icon() -> Self {
        Self {
            cell_size: 1,
            width: 32,
            height: 32,
            orientation: Orientation::Inverted,
            tint: Some("#FFFFFF".into()),
            alpha_threshold: Some(DEFAULT_ALPHA_THRESHOLD),
            downsample: 0.5,
            vertical_decimation: true,
            ..Self::default()
        }
    }

    /// Procedural canvas animation.
    pub fn animation() -> Self {
        Self {
            orientation: Orientation::Inverted,
            tint: Some("#D4A574".into()),
            downsample: 0.5,
            ..Self::default()
        }
    }

    pub fn builtin(name: &str) -> Option<Self> {
        match name {
            "avatar" => Some(Self::avatar()),
            "icon" => Some(Self::icon()),
            "animation" => Some(Self::animation()),
            _ => None,
        }
    }

    pub fn sampler_options(&self) -> SamplerOptions {
        let alpha = match self.alpha_threshold {
            Some(threshold) => AlphaPolicy::Mask { threshold },
            None => AlphaPolicy::Ignore,
        };
        SamplerOptions {
            cell_size: self.cell_size,
            vertical_decimation: self.vertical_decimation,
            orientation: self.orientation,
            alpha,
            color: self.color,
            downsample: self.downsample,
        }
    }

    pub fn sampler(&self) -> Result<BlockSampler, AsciiError> {
        BlockSampler::new(self.ramp.to_ramp(), self.sampler_options())
    }

    pub fn tint_rgb(&self) -> Result<Option<Rgb>, ConfigError> {
        self.tint
            .as_deref()
            .map(|tint| parse_hex_color(tint).ok_or_else(|| ConfigError::InvalidTint(tint.into())))
            .transpose()
    }

    pub fn image_prep(&self) -> ImagePrep {
        ImagePrep {
            target: TargetSize::new(self.width, self.height),
            circle_mask: self.circle_mask,
        }
    }

    /// Profile pacing, or a fixed interval when `interval_ms` is given.
    pub fn pacing_or(&self, interval_ms: Option<u64>) -> Pacing {
        interval_ms.map_or(self.pacing, |millis| Pacing::Interval { millis })
    }

    pub fn loop_settings(&self) -> LoopSettings {
        LoopSettings { activation: self.activation, placeholders: self.placeholders.clone() }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub renderers: BTreeMap<String, RendererConfig>,
    pub overlay: OverlayConfig,
}

impl AppConfig {
    /// Reads `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            debug!("no config at {}, using defaults", path.display());
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .map_err(|source| ConfigError::Io { path: path.to_path_buf(), source })?;
        let config = toml::from_str(&content)
            .map_err(|source| ConfigError::Parse { path: path.to_path_buf(), source })?;
        debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Profile `name` from the file, falling back to the built-in profiles.
    pub fn renderer(&self, name: &str) -> Option<RendererConfig> {
        self.renderers.get(name).cloned().or_else(|| RendererConfig::builtin(name))
    }

    pub fn profile_names(&self) -> Vec<String> {
        let mut names: Vec<String> = BUILTIN_PROFILES.iter().map(|name| name.to_string()).collect();
        for name in self.renderers.keys() {
            if !names.contains(name) {
                names.push(name.clone());
            }
        }
        names
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn builtin_profiles_build_samplers() {
        for name in BUILTIN_PROFILES {
            let config = RendererConfig::builtin(name).unwrap();
            assert!(config.sampler().is_ok(), "{name}");
            assert!(config.tint_rgb().is_ok(), "{name}");
        }
    }

    #[test]
    fn avatar_profile() {
        let avatar = RendererConfig::avatar();
        let options = avatar.sampler_options();
        assert_eq!(options.alpha, AlphaPolicy::Mask { threshold: 128 });
        assert_eq!(options.color, ColorMode::Source);
        assert!(options.vertical_decimation);
        assert_eq!(avatar.loop_settings().activation, Activation::ViewportLazy);
        assert!(avatar.image_prep().circle_mask);
    }

    #[test]
    fn interval_overrides_profile_pacing() {
        let config = RendererConfig {
            pacing: Pacing::Interval { millis: 500 },
            ..RendererConfig::animation()
        };
        assert_eq!(config.pacing_or(None).interval(), Duration::from_millis(500));
        assert_eq!(config.pacing_or(Some(40)), Pacing::Interval { millis: 40 });
        assert_eq!(RendererConfig::default().pacing_or(None), Pacing::Repaint);
    }

    #[test]
    fn oversized_decimated_cell_is_rejected() {
        let config: RendererConfig =
            toml::from_str("cell_size = 3000000000\nvertical_decimation = true").unwrap();
        assert!(matches!(config.sampler(), Err(AsciiError::InvalidCellSize)));
    }

    #[test]
    fn bad_tint_is_reported() {
        let config = RendererConfig { tint: Some("orange".into()), ..RendererConfig::default() };
        assert!(matches!(config.tint_rgb(), Err(ConfigError::InvalidTint(_))));
        assert_eq!(RendererConfig::default().tint_rgb().unwrap(), None);
        assert_eq!(RendererConfig::animation().tint_rgb().unwrap(), Some([0xd4, 0xa5, 0x74]));
    }

    #[test]
    fn file_profiles_shadow_builtins() {
        let config: AppConfig = toml::from_str(
            r#"
            [renderers.avatar]
            cell_size = 2

            [renderers.banner]
            orientation = "inverted"
            activation = "viewport-lazy"
            pacing = { interval = { millis = 500 } }
            "#,
        )
        .unwrap();

        assert_eq!(config.renderer("avatar").unwrap().cell_size, 2);
        assert_eq!(config.renderer("icon"), Some(RendererConfig::icon()));
        let banner = config.renderer("banner").unwrap();
        assert_eq!(banner.orientation, Orientation::Inverted);
        assert_eq!(banner.pacing, Pacing::Interval { millis: 500 });
        assert!(config.renderer("missing").is_none());
        assert_eq!(config.profile_names(), ["avatar", "icon", "animation", "banner"]);
    }
}
