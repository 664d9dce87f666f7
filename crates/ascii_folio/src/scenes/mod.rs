//! Built-in procedural animations.

mod fractal_tree;
mod ringed_planet;
mod rotating_square;
mod wave_particles;

pub use fractal_tree::FractalTree;
pub use ringed_planet::RingedPlanet;
pub use rotating_square::RotatingSquares;
pub use wave_particles::WaveParticles;

use serde::{Deserialize, Serialize};

use crate::ascii::grid::{parse_hex_color, Rgb};
use crate::ascii::quantize::Orientation;
use crate::ascii::ramp::GlyphRamp;
use crate::image_pipeline::sampler::{BlockSampler, SamplerOptions};
use crate::render::source::{GridSource, SampledSource};
use crate::sketch::{Sketch, SketchProducer};
use crate::AsciiError;

/// Downsample applied to every animation canvas before sampling.
pub const SCENE_DOWNSAMPLE: f32 = 0.5;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    Square,
    Waves,
    Tree,
    Planet,
}

/// Canvas size, cell size and display tint of a scene.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SceneSpec {
    pub width: u32,
    pub height: u32,
    pub cell_size: u32,
    pub tint: Rgb,
}

impl SceneKind {
    pub const ALL: [SceneKind; 4] =
        [SceneKind::Square, SceneKind::Waves, SceneKind::Tree, SceneKind::Planet];

    pub fn name(self) -> &'static str {
        match self {
            SceneKind::Square => "square",
            SceneKind::Waves => "waves",
            SceneKind::Tree => "tree",
            SceneKind::Planet => "planet",
        }
    }

    /// Default layout. `size` overrides the nominal size; the waves scene keeps
    /// its 2:1 aspect and the planet its 1.6:1 canvas.
    pub fn spec(self, size: Option<u32>) -> SceneSpec {
        let (width, height, cell_size, tint) = match self {
            SceneKind::Square => {
                let side = size.unwrap_or(300);
                (side, side, 10, "#D4A574")
            },
            SceneKind::Waves => {
                let width = size.unwrap_or(400);
                (width, width / 2, 8, "#7DD3FC")
            },
            SceneKind::Tree => {
                let side = size.unwrap_or(300);
                (side, side, 8, "#90EE90")
            },
            SceneKind::Planet => {
                let height = size.unwrap_or(200);
                (RingedPlanet::canvas_width(height), height, 8, "#D4A574")
            },
        };
        let tint = parse_hex_color(tint).unwrap_or([255, 255, 255]);
        SceneSpec { width, height, cell_size, tint }
    }

    pub fn sampler_options(self, spec: &SceneSpec) -> SamplerOptions {
        SamplerOptions {
            cell_size: spec.cell_size,
            orientation: Orientation::Inverted,
            downsample: SCENE_DOWNSAMPLE,
            ..SamplerOptions::default()
        }
    }

    /// Sketch producer and sampler for this scene, ready for a render loop.
    ///
    /// `seed` only affects scenes with random layout.
    pub fn source(self, spec: &SceneSpec, seed: u64) -> Result<Box<dyn GridSource>, AsciiError> {
        let sampler = BlockSampler::new(GlyphRamp::standard(), self.sampler_options(spec))?;
        Ok(match self {
            SceneKind::Square => boxed(RotatingSquares, spec, sampler)?,
            SceneKind::Waves => boxed(WaveParticles::new(seed), spec, sampler)?,
            SceneKind::Tree => boxed(FractalTree, spec, sampler)?,
            SceneKind::Planet => boxed(RingedPlanet, spec, sampler)?,
        })
    }
}

fn boxed<S: Sketch + 'static>(
    sketch: S,
    spec: &SceneSpec,
    sampler: BlockSampler,
) -> Result<Box<dyn GridSource>, AsciiError> {
    let producer = SketchProducer::new(sketch, spec.width, spec.height)?;
    Ok(Box::new(SampledSource::new(producer, sampler)))
}
