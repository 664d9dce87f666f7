use std::f32::consts::TAU;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::sketch::{Canvas, Color, Sketch};

const COLUMNS: usize = 30;
const ROWS: usize = 15;

#[derive(Clone, Debug)]
struct Particle {
    x: f32,
    base_y: f32,
    size: f32,
    speed: f32,
    amplitude: f32,
    phase: f32,
}

impl Particle {
    fn offset(&self, time: f32) -> f32 {
        (time * self.speed + self.phase).sin() * self.amplitude
    }
}

/// A 30x15 lattice of dots bobbing on independent sine waves, with each
/// lattice row joined by a line.
#[derive(Clone, Debug)]
pub struct WaveParticles {
    width: f32,
    height: f32,
    seed: u64,
    /// Column-major: index `i * ROWS + j`.
    particles: Vec<Particle>,
}

impl WaveParticles {
    pub fn new(seed: u64) -> Self {
        Self { width: 0.0, height: 0.0, seed, particles: Vec::new() }
    }

    fn layout(&mut self, width: f32, height: f32) {
        if !self.particles.is_empty() && self.width == width && self.height == height {
            return;
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let x_spacing = width / COLUMNS as f32;
        let y_spacing = height / ROWS as f32;

        self.particles = (0..COLUMNS)
            .flat_map(|i| (0..ROWS).map(move |j| (i, j)))
            .map(|(i, j)| Particle {
                x: i as f32 * x_spacing + x_spacing / 2.0,
                base_y: j as f32 * y_spacing + y_spacing / 2.0,
                size: rng.gen_range(4.0..12.0),
                speed: rng.gen_range(0.02..0.05),
                amplitude: rng.gen_range(10.0..30.0),
                phase: rng.gen_range(0.0..TAU),
            })
            .collect();
        self.width = width;
        self.height = height;
    }
}

/// Brightness falls from 255 at rest to 100 at full swing.
fn brightness(offset: f32, amplitude: f32) -> u8 {
    let t = (offset.abs() / amplitude).clamp(0.0, 1.0);
    (255.0 - t * 155.0).round() as u8
}

impl Sketch for WaveParticles {
    fn draw(&mut self, canvas: &mut dyn Canvas, frame: u64) {
        self.layout(canvas.width(), canvas.height());
        let time = frame as f32;

        canvas.background(Color::BLACK);
        canvas.set_stroke(None);

        let positions: Vec<(f32, f32)> = self
            .particles
            .iter()
            .map(|particle| {
                let offset = particle.offset(time);
                canvas.set_fill(Some(Color::gray(brightness(offset, particle.amplitude))));
                let center = (particle.x, particle.base_y + offset);
                canvas.ellipse(center, particle.size, particle.size);
                center
            })
            .collect();

        canvas.set_stroke(Some(Color::gray(150)));
        canvas.set_stroke_weight(1.0);
        canvas.set_fill(None);
        for j in 0..ROWS {
            let row: Vec<(f32, f32)> =
                (0..COLUMNS).filter_map(|i| positions.get(i * ROWS + j).copied()).collect();
            canvas.polyline(&row);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_seed_same_lattice() {
        let mut a = WaveParticles::new(7);
        let mut b = WaveParticles::new(7);
        a.layout(400.0, 200.0);
        b.layout(400.0, 200.0);

        assert_eq!(a.particles.len(), COLUMNS * ROWS);
        for (pa, pb) in a.particles.iter().zip(&b.particles) {
            assert_eq!(pa.phase, pb.phase);
            assert_eq!(pa.size, pb.size);
        }
    }

    #[test]
    fn particle_parameters_in_range() {
        let mut waves = WaveParticles::new(1);
        waves.layout(400.0, 200.0);
        for particle in &waves.particles {
            assert!((4.0..12.0).contains(&particle.size));
            assert!((0.02..0.05).contains(&particle.speed));
            assert!((10.0..30.0).contains(&particle.amplitude));
            assert!(particle.offset(123.0).abs() <= particle.amplitude);
        }
    }

    #[test]
    fn brightness_map() {
        assert_eq!(brightness(0.0, 20.0), 255);
        assert_eq!(brightness(-20.0, 20.0), 100);
        assert_eq!(brightness(10.0, 20.0), 178);
    }
}
