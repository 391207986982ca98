use fastnoise_lite::{FastNoiseLite, NoiseType};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;
use terrane_geom::Vec2;

use crate::height_map::HeightMap;

/// Empirical divisor compensating for the absolute-value folding of octaves
/// under global normalization.
const GLOBAL_NORMALIZE_DIVISOR: f32 = 1.725;
/// Floor applied to a non-positive scale at sampling time.
const MIN_SAMPLE_SCALE: f32 = 0.0001;
const OCTAVE_OFFSET_RANGE: i32 = 100_000;
/// Sample coordinates at or beyond this magnitude are wrapped before they reach the
/// lattice, which floors them into `i32`.
const SAMPLE_WRAP: f32 = 16_777_216.0;

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum NormalizeMode {
    /// Remap each grid from its own observed range to [0, 1]. Adjacent grids
    /// disagree on shared edges; use for standalone maps.
    Local,
    /// Normalize against the theoretical amplitude sum so neighbouring grids agree.
    #[default]
    Global,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct NoiseConfig {
    #[serde(default)]
    pub seed: i32,
    #[serde(default = "default_scale")]
    pub scale: f32,
    #[serde(default = "default_octaves")]
    pub octaves: i32,
    #[serde(default = "default_persistence")]
    pub persistence: f32,
    #[serde(default = "default_lacunarity")]
    pub lacunarity: f32,
    #[serde(default)]
    pub offset: [f32; 2],
    #[serde(default)]
    pub normalize_mode: NormalizeMode,
    #[serde(default)]
    pub use_falloff: bool,
}

fn default_scale() -> f32 {
    50.0
}
fn default_octaves() -> i32 {
    6
}
fn default_persistence() -> f32 {
    0.6
}
fn default_lacunarity() -> f32 {
    2.0
}

impl Default for NoiseConfig {
    fn default() -> Self {
        Self {
            seed: 0,
            scale: default_scale(),
            octaves: default_octaves(),
            persistence: default_persistence(),
            lacunarity: default_lacunarity(),
            offset: [0.0, 0.0],
            normalize_mode: NormalizeMode::Global,
            use_falloff: false,
        }
    }
}

impl NoiseConfig {
    /// Copy with every numeric field clamped into its accepted range.
    pub fn validated(&self) -> Self {
        Self {
            scale: self.scale.max(0.01),
            octaves: self.octaves.max(1),
            lacunarity: self.lacunarity.max(1.0),
            persistence: self.persistence.clamp(0.0, 1.0),
            ..self.clone()
        }
    }

    #[inline]
    pub fn offset(&self) -> Vec2 {
        Vec2::new(self.offset[0], self.offset[1])
    }

    /// Sum of per-octave amplitudes, the largest height a cell can accumulate.
    pub fn max_possible_height(&self) -> f32 {
        let mut total = 0.0;
        let mut amplitude = 1.0;
        for _ in 0..self.octaves.max(0) {
            total += amplitude;
            amplitude *= self.persistence;
        }
        total
    }
}

fn gradient_noise(seed: i32) -> FastNoiseLite {
    let mut noise = FastNoiseLite::with_seed(seed);
    noise.set_noise_type(Some(NoiseType::Perlin));
    // Sample coordinates are pre-scaled by the caller.
    noise.set_frequency(Some(1.0));
    noise
}

/// One sampling offset per octave. `y` subtracts the base offset and the
/// sample center so panning composes the same way on both axes of the mesh.
pub(crate) fn octave_offsets(config: &NoiseConfig, sample_center: Vec2) -> Vec<Vec2> {
    let mut rng = ChaCha8Rng::seed_from_u64(u64::from(config.seed as u32));
    let base = config.offset();
    (0..config.octaves.max(0))
        .map(|_| {
            let rx = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32;
            let ry = rng.gen_range(-OCTAVE_OFFSET_RANGE..OCTAVE_OFFSET_RANGE) as f32;
            Vec2::new(rx + base.x + sample_center.x, ry - base.y - sample_center.y)
        })
        .collect()
}

#[inline]
fn wrap_sample(c: f32) -> f32 {
    if !c.is_finite() {
        0.0
    } else if c.abs() < SAMPLE_WRAP {
        c
    } else {
        c.rem_euclid(SAMPLE_WRAP)
    }
}

#[inline]
fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b {
        0.0
    } else {
        ((v - a) / (b - a)).clamp(0.0, 1.0)
    }
}

/// Fractal noise grid of `width * height` cells, row-major.
///
/// Local mode returns a map whose min/max are exactly 0 and 1. Global mode
/// keeps the raw accumulated extremes as min/max; the stored values are the
/// normalized ones.
pub fn generate_noise_map(
    width: usize,
    height: usize,
    config: &NoiseConfig,
    sample_center: Vec2,
) -> HeightMap {
    let offsets = octave_offsets(config, sample_center);
    let max_possible_height = config.max_possible_height();
    let scale = if config.scale <= 0.0 {
        MIN_SAMPLE_SCALE
    } else {
        config.scale
    };
    let noise = gradient_noise(config.seed);

    let half_width = width as f32 / 2.0;
    let half_height = height as f32 / 2.0;
    let mut values = vec![0.0f32; width * height];
    let mut min_local = f32::MAX;
    let mut max_local = f32::MIN;

    for y in 0..height {
        for x in 0..width {
            let mut amplitude = 1.0f32;
            let mut frequency = 1.0f32;
            let mut noise_height = 0.0f32;
            for offset in &offsets {
                let sample_x = (x as f32 - half_width + offset.x) / scale * frequency;
                let sample_y = (y as f32 - half_height + offset.y) / scale * frequency;
                let sample = noise.get_noise_2d(wrap_sample(sample_x), wrap_sample(sample_y));
                noise_height += (sample * amplitude).abs();
                amplitude *= config.persistence;
                frequency *= config.lacunarity;
            }
            min_local = min_local.min(noise_height);
            max_local = max_local.max(noise_height);

            values[y * width + x] = match config.normalize_mode {
                NormalizeMode::Global => ((noise_height + 1.0)
                    / (2.0 * max_possible_height / GLOBAL_NORMALIZE_DIVISOR))
                    .max(0.0),
                NormalizeMode::Local => noise_height,
            };
        }
    }

    match config.normalize_mode {
        NormalizeMode::Local => {
            for v in &mut values {
                *v = inverse_lerp(min_local, max_local, *v);
            }
            HeightMap::new(width, height, values, 0.0, 1.0)
        }
        NormalizeMode::Global => HeightMap::new(width, height, values, min_local, max_local),
    }
}
