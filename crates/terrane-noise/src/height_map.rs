use serde::Deserialize;
use terrane_geom::Vec2;

use crate::curve::HeightCurve;
use crate::falloff::generate_falloff_map;
use crate::noise::{NoiseConfig, generate_noise_map};

/// Immutable square-or-rectangular grid of heights, row-major (`y * width + x`).
#[derive(Clone, Debug, PartialEq)]
pub struct HeightMap {
    width: usize,
    height: usize,
    values: Vec<f32>,
    min_value: f32,
    max_value: f32,
}

impl HeightMap {
    pub fn new(width: usize, height: usize, values: Vec<f32>, min_value: f32, max_value: f32) -> Self {
        assert_eq!(
            values.len(),
            width * height,
            "height map needs {width}x{height} values"
        );
        Self {
            width,
            height,
            values,
            min_value,
            max_value,
        }
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn get(&self, x: usize, y: usize) -> f32 {
        self.values[y * self.width + x]
    }

    #[inline]
    pub fn values(&self) -> &[f32] {
        &self.values
    }

    #[inline]
    pub fn min_value(&self) -> f32 {
        self.min_value
    }

    #[inline]
    pub fn max_value(&self) -> f32 {
        self.max_value
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HeightMapConfig {
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f32,
    #[serde(default)]
    pub height_curve: HeightCurve,
}

fn default_height_multiplier() -> f32 {
    20.0
}

impl Default for HeightMapConfig {
    fn default() -> Self {
        Self {
            noise: NoiseConfig::default(),
            height_multiplier: default_height_multiplier(),
            height_curve: HeightCurve::default(),
        }
    }
}

impl HeightMapConfig {
    pub fn validated(&self) -> Self {
        Self {
            noise: self.noise.validated(),
            ..self.clone()
        }
    }

    /// Lowest height the curve can produce, for shading ranges.
    pub fn min_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(0.0)
    }

    pub fn max_height(&self) -> f32 {
        self.height_multiplier * self.height_curve.evaluate(1.0)
    }
}

/// Noise grid shaped into world heights: optional falloff, then
/// `v * curve(v) * multiplier`. Min/max are taken from the final values.
pub fn generate_height_map(
    width: usize,
    height: usize,
    config: &HeightMapConfig,
    sample_center: Vec2,
) -> HeightMap {
    let noise = generate_noise_map(width, height, &config.noise, sample_center);
    let falloff = if config.noise.use_falloff {
        assert_eq!(width, height, "falloff requires a square grid");
        Some(generate_falloff_map(width))
    } else {
        None
    };

    let mut values = noise.values().to_vec();
    let mut min_value = f32::MAX;
    let mut max_value = f32::MIN;
    for (i, v) in values.iter_mut().enumerate() {
        if let Some(mask) = &falloff {
            *v = (*v - mask.values()[i]).clamp(0.0, 1.0);
        }
        *v *= config.height_curve.evaluate(*v) * config.height_multiplier;
        min_value = min_value.min(*v);
        max_value = max_value.max(*v);
    }
    HeightMap::new(width, height, values, min_value, max_value)
}
