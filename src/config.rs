use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use terrane_chunk::{DEFAULT_COLLIDER_GENERATION_DISTANCE, LodSettings, TerrainSettings};
use terrane_mesh_cpu::{MeshGeometryConfig, SUPPORTED_LOD_COUNT};
use terrane_noise::{HeightCurve, HeightMapConfig, NoiseConfig};
use terrane_stream::StreamingConfig;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("chunk size index {index} is not supported (flat shading: {flat_shading})")]
    UnsupportedChunkSize { index: usize, flat_shading: bool },
    #[error("at least one LOD tier is required")]
    NoLodLevels,
    #[error("collider tier {index} is out of range for {count} tiers")]
    ColliderTierOutOfRange { index: usize, count: usize },
    #[error("tier {tier} uses lod {lod}; supported lods are 0..{max}")]
    LodOutOfRange { tier: usize, lod: usize, max: usize },
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct HeightSection {
    #[serde(default = "default_height_multiplier")]
    pub height_multiplier: f32,
    #[serde(default)]
    pub height_curve: HeightCurve,
    #[serde(default)]
    pub use_falloff: bool,
}

fn default_height_multiplier() -> f32 {
    HeightMapConfig::default().height_multiplier
}

impl Default for HeightSection {
    fn default() -> Self {
        Self {
            height_multiplier: default_height_multiplier(),
            height_curve: HeightCurve::default(),
            use_falloff: false,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StreamingSection {
    #[serde(default = "default_viewer_move_threshold")]
    pub viewer_move_threshold: f32,
    #[serde(default = "default_collider_generation_distance")]
    pub collider_generation_distance: f32,
    #[serde(default)]
    pub evict_radius_chunks: Option<i32>,
    #[serde(default)]
    pub workers: Option<usize>,
}

fn default_viewer_move_threshold() -> f32 {
    StreamingConfig::default().viewer_move_threshold
}
fn default_collider_generation_distance() -> f32 {
    DEFAULT_COLLIDER_GENERATION_DISTANCE
}

impl Default for StreamingSection {
    fn default() -> Self {
        Self {
            viewer_move_threshold: default_viewer_move_threshold(),
            collider_generation_distance: default_collider_generation_distance(),
            evict_radius_chunks: None,
            workers: None,
        }
    }
}

/// Whole terrain config file.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct TerrainConfig {
    #[serde(default)]
    pub noise: NoiseConfig,
    #[serde(default)]
    pub height: HeightSection,
    #[serde(default)]
    pub mesh: MeshGeometryConfig,
    #[serde(default)]
    pub lod: LodSettings,
    #[serde(default)]
    pub streaming: StreamingSection,
}

impl TerrainConfig {
    pub fn from_toml_str(s: &str) -> Result<Self, ConfigError> {
        let cfg: TerrainConfig = toml::from_str(s)?;
        cfg.validated()
    }

    /// Clamps noise fields and rejects mesh/LOD settings the mesher cannot build.
    pub fn validated(mut self) -> Result<Self, ConfigError> {
        self.noise = self.noise.validated();
        if !self.mesh.is_supported() {
            let index = if self.mesh.use_flat_shading {
                self.mesh.flat_shaded_chunk_size_index
            } else {
                self.mesh.chunk_size_index
            };
            return Err(ConfigError::UnsupportedChunkSize {
                index,
                flat_shading: self.mesh.use_flat_shading,
            });
        }
        let levels = &self.lod.levels;
        if levels.is_empty() {
            return Err(ConfigError::NoLodLevels);
        }
        if self.lod.collider_lod_index >= levels.len() {
            return Err(ConfigError::ColliderTierOutOfRange {
                index: self.lod.collider_lod_index,
                count: levels.len(),
            });
        }
        for (tier, level) in levels.iter().enumerate() {
            if level.lod >= SUPPORTED_LOD_COUNT {
                return Err(ConfigError::LodOutOfRange {
                    tier,
                    lod: level.lod,
                    max: SUPPORTED_LOD_COUNT,
                });
            }
        }
        if levels
            .windows(2)
            .any(|w| w[1].visible_distance_threshold < w[0].visible_distance_threshold)
        {
            log::warn!("LOD thresholds are not ascending; later tiers may never be selected");
        }
        Ok(self)
    }

    pub fn terrain_settings(&self) -> TerrainSettings {
        let mut noise = self.noise.clone();
        noise.use_falloff |= self.height.use_falloff;
        TerrainSettings {
            height: HeightMapConfig {
                noise,
                height_multiplier: self.height.height_multiplier,
                height_curve: self.height.height_curve.clone(),
            },
            mesh: self.mesh.clone(),
            lods: self.lod.clone(),
            collider_generation_distance: self.streaming.collider_generation_distance,
        }
    }

    pub fn streaming_config(&self) -> StreamingConfig {
        StreamingConfig {
            viewer_move_threshold: self.streaming.viewer_move_threshold,
            evict_radius_chunks: self.streaming.evict_radius_chunks,
        }
    }
}

pub fn load_config(path: &Path) -> Result<TerrainConfig, ConfigError> {
    let s = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let cfg = TerrainConfig::from_toml_str(&s)?;
    log::info!("loaded terrain config from {}", path.display());
    Ok(cfg)
}
