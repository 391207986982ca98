use serde::Deserialize;
use terrane_mesh_cpu::MeshGeometryConfig;
use terrane_noise::HeightMapConfig;

/// One detail tier: which mesh LOD to show and out to what distance (in unscaled units).
#[derive(Clone, Copy, Debug, Deserialize, PartialEq)]
pub struct LodLevel {
    pub lod: usize,
    pub visible_distance_threshold: f32,
}

impl LodLevel {
    pub const fn new(lod: usize, visible_distance_threshold: f32) -> Self {
        Self {
            lod,
            visible_distance_threshold,
        }
    }

    #[inline]
    pub fn sqr_visible_distance_threshold(&self) -> f32 {
        self.visible_distance_threshold * self.visible_distance_threshold
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct LodSettings {
    #[serde(default = "default_levels")]
    pub levels: Vec<LodLevel>,
    #[serde(default)]
    pub collider_lod_index: usize,
}

fn default_levels() -> Vec<LodLevel> {
    vec![
        LodLevel::new(0, 100.0),
        LodLevel::new(1, 200.0),
        LodLevel::new(4, 300.0),
    ]
}

impl Default for LodSettings {
    fn default() -> Self {
        Self {
            levels: default_levels(),
            collider_lod_index: 0,
        }
    }
}

impl LodSettings {
    /// Farthest distance at which a chunk stays visible.
    pub fn max_view_distance(&self, mesh_scale: f32) -> f32 {
        self.levels
            .last()
            .map(|l| l.visible_distance_threshold * mesh_scale)
            .unwrap_or(0.0)
    }
}

/// Everything a chunk needs to generate itself. Shared read-only between chunks and jobs.
#[derive(Clone, Debug, PartialEq)]
pub struct TerrainSettings {
    pub height: HeightMapConfig,
    pub mesh: MeshGeometryConfig,
    pub lods: LodSettings,
    /// Viewer distance under which the collider mesh is attached.
    pub collider_generation_distance: f32,
}

pub const DEFAULT_COLLIDER_GENERATION_DISTANCE: f32 = 50.0;

impl Default for TerrainSettings {
    fn default() -> Self {
        Self {
            height: HeightMapConfig::default(),
            mesh: MeshGeometryConfig::default(),
            lods: LodSettings::default(),
            collider_generation_distance: DEFAULT_COLLIDER_GENERATION_DISTANCE,
        }
    }
}

impl TerrainSettings {
    #[inline]
    pub fn chunk_world_size(&self) -> f32 {
        self.mesh.mesh_world_size()
    }

    #[inline]
    pub fn max_view_distance(&self) -> f32 {
        self.lods.max_view_distance(self.mesh.mesh_scale)
    }
}
