use serde::Deserialize;

pub const SUPPORTED_LOD_COUNT: usize = 5;
pub const SUPPORTED_CHUNK_SIZES: [usize; 10] = [24, 48, 72, 96, 120, 144, 168, 192, 216, 240];
/// Flat shading duplicates vertices per triangle, so only the smaller sizes are offered.
pub const SUPPORTED_FLAT_SHADED_CHUNK_SIZE_COUNT: usize = 4;

/// Lattice stride between retained vertices at `lod`.
#[inline]
pub fn skip_increment(lod: usize) -> usize {
    if lod == 0 { 1 } else { lod * 2 }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct MeshGeometryConfig {
    #[serde(default = "default_mesh_scale")]
    pub mesh_scale: f32,
    #[serde(default)]
    pub use_flat_shading: bool,
    #[serde(default = "default_chunk_size_index")]
    pub chunk_size_index: usize,
    #[serde(default = "default_flat_shaded_chunk_size_index")]
    pub flat_shaded_chunk_size_index: usize,
}

fn default_mesh_scale() -> f32 {
    2.5
}
fn default_chunk_size_index() -> usize {
    8
}
fn default_flat_shaded_chunk_size_index() -> usize {
    3
}

impl Default for MeshGeometryConfig {
    fn default() -> Self {
        Self {
            mesh_scale: default_mesh_scale(),
            use_flat_shading: false,
            chunk_size_index: default_chunk_size_index(),
            flat_shaded_chunk_size_index: default_flat_shaded_chunk_size_index(),
        }
    }
}

impl MeshGeometryConfig {
    /// Whether the size index for the active shading mode is in the supported list.
    pub fn is_supported(&self) -> bool {
        if self.use_flat_shading {
            self.flat_shaded_chunk_size_index < SUPPORTED_FLAT_SHADED_CHUNK_SIZE_COUNT
        } else {
            self.chunk_size_index < SUPPORTED_CHUNK_SIZES.len()
        }
    }

    /// Supported chunk size for the active shading mode.
    ///
    /// Panics on an unsupported index; callers validate configs up front.
    pub fn size_class(&self) -> usize {
        assert!(
            self.is_supported(),
            "unsupported chunk size index (flat shading: {})",
            self.use_flat_shading
        );
        if self.use_flat_shading {
            SUPPORTED_CHUNK_SIZES[self.flat_shaded_chunk_size_index]
        } else {
            SUPPORTED_CHUNK_SIZES[self.chunk_size_index]
        }
    }

    /// Side of the height/vertex grid: two border rings plus one boundary correction.
    #[inline]
    pub fn vertices_per_line(&self) -> usize {
        self.size_class() + 5
    }

    #[inline]
    pub fn mesh_world_size(&self) -> f32 {
        (self.vertices_per_line() - 3) as f32 * self.mesh_scale
    }
}
