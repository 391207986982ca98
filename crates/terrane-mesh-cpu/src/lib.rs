//! CPU terrain meshing: LOD grids with border normals and seam stitching (engine-only).
#![forbid(unsafe_code)]

mod build;
mod layout;
mod mesh_data;
mod settings;

pub use build::{VertexClass, build_terrain_mesh, classify_vertex};
pub use layout::MeshLayout;
pub use mesh_data::MeshData;
pub use settings::{
    MeshGeometryConfig, SUPPORTED_CHUNK_SIZES, SUPPORTED_FLAT_SHADED_CHUNK_SIZE_COUNT,
    SUPPORTED_LOD_COUNT, skip_increment,
};
