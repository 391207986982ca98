//! Per-chunk lifecycle: height map request, lazy per-LOD meshes, visibility and collider promotion.
#![forbid(unsafe_code)]

mod chunk;
mod job;
mod settings;

pub use chunk::{ChunkCtx, ChunkRenderer, ChunkState, ListenerId, TerrainChunk, VisibilityChange};
pub use job::{ChunkCoord, ChunkJobOut};
pub use settings::{DEFAULT_COLLIDER_GENERATION_DISTANCE, LodLevel, LodSettings, TerrainSettings};
