use std::sync::Arc;

use terrane_mesh_cpu::MeshData;
use terrane_noise::HeightMap;

/// Integer lattice coordinate of a chunk.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ChunkCoord {
    pub x: i32,
    pub y: i32,
}

impl ChunkCoord {
    #[inline]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Chebyshev (king-move) distance.
    #[inline]
    pub fn chebyshev(self, other: ChunkCoord) -> i32 {
        (self.x - other.x).abs().max((self.y - other.y).abs())
    }
}

/// Completed background work addressed to one chunk instance.
#[derive(Clone, Debug)]
pub enum ChunkJobOut {
    HeightMap {
        coord: ChunkCoord,
        epoch: u64,
        map: Arc<HeightMap>,
    },
    Mesh {
        coord: ChunkCoord,
        epoch: u64,
        lod_index: usize,
        mesh: Arc<MeshData>,
    },
}

impl ChunkJobOut {
    pub fn coord(&self) -> ChunkCoord {
        match self {
            ChunkJobOut::HeightMap { coord, .. } | ChunkJobOut::Mesh { coord, .. } => *coord,
        }
    }

    pub fn epoch(&self) -> u64 {
        match self {
            ChunkJobOut::HeightMap { epoch, .. } | ChunkJobOut::Mesh { epoch, .. } => *epoch,
        }
    }
}
