use std::sync::Arc;

use hashbrown::{HashMap, HashSet};
use terrane_chunk::{ChunkCoord, ChunkRenderer};
use terrane_mesh_cpu::MeshData;

/// Headless scene: remembers what would be on screen and logs transitions.
#[derive(Default)]
pub struct LoggingRenderer {
    visible: HashSet<ChunkCoord>,
    display: HashMap<ChunkCoord, (usize, Arc<MeshData>)>,
    colliders: HashSet<ChunkCoord>,
    released: u64,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SceneSummary {
    pub visible: usize,
    pub meshes: usize,
    pub colliders: usize,
    pub released: u64,
    /// Triangles across visible chunks' display meshes.
    pub visible_triangles: usize,
}

impl LoggingRenderer {
    pub fn summary(&self) -> SceneSummary {
        let visible_triangles = self
            .visible
            .iter()
            .filter_map(|c| self.display.get(c))
            .map(|(_, mesh)| mesh.triangle_count())
            .sum();
        SceneSummary {
            visible: self.visible.len(),
            meshes: self.display.len(),
            colliders: self.colliders.len(),
            released: self.released,
            visible_triangles,
        }
    }

    pub fn display_lod(&self, coord: ChunkCoord) -> Option<usize> {
        self.display.get(&coord).map(|(lod, _)| *lod)
    }
}

impl ChunkRenderer for LoggingRenderer {
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        if visible {
            self.visible.insert(coord);
        } else {
            self.visible.remove(&coord);
        }
        log::trace!(target: "render", "{:?} visible={}", coord, visible);
    }

    fn assign_display_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>) {
        log::debug!(
            target: "render",
            "{:?} tier {} ({} tris)",
            coord,
            lod_index,
            mesh.triangle_count()
        );
        self.display.insert(coord, (lod_index, Arc::clone(mesh)));
    }

    fn assign_collision_mesh(&mut self, coord: ChunkCoord, _mesh: &Arc<MeshData>) {
        log::debug!(target: "render", "{:?} collider attached", coord);
        self.colliders.insert(coord);
    }

    fn release(&mut self, coord: ChunkCoord) {
        self.visible.remove(&coord);
        self.display.remove(&coord);
        self.colliders.remove(&coord);
        self.released += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn release_forgets_the_chunk() {
        let mut r = LoggingRenderer::default();
        let c = ChunkCoord::new(1, -2);
        let mesh = Arc::new(MeshData::default());
        r.set_visible(c, true);
        r.assign_display_mesh(c, 2, &mesh);
        r.assign_collision_mesh(c, &mesh);
        assert_eq!(r.display_lod(c), Some(2));
        assert_eq!(
            r.summary(),
            SceneSummary {
                visible: 1,
                meshes: 1,
                colliders: 1,
                released: 0,
                visible_triangles: 0
            }
        );
        r.release(c);
        assert_eq!(r.display_lod(c), None);
        assert_eq!(
            r.summary(),
            SceneSummary {
                released: 1,
                ..SceneSummary::default()
            }
        );
    }
}
