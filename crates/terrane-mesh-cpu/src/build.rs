use terrane_geom::{Vec2, Vec3};
use terrane_noise::HeightMap;

use crate::layout::MeshLayout;
use crate::mesh_data::{MeshAccumulator, MeshData, VertexRef};
use crate::settings::{MeshGeometryConfig, SUPPORTED_LOD_COUNT, skip_increment};

/// Role of one lattice position in the mesh for a given stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum VertexClass {
    /// Outermost ring; only used for edge normals.
    Outside,
    /// Interior position dropped at this LOD.
    Skipped,
    /// Ring 1, always full resolution so neighbours share it.
    MeshEdge,
    /// Ring 2 position between two main vertices; height is interpolated.
    EdgeConnection,
    Main,
}

/// Classifies `(x, y)` on an `n`-wide lattice with stride `skip`.
pub fn classify_vertex(x: usize, y: usize, n: usize, skip: usize) -> VertexClass {
    let last = n - 1;
    if x == 0 || y == 0 || x == last || y == last {
        return VertexClass::Outside;
    }
    if x == 1 || y == 1 || x == n - 2 || y == n - 2 {
        return VertexClass::MeshEdge;
    }
    let on_stride = (x - 2) % skip == 0 && (y - 2) % skip == 0;
    if on_stride {
        return VertexClass::Main;
    }
    if x == 2 || y == 2 || x == n - 3 || y == n - 3 {
        VertexClass::EdgeConnection
    } else {
        VertexClass::Skipped
    }
}

/// Builds the chunk mesh for `lod` from a square height grid of `vertices_per_line` cells.
///
/// Panics if the grid does not match the configured size or `lod` is unsupported.
pub fn build_terrain_mesh(height_map: &HeightMap, config: &MeshGeometryConfig, lod: usize) -> MeshData {
    accumulate(height_map, config, lod).finish(config.use_flat_shading)
}

fn accumulate(height_map: &HeightMap, config: &MeshGeometryConfig, lod: usize) -> MeshAccumulator {
    assert!(lod < SUPPORTED_LOD_COUNT, "lod {lod} out of range");
    let n = config.vertices_per_line();
    assert!(
        height_map.width() == n && height_map.height() == n,
        "height map is {}x{}, mesh expects {n}x{n}",
        height_map.width(),
        height_map.height()
    );
    let skip = skip_increment(lod);
    let layout = MeshLayout::new(n, skip);
    let world_size = config.mesh_world_size();
    let top_left = Vec2::new(-1.0, 1.0) * world_size / 2.0;
    let span = (n - 3) as f32;

    let mut slots: Vec<Option<VertexRef>> = vec![None; n * n];
    let (mut mesh_i, mut border_i) = (0u32, 0u32);
    for y in 0..n {
        for x in 0..n {
            slots[y * n + x] = match classify_vertex(x, y, n, skip) {
                VertexClass::Skipped => None,
                VertexClass::Outside => {
                    border_i += 1;
                    Some(VertexRef::Border(border_i - 1))
                }
                _ => {
                    mesh_i += 1;
                    Some(VertexRef::Mesh(mesh_i - 1))
                }
            };
        }
    }
    debug_assert_eq!(mesh_i as usize, layout.vertex_count());
    debug_assert_eq!(border_i as usize, layout.border_vertex_count());

    let mut acc = MeshAccumulator::with_layout(&layout);
    for y in 0..n {
        for x in 0..n {
            let Some(at) = slots[y * n + x] else { continue };
            let class = classify_vertex(x, y, n, skip);
            let percent = Vec2::new(x as f32 - 1.0, y as f32 - 1.0) / span;
            let ground = top_left + Vec2::new(percent.x, -percent.y) * world_size;
            let height = if class == VertexClass::EdgeConnection {
                edge_connection_height(height_map, x, y, n, skip)
            } else {
                height_map.get(x, y)
            };
            acc.set_vertex(at, Vec3::new(ground.x, height, ground.y), percent);

            let emits = x < n - 1
                && y < n - 1
                && !(class == VertexClass::EdgeConnection && (x == 2 || y == 2));
            if !emits {
                continue;
            }
            let step = if class == VertexClass::Main && x != n - 3 && y != n - 3 {
                skip
            } else {
                1
            };
            let quad = [
                slots[y * n + x],
                slots[y * n + x + step],
                slots[(y + step) * n + x],
                slots[(y + step) * n + x + step],
            ];
            let [Some(a), Some(b), Some(c), Some(d)] = quad else {
                unreachable!("quad at ({x}, {y}) step {step} touches a skipped vertex");
            };
            acc.add_triangle(a, d, c);
            acc.add_triangle(d, a, b);
        }
    }

    log::trace!(
        "built mesh n={} lod={} verts={} tris={}",
        n,
        lod,
        layout.vertex_count(),
        layout.triangle_count()
    );
    acc
}

/// Height on ring 2 interpolated between the bracketing main vertices.
fn edge_connection_height(map: &HeightMap, x: usize, y: usize, n: usize, skip: usize) -> f32 {
    let vertical = x == 2 || x == n - 3;
    let along = if vertical { y - 2 } else { x - 2 };
    let dist_a = along % skip;
    let dist_b = skip - dist_a;
    let t = dist_a as f32 / skip as f32;
    let (a, b) = if vertical {
        (map.get(x, y - dist_a), map.get(x, y + dist_b))
    } else {
        (map.get(x - dist_a, y), map.get(x + dist_b, y))
    };
    a * (1.0 - t) + b * t
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flat_map(n: usize) -> HeightMap {
        HeightMap::new(n, n, vec![0.0; n * n], 0.0, 0.0)
    }

    #[test]
    fn border_buffers_match_closed_form() {
        for size_index in 0..4 {
            let config = MeshGeometryConfig {
                chunk_size_index: size_index,
                ..MeshGeometryConfig::default()
            };
            let n = config.vertices_per_line();
            for lod in 0..SUPPORTED_LOD_COUNT {
                let layout = MeshLayout::new(n, skip_increment(lod));
                let acc = accumulate(&flat_map(n), &config, lod);
                let (verts, tris) = acc.border_counts();
                assert_eq!(verts, layout.border_vertex_count());
                assert_eq!(tris, layout.border_triangle_count(), "n={n} lod={lod}");
            }
        }
    }

    #[test]
    fn classification_rings() {
        let n = 29;
        assert_eq!(classify_vertex(0, 5, n, 2), VertexClass::Outside);
        assert_eq!(classify_vertex(1, 1, n, 2), VertexClass::MeshEdge);
        assert_eq!(classify_vertex(n - 2, 7, n, 2), VertexClass::MeshEdge);
        assert_eq!(classify_vertex(2, 2, n, 2), VertexClass::Main);
        assert_eq!(classify_vertex(2, 3, n, 2), VertexClass::EdgeConnection);
        assert_eq!(classify_vertex(3, 3, n, 2), VertexClass::Skipped);
        assert_eq!(classify_vertex(4, 4, n, 2), VertexClass::Main);
        assert_eq!(classify_vertex(3, 3, n, 1), VertexClass::Main);
    }

    #[test]
    fn flat_terrain_normals_point_up() {
        let config = MeshGeometryConfig {
            chunk_size_index: 0,
            ..MeshGeometryConfig::default()
        };
        let mesh = build_terrain_mesh(&flat_map(29), &config, 1);
        for n in mesh.normals() {
            assert!((n - Vec3::UP).length() < 1e-5, "{n:?}");
        }
    }

    #[test]
    #[should_panic]
    fn mismatched_grid_panics() {
        let config = MeshGeometryConfig {
            chunk_size_index: 0,
            ..MeshGeometryConfig::default()
        };
        let _ = build_terrain_mesh(&flat_map(30), &config, 0);
    }
}
