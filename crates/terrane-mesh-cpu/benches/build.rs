use std::hint::black_box;

use criterion::{Criterion, criterion_group, criterion_main};
use terrane_geom::Vec2;
use terrane_mesh_cpu::{MeshGeometryConfig, build_terrain_mesh};
use terrane_noise::{HeightMapConfig, generate_height_map};

fn bench_build_terrain_mesh(c: &mut Criterion) {
    let mut group = c.benchmark_group("build_terrain_mesh");
    let height = HeightMapConfig::default();
    for (label, flat, size_index) in [("smooth_240", false, 9), ("flat_96", true, 3)] {
        let config = MeshGeometryConfig {
            use_flat_shading: flat,
            chunk_size_index: size_index,
            flat_shaded_chunk_size_index: size_index,
            ..MeshGeometryConfig::default()
        };
        let n = config.vertices_per_line();
        let map = generate_height_map(n, n, &height, Vec2::ZERO);
        for lod in [0, 2, 4] {
            group.bench_function(format!("{label}_lod{lod}"), |b| {
                b.iter(|| black_box(build_terrain_mesh(&map, &config, lod)))
            });
        }
    }
    group.finish();
}

fn bench_generate_height_map(c: &mut Criterion) {
    let height = HeightMapConfig::default();
    c.bench_function("generate_height_map_245", |b| {
        b.iter(|| black_box(generate_height_map(245, 245, &height, Vec2::new(245.0, -490.0))))
    });
}

criterion_group!(benches, bench_build_terrain_mesh, bench_generate_height_map);
criterion_main!(benches);
