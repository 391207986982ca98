use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use terrane_chunk::{ChunkCoord, ChunkRenderer, LodLevel, LodSettings, TerrainSettings};
use terrane_geom::Vec2;
use terrane_mesh_cpu::{MeshData, MeshGeometryConfig};
use terrane_runtime::JobQueue;
use terrane_stream::{StreamingConfig, StreamingManager};

#[derive(Default)]
struct CountingRenderer {
    shown: usize,
    hidden: usize,
    displays: usize,
    colliders: usize,
    released: Vec<ChunkCoord>,
}

impl ChunkRenderer for CountingRenderer {
    fn set_visible(&mut self, _coord: ChunkCoord, visible: bool) {
        if visible {
            self.shown += 1;
        } else {
            self.hidden += 1;
        }
    }
    fn assign_display_mesh(&mut self, _coord: ChunkCoord, _lod_index: usize, _mesh: &Arc<MeshData>) {
        self.displays += 1;
    }
    fn assign_collision_mesh(&mut self, _coord: ChunkCoord, _mesh: &Arc<MeshData>) {
        self.colliders += 1;
    }
    fn release(&mut self, coord: ChunkCoord) {
        self.released.push(coord);
    }
}

/// 65-unit chunks with a single tier reaching 60 units: a 3x3 window.
fn one_tier_settings() -> Arc<TerrainSettings> {
    Arc::new(TerrainSettings {
        mesh: MeshGeometryConfig {
            chunk_size_index: 0,
            ..MeshGeometryConfig::default()
        },
        lods: LodSettings {
            levels: vec![LodLevel::new(0, 24.0)],
            collider_lod_index: 0,
        },
        ..TerrainSettings::default()
    })
}

fn inline_manager(config: StreamingConfig) -> StreamingManager<CountingRenderer> {
    StreamingManager::new(
        one_tier_settings(),
        config,
        JobQueue::inline(),
        CountingRenderer::default(),
    )
}

#[test]
fn first_pass_fills_a_three_by_three_window() {
    let mut m = inline_manager(StreamingConfig::default());
    assert_eq!(m.window_radius(), 1);
    m.update(Vec2::ZERO);
    assert_eq!(m.stats().window_passes, 1);
    assert_eq!(m.stats().chunks_created, 9);
    assert_eq!(m.chunk_count(), 9);
    assert!(m.visible_chunks().is_empty());

    m.update(Vec2::ZERO);
    assert_eq!(m.stats().window_passes, 1);
    assert_eq!(m.visible_chunks().len(), 9);
    assert_eq!(m.renderer().shown, 9);
    for y in -1..=1 {
        for x in -1..=1 {
            assert!(m.chunk(ChunkCoord::new(x, y)).is_some_and(|c| c.is_visible()));
        }
    }

    m.update(Vec2::ZERO);
    assert_eq!(m.renderer().displays, 9);
}

#[test]
fn pooled_first_pass_makes_nine_visible() {
    let jobs = JobQueue::new(2).unwrap();
    let mut m = StreamingManager::new(
        one_tier_settings(),
        StreamingConfig::default(),
        jobs,
        CountingRenderer::default(),
    );
    m.update(Vec2::ZERO);
    assert!(m.jobs().wait_idle(Duration::from_secs(30)));
    m.update(Vec2::ZERO);
    assert_eq!(m.stats().chunks_created, 9);
    assert_eq!(m.visible_chunks().len(), 9);
}

#[test]
fn small_moves_only_run_collision_passes() {
    let mut m = inline_manager(StreamingConfig::default());
    m.update(Vec2::ZERO);
    m.update(Vec2::ZERO);
    assert_eq!(m.stats().collision_passes, 0);

    m.update(Vec2::new(10.0, 0.0));
    let stats = m.stats();
    assert_eq!(stats.window_passes, 1);
    assert_eq!(stats.collision_passes, 1);
    assert_eq!(stats.chunks_created, 9);

    // 15 exactly is not past the threshold
    m.update(Vec2::new(0.0, 15.0));
    assert_eq!(m.stats().window_passes, 1);
    assert_eq!(m.stats().collision_passes, 2);
}

#[test]
fn large_moves_extend_the_window() {
    let mut m = inline_manager(StreamingConfig::default());
    m.update(Vec2::ZERO);
    m.update(Vec2::new(70.0, 0.0));
    assert_eq!(m.stats().window_passes, 2);
    assert_eq!(m.center_coord(), ChunkCoord::new(1, 0));
    assert_eq!(m.stats().chunks_created, 12);
    assert!(m.chunk(ChunkCoord::new(2, 1)).is_some());
}

#[test]
fn collider_attaches_near_the_viewer() {
    let mut m = inline_manager(StreamingConfig::default());
    m.update(Vec2::ZERO);
    m.update(Vec2::ZERO);
    m.update(Vec2::ZERO);
    // meshes are cached now; a small move runs the collision pass
    m.update(Vec2::new(1.0, 0.0));
    let colliders = m.renderer().colliders;
    assert!(colliders >= 1, "{colliders}");
    assert!(m.chunk(ChunkCoord::new(0, 0)).is_some_and(|c| c.has_collider()));
}

#[test]
fn chunks_outside_the_eviction_radius_are_dropped() {
    let mut m = inline_manager(StreamingConfig {
        evict_radius_chunks: Some(1),
        ..StreamingConfig::default()
    });
    m.update(Vec2::ZERO);
    m.update(Vec2::new(200.0, 0.0));
    assert_eq!(m.center_coord(), ChunkCoord::new(3, 0));
    let stats = m.stats();
    assert_eq!(stats.chunks_created, 18);
    assert_eq!(stats.chunks_evicted, 9);
    assert_eq!(m.chunk_count(), 9);
    assert_eq!(m.renderer().released.len(), 9);
    assert!(m.renderer().released.iter().all(|c| c.x <= 1));
    assert!(m.visible_chunks().iter().all(|c| c.x >= 2));
}

#[test]
fn results_for_evicted_chunks_are_dropped() {
    let mut m = inline_manager(StreamingConfig::default());
    m.update(Vec2::ZERO);
    assert_eq!(m.evict_beyond(ChunkCoord::new(0, 0), 0), 8);
    m.update(Vec2::ZERO);
    let stats = m.stats();
    assert_eq!(stats.stale_results, 8);
    assert_eq!(stats.results_applied, 1);
    assert_eq!(m.visible_chunks(), &[ChunkCoord::new(0, 0)]);

    // coming back recreates them under fresh epochs
    m.update(Vec2::new(0.0, 20.0));
    assert_eq!(m.stats().chunks_created, 17);
    let epoch = m.chunk(ChunkCoord::new(1, 1)).map(|c| c.epoch());
    assert!(epoch.is_some_and(|e| e >= 9));
}

#[test]
fn visible_set_stays_consistent_on_a_long_walk() {
    for evict in [None, Some(2)] {
        let mut m = inline_manager(StreamingConfig {
            evict_radius_chunks: evict,
            ..StreamingConfig::default()
        });
        let mut viewer = Vec2::ZERO;
        for _ in 0..120 {
            m.update(viewer);
            viewer = viewer + Vec2::new(9.0, 4.0);

            let listed = m.visible_chunks();
            let unique: HashSet<ChunkCoord> = listed.iter().copied().collect();
            assert_eq!(unique.len(), listed.len(), "{evict:?}: duplicate visible entry");
            for coord in listed {
                assert!(
                    m.chunk(*coord).is_some_and(|c| c.is_visible()),
                    "{evict:?}: {coord:?} listed but not visible"
                );
            }
        }
        let stats = m.stats();
        assert!(stats.results_applied > 0);
        if evict.is_some() {
            assert!(stats.chunks_evicted > 0);
            assert!(m.chunk_count() <= 25);
        }
    }
}

#[test]
fn clear_releases_everything() {
    let mut m = inline_manager(StreamingConfig::default());
    m.update(Vec2::ZERO);
    m.update(Vec2::ZERO);
    m.clear();
    assert_eq!(m.chunk_count(), 0);
    assert!(m.visible_chunks().is_empty());
    assert_eq!(m.renderer().released.len(), 9);
    assert_eq!(m.renderer().hidden, 9);
}

#[test]
fn streaming_config_from_toml() {
    let cfg: StreamingConfig = toml::from_str("evict_radius_chunks = 4").unwrap();
    assert_eq!(cfg.evict_radius_chunks, Some(4));
    assert_eq!(cfg.viewer_move_threshold, 15.0);
    assert_eq!(cfg.sqr_viewer_move_threshold(), 225.0);
}
