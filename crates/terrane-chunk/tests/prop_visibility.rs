mod common;

use std::sync::Arc;

use common::{Recorder, pump, small_settings};
use proptest::prelude::*;
use terrane_chunk::{ChunkCoord, ChunkCtx, TerrainChunk};
use terrane_geom::Vec2;
use terrane_runtime::JobQueue;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(16))]

    // visibility follows the distance to the chunk bounds, never the center
    #[test]
    fn visible_iff_within_max_view(x in -200.0f32..200.0, y in -200.0f32..200.0) {
        let settings = Arc::new(small_settings());
        let max_view = settings.max_view_distance();
        let jobs = JobQueue::inline();
        let mut renderer = Recorder::default();
        let mut chunk = TerrainChunk::new(ChunkCoord::new(0, 0), 0, settings);
        chunk.load(&jobs);
        let viewer = Vec2::new(x, y);
        pump(&mut chunk, &jobs, &mut renderer, viewer);
        let mut ctx = ChunkCtx { jobs: &jobs, renderer: &mut renderer, viewer };
        chunk.evaluate(&mut ctx);
        prop_assert_eq!(chunk.is_visible(), chunk.bounds().distance(viewer) <= max_view);
    }
}
