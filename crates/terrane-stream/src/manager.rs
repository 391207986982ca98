use std::sync::Arc;

use crossbeam_channel::{Receiver, Sender, unbounded};
use hashbrown::{HashMap, HashSet};
use terrane_chunk::{
    ChunkCoord, ChunkCtx, ChunkJobOut, ChunkRenderer, TerrainChunk, TerrainSettings, VisibilityChange,
};
use terrane_geom::Vec2;
use terrane_runtime::JobQueue;

use crate::config::StreamingConfig;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamingStats {
    pub window_passes: u64,
    pub collision_passes: u64,
    pub chunks_created: u64,
    pub chunks_evicted: u64,
    pub results_applied: u64,
    pub stale_results: u64,
}

/// Owns the coordinate to chunk map and the visible set. Runs on the control thread only.
pub struct StreamingManager<R: ChunkRenderer> {
    settings: Arc<TerrainSettings>,
    config: StreamingConfig,
    jobs: JobQueue<ChunkJobOut>,
    renderer: R,
    chunks: HashMap<ChunkCoord, TerrainChunk>,
    visible: Vec<ChunkCoord>,
    vis_tx: Sender<VisibilityChange>,
    vis_rx: Receiver<VisibilityChange>,
    viewer: Vec2,
    viewer_at_last_pass: Option<Vec2>,
    chunk_world_size: f32,
    window_radius: i32,
    next_epoch: u64,
    stats: StreamingStats,
}

impl<R: ChunkRenderer> StreamingManager<R> {
    pub fn new(
        settings: Arc<TerrainSettings>,
        config: StreamingConfig,
        jobs: JobQueue<ChunkJobOut>,
        renderer: R,
    ) -> Self {
        let chunk_world_size = settings.chunk_world_size();
        let window_radius = (settings.max_view_distance() / chunk_world_size).ceil() as i32;
        let (vis_tx, vis_rx) = unbounded();
        log::info!(
            target: "stream",
            "streaming: chunk world size {:.1}, view {:.1}, window radius {}",
            chunk_world_size,
            settings.max_view_distance(),
            window_radius
        );
        Self {
            settings,
            config,
            jobs,
            renderer,
            chunks: HashMap::new(),
            visible: Vec::new(),
            vis_tx,
            vis_rx,
            viewer: Vec2::ZERO,
            viewer_at_last_pass: None,
            chunk_world_size,
            window_radius,
            next_epoch: 0,
            stats: StreamingStats::default(),
        }
    }

    /// One control-thread tick.
    pub fn update(&mut self, viewer: Vec2) {
        self.viewer = viewer;
        self.apply_completions();

        if self.viewer_at_last_pass.is_some_and(|old| old != viewer) {
            self.collision_pass();
        }

        let moved_enough = match self.viewer_at_last_pass {
            None => true,
            Some(old) => (old - viewer).length_squared() > self.config.sqr_viewer_move_threshold(),
        };
        if moved_enough {
            self.viewer_at_last_pass = Some(viewer);
            self.window_pass();
        }
    }

    /// Routes finished jobs to their chunk instance; results for replaced or evicted chunks are dropped.
    pub fn apply_completions(&mut self) -> usize {
        let mut ctx = ChunkCtx {
            jobs: &self.jobs,
            renderer: &mut self.renderer,
            viewer: self.viewer,
        };
        let mut applied = 0;
        for out in self.jobs.drain() {
            let (coord, epoch) = (out.coord(), out.epoch());
            let accepted = match self.chunks.get_mut(&coord) {
                Some(chunk) => chunk.apply(out, &mut ctx),
                None => false,
            };
            if accepted {
                applied += 1;
            } else {
                self.stats.stale_results += 1;
                log::trace!(target: "stream", "dropped result for {:?} epoch {}", coord, epoch);
            }
        }
        self.stats.results_applied += applied as u64;
        self.apply_visibility_changes();
        applied
    }

    fn collision_pass(&mut self) {
        let mut ctx = ChunkCtx {
            jobs: &self.jobs,
            renderer: &mut self.renderer,
            viewer: self.viewer,
        };
        for coord in &self.visible {
            if let Some(chunk) = self.chunks.get_mut(coord) {
                chunk.evaluate_collision(&mut ctx);
            }
        }
        self.stats.collision_passes += 1;
    }

    fn window_pass(&mut self) {
        let mut updated: HashSet<ChunkCoord> = HashSet::with_capacity(self.visible.len());
        {
            let mut ctx = ChunkCtx {
                jobs: &self.jobs,
                renderer: &mut self.renderer,
                viewer: self.viewer,
            };
            for coord in self.visible.iter().rev() {
                updated.insert(*coord);
                if let Some(chunk) = self.chunks.get_mut(coord) {
                    chunk.evaluate(&mut ctx);
                }
            }
        }

        let center = self.center_coord();
        let r = self.window_radius;
        for dy in -r..=r {
            for dx in -r..=r {
                let coord = ChunkCoord::new(center.x + dx, center.y + dy);
                if updated.contains(&coord) {
                    continue;
                }
                if let Some(chunk) = self.chunks.get_mut(&coord) {
                    let mut ctx = ChunkCtx {
                        jobs: &self.jobs,
                        renderer: &mut self.renderer,
                        viewer: self.viewer,
                    };
                    chunk.evaluate(&mut ctx);
                } else {
                    self.create_chunk(coord);
                }
            }
        }
        self.apply_visibility_changes();

        if let Some(radius) = self.config.evict_radius_chunks {
            self.evict_beyond(center, radius.max(self.window_radius));
        }
        self.stats.window_passes += 1;
        log::debug!(
            target: "stream",
            "window pass around {:?}: {} chunks, {} visible",
            center,
            self.chunks.len(),
            self.visible.len()
        );
    }

    fn create_chunk(&mut self, coord: ChunkCoord) {
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        let mut chunk = TerrainChunk::new(coord, epoch, Arc::clone(&self.settings));
        let tx = self.vis_tx.clone();
        chunk.subscribe(move |change| {
            let _ = tx.send(change);
        });
        chunk.load(&self.jobs);
        self.chunks.insert(coord, chunk);
        self.stats.chunks_created += 1;
    }

    fn apply_visibility_changes(&mut self) {
        for change in self.vis_rx.try_iter() {
            let current = self
                .chunks
                .get(&change.coord)
                .is_some_and(|c| c.epoch() == change.epoch);
            if !current {
                continue;
            }
            if change.visible {
                if !self.visible.contains(&change.coord) {
                    self.visible.push(change.coord);
                }
            } else {
                self.visible.retain(|c| *c != change.coord);
            }
        }
    }

    /// Unloads every chunk farther than `radius` (Chebyshev) from `center`. Returns how many went.
    pub fn evict_beyond(&mut self, center: ChunkCoord, radius: i32) -> usize {
        let doomed: Vec<ChunkCoord> = self
            .chunks
            .keys()
            .filter(|c| c.chebyshev(center) > radius)
            .copied()
            .collect();
        for coord in &doomed {
            if let Some(mut chunk) = self.chunks.remove(coord) {
                chunk.unload(&mut self.renderer);
            }
            self.visible.retain(|c| c != coord);
        }
        self.stats.chunks_evicted += doomed.len() as u64;
        if !doomed.is_empty() {
            log::debug!(target: "stream", "evicted {} chunks beyond {} of {:?}", doomed.len(), radius, center);
        }
        doomed.len()
    }

    /// Unloads everything, e.g. before rebuilding with new settings.
    pub fn clear(&mut self) {
        for (_, mut chunk) in self.chunks.drain() {
            chunk.unload(&mut self.renderer);
        }
        self.visible.clear();
        self.viewer_at_last_pass = None;
    }

    pub fn center_coord(&self) -> ChunkCoord {
        ChunkCoord::new(
            (self.viewer.x / self.chunk_world_size).round() as i32,
            (self.viewer.y / self.chunk_world_size).round() as i32,
        )
    }

    #[inline]
    pub fn window_radius(&self) -> i32 {
        self.window_radius
    }

    #[inline]
    pub fn stats(&self) -> StreamingStats {
        self.stats
    }

    pub fn chunk(&self, coord: ChunkCoord) -> Option<&TerrainChunk> {
        self.chunks.get(&coord)
    }

    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Visible chunks in the order they became visible.
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible
    }

    pub fn jobs(&self) -> &JobQueue<ChunkJobOut> {
        &self.jobs
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn settings(&self) -> &Arc<TerrainSettings> {
        &self.settings
    }

    pub fn config(&self) -> &StreamingConfig {
        &self.config
    }
}
