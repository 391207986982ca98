use std::error::Error;
use std::path::Path;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use terrane_chunk::ChunkJobOut;
use terrane_geom::Vec2;
use terrane_runtime::JobQueue;
use terrane_stream::StreamingManager;

use crate::cli::StreamArgs;
use crate::config::{TerrainConfig, load_config};
use crate::renderer::LoggingRenderer;
use crate::watcher::ConfigWatcher;

const SETTLE_TIMEOUT: Duration = Duration::from_secs(30);

pub fn build_manager(
    config: &TerrainConfig,
    workers: Option<usize>,
) -> Result<StreamingManager<LoggingRenderer>, Box<dyn Error>> {
    let jobs: JobQueue<ChunkJobOut> = match workers.or(config.streaming.workers) {
        Some(n) => JobQueue::new(n)?,
        None => JobQueue::with_available_parallelism()?,
    };
    Ok(StreamingManager::new(
        Arc::new(config.terrain_settings()),
        config.streaming_config(),
        jobs,
        LoggingRenderer::default(),
    ))
}

fn log_progress(tick: u32, viewer: Vec2, manager: &StreamingManager<LoggingRenderer>) {
    let stats = manager.stats();
    let (queued, inflight) = manager.jobs().queue_debug_counts();
    log::info!(
        target: "stream",
        "tick {tick} viewer ({:.0}, {:.0}) chunks {} visible {} | passes {} window / {} collision | jobs q{} r{}",
        viewer.x,
        viewer.y,
        manager.chunk_count(),
        manager.visible_chunks().len(),
        stats.window_passes,
        stats.collision_passes,
        queued,
        inflight
    );
}

/// Applies outstanding work until the queue is quiet. Returns false on timeout.
fn settle(manager: &mut StreamingManager<LoggingRenderer>) -> bool {
    let deadline = Instant::now() + SETTLE_TIMEOUT;
    loop {
        let remaining = deadline.saturating_duration_since(Instant::now());
        if !manager.jobs().wait_idle(remaining) {
            return false;
        }
        manager.apply_completions();
        if manager.jobs().pending() == 0 {
            return true;
        }
    }
}

/// Headless viewer walk along +X.
pub fn run_stream(
    args: &StreamArgs,
    config_path: Option<&Path>,
    config: TerrainConfig,
) -> Result<(), Box<dyn Error>> {
    let watcher = match (args.watch, config_path) {
        (false, _) => None,
        (true, Some(path)) => Some(ConfigWatcher::new(path)?),
        (true, None) => return Err("--watch needs --config".into()),
    };

    let mut config = config;
    let mut manager = build_manager(&config, args.workers)?;
    let tick = Duration::from_millis(args.tick_ms);
    let mut viewer = Vec2::ZERO;

    for t in 0..args.ticks {
        if let (Some(watcher), Some(path)) = (&watcher, config_path) {
            if watcher.take_changed() {
                match load_config(path) {
                    Ok(next) => {
                        manager.clear();
                        config = next;
                        manager = build_manager(&config, args.workers)?;
                        log::info!("config changed, world rebuilt");
                    }
                    Err(e) => log::warn!("keeping previous config: {e}"),
                }
            }
        }
        manager.update(viewer);
        if t % 60 == 0 {
            log_progress(t, viewer, &manager);
        }
        viewer.x += args.speed;
        if !tick.is_zero() {
            thread::sleep(tick);
        }
    }

    if !settle(&mut manager) {
        log::warn!("background work still running after {:?}", SETTLE_TIMEOUT);
    }
    let stats = manager.stats();
    let scene = manager.renderer().summary();
    log::info!(
        "done: {} created, {} evicted, {} results ({} stale), {} visible, {} colliders, {} visible triangles",
        stats.chunks_created,
        stats.chunks_evicted,
        stats.results_applied,
        stats.stale_results,
        scene.visible,
        scene.colliders,
        scene.visible_triangles
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use terrane_chunk::{ChunkCoord, LodLevel};

    fn small_config() -> TerrainConfig {
        let mut config = TerrainConfig::default();
        config.mesh.chunk_size_index = 0;
        config.lod.levels = vec![LodLevel::new(0, 24.0)];
        config
    }

    #[test]
    fn walk_settles_with_meshes_on_screen() {
        let mut manager = build_manager(&small_config(), Some(2)).unwrap();
        manager.update(Vec2::ZERO);
        assert!(settle(&mut manager));
        let scene = manager.renderer().summary();
        assert_eq!(manager.chunk_count(), 9);
        assert_eq!(scene.visible, 9);
        assert_eq!(scene.meshes, 9);
        assert!(scene.colliders >= 1);
        assert_eq!(manager.renderer().display_lod(ChunkCoord::new(0, 0)), Some(0));
    }

    #[test]
    fn short_run_completes() {
        let args = StreamArgs {
            ticks: 5,
            speed: 20.0,
            tick_ms: 0,
            workers: Some(1),
            watch: false,
        };
        run_stream(&args, None, small_config()).unwrap();
    }

    #[test]
    fn watch_needs_a_config_path() {
        let args = StreamArgs {
            ticks: 1,
            speed: 1.0,
            tick_ms: 0,
            workers: Some(1),
            watch: true,
        };
        assert!(run_stream(&args, None, small_config()).is_err());
    }
}
