#![allow(dead_code)]

use std::sync::Arc;

use terrane_chunk::{
    ChunkCoord, ChunkCtx, ChunkJobOut, ChunkRenderer, LodLevel, LodSettings, TerrainChunk,
    TerrainSettings,
};
use terrane_geom::Vec2;
use terrane_mesh_cpu::{MeshData, MeshGeometryConfig};
use terrane_runtime::JobQueue;

#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    Visible(ChunkCoord, bool),
    Display(ChunkCoord, usize),
    Collision(ChunkCoord),
    Release(ChunkCoord),
}

#[derive(Default)]
pub struct Recorder {
    pub events: Vec<Event>,
}

impl Recorder {
    pub fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl ChunkRenderer for Recorder {
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool) {
        self.events.push(Event::Visible(coord, visible));
    }
    fn assign_display_mesh(&mut self, coord: ChunkCoord, lod_index: usize, _mesh: &Arc<MeshData>) {
        self.events.push(Event::Display(coord, lod_index));
    }
    fn assign_collision_mesh(&mut self, coord: ChunkCoord, _mesh: &Arc<MeshData>) {
        self.events.push(Event::Collision(coord));
    }
    fn release(&mut self, coord: ChunkCoord) {
        self.events.push(Event::Release(coord));
    }
}

/// 29-vertex chunks (65 world units), tiers out to 25 and 60.
pub fn small_settings() -> TerrainSettings {
    TerrainSettings {
        mesh: MeshGeometryConfig {
            chunk_size_index: 0,
            ..MeshGeometryConfig::default()
        },
        lods: LodSettings {
            levels: vec![LodLevel::new(0, 10.0), LodLevel::new(1, 24.0)],
            collider_lod_index: 0,
        },
        ..TerrainSettings::default()
    }
}

pub fn pump(
    chunk: &mut TerrainChunk,
    jobs: &JobQueue<ChunkJobOut>,
    renderer: &mut Recorder,
    viewer: Vec2,
) -> usize {
    let mut ctx = ChunkCtx {
        jobs,
        renderer,
        viewer,
    };
    let mut applied = 0;
    for out in jobs.drain() {
        if chunk.apply(out, &mut ctx) {
            applied += 1;
        }
    }
    applied
}
