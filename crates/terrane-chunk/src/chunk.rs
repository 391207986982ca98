use std::sync::Arc;

use terrane_geom::{Bounds2, Vec2};
use terrane_mesh_cpu::{MeshData, build_terrain_mesh};
use terrane_noise::{HeightMap, generate_height_map};
use terrane_runtime::JobQueue;

use crate::job::{ChunkCoord, ChunkJobOut};
use crate::settings::TerrainSettings;

/// Scene-side collaborator. Chunks only push state into it.
pub trait ChunkRenderer {
    fn set_visible(&mut self, coord: ChunkCoord, visible: bool);
    fn assign_display_mesh(&mut self, coord: ChunkCoord, lod_index: usize, mesh: &Arc<MeshData>);
    fn assign_collision_mesh(&mut self, coord: ChunkCoord, mesh: &Arc<MeshData>);
    fn release(&mut self, coord: ChunkCoord);
}

/// Per-call context for chunk transitions that may submit work or touch the scene.
pub struct ChunkCtx<'a> {
    pub jobs: &'a JobQueue<ChunkJobOut>,
    pub renderer: &'a mut dyn ChunkRenderer,
    pub viewer: Vec2,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChunkState {
    Unloaded,
    Loading,
    Ready,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct VisibilityChange {
    pub coord: ChunkCoord,
    pub epoch: u64,
    pub visible: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

type Listener = Box<dyn FnMut(VisibilityChange)>;

#[derive(Default)]
struct LodMesh {
    mesh: Option<Arc<MeshData>>,
    requested: bool,
}

pub struct TerrainChunk {
    coord: ChunkCoord,
    epoch: u64,
    settings: Arc<TerrainSettings>,
    sample_center: Vec2,
    bounds: Bounds2,
    state: ChunkState,
    height_map: Option<Arc<HeightMap>>,
    lod_meshes: Vec<LodMesh>,
    active_lod: Option<usize>,
    visible: bool,
    has_collider: bool,
    max_view_distance: f32,
    listeners: Vec<(ListenerId, Listener)>,
    next_listener: u64,
}

impl TerrainChunk {
    /// `epoch` tags every job this instance submits so results can be matched back to it.
    pub fn new(coord: ChunkCoord, epoch: u64, settings: Arc<TerrainSettings>) -> Self {
        let world_size = settings.chunk_world_size();
        let origin = Vec2::new(coord.x as f32, coord.y as f32);
        let sample_center = origin * world_size / settings.mesh.mesh_scale;
        let bounds = Bounds2::from_center_size(origin * world_size, Vec2::ONE * world_size);
        let lod_meshes = settings.lods.levels.iter().map(|_| LodMesh::default()).collect();
        let max_view_distance = settings.max_view_distance();
        Self {
            coord,
            epoch,
            settings,
            sample_center,
            bounds,
            state: ChunkState::Unloaded,
            height_map: None,
            lod_meshes,
            active_lod: None,
            visible: false,
            has_collider: false,
            max_view_distance,
            listeners: Vec::new(),
            next_listener: 0,
        }
    }

    #[inline]
    pub fn coord(&self) -> ChunkCoord {
        self.coord
    }

    #[inline]
    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    #[inline]
    pub fn state(&self) -> ChunkState {
        self.state
    }

    #[inline]
    pub fn bounds(&self) -> Bounds2 {
        self.bounds
    }

    #[inline]
    pub fn sample_center(&self) -> Vec2 {
        self.sample_center
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.visible
    }

    #[inline]
    pub fn has_collider(&self) -> bool {
        self.has_collider
    }

    /// Tier index whose mesh is currently displayed.
    #[inline]
    pub fn active_lod(&self) -> Option<usize> {
        self.active_lod
    }

    pub fn height_map(&self) -> Option<&Arc<HeightMap>> {
        self.height_map.as_ref()
    }

    pub fn has_mesh(&self, lod_index: usize) -> bool {
        self.lod_meshes
            .get(lod_index)
            .is_some_and(|m| m.mesh.is_some())
    }

    pub fn has_requested_mesh(&self, lod_index: usize) -> bool {
        self.lod_meshes.get(lod_index).is_some_and(|m| m.requested)
    }

    /// Submits the height map job. No-op unless the chunk is unloaded.
    pub fn load(&mut self, jobs: &JobQueue<ChunkJobOut>) {
        if self.state != ChunkState::Unloaded {
            return;
        }
        self.state = ChunkState::Loading;
        let settings = Arc::clone(&self.settings);
        let (coord, epoch, center) = (self.coord, self.epoch, self.sample_center);
        jobs.submit(move || {
            let n = settings.mesh.vertices_per_line();
            let map = generate_height_map(n, n, &settings.height, center);
            ChunkJobOut::HeightMap {
                coord,
                epoch,
                map: Arc::new(map),
            }
        });
        log::debug!(target: "chunk", "load {:?} epoch {}", self.coord, self.epoch);
    }

    /// Routes a completed job to this instance. Returns false if it belongs to another instance.
    pub fn apply(&mut self, out: ChunkJobOut, ctx: &mut ChunkCtx<'_>) -> bool {
        if out.coord() != self.coord || out.epoch() != self.epoch {
            return false;
        }
        match out {
            ChunkJobOut::HeightMap { map, .. } => self.on_height_map_received(map, ctx),
            ChunkJobOut::Mesh {
                lod_index, mesh, ..
            } => self.on_mesh_received(lod_index, mesh, ctx),
        }
        true
    }

    pub fn on_height_map_received(&mut self, map: Arc<HeightMap>, ctx: &mut ChunkCtx<'_>) {
        if self.state != ChunkState::Loading {
            log::warn!(target: "chunk", "height map for {:?} arrived in state {:?}", self.coord, self.state);
            return;
        }
        self.height_map = Some(map);
        self.state = ChunkState::Ready;
        self.evaluate(ctx);
    }

    pub fn on_mesh_received(&mut self, lod_index: usize, mesh: Arc<MeshData>, ctx: &mut ChunkCtx<'_>) {
        let Some(slot) = self.lod_meshes.get_mut(lod_index) else {
            log::warn!(target: "chunk", "mesh for unknown tier {lod_index} on {:?}", self.coord);
            return;
        };
        slot.mesh = Some(mesh);
        self.evaluate(ctx);
        if lod_index == self.settings.lods.collider_lod_index {
            self.evaluate_collision(ctx);
        }
    }

    fn lod_index_for(&self, distance: f32) -> usize {
        let scale = self.settings.mesh.mesh_scale;
        let levels = &self.settings.lods.levels;
        let mut lod_index = 0;
        for (i, level) in levels.iter().enumerate().take(levels.len().saturating_sub(1)) {
            if distance > level.visible_distance_threshold * scale {
                lod_index = i + 1;
            } else {
                break;
            }
        }
        lod_index
    }

    /// Updates visibility and the displayed tier for the viewer. Ready chunks only.
    pub fn evaluate(&mut self, ctx: &mut ChunkCtx<'_>) {
        if self.state != ChunkState::Ready {
            return;
        }
        let distance = self.bounds.distance(ctx.viewer);
        let was_visible = self.visible;
        let visible = distance <= self.max_view_distance;

        let lod_index = self.lod_index_for(distance);
        if visible && self.active_lod != Some(lod_index) && lod_index < self.lod_meshes.len() {
            if let Some(mesh) = self.lod_meshes[lod_index].mesh.clone() {
                self.active_lod = Some(lod_index);
                ctx.renderer.assign_display_mesh(self.coord, lod_index, &mesh);
            } else {
                // keep showing the previous tier until this one lands
                self.request_mesh(lod_index, ctx.jobs);
            }
        }

        if was_visible != visible {
            self.visible = visible;
            ctx.renderer.set_visible(self.coord, visible);
            let change = VisibilityChange {
                coord: self.coord,
                epoch: self.epoch,
                visible,
            };
            for (_, listener) in &mut self.listeners {
                listener(change);
            }
        }
    }

    /// Requests and then attaches the collider tier once the viewer is close. One-shot.
    pub fn evaluate_collision(&mut self, ctx: &mut ChunkCtx<'_>) {
        if self.state != ChunkState::Ready || self.has_collider {
            return;
        }
        let collider = self.settings.lods.collider_lod_index;
        let Some(level) = self.settings.lods.levels.get(collider).copied() else {
            return;
        };
        let sqr_distance = self.bounds.sqr_distance(ctx.viewer);

        if sqr_distance < level.sqr_visible_distance_threshold() * self.settings.mesh.mesh_scale {
            self.request_mesh(collider, ctx.jobs);
        }

        let activation = self.settings.collider_generation_distance;
        if sqr_distance < activation * activation {
            if let Some(mesh) = &self.lod_meshes[collider].mesh {
                ctx.renderer.assign_collision_mesh(self.coord, mesh);
                self.has_collider = true;
                log::debug!(target: "chunk", "collider attached to {:?}", self.coord);
            }
        }
    }

    /// Submits a mesh job for tier `lod_index`. Returns false when it is cached, in flight,
    /// or the height map is not here yet.
    pub fn request_mesh(&mut self, lod_index: usize, jobs: &JobQueue<ChunkJobOut>) -> bool {
        let Some(map) = self.height_map.clone() else {
            return false;
        };
        let Some(level) = self.settings.lods.levels.get(lod_index).copied() else {
            return false;
        };
        let slot = &mut self.lod_meshes[lod_index];
        if slot.requested || slot.mesh.is_some() {
            return false;
        }
        slot.requested = true;

        let settings = Arc::clone(&self.settings);
        let (coord, epoch) = (self.coord, self.epoch);
        jobs.submit(move || {
            let mesh = build_terrain_mesh(&map, &settings.mesh, level.lod);
            ChunkJobOut::Mesh {
                coord,
                epoch,
                lod_index,
                mesh: Arc::new(mesh),
            }
        });
        log::trace!(target: "chunk", "mesh request {:?} tier {} (lod {})", coord, lod_index, level.lod);
        true
    }

    pub fn subscribe(&mut self, listener: impl FnMut(VisibilityChange) + 'static) -> ListenerId {
        let id = ListenerId(self.next_listener);
        self.next_listener += 1;
        self.listeners.push((id, Box::new(listener)));
        id
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(l, _)| *l != id);
        self.listeners.len() != before
    }

    /// Hides and releases scene resources and drops all listeners.
    pub fn unload(&mut self, renderer: &mut dyn ChunkRenderer) {
        if self.visible {
            self.visible = false;
            renderer.set_visible(self.coord, false);
        }
        renderer.release(self.coord);
        self.listeners.clear();
        self.height_map = None;
        self.lod_meshes.iter_mut().for_each(|m| *m = LodMesh::default());
        self.active_lod = None;
        self.state = ChunkState::Unloaded;
        log::debug!(target: "chunk", "unload {:?} epoch {}", self.coord, self.epoch);
    }
}
