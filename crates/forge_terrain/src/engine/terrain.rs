//! The terrain engine.
//!
//! Owns the chunk map, the meshed chunks and the octree over their bounds.
//! A fixed-interval timer drives one pass at a time:
//!
//! 1. **Rebuild** - drain the dirty queue, remesh each chunk, evict chunks
//!    that meshed to nothing, then clear and refill the octree
//! 2. **Cull** - widen the camera FOV, pull candidate chunks from the
//!    octree, test chunk and face boxes against the frustum, reject faces
//!    pointing away from the camera and publish the survivors
//!
//! Between passes the engine does nothing and the published visible set
//! stays untouched, even while voxels are being edited.

use std::collections::BTreeMap;
use std::time::Instant;

use forge_core::ActionTimer;
use glam::{IVec3, Vec3};
use tracing::{debug, info, trace, warn};

use super::picking::{pick_voxel, PickHit, Ray};
use super::stats::TickReport;
use crate::config::TerrainConfig;
use crate::culling::{Camera, GameCamera};
use crate::error::TerrainResult;
use crate::mesh::{TerrainBuilder, VoxelFaceRenderable};
use crate::octree::Octree;
use crate::voxel::{Chunk, ChunkCoord, ChunkMap, Voxel};

/// Identifies one face group of a meshed chunk.
///
/// Valid until the next pass that rebuilds the chunk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FaceHandle {
    /// Owning chunk.
    pub chunk: ChunkCoord,
    /// Index into [`Chunk::renderables`].
    pub index: usize,
}

/// Result of [`TerrainEngine::pick_face`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FaceHit {
    /// The face group hit.
    pub face: FaceHandle,
    /// World-space intersection point.
    pub point: Vec3,
    /// Distance from the ray origin.
    pub distance: f32,
}

/// Voxel terrain: rebuild scheduling, visibility and picking.
pub struct TerrainEngine {
    config: TerrainConfig,
    map: ChunkMap,
    timer: ActionTimer,
    builder: TerrainBuilder,
    octree: Octree<ChunkCoord>,
    /// Chunks with geometry.
    chunks: BTreeMap<ChunkCoord, Chunk>,
    /// Chunks that passed culling, nearest first.
    visible_chunks: Vec<ChunkCoord>,
    /// Faces that passed culling.
    visible_faces: Vec<FaceHandle>,
    /// Octree query scratch.
    candidates: Vec<ChunkCoord>,
}

impl TerrainEngine {
    /// Creates an engine over an empty world of the configured size.
    ///
    /// The timer starts running immediately.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn new(config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;
        let map = config.chunk_map()?;
        Self::with_map(map, config)
    }

    /// Creates an engine over an existing chunk map.
    ///
    /// The map's own size and voxel scale win over the configured ones.
    ///
    /// # Errors
    ///
    /// Fails if the configuration is invalid.
    pub fn with_map(map: ChunkMap, config: TerrainConfig) -> TerrainResult<Self> {
        config.validate()?;

        let mut timer = ActionTimer::new(config.rebuild_interval);
        timer.start();
        let octree = Octree::new(map.world_bounds(), config.octree_settings());

        info!(
            "terrain engine created: {}x{}x{} voxels, {} chunks, rebuild every {:.3}s",
            map.size().x,
            map.size().y,
            map.size().z,
            map.chunk_coords().count(),
            config.rebuild_interval
        );

        Ok(Self {
            config,
            map,
            timer,
            builder: TerrainBuilder::new(),
            octree,
            chunks: BTreeMap::new(),
            visible_chunks: Vec::new(),
            visible_faces: Vec::new(),
            candidates: Vec::new(),
        })
    }

    /// Returns the configuration.
    #[inline]
    #[must_use]
    pub const fn config(&self) -> &TerrainConfig {
        &self.config
    }

    /// Returns the voxel grid.
    #[inline]
    #[must_use]
    pub const fn map(&self) -> &ChunkMap {
        &self.map
    }

    /// Returns the voxel grid for bulk edits.
    ///
    /// Edits only queue rebuilds; geometry changes on the next pass.
    #[inline]
    pub fn map_mut(&mut self) -> &mut ChunkMap {
        &mut self.map
    }

    /// Gets a voxel, or empty outside the grid.
    #[inline]
    #[must_use]
    pub fn get_voxel(&self, pos: IVec3) -> Voxel {
        self.map.get_voxel(pos)
    }

    /// Returns true if the voxel is occupied.
    #[inline]
    #[must_use]
    pub fn is_solid(&self, pos: IVec3) -> bool {
        self.map.is_solid(pos)
    }

    /// Writes a voxel and queues the affected chunks.
    ///
    /// Returns false outside the grid.
    pub fn set_voxel(&mut self, pos: IVec3, voxel: Voxel) -> bool {
        self.map.set_voxel(pos, voxel)
    }

    /// Starts (or resumes) timed passes.
    pub fn start(&mut self) {
        self.timer.start();
    }

    /// Stops timed passes. [`TerrainEngine::force_tick`] still works.
    pub fn stop(&mut self) {
        self.timer.stop();
    }

    /// Returns true while timed passes are enabled.
    #[inline]
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.timer.is_running()
    }

    /// Advances the timer by `delta` seconds and runs a pass when it fires.
    ///
    /// Returns the pass report, or `None` when no pass ran.
    pub fn update(&mut self, delta: f32, camera: &GameCamera) -> Option<TickReport> {
        if self.timer.update(delta) {
            Some(self.force_tick(camera))
        } else {
            None
        }
    }

    /// Runs a rebuild + cull pass now.
    #[allow(clippy::cast_possible_truncation)]
    pub fn force_tick(&mut self, camera: &GameCamera) -> TickReport {
        let start = Instant::now();
        let (rebuilt, evicted) = self.rebuild();
        let rebuild_us = start.elapsed().as_micros() as u64;

        let start = Instant::now();
        self.cull(camera.cull_camera());
        let cull_us = start.elapsed().as_micros() as u64;

        let report = TickReport {
            rebuilt,
            evicted,
            active_chunks: self.chunks.len() as u32,
            visible_chunks: self.visible_chunks.len() as u32,
            visible_faces: self.visible_faces.len() as u32,
            rebuild_us,
            cull_us,
        };
        if !report.within_budget(self.config.tick_budget_us) {
            warn!(
                "terrain pass took {}us (budget {}us): rebuilt {} chunks, culled in {}us",
                report.total_us(),
                self.config.tick_budget_us,
                rebuilt,
                cull_us
            );
        }
        report
    }

    /// Remeshes every queued chunk and refills the octree.
    ///
    /// Returns `(rebuilt, evicted)`.
    fn rebuild(&mut self) -> (u32, u32) {
        let pending = self.map.pending_rebuilds();
        if pending == 0 {
            return (0, 0);
        }
        info!("chunks to rebuild: {}", pending);

        let mut rebuilt = 0;
        let mut evicted = 0;
        while let Some(coord) = self.map.pop_rebuild() {
            let existing = self.chunks.remove(&coord);
            let was_active = existing.is_some();
            let mut chunk =
                existing.unwrap_or_else(|| Chunk::new(coord, self.map.voxel_scale()));

            let quads = self.builder.build(&self.map, &mut chunk);
            rebuilt += 1;

            if quads == 0 {
                chunk.dispose();
                if was_active {
                    evicted += 1;
                    debug!("chunk {:?} evicted: no visible faces", coord);
                }
            } else {
                chunk.update_bounds();
                self.chunks.insert(coord, chunk);
            }
        }

        self.octree.clear();
        for (coord, chunk) in &self.chunks {
            self.octree.insert(*coord, chunk.bounds());
        }

        (rebuilt, evicted)
    }

    /// Replaces the visible chunk and face lists.
    fn cull(&mut self, camera: &Camera) {
        self.visible_chunks.clear();
        self.visible_faces.clear();
        self.candidates.clear();

        let frustum = camera.widened(self.config.fov_margin).frustum();
        let eye = camera.position;

        self.octree.retrieve(&mut self.candidates, &frustum, false);
        for coord in &self.candidates {
            if let Some(chunk) = self.chunks.get(coord) {
                if frustum.test_aabb(&chunk.bounds()) {
                    self.visible_chunks.push(*coord);
                }
            }
        }

        let chunks = &self.chunks;
        let distance = |coord: &ChunkCoord| {
            chunks
                .get(coord)
                .map_or(f32::INFINITY, |chunk| chunk.bounds().center().distance_squared(eye))
        };
        self.visible_chunks
            .sort_by(|a, b| distance(a).total_cmp(&distance(b)).then_with(|| a.cmp(b)));

        let threshold = self.config.backface_threshold;
        for coord in &self.visible_chunks {
            let Some(chunk) = chunks.get(coord) else {
                continue;
            };
            // One origin per chunk instead of per face.
            let to_eye = eye - chunk.world_origin();
            for (index, face) in chunk.renderables().iter().enumerate() {
                if frustum.test_aabb(&face.bounds())
                    && to_eye.dot(face.direction().normal_f32()) > threshold
                {
                    self.visible_faces.push(FaceHandle { chunk: *coord, index });
                }
            }
        }

        trace!(
            "cull: {} candidates, {} visible chunks, {} visible faces",
            self.candidates.len(),
            self.visible_chunks.len(),
            self.visible_faces.len()
        );
    }

    /// Returns the handles of the visible faces.
    #[inline]
    #[must_use]
    pub fn visible_face_handles(&self) -> &[FaceHandle] {
        &self.visible_faces
    }

    /// Iterates over the visible faces.
    pub fn visible_faces(&self) -> impl Iterator<Item = (FaceHandle, &VoxelFaceRenderable)> + '_ {
        self.visible_faces.iter().filter_map(|&handle| Some((handle, self.face(handle)?)))
    }

    /// Returns the visible chunks, nearest first.
    #[inline]
    #[must_use]
    pub fn visible_chunks(&self) -> &[ChunkCoord] {
        &self.visible_chunks
    }

    /// Resolves a face handle.
    #[must_use]
    pub fn face(&self, handle: FaceHandle) -> Option<&VoxelFaceRenderable> {
        self.chunks.get(&handle.chunk)?.renderables().get(handle.index)
    }

    /// Returns a chunk with geometry.
    #[must_use]
    pub fn chunk(&self, coord: ChunkCoord) -> Option<&Chunk> {
        self.chunks.get(&coord)
    }

    /// Iterates over every chunk with geometry, in coordinate order.
    pub fn chunks(&self) -> impl Iterator<Item = &Chunk> {
        self.chunks.values()
    }

    /// Returns the number of chunks with geometry.
    #[inline]
    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// Returns the chunk octree.
    #[inline]
    #[must_use]
    pub const fn octree(&self) -> &Octree<ChunkCoord> {
        &self.octree
    }

    /// Finds the first solid voxel along a ray, using the configured mode.
    #[must_use]
    pub fn pick_voxel(&self, ray: &Ray, max_distance: f32) -> Option<PickHit> {
        pick_voxel(&self.map, ray, max_distance, self.config.pick_mode, self.config.pick_step)
    }

    /// Finds the nearest visible face crossed by a ray.
    #[must_use]
    pub fn pick_face(&self, ray: &Ray) -> Option<FaceHit> {
        let mut best: Option<FaceHit> = None;
        for (handle, face) in self.visible_faces() {
            for triangle in face.triangles() {
                let Some(distance) = ray.intersect_triangle(triangle) else {
                    continue;
                };
                if best.is_some_and(|hit| hit.distance <= distance) {
                    continue;
                }
                best = Some(FaceHit { face: handle, point: ray.at(distance), distance });
            }
        }
        best
    }

    /// Drops all geometry and scratch memory.
    ///
    /// Voxels and queued rebuilds are kept; the next pass remeshes only
    /// what is queued.
    pub fn dispose(&mut self) {
        let count = self.chunks.len();
        for chunk in self.chunks.values_mut() {
            chunk.dispose();
        }
        self.chunks = BTreeMap::new();
        self.octree.clear();
        self.visible_chunks = Vec::new();
        self.visible_faces = Vec::new();
        self.candidates = Vec::new();
        self.builder.release();
        info!("terrain engine disposed {} chunks", count);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::culling::Camera;
    use crate::voxel::{BlockId, CHUNK_SIZE};

    const STONE: Voxel = Voxel::new(BlockId::STONE);

    #[allow(clippy::cast_sign_loss)]
    fn engine(chunks_x: u32) -> TerrainEngine {
        let config = TerrainConfig::default();
        let size = CHUNK_SIZE as u32;
        let map = ChunkMap::new(chunks_x * size, size, size, 1.0, Default::default()).unwrap();
        TerrainEngine::with_map(map, config).unwrap()
    }

    /// Looking at the chunk row from above and in front.
    fn overview() -> GameCamera {
        Camera::looking_at(Vec3::new(24.0, 40.0, 60.0), Vec3::new(24.0, 0.0, 8.0), 60.0, 1.0)
            .into()
    }

    #[test]
    fn test_empty_world_has_no_chunks() {
        let mut engine = engine(1);
        engine.map_mut().enqueue_all();
        let report = engine.force_tick(&overview());
        assert_eq!(report.rebuilt, 1);
        assert_eq!(engine.chunk_count(), 0);
        assert!(engine.visible_face_handles().is_empty());
    }

    #[test]
    fn test_full_chunk_builds_six_quads() {
        let mut engine = engine(1);
        engine.map_mut().fill(IVec3::ZERO, IVec3::splat(CHUNK_SIZE - 1), STONE);
        engine.force_tick(&overview());

        let chunk = engine.chunk(ChunkCoord::new(0, 0, 0)).unwrap();
        assert_eq!(chunk.quad_count(), 6);
        assert_eq!(engine.octree().len(), 1);
    }

    #[test]
    fn test_cleared_chunk_is_evicted() {
        let mut engine = engine(2);
        engine.set_voxel(IVec3::new(20, 3, 3), STONE);
        engine.force_tick(&overview());
        assert!(engine.chunk(ChunkCoord::new(1, 0, 0)).is_some());

        engine.set_voxel(IVec3::new(20, 3, 3), Voxel::EMPTY);
        let report = engine.force_tick(&overview());
        assert_eq!(report.evicted, 1);
        assert_eq!(engine.chunk_count(), 0);
        assert!(engine.octree().is_empty());
    }

    #[test]
    fn test_timer_gates_passes() {
        let mut engine = engine(1);
        engine.set_voxel(IVec3::new(3, 3, 3), STONE);

        assert!(engine.update(0.01, &overview()).is_none());
        assert_eq!(engine.chunk_count(), 0);
        assert!(engine.update(0.05, &overview()).is_some());
        assert_eq!(engine.chunk_count(), 1);

        engine.stop();
        engine.set_voxel(IVec3::new(3, 4, 3), STONE);
        assert!(engine.update(1.0, &overview()).is_none());
        assert!(engine.map().is_dirty(ChunkCoord::new(0, 0, 0)));
    }

    #[test]
    fn test_backfaces_are_rejected() {
        let mut engine = engine(1);
        engine.set_voxel(IVec3::new(8, 8, 8), STONE);
        // Straight above, looking down.
        let camera = Camera::new(Vec3::new(8.5, 60.0, 8.5), Vec3::NEG_Y, 60.0, 1.0);
        engine.force_tick(&camera.into());

        let directions: Vec<_> =
            engine.visible_faces().map(|(_, face)| face.direction()).collect();
        assert!(directions.contains(&crate::voxel::Direction::Top));
        assert!(!directions.contains(&crate::voxel::Direction::Bottom));
    }

    #[test]
    fn test_camera_facing_away_sees_nothing() {
        let mut engine = engine(1);
        engine.set_voxel(IVec3::new(8, 8, 8), STONE);
        let camera = Camera::new(Vec3::new(8.0, 8.0, 60.0), Vec3::Z, 60.0, 1.0);
        let report = engine.force_tick(&camera.into());
        assert_eq!(report.active_chunks, 1);
        assert_eq!(report.visible_chunks, 0);
        assert_eq!(report.visible_faces, 0);
    }

    #[test]
    fn test_pick_face_returns_nearest() {
        let mut engine = engine(1);
        engine.set_voxel(IVec3::new(8, 2, 8), STONE);
        engine.set_voxel(IVec3::new(8, 6, 8), STONE);
        let camera = Camera::new(Vec3::new(8.5, 40.0, 8.5), Vec3::NEG_Y, 60.0, 1.0);
        engine.force_tick(&camera.into());

        // Off the quad diagonal so exactly one triangle per quad is crossed.
        let ray = Ray::new(Vec3::new(8.3, 40.0, 8.6), Vec3::NEG_Y).unwrap();
        let hit = engine.pick_face(&ray).unwrap();
        assert!((hit.point.y - 7.0).abs() < 1e-4);
        let face = engine.face(hit.face).unwrap();
        assert_eq!(face.direction(), crate::voxel::Direction::Top);
    }

    #[test]
    fn test_dispose_releases_geometry() {
        let mut engine = engine(2);
        engine.map_mut().build_floor(STONE);
        engine.force_tick(&overview());
        assert_eq!(engine.chunk_count(), 2);

        engine.dispose();
        assert_eq!(engine.chunk_count(), 0);
        assert!(engine.visible_face_handles().is_empty());
        assert!(engine.octree().is_empty());
    }
}
