//! # Terrain Engine Tests
//!
//! End-to-end checks of the rebuild + cull cycle: dirty tracking, greedy
//! meshing results, eviction, octree contents and the stability of the
//! published visible set.

use forge_terrain::{
    Aabb, BlockId, Camera, ChunkCoord, ChunkMap, Direction, GameCamera, TerrainConfig,
    TerrainEngine, Voxel, CHUNK_SIZE,
};
use glam::{IVec3, Vec3};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

const STONE: Voxel = Voxel::new(BlockId::STONE);

#[allow(clippy::cast_sign_loss)]
fn engine_with_chunks(x: u32, y: u32, z: u32) -> TerrainEngine {
    let size = CHUNK_SIZE as u32;
    let map = ChunkMap::new(x * size, y * size, z * size, 1.0, Default::default()).unwrap();
    TerrainEngine::with_map(map, TerrainConfig::default()).unwrap()
}

/// Camera outside the world looking at its middle.
fn overview(engine: &TerrainEngine) -> GameCamera {
    let bounds = engine.map().world_bounds();
    let center = bounds.center();
    let eye = center + Vec3::new(0.0, bounds.max.y * 2.0 + 20.0, bounds.max.z + 40.0);
    Camera::looking_at(eye, center, 67.0, 1.0).into()
}

/// Test: The single-chunk scenario, empty then full.
#[test]
fn test_single_chunk_empty_then_full() {
    let mut engine = engine_with_chunks(1, 1, 1);
    let camera = overview(&engine);

    engine.map_mut().enqueue_all();
    let report = engine.force_tick(&camera);
    assert_eq!(report.active_chunks, 0);
    assert_eq!(report.visible_faces, 0);

    let last = CHUNK_SIZE - 1;
    engine.map_mut().fill(IVec3::ZERO, IVec3::splat(last), STONE);
    engine.force_tick(&camera);

    let chunk = engine.chunk(ChunkCoord::new(0, 0, 0)).expect("chunk has geometry");
    assert_eq!(chunk.quad_count(), 6);
    #[allow(clippy::cast_sign_loss)]
    let full = CHUNK_SIZE as u32;
    for face in chunk.renderables() {
        assert_eq!(face.quad_count(), 1);
        let quad = face.quads()[0];
        assert_eq!((quad.width, quad.height), (full, full), "{:?}", face.direction());
    }
}

/// Test: Edits inside a chunk dirty one chunk, edits on a face dirty both sides.
#[test]
fn test_edit_dirtying() {
    let mut engine = engine_with_chunks(3, 3, 3);

    engine.set_voxel(IVec3::new(20, 20, 20), STONE);
    assert_eq!(engine.map().pending_rebuilds(), 1);
    engine.force_tick(&overview(&engine));
    assert_eq!(engine.map().pending_rebuilds(), 0);

    // Local x = 15: the +X neighbor shares the face.
    engine.set_voxel(IVec3::new(31, 20, 20), STONE);
    assert_eq!(engine.map().pending_rebuilds(), 2);
    assert!(engine.map().is_dirty(ChunkCoord::new(1, 1, 1)));
    assert!(engine.map().is_dirty(ChunkCoord::new(2, 1, 1)));
}

/// Test: Visible faces only change on a pass.
#[test]
fn test_visible_set_stable_between_ticks() {
    let mut engine = engine_with_chunks(2, 1, 2);
    engine.map_mut().build_floor(Voxel::new(BlockId::GRASS));
    let camera = overview(&engine);

    engine.force_tick(&camera);
    let before = engine.visible_face_handles().to_vec();
    assert!(!before.is_empty());

    // Edits queue work but publish nothing.
    for x in 0..32 {
        engine.set_voxel(IVec3::new(x, 0, 5), Voxel::EMPTY);
    }
    assert!(engine.update(0.001, &camera).is_none());
    assert_eq!(engine.visible_face_handles(), before.as_slice());

    // A pass with nothing queued republishes the same set.
    let mut idle = engine_with_chunks(2, 1, 2);
    idle.map_mut().build_floor(Voxel::new(BlockId::GRASS));
    idle.force_tick(&camera);
    let first = idle.visible_face_handles().to_vec();
    idle.force_tick(&camera);
    assert_eq!(idle.visible_face_handles(), first.as_slice());
}

/// Test: Clearing every voxel of a chunk evicts it on the next pass.
#[test]
fn test_cleared_chunk_evicted() {
    let mut engine = engine_with_chunks(2, 1, 1);
    engine.map_mut().fill(IVec3::new(16, 0, 0), IVec3::new(31, 3, 15), STONE);
    let camera = overview(&engine);
    engine.force_tick(&camera);
    assert!(engine.chunk(ChunkCoord::new(1, 0, 0)).is_some());

    engine.map_mut().fill(IVec3::new(16, 0, 0), IVec3::new(31, 3, 15), Voxel::EMPTY);
    let report = engine.force_tick(&camera);
    assert!(report.evicted >= 1);
    assert!(engine.chunk(ChunkCoord::new(1, 0, 0)).is_none());
    assert!(engine
        .visible_face_handles()
        .iter()
        .all(|handle| handle.chunk != ChunkCoord::new(1, 0, 0)));
}

/// Test: Remeshing an unchanged chunk gives identical geometry.
#[test]
fn test_remesh_idempotent() {
    let mut engine = engine_with_chunks(1, 1, 1);
    let mut rng = StdRng::seed_from_u64(7);
    for _ in 0..600 {
        let pos = IVec3::new(rng.gen_range(0..16), rng.gen_range(0..16), rng.gen_range(0..16));
        engine.set_voxel(pos, Voxel::new(BlockId(rng.gen_range(1..=7))));
    }
    let camera = overview(&engine);
    engine.force_tick(&camera);
    let coord = ChunkCoord::new(0, 0, 0);
    let first = engine.chunk(coord).unwrap().renderables().to_vec();

    engine.map_mut().enqueue_rebuild(coord);
    let report = engine.force_tick(&camera);
    assert_eq!(report.rebuilt, 1);
    assert_eq!(engine.chunk(coord).unwrap().renderables(), first.as_slice());
}

/// Test: The octree holds every active chunk exactly once.
#[test]
fn test_octree_matches_active_chunks() {
    let mut engine = engine_with_chunks(4, 2, 4);
    let mut rng = StdRng::seed_from_u64(42);
    for _ in 0..200 {
        let pos = IVec3::new(rng.gen_range(0..64), rng.gen_range(0..32), rng.gen_range(0..64));
        engine.set_voxel(pos, STONE);
    }
    engine.force_tick(&overview(&engine));

    let mut found = Vec::new();
    engine.octree().retrieve(&mut found, &engine.map().world_bounds(), false);
    found.sort_unstable();
    let expected: Vec<_> = engine.chunks().map(|chunk| chunk.coord()).collect();
    assert_eq!(found, expected);

    let mut none = Vec::new();
    let outside = Aabb::new(Vec3::splat(-500.0), Vec3::splat(-400.0));
    engine.octree().retrieve(&mut none, &outside, false);
    assert!(none.is_empty());
}

/// Test: Published faces resolve, face the camera and belong to visible chunks.
#[test]
fn test_visible_faces_consistent() {
    let mut engine = engine_with_chunks(4, 2, 4);
    engine.map_mut().build_floor(STONE);
    let mut rng = StdRng::seed_from_u64(3);
    for _ in 0..300 {
        let pos = IVec3::new(rng.gen_range(0..64), rng.gen_range(1..20), rng.gen_range(0..64));
        engine.set_voxel(pos, Voxel::new(BlockId::DIRT));
    }
    let camera = overview(&engine);
    let report = engine.force_tick(&camera);
    assert!(report.visible_faces > 0);

    let eye = camera.cull_camera().position;
    for (handle, face) in engine.visible_faces() {
        assert!(engine.visible_chunks().contains(&handle.chunk));
        let chunk = engine.chunk(handle.chunk).unwrap();
        let to_eye = eye - chunk.world_origin();
        assert!(to_eye.dot(face.direction().normal_f32()) > 0.1);
    }

    // Nearest first.
    let distances: Vec<f32> = engine
        .visible_chunks()
        .iter()
        .map(|&c| engine.chunk(c).unwrap().bounds().center().distance_squared(eye))
        .collect();
    assert!(distances.windows(2).all(|pair| pair[0] <= pair[1]));
}

/// Test: The debug camera keeps culling from its frozen viewpoint.
#[test]
fn test_debug_camera_freezes_culling() {
    let mut engine = engine_with_chunks(2, 1, 2);
    engine.map_mut().build_floor(STONE);
    let mut camera = overview(&engine);
    engine.force_tick(&camera);
    let seen = engine.visible_face_handles().to_vec();

    camera.freeze_debug();
    // Turn the main camera away from the world.
    camera.main.direction = Vec3::Z;
    engine.force_tick(&camera);
    assert_eq!(engine.visible_face_handles(), seen.as_slice());

    camera.release_debug();
    engine.force_tick(&camera);
    assert!(engine.visible_face_handles().is_empty());
}

/// Test: Straight down sees only upward floor faces; straight up sees nothing.
#[test]
fn test_vertical_cameras_over_floor() {
    let mut engine = engine_with_chunks(1, 1, 1);
    engine.map_mut().build_floor(STONE);
    let eye = Vec3::new(8.0, 50.0, 8.0);

    let down: GameCamera = Camera::new(eye, Vec3::NEG_Y, 60.0, 1.0).into();
    engine.force_tick(&down);
    let directions: Vec<_> = engine.visible_faces().map(|(_, f)| f.direction()).collect();
    assert!(directions.contains(&Direction::Top));
    assert!(!directions.contains(&Direction::Bottom));

    let up: GameCamera = Camera::new(eye, Vec3::Y, 60.0, 1.0).into();
    let report = engine.force_tick(&up);
    assert_eq!(report.visible_chunks, 0);
    assert_eq!(report.visible_faces, 0);
    assert!(engine.visible_face_handles().is_empty());
}

/// Test: An engine built from a TOML config uses its world size.
#[test]
fn test_engine_from_config() {
    let config = TerrainConfig::from_toml_str(
        r#"
        rebuild_interval = 0.5
        [world]
        width = 32
        height = 16
        depth = 16
        "#,
    )
    .unwrap();
    let mut engine = TerrainEngine::new(config).unwrap();
    assert_eq!(engine.map().chunks_per_axis(), IVec3::new(2, 1, 1));

    engine.set_voxel(IVec3::new(1, 1, 1), STONE);
    let camera = overview(&engine);
    assert!(engine.update(0.25, &camera).is_none());
    let report = engine.update(0.25, &camera).expect("timer fires after the interval");
    assert_eq!(report.rebuilt, 1);
}

/// Test: Dispose drops geometry; queued work survives.
#[test]
fn test_dispose_then_rebuild() {
    let mut engine = engine_with_chunks(2, 1, 1);
    engine.map_mut().build_floor(STONE);
    let camera = overview(&engine);
    engine.force_tick(&camera);
    assert_eq!(engine.chunk_count(), 2);

    engine.dispose();
    assert_eq!(engine.chunk_count(), 0);

    engine.map_mut().enqueue_all();
    engine.force_tick(&camera);
    assert_eq!(engine.chunk_count(), 2);
}
