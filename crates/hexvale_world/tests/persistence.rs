//! # Persistence Integration Tests
//!
//! Bulk chunk save and load through the world facade.
//!
//! Run with: cargo test --package hexvale_world --test persistence

use hexvale_world::{
    Block, BlockType, ChunkCoords, Position, World, WorldConfig, WorldError, WorldType, SIZE_IN_BYTES,
};

fn config(raw_seed: i32) -> WorldConfig {
    WorldConfig {
        raw_seed,
        size_in_chunks_x: 2,
        size_in_chunks_z: 3,
        ..WorldConfig::default()
    }
}

#[test]
fn test_same_seed_same_world() {
    let a = World::new(config(99)).unwrap();
    let b = World::new(config(99)).unwrap();
    a.generate_all();
    b.generate_all();
    assert_eq!(a.save_chunks(), b.save_chunks());

    let c = World::new(config(100)).unwrap();
    c.generate_all();
    assert_ne!(a.save_chunks(), c.save_chunks());
}

#[test]
fn test_lazy_and_parallel_generation_agree() {
    let lazy = World::new(config(5)).unwrap();
    // Touch chunks in an arbitrary order before filling the rest.
    lazy.get_block_xyz(40, 3, 90).unwrap();
    lazy.get_block_xyz(1, 3, 1).unwrap();
    let eager = World::new(config(5)).unwrap();
    eager.generate_all();
    assert_eq!(lazy.save_chunks(), eager.save_chunks());
    assert!(lazy.is_loaded());
}

#[test]
fn test_save_load_roundtrip_keeps_edits_and_dirty_bits() {
    let source = World::new(config(1)).unwrap();
    source.generate_all();
    source.place_block(Position::new(33, 90, 70), BlockType::Glass);
    source.place_block(Position::new(2, 89, 2), BlockType::Gold);
    let saved = source.save_chunks();
    assert_eq!(saved.len(), 6);
    assert!(saved.iter().all(|buffer| buffer.len() == SIZE_IN_BYTES));

    let target = World::new(config(1)).unwrap();
    target.load_chunks(&saved).unwrap();
    assert!(target.is_loaded());

    let gold = target.get_block_xyz(2, 89, 2).unwrap();
    assert_eq!(gold.block_type(), BlockType::Gold);
    assert!(gold.is_dirty());
    assert_eq!(target.get_height_map_level(2, 2).unwrap(), 89);
    assert_eq!(
        target.get_block_xyz(33, 90, 70).unwrap().block_type(),
        BlockType::Glass
    );
    assert_eq!(target.save_chunks(), saved);
}

#[test]
fn test_save_order_is_x_major() {
    let world = World::new(config(3)).unwrap();
    world.generate_all();
    // Chunk (1, 2) is the last one written.
    world.place_block(Position::new(40, 91, 70), BlockType::Bricks);
    let saved = world.save_chunks();
    let expected = world.chunk(ChunkCoords::new(1, 2)).unwrap().to_bytes();
    assert_eq!(saved[5], expected);
    assert_eq!(saved[1], world.chunk(ChunkCoords::new(0, 1)).unwrap().to_bytes());
}

#[test]
fn test_corrupt_buffer_fails_whole_load() {
    let source = World::new(config(1)).unwrap();
    let mut saved = source.save_chunks();
    let target = World::new(config(1)).unwrap();
    target.place_block(Position::new(5, 92, 5), BlockType::Bricks);
    let before = target.save_chunks();

    // Unassigned type id in the last chunk.
    saved[5][100..102].copy_from_slice(&Block::from_raw(0x1FF).raw().to_ne_bytes());
    let err = target.load_chunks(&saved).unwrap_err();
    assert!(matches!(err, WorldError::UnknownBlockType { id: 0x1FF, index: 50 }));
    assert_eq!(target.save_chunks(), before);

    // Truncated buffer.
    saved[5].truncate(SIZE_IN_BYTES - 2);
    let err = target.load_chunks(&saved).unwrap_err();
    assert!(matches!(err, WorldError::InvalidBufferLength { .. }));
    assert_eq!(target.save_chunks(), before);
}

#[test]
fn test_world_type_shapes_surface() {
    for (world_type, surface) in [(WorldType::Winter, BlockType::Snow), (WorldType::Desert, BlockType::Sand)] {
        let mut config = config(11);
        config.world_type = world_type;
        config.generator.water_level = 0;
        let world = World::new(config).unwrap();
        let height = world.get_height_map_level(20, 20).unwrap();
        assert_eq!(world.get_block_xyz(20, height, 20).unwrap().block_type(), surface);
    }
}

#[test]
fn test_config_from_toml_drives_world() {
    let config = WorldConfig::from_toml_str(
        r#"
        raw_seed = 2024
        world_type = 3
        size_in_chunks_x = 1
        size_in_chunks_z = 2
        object_id_seq = 40

        [generator]
        min_surface_height = 30
        max_surface_height = 30
        water_level = 10
        "#,
    )
    .unwrap();
    let world = World::new(config).unwrap();
    assert_eq!(world.size_in_blocks_z(), 64);
    assert_eq!(world.next_object_id().unwrap(), 40);
    assert_eq!(world.get_height_map_level(0, 63).unwrap(), 30);
    assert_eq!(world.get_block_xyz(0, 30, 63).unwrap().block_type(), BlockType::Sand);
}

#[test]
fn test_highest_accepted_octave_count_generates() {
    let mut config = config(17);
    config.generator.unit_size = 1;
    config.generator.octave_count = config.max_octave_count();
    config.validate().unwrap();

    let world = World::new(config.clone()).unwrap();
    world.generate_all();
    assert!(world.is_loaded());

    config.generator.octave_count += 1;
    assert!(World::new(config).is_err());
}
