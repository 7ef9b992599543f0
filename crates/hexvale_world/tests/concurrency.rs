//! # Concurrency Integration Tests
//!
//! Many threads against one world. Run with:
//! cargo test --package hexvale_world --test concurrency

use std::collections::HashSet;
use std::thread;

use hexvale_world::{
    BlockType, ChunkCoords, Coords, DynamicItem, Face, ItemKind, LightSource, LightSourceType, Position, World,
    WorldConfig,
};

const THREADS: u32 = 8;

fn world() -> World {
    World::new(WorldConfig {
        size_in_chunks_x: 2,
        size_in_chunks_z: 2,
        ..WorldConfig::default()
    })
    .unwrap()
}

#[test]
fn test_object_ids_are_unique_across_threads() {
    let world = &world();
    let ids: Vec<u32> = thread::scope(|scope| {
        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                scope.spawn(move || {
                    (0..1_000)
                        .map(|_| world.next_object_id().unwrap())
                        .collect::<Vec<_>>()
                })
            })
            .collect();
        handles
            .into_iter()
            .flat_map(|handle| handle.join().unwrap())
            .collect()
    });
    let unique: HashSet<_> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    assert_eq!(world.object_id_seq(), 1 + THREADS * 1_000);
}

#[test]
fn test_concurrent_light_churn_on_one_chunk() {
    let world = world();
    let chunk = world.chunk(ChunkCoords::new(0, 0)).unwrap();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let world = &world;
            scope.spawn(move || {
                for i in 0..500u32 {
                    #[allow(clippy::cast_precision_loss)]
                    let light = LightSource {
                        coords: Coords::new((t * 3) as f32 + 0.5, 90.5, (i % 32) as f32 + 0.5),
                        attached_to_face: Face::Top,
                        kind: LightSourceType::Torch,
                    };
                    let id = world.add_light_source(light).unwrap();
                    if i % 2 == 0 {
                        world.remove_light_source(id).unwrap();
                    }
                }
            });
        }
    });

    assert_eq!(chunk.light_source_count(), (THREADS * 250) as usize);
}

#[test]
fn test_double_remove_race_has_one_winner() {
    let world = &world();
    for _ in 0..50 {
        let id = world
            .add_dynamic_item(DynamicItem::new(Coords::new(5.5, 90.0, 5.5), ItemKind::Tool))
            .unwrap();
        let wins: usize = thread::scope(|scope| {
            let handles: Vec<_> = (0..4)
                .map(|_| scope.spawn(move || usize::from(world.remove_dynamic_item(id).is_ok())))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).sum()
        });
        assert_eq!(wins, 1);
    }
    assert_eq!(world.chunk(ChunkCoords::new(0, 0)).unwrap().item_count(), 0);
}

#[test]
fn test_parallel_placements_on_distinct_columns() {
    let world = world();
    world.generate_all();

    thread::scope(|scope| {
        for t in 0..THREADS {
            let world = &world;
            scope.spawn(move || {
                #[allow(clippy::cast_possible_wrap)]
                let x = (t * 8) as i32;
                for z in 0..64 {
                    world.place_block(Position::new(x, 85, z), BlockType::Bricks);
                    world.place_block(Position::new(x, 86, z), BlockType::Wood);
                    world.place_block(Position::new(x, 86, z), BlockType::Air);
                }
            });
        }
    });

    for t in 0..THREADS {
        #[allow(clippy::cast_possible_wrap)]
        let x = (t * 8) as i32;
        for z in 0..64 {
            assert_eq!(world.get_height_map_level(x, z).unwrap(), 85);
            assert_eq!(world.get_block_xyz(x, 85, z).unwrap().block_type(), BlockType::Bricks);
        }
    }
}

#[test]
fn test_interest_table_under_contention() {
    let world = world();
    let coords = ChunkCoords::new(1, 1);

    thread::scope(|scope| {
        for subscriber in 0..THREADS {
            let world = &world;
            scope.spawn(move || {
                for _ in 0..200 {
                    world.get_chunk(coords, subscriber).unwrap();
                    world.chunk_ignore(coords, subscriber);
                }
                world.get_chunk(coords, subscriber).unwrap();
            });
        }
    });

    assert_eq!(world.subscribers(coords), (0..THREADS).collect::<Vec<_>>());
    assert!(world.unpinned_loaded_chunks().is_empty());
}

#[test]
fn test_moving_items_while_blocks_change() {
    let world = world();
    world.generate_all();
    let ids: Vec<_> = (0..THREADS)
        .map(|t| {
            #[allow(clippy::cast_precision_loss)]
            let coords = Coords::new(t as f32 * 4.0 + 0.5, 90.0, 0.5);
            world.add_dynamic_item(DynamicItem::new(coords, ItemKind::Projectile)).unwrap()
        })
        .collect();

    thread::scope(|scope| {
        for (t, &id) in ids.iter().enumerate() {
            let world = &world;
            scope.spawn(move || {
                for step in 0..63 {
                    #[allow(clippy::cast_precision_loss)]
                    let coords = Coords::new(t as f32 * 4.0 + 0.5, 90.0, step as f32 + 1.5);
                    world.move_dynamic_item(id, coords).unwrap();
                }
            });
        }
        scope.spawn(|| {
            for z in 0..64 {
                world.place_block(Position::new(20, 88, z), BlockType::Rock);
            }
        });
    });

    let north = world.chunk(ChunkCoords::new(0, 1)).unwrap();
    assert_eq!(north.item_count(), THREADS as usize);
    for id in ids {
        assert_eq!(world.dynamic_item(id).unwrap().coords.z, 63.5);
    }
}
