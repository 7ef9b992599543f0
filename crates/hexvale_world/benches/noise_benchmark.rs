//! Benchmark for height noise and chunk generation.
//!
//! TARGET: one chunk's height map (1,024 columns, 3 octaves) under 1ms
//!
//! Run with: cargo bench --package hexvale_world --bench noise_benchmark

use criterion::{black_box, criterion_group, criterion_main, Criterion, Throughput};
use hexvale_world::config::{GeneratorConfig, WorldType};
use hexvale_world::generator::TerrainGenerator;
use hexvale_world::noise::{NoiseRegion, PerlinNoise, WorldSeed};
use hexvale_world::ChunkCoords;

fn benchmark_single_sample(c: &mut Criterion) {
    let noise = PerlinNoise::new(WorldSeed::new(42), 100);

    c.bench_function("perlin_single_octave", |b| {
        let mut x = 0.0f64;
        b.iter(|| {
            x += 0.37;
            black_box(noise.perlin(black_box(x), 0.0, black_box(x * 0.7), 0))
        });
    });
}

fn benchmark_octave_perlin(c: &mut Criterion) {
    let noise = PerlinNoise::new(WorldSeed::new(42), 100);

    c.bench_function("octave_perlin_6_octaves", |b| {
        let mut x = 0i32;
        b.iter(|| {
            x = x.wrapping_add(1);
            black_box(noise.octave_perlin(black_box(x), black_box(x / 3), 6, 0.5))
        });
    });
}

fn benchmark_chunk_height_map(c: &mut Criterion) {
    let noise = PerlinNoise::new(WorldSeed::new(42), 100);
    let region = NoiseRegion::new(0, 32, 0, 32, 50);

    let mut group = c.benchmark_group("height_map");
    group.throughput(Throughput::Elements(32 * 32));
    group.bench_function("int_map_32x32_3_octaves", |b| {
        b.iter(|| black_box(noise.get_int_map(black_box(region), 3, 0.5)));
    });
    group.finish();
}

fn benchmark_chunk_generation(c: &mut Criterion) {
    let generator = TerrainGenerator::new(WorldSeed::new(42), WorldType::Grass, GeneratorConfig::default());

    c.bench_function("generate_chunk", |b| {
        let mut x = 0;
        b.iter(|| {
            x = (x + 1) % 64;
            black_box(generator.generate(ChunkCoords::new(x, 3)))
        });
    });
}

criterion_group!(
    benches,
    benchmark_single_sample,
    benchmark_octave_perlin,
    benchmark_chunk_height_map,
    benchmark_chunk_generation,
);
criterion_main!(benches);
