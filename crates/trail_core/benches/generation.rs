//! Generation and search benchmarks for trail_core.
//!
//! Run with: `cargo bench -p trail_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use trail_core::map_generation::generate_map;
use trail_core::pathfinding::find_path;

/// Full generation at a few preset-like sizes.
pub fn generation_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate_map");
    for side in [16_u32, 64, 200] {
        group.bench_with_input(BenchmarkId::from_parameter(side), &side, |b, &side| {
            b.iter(|| generate_map(black_box(side), black_box(side), Some("bench")));
        });
    }
    group.finish();
}

/// Start-to-goal search on an already generated map.
pub fn pathfinding_benchmark(c: &mut Criterion) {
    let Ok(map) = generate_map(200, 200, Some("bench")) else {
        return;
    };
    let (sx, sy) = map.start();
    let (gx, gy) = map.goal();
    c.bench_function("find_path_200", |b| {
        b.iter(|| find_path(black_box(map.grid()), sx, sy, gx, gy));
    });
    c.bench_function("has_multiple_routes_200", |b| {
        b.iter(|| map.has_multiple_routes());
    });
}

criterion_group!(benches, generation_benchmark, pathfinding_benchmark);
criterion_main!(benches);
