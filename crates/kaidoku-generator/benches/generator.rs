//! Benchmarks one full generation attempt: board walk, hole digging, and
//! difficulty classification.

use criterion::{Criterion, criterion_group, criterion_main};
use kaidoku_generator::{PuzzleGenerator, PuzzleSeed};
use std::hint::black_box;

fn bench_generate_once(c: &mut Criterion) {
    c.bench_function("generate_once", |b| {
        let mut generator = PuzzleGenerator::with_seed(PuzzleSeed([3u8; 32]));
        b.iter(|| black_box(generator.generate_once()));
    });
}

criterion_group!(benches, bench_generate_once);
criterion_main!(benches);
