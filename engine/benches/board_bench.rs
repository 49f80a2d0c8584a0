use std::collections::HashSet;
use std::hint::black_box;

use criterion::{criterion_group, criterion_main, Criterion};
use fish_engine::board::Board;
use fish_engine::coord::Coord;
use rand::prelude::*;

fn benchmark_reachable_from(c: &mut Criterion) {
    let mut rng = StdRng::seed_from_u64(0);
    let board = Board::randomized_with_holes(8, 7, &[], 0, &mut rng).unwrap();
    let src = Coord::from_row_col(3, 3);
    let blocked = HashSet::new();

    c.bench_function("board_reachable_from", |b| {
        b.iter(|| black_box(board.reachable_from(black_box(src), &blocked)))
    });
}

criterion_group!(benches, benchmark_reachable_from);
criterion_main!(benches);
