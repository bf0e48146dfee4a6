use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use std::hint::black_box;
use treasure_sweeper_core::*;

fn bench_generation(c: &mut Criterion) {
    let mut group = c.benchmark_group("generate");
    for difficulty in Difficulty::ALL {
        group.bench_with_input(
            BenchmarkId::from_parameter(difficulty),
            &difficulty.profile(),
            |b, &profile| {
                let mut seed = 0;
                b.iter(|| {
                    seed += 1;
                    black_box(Board::with_seed(profile, seed).unwrap())
                })
            },
        );
    }
    group.finish();
}

fn bench_first_reveal(c: &mut Criterion) {
    let mut group = c.benchmark_group("first_reveal");
    for difficulty in Difficulty::ALL {
        let profile = difficulty.profile();
        let board = Board::with_seed(profile, 7).unwrap();
        let center = (profile.x_size / 2, profile.y_size / 2);
        group.bench_function(BenchmarkId::from_parameter(difficulty), |b| {
            b.iter_batched(
                || board.clone(),
                |mut board| black_box(board.reveal_cell(center).unwrap()),
                criterion::BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_generation, bench_first_reveal);
criterion_main!(benches);
