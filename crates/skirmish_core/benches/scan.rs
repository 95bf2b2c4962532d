//! Scan benchmarks for skirmish_core.
//!
//! Run with: `cargo bench -p skirmish_core`

// Benchmark binaries don't need docs on macro-generated functions
#![allow(missing_docs)]

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use skirmish_core::arena::Arena;
use skirmish_core::data::SoldierProfile;
use skirmish_core::policy::decide;
use skirmish_core::scanner::{count_enemies_remaining, nearest_enemy_direction};
use skirmish_core::simulation::Skirmish;
use skirmish_core::spatial::GridPos;
use skirmish_core::team::Team;

/// 64x64 arena with the two teams on opposite flanks.
fn flank_arena() -> Arena {
    let arena = Arena::new(64, 64).expect("valid dimensions");
    for row in (0..64).step_by(2) {
        arena.place(GridPos::new(row, 0), Team::Red).expect("empty cell");
        arena.place(GridPos::new(row, 63), Team::Blue).expect("empty cell");
    }
    arena
}

/// Runs full-grid scan benchmarks for the skirmish_core crate.
pub fn scan_benchmark(c: &mut Criterion) {
    let arena = flank_arena();
    let origin = GridPos::new(32, 0);

    c.bench_function("count_enemies_remaining_64x64", |b| {
        b.iter(|| count_enemies_remaining(black_box(&arena), Team::Red))
    });

    c.bench_function("nearest_enemy_unbounded_64x64", |b| {
        b.iter(|| nearest_enemy_direction(black_box(&arena), origin, Team::Red, u32::MAX))
    });

    c.bench_function("decide_64x64", |b| {
        b.iter(|| decide(black_box(&arena), origin, Team::Red))
    });
}

/// Runs whole-round benchmarks.
pub fn round_benchmark(c: &mut Criterion) {
    c.bench_function("play_round_64_soldiers", |b| {
        b.iter_batched(
            flank_arena,
            |arena| {
                let mut battle = Skirmish::muster(&arena, SoldierProfile::default());
                battle.play_round().expect("round completes");
                battle.state_hash()
            },
            criterion::BatchSize::SmallInput,
        )
    });
}

criterion_group!(benches, scan_benchmark, round_benchmark);
criterion_main!(benches);
