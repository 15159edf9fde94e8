//! Benchmarks for placement, evaluation and search.

use std::path::Path;

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use blockfall::search::{evaluate, search};
use blockfall::{Field, Game, SearchConfig, Weights};

fn data_game() -> Game {
    let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("data");
    match Game::load(&dir) {
        Ok(game) => game,
        Err(e) => panic!("cannot load benchmark game: {e}"),
    }
}

/// A field with a few scattered placements.
fn busy_field(game: &Game) -> Field {
    let mut field = Field::new();
    for (step, piece) in game.pieces().iter().enumerate() {
        let xpos = (step * 3 % 11) as i32;
        if let Err(e) = field.place(piece.form(step), xpos) {
            panic!("benchmark placement at column {xpos} rejected: {e}");
        }
    }
    field
}

/// Benchmark dropping every form of every piece on an empty field.
fn bench_place(c: &mut Criterion) {
    let game = data_game();

    c.bench_function("place_all_forms", |b| {
        b.iter(|| {
            let mut cleared = 0;
            for piece in game.pieces() {
                for form in piece.distinct_forms() {
                    let mut field = Field::new();
                    if let Ok(lines) = field.place(black_box(form), 5) {
                        cleared += lines;
                    }
                }
            }
            cleared
        })
    });
}

fn bench_evaluate(c: &mut Criterion) {
    let game = data_game();
    let field = busy_field(&game);
    let weights = Weights::default();

    c.bench_function("evaluate", |b| {
        b.iter(|| evaluate(black_box(&field), 0, &weights))
    });
}

/// Benchmark a two-ply search, sequential and parallel.
fn bench_search(c: &mut Criterion) {
    let game = data_game();
    let field = busy_field(&game);
    let sequential = SearchConfig {
        depth: 2,
        ..SearchConfig::default()
    };
    let parallel = SearchConfig {
        parallel: true,
        ..sequential
    };

    let mut group = c.benchmark_group("search");
    group.sample_size(10);
    group.bench_function("depth_2", |b| {
        b.iter(|| search(&game, black_box(&field), 0, 0, 2, &sequential))
    });
    group.bench_function("depth_2_parallel", |b| {
        b.iter(|| search(&game, black_box(&field), 0, 0, 2, &parallel))
    });
    group.finish();
}

criterion_group!(benches, bench_place, bench_evaluate, bench_search);
criterion_main!(benches);
