//! Benchmark A* routing on generated grid venues.

use criterion::{BenchmarkId, Criterion, black_box, criterion_group, criterion_main};
use paddock_core::prelude::*;

/// Square grid of straight paths roughly 50 m apart
fn grid_venue(side: usize) -> WalkGraph {
    let surfaces = [
        SurfaceType::Asphalt,
        SurfaceType::Concrete,
        SurfaceType::Gravel,
        SurfaceType::Grass,
    ];
    let mut builder = VenueGraphBuilder::new();
    for row in 0..side {
        for col in 0..side {
            builder = builder.add_node(
                format!("{row}-{col}"),
                52.0700 + row as f64 * 0.00045,
                -1.0150 + col as f64 * 0.00073,
            );
        }
    }
    for row in 0..side {
        for col in 0..side {
            // Deterministic patchwork of shade
            let shade = ((row * 7 + col * 3) % 5) as f32 / 4.0;
            let surface = surfaces[(row * 3 + col) % surfaces.len()];
            if col + 1 < side {
                builder = builder.add_straight_path(
                    format!("h{row}-{col}"),
                    format!("{row}-{col}"),
                    format!("{row}-{}", col + 1),
                    surface,
                    shade,
                );
            }
            if row + 1 < side {
                builder = builder.add_straight_path(
                    format!("v{row}-{col}"),
                    format!("{row}-{col}"),
                    format!("{}-{col}", row + 1),
                    surface,
                    1.0 - shade,
                );
            }
        }
    }
    builder.build()
}

fn bench_corner_to_corner(c: &mut Criterion) {
    let mut group = c.benchmark_group("astar_corner_to_corner");

    for side in [10, 30, 60] {
        let graph = grid_venue(side);
        let target = format!("{}-{}", side - 1, side - 1);

        for (label, preference, temperature) in [
            ("fastest", RoutePreference::Fastest, 20.0),
            ("coolest_hot", RoutePreference::Coolest, 35.0),
        ] {
            group.bench_with_input(BenchmarkId::new(label, side), &side, |b, _| {
                b.iter(|| {
                    let route = find_route(
                        black_box(&graph),
                        "0-0",
                        &target,
                        preference,
                        temperature,
                    );
                    black_box(route)
                })
            });
        }
    }

    group.finish();
}

fn bench_one_to_many(c: &mut Criterion) {
    let side = 30;
    let graph = grid_venue(side);
    let targets: Vec<String> = (0..side)
        .map(|i| format!("{}-{}", side - 1, i))
        .collect();

    c.bench_function("one_to_many_30x30_edge_row", |b| {
        b.iter(|| {
            let routes = find_routes_one_to_many(
                black_box(&graph),
                "0-0",
                &targets,
                RoutePreference::Coolest,
                35.0,
            );
            black_box(routes)
        })
    });
}

criterion_group!(benches, bench_corner_to_corner, bench_one_to_many);
criterion_main!(benches);
