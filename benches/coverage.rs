use bevy_math::{dvec2, DVec2};
use coverage_map::{CoverageMap, Grid, Rect, RingKind};
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn circle_ring(center: DVec2, radius: f64, segments: usize) -> Vec<DVec2> {
    let mut ring: Vec<DVec2> = (0..segments)
        .map(|i| {
            let theta = std::f64::consts::TAU * i as f64 / segments as f64;
            center + dvec2(radius * theta.cos(), radius * theta.sin())
        })
        .collect();
    ring.push(ring[0]);
    ring
}

fn criterion_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("add_ring");
    group.sample_size(50);

    let grid = Grid::bounded(Rect::new(0.0, 0.0, 256.0, 256.0), 1.0, 1.0);
    let ring = circle_ring(dvec2(128.0, 128.0), 100.0, 720);
    group.bench_function("circle_720", |b| {
        b.iter(|| {
            let mut map = CoverageMap::new(black_box(grid.clone()));
            map.add_ring(black_box(&ring), RingKind::Shell).unwrap();
            black_box(map.into_fractions());
        })
    });

    group.finish();
}

criterion_group!(benches, criterion_benchmark);
criterion_main!(benches);
