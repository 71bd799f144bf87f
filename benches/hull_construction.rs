//! Hull construction benchmarks across dimensions and point counts.
//!
//! Covers:
//!
//! 1. Convex hulls of uniform random points (interior-heavy input)
//! 2. Convex hulls of points on a sphere (every point is a hull vertex)
//! 3. Delaunay triangulation by lifting
//!
//! Point sets are generated from fixed seeds so runs are comparable. Set
//! `NHULL_BENCH_LARGE=1` to add the large point counts.

#![allow(missing_docs)]

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use nhull::geometry::util::{generate_points_on_sphere_seeded, generate_random_points_seeded};
use nhull::prelude::{ConvexHull, DelaunayTriangulation};

const COUNTS: &[usize] = &[100, 1_000, 10_000];
const LARGE_COUNTS: &[usize] = &[100_000];
const DIMENSIONS: &[usize] = &[2, 3, 4, 5, 6];

fn large_counts_enabled() -> bool {
    std::env::var("NHULL_BENCH_LARGE")
        .map(|value| value != "0")
        .unwrap_or(false)
}

fn counts() -> Vec<usize> {
    let mut counts = COUNTS.to_vec();
    if large_counts_enabled() {
        counts.extend_from_slice(LARGE_COUNTS);
    }
    counts
}

/// Fewer samples for the expensive high-dimensional cases.
const fn sample_size(dimension: usize) -> usize {
    match dimension {
        0..=3 => 50,
        4 => 20,
        _ => 10,
    }
}

fn bench_random_hulls(c: &mut Criterion) {
    for &dimension in DIMENSIONS {
        let mut group = c.benchmark_group(format!("convex_hull_random_{dimension}d"));
        group.sample_size(sample_size(dimension));
        for count in counts() {
            let seed = 0xC0FF_EE00 + (dimension * 1_000 + count) as u64;
            let Ok(points) = generate_random_points_seeded(count, dimension, (-100.0, 100.0), seed)
            else {
                tracing::error!(dimension, count, "point generation failed");
                continue;
            };
            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
                b.iter(|| black_box(ConvexHull::from_points(black_box(points))));
            });
        }
        group.finish();
    }
}

fn bench_sphere_hulls(c: &mut Criterion) {
    for &dimension in &DIMENSIONS[..4] {
        let mut group = c.benchmark_group(format!("convex_hull_sphere_{dimension}d"));
        group.sample_size(sample_size(dimension));
        for &count in &COUNTS[..2] {
            let Ok(points) =
                generate_points_on_sphere_seeded(count, dimension, 10.0, 7 + dimension as u64)
            else {
                tracing::error!(dimension, count, "sphere point generation failed");
                continue;
            };
            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
                b.iter(|| black_box(ConvexHull::from_points(black_box(points))));
            });
        }
        group.finish();
    }
}

fn bench_delaunay(c: &mut Criterion) {
    for &dimension in &DIMENSIONS[..3] {
        let mut group = c.benchmark_group(format!("delaunay_{dimension}d"));
        group.sample_size(sample_size(dimension + 1));
        for &count in &COUNTS[..2] {
            let Ok(points) =
                generate_random_points_seeded(count, dimension, (-100.0, 100.0), 42 + count as u64)
            else {
                tracing::error!(dimension, count, "point generation failed");
                continue;
            };
            group.throughput(Throughput::Elements(count as u64));
            group.bench_with_input(BenchmarkId::from_parameter(count), &points, |b, points| {
                b.iter(|| black_box(DelaunayTriangulation::from_points(black_box(points))));
            });
        }
        group.finish();
    }
}

criterion_group!(
    benches,
    bench_random_hulls,
    bench_sphere_hulls,
    bench_delaunay
);
criterion_main!(benches);
