use criterion::{black_box, criterion_group, criterion_main, Criterion};

use frustum_compact::compact::{CompactionConfig, CompactionPipeline, MergeStrategy};
use frustum_compact::math::{Aabb, Aabb4, Frustum};

use glam::{Mat4, Vec3};

fn test_frustum() -> Frustum {
    let view = Mat4::look_at_rh(Vec3::new(0.0, 20.0, 60.0), Vec3::ZERO, Vec3::Y);
    let proj = Mat4::perspective_rh(60f32.to_radians(), 16.0 / 9.0, 0.1, 200.0);
    Frustum::from_view_projection(&(proj * view))
}

fn test_boxes(count: usize) -> Vec<Aabb> {
    (0..count)
        .map(|i| {
            let t = i as f32 * 0.618_034;
            let center = Vec3::new((t * 7.0).sin(), (t * 3.0).cos(), (t * 5.0).sin()) * 150.0;
            Aabb::new(center, Vec3::ONE)
        })
        .collect()
}

fn bench_strategy(c: &mut Criterion, strategy: MergeStrategy, name: &str) {
    let boxes = test_boxes(1 << 18);
    let frustum = test_frustum();
    let mut dst = vec![Aabb::default(); boxes.len()];
    let mut pipeline = CompactionPipeline::new(CompactionConfig {
        strategy,
        ..Default::default()
    })
    .expect("Failed to create pipeline");

    c.bench_function(name, |b| {
        b.iter(|| {
            let count = pipeline
                .compact(black_box(&boxes), &frustum, &mut dst)
                .expect("compaction failed");
            black_box(count);
        });
    });
}

fn bench_sequential_merge(c: &mut Criterion) {
    bench_strategy(c, MergeStrategy::Sequential, "compact_sequential_256k");
}

fn bench_parallel_merge(c: &mut Criterion) {
    bench_strategy(c, MergeStrategy::Parallel, "compact_parallel_256k");
}

fn bench_frustum_scalar_vs_batch(c: &mut Criterion) {
    let frustum = test_frustum();
    let boxes = test_boxes(4096);
    let batches: Vec<Aabb4> = boxes
        .chunks_exact(4)
        .map(|b| Aabb4::from_boxes(&[b[0], b[1], b[2], b[3]]))
        .collect();

    c.bench_function("frustum_scalar_4096", |b| {
        b.iter(|| {
            let visible = boxes
                .iter()
                .filter(|aabb| frustum.is_bounds_in_frustum(black_box(aabb)))
                .count();
            black_box(visible);
        });
    });

    c.bench_function("frustum_aabb4_4096", |b| {
        b.iter(|| {
            let visible: usize = batches
                .iter()
                .map(|batch| {
                    frustum
                        .is_bounds4_in_frustum(black_box(batch))
                        .iter()
                        .filter(|&&inside| inside)
                        .count()
                })
                .sum();
            black_box(visible);
        });
    });
}

criterion_group!(
    benches,
    bench_sequential_merge,
    bench_parallel_merge,
    bench_frustum_scalar_vs_batch,
);
criterion_main!(benches);
