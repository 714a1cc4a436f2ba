//! Per-frame latency benchmarks
//!
//! The pipeline budget is the inter-frame interval at 15 fps (66 ms);
//! a full frame (ingest gate + angles + state machine + scoring) is
//! expected to come in orders of magnitude under it.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use forma_core::{ExerciseId, FrameTime};
use forma_engine::angles::three_point_angle;
use forma_engine::{AnalysisPipeline, ScoringConfig};
use forma_templates::builtin_catalog;
use forma_test::{knee_frame, SquatScript};

fn bench_full_frame(c: &mut Criterion) {
    let store = builtin_catalog();
    let script = SquatScript::full_cycle();

    c.bench_function("pipeline/process_frame", |b| {
        let mut pipeline =
            AnalysisPipeline::for_exercise(&store, ExerciseId(1), ScoringConfig::default());
        let mut step = 0usize;
        let mut now = 0u64;
        b.iter(|| {
            let (theta, _) = script.steps[step % script.steps.len()];
            step += 1;
            now += 66;
            black_box(pipeline.process(knee_frame(theta), FrameTime::from_millis(now)))
        });
    });
}

fn bench_angle_math(c: &mut Criterion) {
    let points = knee_frame(120.0);

    c.bench_function("angles/three_point", |b| {
        b.iter(|| {
            black_box(three_point_angle(
                black_box(&points[23]),
                black_box(&points[25]),
                black_box(&points[27]),
            ))
        });
    });
}

fn bench_catalog_load(c: &mut Criterion) {
    c.bench_function("templates/builtin_catalog", |b| {
        b.iter(|| black_box(builtin_catalog()));
    });
}

criterion_group!(benches, bench_full_frame, bench_angle_math, bench_catalog_load);
criterion_main!(benches);
