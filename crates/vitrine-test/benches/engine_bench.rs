//! Benchmarks for the per-frame engine path

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use vitrine_core::Skeleton;
use vitrine_gesture::{IntentArbitrator, IntentConfig};
use vitrine_runtime::Engine;
use vitrine_test::{NoiseConfig, NoisySensor, SkeletonBuilder, FRAME_DT};

fn crowd(count: u64) -> Vec<Skeleton> {
    (1..=count)
        .map(|id| {
            SkeletonBuilder::standing(id)
                .shifted(id as f32 * 0.7)
                .zoom_pose(0.4)
                .build()
        })
        .collect()
}

fn bench_engine_tick_single(c: &mut Criterion) {
    let mut engine = Engine::default();
    let bodies = crowd(1);

    c.bench_function("engine_tick_single", |b| {
        b.iter(|| black_box(engine.tick(black_box(&bodies), FRAME_DT).zoom_value))
    });
}

fn bench_engine_tick_crowd(c: &mut Criterion) {
    let mut engine = Engine::default();
    let bodies = crowd(6);

    c.bench_function("engine_tick_crowd", |b| {
        b.iter(|| black_box(engine.tick(black_box(&bodies), FRAME_DT).intent))
    });
}

fn bench_engine_tick_noisy(c: &mut Criterion) {
    let mut engine = Engine::default();
    let mut sensor = NoisySensor::new(NoiseConfig::harsh(), 5);
    let body = SkeletonBuilder::standing(1).rotate_left().build();

    c.bench_function("engine_tick_noisy", |b| {
        b.iter(|| {
            let observed = [sensor.observe(&body)];
            black_box(engine.tick(&observed, FRAME_DT).rotation)
        })
    });
}

fn bench_intent_arbitrate(c: &mut Criterion) {
    let mut engine = Engine::default();
    let bodies = crowd(1);
    for _ in 0..30 {
        engine.tick(&bodies, FRAME_DT);
    }
    let joints = engine.snapshot().joints.clone();
    let arbitrator = IntentArbitrator::new(IntentConfig::default());

    c.bench_function("intent_arbitrate", |b| {
        b.iter(|| arbitrator.arbitrate(black_box(&joints)))
    });
}

criterion_group!(
    benches,
    bench_engine_tick_single,
    bench_engine_tick_crowd,
    bench_engine_tick_noisy,
    bench_intent_arbitrate,
);
criterion_main!(benches);
