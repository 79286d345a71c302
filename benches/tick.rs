//! Benchmarks for the per-frame simulation update.
//!
//! Run with: `cargo bench`

use std::time::Duration;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use glam::Vec3;

use event_horizon::integrator::{integrate, Kinematics};
use event_horizon::{DrawableStore, Scene, SimConfig, TunableUpdate};

fn full_scene(trail_length: u32) -> Scene<DrawableStore> {
    let mut scene = Scene::with_seed(SimConfig::default(), DrawableStore::new(), 11)
        .expect("default config is valid");
    scene
        .update_tunable(TunableUpdate::TrailLength(trail_length))
        .expect("trail length in range");
    for _ in 0..scene.pool().capacity() {
        scene.spawn();
    }
    scene
}

fn bench_tick(c: &mut Criterion) {
    let mut group = c.benchmark_group("tick_full_pool");

    for trail_length in [20, 100, 300] {
        group.bench_with_input(
            BenchmarkId::from_parameter(trail_length),
            &trail_length,
            |b, &len| {
                let mut scene = full_scene(len);
                b.iter(|| {
                    // keep the pool topped up so every iteration ticks a full pool
                    let report = scene.frame(Duration::from_millis(10));
                    scene.backend_mut().take_dirty();
                    black_box(report)
                })
            },
        );
    }

    group.finish();
}

fn bench_integrate(c: &mut Criterion) {
    let config = SimConfig::default();
    let state = Kinematics {
        position: Vec3::new(20.0, 5.0, 0.3),
        velocity: Vec3::new(0.0, 0.06, 0.0),
    };

    c.bench_function("integrate", |b| {
        b.iter(|| {
            black_box(integrate(
                black_box(state),
                &config.tunables,
                &config.physics,
            ))
        })
    });
}

fn bench_spawn_churn(c: &mut Criterion) {
    c.bench_function("spawn_at_capacity", |b| {
        let mut scene = full_scene(20);
        b.iter(|| black_box(scene.spawn()))
    });
}

criterion_group!(benches, bench_tick, bench_integrate, bench_spawn_churn);
criterion_main!(benches);
