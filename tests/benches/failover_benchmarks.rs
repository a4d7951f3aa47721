//! # Failsafe Benchmarks
//!
//! | Path | Expectation |
//! |------|-------------|
//! | switch between two scripted backends | dominated by lock handoff |
//! | failover + restore | two switches |
//! | system report | no backend calls |
//! | reference self-tests | real crypto, one round trip each |

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use failsafe_backends::{activate_primaries, register_default_backends, BackendSettings};
use failsafe_engine::test_utils::scripted_crypto;
use failsafe_engine::{ComponentType, FailsafeManager, FailsafeStatus};
use std::time::Duration;
use tokio::runtime::Runtime;

fn runtime() -> Runtime {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .expect("benchmark runtime")
}

fn scripted_manager(rt: &Runtime) -> FailsafeManager {
    rt.block_on(async {
        let manager = FailsafeManager::new();
        for (id, priority) in [("primary", 100), ("alternate", 80)] {
            let (implementation, _) = scripted_crypto(id, priority, FailsafeStatus::Online);
            manager
                .cryptography()
                .register_implementation(implementation)
                .await
                .expect("register");
        }
        manager
    })
}

fn bench_switching(c: &mut Criterion) {
    let rt = runtime();
    let manager = scripted_manager(&rt);
    let mut group = c.benchmark_group("failsafe-switching");

    group.bench_function("switch_round_trip", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(manager.switch_to_crypto("alternate").await);
                black_box(manager.switch_to_crypto("primary").await);
            })
        })
    });

    group.bench_function("failover_and_restore", |b| {
        b.iter(|| {
            rt.block_on(async {
                black_box(manager.simulate_failure(ComponentType::Cryptography).await);
                black_box(manager.switch_to_crypto("primary").await);
            })
        })
    });

    group.bench_function("system_report", |b| {
        b.iter(|| black_box(manager.get_failsafe_report()))
    });

    group.finish();
}

fn bench_reference_self_tests(c: &mut Criterion) {
    let rt = runtime();
    let dir = tempfile::TempDir::new().expect("tempdir");
    let manager = FailsafeManager::new();
    rt.block_on(async {
        let settings = BackendSettings {
            data_dir: dir.path().join("store"),
            ..BackendSettings::default()
        };
        register_default_backends(&manager, &settings)
            .await
            .expect("register reference backends");
        activate_primaries(&manager).await;
    });

    let mut group = c.benchmark_group("failsafe-self-tests");
    group.measurement_time(Duration::from_secs(10));
    group.sample_size(20);
    group.bench_function("test_all_reference_backends", |b| {
        b.iter(|| rt.block_on(async { black_box(manager.test_all().await) }))
    });
    group.finish();
}

criterion_group!(benches, bench_switching, bench_reference_self_tests);
criterion_main!(benches);
