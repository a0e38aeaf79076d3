/*!
 * Safety Algorithm Benchmarks
 *
 * Scan cost on worst-case orderings and admission throughput
 */

use banker_kernel::admission::AllocationEngine;
use banker_kernel::config::classic_state;
use banker_kernel::safety;
use banker_kernel::state::{MatrixState, ResourceVector};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

/// Only the last process can finish first, then the one before it, and so on
fn reverse_chain(processes: usize, resources: usize) -> MatrixState {
    let allocation = vec![ResourceVector::new(vec![1; resources]); processes];
    let max_claim = (0..processes)
        .map(|i| ResourceVector::new(vec![1 + (processes - i) as u64; resources]))
        .collect();
    MatrixState::new(ResourceVector::new(vec![1; resources]), allocation, max_claim).unwrap()
}

fn bench_safety_scan(c: &mut Criterion) {
    let mut group = c.benchmark_group("safety_scan");

    for (processes, resources) in [(16, 4), (128, 8), (1024, 16), (1024, 256)] {
        let state = reverse_chain(processes, resources);
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}x{}", processes, resources)),
            &state,
            |b, state| {
                b.iter(|| black_box(safety::find_safe_sequence(black_box(state))));
            },
        );
    }

    group.finish();
}

fn bench_safety_check_with_log(c: &mut Criterion) {
    let state = reverse_chain(128, 8);
    c.bench_function("safety_check_with_log_128x8", |b| {
        b.iter(|| black_box(safety::check(black_box(&state))));
    });
}

fn bench_admission_round_trip(c: &mut Criterion) {
    let engine = AllocationEngine::new(classic_state());
    let request = ResourceVector::new(vec![1, 0, 2]);

    c.bench_function("request_then_release", |b| {
        b.iter(|| {
            let result = engine.request_resources(1, &request).unwrap();
            if result.is_granted() {
                engine.release_resources(1, &request).unwrap();
            }
            black_box(result)
        });
    });
}

criterion_group!(
    benches,
    bench_safety_scan,
    bench_safety_check_with_log,
    bench_admission_round_trip
);

criterion_main!(benches);
