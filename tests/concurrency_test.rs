/*!
 * Concurrency Tests
 * Many threads sharing one engine must see only consistent, safe states
 */

use banker_kernel::admission::{AllocationEngine, ResourceRequest};
use banker_kernel::config::classic_state;
use banker_kernel::safety;
use banker_kernel::state::ResourceVector;
use pretty_assertions::assert_eq;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::thread;

const THREADS: usize = 8;
const ROUNDS: usize = 200;

#[test]
fn test_concurrent_requests_and_releases_conserve_units() {
    let engine = AllocationEngine::new(classic_state());
    let baseline = classic_state().total();
    let granted = Arc::new(AtomicU64::new(0));

    let handles: Vec<_> = (0..THREADS)
        .map(|t| {
            let engine = engine.clone();
            let granted = Arc::clone(&granted);
            thread::spawn(move || {
                let pid = t % 5;
                for round in 0..ROUNDS {
                    let mut amounts = vec![0i64; 3];
                    amounts[round % 3] = 1;
                    let result = engine
                        .submit_request(&ResourceRequest::new(pid as i64, amounts.clone()))
                        .unwrap();
                    if result.is_granted() {
                        granted.fetch_add(1, Ordering::Relaxed);
                        // Hand the unit straight back so other threads make progress
                        let release = engine
                            .submit_release(&ResourceRequest::new(pid as i64, amounts))
                            .unwrap();
                        assert!(release.is_released());
                    }
                }
            })
        })
        .collect();

    for handle in handles {
        handle.join().unwrap();
    }

    let snapshot = engine.snapshot();
    assert_eq!(snapshot.state, classic_state());
    assert_eq!(snapshot.state.total(), baseline);

    let stats = engine.stats();
    assert_eq!(stats.granted, granted.load(Ordering::Relaxed));
    assert_eq!(stats.released, stats.granted);
    assert_eq!(stats.total_requests(), (THREADS * ROUNDS) as u64);
    assert_eq!(snapshot.generation, stats.granted * 2);
}

#[test]
fn test_readers_never_observe_unsafe_state() {
    let engine = AllocationEngine::new(classic_state());

    let writer = {
        let engine = engine.clone();
        thread::spawn(move || {
            for round in 0..ROUNDS {
                let pid = round % 5;
                let _ = engine.request_resources(pid, &ResourceVector::new(vec![1, 0, 0]));
                let held = engine.snapshot().state.allocation(pid).cloned();
                if let Some(held) = held {
                    let _ = engine.release_resources(pid, &held);
                }
                if round % 50 == 0 {
                    engine.reconfigure(classic_state());
                }
            }
        })
    };

    let readers: Vec<_> = (0..THREADS / 2)
        .map(|_| {
            let engine = engine.clone();
            thread::spawn(move || {
                for _ in 0..ROUNDS {
                    let snapshot = engine.snapshot();
                    assert_eq!(snapshot.state.total(), classic_state().total());
                    assert!(safety::find_safe_sequence(&snapshot.state).is_some());
                    assert!(engine.check_safety().unwrap().safe);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }
}
