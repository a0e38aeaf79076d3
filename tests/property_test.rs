/*!
 * Property Tests
 * Admission never leaves the live state unsafe or leaks units
 */

use banker_kernel::admission::{AdmissionResult, AllocationEngine, ResourceRequest};
use banker_kernel::config::{parse_text, to_text};
use banker_kernel::safety;
use banker_kernel::state::{MatrixState, ResourceVector};
use proptest::prelude::*;

fn arb_state() -> impl Strategy<Value = MatrixState> {
    (0usize..6, 0usize..4)
        .prop_flat_map(|(processes, resources)| {
            (
                prop::collection::vec(0u64..8, resources),
                prop::collection::vec(
                    (
                        prop::collection::vec(0u64..6, resources),
                        prop::collection::vec(0u64..6, resources),
                    ),
                    processes,
                ),
            )
        })
        .prop_map(|(available, rows)| {
            let (allocation, max_claim): (Vec<_>, Vec<_>) = rows
                .into_iter()
                .map(|(held, extra)| {
                    let max: Vec<u64> = held.iter().zip(&extra).map(|(h, e)| h + e).collect();
                    (ResourceVector::new(held), ResourceVector::new(max))
                })
                .unzip();
            MatrixState::new(ResourceVector::new(available), allocation, max_claim).unwrap()
        })
}

/// Replays a witness order, checking each step is actually possible
fn witness_is_valid(state: &MatrixState, sequence: &[usize]) -> bool {
    let mut work = state.available().clone();
    let mut seen = vec![false; state.process_count()];
    for &pid in sequence {
        let need = match state.need(pid) {
            Some(need) => need,
            None => return false,
        };
        if seen[pid] || !need.fits_within(&work) {
            return false;
        }
        seen[pid] = true;
        work.accumulate(&state.allocation_rows()[pid]);
    }
    seen.iter().all(|&s| s)
}

proptest! {
    #[test]
    fn prop_granted_states_stay_safe(
        state in arb_state(),
        requests in prop::collection::vec((0i64..6, prop::collection::vec(0i64..4, 0..4)), 1..12),
    ) {
        let started_safe = safety::find_safe_sequence(&state).is_some();
        let baseline = state.total();
        let engine = AllocationEngine::new(state);

        for (pid, amounts) in requests {
            let before = engine.snapshot().state;
            let result = engine.submit_request(&ResourceRequest::new(pid, amounts)).unwrap();
            let after = engine.snapshot().state;

            prop_assert_eq!(after.total(), baseline.clone());
            match result {
                AdmissionResult::Granted { safe_sequence, .. } => {
                    prop_assert!(witness_is_valid(&after, &safe_sequence));
                }
                AdmissionResult::RejectedUnsafe { .. } | AdmissionResult::RejectedInvalid { .. } => {
                    prop_assert_eq!(&after, &before);
                }
            }
            if started_safe {
                prop_assert!(safety::find_safe_sequence(&after).is_some());
            }
        }
    }

    #[test]
    fn prop_safety_check_is_deterministic(state in arb_state()) {
        let first = safety::check(&state);
        let second = safety::check(&state);
        prop_assert_eq!(&first, &second);
        if first.safe {
            prop_assert!(witness_is_valid(&state, &first.sequence));
        } else {
            prop_assert!(!first.unfinished.is_empty());
        }
    }

    #[test]
    fn prop_text_round_trip(state in arb_state()) {
        prop_assert_eq!(parse_text(&to_text(&state)).unwrap(), state);
    }

    #[test]
    fn prop_full_release_empties_allocation(state in arb_state(), pid in 0usize..6) {
        prop_assume!(pid < state.process_count());
        let held = state.allocation_rows()[pid].clone();
        let engine = AllocationEngine::new(state.clone());

        let outcome = engine.release_resources(pid, &held).unwrap();
        prop_assert!(outcome.is_released());
        let released = engine.snapshot().state;
        prop_assert_eq!(released.total(), state.total());
        prop_assert!(released.allocation(pid).unwrap().iter().all(|v| v == 0));
    }
}
