/*!
 * Safety Algorithm Tests
 * Witness order, unsafe detection and step logs
 */

use banker_kernel::config::{classic_state, parse_text};
use banker_kernel::safety::{self, SafetyObserver};
use banker_kernel::state::{MatrixState, ResourceVector};
use pretty_assertions::assert_eq;

fn state(text: &str) -> MatrixState {
    parse_text(text).unwrap()
}

#[test]
fn test_classic_witness_and_log() {
    let report = safety::check(&classic_state());
    assert!(report.safe);
    assert_eq!(report.sequence, vec![1, 3, 0, 2, 4]);
    assert_eq!(
        report.log.first().map(String::as_str),
        Some("Safety check starts with work = (3, 3, 2)")
    );
    assert_eq!(
        report.log[1],
        "P1 can finish: need (1, 2, 2) fits, releases (2, 0, 0), work = (5, 3, 2)"
    );
    assert_eq!(report.log.len(), 7);
}

#[test]
fn test_unsafe_state_reports_stuck_processes() {
    // P1 can finish, P0 and P2 both need two more units of R0
    let s = state("3\n1\n0\n1\n1\n1\n3\n1\n3\n");
    let report = safety::check(&s);
    assert!(!report.safe);
    assert!(report.sequence.is_empty());
    assert_eq!(report.unfinished, vec![0, 2]);
    assert_eq!(
        report.log.last().map(String::as_str),
        Some("State is unsafe: P0, P2 cannot finish with work = (1)")
    );
    assert_eq!(safety::find_safe_sequence(&s), None);
}

#[test]
fn test_empty_and_zero_width_states_are_safe() {
    let report = safety::check(&state("0\n0\n"));
    assert!(report.safe);
    assert!(report.sequence.is_empty());

    let report = safety::check(&state("3\n0\n"));
    assert_eq!(report.sequence, vec![0, 1, 2]);
}

#[test]
fn test_scan_restarts_from_lowest_index() {
    // P2 finishes first; its release lets P0 run before P1
    let s = state("3\n1\n1\n0\n1\n1\n2\n3\n2\n");
    assert_eq!(safety::find_safe_sequence(&s), Some(vec![2, 0, 1]));
}

#[test]
fn test_check_does_not_mutate() {
    let s = classic_state();
    let before = s.clone();
    let first = safety::check(&s);
    let second = safety::check(&s);
    assert_eq!(s, before);
    assert_eq!(first, second);
}

#[derive(Default)]
struct Counter {
    finished: Vec<usize>,
    verdicts: usize,
}

impl SafetyObserver for Counter {
    fn on_finish(
        &mut self,
        pid: usize,
        _need: &ResourceVector,
        _released: &ResourceVector,
        _work: &ResourceVector,
    ) {
        self.finished.push(pid);
    }

    fn on_verdict(&mut self, _sequence: &[usize], _unfinished: &[usize], _work: &ResourceVector) {
        self.verdicts += 1;
    }
}

#[test]
fn test_custom_observer_sees_each_step() {
    let mut counter = Counter::default();
    let verdict = safety::scan(&classic_state(), &mut counter);
    assert!(verdict.is_safe());
    assert_eq!(counter.finished, verdict.sequence);
    assert_eq!(counter.verdicts, 1);
}
