/*!
 * Safety Algorithm
 *
 * Decides whether every process can still run to completion from a given
 * allocation state, and produces one completion order as a witness.
 *
 * The scan always restarts from the lowest process index after a process
 * finishes, so the witness is deterministic for a given state.
 */

mod observer;

pub use observer::{format_pids, NoopObserver, SafetyObserver, StepLog};

use crate::core::serde::is_empty_vec;
use crate::core::types::ProcessId;
use crate::state::MatrixState;
use serde::{Deserialize, Serialize};

/// Result of a safety check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SafetyReport {
    pub safe: bool,
    /// Completion order witnessing safety; empty when unsafe
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub sequence: Vec<ProcessId>,
    /// Processes that could not finish; empty when safe
    #[serde(default, skip_serializing_if = "is_empty_vec")]
    pub unfinished: Vec<ProcessId>,
    #[serde(default)]
    pub log: Vec<String>,
}

impl SafetyReport {
    /// The witness order, only when the state is safe
    pub fn safe_sequence(&self) -> Option<&[ProcessId]> {
        self.safe.then_some(self.sequence.as_slice())
    }
}

/// Raw outcome of a scan
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub sequence: Vec<ProcessId>,
    pub unfinished: Vec<ProcessId>,
}

impl Verdict {
    #[inline]
    pub fn is_safe(&self) -> bool {
        self.unfinished.is_empty()
    }
}

/// Run the safety scan, reporting each step to `observer`
///
/// O(P² · R): at most P passes, each touching every unfinished row once.
pub fn scan<O: SafetyObserver>(state: &MatrixState, observer: &mut O) -> Verdict {
    let processes = state.process_count();
    let need = state.need_matrix();
    let allocation = state.allocation_rows();

    let mut work = state.available().clone();
    let mut finished = vec![false; processes];
    let mut sequence = Vec::with_capacity(processes);

    observer.on_start(&work);

    while let Some(pid) =
        (0..processes).find(|&i| !finished[i] && need[i].fits_within(&work))
    {
        work.accumulate(&allocation[pid]);
        finished[pid] = true;
        sequence.push(pid);
        observer.on_finish(pid, &need[pid], &allocation[pid], &work);
    }

    let unfinished: Vec<ProcessId> = (0..processes).filter(|&i| !finished[i]).collect();
    if !unfinished.is_empty() {
        sequence.clear();
    }

    observer.on_verdict(&sequence, &unfinished, &work);

    Verdict {
        sequence,
        unfinished,
    }
}

/// Witness order if the state is safe, without building a step log
pub fn find_safe_sequence(state: &MatrixState) -> Option<Vec<ProcessId>> {
    let verdict = scan(state, &mut NoopObserver);
    verdict.is_safe().then_some(verdict.sequence)
}

/// Full safety check with a human-readable step log
pub fn check(state: &MatrixState) -> SafetyReport {
    let mut log = StepLog::default();
    let verdict = scan(state, &mut log);

    SafetyReport {
        safe: verdict.is_safe(),
        sequence: verdict.sequence,
        unfinished: verdict.unfinished,
        log: log.into_lines(),
    }
}
