/*!
 * Safety Scan Observers
 * Hooks for recording the steps of a safety scan
 */

use crate::core::types::ProcessId;
use crate::state::ResourceVector;

/// Receives each step of a safety scan
///
/// All hooks default to no-ops so observers only implement what they use.
pub trait SafetyObserver {
    /// Scan begins with `work` equal to the available vector
    fn on_start(&mut self, _work: &ResourceVector) {}

    /// `pid` ran to completion and returned `released`; `work` is the new pool
    fn on_finish(
        &mut self,
        _pid: ProcessId,
        _need: &ResourceVector,
        _released: &ResourceVector,
        _work: &ResourceVector,
    ) {
    }

    /// Scan ended; `sequence` is empty unless every process finished
    fn on_verdict(
        &mut self,
        _sequence: &[ProcessId],
        _unfinished: &[ProcessId],
        _work: &ResourceVector,
    ) {
    }
}

/// Observer that records nothing
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopObserver;

impl SafetyObserver for NoopObserver {}

/// Observer that renders each step as a human-readable line
#[derive(Debug, Default, Clone)]
pub struct StepLog {
    lines: Vec<String>,
}

impl StepLog {
    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn into_lines(self) -> Vec<String> {
        self.lines
    }
}

impl SafetyObserver for StepLog {
    fn on_start(&mut self, work: &ResourceVector) {
        self.lines.push(format!("Safety check starts with work = {}", work));
    }

    fn on_finish(
        &mut self,
        pid: ProcessId,
        need: &ResourceVector,
        released: &ResourceVector,
        work: &ResourceVector,
    ) {
        self.lines.push(format!(
            "P{} can finish: need {} fits, releases {}, work = {}",
            pid, need, released, work
        ));
    }

    fn on_verdict(&mut self, sequence: &[ProcessId], unfinished: &[ProcessId], work: &ResourceVector) {
        if unfinished.is_empty() {
            self.lines
                .push(format!("State is safe, sequence: {}", format_pids(sequence)));
        } else {
            self.lines.push(format!(
                "State is unsafe: {} cannot finish with work = {}",
                format_pids(unfinished),
                work
            ));
        }
    }
}

/// Render process ids as `P1, P3, P0`
pub fn format_pids(pids: &[ProcessId]) -> String {
    if pids.is_empty() {
        return "(no processes)".to_string();
    }
    pids.iter()
        .map(|pid| format!("P{}", pid))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_pids() {
        assert_eq!(format_pids(&[1, 3, 0]), "P1, P3, P0");
        assert_eq!(format_pids(&[]), "(no processes)");
    }

    #[test]
    fn test_step_log_records_unsafe_verdict() {
        let mut log = StepLog::default();
        let work = ResourceVector::new(vec![0, 1]);
        log.on_start(&work);
        log.on_verdict(&[], &[0, 2], &work);
        assert_eq!(log.lines().len(), 2);
        assert_eq!(
            log.lines()[1],
            "State is unsafe: P0, P2 cannot finish with work = (0, 1)"
        );
    }
}
