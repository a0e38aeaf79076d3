/*!
 * Tentative Changes
 *
 * Clone-on-write working copy of the live state. A change is applied to the
 * copy, inspected, and then either swapped into the live state or dropped.
 * The live state is never edited in place and never needs an undo.
 */

use crate::core::errors::EngineError;
use crate::core::types::ProcessId;
use crate::state::{MatrixState, ResourceVector};
use tracing::trace;

/// Kind of change carried by a [`TentativeChange`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Grant,
    Release,
}

/// Lifecycle of a tentative change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TentativeState {
    /// Working copy built, not yet decided
    Active,
    /// Working copy swapped into the live state
    Committed,
    /// Working copy dropped
    Discarded,
}

/// Working copy of the live state with one change applied
///
/// # Example
///
/// ```ignore
/// let tentative = TentativeChange::grant(&live, pid, &request)?;
/// if safety::find_safe_sequence(tentative.working()).is_some() {
///     tentative.commit(&mut live);
/// } // dropped otherwise; `live` is untouched
/// ```
#[derive(Debug)]
pub struct TentativeChange {
    change: Change,
    pid: ProcessId,
    working: MatrixState,
    state: TentativeState,
}

impl TentativeChange {
    /// Copy `live` and move `request` from available to `pid`
    pub fn grant(
        live: &MatrixState,
        pid: ProcessId,
        request: &ResourceVector,
    ) -> Result<Self, EngineError> {
        let mut working = live.clone();
        working.apply_grant(pid, request)?;
        Ok(Self::active(Change::Grant, pid, working))
    }

    /// Copy `live` and move `release` from `pid` back to available
    pub fn release(
        live: &MatrixState,
        pid: ProcessId,
        release: &ResourceVector,
    ) -> Result<Self, EngineError> {
        let mut working = live.clone();
        working.apply_release(pid, release)?;
        Ok(Self::active(Change::Release, pid, working))
    }

    fn active(change: Change, pid: ProcessId, working: MatrixState) -> Self {
        Self {
            change,
            pid,
            working,
            state: TentativeState::Active,
        }
    }

    /// The state as it would be after the change
    #[inline]
    pub fn working(&self) -> &MatrixState {
        &self.working
    }

    #[inline]
    pub fn change(&self) -> Change {
        self.change
    }

    #[inline]
    pub fn pid(&self) -> ProcessId {
        self.pid
    }

    #[inline]
    pub fn state(&self) -> TentativeState {
        self.state
    }

    /// Swap the working copy into `live`
    pub fn commit(mut self, live: &mut MatrixState) {
        std::mem::swap(live, &mut self.working);
        self.state = TentativeState::Committed;
        trace!(change = ?self.change, pid = self.pid, "tentative change committed");
    }

    /// Drop the working copy explicitly
    pub fn discard(mut self) {
        self.state = TentativeState::Discarded;
        trace!(change = ?self.change, pid = self.pid, "tentative change discarded");
    }
}

impl Drop for TentativeChange {
    fn drop(&mut self) {
        if self.state == TentativeState::Active {
            trace!(change = ?self.change, pid = self.pid, "tentative change dropped undecided");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::classic_state;

    #[test]
    fn test_commit_replaces_live_state() {
        let mut live = classic_state();
        let tentative =
            TentativeChange::grant(&live, 1, &ResourceVector::new(vec![1, 0, 2])).unwrap();
        assert_eq!(tentative.state(), TentativeState::Active);
        assert_eq!(
            tentative.working().available(),
            &ResourceVector::new(vec![2, 3, 0])
        );
        assert_eq!(live, classic_state());

        tentative.commit(&mut live);
        assert_eq!(live.available(), &ResourceVector::new(vec![2, 3, 0]));
        assert_eq!(live.allocation(1), Some(&ResourceVector::new(vec![3, 0, 2])));
    }

    #[test]
    fn test_discard_leaves_live_state() {
        let live = classic_state();
        let tentative =
            TentativeChange::grant(&live, 0, &ResourceVector::new(vec![0, 2, 0])).unwrap();
        tentative.discard();
        assert_eq!(live, classic_state());
    }

    #[test]
    fn test_release_working_copy() {
        let live = classic_state();
        let tentative =
            TentativeChange::release(&live, 2, &ResourceVector::new(vec![3, 0, 0])).unwrap();
        assert_eq!(tentative.change(), Change::Release);
        assert_eq!(tentative.pid(), 2);
        assert_eq!(
            tentative.working().available(),
            &ResourceVector::new(vec![6, 3, 2])
        );
    }

    #[test]
    fn test_grant_beyond_available_is_invariant_violation() {
        let live = classic_state();
        let err = TentativeChange::grant(&live, 0, &ResourceVector::new(vec![4, 0, 0]))
            .unwrap_err();
        assert!(matches!(err, EngineError::InvariantViolation(_)));
    }
}
