/*!
 * Allocation Engine
 *
 * Single authority over one live allocation state. Every mutation happens
 * under the write half of one lock; reads take the read half and therefore
 * never observe a half-applied change.
 */

use super::stats::{EngineStats, StatsSnapshot};
use super::tentative::TentativeChange;
use super::types::{AdmissionResult, ReleaseOutcome, ResourceRequest};
use crate::core::errors::{EngineError, RejectReason};
use crate::core::types::{Generation, ProcessId};
use crate::safety::{self, format_pids, SafetyReport};
use crate::state::{MatrixState, ResourceVector};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Consistent copy of the live state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineSnapshot {
    pub state: MatrixState,
    pub generation: Generation,
    /// Set after an invariant violation until the next reconfiguration
    pub needs_reconfiguration: bool,
}

struct EngineState {
    matrix: MatrixState,
    /// `available + Σ allocation` at configuration time; conserved by every change
    baseline_total: ResourceVector,
    generation: Generation,
    poisoned: Option<String>,
}

impl EngineState {
    fn new(matrix: MatrixState, generation: Generation) -> Self {
        Self {
            baseline_total: matrix.total(),
            matrix,
            generation,
            poisoned: None,
        }
    }

    fn ensure_healthy(&self) -> Result<(), EngineError> {
        match &self.poisoned {
            Some(reason) => Err(EngineError::Poisoned(reason.clone())),
            None => Ok(()),
        }
    }
}

/// Request admission engine
///
/// Cheap to clone; clones share the same live state.
#[derive(Clone)]
pub struct AllocationEngine {
    inner: Arc<RwLock<EngineState>>,
    stats: Arc<EngineStats>,
}

impl AllocationEngine {
    /// Take ownership of an initial, validated state
    pub fn new(state: MatrixState) -> Self {
        info!(
            processes = state.process_count(),
            resources = state.resource_count(),
            "allocation engine initialized"
        );
        Self {
            inner: Arc::new(RwLock::new(EngineState::new(state, 0))),
            stats: Arc::new(EngineStats::new()),
        }
    }

    /// Admit a request arriving from an untyped transport
    ///
    /// Runs the process check before the shape check, then continues
    /// exactly like [`request_resources`](Self::request_resources).
    pub fn submit_request(&self, request: &ResourceRequest) -> Result<AdmissionResult, EngineError> {
        let mut guard = self.inner.write();
        guard.ensure_healthy()?;

        let validated = validate_pid(&guard.matrix, &request.pid).and_then(|pid| {
            validate_amounts(&guard.matrix, &request.amounts).map(|vector| (pid, vector))
        });

        match validated {
            Ok((pid, vector)) => self.admit_locked(&mut guard, pid, &vector),
            Err(reason) => Ok(self.reject_invalid(reason)),
        }
    }

    /// Admit a typed request for `pid`
    ///
    /// Checks, in order: known process, request shape, remaining claim,
    /// availability. Only then is the request applied to a working copy and
    /// tested for safety. Any path other than `Granted` leaves the live
    /// state untouched.
    pub fn request_resources(
        &self,
        pid: ProcessId,
        request: &ResourceVector,
    ) -> Result<AdmissionResult, EngineError> {
        let mut guard = self.inner.write();
        guard.ensure_healthy()?;

        if pid >= guard.matrix.process_count() {
            return Ok(self.reject_invalid(RejectReason::UnknownProcess {
                pid: i64::try_from(pid).unwrap_or(i64::MAX),
            }));
        }
        if request.len() != guard.matrix.resource_count() {
            return Ok(self.reject_invalid(RejectReason::MalformedRequest {
                detail: format!(
                    "expected {} values, got {}",
                    guard.matrix.resource_count(),
                    request.len()
                ),
            }));
        }

        self.admit_locked(&mut guard, pid, request)
    }

    fn admit_locked(
        &self,
        engine: &mut EngineState,
        pid: ProcessId,
        request: &ResourceVector,
    ) -> Result<AdmissionResult, EngineError> {
        let matrix = &engine.matrix;
        let need = matrix
            .need(pid)
            .ok_or_else(|| EngineError::InvariantViolation(format!("P{} has no need row", pid)))?;

        let mut log = vec![
            format!("P{} requests {}", pid, request),
            format!("Check 1: P{} is a known process", pid),
            format!("Check 2: request has {} non-negative values", request.len()),
        ];
        debug!(pid, request = %request, "request passed shape checks");

        if let Some((resource, requested, need)) = request.first_exceeding(&need) {
            return Ok(self.reject_invalid(RejectReason::ClaimExceeded {
                pid,
                resource,
                requested,
                need,
            }));
        }
        log.push(format!("Check 3: request {} <= need {}", request, need));

        if let Some((resource, requested, available)) = request.first_exceeding(matrix.available()) {
            return Ok(self.reject_invalid(RejectReason::InsufficientAvailable {
                resource,
                requested,
                available,
            }));
        }
        log.push(format!(
            "Check 4: request {} <= available {}",
            request,
            matrix.available()
        ));
        debug!(pid, "request within claim and availability");

        let tentative = match TentativeChange::grant(matrix, pid, request) {
            Ok(tentative) => tentative,
            Err(e) => return Err(self.poison(engine, e)),
        };
        log.push(format!(
            "Tentatively allocating: available = {}, allocation of P{} = {}",
            tentative.working().available(),
            pid,
            tentative
                .working()
                .allocation(pid)
                .map(ToString::to_string)
                .unwrap_or_default()
        ));

        let report = safety::check(tentative.working());
        self.stats.inc_safety_checks();
        log.extend(report.log.iter().cloned());

        if !report.safe {
            tentative.discard();
            log.push(format!("Request of P{} denied: state would be unsafe", pid));
            self.stats.inc_rejected_unsafe();
            warn!(
                pid,
                request = %request,
                unfinished = %format_pids(&report.unfinished),
                "request rejected: unsafe state"
            );
            return Ok(AdmissionResult::RejectedUnsafe { log });
        }

        if let Err(e) = tentative.working().check_invariants(&engine.baseline_total) {
            tentative.discard();
            return Err(self.poison(engine, e));
        }

        tentative.commit(&mut engine.matrix);
        engine.generation += 1;
        self.stats.inc_granted();
        log.push(format!("Request of P{} granted", pid));
        info!(
            pid,
            request = %request,
            sequence = %format_pids(&report.sequence),
            generation = engine.generation,
            "request granted"
        );

        Ok(AdmissionResult::Granted {
            safe_sequence: report.sequence,
            log,
        })
    }

    /// Release units arriving from an untyped transport
    pub fn submit_release(&self, release: &ResourceRequest) -> Result<ReleaseOutcome, EngineError> {
        let mut guard = self.inner.write();
        guard.ensure_healthy()?;

        let validated = validate_pid(&guard.matrix, &release.pid).and_then(|pid| {
            validate_amounts(&guard.matrix, &release.amounts).map(|vector| (pid, vector))
        });

        match validated {
            Ok((pid, vector)) => self.release_locked(&mut guard, pid, &vector),
            Err(reason) => Ok(self.reject_release(reason)),
        }
    }

    /// Return units held by `pid` to the pool
    ///
    /// Releasing can only enlarge the pool, so no safety check gates it; the
    /// post-release verdict is still reported.
    pub fn release_resources(
        &self,
        pid: ProcessId,
        release: &ResourceVector,
    ) -> Result<ReleaseOutcome, EngineError> {
        let mut guard = self.inner.write();
        guard.ensure_healthy()?;

        if pid >= guard.matrix.process_count() {
            return Ok(self.reject_release(RejectReason::UnknownProcess {
                pid: i64::try_from(pid).unwrap_or(i64::MAX),
            }));
        }
        if release.len() != guard.matrix.resource_count() {
            return Ok(self.reject_release(RejectReason::MalformedRequest {
                detail: format!(
                    "expected {} values, got {}",
                    guard.matrix.resource_count(),
                    release.len()
                ),
            }));
        }

        self.release_locked(&mut guard, pid, release)
    }

    fn release_locked(
        &self,
        engine: &mut EngineState,
        pid: ProcessId,
        release: &ResourceVector,
    ) -> Result<ReleaseOutcome, EngineError> {
        let held = engine
            .matrix
            .allocation(pid)
            .ok_or_else(|| EngineError::InvariantViolation(format!("P{} has no allocation row", pid)))?;

        if let Some((resource, released, allocated)) = release.first_exceeding(held) {
            return Ok(self.reject_release(RejectReason::ReleaseExceedsAllocation {
                pid,
                resource,
                released,
                allocated,
            }));
        }

        let mut log = vec![format!("P{} releases {} of {}", pid, release, held)];

        let tentative = match TentativeChange::release(&engine.matrix, pid, release) {
            Ok(tentative) => tentative,
            Err(e) => return Err(self.poison(engine, e)),
        };
        if let Err(e) = tentative.working().check_invariants(&engine.baseline_total) {
            tentative.discard();
            return Err(self.poison(engine, e));
        }

        tentative.commit(&mut engine.matrix);
        engine.generation += 1;
        self.stats.inc_released();

        let report = safety::check(&engine.matrix);
        self.stats.inc_safety_checks();
        log.extend(report.log.iter().cloned());
        info!(pid, release = %release, generation = engine.generation, "resources released");

        Ok(ReleaseOutcome::Released {
            safe_sequence: report.safe.then_some(report.sequence),
            log,
        })
    }

    /// Run the safety check against the live state without mutating it
    pub fn check_safety(&self) -> Result<SafetyReport, EngineError> {
        let guard = self.inner.read();
        guard.ensure_healthy()?;

        let report = safety::check(&guard.matrix);
        self.stats.inc_safety_checks();
        debug!(
            safe = report.safe,
            sequence = %format_pids(&report.sequence),
            generation = guard.generation,
            "safety check"
        );
        Ok(report)
    }

    /// Consistent copy of the live state
    pub fn snapshot(&self) -> EngineSnapshot {
        let guard = self.inner.read();
        EngineSnapshot {
            state: guard.matrix.clone(),
            generation: guard.generation,
            needs_reconfiguration: guard.poisoned.is_some(),
        }
    }

    /// Replace the whole live state in one atomic swap
    ///
    /// Clears any poisoned flag. Returns the new generation.
    pub fn reconfigure(&self, state: MatrixState) -> Generation {
        let verdict = safety::find_safe_sequence(&state);
        let mut guard = self.inner.write();
        let generation = guard.generation + 1;
        let processes = state.process_count();
        let resources = state.resource_count();
        *guard = EngineState::new(state, generation);
        drop(guard);

        self.stats.inc_reconfigurations();
        info!(processes, resources, generation, "allocation state replaced");
        if verdict.is_none() {
            warn!(generation, "new allocation state is already unsafe");
        }
        generation
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.stats.snapshot()
    }

    fn reject_invalid(&self, reason: RejectReason) -> AdmissionResult {
        self.stats.inc_rejected_invalid();
        debug!(reason = %reason, detail = %reason.detail(), "request rejected");
        AdmissionResult::RejectedInvalid { reason }
    }

    fn reject_release(&self, reason: RejectReason) -> ReleaseOutcome {
        debug!(reason = %reason, detail = %reason.detail(), "release rejected");
        ReleaseOutcome::RejectedInvalid { reason }
    }

    /// Flag the state as untrustworthy until reconfigured
    fn poison(&self, engine: &mut EngineState, err: EngineError) -> EngineError {
        let reason = err.to_string();
        error!(error = %reason, generation = engine.generation, "invariant violation; engine poisoned");
        engine.poisoned = Some(reason);
        self.stats.inc_invariant_violations();
        err
    }

    #[cfg(test)]
    fn corrupt(&self, f: impl FnOnce(&mut MatrixState)) {
        f(&mut self.inner.write().matrix);
    }
}

fn validate_pid(matrix: &MatrixState, pid: &Result<i64, String>) -> Result<ProcessId, RejectReason> {
    let pid = match pid {
        Ok(pid) => *pid,
        Err(raw) => return Err(RejectReason::InvalidProcessId { pid: raw.clone() }),
    };
    usize::try_from(pid)
        .ok()
        .filter(|&p| p < matrix.process_count())
        .ok_or(RejectReason::UnknownProcess { pid })
}

fn validate_amounts(
    matrix: &MatrixState,
    amounts: &Result<Vec<i64>, String>,
) -> Result<ResourceVector, RejectReason> {
    let amounts = amounts.as_ref().map_err(|detail| RejectReason::MalformedRequest {
        detail: detail.clone(),
    })?;
    if amounts.len() != matrix.resource_count() {
        return Err(RejectReason::MalformedRequest {
            detail: format!(
                "expected {} values, got {}",
                matrix.resource_count(),
                amounts.len()
            ),
        });
    }
    ResourceVector::try_from_signed(amounts).map_err(|value| RejectReason::MalformedRequest {
        detail: format!("negative quantity {}", value),
    })
}
