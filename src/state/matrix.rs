/*!
 * Matrix State
 * Available vector plus per-process allocation and maximum claim rows
 */

use super::vector::ResourceVector;
use crate::core::errors::{ConfigError, EngineError};
use crate::core::limits::{MAX_PROCESSES, MAX_QUANTITY, MAX_RESOURCE_TYPES};
use crate::core::types::{ProcessId, ResourceId};

/// Authoritative resource-allocation state
///
/// Invariants held by every constructed value:
/// - `allocation.len() == max_claim.len() == P`, every row has length `R`
/// - `allocation[i][j] <= max_claim[i][j]`
/// - `available[j] + Σ allocation[i][j] <= MAX_QUANTITY`
///
/// `need` and `total` are derived on demand, never stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatrixState {
    available: ResourceVector,
    allocation: Vec<ResourceVector>,
    max_claim: Vec<ResourceVector>,
}

impl MatrixState {
    /// Build a validated state from the available vector and both matrices
    pub fn new(
        available: ResourceVector,
        allocation: Vec<ResourceVector>,
        max_claim: Vec<ResourceVector>,
    ) -> Result<Self, ConfigError> {
        let resources = available.len();
        let processes = allocation.len();

        check_limit("resource type count", MAX_RESOURCE_TYPES, resources)?;
        check_limit("process count", MAX_PROCESSES, processes)?;

        if max_claim.len() != processes {
            return Err(ConfigError::RowCount {
                what: "max matrix".to_string(),
                expected: processes,
                found: max_claim.len(),
            });
        }

        for (pid, (alloc, max)) in allocation.iter().zip(max_claim.iter()).enumerate() {
            check_width(&format!("allocation row {}", pid), resources, alloc)?;
            check_width(&format!("max row {}", pid), resources, max)?;

            if let Some((resource, allocated, max)) = alloc.first_exceeding(max) {
                return Err(ConfigError::AllocationExceedsClaim {
                    pid,
                    resource,
                    allocated,
                    max,
                });
            }
        }

        let state = Self {
            available,
            allocation,
            max_claim,
        };
        state.checked_total()?;
        Ok(state)
    }

    /// Build a state from total instances per resource type
    ///
    /// `available` is derived as `total - Σ allocation`.
    pub fn with_totals(
        total: ResourceVector,
        allocation: Vec<ResourceVector>,
        max_claim: Vec<ResourceVector>,
    ) -> Result<Self, ConfigError> {
        let resources = total.len();
        check_limit("resource type count", MAX_RESOURCE_TYPES, resources)?;
        for (pid, alloc) in allocation.iter().enumerate() {
            check_width(&format!("allocation row {}", pid), resources, alloc)?;
        }

        let allocated = column_sums(&allocation, resources)?;
        let available = total.checked_sub(&allocated).ok_or_else(|| {
            let (resource, allocated, total) = allocated
                .first_exceeding(&total)
                .unwrap_or((0, 0, 0));
            ConfigError::InconsistentTotals {
                resource,
                total,
                allocated,
            }
        })?;

        Self::new(available, allocation, max_claim)
    }

    /// Number of processes `P`
    #[inline]
    pub fn process_count(&self) -> usize {
        self.allocation.len()
    }

    /// Number of resource types `R`
    #[inline]
    pub fn resource_count(&self) -> usize {
        self.available.len()
    }

    #[inline]
    pub fn available(&self) -> &ResourceVector {
        &self.available
    }

    pub fn allocation(&self, pid: ProcessId) -> Option<&ResourceVector> {
        self.allocation.get(pid)
    }

    pub fn max_claim(&self, pid: ProcessId) -> Option<&ResourceVector> {
        self.max_claim.get(pid)
    }

    pub fn allocation_rows(&self) -> &[ResourceVector] {
        &self.allocation
    }

    pub fn max_claim_rows(&self) -> &[ResourceVector] {
        &self.max_claim
    }

    /// Remaining need of one process: `max_claim[pid] - allocation[pid]`
    pub fn need(&self, pid: ProcessId) -> Option<ResourceVector> {
        let alloc = self.allocation.get(pid)?;
        let max = self.max_claim.get(pid)?;
        // allocation <= max_claim holds for every constructed state
        max.checked_sub(alloc)
    }

    /// Need rows for every process, in process order
    pub fn need_matrix(&self) -> Vec<ResourceVector> {
        (0..self.process_count())
            .map(|pid| self.need(pid).unwrap_or_else(|| ResourceVector::zeros(self.resource_count())))
            .collect()
    }

    /// Total instances per resource type: `available + Σ allocation`
    pub fn total(&self) -> ResourceVector {
        let mut total = self.available.clone();
        for row in &self.allocation {
            total.accumulate(row);
        }
        total
    }

    fn checked_total(&self) -> Result<ResourceVector, ConfigError> {
        let allocated = column_sums(&self.allocation, self.resource_count())?;
        let total = self
            .available
            .checked_add(&allocated)
            .ok_or_else(|| ConfigError::Overflow {
                resource: first_overflow(&self.available, &allocated),
            })?;
        let over = total.iter().position(|t| t > MAX_QUANTITY);
        match over {
            Some(resource) => Err(ConfigError::Overflow { resource }),
            None => Ok(total),
        }
    }

    /// Verify every structural invariant plus conservation of `baseline_total`
    pub fn check_invariants(&self, baseline_total: &ResourceVector) -> Result<(), EngineError> {
        let resources = self.resource_count();
        if self.max_claim.len() != self.allocation.len() {
            return Err(EngineError::InvariantViolation(format!(
                "allocation has {} rows but max has {}",
                self.allocation.len(),
                self.max_claim.len()
            )));
        }

        for (pid, (alloc, max)) in self.allocation.iter().zip(self.max_claim.iter()).enumerate() {
            if alloc.len() != resources || max.len() != resources {
                return Err(EngineError::InvariantViolation(format!(
                    "row {} lost its shape",
                    pid
                )));
            }
            if let Some((resource, held, max)) = alloc.first_exceeding(max) {
                return Err(EngineError::InvariantViolation(format!(
                    "P{} holds {} of R{} above its claim of {}",
                    pid, held, resource, max
                )));
            }
        }

        let total = self.checked_total().map_err(|e| EngineError::InvariantViolation(e.to_string()))?;
        if &total != baseline_total {
            return Err(EngineError::InvariantViolation(format!(
                "total changed from {} to {}",
                baseline_total, total
            )));
        }

        Ok(())
    }

    /// Move `request` from available into the allocation of `pid`
    ///
    /// Callers have already validated the request against need and
    /// availability; a failure here means the state itself is corrupt.
    pub(crate) fn apply_grant(
        &mut self,
        pid: ProcessId,
        request: &ResourceVector,
    ) -> Result<(), EngineError> {
        let alloc = self
            .allocation
            .get(pid)
            .ok_or_else(|| EngineError::InvariantViolation(format!("P{} vanished", pid)))?;

        let new_alloc = alloc.checked_add(request).ok_or_else(|| {
            EngineError::InvariantViolation(format!("allocation of P{} overflowed", pid))
        })?;
        let new_available = self.available.checked_sub(request).ok_or_else(|| {
            EngineError::InvariantViolation("available went negative".to_string())
        })?;

        self.allocation[pid] = new_alloc;
        self.available = new_available;
        Ok(())
    }

    /// Move `release` from the allocation of `pid` back into available
    pub(crate) fn apply_release(
        &mut self,
        pid: ProcessId,
        release: &ResourceVector,
    ) -> Result<(), EngineError> {
        let alloc = self
            .allocation
            .get(pid)
            .ok_or_else(|| EngineError::InvariantViolation(format!("P{} vanished", pid)))?;

        let new_alloc = alloc.checked_sub(release).ok_or_else(|| {
            EngineError::InvariantViolation(format!("allocation of P{} went negative", pid))
        })?;
        let new_available = self.available.checked_add(release).ok_or_else(|| {
            EngineError::InvariantViolation("available overflowed".to_string())
        })?;

        self.allocation[pid] = new_alloc;
        self.available = new_available;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn corrupt_available(&mut self, resource: ResourceId, value: crate::core::types::Quantity) {
        self.available = {
            let mut values = self.available.clone().into_inner();
            values[resource] = value;
            ResourceVector::new(values)
        };
    }
}

fn check_limit(what: &str, limit: usize, found: usize) -> Result<(), ConfigError> {
    if found > limit {
        return Err(ConfigError::LimitExceeded {
            what: what.to_string(),
            limit,
            found,
        });
    }
    Ok(())
}

fn check_width(what: &str, expected: usize, row: &ResourceVector) -> Result<(), ConfigError> {
    if row.len() != expected {
        return Err(ConfigError::RowWidth {
            what: what.to_string(),
            expected,
            found: row.len(),
        });
    }
    Ok(())
}

/// Per-resource sums over all rows, rejecting overflow
fn column_sums(rows: &[ResourceVector], resources: usize) -> Result<ResourceVector, ConfigError> {
    let mut sums = ResourceVector::zeros(resources);
    for row in rows {
        sums = sums.checked_add(row).ok_or_else(|| ConfigError::Overflow {
            resource: first_overflow(&sums, row),
        })?;
    }
    Ok(sums)
}

fn first_overflow(a: &ResourceVector, b: &ResourceVector) -> ResourceId {
    a.iter()
        .zip(b.iter())
        .position(|(x, y)| x.checked_add(y).is_none())
        .unwrap_or(0)
}
