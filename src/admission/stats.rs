/*!
 * Lock-Free Engine Statistics
 * Atomic counters updated on every admission decision
 */

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Atomic engine statistics
///
/// Counters use relaxed ordering; a snapshot is not a consistent cut
/// across counters, only per counter.
#[repr(C, align(64))]
#[derive(Debug, Default)]
pub struct EngineStats {
    granted: AtomicU64,
    rejected_unsafe: AtomicU64,
    rejected_invalid: AtomicU64,
    released: AtomicU64,
    safety_checks: AtomicU64,
    reconfigurations: AtomicU64,
    invariant_violations: AtomicU64,
}

impl EngineStats {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline(always)]
    pub fn inc_granted(&self) {
        self.granted.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_rejected_unsafe(&self) {
        self.rejected_unsafe.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_rejected_invalid(&self) {
        self.rejected_invalid.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_released(&self) {
        self.released.fetch_add(1, Ordering::Relaxed);
    }

    #[inline(always)]
    pub fn inc_safety_checks(&self) {
        self.safety_checks.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_reconfigurations(&self) {
        self.reconfigurations.fetch_add(1, Ordering::Relaxed);
    }

    #[inline]
    pub fn inc_invariant_violations(&self) {
        self.invariant_violations.fetch_add(1, Ordering::Relaxed);
    }

    /// Read all counters
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            granted: self.granted.load(Ordering::Relaxed),
            rejected_unsafe: self.rejected_unsafe.load(Ordering::Relaxed),
            rejected_invalid: self.rejected_invalid.load(Ordering::Relaxed),
            released: self.released.load(Ordering::Relaxed),
            safety_checks: self.safety_checks.load(Ordering::Relaxed),
            reconfigurations: self.reconfigurations.load(Ordering::Relaxed),
            invariant_violations: self.invariant_violations.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`EngineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatsSnapshot {
    pub granted: u64,
    pub rejected_unsafe: u64,
    pub rejected_invalid: u64,
    pub released: u64,
    pub safety_checks: u64,
    pub reconfigurations: u64,
    pub invariant_violations: u64,
}

impl StatsSnapshot {
    /// Total requests decided, whatever the outcome
    pub fn total_requests(&self) -> u64 {
        self.granted + self.rejected_unsafe + self.rejected_invalid
    }
}
