/*!
 * Request Admission
 *
 * Owns the single live allocation state and serializes every mutation of it.
 * Requests are checked, applied to a working copy, tested for safety, and
 * either swapped in or dropped.
 */

mod engine;
mod stats;
mod tentative;
mod types;

pub use engine::{AllocationEngine, EngineSnapshot};
pub use stats::{EngineStats, StatsSnapshot};
pub use tentative::{Change, TentativeChange, TentativeState};
pub use types::{AdmissionResult, ReleaseOutcome, ResourceRequest};
