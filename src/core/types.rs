/*!
 * Core Types
 * Common types used across the kernel
 */

use super::errors::KernelError;

/// Process index within a configured allocation state (`0..P`)
pub type ProcessId = usize;

/// Resource type index within a configured allocation state (`0..R`)
pub type ResourceId = usize;

/// Whole units of a single resource type
pub type Quantity = u64;

/// Monotonic counter bumped on every mutation of the live state
pub type Generation = u64;

/// Common result type for kernel operations
pub type KernelResult<T> = Result<T, KernelError>;
