/*!
 * System Limits and Constants
 *
 * Centralized location for allocation-state bounds, wire limits and defaults.
 * - Performance-critical constants are marked with [PERF]
 * - Security-critical constants are marked with [SECURITY]
 */

use crate::core::types::Quantity;
use std::time::Duration;

// =============================================================================
// ALLOCATION STATE LIMITS
// =============================================================================

/// Maximum number of processes in one allocation state
/// [PERF] Safety checks are O(P² · R) and run under the write lock; a worst-case
/// check at 1024 × 256 takes tens of milliseconds
pub const MAX_PROCESSES: usize = 1024;

/// Maximum number of resource types in one allocation state
pub const MAX_RESOURCE_TYPES: usize = 256;

/// Largest total of any resource type
/// Keeps every quantity representable as a signed 64-bit integer on the wire
pub const MAX_QUANTITY: Quantity = i64::MAX as Quantity;

// =============================================================================
// WIRE LIMITS
// =============================================================================

/// Maximum size of a single newline-delimited request frame (1MB)
/// [SECURITY] Bounds per-connection buffering
pub const MAX_FRAME_BYTES: usize = 1024 * 1024;

/// Operations slower than this are logged at warn level
pub const SLOW_OPERATION_THRESHOLD: Duration = Duration::from_millis(10);

// =============================================================================
// DEFAULTS
// =============================================================================

/// Default TCP listen address for the request server
pub const DEFAULT_LISTEN_ADDR: &str = "127.0.0.1:7878";

/// Environment variable overriding the listen address
pub const ENV_LISTEN_ADDR: &str = "BANKER_LISTEN_ADDR";

/// Environment variable naming the initial configuration file
pub const ENV_CONFIG_PATH: &str = "BANKER_CONFIG";

/// Environment variable enabling JSON trace output
pub const ENV_TRACE_JSON: &str = "BANKER_TRACE_JSON";
