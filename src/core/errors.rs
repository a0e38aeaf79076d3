/*!
 * Error Types
 * Centralized error handling with thiserror, miette, and serde support
 */

use super::types::{ProcessId, Quantity, ResourceId};
use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration validation errors with serialization support
///
/// Raised by the configuration loader. A configuration that fails any of
/// these checks never becomes a live allocation state.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum ConfigError {
    #[error("Configuration is empty")]
    #[diagnostic(
        code(config::empty),
        help("Provide process count, resource count, available vector, allocation rows and max rows.")
    )]
    Empty,

    #[error("Missing {what} on line {line}")]
    #[diagnostic(
        code(config::missing_line),
        help("The textual format needs 3 + 2*P lines.")
    )]
    MissingLine { line: usize, what: String },

    #[error("Invalid token '{token}' on line {line}: expected a whole number")]
    #[diagnostic(code(config::invalid_token))]
    InvalidToken { line: usize, token: String },

    #[error("{what} on line {line} must be a single whole number")]
    #[diagnostic(code(config::malformed_count))]
    MalformedCount { line: usize, what: String },

    #[error("Negative quantity {value} in {what}")]
    #[diagnostic(
        code(config::negative_quantity),
        help("Resource quantities are whole, non-negative units.")
    )]
    NegativeQuantity { what: String, value: i64 },

    #[error("{what} has {found} rows, expected {expected}")]
    #[diagnostic(
        code(config::row_count),
        help("Matrices need exactly one row per process.")
    )]
    RowCount {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("{what} has {found} values, expected {expected}")]
    #[diagnostic(
        code(config::row_width),
        help("Every vector needs exactly one value per resource type.")
    )]
    RowWidth {
        what: String,
        expected: usize,
        found: usize,
    },

    #[error("Process {pid} holds {allocated} of resource {resource} but declared a maximum of {max}")]
    #[diagnostic(code(config::allocation_exceeds_claim))]
    AllocationExceedsClaim {
        pid: ProcessId,
        resource: ResourceId,
        allocated: Quantity,
        max: Quantity,
    },

    #[error("Resource {resource}: total {total} is less than allocated {allocated}")]
    #[diagnostic(
        code(config::inconsistent_totals),
        help("Available plus allocated units must equal the declared total.")
    )]
    InconsistentTotals {
        resource: ResourceId,
        total: Quantity,
        allocated: Quantity,
    },

    #[error("Resource {resource}: available {available} plus allocated {allocated} does not match total {total}")]
    #[diagnostic(code(config::total_mismatch))]
    TotalMismatch {
        resource: ResourceId,
        available: Quantity,
        allocated: Quantity,
        total: Quantity,
    },

    #[error("Configuration declares neither available nor total resources")]
    #[diagnostic(
        code(config::missing_available),
        help("Set `available` or `resources` (total instances per resource type).")
    )]
    MissingAvailable,

    #[error("Resource {resource} total exceeds the largest representable quantity")]
    #[diagnostic(code(config::overflow))]
    Overflow { resource: ResourceId },

    #[error("{what} is {found}, limit is {limit}")]
    #[diagnostic(code(config::limit_exceeded))]
    LimitExceeded {
        what: String,
        limit: usize,
        found: usize,
    },

    #[error("Unexpected data on line {line}")]
    #[diagnostic(code(config::trailing_data))]
    TrailingData { line: usize },

    #[error("Invalid setting {name}={value}")]
    #[diagnostic(code(config::invalid_setting))]
    InvalidSetting { name: String, value: String },

    #[error("Invalid JSON configuration: {0}")]
    #[diagnostic(code(config::json))]
    Json(String),

    #[error("Failed to read configuration: {0}")]
    #[diagnostic(code(config::io), help("Check the configuration path and file permissions."))]
    Io(String),
}

impl From<std::io::Error> for ConfigError {
    fn from(err: std::io::Error) -> Self {
        ConfigError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Json(err.to_string())
    }
}

/// Why a request or release was refused without touching the state
///
/// `Display` renders the short reason phrase; `detail()` adds the numbers.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum RejectReason {
    #[error("unknown process")]
    UnknownProcess { pid: i64 },

    /// Process id that is not a whole number in the signed 64-bit range
    #[error("unknown process")]
    InvalidProcessId { pid: String },

    #[error("malformed request")]
    MalformedRequest { detail: String },

    #[error("exceeds declared maximum claim")]
    ClaimExceeded {
        pid: ProcessId,
        resource: ResourceId,
        requested: Quantity,
        need: Quantity,
    },

    #[error("insufficient available resources")]
    InsufficientAvailable {
        resource: ResourceId,
        requested: Quantity,
        available: Quantity,
    },

    #[error("exceeds current allocation")]
    ReleaseExceedsAllocation {
        pid: ProcessId,
        resource: ResourceId,
        released: Quantity,
        allocated: Quantity,
    },
}

impl RejectReason {
    /// Human-readable explanation including the offending values
    pub fn detail(&self) -> String {
        match self {
            RejectReason::UnknownProcess { pid } => format!("process {} does not exist", pid),
            RejectReason::InvalidProcessId { pid } => {
                format!("process id {} is not a whole number", pid)
            }
            RejectReason::MalformedRequest { detail } => detail.clone(),
            RejectReason::ClaimExceeded {
                pid,
                resource,
                requested,
                need,
            } => format!(
                "P{} requested {} of R{} but only declared a remaining need of {}",
                pid, requested, resource, need
            ),
            RejectReason::InsufficientAvailable {
                resource,
                requested,
                available,
            } => format!(
                "requested {} of R{} but only {} available; retry later",
                requested, resource, available
            ),
            RejectReason::ReleaseExceedsAllocation {
                pid,
                resource,
                released,
                allocated,
            } => format!(
                "P{} released {} of R{} but only holds {}",
                pid, released, resource, allocated
            ),
        }
    }
}

/// Engine failures
///
/// Only raised when the live state can no longer be trusted. Rejected
/// requests are reported through results, not through this type.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Diagnostic)]
#[serde(tag = "error_type", content = "details", rename_all = "snake_case")]
pub enum EngineError {
    #[error("Internal invariant violated: {0}")]
    #[diagnostic(
        code(engine::invariant_violation),
        help("The allocation state can no longer be trusted. Replace the configuration.")
    )]
    InvariantViolation(String),

    #[error("Engine needs reconfiguration: {0}")]
    #[diagnostic(
        code(engine::poisoned),
        help("A previous operation observed a corrupted state. Replace the configuration.")
    )]
    Poisoned(String),
}

/// Unified kernel error type with miette diagnostics
#[derive(Error, Debug, Diagnostic)]
pub enum KernelError {
    #[error("Configuration error: {0}")]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Engine error: {0}")]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error("I/O error: {0}")]
    #[diagnostic(
        code(kernel::io_error),
        help("Network or socket operation failed. Check the listen address.")
    )]
    Io(String),

    #[error("Protocol error: {0}")]
    #[diagnostic(
        code(kernel::protocol_error),
        help("Each line must be one JSON request object.")
    )]
    Protocol(String),
}

impl From<std::io::Error> for KernelError {
    fn from(err: std::io::Error) -> Self {
        KernelError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for KernelError {
    fn from(err: serde_json::Error) -> Self {
        KernelError::Protocol(err.to_string())
    }
}
