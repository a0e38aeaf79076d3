/*!
 * Banker Kernel Library
 * Deadlock-avoidance resource allocation exposed as a library
 */

pub mod admission;
pub mod api;
pub mod config;
pub mod core;
pub mod monitoring;
pub mod safety;
pub mod state;

// Re-exports
pub use admission::{
    AdmissionResult, AllocationEngine, EngineSnapshot, ReleaseOutcome, ResourceRequest,
    StatsSnapshot,
};
pub use api::{serve, start_server, ApiRequest, ApiResponse};
pub use config::{load_file, parse_text, to_text, ConfigDocument, Settings};
pub use crate::core::errors::{ConfigError, EngineError, KernelError, RejectReason};
pub use crate::core::types::{Generation, KernelResult, ProcessId, Quantity, ResourceId};
pub use monitoring::init_tracing;
pub use safety::{check as check_safety, find_safe_sequence, SafetyReport};
pub use state::{MatrixState, ResourceVector};
