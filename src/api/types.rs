/*!
 * API Types
 * Wire messages of the line-delimited JSON protocol
 */

use crate::admission::{AdmissionResult, ReleaseOutcome, StatsSnapshot};
use crate::config::ConfigDocument;
use crate::core::errors::{ConfigError, EngineError, RejectReason};
use crate::core::serde::{is_empty_vec, is_false, is_none};
use crate::core::types::{Generation, ProcessId};
use crate::safety::SafetyReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One client request, tagged by `op`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ApiRequest {
    GetConfig,
    /// Exactly one of `config` or `text` must be set
    ReplaceConfig {
        #[serde(default, skip_serializing_if = "is_none")]
        config: Option<ConfigDocument>,
        #[serde(default, skip_serializing_if = "is_none")]
        text: Option<String>,
    },
    /// `pid` and `request` stay raw so off-shape values are rejected, not undecodable
    Request {
        #[serde(default)]
        pid: Value,
        #[serde(default)]
        request: Value,
    },
    Release {
        #[serde(default)]
        pid: Value,
        #[serde(default)]
        release: Value,
    },
    CheckSafety,
    Stats,
}

impl ApiRequest {
    /// Operation name used for tracing
    pub fn op(&self) -> &'static str {
        match self {
            ApiRequest::GetConfig => "get_config",
            ApiRequest::ReplaceConfig { .. } => "replace_config",
            ApiRequest::Request { .. } => "request",
            ApiRequest::Release { .. } => "release",
            ApiRequest::CheckSafety => "check_safety",
            ApiRequest::Stats => "stats",
        }
    }
}

/// One server response, tagged by `status`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ApiResponse {
    Config {
        config: ConfigDocument,
        generation: Generation,
        #[serde(default, skip_serializing_if = "is_false")]
        needs_reconfiguration: bool,
    },
    Reconfigured {
        generation: Generation,
    },
    Granted {
        safe_sequence: Vec<ProcessId>,
        log: Vec<String>,
    },
    RejectedUnsafe {
        log: Vec<String>,
    },
    RejectedInvalid {
        reason: String,
        detail: String,
    },
    Released {
        #[serde(default, skip_serializing_if = "is_none")]
        safe_sequence: Option<Vec<ProcessId>>,
        log: Vec<String>,
    },
    Safety {
        is_safe: bool,
        #[serde(default, skip_serializing_if = "is_empty_vec")]
        safe_sequence: Vec<ProcessId>,
        #[serde(default, skip_serializing_if = "is_empty_vec")]
        unfinished: Vec<ProcessId>,
        log: Vec<String>,
    },
    Stats {
        stats: StatsSnapshot,
    },
    Error {
        error: String,
        #[serde(default, skip_serializing_if = "is_none")]
        details: Option<Value>,
    },
}

impl ApiResponse {
    pub fn error(message: impl Into<String>) -> Self {
        ApiResponse::Error {
            error: message.into(),
            details: None,
        }
    }

    #[inline]
    pub fn is_error(&self) -> bool {
        matches!(self, ApiResponse::Error { .. })
    }

    fn rejected(reason: &RejectReason) -> Self {
        ApiResponse::RejectedInvalid {
            reason: reason.to_string(),
            detail: reason.detail(),
        }
    }
}

impl From<AdmissionResult> for ApiResponse {
    fn from(result: AdmissionResult) -> Self {
        match result {
            AdmissionResult::Granted { safe_sequence, log } => {
                ApiResponse::Granted { safe_sequence, log }
            }
            AdmissionResult::RejectedUnsafe { log } => ApiResponse::RejectedUnsafe { log },
            AdmissionResult::RejectedInvalid { reason } => ApiResponse::rejected(&reason),
        }
    }
}

impl From<ReleaseOutcome> for ApiResponse {
    fn from(outcome: ReleaseOutcome) -> Self {
        match outcome {
            ReleaseOutcome::Released { safe_sequence, log } => {
                ApiResponse::Released { safe_sequence, log }
            }
            ReleaseOutcome::RejectedInvalid { reason } => ApiResponse::rejected(&reason),
        }
    }
}

impl From<SafetyReport> for ApiResponse {
    fn from(report: SafetyReport) -> Self {
        ApiResponse::Safety {
            is_safe: report.safe,
            safe_sequence: report.sequence,
            unfinished: report.unfinished,
            log: report.log,
        }
    }
}

/// Validation errors keep their structured form under `details`
impl From<ConfigError> for ApiResponse {
    fn from(err: ConfigError) -> Self {
        ApiResponse::Error {
            error: err.to_string(),
            details: serde_json::to_value(&err).ok(),
        }
    }
}

impl From<EngineError> for ApiResponse {
    fn from(err: EngineError) -> Self {
        ApiResponse::Error {
            error: err.to_string(),
            details: serde_json::to_value(&err).ok(),
        }
    }
}
