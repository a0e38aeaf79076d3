/*!
 * Admission Types
 * Request payloads and decision results
 */

use crate::core::errors::RejectReason;
use crate::core::serde::is_none;
use crate::core::types::ProcessId;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Untyped request as received from a transport
///
/// A field that could not be read as whole numbers keeps a rendering of
/// the raw input, so the engine rejects it in check order instead of the
/// transport failing to decode. Values are signed so negative input is
/// reported as malformed too.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRequest {
    pub pid: Result<i64, String>,
    pub amounts: Result<Vec<i64>, String>,
}

impl ResourceRequest {
    pub fn new(pid: i64, amounts: Vec<i64>) -> Self {
        Self {
            pid: Ok(pid),
            amounts: Ok(amounts),
        }
    }

    /// Read a process id and an amount vector from arbitrary JSON values
    pub fn from_json(pid: &Value, amounts: &Value) -> Self {
        Self {
            pid: pid.as_i64().ok_or_else(|| pid.to_string()),
            amounts: decode_amounts(amounts),
        }
    }
}

fn decode_amounts(value: &Value) -> Result<Vec<i64>, String> {
    let items = value
        .as_array()
        .ok_or_else(|| format!("expected a list of whole numbers, got {}", value))?;
    items
        .iter()
        .enumerate()
        .map(|(resource, item)| {
            item.as_i64().ok_or_else(|| {
                format!("entry {} is not a whole number in range: {}", resource, item)
            })
        })
        .collect()
}

/// Outcome of a resource request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AdmissionResult {
    /// Request applied; `safe_sequence` witnesses the post-grant state
    Granted {
        safe_sequence: Vec<ProcessId>,
        log: Vec<String>,
    },
    /// Request was within bounds but would leave no safe completion order
    RejectedUnsafe { log: Vec<String> },
    /// Request failed validation before any tentative change
    RejectedInvalid { reason: RejectReason },
}

impl AdmissionResult {
    #[inline]
    pub fn is_granted(&self) -> bool {
        matches!(self, AdmissionResult::Granted { .. })
    }

    pub fn safe_sequence(&self) -> Option<&[ProcessId]> {
        match self {
            AdmissionResult::Granted { safe_sequence, .. } => Some(safe_sequence),
            _ => None,
        }
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            AdmissionResult::RejectedInvalid { reason } => Some(reason),
            _ => None,
        }
    }

    pub fn log(&self) -> &[String] {
        match self {
            AdmissionResult::Granted { log, .. } | AdmissionResult::RejectedUnsafe { log } => log,
            AdmissionResult::RejectedInvalid { .. } => &[],
        }
    }
}

/// Outcome of a voluntary release
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ReleaseOutcome {
    /// Units returned to the pool; `safe_sequence` is set when the
    /// resulting state is safe
    Released {
        #[serde(default, skip_serializing_if = "is_none")]
        safe_sequence: Option<Vec<ProcessId>>,
        log: Vec<String>,
    },
    RejectedInvalid { reason: RejectReason },
}

impl ReleaseOutcome {
    #[inline]
    pub fn is_released(&self) -> bool {
        matches!(self, ReleaseOutcome::Released { .. })
    }

    pub fn reject_reason(&self) -> Option<&RejectReason> {
        match self {
            ReleaseOutcome::RejectedInvalid { reason } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admission_result_accessors() {
        let granted = AdmissionResult::Granted {
            safe_sequence: vec![1, 3, 0, 2, 4],
            log: vec!["ok".to_string()],
        };
        assert!(granted.is_granted());
        assert_eq!(granted.safe_sequence(), Some(&[1, 3, 0, 2, 4][..]));
        assert_eq!(granted.log().len(), 1);

        let invalid = AdmissionResult::RejectedInvalid {
            reason: RejectReason::UnknownProcess { pid: 9 },
        };
        assert!(!invalid.is_granted());
        assert_eq!(invalid.safe_sequence(), None);
        assert!(invalid.log().is_empty());
        assert_eq!(invalid.reject_reason().unwrap().to_string(), "unknown process");
    }

    #[test]
    fn test_request_from_json_keeps_bad_fields() {
        use serde_json::json;

        let request = ResourceRequest::from_json(&json!(1), &json!([1, 0, 2]));
        assert_eq!(request, ResourceRequest::new(1, vec![1, 0, 2]));

        let request = ResourceRequest::from_json(&json!(-3), &json!([0, -1]));
        assert_eq!(request, ResourceRequest::new(-3, vec![0, -1]));

        let request = ResourceRequest::from_json(&json!(u64::MAX), &json!([1, 0.5, 2]));
        assert_eq!(request.pid, Err("18446744073709551615".to_string()));
        assert!(request.amounts.unwrap_err().contains("entry 1"));

        let request = ResourceRequest::from_json(&json!("a"), &json!([9223372036854775808u64]));
        assert_eq!(request.pid, Err("\"a\"".to_string()));
        assert!(request.amounts.is_err());

        let request = ResourceRequest::from_json(&Value::Null, &json!({"r0": 1}));
        assert_eq!(request.pid, Err("null".to_string()));
        assert!(request.amounts.unwrap_err().starts_with("expected a list"));
    }

    #[test]
    fn test_admission_result_serialization() {
        let unsafe_result = AdmissionResult::RejectedUnsafe { log: vec![] };
        let json = serde_json::to_value(&unsafe_result).unwrap();
        assert_eq!(json["status"], "rejected_unsafe");
    }
}
