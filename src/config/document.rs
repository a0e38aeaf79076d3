/*!
 * Structured Configuration Document
 * JSON form of an allocation state, as exchanged with clients
 */

use crate::core::errors::ConfigError;
use crate::core::limits::{MAX_PROCESSES, MAX_RESOURCE_TYPES};
use crate::core::serde::is_none;
use crate::core::types::Quantity;
use crate::state::{MatrixState, ResourceVector};
use serde::{Deserialize, Serialize};

/// Untyped configuration payload
///
/// Either `available` or `resources` (total instances per resource type)
/// must be present. When both are, they must agree with the allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigDocument {
    pub num_proc: usize,
    pub num_res: usize,
    #[serde(default, skip_serializing_if = "is_none")]
    pub available: Option<Vec<i64>>,
    #[serde(default, skip_serializing_if = "is_none")]
    pub resources: Option<Vec<i64>>,
    pub allocation: Vec<Vec<i64>>,
    pub max: Vec<Vec<i64>>,
}

impl ConfigDocument {
    /// Parse a JSON document
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(input)?)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Describe a state, including both available and total vectors
    pub fn from_state(state: &MatrixState) -> Self {
        Self {
            num_proc: state.process_count(),
            num_res: state.resource_count(),
            available: Some(to_signed(state.available())),
            resources: Some(to_signed(&state.total())),
            allocation: state.allocation_rows().iter().map(to_signed).collect(),
            max: state.max_claim_rows().iter().map(to_signed).collect(),
        }
    }

    /// Validate into a state, rejecting anything off-shape
    pub fn to_state(&self) -> Result<MatrixState, ConfigError> {
        if self.num_proc > MAX_PROCESSES {
            return Err(ConfigError::LimitExceeded {
                what: "process count".to_string(),
                limit: MAX_PROCESSES,
                found: self.num_proc,
            });
        }
        if self.num_res > MAX_RESOURCE_TYPES {
            return Err(ConfigError::LimitExceeded {
                what: "resource type count".to_string(),
                limit: MAX_RESOURCE_TYPES,
                found: self.num_res,
            });
        }

        let allocation = self.matrix("allocation", &self.allocation)?;
        let max_claim = self.matrix("max", &self.max)?;

        match (&self.available, &self.resources) {
            (None, None) => Err(ConfigError::MissingAvailable),
            (Some(available), None) => MatrixState::new(
                self.vector("available", available)?,
                allocation,
                max_claim,
            ),
            (None, Some(total)) => {
                MatrixState::with_totals(self.vector("resources", total)?, allocation, max_claim)
            }
            (Some(available), Some(total)) => {
                let total = self.vector("resources", total)?;
                let state = MatrixState::new(
                    self.vector("available", available)?,
                    allocation,
                    max_claim,
                )?;
                check_total(&state, &total)?;
                Ok(state)
            }
        }
    }

    fn matrix(&self, what: &str, rows: &[Vec<i64>]) -> Result<Vec<ResourceVector>, ConfigError> {
        if rows.len() != self.num_proc {
            return Err(ConfigError::RowCount {
                what: format!("{} matrix", what),
                expected: self.num_proc,
                found: rows.len(),
            });
        }
        rows.iter()
            .enumerate()
            .map(|(pid, row)| self.vector(&format!("{} row {}", what, pid), row))
            .collect()
    }

    fn vector(&self, what: &str, values: &[i64]) -> Result<ResourceVector, ConfigError> {
        if values.len() != self.num_res {
            return Err(ConfigError::RowWidth {
                what: what.to_string(),
                expected: self.num_res,
                found: values.len(),
            });
        }
        ResourceVector::try_from_signed(values).map_err(|value| ConfigError::NegativeQuantity {
            what: what.to_string(),
            value,
        })
    }
}

impl TryFrom<&ConfigDocument> for MatrixState {
    type Error = ConfigError;

    fn try_from(document: &ConfigDocument) -> Result<Self, Self::Error> {
        document.to_state()
    }
}

impl From<&MatrixState> for ConfigDocument {
    fn from(state: &MatrixState) -> Self {
        ConfigDocument::from_state(state)
    }
}

fn check_total(state: &MatrixState, total: &ResourceVector) -> Result<(), ConfigError> {
    let actual = state.total();
    let mismatch = actual
        .iter()
        .zip(total.iter())
        .position(|(a, t)| a != t);

    match mismatch {
        None => Ok(()),
        Some(resource) => {
            let available = state.available()[resource];
            Err(ConfigError::TotalMismatch {
                resource,
                available,
                allocated: actual[resource] - available,
                total: total[resource],
            })
        }
    }
}

/// Every quantity of a constructed state is at most `MAX_QUANTITY == i64::MAX`
fn to_signed(vector: &ResourceVector) -> Vec<i64> {
    vector
        .iter()
        .map(|v: Quantity| i64::try_from(v).unwrap_or(i64::MAX))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{classic_document, classic_state};

    #[test]
    fn test_totals_form_matches_available_form() {
        let mut document = classic_document();
        document.resources = None;
        document.available = Some(vec![3, 3, 2]);
        assert_eq!(document.to_state().unwrap(), classic_state());
    }

    #[test]
    fn test_from_state_round_trip() {
        let document = ConfigDocument::from_state(&classic_state());
        assert_eq!(document.available, Some(vec![3, 3, 2]));
        assert_eq!(document.resources, Some(vec![10, 5, 7]));
        assert_eq!(MatrixState::try_from(&document).unwrap(), classic_state());
    }

    #[test]
    fn test_json_parse() {
        let json = r#"{
            "num_proc": 2, "num_res": 1,
            "resources": [4],
            "allocation": [[1], [2]],
            "max": [[3], [2]]
        }"#;
        let state = ConfigDocument::from_json(json).unwrap().to_state().unwrap();
        assert_eq!(state.available(), &ResourceVector::new(vec![1]));
    }

    #[test]
    fn test_non_integer_count_is_rejected() {
        let json = r#"{"num_proc": "a", "num_res": 1, "available": [1], "allocation": [], "max": []}"#;
        assert!(matches!(
            ConfigDocument::from_json(json),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn test_shape_errors() {
        let mut document = classic_document();
        document.resources = Some(vec![10, 5, 7, 30]);
        assert!(matches!(
            document.to_state(),
            Err(ConfigError::RowWidth { expected: 3, found: 4, .. })
        ));

        let mut document = classic_document();
        document.allocation.pop();
        assert_eq!(
            document.to_state().unwrap_err(),
            ConfigError::RowCount {
                what: "allocation matrix".to_string(),
                expected: 5,
                found: 4,
            }
        );

        let mut document = classic_document();
        document.max[0] = vec![7, 3];
        assert!(matches!(
            document.to_state(),
            Err(ConfigError::RowWidth { expected: 3, found: 2, .. })
        ));

        let mut document = classic_document();
        document.allocation[2] = vec![3, -1, 2];
        assert!(matches!(
            document.to_state(),
            Err(ConfigError::NegativeQuantity { value: -1, .. })
        ));
    }

    #[test]
    fn test_missing_and_mismatched_totals() {
        let mut document = classic_document();
        document.resources = None;
        assert_eq!(document.to_state().unwrap_err(), ConfigError::MissingAvailable);

        let mut document = classic_document();
        document.available = Some(vec![3, 3, 3]);
        assert_eq!(
            document.to_state().unwrap_err(),
            ConfigError::TotalMismatch {
                resource: 2,
                available: 3,
                allocated: 5,
                total: 7,
            }
        );
    }
}
