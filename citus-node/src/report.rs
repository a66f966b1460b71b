//! Result record returned to the orchestration harness
//!
//! Completed runs serialize as `{"changed": .., "success": ..}`; errors as
//! `{"changed": false, "failed": true, "msg": ..}`.

use serde::{Deserialize, Serialize};

use crate::error::{CitusNodeError, Result};
use crate::worker::Outcome;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Report {
    pub changed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub success: Option<bool>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub failed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl Report {
    pub fn from_outcome(outcome: Outcome) -> Self {
        Self {
            changed: outcome.changed,
            success: Some(outcome.success),
            failed: false,
            msg: None,
        }
    }

    pub fn from_error(error: &CitusNodeError) -> Self {
        Self {
            changed: false,
            success: None,
            failed: true,
            msg: Some(error.to_string()),
        }
    }

    pub fn from_result(result: &Result<Outcome>) -> Self {
        match result {
            Ok(outcome) => Self::from_outcome(*outcome),
            Err(e) => Self::from_error(e),
        }
    }

    /// True only when the worker is known to be a member
    pub fn is_success(&self) -> bool {
        !self.failed && self.success == Some(true)
    }

    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CitusNodeError::Internal {
            message: format!("Failed to serialize report: {}", e),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcome_record() {
        let report = Report::from_outcome(Outcome {
            changed: true,
            success: true,
        });
        assert_eq!(report.to_json().unwrap(), r#"{"changed":true,"success":true}"#);
        assert!(report.is_success());
    }

    #[test]
    fn test_add_rejected_is_not_success() {
        let report = Report::from_outcome(Outcome {
            changed: false,
            success: false,
        });
        assert_eq!(report.to_json().unwrap(), r#"{"changed":false,"success":false}"#);
        assert!(!report.is_success());
    }

    #[test]
    fn test_error_record() {
        let err = CitusNodeError::ConnectionFailed {
            code: Some("08001".into()),
            message: "could not connect to server".into(),
        };
        let report = Report::from_result(&Err(err));
        let json: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
        assert_eq!(json["failed"], true);
        assert_eq!(json["changed"], false);
        assert_eq!(
            json["msg"],
            "Cannot connect with Coordinator node. Code: 08001 - could not connect to server"
        );
        assert!(json.get("success").is_none());
        assert!(!report.is_success());
    }
}
