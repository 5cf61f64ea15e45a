use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Reason code the service uses when the subject still has to give consent
pub const CONSENT_REQUIRED_MESSAGE_ID: &str = "CSIBT0033I";

/// Message id reported when the service returns something other than a list
pub const INVALID_DATATYPE_MESSAGE_ID: &str = "INVALID_DATATYPE";

/// Why an item was not approved
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reason {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message_description: Option<String>,
}

/// One approval decision for a requested item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalEntry {
    #[serde(default)]
    pub approved: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<Reason>,
}

impl ApprovalEntry {
    pub fn approved() -> Self {
        Self {
            approved: true,
            reason: None,
        }
    }

    pub fn denied(message_id: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            approved: false,
            reason: Some(Reason {
                message_id: Some(message_id.into()),
                message_description: Some(description.into()),
            }),
        }
    }

    /// True when the entry is a denial asking for consent
    pub fn requires_consent(&self) -> bool {
        !self.approved
            && self
                .reason
                .as_ref()
                .and_then(|r| r.message_id.as_deref())
                == Some(CONSENT_REQUIRED_MESSAGE_ID)
    }
}

/// Per-item assessment returned by the service
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<Vec<ApprovalEntry>>,
}

impl AssessmentResult {
    pub fn new(purpose_id: impl Into<String>, entry: ApprovalEntry) -> Self {
        Self {
            purpose_id: Some(purpose_id.into()),
            result: Some(vec![entry]),
            ..Self::default()
        }
    }

    /// Only the first decision of an item is considered
    pub fn first_entry(&self) -> Option<&ApprovalEntry> {
        self.result.as_ref().and_then(|entries| entries.first())
    }
}

/// Overall status of an assessment call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AssessmentStatus {
    Approved,
    Consent,
    Denied,
    Error,
}

/// Locally generated error description
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorData {
    pub message_id: String,
    pub message_description: String,
}

/// Outcome of [`Privacy::assess`](crate::Privacy::assess)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedAssessment {
    pub status: AssessmentStatus,
    /// The service's list as received
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assessment: Option<Vec<Value>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<ErrorData>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl WrappedAssessment {
    pub fn new(status: AssessmentStatus, assessment: Vec<Value>) -> Self {
        Self {
            status,
            assessment: Some(assessment),
            data: None,
            detail: None,
        }
    }

    /// Error outcome, optionally carrying the remote error payload
    pub fn error(detail: Option<Value>) -> Self {
        Self {
            status: AssessmentStatus::Error,
            assessment: None,
            data: None,
            detail,
        }
    }

    /// Error outcome for a response that was not a list
    pub fn invalid_datatype(received: &str) -> Self {
        Self {
            status: AssessmentStatus::Error,
            assessment: None,
            data: Some(ErrorData {
                message_id: INVALID_DATATYPE_MESSAGE_ID.to_string(),
                message_description: format!(
                    "Invalid data type received from the server, received {}",
                    received
                ),
            }),
            detail: None,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == AssessmentStatus::Error
    }
}
