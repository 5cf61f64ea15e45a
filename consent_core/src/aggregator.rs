//! Reduces per-item assessments to one overall status.

use crate::model::{AssessmentResult, AssessmentStatus};
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

/// A service response after the shape check
#[derive(Debug, Clone, PartialEq)]
pub enum ApprovalPayload {
    /// The list exactly as the service sent it
    Valid(Vec<Value>),
    /// Describes what was received instead of a list
    Malformed(String),
}

/// Check that the payload is a list
pub fn decode_approvals(payload: Value) -> ApprovalPayload {
    match payload {
        Value::Array(items) => ApprovalPayload::Valid(items),
        other => ApprovalPayload::Malformed(json_kind(&other).to_string()),
    }
}

/// Decode one list element for aggregation.
///
/// Elements that do not decode become an empty assessment, which counts as
/// neutral.
pub fn decode_item(index: usize, item: &Value) -> AssessmentResult {
    match AssessmentResult::deserialize(item) {
        Ok(result) => result,
        Err(e) => {
            debug!(index, "Assessment item could not be decoded: {}", e);
            AssessmentResult::default()
        }
    }
}

/// Overall status of a raw assessment list
pub fn aggregate_raw(items: &[Value]) -> AssessmentStatus {
    let results: Vec<AssessmentResult> = items
        .iter()
        .enumerate()
        .map(|(index, item)| decode_item(index, item))
        .collect();
    aggregate_status(&results)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Overall status of a list of assessments.
///
/// Every item is scanned and only the first entry of each item counts. An
/// approved entry sets `approved` unless `consent` was already seen; a
/// consent-required denial sets `consent` and nothing downgrades it. When
/// neither occurs the result is `denied`, which includes the empty list.
/// Items without a result, or denials without a message id, are neutral.
pub fn aggregate_status(results: &[AssessmentResult]) -> AssessmentStatus {
    let mut status: Option<AssessmentStatus> = None;

    for (index, item) in results.iter().enumerate() {
        let Some(entry) = item.first_entry() else {
            trace!(index, "Assessment item has no result, skipping");
            continue;
        };

        if entry.approved {
            if status.is_none() {
                status = Some(AssessmentStatus::Approved);
            }
        } else if entry.requires_consent() {
            status = Some(AssessmentStatus::Consent);
        } else {
            trace!(index, purpose = ?item.purpose_id, "Item not approved");
        }
    }

    status.unwrap_or(AssessmentStatus::Denied)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ApprovalEntry, Reason, CONSENT_REQUIRED_MESSAGE_ID};
    use serde_json::json;

    fn approved(purpose: &str) -> AssessmentResult {
        AssessmentResult::new(purpose, ApprovalEntry::approved())
    }

    fn consent_required(purpose: &str) -> AssessmentResult {
        AssessmentResult::new(
            purpose,
            ApprovalEntry::denied(CONSENT_REQUIRED_MESSAGE_ID, "Consent required"),
        )
    }

    fn denied(purpose: &str) -> AssessmentResult {
        AssessmentResult::new(purpose, ApprovalEntry::denied("CSIBT0034E", "Denied"))
    }

    #[test]
    fn test_all_approved() {
        let results = vec![approved("p1"), approved("p2"), approved("p3")];
        assert_eq!(aggregate_status(&results), AssessmentStatus::Approved);
    }

    #[test]
    fn test_consent_wins_over_approval_in_any_order() {
        let before = vec![consent_required("p1"), approved("p2")];
        let after = vec![approved("p1"), consent_required("p2"), approved("p3")];

        assert_eq!(aggregate_status(&before), AssessmentStatus::Consent);
        assert_eq!(aggregate_status(&after), AssessmentStatus::Consent);
    }

    #[test]
    fn test_denied_when_nothing_approved() {
        let results = vec![denied("p1"), denied("p2")];
        assert_eq!(aggregate_status(&results), AssessmentStatus::Denied);
        assert_eq!(aggregate_status(&[]), AssessmentStatus::Denied);
    }

    #[test]
    fn test_approved_with_plain_denials() {
        let results = vec![denied("p1"), approved("p2")];
        assert_eq!(aggregate_status(&results), AssessmentStatus::Approved);
    }

    #[test]
    fn test_only_first_entry_is_considered() {
        let mut item = approved("p1");
        item.result
            .as_mut()
            .unwrap()
            .push(ApprovalEntry::denied(CONSENT_REQUIRED_MESSAGE_ID, ""));

        assert_eq!(aggregate_status(&[item]), AssessmentStatus::Approved);
    }

    #[test]
    fn test_incomplete_items_are_neutral() {
        let no_result = AssessmentResult {
            purpose_id: Some("p1".into()),
            ..AssessmentResult::default()
        };
        let empty_result = AssessmentResult {
            result: Some(vec![]),
            ..AssessmentResult::default()
        };
        let no_message_id = AssessmentResult::new(
            "p3",
            ApprovalEntry {
                approved: false,
                reason: Some(Reason::default()),
            },
        );

        assert_eq!(
            aggregate_status(&[no_result.clone(), empty_result.clone(), no_message_id.clone()]),
            AssessmentStatus::Denied
        );
        assert_eq!(
            aggregate_status(&[no_result, approved("p2"), empty_result, no_message_id]),
            AssessmentStatus::Approved
        );
    }

    #[test]
    fn test_decode_keeps_list_untouched() {
        let payload = json!([
            {"purposeId": "p1", "result": [{"approved": true, "obligation": "notify"}]},
            {"purposeId": "p2", "result": [{"approved": false, "reason": {"messageId": "CSIBT0033I"}}]}
        ]);

        match decode_approvals(payload.clone()) {
            ApprovalPayload::Valid(items) => {
                assert_eq!(Value::Array(items.clone()), payload);
                assert_eq!(aggregate_raw(&items), AssessmentStatus::Consent);
            }
            other => panic!("Expected valid payload, got {:?}", other),
        }
    }

    #[test]
    fn test_odd_elements_are_neutral() {
        let items = vec![
            json!({"result": [{"approved": true}]}),
            json!({"purposeId": "p2", "result": [{"approved": null}]}),
            json!(42),
        ];

        assert_eq!(
            decode_approvals(Value::Array(items.clone())),
            ApprovalPayload::Valid(items.clone())
        );
        assert_eq!(decode_item(1, &items[1]), AssessmentResult::default());
        assert_eq!(aggregate_raw(&items), AssessmentStatus::Approved);
        assert_eq!(aggregate_raw(&items[1..]), AssessmentStatus::Denied);
    }

    #[test]
    fn test_decode_reports_received_kind() {
        assert_eq!(
            decode_approvals(json!({"status": "ok"})),
            ApprovalPayload::Malformed("object".into())
        );
        assert_eq!(
            decode_approvals(json!("nope")),
            ApprovalPayload::Malformed("string".into())
        );
        assert_eq!(decode_approvals(Value::Null), ApprovalPayload::Malformed("null".into()));
        assert_eq!(decode_approvals(json!(7)), ApprovalPayload::Malformed("number".into()));
    }
}
