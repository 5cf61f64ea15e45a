use super::SlotKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Numeric consent state codes used by the service
pub const CONSENT_STATE_ACTIVE: i32 = 1;
pub const CONSENT_STATE_EXPIRED: i32 = 2;

/// Consent status shown next to a catalog entry
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConsentStatus {
    #[default]
    None,
    Active,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomAttribute {
    pub key: String,
    #[serde(default)]
    pub value: String,
}

/// A consent the subject has given (or refused) for a slot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub purpose_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type_id: Option<String>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    #[serde(
        default,
        with = "chrono::serde::ts_seconds_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_time: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_global: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<i32>,
    #[serde(rename = "geoIP", default, skip_serializing_if = "Option::is_none")]
    pub geo_ip: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub custom_attributes: Vec<CustomAttribute>,
}

impl ConsentRecord {
    pub fn new(purpose_id: impl Into<String>) -> Self {
        Self {
            purpose_id: purpose_id.into(),
            ..Self::default()
        }
    }

    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(
            &self.purpose_id,
            self.attribute_id.as_deref(),
            self.access_type_id.as_deref(),
        )
    }

    /// A record without attribute and access type covers the whole purpose
    pub fn covers_whole_purpose(&self) -> bool {
        self.attribute_id.is_none() && self.access_type_id.is_none()
    }

    /// Status of this record at the given instant
    pub fn consent_status(&self, now: DateTime<Utc>) -> ConsentStatus {
        let ended = self.end_time.is_some_and(|end| end <= now);
        match self.state {
            Some(CONSENT_STATE_EXPIRED) => ConsentStatus::Expired,
            _ if ended => ConsentStatus::Expired,
            Some(CONSENT_STATE_ACTIVE) => ConsentStatus::Active,
            _ => ConsentStatus::None,
        }
    }
}

/// Overall status of a metadata or consent call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CallStatus {
    Done,
    Error,
}

/// Outcome of [`Privacy::store_consents`](crate::Privacy::store_consents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedStore {
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl WrappedStore {
    pub fn done() -> Self {
        Self {
            status: CallStatus::Done,
            detail: None,
        }
    }

    pub fn error(detail: Option<Value>) -> Self {
        Self {
            status: CallStatus::Error,
            detail,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CallStatus::Error
    }
}

/// Outcome of [`Privacy::get_user_consents`](crate::Privacy::get_user_consents)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedConsents {
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consents: Option<Vec<ConsentRecord>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl WrappedConsents {
    pub fn done(consents: Vec<ConsentRecord>) -> Self {
        Self {
            status: CallStatus::Done,
            consents: Some(consents),
            detail: None,
        }
    }

    pub fn error(detail: Option<Value>) -> Self {
        Self {
            status: CallStatus::Error,
            consents: None,
            detail,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CallStatus::Error
    }
}
