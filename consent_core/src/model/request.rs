use serde::{Deserialize, Serialize};
use std::fmt;

/// Access type assumed when a request item does not name one
pub const DEFAULT_ACCESS_TYPE: &str = "default";

/// A single requested data-usage item
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestItem {
    pub purpose_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_type_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_value: Option<String>,
}

impl RequestItem {
    pub fn new(purpose_id: impl Into<String>) -> Self {
        Self {
            purpose_id: purpose_id.into(),
            ..Self::default()
        }
    }

    pub fn with_access_type(mut self, access_type_id: impl Into<String>) -> Self {
        self.access_type_id = Some(access_type_id.into());
        self
    }

    pub fn with_attribute(mut self, attribute_id: impl Into<String>) -> Self {
        self.attribute_id = Some(attribute_id.into());
        self
    }

    pub fn with_attribute_value(mut self, value: impl Into<String>) -> Self {
        self.attribute_value = Some(value.into());
        self
    }

    /// Copy of this item with the access type defaulted
    pub fn normalized(&self) -> Self {
        let mut item = self.clone();
        if item.access_type_id.is_none() {
            item.access_type_id = Some(DEFAULT_ACCESS_TYPE.to_string());
        }
        item
    }

    /// Slot key of this item once the access type is defaulted
    pub fn slot_key(&self) -> SlotKey {
        SlotKey::new(
            &self.purpose_id,
            self.attribute_id.as_deref(),
            Some(
                self.access_type_id
                    .as_deref()
                    .unwrap_or(DEFAULT_ACCESS_TYPE),
            ),
        )
    }
}

/// Composite `purpose/attribute.accessType` key identifying a requested slot
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SlotKey(String);

impl SlotKey {
    /// Missing attribute or access type render as empty segments
    pub fn new(purpose_id: &str, attribute_id: Option<&str>, access_type_id: Option<&str>) -> Self {
        Self(format!(
            "{}/{}.{}",
            purpose_id,
            attribute_id.unwrap_or(""),
            access_type_id.unwrap_or("")
        ))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SlotKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&RequestItem> for SlotKey {
    fn from(item: &RequestItem) -> Self {
        item.slot_key()
    }
}
