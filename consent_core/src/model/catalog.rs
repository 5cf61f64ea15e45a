use super::{CallStatus, ConsentRecord, ConsentStatus};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// How the catalog groups a purpose
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PurposeCategory {
    Eula,
    #[default]
    #[serde(other)]
    Default,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogAccessType {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "assentUIDefault", default)]
    pub assent_ui_default: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogAttribute {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// Falls back to the purpose's access types when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_types: Option<Vec<CatalogAccessType>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogPurpose {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub category: PurposeCategory,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_consent_duration: Option<u64>,
    #[serde(default)]
    pub access_types: Vec<CatalogAccessType>,
    #[serde(default)]
    pub attributes: Vec<CatalogAttribute>,
}

/// Catalog and consent state returned for a set of purposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCatalogResponse {
    #[serde(default)]
    pub purposes: BTreeMap<String, CatalogPurpose>,
    #[serde(default)]
    pub consents: Vec<ConsentRecord>,
}

/// Metadata for one requested slot, merged with the subject's consent
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetadataCatalogEntry {
    pub purpose_id: String,
    pub purpose_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purpose_version: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attribute_name: Option<String>,
    pub access_type_id: String,
    pub access_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_consent_duration: Option<u64>,
    #[serde(rename = "assentUIDefault")]
    pub assent_ui_default: bool,
    pub status: ConsentStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub consent: Option<ConsentRecord>,
}

/// Catalog entries split the way the catalog categorizes purposes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataBuckets {
    pub eula: Vec<MetadataCatalogEntry>,
    pub default: Vec<MetadataCatalogEntry>,
}

impl MetadataBuckets {
    pub fn push(&mut self, category: PurposeCategory, entry: MetadataCatalogEntry) {
        match category {
            PurposeCategory::Eula => self.eula.push(entry),
            PurposeCategory::Default => self.default.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.eula.len() + self.default.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Outcome of [`Privacy::get_consent_metadata`](crate::Privacy::get_consent_metadata)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WrappedMetadata {
    pub status: CallStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MetadataBuckets>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<Value>,
}

impl WrappedMetadata {
    pub fn done(metadata: MetadataBuckets) -> Self {
        Self {
            status: CallStatus::Done,
            metadata: Some(metadata),
            detail: None,
        }
    }

    pub fn error(detail: Option<Value>) -> Self {
        Self {
            status: CallStatus::Error,
            metadata: None,
            detail,
        }
    }

    pub fn is_error(&self) -> bool {
        self.status == CallStatus::Error
    }
}
