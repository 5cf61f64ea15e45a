//! Builds requested slot keys and reduces a consent catalog to them.

use crate::model::{
    CatalogAccessType, CatalogAttribute, CatalogPurpose, ConsentRecord, ConsentStatus,
    MetadataBuckets, MetadataCatalogEntry, RawCatalogResponse, RequestItem, SlotKey,
};
use chrono::{DateTime, Utc};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

/// Normalized view of a request list
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestedSlots {
    /// Copies of the input items with the access type defaulted
    pub items: Vec<RequestItem>,
    /// Distinct purpose ids in first-seen order
    pub purposes: Vec<String>,
    pub keys: BTreeSet<SlotKey>,
}

/// Collect purposes and slot keys of the given items.
///
/// The input is left untouched; defaulted copies are returned in `items`.
pub fn requested_slots(items: &[RequestItem]) -> RequestedSlots {
    let mut slots = RequestedSlots::default();
    let mut seen = BTreeSet::new();

    for item in items {
        let normalized = item.normalized();
        if seen.insert(normalized.purpose_id.clone()) {
            slots.purposes.push(normalized.purpose_id.clone());
        }
        slots.keys.insert(normalized.slot_key());
        slots.items.push(normalized);
    }

    debug!(
        purposes = slots.purposes.len(),
        keys = slots.keys.len(),
        "Collected requested slots"
    );
    slots
}

/// Keep only requested slots of the catalog and merge in consent state
pub fn process_catalog(requested: &BTreeSet<SlotKey>, catalog: RawCatalogResponse) -> MetadataBuckets {
    process_catalog_at(requested, catalog, Utc::now())
}

/// Same as [`process_catalog`], evaluating consent windows at `now`
pub fn process_catalog_at(
    requested: &BTreeSet<SlotKey>,
    catalog: RawCatalogResponse,
    now: DateTime<Utc>,
) -> MetadataBuckets {
    let consents = ConsentIndex::new(&catalog.consents);
    let mut buckets = MetadataBuckets::default();

    for (purpose_id, purpose) in &catalog.purposes {
        for (attribute, access_type) in slots_of(purpose) {
            let key = SlotKey::new(
                purpose_id,
                attribute.map(|a| a.id.as_str()),
                Some(access_type.id.as_str()),
            );
            if !requested.contains(&key) {
                trace!(key = %key, "Catalog slot not requested");
                continue;
            }

            let record = consents.lookup(purpose_id, &key);
            let entry = MetadataCatalogEntry {
                purpose_id: purpose_id.clone(),
                purpose_name: purpose.name.clone(),
                purpose_version: purpose.version,
                attribute_id: attribute.map(|a| a.id.clone()),
                attribute_name: attribute.map(|a| a.name.clone()),
                access_type_id: access_type.id.clone(),
                access_type: access_type.name.clone(),
                default_consent_duration: purpose.default_consent_duration,
                assent_ui_default: access_type.assent_ui_default,
                status: record.map_or(ConsentStatus::None, |r| r.consent_status(now)),
                consent: record.cloned(),
            };
            buckets.push(purpose.category, entry);
        }
    }

    debug!(
        eula = buckets.eula.len(),
        default = buckets.default.len(),
        "Processed consent metadata"
    );
    buckets
}

/// Every attribute/access-type pair a purpose offers.
///
/// Purposes without attributes contribute their access types with no
/// attribute. Attributes without access types inherit the purpose's.
fn slots_of(
    purpose: &CatalogPurpose,
) -> Vec<(Option<&CatalogAttribute>, &CatalogAccessType)> {
    if purpose.attributes.is_empty() {
        return purpose.access_types.iter().map(|at| (None, at)).collect();
    }

    purpose
        .attributes
        .iter()
        .flat_map(|attribute| {
            attribute
                .access_types
                .as_ref()
                .unwrap_or(&purpose.access_types)
                .iter()
                .map(move |at| (Some(attribute), at))
        })
        .collect()
}

struct ConsentIndex<'a> {
    by_slot: HashMap<SlotKey, &'a ConsentRecord>,
    by_purpose: HashMap<&'a str, &'a ConsentRecord>,
}

impl<'a> ConsentIndex<'a> {
    fn new(records: &'a [ConsentRecord]) -> Self {
        let mut by_slot = HashMap::new();
        let mut by_purpose = HashMap::new();

        for record in records {
            if record.covers_whole_purpose() {
                keep_latest(by_purpose.entry(record.purpose_id.as_str()), record);
            } else {
                keep_latest(by_slot.entry(record.slot_key()), record);
            }
        }

        Self {
            by_slot,
            by_purpose,
        }
    }

    /// Exact slot record first, then a record covering the whole purpose
    fn lookup(&self, purpose_id: &str, key: &SlotKey) -> Option<&'a ConsentRecord> {
        self.by_slot
            .get(key)
            .or_else(|| self.by_purpose.get(purpose_id))
            .copied()
    }
}

/// With several records for one slot the most recently started one wins
fn keep_latest<'a, K>(
    entry: std::collections::hash_map::Entry<'_, K, &'a ConsentRecord>,
    record: &'a ConsentRecord,
) {
    use std::collections::hash_map::Entry;

    match entry {
        Entry::Vacant(slot) => {
            slot.insert(record);
        }
        Entry::Occupied(mut slot) => {
            if record.start_time >= slot.get().start_time {
                slot.insert(record);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{PurposeCategory, CONSENT_STATE_ACTIVE, CONSENT_STATE_EXPIRED};
    use chrono::TimeZone;
    use serde_json::json;

    fn catalog() -> RawCatalogResponse {
        serde_json::from_value(json!({
            "purposes": {
                "eula1": {
                    "name": "Terms of use",
                    "category": "eula",
                    "accessTypes": [{"id": "default", "name": "Default"}]
                },
                "marketing": {
                    "name": "Marketing",
                    "category": "default",
                    "defaultConsentDuration": 30,
                    "accessTypes": [
                        {"id": "read", "name": "Read", "assentUIDefault": true},
                        {"id": "write", "name": "Write"}
                    ],
                    "attributes": [
                        {"id": "email", "name": "Email"},
                        {"id": "phone", "name": "Phone", "accessTypes": [{"id": "call", "name": "Call"}]}
                    ]
                }
            }
        }))
        .unwrap()
    }

    fn keys(raw: &[&str]) -> BTreeSet<SlotKey> {
        raw.iter()
            .map(|k| serde_json::from_value(json!(k)).unwrap())
            .collect()
    }

    #[test]
    fn test_requested_slots_defaults_and_dedups() {
        let items = vec![
            RequestItem::new("marketing").with_attribute("email").with_access_type("read"),
            RequestItem::new("marketing").with_attribute("email").with_access_type("read"),
            RequestItem::new("eula1"),
            RequestItem::new("marketing").with_attribute("phone"),
        ];
        let slots = requested_slots(&items);

        assert_eq!(slots.purposes, vec!["marketing", "eula1"]);
        assert_eq!(
            slots.keys,
            keys(&["marketing/email.read", "eula1/.default", "marketing/phone.default"])
        );
        assert_eq!(slots.items.len(), 4);
        assert_eq!(slots.items[2].access_type_id.as_deref(), Some("default"));
        assert!(items[2].access_type_id.is_none());
    }

    #[test]
    fn test_only_requested_slots_are_kept() {
        let requested = keys(&["eula1/.default", "marketing/email.write", "marketing/phone.call"]);
        let buckets = process_catalog(&requested, catalog());

        assert_eq!(buckets.eula.len(), 1);
        assert_eq!(buckets.eula[0].purpose_id, "eula1");
        assert!(buckets.eula[0].attribute_id.is_none());

        let slots: Vec<_> = buckets
            .default
            .iter()
            .map(|e| (e.attribute_id.clone().unwrap(), e.access_type_id.clone()))
            .collect();
        assert_eq!(
            slots,
            vec![
                ("email".to_string(), "write".to_string()),
                ("phone".to_string(), "call".to_string())
            ]
        );
    }

    #[test]
    fn test_unknown_slots_are_dropped() {
        let requested = keys(&["marketing/address.read", "other/.default"]);
        assert!(process_catalog(&requested, catalog()).is_empty());
    }

    #[test]
    fn test_entry_carries_catalog_fields() {
        let requested = keys(&["marketing/email.read"]);
        let buckets = process_catalog(&requested, catalog());
        let entry = &buckets.default[0];

        assert_eq!(entry.purpose_name, "Marketing");
        assert_eq!(entry.attribute_name.as_deref(), Some("Email"));
        assert_eq!(entry.access_type, "Read");
        assert_eq!(entry.default_consent_duration, Some(30));
        assert!(entry.assent_ui_default);
        assert_eq!(entry.status, ConsentStatus::None);
        assert!(entry.consent.is_none());
    }

    #[test]
    fn test_consent_records_are_merged() {
        let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let mut raw = catalog();

        let mut email = ConsentRecord::new("marketing");
        email.attribute_id = Some("email".into());
        email.access_type_id = Some("read".into());
        email.state = Some(CONSENT_STATE_ACTIVE);

        let mut eula = ConsentRecord::new("eula1");
        eula.state = Some(CONSENT_STATE_EXPIRED);

        raw.consents = vec![email.clone(), eula.clone()];

        let requested = keys(&["marketing/email.read", "marketing/email.write", "eula1/.default"]);
        let buckets = process_catalog_at(&requested, raw, now);

        assert_eq!(buckets.eula[0].status, ConsentStatus::Expired);
        assert_eq!(buckets.eula[0].consent.as_ref(), Some(&eula));

        let read = buckets
            .default
            .iter()
            .find(|e| e.access_type_id == "read")
            .unwrap();
        assert_eq!(read.status, ConsentStatus::Active);
        assert_eq!(read.consent.as_ref(), Some(&email));

        let write = buckets
            .default
            .iter()
            .find(|e| e.access_type_id == "write")
            .unwrap();
        assert_eq!(write.status, ConsentStatus::None);
    }

    #[test]
    fn test_latest_record_wins() {
        let mut older = ConsentRecord::new("eula1");
        older.access_type_id = Some("default".into());
        older.start_time = Some(Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap());
        older.state = Some(CONSENT_STATE_EXPIRED);

        let mut newer = older.clone();
        newer.start_time = Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap());
        newer.state = Some(CONSENT_STATE_ACTIVE);

        let mut raw = catalog();
        raw.consents = vec![newer, older];

        let buckets = process_catalog(&keys(&["eula1/.default"]), raw);
        assert_eq!(buckets.eula[0].status, ConsentStatus::Active);
    }

    #[test]
    fn test_category_decides_bucket() {
        let mut raw = catalog();
        raw.purposes.get_mut("eula1").unwrap().category = PurposeCategory::Default;

        let buckets = process_catalog(&keys(&["eula1/.default"]), raw);
        assert!(buckets.eula.is_empty());
        assert_eq!(buckets.default.len(), 1);
    }
}
