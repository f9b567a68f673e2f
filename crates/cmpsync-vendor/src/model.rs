//! Consent record model.
//!
//! Field names serialize in the camelCase shape used by IAB CMP v1.1
//! command results, so values cross the frame boundary unchanged.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// First vendor id reserved for operator-defined (non-registry) vendors.
pub const CUSTOM_VENDOR_START_ID: u32 = 5000;

/// Returns true if `id` lies in the custom vendor range for `threshold`.
pub fn is_custom_vendor(id: u32, threshold: u32) -> bool {
    id >= threshold
}

/// One vendor entry of a vendor list.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VendorDescriptor {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub policy_url: String,
    #[serde(default)]
    pub purpose_ids: BTreeSet<u32>,
    #[serde(default)]
    pub leg_int_purpose_ids: BTreeSet<u32>,
    #[serde(default)]
    pub feature_ids: BTreeSet<u32>,
}

impl VendorDescriptor {
    /// Create a descriptor with only an id and name.
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            policy_url: String::new(),
            purpose_ids: BTreeSet::new(),
            leg_int_purpose_ids: BTreeSet::new(),
            feature_ids: BTreeSet::new(),
        }
    }
}

/// A versioned, ordered vendor list.
///
/// Keys other than `vendorListVersion` and `vendors` (purposes, features,
/// lastUpdated on the global list) are kept in `extra` and written back.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct VendorList {
    #[serde(default)]
    pub vendor_list_version: u32,
    #[serde(default)]
    pub vendors: Vec<VendorDescriptor>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl VendorList {
    /// Create a list from a version and vendors.
    pub fn new(vendor_list_version: u32, vendors: Vec<VendorDescriptor>) -> Self {
        Self {
            vendor_list_version,
            vendors,
            extra: Map::new(),
        }
    }

    /// Ids of all vendors in list order.
    pub fn vendor_ids(&self) -> impl Iterator<Item = u32> + '_ {
        self.vendors.iter().map(|vendor| vendor.id)
    }

    /// Look up a vendor by id. Duplicate ids resolve to the last entry.
    pub fn vendor(&self, id: u32) -> Option<&VendorDescriptor> {
        self.vendors.iter().rev().find(|vendor| vendor.id == id)
    }
}

/// Decoded form of a consent string.
///
/// Maps keyed by integer ids rule out `#[serde(flatten)]` here, so every
/// field the consent string carries is spelled out.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentRecord {
    #[serde(default)]
    pub version: u32,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub created: u64,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub last_updated: u64,
    #[serde(default)]
    pub cmp_id: u32,
    #[serde(default)]
    pub cmp_version: u32,
    #[serde(default)]
    pub consent_screen: u32,
    #[serde(default)]
    pub consent_language: String,
    #[serde(default)]
    pub vendor_list_version: u32,
    #[serde(default)]
    pub max_vendor_id: u32,
    #[serde(default)]
    pub purpose_consents: BTreeMap<u32, bool>,
    #[serde(default)]
    pub selected_vendor_ids: BTreeSet<u32>,
}

impl ConsentRecord {
    /// Recompute `max_vendor_id` from the selected vendor set.
    pub fn sync_max_vendor_id(&mut self) {
        self.max_vendor_id = self.selected_vendor_ids.last().copied().unwrap_or(0);
    }

    /// Returns true if the purpose is consented.
    pub fn purpose_allowed(&self, purpose_id: u32) -> bool {
        self.purpose_consents
            .get(&purpose_id)
            .copied()
            .unwrap_or(false)
    }
}

/// Result of the `getConsentData` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ConsentData {
    #[serde(default)]
    pub consent_data: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_applies: Option<bool>,
    #[serde(default)]
    pub has_global_scope: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Result of the `getVendorConsents` command.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VendorConsents {
    #[serde(default)]
    pub metadata: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gdpr_applies: Option<bool>,
    #[serde(default)]
    pub has_global_scope: bool,
    #[serde(default)]
    pub purpose_consents: BTreeMap<u32, bool>,
    #[serde(default)]
    pub vendor_consents: BTreeMap<u32, bool>,
    #[serde(default)]
    pub max_vendor_id: u32,
}

impl VendorConsents {
    /// Consent value for a vendor; absent vendors are not consented.
    pub fn consent_for(&self, vendor_id: u32) -> bool {
        self.vendor_consents
            .get(&vendor_id)
            .copied()
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vendor_list_keeps_unknown_keys() {
        let json = r#"{
            "vendorListVersion": 4,
            "lastUpdated": "2018-05-28T00:00:00Z",
            "purposes": [{"id": 1, "name": "Storage"}],
            "vendors": [{"id": 3, "name": "Vendor 3", "purposeIds": [1]}]
        }"#;
        let list: VendorList = serde_json::from_str(json).unwrap();
        assert_eq!(list.vendor_list_version, 4);
        assert_eq!(list.vendors[0].purpose_ids, BTreeSet::from([1]));
        assert!(list.extra.contains_key("purposes"));

        let back = serde_json::to_value(&list).unwrap();
        assert_eq!(back["lastUpdated"], "2018-05-28T00:00:00Z");
        assert_eq!(back["vendors"][0]["policyUrl"], "");
    }

    #[test]
    fn vendor_consents_parse_string_keys() {
        let json = r#"{
            "metadata": "BOx",
            "gdprApplies": true,
            "vendorConsents": {"1": true, "2": false}
        }"#;
        let consents: VendorConsents = serde_json::from_str(json).unwrap();
        assert!(consents.consent_for(1));
        assert!(!consents.consent_for(2));
        assert!(!consents.consent_for(3));
        assert_eq!(consents.gdpr_applies, Some(true));
    }

    #[test]
    fn sync_max_vendor_id_uses_largest_selected() {
        let mut record = ConsentRecord {
            selected_vendor_ids: BTreeSet::from([2, 9, 4]),
            ..ConsentRecord::default()
        };
        record.sync_max_vendor_id();
        assert_eq!(record.max_vendor_id, 9);

        record.selected_vendor_ids.clear();
        record.sync_max_vendor_id();
        assert_eq!(record.max_vendor_id, 0);
    }

    #[test]
    fn duplicate_ids_resolve_to_last_entry() {
        let list = VendorList::new(
            1,
            vec![VendorDescriptor::new(7, "first"), VendorDescriptor::new(7, "second")],
        );
        assert_eq!(list.vendor(7).map(|v| v.name.as_str()), Some("second"));
    }
}
