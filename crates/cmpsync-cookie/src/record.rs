use std::collections::BTreeSet;

use cmpsync_vendor::{is_custom_vendor, CUSTOM_VENDOR_START_ID};

use crate::codec;
use crate::error::Result;

/// Name of the known-vendor cookie unless configured otherwise.
pub const COOKIE_NAME: &str = "cmpsync_known_vendors";

/// Cookie lifetime in days.
pub const COOKIE_MAX_AGE_DAYS: u32 = 390;

/// Vendor ids previously presented to this browser.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownVendorsRecord {
    /// Registry ids, persisted bit-packed.
    pub global: BTreeSet<u32>,
    /// Custom ids, persisted verbatim.
    pub custom: BTreeSet<u32>,
}

impl KnownVendorsRecord {
    /// Build a record from a sequence of vendor ids.
    pub fn from_vendor_ids(ids: impl IntoIterator<Item = u32>) -> Self {
        let mut record = Self::default();
        for id in ids {
            record.insert(id);
        }
        record
    }

    /// Returns true if the vendor has been observed.
    pub fn contains(&self, vendor_id: u32) -> bool {
        if is_custom_vendor(vendor_id, CUSTOM_VENDOR_START_ID) {
            self.custom.contains(&vendor_id)
        } else {
            self.global.contains(&vendor_id)
        }
    }

    /// Mark a vendor as observed. Returns true if it was new.
    pub fn insert(&mut self, vendor_id: u32) -> bool {
        if is_custom_vendor(vendor_id, CUSTOM_VENDOR_START_ID) {
            self.custom.insert(vendor_id)
        } else {
            self.global.insert(vendor_id)
        }
    }

    /// Ids from `vendor_ids` not yet observed, first occurrence order.
    pub fn unseen(&self, vendor_ids: impl IntoIterator<Item = u32>) -> Vec<u32> {
        let mut reported = BTreeSet::new();
        vendor_ids
            .into_iter()
            .filter(|id| !self.contains(*id) && reported.insert(*id))
            .collect()
    }

    /// Decode a cookie value.
    pub fn decode(value: &str) -> Result<Self> {
        codec::decode(value)
    }

    /// Encode as a cookie value.
    pub fn encode(&self) -> Result<String> {
        codec::encode(&self.global, &self.custom)
    }

    pub fn len(&self) -> usize {
        self.global.len() + self.custom.len()
    }

    pub fn is_empty(&self) -> bool {
        self.global.is_empty() && self.custom.is_empty()
    }
}
