//! Removal of custom vendor ids from externally visible values.
//!
//! External verifiers check a consent string against its declared vendor
//! count, so custom ids are removed and every derived field (`maxVendorId`,
//! the dense vendor-consent map) is recomputed. Only values crossing the
//! public command boundary go through here; internal state keeps the ids.

use std::collections::BTreeMap;

use crate::error::Result;
use crate::model::{ConsentData, ConsentRecord, VendorConsents, VendorList};

/// Black-box bijection between a consent string and its decoded record.
pub trait ConsentCodec {
    /// Decode an opaque consent string.
    fn decode(&self, consent_string: &str) -> Result<ConsentRecord>;
    /// Encode a record back to an opaque consent string.
    fn encode(&self, record: &ConsentRecord) -> Result<String>;
}

/// Drop selected vendor ids at or above `threshold` and resync `max_vendor_id`.
pub fn filter_record(record: &mut ConsentRecord, threshold: u32) {
    record.selected_vendor_ids.retain(|id| *id < threshold);
    record.sync_max_vendor_id();
}

/// Drop custom ids from a vendor-consent map and rebuild it densely.
///
/// `max_vendor_id` becomes the largest remaining consented id. The map is
/// rebuilt for `1..=n` where `n` is the largest remaining key, with gaps
/// filled with `false`; key 0 and everything beyond `n` is discarded.
pub fn filter_vendor_consent_map(consents: &mut VendorConsents, threshold: u32) {
    let remaining: BTreeMap<u32, bool> = consents
        .vendor_consents
        .iter()
        .filter(|(id, _)| **id >= 1 && **id < threshold)
        .map(|(id, consent)| (*id, *consent))
        .collect();

    consents.max_vendor_id = remaining
        .iter()
        .rev()
        .find(|(_, consent)| **consent)
        .map(|(id, _)| *id)
        .unwrap_or(0);

    let dense_until = remaining.keys().next_back().copied().unwrap_or(0);
    consents.vendor_consents = (1..=dense_until)
        .map(|id| (id, remaining.get(&id).copied().unwrap_or(false)))
        .collect();
}

/// Drop vendor descriptors at or above `threshold`.
pub fn filter_vendor_list(list: &mut VendorList, threshold: u32) {
    list.vendors.retain(|vendor| vendor.id < threshold);
}

/// Applies the custom-vendor filter with a consent codec.
#[derive(Clone, Copy)]
pub struct ConsentFilter<'a> {
    codec: &'a dyn ConsentCodec,
    threshold: u32,
}

impl<'a> ConsentFilter<'a> {
    /// Create a filter for ids at or above `threshold`.
    pub fn new(codec: &'a dyn ConsentCodec, threshold: u32) -> Self {
        Self { codec, threshold }
    }

    /// Re-derive a consent string without custom vendor ids.
    ///
    /// An empty string (no consent recorded yet) is returned unchanged.
    pub fn consent_string(&self, consent_string: &str) -> Result<String> {
        if consent_string.is_empty() {
            return Ok(String::new());
        }
        let mut record = self.codec.decode(consent_string)?;
        filter_record(&mut record, self.threshold);
        self.codec.encode(&record)
    }

    /// Filter a `getConsentData` result.
    pub fn consent_data(&self, mut data: ConsentData) -> Result<ConsentData> {
        data.consent_data = self.consent_string(&data.consent_data)?;
        Ok(data)
    }

    /// Filter a `getVendorConsents` result, metadata string included.
    pub fn vendor_consents(&self, mut consents: VendorConsents) -> Result<VendorConsents> {
        consents.metadata = self.consent_string(&consents.metadata)?;
        filter_vendor_consent_map(&mut consents, self.threshold);
        Ok(consents)
    }

    /// Filter a `getVendorList` result.
    pub fn vendor_list(&self, mut list: VendorList) -> VendorList {
        filter_vendor_list(&mut list, self.threshold);
        list
    }
}
