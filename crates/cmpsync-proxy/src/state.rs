use std::rc::Rc;

use cmpsync_vendor::{ConsentData, VendorConsents};

use crate::known::KnownVendorOutcome;
use crate::traits::Cmp;

/// Consent as resolved at the ready transition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConsentSnapshot {
    /// Unfiltered `getConsentData` result.
    pub consent_data: ConsentData,
    /// Unfiltered `getVendorConsents` result.
    pub vendor_consents: VendorConsents,
    /// Consent string with custom vendors removed, for injection into ad calls.
    pub consent_string: String,
}

impl ConsentSnapshot {
    pub fn purpose_allowed(&self, purpose_id: u32) -> bool {
        self.vendor_consents
            .purpose_consents
            .get(&purpose_id)
            .copied()
            .unwrap_or(false)
    }

    pub fn vendor_allowed(&self, vendor_id: u32) -> bool {
        self.vendor_consents.consent_for(vendor_id)
    }
}

/// Mutable proxy state. Lives from page load until the proxy is dropped.
#[derive(Default)]
pub(crate) struct SyncState {
    pub(crate) cmp: Option<Rc<dyn Cmp>>,
    /// Latest unfiltered vendor consents, refreshed on re-submission.
    pub(crate) vendor_consents: Option<VendorConsents>,
    pub(crate) known_vendors: Option<KnownVendorOutcome>,
    pub(crate) migrated_purposes: Vec<u32>,
}
