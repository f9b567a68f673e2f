//! Vendor list merging.
//!
//! The merged list is the concatenation of, in order: the upstream global
//! list, the built-in custom vendors, and the publisher's custom vendors.
//! Its version is the sum of the three source versions.

use std::collections::BTreeSet;
use std::fmt;

use crate::listeners::{ConsentListener, ListenerRegistry};
use crate::model::{VendorDescriptor, VendorList};

/// A custom vendor plus its optional consent handlers.
///
/// Handlers never reach the merged [`VendorList`]; they are moved into the
/// [`ListenerRegistry`] during [`merge`].
pub struct CustomVendor {
    pub descriptor: VendorDescriptor,
    pub on_consent: Option<ConsentListener>,
    pub on_submit: Option<ConsentListener>,
}

impl CustomVendor {
    /// Wrap a descriptor without handlers.
    pub fn new(descriptor: VendorDescriptor) -> Self {
        Self {
            descriptor,
            on_consent: None,
            on_submit: None,
        }
    }

    /// Attach an onConsent handler.
    pub fn with_on_consent(mut self, listener: ConsentListener) -> Self {
        self.on_consent = Some(listener);
        self
    }

    /// Attach an onSubmit handler.
    pub fn with_on_submit(mut self, listener: ConsentListener) -> Self {
        self.on_submit = Some(listener);
        self
    }
}

impl fmt::Debug for CustomVendor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CustomVendor")
            .field("descriptor", &self.descriptor)
            .field("on_consent", &self.on_consent.is_some())
            .field("on_submit", &self.on_submit.is_some())
            .finish()
    }
}

/// A versioned list of custom vendors.
#[derive(Debug, Default)]
pub struct CustomVendorList {
    pub vendor_list_version: u32,
    pub vendors: Vec<CustomVendor>,
}

impl From<VendorList> for CustomVendorList {
    fn from(list: VendorList) -> Self {
        Self {
            vendor_list_version: list.vendor_list_version,
            vendors: list.vendors.into_iter().map(CustomVendor::new).collect(),
        }
    }
}

/// Merge the three vendor sources into one list.
///
/// Ids are not deduplicated. Handlers of the first vendor carrying a given
/// id are registered; handlers on later duplicates are dropped.
pub fn merge(
    global: VendorList,
    built_in: Option<CustomVendorList>,
    publisher: Option<CustomVendorList>,
    registry: &mut ListenerRegistry,
) -> VendorList {
    let mut merged = global;

    for source in [built_in, publisher].into_iter().flatten() {
        merged.vendor_list_version = merged
            .vendor_list_version
            .saturating_add(source.vendor_list_version);
        merged.vendors.reserve(source.vendors.len());

        for vendor in source.vendors {
            let id = vendor.descriptor.id;
            if let Some(listener) = vendor.on_consent {
                registry.register_on_consent(id, listener);
            }
            if let Some(listener) = vendor.on_submit {
                registry.register_on_submit(id, listener);
            }
            merged.vendors.push(vendor.descriptor);
        }
    }

    tracing::debug!(
        vendor_count = merged.vendors.len(),
        vendor_list_version = merged.vendor_list_version,
        "merged vendor lists"
    );
    merged
}

/// Keep only vendors whose ids appear in `allowed` (publisher vendor list).
pub fn restrict_to(mut list: VendorList, allowed: &BTreeSet<u32>) -> VendorList {
    list.vendors.retain(|vendor| allowed.contains(&vendor.id));
    list
}
