//! Custom vendors shipped with the proxy.

use std::collections::BTreeSet;

use crate::merge::{CustomVendor, CustomVendorList};
use crate::model::{VendorDescriptor, CUSTOM_VENDOR_START_ID};

/// Version contributed by the built-in custom list to the merged version.
pub const BUILT_IN_VENDOR_LIST_VERSION: u32 = 1;

/// The built-in custom vendor list.
pub fn built_in_custom_vendors() -> CustomVendorList {
    let vendors = [
        (
            CUSTOM_VENDOR_START_ID,
            "Google LLC",
            "https://policies.google.com/privacy",
        ),
        (
            CUSTOM_VENDOR_START_ID + 1,
            "Improve Digital B.V.",
            "https://www.improvedigital.com/privacy-policy/",
        ),
    ]
    .into_iter()
    .map(|(id, name, policy_url)| {
        CustomVendor::new(VendorDescriptor {
            id,
            name: name.to_string(),
            policy_url: policy_url.to_string(),
            purpose_ids: BTreeSet::from([1]),
            leg_int_purpose_ids: BTreeSet::from([2, 3, 4, 5]),
            feature_ids: BTreeSet::from([1, 2]),
        })
    })
    .collect();

    CustomVendorList {
        vendor_list_version: BUILT_IN_VENDOR_LIST_VERSION,
        vendors,
    }
}
