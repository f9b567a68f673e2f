//! Vendor list merging and consent filtering for custom vendors.
//!
//! The IAB global vendor list only knows registry vendors. Operators add
//! their own "custom" vendors with ids at or above
//! [`CUSTOM_VENDOR_START_ID`]. This crate:
//! - merges the global, built-in and publisher vendor lists into one list
//! - moves per-vendor consent handlers into a [`ListenerRegistry`]
//! - strips custom ids back out of every value handed to external callers

pub mod builtin;
pub mod error;
pub mod filter;
pub mod listeners;
pub mod merge;
pub mod model;

pub use builtin::{built_in_custom_vendors, BUILT_IN_VENDOR_LIST_VERSION};
pub use error::{Result, VendorError};
pub use filter::{
    filter_record, filter_vendor_consent_map, filter_vendor_list, ConsentCodec, ConsentFilter,
};
pub use listeners::{ConsentListener, ListenerRegistry, ListenerResult};
pub use merge::{merge, restrict_to, CustomVendor, CustomVendorList};
pub use model::{
    is_custom_vendor, ConsentData, ConsentRecord, VendorConsents, VendorDescriptor, VendorList,
    CUSTOM_VENDOR_START_ID,
};
