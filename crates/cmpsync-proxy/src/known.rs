//! Known-vendor reconciliation.
//!
//! Compares the merged vendor list against the vendors this browser has
//! already been shown, applies the legitimate-interest policy to the new
//! ones, and rewrites the cookie with everything now known.

use cmpsync_cookie::KnownVendorsRecord;
use cmpsync_vendor::VendorList;

use crate::config::LegitimateInterest;
use crate::traits::{Cmp, CookieJar, CookieOptions};

/// What reconciliation found and did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KnownVendorOutcome {
    /// A valid record existed before this visit.
    pub had_record: bool,
    /// Vendors not in the previous record.
    pub new_vendors: Vec<u32>,
    /// Vendors selected in the CMP on the user's behalf.
    pub selected: Vec<u32>,
}

/// Read the stored record. A corrupt value counts as no record.
pub fn load_record(jar: &dyn CookieJar, cookie_name: &str) -> Option<KnownVendorsRecord> {
    let value = jar.get(cookie_name)?;
    match KnownVendorsRecord::decode(&value) {
        Ok(record) => Some(record),
        Err(err) => {
            tracing::warn!(cookie = cookie_name, error = %err, "corrupt known-vendor cookie, ignoring");
            None
        }
    }
}

/// Reconcile the stored record with `vendor_list`.
///
/// The record is fully decoded before any CMP selection happens. Without a
/// valid previous record nothing is selected.
pub fn reconcile(
    jar: &dyn CookieJar,
    cookie_name: &str,
    vendor_list: &VendorList,
    policy: LegitimateInterest,
    cmp: &dyn Cmp,
) -> KnownVendorOutcome {
    let previous = load_record(jar, cookie_name);
    let had_record = previous.is_some();
    let mut known = previous.unwrap_or_default();

    let new_vendors = if had_record {
        known.unseen(vendor_list.vendor_ids())
    } else {
        Vec::new()
    };

    let selected = match policy {
        LegitimateInterest::Soft => new_vendors.clone(),
        LegitimateInterest::Hard => Vec::new(),
    };
    for &vendor_id in &selected {
        tracing::debug!(vendor_id, "selecting new vendor under soft legitimate interest");
        cmp.select_vendor(vendor_id, true);
    }

    for vendor_id in vendor_list.vendor_ids() {
        known.insert(vendor_id);
    }
    match known.encode() {
        Ok(value) => jar.set(cookie_name, &value, &CookieOptions::known_vendors()),
        Err(err) => tracing::warn!(error = %err, "failed to encode known-vendor cookie"),
    }

    if !new_vendors.is_empty() {
        tracing::info!(count = new_vendors.len(), ?policy, "new vendors since last visit");
    }

    KnownVendorOutcome {
        had_record,
        new_vendors,
        selected,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;
    use std::collections::HashMap;

    use cmpsync_vendor::VendorDescriptor;
    use serde_json::Value;

    use super::*;
    use crate::traits::Callback;

    #[derive(Default)]
    pub(crate) struct MemoryJar {
        pub(crate) cookies: RefCell<HashMap<String, String>>,
    }

    impl CookieJar for MemoryJar {
        fn get(&self, name: &str) -> Option<String> {
            self.cookies.borrow().get(name).cloned()
        }

        fn set(&self, name: &str, value: &str, _options: &CookieOptions) {
            self.cookies
                .borrow_mut()
                .insert(name.to_string(), value.to_string());
        }
    }

    #[derive(Default)]
    pub(crate) struct SelectionLog {
        pub(crate) vendors: RefCell<Vec<(u32, bool)>>,
        pub(crate) purposes: RefCell<Vec<(u32, bool)>>,
    }

    impl Cmp for SelectionLog {
        fn call(&self, _command: &str, _parameter: Value, callback: Callback) {
            callback(Value::Null, false);
        }

        fn select_vendor(&self, vendor_id: u32, selected: bool) {
            self.vendors.borrow_mut().push((vendor_id, selected));
        }

        fn select_purpose(&self, purpose_id: u32, selected: bool) {
            self.purposes.borrow_mut().push((purpose_id, selected));
        }

        fn persist(&self) {}
    }

    fn vendor_list(ids: &[u32]) -> VendorList {
        VendorList::new(
            1,
            ids.iter()
                .map(|id| VendorDescriptor::new(*id, "v"))
                .collect(),
        )
    }

    fn jar_with(value: &str) -> MemoryJar {
        let jar = MemoryJar::default();
        jar.cookies
            .borrow_mut()
            .insert("known".to_string(), value.to_string());
        jar
    }

    #[test]
    fn first_visit_selects_nothing_and_writes_cookie() {
        let jar = MemoryJar::default();
        let cmp = SelectionLog::default();
        let outcome = reconcile(
            &jar,
            "known",
            &vendor_list(&[0, 1, 7, 5000]),
            LegitimateInterest::Soft,
            &cmp,
        );

        assert!(!outcome.had_record);
        assert!(outcome.new_vendors.is_empty());
        assert!(cmp.vendors.borrow().is_empty());
        assert_eq!(
            jar.get("known").as_deref(),
            Some(r#"{"global":"32","custom":[5000]}"#)
        );
    }

    #[test]
    fn soft_policy_selects_new_vendors() {
        let jar = jar_with(r#"{"global":"3","custom":[]}"#);
        let cmp = SelectionLog::default();
        let outcome = reconcile(
            &jar,
            "known",
            &vendor_list(&[0, 1, 2, 5000]),
            LegitimateInterest::Soft,
            &cmp,
        );

        assert_eq!(outcome.new_vendors, vec![2, 5000]);
        assert_eq!(*cmp.vendors.borrow(), vec![(2, true), (5000, true)]);
        let record = KnownVendorsRecord::decode(&jar.get("known").unwrap()).unwrap();
        assert!(record.contains(2) && record.contains(5000));
    }

    #[test]
    fn hard_policy_only_records_new_vendors() {
        let jar = jar_with(r#"{"global":"3","custom":[]}"#);
        let cmp = SelectionLog::default();
        let outcome = reconcile(
            &jar,
            "known",
            &vendor_list(&[0, 1, 2]),
            LegitimateInterest::Hard,
            &cmp,
        );

        assert_eq!(outcome.new_vendors, vec![2]);
        assert!(outcome.selected.is_empty());
        assert!(cmp.vendors.borrow().is_empty());
    }

    #[test]
    fn corrupt_cookie_applies_nothing() {
        // Valid first block, invalid second: nothing may be applied.
        let jar = jar_with(r#"{"global":"3\u007f","custom":[]}"#);
        let cmp = SelectionLog::default();
        let outcome = reconcile(
            &jar,
            "known",
            &vendor_list(&[0, 1, 2]),
            LegitimateInterest::Soft,
            &cmp,
        );

        assert!(!outcome.had_record);
        assert!(cmp.vendors.borrow().is_empty());
        let rewritten = KnownVendorsRecord::decode(&jar.get("known").unwrap()).unwrap();
        assert_eq!(rewritten, KnownVendorsRecord::from_vendor_ids([0, 1, 2]));
    }

    #[test]
    fn previously_known_vendors_are_kept() {
        let jar = jar_with(r#"{"global":"","custom":[6000]}"#);
        let cmp = SelectionLog::default();
        reconcile(&jar, "known", &vendor_list(&[1]), LegitimateInterest::Hard, &cmp);
        let record = KnownVendorsRecord::decode(&jar.get("known").unwrap()).unwrap();
        assert!(record.contains(6000) && record.contains(1));
    }
}
