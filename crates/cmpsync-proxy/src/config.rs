use std::collections::{BTreeMap, BTreeSet};

use cmpsync_cookie::COOKIE_NAME;
use cmpsync_vendor::VendorList;
use serde::{Deserialize, Serialize};

use crate::error::{ProxyError, Result};

/// Handling of vendors added since the browser's last visit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LegitimateInterest {
    /// New vendors stay unselected until the user consents.
    #[default]
    Hard,
    /// New vendors are selected on the user's behalf.
    Soft,
}

/// Legacy consent category and the purposes it grants.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LegacyCategory {
    #[serde(default)]
    pub purposes: BTreeSet<u32>,
}

/// Page-supplied proxy configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CmpConfig {
    /// Include the built-in custom vendor list in the merge.
    pub use_built_in_vendor_list: bool,
    /// Publisher vendor list; restricts the global list to its ids.
    pub pub_vendor_list: Option<VendorList>,
    pub legitimate_interest: LegitimateInterest,
    /// Publisher-defined custom vendors.
    pub custom_vendors: Option<VendorList>,
    /// Intercept the display ad SDK (`sas.call`, `sas.setup`, `sas.render`).
    pub inject_in_smart_tags: bool,
    /// Hold programmatic ad requests until consent is ready.
    pub defer_dfp_loading: bool,
    /// Forward consent to the data-management SDK once ready.
    pub sync_cxense_consent: bool,
    /// Suppress the consent UI unless a caller forces it.
    pub hide_ui: bool,
    /// Legacy consent categories to migrate, keyed by category name.
    pub ensighten_mapping: BTreeMap<String, LegacyCategory>,
    /// Name of the known-vendor cookie.
    pub known_vendors_cookie: String,
}

impl Default for CmpConfig {
    fn default() -> Self {
        Self {
            use_built_in_vendor_list: true,
            pub_vendor_list: None,
            legitimate_interest: LegitimateInterest::Hard,
            custom_vendors: None,
            inject_in_smart_tags: false,
            defer_dfp_loading: false,
            sync_cxense_consent: false,
            hide_ui: false,
            ensighten_mapping: BTreeMap::new(),
            known_vendors_cookie: COOKIE_NAME.to_string(),
        }
    }
}

impl CmpConfig {
    /// Parse a configuration object. Unknown keys are ignored.
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Parse after checking the document against the embedded config schema.
    #[cfg(feature = "schema")]
    pub fn from_json_validated(
        json: &str,
        registry: &cmpsync_schema::SchemaRegistry,
    ) -> Result<Self> {
        registry.validate(cmpsync_schema::DocumentKind::Config, json.as_bytes())?;
        Self::from_json(json)
    }

    fn validate(&self) -> Result<()> {
        if self.known_vendors_cookie.trim().is_empty() {
            return Err(ProxyError::InvalidConfig(
                "knownVendorsCookie must not be empty".to_string(),
            ));
        }
        Ok(())
    }

    pub fn with_legitimate_interest(mut self, policy: LegitimateInterest) -> Self {
        self.legitimate_interest = policy;
        self
    }

    pub fn with_custom_vendors(mut self, list: VendorList) -> Self {
        self.custom_vendors = Some(list);
        self
    }

    pub fn with_pub_vendor_list(mut self, list: VendorList) -> Self {
        self.pub_vendor_list = Some(list);
        self
    }

    pub fn with_built_in_vendor_list(mut self, enabled: bool) -> Self {
        self.use_built_in_vendor_list = enabled;
        self
    }

    pub fn with_hide_ui(mut self, hide: bool) -> Self {
        self.hide_ui = hide;
        self
    }

    pub fn with_smart_tags(mut self, enabled: bool) -> Self {
        self.inject_in_smart_tags = enabled;
        self
    }

    pub fn with_deferred_dfp_loading(mut self, enabled: bool) -> Self {
        self.defer_dfp_loading = enabled;
        self
    }

    pub fn with_cxense_sync(mut self, enabled: bool) -> Self {
        self.sync_cxense_consent = enabled;
        self
    }

    pub fn with_legacy_category(mut self, name: impl Into<String>, purposes: &[u32]) -> Self {
        self.ensighten_mapping.insert(
            name.into(),
            LegacyCategory {
                purposes: purposes.iter().copied().collect(),
            },
        );
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = CmpConfig::default();
        assert!(config.use_built_in_vendor_list);
        assert_eq!(config.legitimate_interest, LegitimateInterest::Hard);
        assert!(!config.hide_ui);
        assert_eq!(config.known_vendors_cookie, COOKIE_NAME);
    }

    #[test]
    fn parses_page_config() {
        let config = CmpConfig::from_json(
            r#"{
                "useBuiltInVendorList": false,
                "legitimateInterest": "soft",
                "hideUi": true,
                "injectInSmartTags": true,
                "customVendors": {"vendorListVersion": 2, "vendors": [{"id": 6000, "name": "Pub"}]},
                "ensightenMapping": {"ADVERTISING": {"purposes": [1, 3]}},
                "somethingElse": 42
            }"#,
        )
        .unwrap();

        assert!(!config.use_built_in_vendor_list);
        assert_eq!(config.legitimate_interest, LegitimateInterest::Soft);
        assert!(config.hide_ui && config.inject_in_smart_tags);
        assert_eq!(config.custom_vendors.as_ref().map(|l| l.vendors.len()), Some(1));
        assert_eq!(
            config.ensighten_mapping["ADVERTISING"].purposes,
            BTreeSet::from([1, 3])
        );
    }

    #[test]
    fn rejects_unknown_policy() {
        assert!(matches!(
            CmpConfig::from_json(r#"{"legitimateInterest":"maybe"}"#),
            Err(ProxyError::Json(_))
        ));
    }

    #[test]
    fn rejects_empty_cookie_name() {
        assert!(matches!(
            CmpConfig::from_json(r#"{"knownVendorsCookie":"  "}"#),
            Err(ProxyError::InvalidConfig(_))
        ));
    }

    #[test]
    fn builder_methods() {
        let config = CmpConfig::default()
            .with_hide_ui(true)
            .with_legacy_category("ANALYTICS", &[5]);
        assert!(config.hide_ui);
        assert!(config.ensighten_mapping.contains_key("ANALYTICS"));
    }
}
