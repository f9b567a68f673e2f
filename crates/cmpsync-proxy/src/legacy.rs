//! Migration of consent recorded by a legacy tag manager privacy module.

use std::collections::{BTreeMap, BTreeSet};

use crate::config::LegacyCategory;
use crate::traits::{Cmp, CookieJar};

/// Cookie prefix of the legacy per-category consent flags.
pub const LEGACY_COOKIE_PREFIX: &str = "ENSIGHTEN_PRIVACY_";

/// Select the purposes of every legacy category the user accepted.
///
/// A category is accepted when its cookie value is `"1"`. Returns the
/// purposes selected, in ascending order.
pub fn migrate(
    jar: &dyn CookieJar,
    mapping: &BTreeMap<String, LegacyCategory>,
    cmp: &dyn Cmp,
) -> Vec<u32> {
    let mut purposes = BTreeSet::new();
    for (category, grant) in mapping {
        let cookie = format!("{LEGACY_COOKIE_PREFIX}{category}");
        if jar.get(&cookie).as_deref().map(str::trim) == Some("1") {
            tracing::debug!(%category, "migrating legacy consent category");
            purposes.extend(grant.purposes.iter().copied());
        }
    }

    for &purpose_id in &purposes {
        cmp.select_purpose(purpose_id, true);
    }
    purposes.into_iter().collect()
}
