//! Cxense consent sync.
//!
//! Installing the shim queues one `cX.setConsent` call. Once consent is
//! ready it is issued with the user's purpose consents mapped onto Cxense's
//! categories. Calls made by the page itself pass through unchanged.

use serde_json::{json, Value};

use super::{Injection, SdkFn, ShimTable};
use crate::state::ConsentSnapshot;

pub const CX_SET_CONSENT: &str = "cX.setConsent";

/// Purpose ids feeding each Cxense category.
pub const PAGE_VIEW_PURPOSE: u32 = 5;
pub const SEGMENT_PURPOSE: u32 = 2;
pub const AD_PURPOSE: u32 = 3;
pub const RECOMMENDATION_PURPOSE: u32 = 4;

/// The `setConsent` argument for `consent`.
pub fn consent_flags(consent: &ConsentSnapshot) -> Value {
    json!({
        "pv": consent.purpose_allowed(PAGE_VIEW_PURPOSE),
        "segment": consent.purpose_allowed(SEGMENT_PURPOSE),
        "ad": consent.purpose_allowed(AD_PURPOSE),
        "recs": consent.purpose_allowed(RECOMMENDATION_PURPOSE),
    })
}

pub fn install(table: &ShimTable) {
    table.install(
        CX_SET_CONSENT,
        |real: &SdkFn, mut args: Vec<Value>, injection: &Injection<'_>| {
            if args.is_empty() {
                args.push(consent_flags(injection.consent));
            }
            real(args)
        },
    );
    if let Err(err) = table.invoke(CX_SET_CONSENT, Vec::new()) {
        tracing::warn!(error = %err, "failed to queue cxense consent sync");
    }
}
