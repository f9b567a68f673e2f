//! Google Publisher Tag gate.
//!
//! With deferred DFP loading, ad refreshes are held until consent is ready
//! and then released unchanged, in call order.

use serde_json::Value;

use super::{Injection, SdkFn, ShimTable};

pub const GPT_REFRESH: &str = "googletag.pubads.refresh";

pub fn install(table: &ShimTable) {
    table.install(
        GPT_REFRESH,
        |real: &SdkFn, args: Vec<Value>, injection: &Injection<'_>| {
            if injection.deferred {
                tracing::trace!("releasing held ad refresh");
            }
            real(args)
        },
    );
}
