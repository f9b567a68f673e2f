//! Consent proxy between web pages, ad SDKs and an IAB CMP.
//!
//! The proxy fronts the underlying Consent Management Platform. It queues
//! commands until consent is ready, answers direct and cross-frame calls,
//! hides custom vendors from external callers, and passes consent into ad
//! SDK calls through interception shims.

pub mod command;
pub mod config;
pub mod dispatch;
pub mod error;
pub mod known;
pub mod legacy;
pub mod message;
pub mod proxy;
pub mod ready;
pub mod shim;
pub mod state;
pub mod stub;
pub mod traits;

pub use command::{forces_display, Command, ConsentQuery, SHOW_CONSENT_TOOL};
pub use config::{CmpConfig, LegacyCategory, LegitimateInterest};
pub use dispatch::{dispatch_consent, dispatch_submit, DispatchReport};
pub use error::{ProxyError, Result};
pub use known::{load_record, reconcile, KnownVendorOutcome};
pub use legacy::{migrate, LEGACY_COOKIE_PREFIX};
pub use message::{extract_call, reply_callback, CmpCall, CmpReturn, MessageEvent, CALL_KEY, RETURN_KEY};
pub use proxy::{Proxy, ProxyBuilder};
pub use ready::ConsentReady;
pub use shim::{Injection, Injector, SdkFn, ShimHandle, ShimTable};
pub use state::ConsentSnapshot;
pub use stub::{QueuedCall, Stub};
pub use traits::{Callback, Cmp, CookieJar, CookieOptions, MessageSource};
