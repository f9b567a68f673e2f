//! Consent synchronization between web pages, ad SDKs and an IAB CMP.
//!
//! cmpsync sits between a page, the ad SDKs it loads and an IAB-style
//! Consent Management Platform. It merges custom vendors into the vendor
//! list, hides them again from external callers, tracks which vendors a
//! browser has already seen, and holds ad calls until consent is known.
//!
//! # Crate Structure
//!
//! - [`vendor`]: vendor list merging and custom-vendor filtering
//! - [`cookie`]: known-vendor cookie codec
//! - [`schema`]: optional JSON Schema validation (behind `schema` feature)
//! - [`proxy`]: command proxy, stub and ad-SDK shims (behind `proxy` feature)

/// Re-export vendor types.
pub mod vendor {
    pub use cmpsync_vendor::*;
}

/// Re-export known-vendor cookie types.
pub mod cookie {
    pub use cmpsync_cookie::*;
}

/// Re-export schema types (requires `schema` feature).
#[cfg(feature = "schema")]
pub mod schema {
    pub use cmpsync_schema::*;
}

/// Re-export proxy types (requires `proxy` feature).
#[cfg(feature = "proxy")]
pub mod proxy {
    pub use cmpsync_proxy::*;
}
