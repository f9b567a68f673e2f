//! Optional JSON Schema validation for documents entering the proxy.
//!
//! Vendor lists, page-supplied configuration and cross-frame call
//! envelopes are all plain JSON. This crate checks them against embedded
//! JSON Schema documents before they are deserialized.

pub mod config;
pub mod error;
pub mod registry;
pub mod schemas;
pub mod validator;

pub use config::RegistryConfig;
pub use error::{Result, SchemaError};
pub use registry::{DocumentKind, SchemaRegistry};
