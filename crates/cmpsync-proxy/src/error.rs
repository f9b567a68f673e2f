/// Errors that can occur in proxy operations.
#[derive(Debug, thiserror::Error)]
pub enum ProxyError {
    /// Vendor list or consent filtering error.
    #[error("vendor error: {0}")]
    Vendor(#[from] cmpsync_vendor::VendorError),

    /// Known-vendor cookie error.
    #[error("known-vendor cookie error: {0}")]
    Cookie(#[from] cmpsync_cookie::CookieError),

    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Schema validation error.
    #[cfg(feature = "schema")]
    #[error("schema validation error: {0}")]
    Schema(#[from] cmpsync_schema::SchemaError),

    /// The configuration is structurally valid but unusable.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// No underlying CMP has been attached yet.
    #[error("no CMP attached")]
    NotAttached,

    /// No shim is installed under the given name.
    #[error("no shim installed for {0}")]
    UnknownShim(String),
}

pub type Result<T> = std::result::Result<T, ProxyError>;
