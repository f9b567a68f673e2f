/// Errors that can occur while handling vendor lists and consent values.
#[derive(Debug, thiserror::Error)]
pub enum VendorError {
    /// JSON serialization/deserialization error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The consent string codec rejected a value.
    #[error("consent codec error: {0}")]
    Codec(String),
}

pub type Result<T> = std::result::Result<T, VendorError>;
