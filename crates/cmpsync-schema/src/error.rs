/// Errors that can occur during schema validation.
#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    /// The schema could not be compiled.
    #[error("failed to compile schema: {0}")]
    CompileFailed(String),

    /// The document failed schema validation.
    #[error("validation failed for {kind}: {message}")]
    ValidationFailed { kind: &'static str, message: String },

    /// The document is not valid JSON.
    #[error("document is not valid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    /// The document exceeds the configured size limit.
    #[error("document too large ({size} bytes, max {max})")]
    TooLarge { size: usize, max: usize },

    /// No schema registered for the given document kind.
    #[error("no schema registered for {0}")]
    NoSchema(&'static str),
}

pub type Result<T> = std::result::Result<T, SchemaError>;
