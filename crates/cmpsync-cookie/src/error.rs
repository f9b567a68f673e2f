/// Errors that can occur while encoding or decoding the known-vendor cookie.
#[derive(Debug, thiserror::Error)]
pub enum CookieError {
    /// The container value is not the expected JSON shape.
    #[error("malformed known-vendor container: {0}")]
    Malformed(#[from] serde_json::Error),

    /// A packed character lies outside the 6-bit alphabet.
    #[error("invalid packed character {character:?} at position {position}")]
    InvalidCharacter { position: usize, character: char },

    /// A registry id cannot be represented in the packed string.
    #[error("vendor id {id} out of range for packed encoding (max {max})")]
    IdOutOfRange { id: u32, max: u32 },

    /// A custom entry lies below the custom-vendor threshold.
    #[error("custom vendor id {id} below threshold {min}")]
    CustomIdOutOfRange { id: u32, min: u32 },
}

pub type Result<T> = std::result::Result<T, CookieError>;
