//! Compact known-vendor cookie codec.
//!
//! Records which vendor ids a browser has already been shown, so vendors
//! added to the list later can be detected and handled under a default
//! policy. Registry ids are bit-packed six per character; custom ids are
//! stored verbatim:
//!
//! ```text
//! {"global":"32","custom":[5000]}
//!            ││
//!            │└ block 1: '0' + 0b000010 -> id 7
//!            └─ block 0: '0' + 0b000011 -> ids 0, 1
//! ```

pub mod codec;
pub mod error;
pub mod record;

pub use codec::{
    decode, decode_global, encode, encode_global, BASE_CODE_POINT, BLOCK_BITS,
};
pub use error::{CookieError, Result};
pub use record::{KnownVendorsRecord, COOKIE_MAX_AGE_DAYS, COOKIE_NAME};
