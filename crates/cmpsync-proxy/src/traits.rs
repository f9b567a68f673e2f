//! Seams to the collaborators the proxy consumes but does not implement.

use std::time::Duration;

use serde_json::Value;

use cmpsync_cookie::COOKIE_MAX_AGE_DAYS;

/// Continuation receiving a command result and a success flag.
pub type Callback = Box<dyn FnOnce(Value, bool)>;

/// The underlying Consent Management Platform.
///
/// Implementations may invoke `callback` synchronously or later; the proxy
/// holds no borrow across the call.
pub trait Cmp {
    /// Issue a CMP command.
    fn call(&self, command: &str, parameter: Value, callback: Callback);

    /// Set a vendor's consent in the CMP store.
    fn select_vendor(&self, vendor_id: u32, selected: bool);

    /// Set a purpose's consent in the CMP store.
    fn select_purpose(&self, purpose_id: u32, selected: bool);

    /// Write the CMP store to the consent cookie.
    fn persist(&self);
}

/// Attributes of a written cookie.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieOptions {
    pub path: String,
    pub max_age: Duration,
}

impl CookieOptions {
    /// Options used for the known-vendor cookie: root path, 390 days.
    pub fn known_vendors() -> Self {
        Self {
            path: "/".to_string(),
            max_age: Duration::from_secs(u64::from(COOKIE_MAX_AGE_DAYS) * 24 * 60 * 60),
        }
    }
}

/// Browser cookie access.
pub trait CookieJar {
    fn get(&self, name: &str) -> Option<String>;
    fn set(&self, name: &str, value: &str, options: &CookieOptions);
}

/// Sender of a cross-frame message, able to receive a reply.
pub trait MessageSource {
    fn post_message(&self, message: Value, target_origin: &str);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_vendor_cookie_lives_390_days_at_root() {
        let options = CookieOptions::known_vendors();
        assert_eq!(options.path, "/");
        assert_eq!(options.max_age.as_secs(), 390 * 86_400);
    }
}
