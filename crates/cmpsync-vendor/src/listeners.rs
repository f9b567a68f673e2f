use std::collections::BTreeMap;
use std::fmt;

/// Outcome of a consent listener. An `Err` is logged and isolated.
pub type ListenerResult = std::result::Result<(), Box<dyn std::error::Error>>;

/// Per-vendor callback receiving that vendor's consent value.
pub type ConsentListener = Box<dyn Fn(bool) -> ListenerResult>;

/// Vendor-keyed consent and submit callbacks.
///
/// Populated once while merging vendor lists; the first registration for a
/// vendor id wins and later ones are ignored.
#[derive(Default)]
pub struct ListenerRegistry {
    on_consent: BTreeMap<u32, ConsentListener>,
    on_submit: Vec<(u32, ConsentListener)>,
}

impl ListenerRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an onConsent callback. Returns false if the id already had one.
    pub fn register_on_consent(&mut self, vendor_id: u32, listener: ConsentListener) -> bool {
        if self.on_consent.contains_key(&vendor_id) {
            tracing::debug!(vendor_id, "duplicate onConsent listener ignored");
            return false;
        }
        self.on_consent.insert(vendor_id, listener);
        true
    }

    /// Register an onSubmit callback. Returns false if the id already had one.
    pub fn register_on_submit(&mut self, vendor_id: u32, listener: ConsentListener) -> bool {
        if self.on_submit.iter().any(|(id, _)| *id == vendor_id) {
            tracing::debug!(vendor_id, "duplicate onSubmit listener ignored");
            return false;
        }
        self.on_submit.push((vendor_id, listener));
        true
    }

    /// onConsent listeners in ascending vendor id order.
    pub fn on_consent(&self) -> impl Iterator<Item = (u32, &ConsentListener)> + '_ {
        self.on_consent.iter().map(|(id, listener)| (*id, listener))
    }

    /// onSubmit listeners in registration order.
    pub fn on_submit(&self) -> impl Iterator<Item = (u32, &ConsentListener)> + '_ {
        self.on_submit.iter().map(|(id, listener)| (*id, listener))
    }

    pub fn is_empty(&self) -> bool {
        self.on_consent.is_empty() && self.on_submit.is_empty()
    }
}

impl fmt::Debug for ListenerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListenerRegistry")
            .field("on_consent", &self.on_consent.keys().collect::<Vec<_>>())
            .field(
                "on_submit",
                &self.on_submit.iter().map(|(id, _)| id).collect::<Vec<_>>(),
            )
            .finish()
    }
}
