//! Consent event dispatch to per-vendor listeners.
//!
//! Each listener runs in isolation: an error or a panic is logged and the
//! remaining listeners still run.

use std::panic::{catch_unwind, AssertUnwindSafe};

use cmpsync_vendor::{ConsentListener, ListenerRegistry, VendorConsents};

/// Counts from one dispatch round.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchReport {
    pub invoked: usize,
    pub failed: usize,
}

/// Run every onConsent listener with its vendor's consent value.
pub fn dispatch_consent(registry: &ListenerRegistry, consents: &VendorConsents) -> DispatchReport {
    run_isolated("onConsent", registry.on_consent(), consents)
}

/// Run every onSubmit listener after a consent re-submission.
pub fn dispatch_submit(registry: &ListenerRegistry, consents: &VendorConsents) -> DispatchReport {
    run_isolated("onSubmit", registry.on_submit(), consents)
}

fn run_isolated<'a>(
    event: &'static str,
    listeners: impl Iterator<Item = (u32, &'a ConsentListener)>,
    consents: &VendorConsents,
) -> DispatchReport {
    let mut report = DispatchReport::default();
    for (vendor_id, listener) in listeners {
        report.invoked += 1;
        let consent = consents.consent_for(vendor_id);
        match catch_unwind(AssertUnwindSafe(|| listener(consent))) {
            Ok(Ok(())) => {}
            Ok(Err(err)) => {
                report.failed += 1;
                tracing::error!(vendor_id, event, error = %err, "consent listener failed");
            }
            Err(_) => {
                report.failed += 1;
                tracing::error!(vendor_id, event, "consent listener panicked");
            }
        }
    }
    report
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::collections::BTreeMap;
    use std::rc::Rc;

    use cmpsync_vendor::ListenerResult;

    use super::*;

    #[test]
    fn failing_listener_does_not_stop_others() {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let mut registry = ListenerRegistry::new();
        registry.register_on_consent(5000, Box::new(|_| Err("boom".into())));
        let sink = Rc::clone(&seen);
        registry.register_on_consent(
            5001,
            Box::new(move |consent| {
                sink.borrow_mut().push((5001, consent));
                Ok(())
            }),
        );

        let consents = VendorConsents {
            vendor_consents: BTreeMap::from([(5000, true), (5001, true)]),
            ..VendorConsents::default()
        };
        let report = dispatch_consent(&registry, &consents);

        assert_eq!(report, DispatchReport { invoked: 2, failed: 1 });
        assert_eq!(*seen.borrow(), vec![(5001, true)]);
    }

    #[test]
    fn panicking_listener_does_not_stop_others() {
        let ran = Rc::new(RefCell::new(false));
        let mut registry = ListenerRegistry::new();
        registry.register_on_consent(5000, Box::new(|_| -> ListenerResult { panic!("listener bug") }));
        let flag = Rc::clone(&ran);
        registry.register_on_consent(
            5001,
            Box::new(move |_| {
                *flag.borrow_mut() = true;
                Ok(())
            }),
        );

        let report = dispatch_consent(&registry, &VendorConsents::default());

        assert_eq!(report, DispatchReport { invoked: 2, failed: 1 });
        assert!(*ran.borrow());
    }

    #[test]
    fn absent_vendor_is_not_consented() {
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        let mut registry = ListenerRegistry::new();
        registry.register_on_submit(
            42,
            Box::new(move |consent| {
                *sink.borrow_mut() = Some(consent);
                Ok(())
            }),
        );

        dispatch_submit(&registry, &VendorConsents::default());
        assert_eq!(*seen.borrow(), Some(false));
    }
}
