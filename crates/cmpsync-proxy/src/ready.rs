//! Single-shot "consent is ready" signal.
//!
//! Anything needing consent registers a continuation and returns. The
//! continuations run synchronously, in registration order, exactly once,
//! when the signal resolves. Continuations registered while the queue is
//! draining are appended and run in the same drain.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::fmt;
use std::rc::Rc;

type Waiter<T> = Box<dyn FnOnce(&T)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Pending,
    Draining,
    Ready,
}

struct Inner<T> {
    phase: Phase,
    value: Option<Rc<T>>,
    waiters: VecDeque<Waiter<T>>,
}

/// One-way not-ready to ready transition carrying a value.
pub struct ConsentReady<T> {
    inner: RefCell<Inner<T>>,
}

impl<T> ConsentReady<T> {
    pub fn new() -> Self {
        Self {
            inner: RefCell::new(Inner {
                phase: Phase::Pending,
                value: None,
                waiters: VecDeque::new(),
            }),
        }
    }

    /// Run `waiter` now if ready, otherwise queue it.
    ///
    /// Returns true if the call was deferred.
    pub fn wait(&self, waiter: impl FnOnce(&T) + 'static) -> bool {
        let value = {
            let mut inner = self.inner.borrow_mut();
            match (inner.phase, inner.value.clone()) {
                (Phase::Ready, Some(value)) => value,
                _ => {
                    inner.waiters.push_back(Box::new(waiter));
                    tracing::trace!(queued = inner.waiters.len(), "deferred until consent");
                    return true;
                }
            }
        };
        waiter(&value);
        false
    }

    /// Resolve with `value` and drain every queued continuation.
    ///
    /// Only the first call has any effect; it returns true.
    pub fn resolve(&self, value: T) -> bool {
        let value = {
            let mut inner = self.inner.borrow_mut();
            if inner.phase != Phase::Pending {
                tracing::debug!("consent already resolved, ignoring");
                return false;
            }
            let value = Rc::new(value);
            inner.phase = Phase::Draining;
            inner.value = Some(Rc::clone(&value));
            value
        };

        let mut drained = 0usize;
        loop {
            let next = {
                let mut inner = self.inner.borrow_mut();
                match inner.waiters.pop_front() {
                    Some(waiter) => waiter,
                    None => {
                        inner.phase = Phase::Ready;
                        break;
                    }
                }
            };
            next(&value);
            drained += 1;
        }

        tracing::debug!(drained, "consent ready");
        true
    }

    /// Returns true once every queued continuation has run.
    pub fn is_ready(&self) -> bool {
        self.inner.borrow().phase == Phase::Ready
    }

    /// The resolved value, available from the start of the drain.
    pub fn value(&self) -> Option<Rc<T>> {
        self.inner.borrow().value.clone()
    }

    /// Number of continuations still queued.
    pub fn pending_len(&self) -> usize {
        self.inner.borrow().waiters.len()
    }
}

impl<T> Default for ConsentReady<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for ConsentReady<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.inner.borrow();
        f.debug_struct("ConsentReady")
            .field("phase", &inner.phase)
            .field("waiters", &inner.waiters.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;

    #[test]
    fn waiters_run_in_registration_order() {
        let ready = ConsentReady::<u32>::new();
        let log = Rc::new(RefCell::new(Vec::new()));

        for name in ["A", "B", "C"] {
            let log = Rc::clone(&log);
            assert!(ready.wait(move |value| log.borrow_mut().push(format!("{name}{value}"))));
        }
        assert!(log.borrow().is_empty());

        assert!(ready.resolve(1));
        assert_eq!(*log.borrow(), vec!["A1", "B1", "C1"]);
        assert!(ready.is_ready());
    }

    #[test]
    fn resolves_only_once() {
        let ready = ConsentReady::new();
        assert!(ready.resolve("first"));
        assert!(!ready.resolve("second"));
        assert_eq!(ready.value().as_deref(), Some(&"first"));
    }

    #[test]
    fn wait_after_ready_runs_immediately() {
        let ready = ConsentReady::new();
        ready.resolve(5);
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);
        assert!(!ready.wait(move |value| *sink.borrow_mut() = Some(*value)));
        assert_eq!(*seen.borrow(), Some(5));
    }

    #[test]
    fn waits_registered_during_drain_run_after_queue() {
        let ready = Rc::new(ConsentReady::<u32>::new());
        let log = Rc::new(RefCell::new(Vec::new()));

        let inner_ready = Rc::clone(&ready);
        let first_log = Rc::clone(&log);
        ready.wait(move |_| {
            first_log.borrow_mut().push("A");
            let nested_log = Rc::clone(&first_log);
            let deferred = inner_ready.wait(move |_| nested_log.borrow_mut().push("nested"));
            assert!(deferred);
        });
        let second_log = Rc::clone(&log);
        ready.wait(move |_| second_log.borrow_mut().push("B"));

        ready.resolve(0);
        assert_eq!(*log.borrow(), vec!["A", "B", "nested"]);
        assert_eq!(ready.pending_len(), 0);
    }
}
