//! Ad-SDK injection shims.
//!
//! Third-party ad SDKs load at unpredictable times and assign their entry
//! points late. Callers go through a [`ShimTable`]: every entry point has a
//! stable wrapper, and the SDK's own function is handed over with
//! [`ShimTable::register_real`]. A wrapper call waits for consent, then
//! runs the entry's injector with the real function and the original
//! arguments.

pub mod cxense;
pub mod gpt;
pub mod smart;

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::fmt;
use std::rc::{Rc, Weak};

use serde_json::{Map, Value};

use crate::error::{ProxyError, Result};
use crate::ready::ConsentReady;
use crate::state::ConsentSnapshot;

/// An SDK entry point.
pub type SdkFn = Rc<dyn Fn(Vec<Value>)>;

/// Rewrites arguments and calls the real entry point.
pub type Injector = Rc<dyn Fn(&SdkFn, Vec<Value>, &Injection<'_>)>;

/// Context handed to an injector.
pub struct Injection<'a> {
    pub consent: &'a ConsentSnapshot,
    /// The call was issued before consent was ready.
    pub deferred: bool,
}

struct ParkedCall {
    args: Vec<Value>,
    deferred: bool,
}

#[derive(Default)]
struct Entry {
    injector: Option<Injector>,
    real: Option<SdkFn>,
    parked: Vec<ParkedCall>,
}

/// Name-keyed indirection table of SDK wrappers.
pub struct ShimTable {
    ready: Rc<ConsentReady<ConsentSnapshot>>,
    entries: RefCell<BTreeMap<String, Entry>>,
    this: Weak<ShimTable>,
}

impl ShimTable {
    pub fn new(ready: Rc<ConsentReady<ConsentSnapshot>>) -> Rc<Self> {
        Rc::new_cyclic(|this| Self {
            ready,
            entries: RefCell::new(BTreeMap::new()),
            this: this.clone(),
        })
    }

    /// Install a wrapper for `name`.
    ///
    /// If the SDK already registered its function, interception started
    /// too late to cover earlier calls; this is logged as an error.
    pub fn install(
        &self,
        name: &str,
        injector: impl Fn(&SdkFn, Vec<Value>, &Injection<'_>) + 'static,
    ) {
        let mut entries = self.entries.borrow_mut();
        let entry = entries.entry(name.to_string()).or_default();
        if entry.real.is_some() && entry.injector.is_none() {
            tracing::error!(shim = name, "ad SDK loaded before consent proxy, calls may bypass consent");
        }
        entry.injector = Some(Rc::new(injector));
    }

    /// Hand over the SDK's own implementation. The wrapper stays in place.
    pub fn register_real(&self, name: &str, real: impl Fn(Vec<Value>) + 'static) {
        let parked = {
            let mut entries = self.entries.borrow_mut();
            let entry = entries.entry(name.to_string()).or_default();
            if entry.real.is_some() {
                tracing::debug!(shim = name, "real implementation replaced");
            }
            entry.real = Some(Rc::new(real));
            std::mem::take(&mut entry.parked)
        };

        if parked.is_empty() {
            return;
        }
        let Some(consent) = self.ready.value() else {
            return;
        };
        tracing::debug!(shim = name, count = parked.len(), "releasing parked calls");
        for call in parked {
            self.fire(name, call.args, &consent, call.deferred);
        }
    }

    /// Call through the wrapper for `name`.
    pub fn invoke(&self, name: &str, args: Vec<Value>) -> Result<()> {
        let installed = self
            .entries
            .borrow()
            .get(name)
            .is_some_and(|entry| entry.injector.is_some());
        if !installed {
            return Err(ProxyError::UnknownShim(name.to_string()));
        }

        let deferred = !self.ready.is_ready();
        let table = self.this.clone();
        let shim = name.to_string();
        self.ready.wait(move |consent| {
            if let Some(table) = table.upgrade() {
                table.fire(&shim, args, consent, deferred);
            }
        });
        Ok(())
    }

    /// Stable handle calling through the wrapper for `name`.
    pub fn handle(&self, name: &str) -> Option<ShimHandle> {
        let table = self.this.upgrade()?;
        self.is_installed(name).then(|| ShimHandle {
            table,
            name: name.to_string(),
        })
    }

    pub fn is_installed(&self, name: &str) -> bool {
        self.entries
            .borrow()
            .get(name)
            .is_some_and(|entry| entry.injector.is_some())
    }

    /// Names of installed wrappers.
    pub fn names(&self) -> Vec<String> {
        self.entries
            .borrow()
            .iter()
            .filter(|(_, entry)| entry.injector.is_some())
            .map(|(name, _)| name.clone())
            .collect()
    }

    fn fire(&self, name: &str, args: Vec<Value>, consent: &ConsentSnapshot, deferred: bool) {
        let (injector, real) = {
            let mut entries = self.entries.borrow_mut();
            let Some(entry) = entries.get_mut(name) else {
                return;
            };
            match (&entry.injector, &entry.real) {
                (Some(injector), Some(real)) => (Rc::clone(injector), Rc::clone(real)),
                _ => {
                    tracing::debug!(shim = name, "SDK not loaded yet, parking call");
                    entry.parked.push(ParkedCall { args, deferred });
                    return;
                }
            }
        };
        injector(&real, args, &Injection { consent, deferred });
    }
}

impl fmt::Debug for ShimTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimTable")
            .field("installed", &self.names())
            .finish()
    }
}

/// A wrapper reference that survives the SDK replacing its functions.
#[derive(Clone)]
pub struct ShimHandle {
    table: Rc<ShimTable>,
    name: String,
}

impl ShimHandle {
    pub fn call(&self, args: Vec<Value>) -> Result<()> {
        self.table.invoke(&self.name, args)
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl fmt::Debug for ShimHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShimHandle").field("name", &self.name).finish()
    }
}

/// Shallow-merge `fields` into `value`, which becomes an object if it was not.
pub(crate) fn with_fields(value: Value, fields: impl IntoIterator<Item = (&'static str, Value)>) -> Value {
    let mut map = match value {
        Value::Object(map) => map,
        _ => Map::new(),
    };
    for (key, field) in fields {
        map.insert(key.to_string(), field);
    }
    Value::Object(map)
}

#[cfg(test)]
pub(crate) mod tests {
    use std::cell::RefCell;

    use serde_json::json;

    use super::*;

    pub(crate) fn snapshot(consent_string: &str) -> ConsentSnapshot {
        ConsentSnapshot {
            consent_string: consent_string.to_string(),
            ..ConsentSnapshot::default()
        }
    }

    pub(crate) fn recorder() -> (Rc<RefCell<Vec<Vec<Value>>>>, impl Fn(Vec<Value>) + 'static) {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&calls);
        (calls, move |args| sink.borrow_mut().push(args))
    }

    fn passthrough(real: &SdkFn, args: Vec<Value>, _: &Injection<'_>) {
        real(args)
    }

    #[test]
    fn calls_wait_for_consent() {
        let ready = Rc::new(ConsentReady::new());
        let table = ShimTable::new(Rc::clone(&ready));
        table.install("sdk.run", passthrough);
        let (calls, real) = recorder();
        table.register_real("sdk.run", real);

        table.invoke("sdk.run", vec![json!(1)]).unwrap();
        assert!(calls.borrow().is_empty());

        ready.resolve(snapshot("c"));
        assert_eq!(*calls.borrow(), vec![vec![json!(1)]]);
    }

    #[test]
    fn late_real_implementation_receives_parked_calls() {
        let ready = Rc::new(ConsentReady::new());
        let table = ShimTable::new(Rc::clone(&ready));
        table.install("sdk.run", passthrough);

        table.invoke("sdk.run", vec![json!("a")]).unwrap();
        table.invoke("sdk.run", vec![json!("b")]).unwrap();
        ready.resolve(snapshot("c"));

        let (calls, real) = recorder();
        table.register_real("sdk.run", real);
        assert_eq!(*calls.borrow(), vec![vec![json!("a")], vec![json!("b")]]);
    }

    #[test]
    fn reassignment_keeps_wrapper() {
        let ready = Rc::new(ConsentReady::new());
        ready.resolve(snapshot("c"));
        let table = ShimTable::new(Rc::clone(&ready));
        table.install(
            "sdk.run",
            |real: &SdkFn, mut args: Vec<Value>, injection: &Injection<'_>| {
                args.push(json!(injection.consent.consent_string));
                real(args)
            },
        );
        let handle = table.handle("sdk.run").unwrap();

        let (first, real) = recorder();
        table.register_real("sdk.run", real);
        let (second, real) = recorder();
        table.register_real("sdk.run", real);

        handle.call(vec![]).unwrap();
        assert!(first.borrow().is_empty());
        assert_eq!(*second.borrow(), vec![vec![json!("c")]]);
    }

    #[test]
    fn deferred_flag_distinguishes_queued_calls() {
        let ready = Rc::new(ConsentReady::new());
        let table = ShimTable::new(Rc::clone(&ready));
        let flags = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&flags);
        table.install("sdk.run", move |_: &SdkFn, _: Vec<Value>, injection: &Injection<'_>| {
            sink.borrow_mut().push(injection.deferred)
        });
        table.register_real("sdk.run", |_| {});

        table.invoke("sdk.run", vec![]).unwrap();
        ready.resolve(snapshot(""));
        table.invoke("sdk.run", vec![]).unwrap();

        assert_eq!(*flags.borrow(), vec![true, false]);
    }

    #[test]
    fn unknown_shim_is_an_error() {
        let table = ShimTable::new(Rc::new(ConsentReady::new()));
        assert!(matches!(
            table.invoke("nope", vec![]),
            Err(ProxyError::UnknownShim(_))
        ));
        table.register_real("sdk.only_real", |_| {});
        assert!(table.handle("sdk.only_real").is_none());
        assert!(table.names().is_empty());
    }

    #[test]
    fn with_fields_merges_into_objects() {
        assert_eq!(
            with_fields(json!({"a": 1}), [("b", json!(2))]),
            json!({"a": 1, "b": 2})
        );
        assert_eq!(with_fields(Value::Null, [("b", json!(2))]), json!({"b": 2}));
    }
}
