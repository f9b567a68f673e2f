//! The consent proxy.
//!
//! Commands issued before consent is ready are queued in arrival order and
//! answered after the underlying CMP has been attached and the page-load
//! consent sequence has finished. Query results handed to SDKs never carry
//! custom vendor ids.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use cmpsync_vendor::{
    built_in_custom_vendors, merge, restrict_to, ConsentCodec, ConsentData, ConsentFilter,
    CustomVendorList, ListenerRegistry, VendorConsents, VendorList, CUSTOM_VENDOR_START_ID,
};
use serde::de::DeserializeOwned;
use serde_json::Value;

#[cfg(feature = "schema")]
use cmpsync_schema::{DocumentKind, SchemaRegistry};

use crate::command::{forces_display, Command, ConsentQuery, SHOW_CONSENT_TOOL};
use crate::config::CmpConfig;
use crate::dispatch::{dispatch_consent, dispatch_submit};
use crate::error::{ProxyError, Result};
use crate::known::{self, KnownVendorOutcome};
use crate::legacy;
use crate::message::{extract_call, reply_callback, MessageEvent};
use crate::ready::ConsentReady;
use crate::shim::{cxense, gpt, smart, ShimTable};
use crate::state::{ConsentSnapshot, SyncState};
use crate::stub::Stub;
use crate::traits::{Callback, Cmp, CookieJar};

/// Builder for [`Proxy`].
pub struct ProxyBuilder {
    config: CmpConfig,
    codec: Rc<dyn ConsentCodec>,
    global: VendorList,
    custom: Option<CustomVendorList>,
    stub: Option<Stub>,
    jar: Option<Rc<dyn CookieJar>>,
    #[cfg(feature = "schema")]
    schemas: Option<Rc<SchemaRegistry>>,
}

impl ProxyBuilder {
    pub fn new(config: CmpConfig, codec: Rc<dyn ConsentCodec>) -> Self {
        Self {
            config,
            codec,
            global: VendorList::default(),
            custom: None,
            stub: None,
            jar: None,
            #[cfg(feature = "schema")]
            schemas: None,
        }
    }

    /// The IAB global vendor list.
    pub fn with_global_vendor_list(mut self, list: VendorList) -> Self {
        self.global = list;
        self
    }

    /// Publisher custom vendors with listeners. Takes precedence over
    /// `customVendors` from the configuration.
    pub fn with_custom_vendors(mut self, list: CustomVendorList) -> Self {
        self.custom = Some(list);
        self
    }

    /// Take over the calls queued by a stub.
    pub fn with_stub(mut self, stub: Stub) -> Self {
        self.stub = Some(stub);
        self
    }

    /// Cookie access for known-vendor tracking and legacy migration.
    pub fn with_cookie_jar(mut self, jar: Rc<dyn CookieJar>) -> Self {
        self.jar = Some(jar);
        self
    }

    /// Validate cross-frame messages before dispatch.
    #[cfg(feature = "schema")]
    pub fn with_schema_registry(mut self, registry: Rc<SchemaRegistry>) -> Self {
        self.schemas = Some(registry);
        self
    }

    pub fn build(self) -> Proxy {
        let mut global = self.global;
        if let Some(publisher) = &self.config.pub_vendor_list {
            let allowed = publisher.vendor_ids().collect();
            global = restrict_to(global, &allowed);
        }

        let built_in = self
            .config
            .use_built_in_vendor_list
            .then(built_in_custom_vendors);
        let publisher = self
            .custom
            .or_else(|| self.config.custom_vendors.clone().map(CustomVendorList::from));

        let mut listeners = ListenerRegistry::new();
        let vendor_list = merge(global, built_in, publisher, &mut listeners);

        let ready = Rc::new(ConsentReady::new());
        let shims = ShimTable::new(Rc::clone(&ready));

        let proxy = Proxy {
            inner: Rc::new(Inner {
                config: self.config,
                codec: self.codec,
                vendor_list,
                listeners,
                ready,
                shims,
                jar: self.jar,
                state: RefCell::new(SyncState::default()),
                #[cfg(feature = "schema")]
                schemas: self.schemas,
            }),
        };

        if let Some(stub) = self.stub {
            let queued = stub.into_queue();
            tracing::debug!(count = queued.len(), "taking over stub queue");
            for call in queued {
                proxy.call(&call.command, call.parameter, call.callback);
            }
        }

        let config = &proxy.inner.config;
        let shims = &proxy.inner.shims;
        if config.inject_in_smart_tags {
            smart::install(shims);
        }
        if config.defer_dfp_loading {
            gpt::install(shims);
        }
        if config.sync_cxense_consent {
            cxense::install(shims);
        }

        tracing::info!(
            vendors = proxy.inner.vendor_list.vendors.len(),
            vendor_list_version = proxy.inner.vendor_list.vendor_list_version,
            shims = shims.names().len(),
            "consent proxy ready for CMP"
        );
        proxy
    }
}

impl fmt::Debug for ProxyBuilder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProxyBuilder")
            .field("config", &self.config)
            .field("global_vendors", &self.global.vendors.len())
            .field("has_stub", &self.stub.is_some())
            .field("has_cookie_jar", &self.jar.is_some())
            .finish_non_exhaustive()
    }
}

struct Inner {
    config: CmpConfig,
    codec: Rc<dyn ConsentCodec>,
    vendor_list: VendorList,
    listeners: ListenerRegistry,
    ready: Rc<ConsentReady<ConsentSnapshot>>,
    shims: Rc<ShimTable>,
    jar: Option<Rc<dyn CookieJar>>,
    state: RefCell<SyncState>,
    #[cfg(feature = "schema")]
    schemas: Option<Rc<SchemaRegistry>>,
}

/// Handle to the consent proxy. Clones share state.
#[derive(Clone)]
pub struct Proxy {
    inner: Rc<Inner>,
}

impl Proxy {
    pub fn builder(config: CmpConfig, codec: Rc<dyn ConsentCodec>) -> ProxyBuilder {
        ProxyBuilder::new(config, codec)
    }

    /// Issue a command. Queued until consent is ready.
    pub fn call(&self, command: &str, parameter: Value, callback: Callback) {
        let command = Command::parse(command);
        if !self.inner.ready.is_ready() {
            tracing::debug!(command = %command.name(), "queued until consent is ready");
        }
        let proxy = self.downgrade();
        self.inner.ready.wait(move |_| {
            if let Some(proxy) = upgrade(&proxy) {
                proxy.dispatch(command, parameter, callback);
            }
        });
    }

    /// Handle a cross-frame message. Messages without a call are ignored.
    pub fn receive_message(&self, event: MessageEvent) {
        #[cfg(feature = "schema")]
        if let Some(registry) = &self.inner.schemas {
            if event.data.is_object() && registry.has_schema(DocumentKind::CmpCall) {
                if let Err(err) = registry.validate_value(DocumentKind::CmpCall, &event.data) {
                    tracing::debug!(origin = %event.origin, error = %err, "rejected cross-frame message");
                    return;
                }
            }
        }

        let Some(call) = extract_call(&event.data) else {
            return;
        };
        tracing::trace!(command = %call.command, origin = %event.origin, "cross-frame call");
        let callback = reply_callback(&call, &event);
        self.call(&call.command, call.parameter, callback);
    }

    /// Attach the underlying CMP and start the page-load consent sequence.
    ///
    /// The sequence reads consent data, reconciles known vendors, migrates
    /// legacy consent when nothing is recorded yet, persists if anything
    /// was selected, then re-reads consent and resolves the ready signal.
    pub fn attach(&self, cmp: Rc<dyn Cmp>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.cmp.is_some() {
                tracing::warn!("CMP already attached, ignoring");
                return;
            }
            state.cmp = Some(Rc::clone(&cmp));
        }
        tracing::debug!("CMP attached");

        let proxy = self.downgrade();
        cmp.call(
            ConsentQuery::ConsentData.command_name(),
            Value::Null,
            Box::new(move |value, success| {
                if let Some(proxy) = upgrade(&proxy) {
                    let data: ConsentData = parse_result("getConsentData", value, success);
                    proxy.on_initial_consent(data);
                }
            }),
        );
    }

    /// Signal that the user submitted consent again.
    ///
    /// Fresh vendor consents are fetched and the onSubmit listeners run.
    pub fn notify_submitted(&self) -> Result<()> {
        let cmp = self.cmp().ok_or(ProxyError::NotAttached)?;
        let proxy = self.downgrade();
        cmp.call(
            ConsentQuery::VendorConsents.command_name(),
            Value::Null,
            Box::new(move |value, success| {
                let Some(proxy) = upgrade(&proxy) else {
                    return;
                };
                let consents: VendorConsents = parse_result("getVendorConsents", value, success);
                proxy.inner.state.borrow_mut().vendor_consents = Some(consents.clone());
                let report = dispatch_submit(&proxy.inner.listeners, &consents);
                tracing::debug!(invoked = report.invoked, failed = report.failed, "submit listeners done");
            }),
        );
        Ok(())
    }

    pub fn is_ready(&self) -> bool {
        self.inner.ready.is_ready()
    }

    /// Consent resolved at the ready transition.
    pub fn consent(&self) -> Option<Rc<ConsentSnapshot>> {
        self.inner.ready.value()
    }

    /// Latest unfiltered vendor consents.
    pub fn vendor_consents(&self) -> Option<VendorConsents> {
        self.inner.state.borrow().vendor_consents.clone()
    }

    /// The merged vendor list the CMP should be initialized with.
    pub fn vendor_list(&self) -> &VendorList {
        &self.inner.vendor_list
    }

    pub fn config(&self) -> &CmpConfig {
        &self.inner.config
    }

    pub fn listeners(&self) -> &ListenerRegistry {
        &self.inner.listeners
    }

    pub fn shims(&self) -> Rc<ShimTable> {
        Rc::clone(&self.inner.shims)
    }

    /// Result of known-vendor reconciliation, once it ran.
    pub fn known_vendors(&self) -> Option<KnownVendorOutcome> {
        self.inner.state.borrow().known_vendors.clone()
    }

    /// Purposes selected from legacy consent cookies.
    pub fn migrated_purposes(&self) -> Vec<u32> {
        self.inner.state.borrow().migrated_purposes.clone()
    }

    /// Number of calls waiting for consent, shim calls included.
    pub fn pending_len(&self) -> usize {
        self.inner.ready.pending_len()
    }

    fn downgrade(&self) -> Weak<Inner> {
        Rc::downgrade(&self.inner)
    }

    fn cmp(&self) -> Option<Rc<dyn Cmp>> {
        self.inner.state.borrow().cmp.clone()
    }

    fn on_initial_consent(&self, data: ConsentData) {
        let Some(cmp) = self.cmp() else {
            return;
        };

        let mut selected = false;
        if let Some(jar) = &self.inner.jar {
            let config = &self.inner.config;
            let outcome = known::reconcile(
                jar.as_ref(),
                &config.known_vendors_cookie,
                &self.inner.vendor_list,
                config.legitimate_interest,
                cmp.as_ref(),
            );
            selected |= !outcome.selected.is_empty();

            let mut migrated = Vec::new();
            if data.consent_data.is_empty() && !config.ensighten_mapping.is_empty() {
                migrated = legacy::migrate(jar.as_ref(), &config.ensighten_mapping, cmp.as_ref());
                if !migrated.is_empty() {
                    tracing::info!(purposes = ?migrated, "migrated legacy consent");
                }
            }
            selected |= !migrated.is_empty();

            let mut state = self.inner.state.borrow_mut();
            state.known_vendors = Some(outcome);
            state.migrated_purposes = migrated;
        }

        if !selected {
            self.fetch_vendor_consents(cmp, data);
            return;
        }

        cmp.persist();
        let proxy = self.downgrade();
        let next = Rc::clone(&cmp);
        cmp.call(
            ConsentQuery::ConsentData.command_name(),
            Value::Null,
            Box::new(move |value, success| {
                if let Some(proxy) = upgrade(&proxy) {
                    let data: ConsentData = parse_result("getConsentData", value, success);
                    proxy.fetch_vendor_consents(next, data);
                }
            }),
        );
    }

    fn fetch_vendor_consents(&self, cmp: Rc<dyn Cmp>, data: ConsentData) {
        let proxy = self.downgrade();
        cmp.call(
            ConsentQuery::VendorConsents.command_name(),
            Value::Null,
            Box::new(move |value, success| {
                if let Some(proxy) = upgrade(&proxy) {
                    let consents: VendorConsents = parse_result("getVendorConsents", value, success);
                    proxy.complete(data, consents);
                }
            }),
        );
    }

    fn complete(&self, consent_data: ConsentData, vendor_consents: VendorConsents) {
        let filter = ConsentFilter::new(self.inner.codec.as_ref(), CUSTOM_VENDOR_START_ID);
        let consent_string = filter
            .consent_string(&consent_data.consent_data)
            .unwrap_or_else(|err| {
                tracing::warn!(error = %err, "failed to filter consent string, injecting none");
                String::new()
            });

        self.inner.state.borrow_mut().vendor_consents = Some(vendor_consents.clone());
        let pending = self.inner.ready.pending_len();
        let snapshot = ConsentSnapshot {
            consent_data,
            vendor_consents: vendor_consents.clone(),
            consent_string,
        };
        if !self.inner.ready.resolve(snapshot) {
            return;
        }
        tracing::info!(drained = pending, "consent ready");

        let report = dispatch_consent(&self.inner.listeners, &vendor_consents);
        tracing::debug!(invoked = report.invoked, failed = report.failed, "consent listeners done");
    }

    fn dispatch(&self, command: Command, parameter: Value, callback: Callback) {
        let Some(cmp) = self.cmp() else {
            tracing::warn!(command = %command.name(), "no CMP attached");
            callback(Value::Null, false);
            return;
        };

        match command {
            Command::Filtered(query) => {
                let codec = Rc::clone(&self.inner.codec);
                cmp.call(
                    query.command_name(),
                    parameter,
                    Box::new(move |value, success| {
                        if !success {
                            tracing::warn!(command = query.command_name(), "CMP reported failure");
                            callback(Value::Null, false);
                            return;
                        }
                        match filter_result(codec.as_ref(), query, value) {
                            Ok(filtered) => callback(filtered, true),
                            Err(err) => {
                                tracing::warn!(command = query.command_name(), error = %err, "failed to filter CMP result");
                                callback(Value::Null, false);
                            }
                        }
                    }),
                );
            }
            Command::Raw(query) => cmp.call(query.command_name(), parameter, callback),
            Command::ShowConsentTool => {
                if self.inner.config.hide_ui && !forces_display(&parameter) {
                    tracing::debug!("consent UI hidden by configuration");
                    callback(Value::Null, true);
                    return;
                }
                cmp.call(SHOW_CONSENT_TOOL, parameter, callback);
            }
            Command::Passthrough(name) => cmp.call(&name, parameter, callback),
        }
    }
}

impl fmt::Debug for Proxy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Proxy")
            .field("ready", &self.is_ready())
            .field("vendors", &self.inner.vendor_list.vendors.len())
            .field("pending", &self.pending_len())
            .finish_non_exhaustive()
    }
}

fn upgrade(inner: &Weak<Inner>) -> Option<Proxy> {
    inner.upgrade().map(|inner| Proxy { inner })
}

/// Deserialize a CMP result, falling back to the default on failure.
fn parse_result<T: DeserializeOwned + Default>(command: &str, value: Value, success: bool) -> T {
    if !success {
        tracing::warn!(command, "CMP reported failure");
        return T::default();
    }
    serde_json::from_value(value).unwrap_or_else(|err| {
        tracing::warn!(command, error = %err, "unexpected CMP result shape");
        T::default()
    })
}

fn filter_result(
    codec: &dyn ConsentCodec,
    query: ConsentQuery,
    value: Value,
) -> cmpsync_vendor::Result<Value> {
    let filter = ConsentFilter::new(codec, CUSTOM_VENDOR_START_ID);
    let filtered = match query {
        ConsentQuery::VendorList => {
            serde_json::to_value(filter.vendor_list(serde_json::from_value(value)?))?
        }
        ConsentQuery::ConsentData => {
            serde_json::to_value(filter.consent_data(serde_json::from_value(value)?)?)?
        }
        ConsentQuery::VendorConsents => {
            serde_json::to_value(filter.vendor_consents(serde_json::from_value(value)?)?)?
        }
    };
    Ok(filtered)
}
