//! Smart AdServer tag shims.
//!
//! `sas.call(type, options, ...)` gets the filtered consent string merged
//! into `options`. The first `sas.setup(options)` issued before consent was
//! ready is switched to asynchronous loading, since its synchronous page
//! write would run after the document is closed.

use std::cell::Cell;

use serde_json::Value;

use super::{with_fields, Injection, SdkFn, ShimTable};

pub const SAS_CALL: &str = "sas.call";
pub const SAS_SETUP: &str = "sas.setup";
pub const SAS_RENDER: &str = "sas.render";

/// Field carrying the consent string in call options.
pub const CONSENT_FIELD: &str = "gdpr_consent";

pub fn install(table: &ShimTable) {
    table.install(SAS_CALL, inject_consent);

    let first_setup = Cell::new(true);
    table.install(
        SAS_SETUP,
        move |real: &SdkFn, mut args: Vec<Value>, injection: &Injection<'_>| {
            if first_setup.replace(false) && injection.deferred {
                if args.is_empty() {
                    args.push(Value::Null);
                }
                let options = args[0].take();
                args[0] = with_fields(options, [("async", Value::Bool(true))]);
                tracing::debug!("setup deferred past load, forcing async");
            }
            real(args)
        },
    );

    table.install(SAS_RENDER, |real: &SdkFn, args: Vec<Value>, _: &Injection<'_>| real(args));
}

fn inject_consent(real: &SdkFn, mut args: Vec<Value>, injection: &Injection<'_>) {
    while args.len() < 2 {
        args.push(Value::Null);
    }
    let options = args[1].take();
    args[1] = with_fields(
        options,
        [(
            CONSENT_FIELD,
            Value::String(injection.consent.consent_string.clone()),
        )],
    );
    real(args)
}
