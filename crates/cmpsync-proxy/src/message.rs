//! Cross-frame message contract.
//!
//! Inbound: `{ "__cmpCall": { "callId", "command", "parameter" } }`.
//! Outbound: `{ "__cmpReturn": { "callId", "command", "returnValue" } }`,
//! posted to the sender's origin. One reply per call, no retry, no timeout.

use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::traits::{Callback, MessageSource};

/// Envelope key of an inbound call.
pub const CALL_KEY: &str = "__cmpCall";
/// Envelope key of an outbound reply.
pub const RETURN_KEY: &str = "__cmpReturn";

/// Call payload extracted from a cross-frame message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmpCall {
    #[serde(default)]
    pub call_id: Value,
    pub command: String,
    #[serde(default)]
    pub parameter: Value,
}

/// Reply payload for one [`CmpCall`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CmpReturn {
    pub call_id: Value,
    pub command: String,
    pub return_value: Value,
}

impl CmpReturn {
    /// Wrap in the `__cmpReturn` envelope.
    pub fn into_message(self) -> Value {
        let mut envelope = serde_json::Map::new();
        envelope.insert(
            RETURN_KEY.to_string(),
            serde_json::to_value(self).unwrap_or(Value::Null),
        );
        Value::Object(envelope)
    }
}

/// A received cross-window message.
#[derive(Clone)]
pub struct MessageEvent {
    pub data: Value,
    pub origin: String,
    pub source: Option<Rc<dyn MessageSource>>,
}

impl MessageEvent {
    pub fn new(data: Value, origin: impl Into<String>, source: Rc<dyn MessageSource>) -> Self {
        Self {
            data,
            origin: origin.into(),
            source: Some(source),
        }
    }
}

impl fmt::Debug for MessageEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageEvent")
            .field("data", &self.data)
            .field("origin", &self.origin)
            .field("source", &self.source.is_some())
            .finish()
    }
}

/// Extract the call payload from message data.
///
/// Frames may post the envelope as an object or as a JSON string. Anything
/// without a well-formed `__cmpCall` yields `None`.
pub fn extract_call(data: &Value) -> Option<CmpCall> {
    let parsed;
    let data = match data {
        Value::String(text) => {
            parsed = serde_json::from_str::<Value>(text).ok()?;
            &parsed
        }
        other => other,
    };
    let call = data.get(CALL_KEY)?;
    serde_json::from_value(call.clone()).ok()
}

/// Callback posting the result of `call` back to the event's source.
pub fn reply_callback(call: &CmpCall, event: &MessageEvent) -> Callback {
    let call_id = call.call_id.clone();
    let command = call.command.clone();
    let origin = event.origin.clone();
    let source = event.source.clone();

    Box::new(move |return_value, _success| {
        let Some(source) = source else {
            tracing::debug!(%command, "cross-frame call has no source, reply dropped");
            return;
        };
        let reply = CmpReturn {
            call_id,
            command,
            return_value,
        };
        source.post_message(reply.into_message(), &origin);
    })
}
