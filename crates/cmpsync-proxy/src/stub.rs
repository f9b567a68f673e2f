//! Stand-in installed before the CMP loads.
//!
//! The stub accepts the same calling convention as the proxy and only
//! queues. The proxy takes the queue over when it is built.

use std::cell::RefCell;
use std::fmt;

use serde_json::Value;

use crate::message::{extract_call, reply_callback, MessageEvent};
use crate::traits::Callback;

/// A call issued before consent was available.
pub struct QueuedCall {
    pub command: String,
    pub parameter: Value,
    pub callback: Callback,
}

impl fmt::Debug for QueuedCall {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("QueuedCall")
            .field("command", &self.command)
            .field("parameter", &self.parameter)
            .finish_non_exhaustive()
    }
}

/// Queue-only command endpoint.
#[derive(Debug, Default)]
pub struct Stub {
    queue: RefCell<Vec<QueuedCall>>,
}

impl Stub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a direct call.
    pub fn call(&self, command: &str, parameter: Value, callback: Callback) {
        self.queue.borrow_mut().push(QueuedCall {
            command: command.to_string(),
            parameter,
            callback,
        });
    }

    /// Queue a cross-frame call. Messages without a call payload are ignored.
    pub fn receive_message(&self, event: MessageEvent) {
        let Some(call) = extract_call(&event.data) else {
            return;
        };
        let callback = reply_callback(&call, &event);
        self.queue.borrow_mut().push(QueuedCall {
            command: call.command,
            parameter: call.parameter,
            callback,
        });
    }

    /// Marks this endpoint as the consent proxy's stub for locator checks.
    pub fn is_cmp_stub(&self) -> bool {
        true
    }

    pub fn pending_len(&self) -> usize {
        self.queue.borrow().len()
    }

    /// Commands queued so far, in order.
    pub fn pending_commands(&self) -> Vec<String> {
        self.queue
            .borrow()
            .iter()
            .map(|call| call.command.clone())
            .collect()
    }

    /// Take the queue, leaving the stub empty.
    pub fn into_queue(self) -> Vec<QueuedCall> {
        self.queue.into_inner()
    }
}
