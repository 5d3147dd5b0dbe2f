//! Submit-side identifier injection.
//!
//! # Responsibilities
//! - Define the outbound task envelope and its metadata map
//! - Inject the current request id into outgoing task metadata
//!
//! # Design Decisions
//! - Injection is a conditional insert: caller-supplied metadata is never
//!   overwritten, so enabling the queue wrapper and the hook together is
//!   idempotent
//! - The key is always written, even when no id is in scope; the value is
//!   then explicitly absent rather than missing, so the worker can tell
//!   "submitted outside a request" from "submitted by an unaware producer"

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::context::current_request_id;

/// Metadata key carrying the request id across the queue boundary.
pub const REQUEST_ID_KEY: &str = "x_request_id";

/// String-keyed task metadata. Values may be explicitly absent.
pub type TaskHeaders = HashMap<String, Option<String>>;

/// One unit of background work as handed to a queue.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OutboundTask {
    /// Task name, used by the worker to dispatch.
    pub name: String,
    /// Task arguments.
    pub payload: serde_json::Value,
    /// Transport metadata. `None` is normalized to an empty map on submit.
    #[serde(default)]
    pub headers: Option<TaskHeaders>,
}

impl OutboundTask {
    pub fn new(name: impl Into<String>, payload: serde_json::Value) -> Self {
        Self {
            name: name.into(),
            payload,
            headers: None,
        }
    }
}

/// Minimal queue abstraction: attach metadata to a unit of work and hand it
/// off. Transport and delivery semantics belong to the implementor.
pub trait TaskQueue {
    type Error;

    fn enqueue(&self, task: OutboundTask) -> Result<(), Self::Error>;
}

/// Pre-publish hook: insert the current request id under [`REQUEST_ID_KEY`]
/// unless the caller already set one.
pub fn inject_request_id(headers: &mut TaskHeaders) {
    if !headers.contains_key(REQUEST_ID_KEY) {
        headers.insert(
            REQUEST_ID_KEY.to_string(),
            current_request_id().map(String::from),
        );
    }
}

/// Queue wrapper that injects the request id into every submitted task
/// before delegating to the wrapped queue.
pub struct PropagatingQueue<Q> {
    inner: Q,
}

impl<Q> PropagatingQueue<Q> {
    pub fn new(inner: Q) -> Self {
        Self { inner }
    }

    pub fn into_inner(self) -> Q {
        self.inner
    }
}

impl<Q: TaskQueue> TaskQueue for PropagatingQueue<Q> {
    type Error = Q::Error;

    fn enqueue(&self, mut task: OutboundTask) -> Result<(), Self::Error> {
        let headers = task.headers.get_or_insert_with(TaskHeaders::new);
        inject_request_id(headers);
        self.inner.enqueue(task)
    }
}
