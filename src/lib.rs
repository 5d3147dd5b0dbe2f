//! Request-id resolution, context-scoped storage, and propagation into
//! background tasks.
//!
//! One identifier per inbound request, readable from any call depth via
//! [`current_request_id`], attached to every log line by
//! [`observability::RequestIdFormat`], and carried into queued work by the
//! [`task`] bridge.

pub mod context;
pub mod http;
pub mod id;
pub mod observability;
pub mod parser;
pub mod task;

pub use context::{
    current_request_id, current_request_id_strict, register_fetcher, ContextFetcher,
    FetchOutcome, FetcherRegistry, OutsideAnyContext,
};
pub use http::RequestIdLayer;
pub use id::RequestId;
