//! Background task propagation bridge.
//!
//! # Data Flow
//! ```text
//! handler enqueues work
//!     → submit.rs (inject current id into task metadata)
//!     → queue transport (out of scope)
//!     → worker receives task
//!     → worker.rs (metadata scoped around the task body)
//!     → task body + its log lines read the id via current_request_id()
//! ```

pub mod submit;
pub mod worker;

pub use submit::{inject_request_id, OutboundTask, PropagatingQueue, TaskHeaders, TaskQueue, REQUEST_ID_KEY};
pub use worker::{register_task_fetcher, with_task_headers, TaskContextFetcher};
