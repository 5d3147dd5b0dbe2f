//! HTTP request integration.
//!
//! # Data Flow
//! ```text
//! inbound request
//!     → layer.rs (run parser chain, generate if missing)
//!     → scope.rs (id scoped around the handler future)
//!     → handler + any nested code read it via current_request_id()
//!     → layer.rs (optional access-log record on completion)
//! ```

pub mod layer;
pub mod scope;

pub use layer::{RequestIdLayer, RequestIdService};
pub use scope::{register_http_fetcher, HttpRequestFetcher};
