//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! any code emits a tracing event
//!     → logging.rs (format the record)
//!     → current_request_id() resolved on the emitting task
//!     → request_id=<id or -> appended to the line
//! ```
//!
//! # Design Decisions
//! - The request id is never an explicit field at call sites; it is attached
//!   once, centrally, so third-party log lines carry it too

pub mod logging;

pub use logging::{init_logging, RequestIdFormat, ABSENT_REQUEST_ID};
