//! Log enrichment with the current request id.
//!
//! # Responsibilities
//! - Attach `request_id=<id>` to every emitted log record
//! - Initialize the logging subsystem with that enrichment in place
//!
//! # Design Decisions
//! - Enrichment runs at format time on the emitting task, which is exactly
//!   where the task-local scopes are visible
//! - Resolution failure degrades to the `-` sentinel; a record is never
//!   suppressed because no id could be resolved
//! - Log level configurable via `RUST_LOG` with a caller-supplied fallback

use std::fmt;

use tracing::{Event, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::time::{FormatTime, SystemTime};
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

use crate::context::current_request_id;

/// Sentinel written when no identifier could be resolved.
pub const ABSENT_REQUEST_ID: &str = "-";

/// Event format that appends the current request id to every record.
#[derive(Clone, Debug, Default)]
pub struct RequestIdFormat {
    timer: SystemTime,
}

impl<S, N> FormatEvent<S, N> for RequestIdFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let meta = event.metadata();
        self.timer.format_time(&mut writer)?;
        write!(writer, " {:>5} {}: ", meta.level(), meta.target())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        match current_request_id() {
            Some(id) => write!(writer, " request_id={id}")?,
            None => write!(writer, " request_id={ABSENT_REQUEST_ID}")?,
        }
        writeln!(writer)
    }
}

/// Install the process-wide subscriber: env-filter driven level control and
/// request-id enrichment on every line.
pub fn init_logging(default_filter: &str) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .event_format(RequestIdFormat::default())
        .init();
}
