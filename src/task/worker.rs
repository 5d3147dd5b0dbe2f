//! Worker-side identifier recovery.
//!
//! # Responsibilities
//! - Scope the received task metadata around one task execution
//! - Expose the task-side `ContextFetcher`
//!
//! # Design Decisions
//! - Mirrors the HTTP request scope: one task-local slot per executing task,
//!   cleared when the task body finishes
//! - A missing metadata key and an explicitly absent value both resolve to
//!   `Resolved(None)`; only "no task executing here" is `NotApplicable`

use std::future::Future;
use std::sync::{Arc, LazyLock};

use crate::context::{register_fetcher, ContextFetcher, FetchOutcome};
use crate::id::RequestId;
use crate::task::submit::{TaskHeaders, REQUEST_ID_KEY};

tokio::task_local! {
    static TASK_SCOPE: TaskHeaders;
}

/// Run a task body with its received metadata in scope, making the
/// propagated id visible to `current_request_id()` inside `fut`.
pub async fn with_task_headers<F: Future>(headers: TaskHeaders, fut: F) -> F::Output {
    TASK_SCOPE.scope(headers, fut).await
}

/// Resolves the id from the metadata of the task executing on this worker.
pub struct TaskContextFetcher;

impl ContextFetcher for TaskContextFetcher {
    fn fetch(&self) -> FetchOutcome {
        match TASK_SCOPE.try_with(|headers| headers.get(REQUEST_ID_KEY).cloned().flatten()) {
            Ok(value) => FetchOutcome::Resolved(value.and_then(RequestId::new)),
            Err(_) => FetchOutcome::NotApplicable,
        }
    }
}

// One shared instance so repeated registration dedups by identity.
static TASK_FETCHER: LazyLock<Arc<TaskContextFetcher>> =
    LazyLock::new(|| Arc::new(TaskContextFetcher));

/// Register the worker-side fetcher into the process-wide accessor.
/// Idempotent; call it during worker startup.
pub fn register_task_fetcher() {
    register_fetcher(TASK_FETCHER.clone());
}
