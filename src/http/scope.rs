//! Request-scoped identifier storage.
//!
//! # Responsibilities
//! - Hold the resolved id for exactly one in-flight request
//! - Expose the HTTP-side `ContextFetcher`
//!
//! # Design Decisions
//! - A task-local slot gives the value the lifetime of one scoped future:
//!   it cannot leak across concurrent requests and is cleared when the
//!   scope ends, even on worker-thread reuse
//! - The fetcher distinguishes "no request in flight" (`NotApplicable`)
//!   from "request in flight without an id" (`Resolved(None)`)

use std::future::Future;
use std::sync::{Arc, LazyLock};

use crate::context::{register_fetcher, ContextFetcher, FetchOutcome};
use crate::id::RequestId;

tokio::task_local! {
    static REQUEST_SCOPE: Option<RequestId>;
}

/// Run `fut` with `id` as the current request's identifier.
///
/// The value is immutable for the duration of the scope and dropped with it.
pub async fn enter<F: Future>(id: Option<RequestId>, fut: F) -> F::Output {
    REQUEST_SCOPE.scope(id, fut).await
}

/// Resolves the id from the ambient request scope, if any.
pub struct HttpRequestFetcher;

impl ContextFetcher for HttpRequestFetcher {
    fn fetch(&self) -> FetchOutcome {
        match REQUEST_SCOPE.try_with(|id| id.clone()) {
            Ok(id) => FetchOutcome::Resolved(id),
            Err(_) => FetchOutcome::NotApplicable,
        }
    }
}

// One shared instance so repeated registration dedups by identity.
static HTTP_FETCHER: LazyLock<Arc<HttpRequestFetcher>> =
    LazyLock::new(|| Arc::new(HttpRequestFetcher));

/// Register the HTTP fetcher into the process-wide accessor. Idempotent.
pub fn register_http_fetcher() {
    register_fetcher(HTTP_FETCHER.clone());
}
