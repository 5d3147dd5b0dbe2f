//! Multi-context identifier resolution.
//!
//! # Responsibilities
//! - Define the `ContextFetcher` capability and its two-case outcome
//! - Keep the ordered process-wide fetcher registry
//! - Expose `current_request_id()` as the single accessor that works in any
//!   execution context
//!
//! # Design Decisions
//! - "Not running in this context" and "running here but no id set" are
//!   distinct outcomes; collapsing them would make fallback impossible
//! - The registry is process-wide by contract: integrations register during
//!   their own initialization, reads dominate afterwards. Registration is
//!   additive and dedup'd by pointer identity so repeated attachment of the
//!   same integration is a no-op
//! - Non-strict resolution never fails; strict mode is an explicit opt-in

use std::sync::{Arc, LazyLock, RwLock};

use thiserror::Error;

use crate::id::RequestId;

/// Result of asking one fetcher for the current identifier.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FetchOutcome {
    /// The calling code is not running inside this fetcher's context.
    NotApplicable,
    /// The calling code runs inside this context; the id may still be absent.
    Resolved(Option<RequestId>),
}

/// Capability to resolve the request id for one execution-context type
/// (HTTP request, background task, ...).
pub trait ContextFetcher: Send + Sync {
    /// Attempt to produce the identifier for the calling context.
    fn fetch(&self) -> FetchOutcome;
}

/// Raised by strict resolution when no registered fetcher recognized the
/// calling context.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("request id requested outside any tracked context")]
pub struct OutsideAnyContext;

/// Ordered collection of context fetchers. Insertion order is priority order.
#[derive(Default)]
pub struct FetcherRegistry {
    fetchers: Vec<Arc<dyn ContextFetcher>>,
}

impl FetcherRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fetcher. Registering the same `Arc` twice is a no-op.
    pub fn register(&mut self, fetcher: Arc<dyn ContextFetcher>) {
        let already = self
            .fetchers
            .iter()
            .any(|existing| Arc::ptr_eq(existing, &fetcher));
        if !already {
            self.fetchers.push(fetcher);
        }
    }

    /// Number of registered fetchers.
    pub fn len(&self) -> usize {
        self.fetchers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fetchers.is_empty()
    }

    /// Ask each fetcher in registration order; the first one that recognizes
    /// the calling context decides the result, even when its id is absent.
    pub fn resolve(&self) -> Result<Option<RequestId>, OutsideAnyContext> {
        for fetcher in &self.fetchers {
            match fetcher.fetch() {
                FetchOutcome::NotApplicable => continue,
                FetchOutcome::Resolved(id) => return Ok(id),
            }
        }
        Err(OutsideAnyContext)
    }
}

/// Process-wide registry. Written during integration startup, read on every
/// log line and task submission afterwards.
static REGISTRY: LazyLock<RwLock<FetcherRegistry>> =
    LazyLock::new(|| RwLock::new(FetcherRegistry::new()));

/// Register a fetcher into the process-wide registry.
///
/// Each integration registers its own fetcher without knowing about the
/// others; that is what makes `current_request_id()` context-transparent.
pub fn register_fetcher(fetcher: Arc<dyn ContextFetcher>) {
    REGISTRY
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .register(fetcher);
}

/// The current request id, or `None` when no identifier is set or the
/// caller runs outside every tracked context. Never fails.
pub fn current_request_id() -> Option<RequestId> {
    REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .resolve()
        .unwrap_or(None)
}

/// Strict variant: distinguishes "in a context without an id" (`Ok(None)`)
/// from "outside any tracked context" (`Err`).
pub fn current_request_id_strict() -> Result<Option<RequestId>, OutsideAnyContext> {
    REGISTRY
        .read()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
        .resolve()
}
