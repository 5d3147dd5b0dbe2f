//! Request lifecycle middleware.
//!
//! # Responsibilities
//! - Resolve or generate the request id before the handler runs
//! - Scope the id around the handler so any nested code can read it
//! - Optionally emit one access-log record per completed request
//!
//! # Design Decisions
//! - Resolution happens in `call` before the inner future is polled, so the
//!   id exists before any handler log line or task submission
//! - The resolved id is also inserted into the request extensions, giving
//!   handlers a typed slot to extract it from
//! - The access log carries client address, method, path and status as
//!   explicit fields; the request id reaches it through the same log
//!   enrichment path as every other record

use std::net::SocketAddr;
use std::sync::Arc;
use std::task::{Context, Poll};

use axum::extract::ConnectInfo;
use axum::http::{Request, Response};
use futures_util::future::BoxFuture;
use tower::{Layer, Service};

use crate::http::scope;
use crate::id::RequestId;
use crate::parser::ParserChain;

type Generator = Arc<dyn Fn() -> RequestId + Send + Sync>;

struct Settings {
    parser: ParserChain,
    generator: Generator,
    generate_if_missing: bool,
    log_requests: bool,
}

/// Tower layer that attaches request-id resolution to a service.
///
/// The layer can be built long before it is attached to a router, and may be
/// attached more than once; fetcher registration dedups by identity.
#[derive(Clone)]
pub struct RequestIdLayer {
    parser: ParserChain,
    generator: Generator,
    generate_if_missing: bool,
    log_requests: bool,
}

impl RequestIdLayer {
    pub fn new() -> Self {
        scope::register_http_fetcher();
        Self {
            parser: ParserChain::default(),
            generator: Arc::new(RequestId::generate),
            generate_if_missing: true,
            log_requests: false,
        }
    }

    /// Replace the default fallback chain.
    pub fn parser(mut self, parser: ParserChain) -> Self {
        self.parser = parser;
        self
    }

    /// Replace the default UUID-v4 generator.
    pub fn generator<F>(mut self, generator: F) -> Self
    where
        F: Fn() -> RequestId + Send + Sync + 'static,
    {
        self.generator = Arc::new(generator);
        self
    }

    /// Whether to generate a fresh id when no header matched. Default: true.
    pub fn generate_if_missing(mut self, enabled: bool) -> Self {
        self.generate_if_missing = enabled;
        self
    }

    /// Whether to emit one access-log record per completed request.
    /// Default: false.
    pub fn log_requests(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }
}

impl Default for RequestIdLayer {
    fn default() -> Self {
        Self::new()
    }
}

impl<S> Layer<S> for RequestIdLayer {
    type Service = RequestIdService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        RequestIdService {
            inner,
            settings: Arc::new(Settings {
                parser: self.parser.clone(),
                generator: self.generator.clone(),
                generate_if_missing: self.generate_if_missing,
                log_requests: self.log_requests,
            }),
        }
    }
}

/// Service produced by [`RequestIdLayer`].
#[derive(Clone)]
pub struct RequestIdService<S> {
    inner: S,
    settings: Arc<Settings>,
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for RequestIdService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = BoxFuture<'static, Result<Self::Response, Self::Error>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, mut req: Request<ReqBody>) -> Self::Future {
        // Take the inner service that was driven to readiness; leave a fresh
        // clone behind for the next call.
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let settings = self.settings.clone();

        let mut id = settings.parser.resolve(req.headers());
        if id.is_none() && settings.generate_if_missing {
            id = Some((settings.generator)());
        }
        if let Some(id) = &id {
            req.extensions_mut().insert(id.clone());
        }

        let client = req
            .extensions()
            .get::<ConnectInfo<SocketAddr>>()
            .map(|info| info.0.to_string())
            .unwrap_or_else(|| "-".to_string());
        let method = req.method().clone();
        let path = req.uri().path().to_string();

        Box::pin(scope::enter(id, async move {
            let response = inner.call(req).await?;
            if settings.log_requests {
                tracing::info!(
                    client = %client,
                    method = %method,
                    path = %path,
                    status = response.status().as_u16(),
                    "Request completed"
                );
            }
            Ok(response)
        }))
    }
}
