//! Header parsers and the fallback chain.
//!
//! # Responsibilities
//! - Extract a candidate request id from inbound HTTP headers
//! - Compose parsers into an ordered chain where the first hit wins
//!
//! # Design Decisions
//! - Parsers are pure functions over `HeaderMap`; lookup is case-insensitive
//!   because `HeaderMap` keys are
//! - Malformed header content always degrades to "not found", never an error;
//!   header bytes are attacker/infra controlled and must not fail a request
//! - Chain order is a priority policy: explicit id headers first, the load
//!   balancer trace header last

use std::sync::Arc;

use axum::http::HeaderMap;

use crate::id::RequestId;

/// A header parser: attempt to extract an id from the inbound headers.
pub type Parser = Arc<dyn Fn(&HeaderMap) -> Option<RequestId> + Send + Sync>;

/// Read a header as a trimmed UTF-8 string. Missing, non-UTF-8 or
/// empty-after-trim all count as absent.
fn trimmed_header(headers: &HeaderMap, name: &str) -> Option<RequestId> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .and_then(RequestId::new)
}

/// Parser factory for a generic id-carrying header.
pub fn header_parser(name: &'static str) -> impl Fn(&HeaderMap) -> Option<RequestId> {
    move |headers| trimmed_header(headers, name)
}

/// Parse the `X-Request-ID` header.
pub fn x_request_id(headers: &HeaderMap) -> Option<RequestId> {
    trimmed_header(headers, "X-Request-ID")
}

/// Parse the `X-Correlation-ID` header.
pub fn x_correlation_id(headers: &HeaderMap) -> Option<RequestId> {
    trimmed_header(headers, "X-Correlation-ID")
}

/// Parse the Amazon ELB `X-Amzn-Trace-Id` header.
///
/// The header is a `;`-separated list of `key=value` pairs; a bare token
/// carries no value. The `Self` field wins over `Root`. Anything malformed
/// is treated as absent.
pub fn amzn_trace_id(headers: &HeaderMap) -> Option<RequestId> {
    let raw = headers.get("X-Amzn-Trace-Id")?.to_str().ok()?;

    let mut self_field: Option<Option<&str>> = None;
    let mut root_field: Option<Option<&str>> = None;
    for token in raw.split(';') {
        let (key, value) = match token.split_once('=') {
            Some((k, v)) => (k, Some(v)),
            None => (token, None),
        };
        match key {
            "Self" if self_field.is_none() => self_field = Some(value),
            "Root" if root_field.is_none() => root_field = Some(value),
            _ => {}
        }
    }

    // A present-but-valueless field still takes its priority slot, matching
    // the "bare token maps to no value" rule.
    self_field
        .or(root_field)
        .flatten()
        .and_then(RequestId::new)
}

/// Ordered fallback chain of header parsers. First non-absent result wins.
#[derive(Clone)]
pub struct ParserChain {
    parsers: Vec<Parser>,
}

impl ParserChain {
    /// Build a chain from an explicit ordered parser list.
    pub fn new(parsers: Vec<Parser>) -> Self {
        Self { parsers }
    }

    /// A chain with a single fixed parser.
    pub fn single<F>(parser: F) -> Self
    where
        F: Fn(&HeaderMap) -> Option<RequestId> + Send + Sync + 'static,
    {
        Self {
            parsers: vec![Arc::new(parser)],
        }
    }

    /// Run the chain against the inbound headers.
    pub fn resolve(&self, headers: &HeaderMap) -> Option<RequestId> {
        self.parsers.iter().find_map(|parser| parser(headers))
    }
}

impl Default for ParserChain {
    /// The auto chain: `X-Request-ID`, then `X-Correlation-ID`, then the
    /// Amazon trace header.
    fn default() -> Self {
        Self::new(vec![
            Arc::new(x_request_id),
            Arc::new(x_correlation_id),
            Arc::new(amzn_trace_id),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    fn headers(pairs: &[(&'static str, &str)]) -> HeaderMap {
        let mut map = HeaderMap::new();
        for (name, value) in pairs {
            map.insert(*name, HeaderValue::from_str(value).unwrap());
        }
        map
    }

    #[test]
    fn test_x_request_id() {
        let map = headers(&[("X-Request-ID", "abc-123")]);
        assert_eq!(x_request_id(&map).unwrap().as_str(), "abc-123");
    }

    #[test]
    fn test_lookup_is_case_insensitive() {
        let map = headers(&[("x-request-id", "abc-123")]);
        assert_eq!(x_request_id(&map).unwrap().as_str(), "abc-123");

        let map = headers(&[("x-correlation-id", "cor-1")]);
        assert_eq!(x_correlation_id(&map).unwrap().as_str(), "cor-1");

        let map = headers(&[("x-amzn-trace-id", "Root=1-abc")]);
        assert_eq!(amzn_trace_id(&map).unwrap().as_str(), "1-abc");
    }

    #[test]
    fn test_whitespace_only_is_absent() {
        let map = headers(&[("X-Request-ID", "   ")]);
        assert_eq!(x_request_id(&map), None);
    }

    #[test]
    fn test_value_is_trimmed() {
        let map = headers(&[("X-Request-ID", "  abc-123  ")]);
        assert_eq!(x_request_id(&map).unwrap().as_str(), "abc-123");
    }

    #[test]
    fn test_amzn_self_wins_over_root() {
        let map = headers(&[("X-Amzn-Trace-Id", "Self=A;Root=B")]);
        assert_eq!(amzn_trace_id(&map).unwrap().as_str(), "A");
    }

    #[test]
    fn test_amzn_root_alone() {
        let map = headers(&[("X-Amzn-Trace-Id", "Root=B")]);
        assert_eq!(amzn_trace_id(&map).unwrap().as_str(), "B");
    }

    #[test]
    fn test_amzn_garbage_is_absent() {
        let map = headers(&[("X-Amzn-Trace-Id", "garbage")]);
        assert_eq!(amzn_trace_id(&map), None);

        let map = headers(&[("X-Amzn-Trace-Id", "a=b;c=d")]);
        assert_eq!(amzn_trace_id(&map), None);
    }

    #[test]
    fn test_amzn_bare_self_blocks_root() {
        // "Self" with no value takes the priority slot and yields absent.
        let map = headers(&[("X-Amzn-Trace-Id", "Self;Root=B")]);
        assert_eq!(amzn_trace_id(&map), None);
    }

    #[test]
    fn test_amzn_missing_header() {
        assert_eq!(amzn_trace_id(&HeaderMap::new()), None);
    }

    #[test]
    fn test_chain_priority_order() {
        let map = headers(&[
            ("X-Request-ID", "req"),
            ("X-Correlation-ID", "cor"),
            ("X-Amzn-Trace-Id", "Self=amzn"),
        ]);
        assert_eq!(ParserChain::default().resolve(&map).unwrap().as_str(), "req");

        let map = headers(&[
            ("X-Correlation-ID", "cor"),
            ("X-Amzn-Trace-Id", "Self=amzn"),
        ]);
        assert_eq!(ParserChain::default().resolve(&map).unwrap().as_str(), "cor");

        let map = headers(&[("X-Amzn-Trace-Id", "Self=amzn")]);
        assert_eq!(
            ParserChain::default().resolve(&map).unwrap().as_str(),
            "amzn"
        );
    }

    #[test]
    fn test_chain_all_absent() {
        assert_eq!(ParserChain::default().resolve(&HeaderMap::new()), None);
    }

    #[test]
    fn test_single_parser_chain() {
        let chain = ParserChain::single(header_parser("X-Custom-Id"));
        let map = headers(&[("X-Custom-Id", "custom"), ("X-Request-ID", "ignored")]);
        assert_eq!(chain.resolve(&map).unwrap().as_str(), "custom");
    }
}
