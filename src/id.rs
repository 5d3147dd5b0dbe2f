//! The request identifier type.
//!
//! # Responsibilities
//! - Represent one correlation id as an opaque, non-empty string
//! - Generate fresh identifiers when a request arrives without one
//!
//! # Design Decisions
//! - Non-empty is enforced at construction; absence is `Option<RequestId>`,
//!   never an empty string
//! - No internal structure is assumed, the value is only ever logged or
//!   placed in a header/metadata field

use std::fmt;

use uuid::Uuid;

/// Opaque correlation identifier for one inbound request.
///
/// Guaranteed non-empty. "No identifier" is `Option::<RequestId>::None`.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct RequestId(String);

impl RequestId {
    /// Create an identifier from a string. Returns `None` for empty input.
    pub fn new(value: impl Into<String>) -> Option<Self> {
        let value = value.into();
        if value.is_empty() {
            None
        } else {
            Some(Self(value))
        }
    }

    /// Generate a fresh random identifier (UUID v4).
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<RequestId> for String {
    fn from(id: RequestId) -> String {
        id.0
    }
}

impl AsRef<str> for RequestId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
