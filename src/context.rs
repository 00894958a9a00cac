//! Per-request context supplied by the image-serving host.
//!
//! The host builds one of these for every inbound request and hands it to
//! the [`Authorizer`](crate::auth::Authorizer) and, for accepted requests,
//! to the [`ResourceLocator`](crate::resolve::ResourceLocator). The shape
//! mirrors the host's delegate contract:
//!
//! - `identifier`, `request_uri`, `request_headers`, `cookies`, and
//!   `client_ip` accompany every request.
//! - `full_size` is present only for requests that target pixel content.
//!   Capability-discovery requests (info documents) omit it, and its
//!   absence is what marks a request as a discovery request.
//!
//! The host serializes dimensions inconsistently (`1024` and `"1024"` both
//! occur in the wild), and cookie values are not always strings, so both
//! fields deserialize leniently.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Pixel dimensions of the source image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FullSize {
    /// Source image width in pixels.
    #[serde(deserialize_with = "lenient_u32")]
    pub width: u32,

    /// Source image height in pixels.
    #[serde(deserialize_with = "lenient_u32")]
    pub height: u32,
}

/// Context for a single inbound request, as supplied by the host.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RequestContext {
    /// Opaque image identifier.
    #[serde(default)]
    pub identifier: String,

    /// Public request URI. Carries the IIIF region/size path segments for
    /// image requests; may be absent for discovery requests.
    #[serde(default)]
    pub request_uri: Option<String>,

    /// Source image dimensions. Present iff the request targets pixels.
    #[serde(default)]
    pub full_size: Option<FullSize>,

    /// Request headers as supplied (keys are not normalized by the host).
    #[serde(default)]
    pub request_headers: HashMap<String, String>,

    /// Cookies, either as a parsed name/value mapping or as a single
    /// `Cookie` entry holding the raw header string. Values are kept as
    /// raw JSON because some hosts supply non-string cookie values.
    #[serde(default)]
    pub cookies: serde_json::Map<String, Value>,

    /// Client IP address as seen by the host.
    #[serde(default)]
    pub client_ip: Option<String>,
}

impl RequestContext {
    /// Whether this is a capability-discovery request (no pixel payload).
    pub fn is_discovery(&self) -> bool {
        self.full_size.is_none()
    }
}

/// Accept a dimension as either a JSON number or a numeric string.
fn lenient_u32<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    match value {
        Value::Number(n) => n
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or_else(|| serde::de::Error::custom("dimension out of range")),
        Value::String(s) => s
            .parse::<u32>()
            .map_err(|_| serde::de::Error::custom("dimension is not a number")),
        other => Err(serde::de::Error::custom(format!(
            "expected number or string, got {}",
            other
        ))),
    }
}

// =============================================================================
// Tests
// =============================================================================
