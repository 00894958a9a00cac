//! Cookie normalization.
//!
//! Hosts hand cookies over in two shapes: an already-parsed name/value
//! mapping, or a single entry keyed by the literal `Cookie` header name
//! whose value is the raw `name=value; name=value` header string. Both
//! shapes normalize into one canonical `HashMap<String, String>` here so
//! downstream code never special-cases the raw form.

use std::collections::HashMap;

use serde_json::{Map, Value};

/// Normalize a host-supplied cookies field into a name/value mapping.
///
/// A mapping is treated as the raw-header form only when it consists of a
/// single entry whose key equals `Cookie` case-insensitively; otherwise it
/// is passed through with non-string values stringified. Unknown or extra
/// cookies are kept, not rejected.
pub fn extract(cookies: &Map<String, Value>) -> HashMap<String, String> {
    if cookies.len() == 1 {
        let (name, value) = cookies.iter().next().expect("len checked above");
        if name.eq_ignore_ascii_case("cookie") {
            if let Value::String(raw) = value {
                return parse_header(raw);
            }
        }
    }

    cookies
        .iter()
        .map(|(name, value)| (name.clone(), stringify(value)))
        .collect()
}

/// Parse a raw `Cookie:` header value into a name/value mapping.
///
/// Splits on `;`, trims whitespace, and splits each pair on the first `=`.
/// Entries without an `=` are ignored.
pub fn parse_header(raw: &str) -> HashMap<String, String> {
    raw.split(';')
        .filter_map(|pair| {
            let pair = pair.trim();
            let (name, value) = pair.split_once('=')?;
            Some((name.trim().to_string(), value.trim().to_string()))
        })
        .collect()
}

fn stringify(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Tests
// =============================================================================
