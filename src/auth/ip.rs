//! Trusted-network check via the `X-Forwarded-For` header.
//!
//! Requests arriving through the trusted proxy carry the original client
//! IP as the left-most entry of `X-Forwarded-For`. Membership of that
//! entry in the configured allow list bypasses cookie authentication
//! entirely. Absence of the header fails closed: a request that did not
//! traverse the proxy is never trusted.

use std::collections::{HashMap, HashSet};

const FORWARDED_FOR: &str = "x-forwarded-for";

/// Whether the forwarded client IP is in the allow list.
///
/// Header-name lookup is case-insensitive. The header value may be a
/// comma-separated list (client first, then proxy hops); only the first
/// entry is checked, after trimming. Matching is exact string membership,
/// no CIDR.
pub fn is_allowed(headers: &HashMap<String, String>, allow_list: &HashSet<String>) -> bool {
    let Some(value) = header(headers, FORWARDED_FOR) else {
        return false;
    };

    match forwarded_client(value) {
        Some(client) => allow_list.contains(client),
        None => false,
    }
}

/// First entry of a comma-separated `X-Forwarded-For` value, trimmed.
pub fn forwarded_client(value: &str) -> Option<&str> {
    let client = value.split(',').next()?.trim();
    if client.is_empty() {
        None
    } else {
        Some(client)
    }
}

fn header<'a>(headers: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    headers
        .iter()
        .find(|(key, _)| key.eq_ignore_ascii_case(name))
        .map(|(_, value)| value.as_str())
}

// =============================================================================
// Tests
// =============================================================================
