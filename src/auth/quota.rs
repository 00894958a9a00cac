//! Region/size quota rules for IIIF image requests.
//!
//! The IIIF Image API path convention is
//! `{id}/{region}/{size}/{rotation}/{quality}.{format}`, so the region is
//! the 4th-from-last path segment and the size the 3rd-from-last. A size
//! may carry a comma-suffixed component (`512,` or `512,384`); only the
//! portion before the first comma is evaluated.
//!
//! A request is over quota when any rule matches:
//!
//! 1. region `full` with size `full` or `max` (unconstrained export)
//! 2. size `pct:N` with `N` above the percentage threshold
//! 3. integer size wider than `floor(width_ratio * full_width)`
//!
//! Discovery requests never reach this module; the engine authorizes them
//! before quota evaluation.

/// Quota thresholds, from process configuration.
#[derive(Debug, Clone, Copy)]
pub struct QuotaLimits {
    /// Highest allowed `pct:N` percentage. Requests above this are treated
    /// as equivalent to full resolution.
    pub max_pct: u32,

    /// Fraction of the source width a pixel request may ask for.
    pub width_ratio: f64,
}

impl Default for QuotaLimits {
    fn default() -> Self {
        Self {
            max_pct: 79,
            width_ratio: 0.5,
        }
    }
}

/// Whether a request exceeds the configured quota.
///
/// `full_width` is the source image width in pixels. Returns `false` when
/// the URI does not carry enough path segments to locate region and size;
/// malformed requests are the host's problem, not a quota violation.
pub fn is_over_quota(request_uri: &str, full_width: u32, limits: QuotaLimits) -> bool {
    let Some((region, size)) = region_and_size(request_uri) else {
        return false;
    };

    is_full_export(region, size) || over_max_pct(size, limits.max_pct) || {
        let max_width = (f64::from(full_width) * limits.width_ratio) as u64;
        requested_width(size) > max_width
    }
}

/// Region (4th-from-last) and size (3rd-from-last) path segments, with the
/// size truncated at the first comma.
fn region_and_size(request_uri: &str) -> Option<(&str, &str)> {
    let segments: Vec<&str> = request_uri.split('/').collect();
    if segments.len() < 4 {
        return None;
    }
    let region = segments[segments.len() - 4];
    let size = segments[segments.len() - 3];
    let size = size.split(',').next().unwrap_or(size);
    Some((region, size))
}

fn is_full_export(region: &str, size: &str) -> bool {
    region == "full" && (size == "full" || size == "max")
}

fn over_max_pct(size: &str, max_pct: u32) -> bool {
    match size.strip_prefix("pct:") {
        Some(pct) => leading_int(pct) > u64::from(max_pct),
        None => false,
    }
}

/// Requested width as an integer, non-numeric sizes counting as zero.
///
/// `full`, `max`, `pct:N`, and `!w` forms all evaluate to zero here, in
/// keeping with the host's original lenient integer coercion; those forms
/// are governed by the other rules.
fn requested_width(size: &str) -> u64 {
    leading_int(size)
}

fn leading_int(s: &str) -> u64 {
    let digits: &str = {
        let end = s.find(|c: char| !c.is_ascii_digit()).unwrap_or(s.len());
        &s[..end]
    };
    if digits.is_empty() {
        return 0;
    }
    // A numeric value too large for u64 is still a huge request;
    // saturate rather than falling back to zero and under-counting it.
    digits.parse().unwrap_or(u64::MAX)
}

// =============================================================================
// Tests
// =============================================================================
