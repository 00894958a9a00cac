//! Backend source routing.
//!
//! Dispatches an identifier to the named backend source that should serve
//! its bytes. Identifiers under the reserved originals namespace live on
//! local filesystem storage; everything else comes from a networked
//! source, whose name is a deployment choice (HTTP or object storage).

/// Default prefix marking identifiers served from local storage.
pub const DEFAULT_ORIGINALS_PREFIX: &str = "Masters/";

/// Default name of the local filesystem source.
pub const FILESYSTEM_SOURCE: &str = "FilesystemSource";

/// Default name of the networked source.
pub const HTTP_SOURCE: &str = "HttpSource";

/// Maps identifiers to backend source names by prefix.
///
/// Pure string dispatch: no I/O and no failure mode. Unrecognized
/// identifiers route to the configured network source.
#[derive(Debug, Clone)]
pub struct SourceRouter {
    originals_prefix: String,
    filesystem_source: String,
    network_source: String,
}

impl Default for SourceRouter {
    fn default() -> Self {
        Self {
            originals_prefix: DEFAULT_ORIGINALS_PREFIX.to_string(),
            filesystem_source: FILESYSTEM_SOURCE.to_string(),
            network_source: HTTP_SOURCE.to_string(),
        }
    }
}

impl SourceRouter {
    /// Create a router with custom prefix and source names.
    pub fn new(
        originals_prefix: impl Into<String>,
        filesystem_source: impl Into<String>,
        network_source: impl Into<String>,
    ) -> Self {
        Self {
            originals_prefix: originals_prefix.into(),
            filesystem_source: filesystem_source.into(),
            network_source: network_source.into(),
        }
    }

    /// The source name that should serve the given identifier.
    pub fn route(&self, identifier: &str) -> &str {
        if identifier.starts_with(&self.originals_prefix) {
            &self.filesystem_source
        } else {
            &self.network_source
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
