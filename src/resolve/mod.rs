//! Resource resolution.
//!
//! Turns an opaque request identifier into the place its bytes live:
//!
//! ```text
//! ┌──────────────────────────────────────────┐
//! │             ResourceLocator              │
//! └───────────┬──────────────────┬───────────┘
//!             │                  │
//!             ▼                  ▼
//! ┌───────────────────┐  ┌───────────────────┐
//! │  CatalogLookup    │  │ RepositoryLookup  │
//! │ (item → image id) │  │ (image id → URI)  │
//! └───────────────────┘  └───────────────────┘
//! ```
//!
//! Both hops sit behind traits so tests can substitute in-memory fixtures
//! and run without a network. Every upstream failure — non-200, timeout,
//! malformed JSON, empty result — collapses into `None` at this boundary:
//! the host treats it as a missing image, never as a system fault.
//! Results are computed fresh per request and never cached; a stale file
//! URL would silently serve the wrong content.

pub mod catalog;
pub mod pairtree;
pub mod repository;
pub mod source;

use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, warn};

use crate::error::LookupError;

pub use catalog::CatalogClient;
pub use pairtree::{pairtree, pairtree_path};
pub use repository::RepositoryClient;
pub use source::SourceRouter;

// =============================================================================
// Lookup Traits
// =============================================================================

/// First hop: the catalog knows which image is related to an item.
#[async_trait]
pub trait CatalogLookup: Send + Sync {
    /// Identifier of the image related to the given item.
    async fn related_image_id(&self, item_id: &str) -> Result<String, LookupError>;
}

/// Second hop: the repository knows where an image's file lives.
#[async_trait]
pub trait RepositoryLookup: Send + Sync {
    /// The repository URL for an image, composed from base, root path,
    /// pairtree, and identifier. Pure composition, no I/O: deployments
    /// whose request identifiers are already repository file ids use this
    /// directly as the resource URI.
    fn resource_url(&self, image_id: &str) -> String;

    /// Fetch the image's description and extract its file URI.
    async fn file_uri(&self, image_id: &str) -> Result<String, LookupError>;
}

// =============================================================================
// ResolvedSource
// =============================================================================

/// Where the bytes live, plus backend credentials when configured.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResolvedSource {
    /// Fetchable URI for the resource.
    pub uri: String,

    /// Backend username, when the repository requires authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,

    /// Backend secret, when the repository requires authentication.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret: Option<String>,
}

impl ResolvedSource {
    /// A source with no attached credentials.
    pub fn uri_only(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            username: None,
            secret: None,
        }
    }
}

// =============================================================================
// ResourceLocator
// =============================================================================

/// Two-hop resolver from request identifier to fetchable resource.
pub struct ResourceLocator<C, R> {
    catalog: C,
    repository: R,
    credentials: Option<(String, String)>,
}

impl<C, R> ResourceLocator<C, R>
where
    C: CatalogLookup,
    R: RepositoryLookup,
{
    /// Create a locator over the two lookup backends.
    pub fn new(catalog: C, repository: R) -> Self {
        Self {
            catalog,
            repository,
            credentials: None,
        }
    }

    /// Attach backend credentials to every resolved source.
    pub fn with_credentials(mut self, username: impl Into<String>, secret: impl Into<String>) -> Self {
        self.credentials = Some((username.into(), secret.into()));
        self
    }

    /// Resolve an identifier to its fetchable resource.
    ///
    /// `None` means "resource not found" — whether because the catalog has
    /// no record, the repository hop failed, or an upstream was
    /// unreachable. Callers get no more detail than that.
    pub async fn locate(&self, identifier: &str) -> Option<ResolvedSource> {
        let image_id = match self.catalog.related_image_id(identifier).await {
            Ok(id) => {
                debug!(identifier, image_id = %id, "Image ID from catalog");
                id
            }
            Err(err) => {
                warn!(identifier, error = %err, "Catalog lookup failed");
                return None;
            }
        };

        let uri = match self.repository.file_uri(&image_id).await {
            Ok(uri) => {
                debug!(%image_id, %uri, "File URI from repository");
                uri
            }
            Err(err) => {
                warn!(%image_id, error = %err, "Repository lookup failed");
                return None;
            }
        };

        let mut resolved = ResolvedSource::uri_only(uri);
        if let Some((username, secret)) = &self.credentials {
            resolved.username = Some(username.clone());
            resolved.secret = Some(secret.clone());
        }
        Some(resolved)
    }
}

// =============================================================================
// Tests
// =============================================================================
