//! Repository (object store) lookup.
//!
//! The second hop of resource resolution: fetch the linked-data
//! description of an image from the repository, whose URL is composed of
//! the repository base, a root path, the identifier's pairtree, and the
//! identifier itself. The fetchable file URI is the `@id` of the first
//! `hasFile` link.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::LookupError;

use super::pairtree::pairtree_path;
use super::RepositoryLookup;

const USER_AGENT: &str = concat!(
    "iiif-gatekeeper/",
    env!("CARGO_PKG_VERSION"),
    " repository lookup"
);

/// JSON-LD predicate linking a resource to its file.
pub const HAS_FILE: &str = "http://pcdm.org/models#hasFile";

/// HTTP client for the repository's linked-data endpoint.
#[derive(Debug, Clone)]
pub struct RepositoryClient {
    base_url: String,
    root_path: String,
    client: Client,
}

impl RepositoryClient {
    /// Create a client with a bounded request timeout.
    ///
    /// `base_url` is the repository host (e.g. `http://fedora:8080`) and
    /// `root_path` the container path beneath it (e.g. `/fcrepo/rest/prod`).
    pub fn new(
        base_url: impl Into<String>,
        root_path: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            root_path: root_path.into(),
            client,
        })
    }
}

#[async_trait]
impl RepositoryLookup for RepositoryClient {
    fn resource_url(&self, image_id: &str) -> String {
        format!(
            "{}{}/{}/{}",
            self.base_url,
            self.root_path,
            pairtree_path(image_id),
            image_id
        )
    }

    async fn file_uri(&self, image_id: &str) -> Result<String, LookupError> {
        let response = self
            .client
            .get(self.resource_url(image_id))
            .header("Accept", "application/ld+json")
            .send()
            .await
            .map_err(|e| LookupError::Connection(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LookupError::Status(status.as_u16()));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| LookupError::MalformedResponse(e.to_string()))?;

        parse_description(&body).ok_or_else(|| LookupError::NoRecord(image_id.to_string()))
    }
}

/// Extract the file URI from a JSON-LD resource description.
///
/// Expected shape: the body is an array whose first element carries a
/// `http://pcdm.org/models#hasFile` array; the answer is the `@id` of
/// that array's first entry. Returns `None` for any deviation.
pub fn parse_description(body: &Value) -> Option<String> {
    body.get(0)?
        .get(HAS_FILE)?
        .get(0)?
        .get("@id")?
        .as_str()
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================
