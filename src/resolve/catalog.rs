//! Catalog (search index) lookup.
//!
//! The first hop of resource resolution: ask the catalog which image is
//! related to the requested item. The catalog answers a Solr-style select
//! query with a JSON document list; the related image identifier lives in
//! the first document's `hasRelatedImage_ssim` array.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;

use crate::error::LookupError;

use super::CatalogLookup;

const USER_AGENT: &str = concat!("iiif-gatekeeper/", env!("CARGO_PKG_VERSION"), " catalog lookup");

/// HTTP client for the catalog's select endpoint.
///
/// `base_url` includes the core name, e.g.
/// `http://localhost:8983/solr/californica`.
#[derive(Debug, Clone)]
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    /// Create a client with a bounded request timeout.
    ///
    /// Lookups are never retried; a failure within the timeout is a
    /// definitive "not found" for that request.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, LookupError> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| LookupError::Connection(e.to_string()))?;
        Ok(Self {
            base_url: base_url.into(),
            client,
        })
    }

    /// The select query URL for an item identifier.
    pub fn query_url(&self, item_id: &str) -> String {
        format!("{}/select?q=id:{}", self.base_url, item_id)
    }
}

#[async_trait]
impl CatalogLookup for CatalogClient {
    async fn related_image_id(&self, item_id: &str) -> Result<String, LookupError> {
        let response = self
            .client
            .get(self.query_url(item_id))
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

        parse_select_response(&body).ok_or_else(|| LookupError::NoRecord(item_id.to_string()))
    }
}

/// Extract the related image identifier from a select response.
///
/// Expected shape:
/// `{"response":{"docs":[{"hasRelatedImage_ssim":["<id>"]}]}}`.
/// Returns `None` for any deviation, including an empty `docs` array.
pub fn parse_select_response(body: &Value) -> Option<String> {
    body.get("response")?
        .get("docs")?
        .get(0)?
        .get("hasRelatedImage_ssim")?
        .get(0)?
        .as_str()
        .map(str::to_string)
}

// =============================================================================
// Tests
// =============================================================================
