//! Resource-resolution integration tests.
//!
//! Tests verify:
//! - The two-hop lookup over in-memory doubles, including every failure
//!   collapse (non-200, empty result, unreachable upstream)
//! - Exact pairtree-based repository URL composition
//! - Source routing for originals and networked identifiers

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;

use iiif_gatekeeper::{
    pairtree, CatalogLookup, LookupError, RepositoryClient, RepositoryLookup, ResourceLocator,
    SourceRouter,
};

// =============================================================================
// In-Memory Doubles
// =============================================================================

/// Catalog double backed by an item → image-id map.
#[derive(Default)]
struct MemoryCatalog {
    records: HashMap<String, String>,
    unavailable: Option<LookupError>,
}

impl MemoryCatalog {
    fn with_record(mut self, item_id: &str, image_id: &str) -> Self {
        self.records.insert(item_id.to_string(), image_id.to_string());
        self
    }

    fn unavailable(error: LookupError) -> Self {
        Self {
            records: HashMap::new(),
            unavailable: Some(error),
        }
    }
}

#[async_trait]
impl CatalogLookup for MemoryCatalog {
    async fn related_image_id(&self, item_id: &str) -> Result<String, LookupError> {
        if let Some(error) = &self.unavailable {
            return Err(error.clone());
        }
        self.records
            .get(item_id)
            .cloned()
            .ok_or_else(|| LookupError::NoRecord(item_id.to_string()))
    }
}

/// Repository double backed by an image-id → file-URI map.
#[derive(Default)]
struct MemoryRepository {
    files: HashMap<String, String>,
    unavailable: Option<LookupError>,
}

impl MemoryRepository {
    fn with_file(mut self, image_id: &str, uri: &str) -> Self {
        self.files.insert(image_id.to_string(), uri.to_string());
        self
    }

    fn unavailable(error: LookupError) -> Self {
        Self {
            files: HashMap::new(),
            unavailable: Some(error),
        }
    }
}

#[async_trait]
impl RepositoryLookup for MemoryRepository {
    fn resource_url(&self, image_id: &str) -> String {
        format!("memory:/{}/{}", pairtree(image_id).join("/"), image_id)
    }

    async fn file_uri(&self, image_id: &str) -> Result<String, LookupError> {
        if let Some(error) = &self.unavailable {
            return Err(error.clone());
        }
        self.files
            .get(image_id)
            .cloned()
            .ok_or_else(|| LookupError::NoRecord(image_id.to_string()))
    }
}

// =============================================================================
// Two-Hop Resolution
// =============================================================================

#[tokio::test]
async fn test_two_hop_resolution() {
    let catalog = MemoryCatalog::default().with_record("work-1", "4x51hj00j");
    let repository = MemoryRepository::default().with_file(
        "4x51hj00j",
        "http://fedora:8080/fcrepo/rest/prod/4x/51/hj/00/4x51hj00j/files/f1",
    );

    let locator = ResourceLocator::new(catalog, repository);
    let resolved = locator.locate("work-1").await.unwrap();
    assert_eq!(
        resolved.uri,
        "http://fedora:8080/fcrepo/rest/prod/4x/51/hj/00/4x51hj00j/files/f1"
    );
}

#[tokio::test]
async fn test_unknown_item_is_not_found() {
    let locator = ResourceLocator::new(MemoryCatalog::default(), MemoryRepository::default());
    assert!(locator.locate("missing").await.is_none());
}

#[tokio::test]
async fn test_catalog_non_200_is_not_found() {
    let locator = ResourceLocator::new(
        MemoryCatalog::unavailable(LookupError::Status(503)),
        MemoryRepository::default().with_file("img", "uri"),
    );
    assert!(locator.locate("work-1").await.is_none());
}

#[tokio::test]
async fn test_catalog_timeout_is_not_found() {
    let locator = ResourceLocator::new(
        MemoryCatalog::unavailable(LookupError::Connection("operation timed out".to_string())),
        MemoryRepository::default(),
    );
    assert!(locator.locate("work-1").await.is_none());
}

#[tokio::test]
async fn test_repository_failure_is_not_found() {
    let locator = ResourceLocator::new(
        MemoryCatalog::default().with_record("work-1", "4x51hj00j"),
        MemoryRepository::unavailable(LookupError::MalformedResponse(
            "expected JSON array".to_string(),
        )),
    );
    assert!(locator.locate("work-1").await.is_none());
}

#[tokio::test]
async fn test_credentials_attached_when_configured() {
    let locator = ResourceLocator::new(
        MemoryCatalog::default().with_record("work-1", "img"),
        MemoryRepository::default().with_file("img", "http://repo/img/files/f1"),
    )
    .with_credentials("fedoraAdmin", "fedoraSecret");

    let resolved = locator.locate("work-1").await.unwrap();
    assert_eq!(resolved.username.as_deref(), Some("fedoraAdmin"));
    assert_eq!(resolved.secret.as_deref(), Some("fedoraSecret"));
}

// =============================================================================
// Repository URL Composition
// =============================================================================

#[test]
fn test_repository_url_matches_pairtree_convention() {
    let client = RepositoryClient::new(
        "http://fedora:8080",
        "/fcrepo/rest/prod",
        Duration::from_secs(5),
    )
    .unwrap();

    assert_eq!(
        client.resource_url("4x51hj00j"),
        "http://fedora:8080/fcrepo/rest/prod/4x/51/hj/00/4x51hj00j"
    );
}

#[test]
fn test_pairtree_segments() {
    assert_eq!(pairtree("4x51hj00j"), vec!["4x", "51", "hj", "00"]);
}

// =============================================================================
// Source Routing
// =============================================================================

#[test]
fn test_source_routing() {
    let router = SourceRouter::default();
    assert_eq!(router.route("Masters/box12/folder3.tif"), "FilesystemSource");
    assert_eq!(router.route("4x51hj00j"), "HttpSource");

    let s3 = SourceRouter::new("Masters/", "FilesystemSource", "S3Source");
    assert_eq!(s3.route("4x51hj00j"), "S3Source");
}
