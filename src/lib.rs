//! # IIIF Gatekeeper
//!
//! Access-control and source-resolution engine for an IIIF image-delivery
//! endpoint. The image host invokes this library synchronously per
//! request; it never owns a network listener itself.
//!
//! Given a per-request context, the engine decides:
//!
//! - whether the request is **authorized** (encrypted session cookies,
//!   a trusted-proxy IP allow list, and region/size quota rules combined
//!   into one deterministic verdict),
//! - whether the host should **redirect** instead,
//! - which backend **source** should serve the bytes,
//! - and where the concrete **resource** lives (a catalog hop for the
//!   related image id, then a repository hop for the file URI, composed
//!   over the identifier's pairtree).
//!
//! ## Architecture
//!
//! - [`context`] - Per-request context supplied by the host
//! - [`auth`] - Authorization engine and its cookie/crypto/IP/quota checks
//! - [`resolve`] - Pairtree, source routing, and the two-hop resource locator
//! - [`config`] - CLI and configuration types
//! - [`error`] - Crypto and lookup error taxonomies
//!
//! ## Example
//!
//! ```rust
//! use iiif_gatekeeper::{Authorizer, RequestContext, Verdict};
//!
//! let key = *b"an example key of thirty-two by!";
//! let authorizer = Authorizer::new(key, "https://auth.example.org/sign_in");
//!
//! // Discovery requests carry no pixel payload and are always allowed.
//! let ctx: RequestContext = serde_json::from_str(
//!     r#"{ "identifier": "4x51hj00j", "request_uri": "http://example.org/iiif/4x51hj00j/info.json" }"#,
//! ).unwrap();
//! assert_eq!(authorizer.authorize(&ctx), Verdict::Allowed);
//! ```
//!
//! All components are pure functions over their inputs plus immutable
//! process-wide configuration, so a single engine instance is safe to
//! share across a multi-threaded host. The only I/O is the locator's two
//! outbound lookups, which carry a bounded timeout and are never retried.

pub mod auth;
pub mod config;
pub mod context;
pub mod error;
pub mod resolve;

// Re-export commonly used types
pub use auth::{
    Authorizer, QuotaLimits, Redirect, ResponseMode, Verdict, DEFAULT_AUTH_COOKIE, IV_COOKIE,
};
pub use config::{Cli, Command, Config};
pub use context::{FullSize, RequestContext};
pub use error::{CryptoError, LookupError};
pub use resolve::{
    pairtree, pairtree_path, CatalogClient, CatalogLookup, RepositoryClient, RepositoryLookup,
    ResolvedSource, ResourceLocator, SourceRouter,
};
