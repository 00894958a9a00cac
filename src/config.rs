//! Configuration management for the gatekeeper.
//!
//! Configuration is process-wide, loaded once at startup, and immutable
//! afterwards; no component reads live environment state per request.
//! Options come from the command line via clap with `IIIF_`-prefixed
//! environment-variable fallbacks and built-in defaults.
//!
//! # Environment Variables
//!
//! - `IIIF_CIPHER_KEY` - 32-byte shared decryption key (required)
//! - `IIIF_CHALLENGE_URL` - where clients (re-)authenticate (required)
//! - `IIIF_CATALOG_URL` - catalog base URL, including the core name (required)
//! - `IIIF_REPOSITORY_URL` - repository base URL (required)
//! - `IIIF_REPOSITORY_ROOT` - repository root path (default: empty)
//! - `IIIF_AUTH_COOKIE` - session cookie name (default: sinai_authenticated)
//! - `IIIF_SESSION_TOKEN` - expected plaintext prefix (default: Authenticated)
//! - `IIIF_ALLOWED_IPS` - comma-separated trusted client IPs
//! - `IIIF_MAX_PCT` - highest allowed pct: size (default: 79)
//! - `IIIF_WIDTH_RATIO` - allowed fraction of source width (default: 0.5)
//! - `IIIF_ORIGINALS_PREFIX` - local-storage namespace (default: Masters/)
//! - `IIIF_NETWORK_SOURCE` - networked source name (default: HttpSource)
//! - `IIIF_LOOKUP_TIMEOUT` - upstream lookup timeout in seconds (default: 10)

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};

use crate::auth::{Authorizer, QuotaLimits, Redirect, ResponseMode, KEY_LEN};
use crate::error::LookupError;
use crate::resolve::source::{DEFAULT_ORIGINALS_PREFIX, FILESYSTEM_SOURCE, HTTP_SOURCE};
use crate::resolve::{CatalogClient, RepositoryClient, ResourceLocator, SourceRouter};

// =============================================================================
// Default Values
// =============================================================================

/// Default session cookie name.
pub const DEFAULT_AUTH_COOKIE: &str = crate::auth::DEFAULT_AUTH_COOKIE;

/// Default expected plaintext session token.
pub const DEFAULT_SESSION_TOKEN: &str = "Authenticated";

/// Default upstream lookup timeout in seconds.
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 10;

/// Default redirect status when a redirect rule is configured.
pub const DEFAULT_REDIRECT_STATUS: u16 = 302;

// =============================================================================
// CLI
// =============================================================================

/// IIIF Gatekeeper - authorization and source resolution for image delivery.
#[derive(Parser, Debug, Clone)]
#[command(name = "iiif-gatekeeper")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub config: Config,

    #[command(subcommand)]
    pub command: Command,
}

/// Operator subcommands.
#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Evaluate a JSON request context and print the wire verdict.
    Authorize {
        /// Path to a request-context JSON file; reads stdin when omitted.
        context: Option<PathBuf>,
    },

    /// Resolve an identifier to its backend resource.
    Resolve {
        /// The item identifier to resolve.
        identifier: String,
    },

    /// Print the pairtree path for an identifier.
    Pairtree {
        /// The identifier to split.
        identifier: String,
    },
}

// =============================================================================
// Configuration
// =============================================================================

/// Process-wide gatekeeper configuration.
#[derive(Args, Debug, Clone)]
pub struct Config {
    // =========================================================================
    // Authentication Configuration
    // =========================================================================
    /// Shared decryption key; must be exactly 32 bytes.
    #[arg(long, env = "IIIF_CIPHER_KEY", hide_env_values = true)]
    pub cipher_key: String,

    /// URL clients are challenged to authenticate at.
    #[arg(long, env = "IIIF_CHALLENGE_URL")]
    pub challenge_url: String,

    /// Name of the encrypted session cookie.
    #[arg(long, default_value = DEFAULT_AUTH_COOKIE, env = "IIIF_AUTH_COOKIE")]
    pub auth_cookie: String,

    /// Expected plaintext prefix of a valid session.
    #[arg(long, default_value = DEFAULT_SESSION_TOKEN, env = "IIIF_SESSION_TOKEN")]
    pub session_token: String,

    /// Trusted client IPs that bypass cookie authentication (comma-separated).
    #[arg(long, env = "IIIF_ALLOWED_IPS", value_delimiter = ',')]
    pub allowed_ips: Vec<String>,

    // =========================================================================
    // Quota Configuration
    // =========================================================================
    /// Highest allowed `pct:` size request.
    #[arg(long, default_value_t = 79, env = "IIIF_MAX_PCT")]
    pub max_pct: u32,

    /// Fraction of the source width a request may ask for.
    #[arg(long, default_value_t = 0.5, env = "IIIF_WIDTH_RATIO")]
    pub width_ratio: f64,

    // =========================================================================
    // Resolution Configuration
    // =========================================================================
    /// Catalog base URL, including the core name.
    #[arg(long, env = "IIIF_CATALOG_URL")]
    pub catalog_url: String,

    /// Repository base URL.
    #[arg(long, env = "IIIF_REPOSITORY_URL")]
    pub repository_url: String,

    /// Repository root path beneath the base URL.
    #[arg(long, default_value = "", env = "IIIF_REPOSITORY_ROOT")]
    pub repository_root: String,

    /// Username for repository access, when the backend requires one.
    #[arg(long, env = "IIIF_REPOSITORY_USERNAME")]
    pub repository_username: Option<String>,

    /// Secret for repository access, when the backend requires one.
    #[arg(long, env = "IIIF_REPOSITORY_SECRET", hide_env_values = true)]
    pub repository_secret: Option<String>,

    /// Upstream lookup timeout in seconds. Lookups are never retried.
    #[arg(long, default_value_t = DEFAULT_LOOKUP_TIMEOUT_SECS, env = "IIIF_LOOKUP_TIMEOUT")]
    pub lookup_timeout: u64,

    // =========================================================================
    // Source Routing Configuration
    // =========================================================================
    /// Identifier prefix served from local filesystem storage.
    #[arg(long, default_value = DEFAULT_ORIGINALS_PREFIX, env = "IIIF_ORIGINALS_PREFIX")]
    pub originals_prefix: String,

    /// Source name for identifiers under the originals prefix.
    #[arg(long, default_value = FILESYSTEM_SOURCE, env = "IIIF_FILESYSTEM_SOURCE")]
    pub filesystem_source: String,

    /// Source name for all other identifiers (HTTP or object storage).
    #[arg(long, default_value = HTTP_SOURCE, env = "IIIF_NETWORK_SOURCE")]
    pub network_source: String,

    // =========================================================================
    // Verdict and Redirect Configuration
    // =========================================================================
    /// Emit boolean-only verdicts instead of the rich challenge shape.
    #[arg(long, default_value_t = false, env = "IIIF_SIMPLE_VERDICTS")]
    pub simple_verdicts: bool,

    /// Redirect all image requests to this location (deployment hook).
    #[arg(long, env = "IIIF_REDIRECT_LOCATION")]
    pub redirect_location: Option<String>,

    /// Status code for the configured redirect, 300-399.
    #[arg(long, default_value_t = DEFAULT_REDIRECT_STATUS, env = "IIIF_REDIRECT_STATUS")]
    pub redirect_status: u16,

    // =========================================================================
    // Logging Configuration
    // =========================================================================
    /// Enable verbose logging (debug level).
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,
}

impl Config {
    /// Validate the configuration and return an error message if invalid.
    ///
    /// Called once at process start; a failure here is fatal.
    pub fn validate(&self) -> Result<(), String> {
        if self.cipher_key.len() != KEY_LEN {
            return Err(format!(
                "cipher_key must be exactly {} bytes, got {}. Set --cipher-key or IIIF_CIPHER_KEY",
                KEY_LEN,
                self.cipher_key.len()
            ));
        }

        if self.challenge_url.is_empty() {
            return Err(
                "challenge_url is required. Set --challenge-url or IIIF_CHALLENGE_URL".to_string(),
            );
        }

        if self.catalog_url.is_empty() {
            return Err("catalog_url is required. Set --catalog-url or IIIF_CATALOG_URL".to_string());
        }

        if self.repository_url.is_empty() {
            return Err(
                "repository_url is required. Set --repository-url or IIIF_REPOSITORY_URL"
                    .to_string(),
            );
        }

        if self.max_pct > 100 {
            return Err("max_pct must be between 0 and 100".to_string());
        }

        if !(self.width_ratio > 0.0 && self.width_ratio <= 1.0) {
            return Err("width_ratio must be within (0, 1]".to_string());
        }

        if self.lookup_timeout == 0 {
            return Err("lookup_timeout must be greater than 0".to_string());
        }

        if self.redirect_location.is_some() && !(300..=399).contains(&self.redirect_status) {
            return Err("redirect_status must be between 300 and 399".to_string());
        }

        Ok(())
    }

    /// The shared key as fixed-size bytes (call `validate()` first).
    pub fn key(&self) -> Result<[u8; KEY_LEN], String> {
        self.cipher_key
            .as_bytes()
            .try_into()
            .map_err(|_| format!("cipher_key must be exactly {} bytes", KEY_LEN))
    }

    /// The upstream lookup timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.lookup_timeout)
    }

    /// Which wire shape verdicts take.
    pub fn response_mode(&self) -> ResponseMode {
        if self.simple_verdicts {
            ResponseMode::Simple
        } else {
            ResponseMode::Rich
        }
    }

    /// Build the authorization engine from this configuration.
    pub fn authorizer(&self) -> Result<Authorizer, String> {
        let mut authorizer = Authorizer::new(self.key()?, &self.challenge_url)
            .with_auth_cookie(&self.auth_cookie)
            .with_session_token(&self.session_token)
            .with_allow_list(self.allowed_ips.iter().cloned())
            .with_limits(QuotaLimits {
                max_pct: self.max_pct,
                width_ratio: self.width_ratio,
            });

        if let Some(location) = &self.redirect_location {
            authorizer = authorizer.with_redirect_rule(Redirect {
                location: location.clone(),
                status_code: self.redirect_status,
            });
        }

        Ok(authorizer)
    }

    /// Build the source router from this configuration.
    pub fn source_router(&self) -> SourceRouter {
        SourceRouter::new(
            &self.originals_prefix,
            &self.filesystem_source,
            &self.network_source,
        )
    }

    /// Build the two-hop resource locator from this configuration.
    pub fn locator(&self) -> Result<ResourceLocator<CatalogClient, RepositoryClient>, LookupError> {
        let catalog = CatalogClient::new(&self.catalog_url, self.timeout())?;
        let repository =
            RepositoryClient::new(&self.repository_url, &self.repository_root, self.timeout())?;

        let mut locator = ResourceLocator::new(catalog, repository);
        if let (Some(username), Some(secret)) = (&self.repository_username, &self.repository_secret)
        {
            locator = locator.with_credentials(username, secret);
        }
        Ok(locator)
    }
}

// =============================================================================
// Tests
// =============================================================================
