//! Authorization engine.
//!
//! Combines three independent trust signals into one deterministic verdict
//! per request:
//!
//! - an encrypted session cookie (AES-256-CBC under a shared key, IV
//!   supplied by a companion cookie),
//! - the proxy-supplied client IP against a configured allow list,
//! - region/size quota rules over the IIIF request path.
//!
//! The decision lattice is terminal on the first matching rule:
//!
//! 1. Discovery request (no `full_size`) ⇒ allowed.
//! 2. Forwarded client IP in the allow list ⇒ allowed.
//! 3. Either required cookie missing ⇒ denied with challenge.
//! 4. Decryption fails or plaintext does not carry the session token ⇒
//!    denied with challenge.
//! 5. Authenticated but over quota ⇒ denied, no challenge.
//! 6. Otherwise ⇒ allowed.
//!
//! Step 5 carries no challenge deliberately: the client is already
//! authenticated, so re-prompting for credentials cannot make the request
//! acceptable.

pub mod cookies;
pub mod crypto;
pub mod ip;
pub mod quota;

use std::collections::HashSet;

use serde::Serialize;
use serde_json::json;
use tracing::debug;

use crate::context::RequestContext;
use crate::error::CryptoError;

pub use crypto::{IV_LEN, KEY_LEN};
pub use quota::QuotaLimits;

/// Default name of the cookie carrying the encrypted session.
pub const DEFAULT_AUTH_COOKIE: &str = "sinai_authenticated";

/// Name of the cookie carrying the per-session initialization vector.
pub const IV_COOKIE: &str = "initialization_vector";

// =============================================================================
// Verdict
// =============================================================================

/// Outcome of an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The request may proceed.
    Allowed,

    /// The request is refused outright. Used for authenticated clients
    /// whose specific request breaks a quota rule.
    Denied,

    /// The request is refused and the client should authenticate at the
    /// challenge URL.
    DeniedWithChallenge {
        /// Where the client should (re-)authenticate.
        challenge: String,
    },
}

/// Which wire shape the host expects for verdicts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResponseMode {
    /// Boolean-only verdicts.
    Simple,

    /// Booleans, except challenges become
    /// `[false, {"challenge": <url>, "status_code": 401}]`.
    #[default]
    Rich,
}

impl Verdict {
    /// Whether the request may proceed.
    pub fn is_allowed(&self) -> bool {
        matches!(self, Verdict::Allowed)
    }

    /// Adapt the verdict to the host's wire shape.
    pub fn to_wire(&self, mode: ResponseMode) -> serde_json::Value {
        match (self, mode) {
            (Verdict::Allowed, _) => json!(true),
            (Verdict::Denied, _) => json!(false),
            (Verdict::DeniedWithChallenge { .. }, ResponseMode::Simple) => json!(false),
            (Verdict::DeniedWithChallenge { challenge }, ResponseMode::Rich) => {
                json!([false, { "challenge": challenge, "status_code": 401 }])
            }
        }
    }
}

/// A redirect instruction for the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Redirect {
    /// Target URI.
    pub location: String,

    /// HTTP status code, 300..399.
    pub status_code: u16,
}

// =============================================================================
// Authorizer
// =============================================================================

/// Per-process authorization engine.
///
/// Holds only immutable configuration (shared key, cookie names, allow
/// list, quota limits), so a single instance is safe to share across
/// threads; every call re-evaluates the request from scratch.
#[derive(Clone)]
pub struct Authorizer {
    key: [u8; KEY_LEN],
    challenge_url: String,
    auth_cookie: String,
    iv_cookie: String,
    session_token: String,
    allow_list: HashSet<String>,
    limits: QuotaLimits,
    redirect_rule: Option<Redirect>,
}

impl Authorizer {
    /// Create an engine with the shared decryption key and challenge URL.
    ///
    /// Cookie names, session token, allow list, and quota limits start at
    /// their defaults; use the `with_*` methods to override.
    pub fn new(key: [u8; KEY_LEN], challenge_url: impl Into<String>) -> Self {
        Self {
            key,
            challenge_url: challenge_url.into(),
            auth_cookie: DEFAULT_AUTH_COOKIE.to_string(),
            iv_cookie: IV_COOKIE.to_string(),
            session_token: "Authenticated".to_string(),
            allow_list: HashSet::new(),
            limits: QuotaLimits::default(),
            redirect_rule: None,
        }
    }

    /// Override the name of the encrypted session cookie.
    pub fn with_auth_cookie(mut self, name: impl Into<String>) -> Self {
        self.auth_cookie = name.into();
        self
    }

    /// Override the name of the IV cookie.
    pub fn with_iv_cookie(mut self, name: impl Into<String>) -> Self {
        self.iv_cookie = name.into();
        self
    }

    /// Override the expected plaintext session token.
    pub fn with_session_token(mut self, token: impl Into<String>) -> Self {
        self.session_token = token.into();
        self
    }

    /// Set the trusted-network IP allow list.
    pub fn with_allow_list(mut self, ips: impl IntoIterator<Item = String>) -> Self {
        self.allow_list = ips.into_iter().collect();
        self
    }

    /// Set the quota limits.
    pub fn with_limits(mut self, limits: QuotaLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Configure a deployment-specific redirect rule.
    pub fn with_redirect_rule(mut self, redirect: Redirect) -> Self {
        self.redirect_rule = Some(redirect);
        self
    }

    /// Decide whether the request is authorized.
    pub fn authorize(&self, ctx: &RequestContext) -> Verdict {
        // 1. Discovery documents carry no pixel payload to protect.
        let Some(full_size) = ctx.full_size else {
            return Verdict::Allowed;
        };

        // 2. Requests from the trusted network bypass cookie checks.
        if ip::is_allowed(&ctx.request_headers, &self.allow_list) {
            debug!(identifier = %ctx.identifier, "Allowed via trusted network");
            return Verdict::Allowed;
        }

        // 3. Both cookies are required from here on.
        let cookies = cookies::extract(&ctx.cookies);
        let (Some(iv), Some(ciphertext)) =
            (cookies.get(&self.iv_cookie), cookies.get(&self.auth_cookie))
        else {
            debug!(identifier = %ctx.identifier, "Missing session cookies");
            return self.challenge();
        };

        // 4. Decode, decrypt, and match the session token. Decoding and
        // decryption failures are logged apart but answered identically.
        match crypto::decrypt_hex(&self.key, iv, ciphertext) {
            Ok(plaintext) if crypto::verify_session(&plaintext, &self.session_token) => {}
            Ok(_) => {
                debug!(identifier = %ctx.identifier, "Session token mismatch");
                return self.challenge();
            }
            Err(CryptoError::Decoding(reason)) => {
                debug!(identifier = %ctx.identifier, %reason, "Undecodable session cookies");
                return self.challenge();
            }
            Err(CryptoError::Decryption) => {
                debug!(identifier = %ctx.identifier, "Session cookie failed decryption");
                return self.challenge();
            }
        }

        // 5. Authenticated; still subject to quota.
        let uri = ctx.request_uri.as_deref().unwrap_or("");
        if quota::is_over_quota(uri, full_size.width, self.limits) {
            debug!(identifier = %ctx.identifier, uri, "Denied by quota");
            return Verdict::Denied;
        }

        Verdict::Allowed
    }

    /// Whether the host should redirect instead of serving the request.
    ///
    /// Returns `None` unless a deployment-specific rule was configured.
    /// Never fails.
    pub fn redirect(&self, _ctx: &RequestContext) -> Option<Redirect> {
        self.redirect_rule.clone()
    }

    fn challenge(&self) -> Verdict {
        Verdict::DeniedWithChallenge {
            challenge: self.challenge_url.clone(),
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
