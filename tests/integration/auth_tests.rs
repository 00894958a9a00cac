//! Authorization integration tests.
//!
//! Tests verify, against real AES-256-CBC cookie material:
//! - Missing or irrelevant cookies are challenged
//! - Valid cookies authenticate; any flipped hex character does not
//! - The trusted-IP bypass and the discovery-request bypass
//! - Quota rules and their exact boundaries for authenticated clients
//! - Both wire shapes for the verdict

use serde_json::json;

use iiif_gatekeeper::{Authorizer, RequestContext, ResponseMode, Verdict};

use super::test_utils::{
    auth_cookie_value, authenticated_context, flip_hex_char, image_context, iv_cookie_value,
    CHALLENGE_URL, TEST_KEY,
};

fn engine() -> Authorizer {
    Authorizer::new(TEST_KEY, CHALLENGE_URL)
}

fn challenge() -> Verdict {
    Verdict::DeniedWithChallenge {
        challenge: CHALLENGE_URL.to_string(),
    }
}

// =============================================================================
// Cookie Authentication
// =============================================================================

#[test]
fn test_no_cookies_challenged() {
    let ctx = image_context("full", "pct:70", json!({}));
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_irrelevant_cookie_challenged() {
    let ctx = image_context("full", "pct:70", json!({ "nope": 0 }));
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_only_auth_cookie_challenged() {
    let ctx = image_context(
        "full",
        "pct:70",
        json!({ "sinai_authenticated": auth_cookie_value("Authenticated") }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_only_iv_cookie_challenged() {
    let ctx = image_context(
        "full",
        "pct:70",
        json!({ "initialization_vector": iv_cookie_value() }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_valid_cookies_allowed() {
    let ctx = authenticated_context("full", "pct:70");
    assert_eq!(engine().authorize(&ctx), Verdict::Allowed);
}

#[test]
fn test_cookies_as_raw_header_string_allowed() {
    let raw = format!(
        "initialization_vector={}; sinai_authenticated={}",
        iv_cookie_value(),
        auth_cookie_value("Authenticated")
    );
    let ctx = image_context("full", "pct:70", json!({ "Cookie": raw }));
    assert_eq!(engine().authorize(&ctx), Verdict::Allowed);
}

#[test]
fn test_wrong_session_token_challenged() {
    let ctx = image_context(
        "full",
        "pct:70",
        json!({
            "initialization_vector": iv_cookie_value(),
            "sinai_authenticated": auth_cookie_value("SomethingElse")
        }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_flipped_ciphertext_character_challenged() {
    let tampered = flip_hex_char(&auth_cookie_value("Authenticated"), 0);
    let ctx = image_context(
        "full",
        "pct:70",
        json!({
            "initialization_vector": iv_cookie_value(),
            "sinai_authenticated": tampered
        }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_flipped_iv_character_challenged() {
    let tampered = flip_hex_char(&iv_cookie_value(), 0);
    let ctx = image_context(
        "full",
        "pct:70",
        json!({
            "initialization_vector": tampered,
            "sinai_authenticated": auth_cookie_value("Authenticated")
        }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_non_hex_cookies_challenged() {
    let ctx = image_context(
        "full",
        "pct:70",
        json!({
            "initialization_vector": "abcdefghijklmnop",
            "sinai_authenticated": "not hex either"
        }),
    );
    assert_eq!(engine().authorize(&ctx), challenge());
}

#[test]
fn test_custom_cookie_name() {
    let engine = engine().with_auth_cookie("other_session");
    let ctx = image_context(
        "full",
        "pct:70",
        json!({
            "initialization_vector": iv_cookie_value(),
            "other_session": auth_cookie_value("Authenticated")
        }),
    );
    assert_eq!(engine.authorize(&ctx), Verdict::Allowed);
}

// =============================================================================
// Bypass Rules
// =============================================================================

#[test]
fn test_discovery_request_allowed_without_cookies() {
    let ctx: RequestContext = serde_json::from_value(json!({
        "identifier": "asdfasdf",
        "request_uri": "http://example.org/iiif/asdfasdf/info.json"
    }))
    .unwrap();
    assert_eq!(engine().authorize(&ctx), Verdict::Allowed);
}

#[test]
fn test_trusted_ip_allowed_without_cookies() {
    let mut ctx = image_context("full", "full", json!({}));
    ctx.request_headers
        .insert("X-Forwarded-For".to_string(), "10.9.8.7, 172.16.0.1".to_string());

    let engine = engine().with_allow_list(["10.9.8.7".to_string()]);
    assert_eq!(engine.authorize(&ctx), Verdict::Allowed);
}

#[test]
fn test_forwarded_proxy_hop_not_trusted() {
    let mut ctx = image_context("0,0,512,512", "400", json!({}));
    ctx.request_headers
        .insert("X-Forwarded-For".to_string(), "203.0.113.9, 10.9.8.7".to_string());

    let engine = engine().with_allow_list(["10.9.8.7".to_string()]);
    assert_eq!(engine.authorize(&ctx), challenge());
}

// =============================================================================
// Quota Rules (authenticated client)
// =============================================================================

#[test]
fn test_full_export_denied_without_challenge() {
    let verdict = engine().authorize(&authenticated_context("full", "full"));
    assert_eq!(verdict, Verdict::Denied);

    let verdict = engine().authorize(&authenticated_context("full", "max"));
    assert_eq!(verdict, Verdict::Denied);
}

#[test]
fn test_pct_boundary() {
    assert_eq!(
        engine().authorize(&authenticated_context("full", "pct:79")),
        Verdict::Allowed
    );
    assert_eq!(
        engine().authorize(&authenticated_context("full", "pct:80")),
        Verdict::Denied
    );
}

#[test]
fn test_width_boundary() {
    // Source width is 1024, so floor(0.5 * 1024) = 512 is the limit
    assert_eq!(
        engine().authorize(&authenticated_context("full", "512,")),
        Verdict::Allowed
    );
    assert_eq!(
        engine().authorize(&authenticated_context("full", "513,")),
        Verdict::Denied
    );
}

#[test]
fn test_constrained_region_allowed() {
    assert_eq!(
        engine().authorize(&authenticated_context("0,0,512,512", "512,512")),
        Verdict::Allowed
    );
}

// =============================================================================
// Wire Shapes
// =============================================================================

#[test]
fn test_rich_challenge_wire_shape() {
    let verdict = engine().authorize(&image_context("full", "pct:70", json!({})));
    assert_eq!(
        verdict.to_wire(ResponseMode::Rich),
        json!([false, { "challenge": CHALLENGE_URL, "status_code": 401 }])
    );
}

#[test]
fn test_simple_mode_collapses_to_booleans() {
    let challenged = engine().authorize(&image_context("full", "pct:70", json!({})));
    assert_eq!(challenged.to_wire(ResponseMode::Simple), json!(false));

    let allowed = engine().authorize(&authenticated_context("full", "pct:70"));
    assert_eq!(allowed.to_wire(ResponseMode::Simple), json!(true));

    let denied = engine().authorize(&authenticated_context("full", "full"));
    assert_eq!(denied.to_wire(ResponseMode::Rich), json!(false));
}
