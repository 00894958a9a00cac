//! Shared fixtures for integration tests.
//!
//! Provides real AES-256-CBC session-cookie material (the same scheme the
//! session issuer uses) and request-context builders, so the auth tests
//! can exercise the engine end to end without stubbing the crypto.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockEncryptMut, KeyIvInit};
use serde_json::{json, Value};

use iiif_gatekeeper::RequestContext;

type Aes256CbcEnc = cbc::Encryptor<aes::Aes256>;

/// Shared test key, 32 bytes.
pub const TEST_KEY: [u8; 32] = *b"0123456789abcdef0123456789abcdef";

/// Per-session IV, 16 bytes.
pub const TEST_IV: [u8; 16] = *b"abcdefghijklmnop";

/// Challenge URL used across the auth tests.
pub const CHALLENGE_URL: &str = "https://sinai-id.org/users/sign_in";

/// Hex wire form of the test IV, uppercase as the issuer emits it.
pub fn iv_cookie_value() -> String {
    hex::encode_upper(TEST_IV)
}

/// Encrypt a session plaintext the way the issuer does: the token plus
/// arbitrary trailing text, AES-256-CBC, uppercase hex.
pub fn auth_cookie_value(token: &str) -> String {
    let plaintext = format!("{} random stuff", token);
    let ciphertext = Aes256CbcEnc::new_from_slices(&TEST_KEY, &TEST_IV)
        .expect("fixture key and IV have the right lengths")
        .encrypt_padded_vec_mut::<Pkcs7>(plaintext.as_bytes());
    hex::encode_upper(ciphertext)
}

/// An image-request context for the given IIIF region and size.
pub fn image_context(region: &str, size: &str, cookies: Value) -> RequestContext {
    serde_json::from_value(json!({
        "identifier": "asdfasdf",
        "request_uri": format!("http://example.org/iiif/asdfasdf/{region}/{size}/0/default.jpg"),
        "full_size": { "width": "1024", "height": "1024" },
        "cookies": cookies
    }))
    .expect("fixture context deserializes")
}

/// A context holding both session cookies with valid values.
pub fn authenticated_context(region: &str, size: &str) -> RequestContext {
    image_context(
        region,
        size,
        json!({
            "initialization_vector": iv_cookie_value(),
            "sinai_authenticated": auth_cookie_value("Authenticated")
        }),
    )
}

/// Flip one hex character of a wire value, preserving hex validity.
pub fn flip_hex_char(value: &str, index: usize) -> String {
    let mut out: Vec<char> = value.chars().collect();
    out[index] = if out[index] == '0' { '1' } else { '0' };
    out.into_iter().collect()
}
