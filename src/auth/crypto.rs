//! Session-cookie decryption.
//!
//! Authenticated sessions arrive as two cookies: an initialization vector
//! and a ciphertext, both hex-encoded. The ciphertext is AES-256-CBC with
//! PKCS7 padding under a process-wide shared key; a session is valid when
//! the plaintext starts with the configured session token.
//!
//! # Security Properties
//!
//! - Malformed hex and failed decryption produce distinct [`CryptoError`]
//!   variants for logging, but callers must collapse them into a single
//!   unauthenticated outcome so the response carries no oracle.
//! - The session-token check uses constant-time comparison to prevent
//!   timing attacks on the plaintext prefix.

use aes::cipher::block_padding::Pkcs7;
use aes::cipher::{BlockDecryptMut, KeyIvInit};
use subtle::ConstantTimeEq;

use crate::error::CryptoError;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// AES-CBC block size; the decoded IV must be exactly this long.
pub const IV_LEN: usize = 16;

/// Required shared-key length (AES-256).
pub const KEY_LEN: usize = 32;

/// Decrypt hex-encoded cookie material.
///
/// Both `iv_hex` and `ciphertext_hex` are accepted case-insensitively
/// (the wire form is uppercase hex). Fails with [`CryptoError::Decoding`]
/// before any decryption is attempted when either value is malformed.
pub fn decrypt_hex(
    key: &[u8; KEY_LEN],
    iv_hex: &str,
    ciphertext_hex: &str,
) -> Result<Vec<u8>, CryptoError> {
    let iv = hex::decode(iv_hex).map_err(|_| CryptoError::Decoding("invalid IV hex".into()))?;
    if iv.len() != IV_LEN {
        return Err(CryptoError::Decoding(format!(
            "IV must decode to {} bytes, got {}",
            IV_LEN,
            iv.len()
        )));
    }

    let ciphertext = hex::decode(ciphertext_hex)
        .map_err(|_| CryptoError::Decoding("invalid ciphertext hex".into()))?;
    if ciphertext.is_empty() || ciphertext.len() % IV_LEN != 0 {
        return Err(CryptoError::Decoding(format!(
            "ciphertext length {} is not a whole number of blocks",
            ciphertext.len()
        )));
    }

    decrypt(key, &iv, &ciphertext)
}

/// Decrypt raw AES-256-CBC ciphertext with PKCS7 padding.
///
/// Wrong key, wrong IV, and corrupted ciphertext all surface as the same
/// [`CryptoError::Decryption`].
pub fn decrypt(key: &[u8; KEY_LEN], iv: &[u8], ciphertext: &[u8]) -> Result<Vec<u8>, CryptoError> {
    let cipher = Aes256CbcDec::new_from_slices(key, iv).map_err(|_| CryptoError::Decryption)?;
    cipher
        .decrypt_padded_vec_mut::<Pkcs7>(ciphertext)
        .map_err(|_| CryptoError::Decryption)
}

/// Whether a decrypted plaintext matches the authenticated-session pattern.
///
/// The session issuer encrypts the token followed by free text, so the
/// pattern is a prefix match. The comparison over the token bytes is
/// constant time.
pub fn verify_session(plaintext: &[u8], token: &str) -> bool {
    let token = token.as_bytes();
    if token.is_empty() || plaintext.len() < token.len() {
        return false;
    }
    plaintext[..token.len()].ct_eq(token).into()
}

// =============================================================================
// Tests
// =============================================================================
