use thiserror::Error;

/// Errors that can occur while decrypting cookie-carried session material.
///
/// The authorization engine never surfaces these to the client: both
/// variants collapse into the same unauthenticated outcome so that a
/// malformed cookie and a wrong key are indistinguishable to a caller
/// probing the endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CryptoError {
    /// The wire representation is not valid hex, or the decoded IV is not
    /// 16 bytes / the ciphertext is not a whole number of blocks.
    #[error("Malformed cookie material: {0}")]
    Decoding(String),

    /// Decryption failed: wrong key, wrong IV, or corrupted padding.
    #[error("Decryption failed")]
    Decryption,
}

/// Errors from the catalog and repository lookups.
///
/// These exist for logging only. The resource locator collapses every
/// variant into a "not found" result before the host sees it.
#[derive(Debug, Clone, Error)]
pub enum LookupError {
    /// Network failure, timeout, or other transport-level error.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Upstream answered with a non-200 status.
    #[error("Upstream returned status {0}")]
    Status(u16),

    /// Response body was not the expected JSON shape.
    #[error("Malformed upstream response: {0}")]
    MalformedResponse(String),

    /// The response parsed but contained no matching record.
    #[error("No record for identifier: {0}")]
    NoRecord(String),
}
