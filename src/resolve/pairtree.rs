//! Pairtree path derivation.
//!
//! The backing repository shards resources into nested directories named
//! after consecutive two-character chunks of the identifier, keeping only
//! the first four chunks. The derivation must match the repository's own
//! convention exactly: a divergent path is a 404, so the tests here pin
//! the output byte for byte.

/// Maximum number of pairtree segments.
pub const MAX_SEGMENTS: usize = 4;

/// Split an identifier into its pairtree segments.
///
/// Consecutive 2-character chunks from index 0, empty chunks dropped,
/// truncated to the first four. Operates on characters, so multibyte
/// identifiers cannot split a code point.
pub fn pairtree(identifier: &str) -> Vec<String> {
    let chars: Vec<char> = identifier.chars().collect();
    chars
        .chunks(2)
        .map(|chunk| chunk.iter().collect::<String>())
        .filter(|segment| !segment.is_empty())
        .take(MAX_SEGMENTS)
        .collect()
}

/// Pairtree segments joined with `/`, ready for URL composition.
pub fn pairtree_path(identifier: &str) -> String {
    pairtree(identifier).join("/")
}

// =============================================================================
// Tests
// =============================================================================
