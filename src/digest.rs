//! Content digest using BLAKE3 hashing
//!
//! The digest identifies the exact bytes that were classified, so callers can
//! de-duplicate content and key persisted records without re-reading files.
//!
//! # Algorithm
//!
//! 1. Hash the content bytes using BLAKE3
//! 2. Take the first 128 bits (16 bytes) of the hash
//! 3. Encode as lower-case hexadecimal
//!
//! # Example
//!
//! ```
//! use content_classifier::digest::content_digest;
//!
//! let digest = content_digest(b"# Hello World");
//! assert_eq!(digest.len(), 32);
//! assert_eq!(digest, content_digest(b"# Hello World"));
//! ```

/// Number of hash bytes kept in the digest
const DIGEST_BYTES: usize = 16;

/// Hex digest of the first 128 bits of the BLAKE3 hash of `content`
pub fn content_digest(content: &[u8]) -> String {
    let hash = blake3::hash(content);
    hex::encode(&hash.as_bytes()[..DIGEST_BYTES])
}
