//! Project API key generation and hashing.
//!
//! Field devices authenticate ingest requests with their project's API key
//! (`x-api-key` header). Only the SHA-256 digest is stored; the plaintext is
//! returned once when the key is created or regenerated.

use rand::Rng;

/// Number of random bytes in a key (hex-encoded to twice as many characters).
pub const KEY_BYTES: usize = 32;

/// Number of leading characters kept as a human-visible prefix.
pub const KEY_PREFIX_LENGTH: usize = 8;

/// The result of generating a new project API key.
pub struct GeneratedApiKey {
    /// The plaintext key (shown to the caller exactly once, never stored).
    pub plaintext: String,
    /// The first [`KEY_PREFIX_LENGTH`] characters, for display in listings.
    pub prefix: String,
    /// The SHA-256 hex digest of the plaintext key (stored in the database).
    pub hash: String,
}

/// Generate a new random project API key.
pub fn generate_api_key() -> GeneratedApiKey {
    let mut bytes = [0u8; KEY_BYTES];
    rand::rng().fill(&mut bytes);

    let plaintext: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
    let prefix = extract_prefix(&plaintext).to_string();
    let hash = hash_api_key(&plaintext);

    GeneratedApiKey {
        plaintext,
        prefix,
        hash,
    }
}

/// Compute the SHA-256 hex digest of an API key.
///
/// Used both when storing a key and when looking one up during ingest.
pub fn hash_api_key(key: &str) -> String {
    crate::hashing::sha256_hex(key.as_bytes())
}

/// Extract the display prefix from a plaintext API key.
pub fn extract_prefix(key: &str) -> &str {
    &key[..KEY_PREFIX_LENGTH.min(key.len())]
}
