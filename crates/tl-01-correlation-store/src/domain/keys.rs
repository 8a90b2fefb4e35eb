//! # Key Encoding
//!
//! Maps `(namespace, key)` pairs onto a flat byte keyspace, level-style:
//! `!<namespace>!<key>`. Namespaces may not contain the separator; keys may.

use super::errors::StoreError;

/// Separator between namespace and key.
pub const SEPARATOR: char = '!';

/// Check that a namespace can be encoded unambiguously.
pub fn validate_namespace(namespace: &str) -> Result<(), StoreError> {
    if namespace.is_empty() || namespace.contains(SEPARATOR) {
        return Err(StoreError::InvalidNamespace(namespace.to_string()));
    }
    Ok(())
}

/// Prefix shared by every key of a namespace.
pub fn namespace_prefix(namespace: &str) -> Vec<u8> {
    format!("{SEPARATOR}{namespace}{SEPARATOR}").into_bytes()
}

/// Encode a namespaced key.
pub fn encode_key(namespace: &str, key: &str) -> Vec<u8> {
    let mut out = namespace_prefix(namespace);
    out.extend_from_slice(key.as_bytes());
    out
}

/// Decode a raw key back into its key part, if it belongs to `namespace`.
pub fn decode_key(namespace: &str, raw: &[u8]) -> Option<String> {
    let prefix = namespace_prefix(namespace);
    raw.strip_prefix(prefix.as_slice())
        .and_then(|rest| std::str::from_utf8(rest).ok())
        .map(str::to_string)
}
