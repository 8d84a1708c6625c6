use sha2::{Digest, Sha256};

/// Computes a deterministic one-way SHA-256 digest of `text`.
///
/// # Returns
///
/// The digest as a lowercase hex string (64 characters).
pub fn hash(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        assert_eq!(hash("fingerprint input"), hash("fingerprint input"));
        assert_ne!(hash("a"), hash("b"));
        assert_eq!(hash("x").len(), 64);
    }
}
