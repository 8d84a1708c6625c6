use aes_gcm::aead::rand_core::RngCore;
use aes_gcm::{
    Aes256Gcm, Nonce,
    aead::{Aead, KeyInit, OsRng},
};
use base64::{Engine as _, engine::general_purpose};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::{Result, SecurityError};

/// The size of the AES-256 key in bytes.
pub const KEY_SIZE: usize = 32;
/// The size of the AES-GCM nonce in bytes.
pub const NONCE_SIZE: usize = 12;

/// A secure key wrapper that ensures the key is zeroized on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct SecureKey([u8; KEY_SIZE]);

impl SecureKey {
    /// Creates a new `SecureKey` from a byte array.
    ///
    /// # Arguments
    ///
    /// * `key` - A 32-byte array representing the AES-256 key.
    pub fn new(key: [u8; KEY_SIZE]) -> Self {
        Self(key)
    }

    /// Creates a `SecureKey` from an arbitrary byte slice.
    ///
    /// # Returns
    ///
    /// An error if the slice is not exactly 32 bytes.
    pub fn from_slice(key: &[u8]) -> Result<Self> {
        let array: [u8; KEY_SIZE] = key
            .try_into()
            .map_err(|_| SecurityError::Crypto("Invalid key size".to_string()))?;
        Ok(Self(array))
    }

    /// Returns a reference to the key as a byte slice.
    pub fn as_bytes(&self) -> &[u8; KEY_SIZE] {
        &self.0
    }
}

/// Generates a new random AES-256 key.
///
/// # Returns
///
/// A `SecureKey` containing the generated key.
pub fn generate_key() -> SecureKey {
    let mut key = [0u8; KEY_SIZE];
    OsRng.fill_bytes(&mut key);
    SecureKey::new(key)
}

/// Generates a new random AES-GCM nonce.
///
/// # Returns
///
/// A 12-byte array representing the nonce.
pub fn generate_nonce() -> [u8; NONCE_SIZE] {
    let mut nonce = [0u8; NONCE_SIZE];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// Encrypts a plaintext string using AES-256-GCM.
///
/// The wire form is `base64(nonce || ciphertext)` so a single string can be
/// stored and later decrypted without tracking the nonce separately.
///
/// # Arguments
///
/// * `key` - The AES-256 application key.
/// * `plaintext` - The text to encrypt.
///
/// # Returns
///
/// The base64-encoded ciphertext.
pub fn encrypt(key: &SecureKey, plaintext: &str) -> Result<String> {
    let cipher = Aes256Gcm::new(key.as_bytes().into());

    let nonce_bytes = generate_nonce();
    let nonce = Nonce::from(nonce_bytes);

    let ciphertext = cipher
        .encrypt(&nonce, plaintext.as_bytes())
        .map_err(|e| SecurityError::Crypto(format!("Encryption failed: {}", e)))?;

    let mut wire = Vec::with_capacity(NONCE_SIZE + ciphertext.len());
    wire.extend_from_slice(&nonce_bytes);
    wire.extend_from_slice(&ciphertext);

    Ok(general_purpose::STANDARD.encode(wire))
}

/// Decrypts a `base64(nonce || ciphertext)` string using AES-256-GCM.
///
/// # Arguments
///
/// * `key` - The AES-256 application key.
/// * `encoded` - The base64 wire form produced by [`encrypt`].
///
/// # Returns
///
/// The decrypted plaintext.
pub fn decrypt(key: &SecureKey, encoded: &str) -> Result<String> {
    let wire = general_purpose::STANDARD
        .decode(encoded)
        .map_err(|e| SecurityError::Crypto(format!("Invalid ciphertext encoding: {}", e)))?;

    if wire.len() <= NONCE_SIZE {
        return Err(SecurityError::Crypto("Ciphertext too short".to_string()));
    }

    let (nonce_bytes, ciphertext) = wire.split_at(NONCE_SIZE);
    let nonce_array: [u8; NONCE_SIZE] = nonce_bytes
        .try_into()
        .map_err(|_| SecurityError::Crypto("Invalid nonce".to_string()))?;
    let nonce = Nonce::from(nonce_array);

    let cipher = Aes256Gcm::new(key.as_bytes().into());
    let plaintext = cipher
        .decrypt(&nonce, ciphertext)
        .map_err(|e| SecurityError::Crypto(format!("Decryption failed: {}", e)))?;

    String::from_utf8(plaintext)
        .map_err(|e| SecurityError::Crypto(format!("Decrypted data is not UTF-8: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encrypt_decrypt_roundtrip() {
        let key = generate_key();
        let ciphertext = encrypt(&key, "sensitive payload").unwrap();
        assert_ne!(ciphertext, "sensitive payload");
        assert_eq!(decrypt(&key, &ciphertext).unwrap(), "sensitive payload");
    }

    #[test]
    fn test_decrypt_wrong_key_fails() {
        let key = generate_key();
        let other = generate_key();
        let ciphertext = encrypt(&key, "payload").unwrap();
        assert!(matches!(
            decrypt(&other, &ciphertext),
            Err(SecurityError::Crypto(_))
        ));
    }

    #[test]
    fn test_decrypt_garbage_fails() {
        let key = generate_key();
        assert!(decrypt(&key, "not base64 at all!!!").is_err());
        assert!(decrypt(&key, "AAAA").is_err());
    }
}
