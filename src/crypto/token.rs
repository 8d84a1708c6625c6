use base64::{Engine as _, engine::general_purpose};
use rand::RngCore;
use rand::rngs::OsRng;

/// The size of the CSRF token in bytes.
const CSRF_TOKEN_SIZE: usize = 32;

/// Generates a random hex token of `length` characters.
///
/// Used for session tokens, MFA secrets, and other opaque credentials.
///
/// # Arguments
///
/// * `length` - The desired length of the hex string.
///
/// # Returns
///
/// A random hex string of exactly `length` characters.
pub fn generate_token(length: usize) -> String {
    let mut bytes = vec![0u8; length.div_ceil(2)];
    OsRng.fill_bytes(&mut bytes);

    let mut token = hex::encode(bytes);
    token.truncate(length);
    token
}

/// Generates a new random CSRF token.
///
/// # Returns
///
/// A URL-safe base64-encoded CSRF token.
pub fn generate_csrf_token() -> String {
    let mut token = [0u8; CSRF_TOKEN_SIZE];
    OsRng.fill_bytes(&mut token);

    general_purpose::URL_SAFE_NO_PAD.encode(token)
}
