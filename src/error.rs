use thiserror::Error;

/// The security subsystem's error type.
///
/// Policy violations (weak passwords, lockouts, failed logins) are NOT
/// errors; they are returned as data so callers can render explanatory
/// messages. Only genuine primitive failures live here.
#[derive(Error, Debug)]
pub enum SecurityError {
    /// An encryption or decryption failure.
    #[error("Crypto error: {0}")]
    Crypto(String),

    /// An I/O error from the backing store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization or deserialization failure.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// A network failure talking to the remote authentication API.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// A configuration error.
    #[error("Config error: {0}")]
    Config(String),

    /// The pending MFA challenge expired before completion.
    #[error("MFA session expired, please log in again")]
    MfaSessionExpired,

    /// A sensitive operation was attempted on an invalid or hijacked
    /// session. The session has already been forcibly terminated.
    #[error("Security violation: {0}")]
    Violation(String),
}

/// A `Result` type that uses `SecurityError` as the error type.
pub type Result<T> = std::result::Result<T, SecurityError>;
