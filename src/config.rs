use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use zeroize::{Zeroize, Zeroizing};

use crate::fingerprint::EnvironmentSignals;

/// The execution mode of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExecutionMode {
    Development,
    Production,
}

/// Properties of the execution environment that gate security checks.
#[derive(Debug, Clone, Copy)]
pub struct Environment {
    /// The execution mode (`APP_ENV`).
    pub mode: ExecutionMode,
    /// Whether the host runs in a secure transport context (TLS).
    pub secure_context: bool,
}

impl Environment {
    /// Reads the environment from `APP_ENV` and `SECURE_CONTEXT`.
    pub fn from_env() -> Self {
        let mode = if env::var("APP_ENV").unwrap_or_else(|_| "development".to_string())
            == "production"
        {
            ExecutionMode::Production
        } else {
            ExecutionMode::Development
        };

        let secure_context = env::var("SECURE_CONTEXT")
            .map(|v| v != "false" && v != "0")
            .unwrap_or(mode == ExecutionMode::Production);

        Self {
            mode,
            secure_context,
        }
    }
}

impl Default for Environment {
    fn default() -> Self {
        Self {
            mode: ExecutionMode::Development,
            secure_context: true,
        }
    }
}

/// Process-wide security policy.
///
/// A built-in default exists, overrides are persisted long-lived in the
/// encrypted store, and every policy-dependent check reads it fresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityPolicy {
    /// Failed attempts within the lockout window before an account locks.
    pub max_login_attempts: u32,
    /// How long a lockout lasts, and the width of the failure window.
    pub lockout_duration_minutes: i64,
    /// Idle timeout for the authenticated session.
    pub session_timeout_minutes: i64,
    /// Whether MFA is required for every role.
    pub require_mfa: bool,
    /// Minimum password length.
    pub password_min_length: usize,
    /// Whether passwords must contain a special character.
    pub password_require_special_chars: bool,
    /// File extensions accepted by upload validation.
    pub allowed_file_types: Vec<String>,
    /// Maximum accepted file size in bytes.
    pub max_file_size_bytes: u64,
}

impl Default for SecurityPolicy {
    fn default() -> Self {
        Self {
            max_login_attempts: 5,
            lockout_duration_minutes: 15,
            session_timeout_minutes: 30,
            require_mfa: false,
            password_min_length: 8,
            password_require_special_chars: true,
            allowed_file_types: vec![
                "pdf".to_string(),
                "png".to_string(),
                "jpg".to_string(),
                "jpeg".to_string(),
                "svg".to_string(),
            ],
            max_file_size_bytes: 10 * 1024 * 1024,
        }
    }
}

/// Configuration for a [`crate::state::SecurityContext`].
pub struct SecurityConfig {
    /// Directory holding the encrypted store file.
    pub storage_dir: PathBuf,
    /// The fixed application encryption key (32 bytes).
    pub master_key: Zeroizing<Vec<u8>>,
    /// Execution environment properties.
    pub environment: Environment,
    /// Explicit fingerprint signals; `None` detects from the host.
    pub signals: Option<EnvironmentSignals>,
    /// Base URL of the remote authentication API.
    pub auth_base_url: String,
}

impl SecurityConfig {
    /// Creates a new `SecurityConfig` from environment variables.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SecurityConfig`.
    pub fn from_env() -> Result<Self> {
        let mut master_key_hex = env::var("MASTER_KEY")
            .context("MASTER_KEY must be set (generate with: openssl rand -hex 32)")?;

        let master_key_bytes =
            hex::decode(&master_key_hex).context("MASTER_KEY must be valid hexadecimal")?;

        master_key_hex.zeroize();

        if master_key_bytes.len() != 32 {
            anyhow::bail!("MASTER_KEY must be exactly 32 bytes (64 hex characters)");
        }

        Ok(Self {
            storage_dir: env::var("SIGNGUARD_STORAGE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".signguard")),
            master_key: Zeroizing::new(master_key_bytes),
            environment: Environment::from_env(),
            signals: None,
            auth_base_url: env::var("AUTH_API_URL")
                .unwrap_or_else(|_| "http://127.0.0.1:3000".to_string()),
        })
    }

    /// Creates a config rooted at `storage_dir` with an explicit key.
    ///
    /// # Arguments
    ///
    /// * `storage_dir` - Directory for the encrypted store file.
    /// * `master_key` - A 32-byte AES-256 key.
    pub fn new(storage_dir: impl Into<PathBuf>, master_key: [u8; 32]) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            master_key: Zeroizing::new(master_key.to_vec()),
            environment: Environment::default(),
            signals: None,
            auth_base_url: "http://127.0.0.1:3000".to_string(),
        }
    }
}
