use std::sync::Arc;

use crate::audit::{AuditEvent, AuditSink, TracingAuditSink};
use crate::config::{Environment, SecurityConfig, SecurityPolicy};
use crate::crypto::aes::SecureKey;
use crate::error::Result;
use crate::fingerprint::{self, EnvironmentSignals};
use crate::storage::rate_limit::FixedWindowLimiter;
use crate::storage::store::SecureStore;

/// Store key for the persisted security policy.
pub const POLICY_KEY: &str = "security_policy";
/// Store key for the current authenticated session.
pub const AUTH_SESSION_KEY: &str = "auth_session";
/// Store key for the login attempt ledger.
pub const LOGIN_ATTEMPTS_KEY: &str = "login_attempts";
/// Store key for the secondary signer session.
pub const SIGNER_SESSION_KEY: &str = "signer_session";
/// Store key for a login pending MFA completion.
pub const PENDING_MFA_KEY: &str = "pending_mfa";
/// Store key for the current CSRF token.
pub const CSRF_TOKEN_KEY: &str = "csrf_token";

/// TTL for the persisted policy (one year, effectively long-lived).
const POLICY_TTL_MINUTES: i64 = 365 * 24 * 60;

/// The security subsystem's shared state.
///
/// Constructed once per process and passed explicitly, with no hidden module
/// globals. All services (sessions, ledger, MFA, signer guard) hang off a
/// clone of this context.
#[derive(Clone)]
pub struct SecurityContext {
    /// The encrypted persistent store.
    pub store: SecureStore,
    /// The in-memory fixed-window rate limiter.
    pub limiter: Arc<FixedWindowLimiter>,
    /// The audit event sink.
    pub audit: Arc<dyn AuditSink>,
    /// Execution environment properties.
    pub environment: Environment,
    /// Base URL of the remote authentication API.
    pub auth_base_url: String,
    /// The signals the device fingerprint is recomputed from.
    signals: EnvironmentSignals,
}

impl SecurityContext {
    /// Creates a new `SecurityContext`.
    ///
    /// # Arguments
    ///
    /// * `config` - The subsystem configuration.
    ///
    /// # Returns
    ///
    /// A `Result` containing the `SecurityContext`.
    pub fn new(config: SecurityConfig) -> Result<Self> {
        let key = SecureKey::from_slice(&config.master_key)?;
        let store = SecureStore::open(&config.storage_dir, key)?;
        tracing::info!("✅ Secure store initialized at {:?}", config.storage_dir);

        let signals = config
            .signals
            .unwrap_or_else(EnvironmentSignals::detect);

        Ok(Self {
            store,
            limiter: Arc::new(FixedWindowLimiter::new()),
            audit: Arc::new(TracingAuditSink),
            environment: config.environment,
            auth_base_url: config.auth_base_url,
            signals,
        })
    }

    /// Replaces the audit sink.
    pub fn with_audit(mut self, audit: Arc<dyn AuditSink>) -> Self {
        self.audit = audit;
        self
    }

    /// Recomputes the device fingerprint from the current signals.
    pub fn device_fingerprint(&self) -> String {
        fingerprint::generate_fingerprint(&self.signals)
    }

    /// Reads the effective security policy.
    ///
    /// Always read fresh from the store so overrides take effect on the
    /// next check; falls back to the built-in default.
    pub fn policy(&self) -> SecurityPolicy {
        self.store
            .get_item(POLICY_KEY)
            .unwrap_or_default()
    }

    /// Persists a policy override long-lived and audits the change.
    pub fn set_policy(&self, policy: &SecurityPolicy) -> Result<()> {
        self.store.set_item(POLICY_KEY, policy, POLICY_TTL_MINUTES)?;
        self.audit.record(
            AuditEvent::new("policy_updated").detail(sonic_rs::json!({
                "max_login_attempts": policy.max_login_attempts,
                "session_timeout_minutes": policy.session_timeout_minutes,
                "require_mfa": policy.require_mfa,
            })),
        );
        tracing::info!("✅ Security policy updated");
        Ok(())
    }
}
