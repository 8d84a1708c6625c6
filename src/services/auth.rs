use chrono::{DateTime, Utc};

use crate::audit::{AuditEvent, AuditSeverity};
use crate::client::{
    ApiResult, AuthApi, ChangePasswordRequest, LoginRequest, VerifyMfaRequest,
};
use crate::error::{Result, SecurityError};
use crate::models::attempt::LoginAttempt;
use crate::models::session::{AuthSession, PendingMfa};
use crate::services::ledger::AttemptLedger;
use crate::services::mfa;
use crate::services::sessions::SessionManager;
use crate::state::{CSRF_TOKEN_KEY, PENDING_MFA_KEY, SecurityContext};
use crate::validation::auth::{ValidationReport, validate_password};
use crate::validation::input::sanitize_input;

/// How long a password-accepted login waits for MFA completion.
const PENDING_MFA_TTL_MINUTES: i64 = 5;

/// Details about the client making an authentication request.
#[derive(Debug, Clone, Default)]
pub struct ClientInfo {
    /// The client's user agent string.
    pub user_agent: String,
    /// The client's IP address, when known.
    pub ip_address: Option<String>,
}

/// Outcome of a login or MFA-completion call.
#[derive(Debug, Clone)]
pub enum LoginOutcome {
    /// A session was created.
    Authenticated(AuthSession),
    /// The password was accepted; MFA completion is required within the
    /// pending window.
    MfaRequired,
    /// The account is locked; try again once `unlock_time` passes.
    LockedOut { unlock_time: DateTime<Utc> },
    /// The remote API rejected the attempt.
    Failed { message: String, reason: String },
}

/// Outcome of a password change.
#[derive(Debug, Clone)]
pub enum PasswordChangeOutcome {
    Changed,
    /// The new password failed policy; every failed rule is listed.
    Rejected(ValidationReport),
    Failed { message: String, reason: String },
}

/// Client-side MFA enrollment material.
#[derive(Debug, Clone)]
pub struct MfaSetup {
    /// Shared secret for the authenticator app.
    pub secret: String,
    /// Freshly issued backup codes.
    pub backup_codes: Vec<String>,
}

/// Outcome of enabling MFA.
#[derive(Debug, Clone)]
pub enum MfaEnableOutcome {
    Enabled(MfaSetup),
    Failed { message: String, reason: String },
}

/// Outcome of a simple state-changing action (e.g. disabling MFA).
#[derive(Debug, Clone)]
pub enum ActionOutcome {
    Done,
    Failed { message: String, reason: String },
}

/// Orchestrates authentication against the remote API.
///
/// Ties together the lockout ledger, MFA gating, session lifecycle and
/// the audit stream. Remote failures are returned as data; only network
/// and store failures are errors, surfaced immediately with no retry.
pub struct AuthService<A: AuthApi> {
    ctx: SecurityContext,
    api: A,
    sessions: SessionManager,
    ledger: AttemptLedger,
}

impl<A: AuthApi> AuthService<A> {
    /// Creates a service over the given context and API client.
    pub fn new(ctx: &SecurityContext, api: A) -> Self {
        Self {
            ctx: ctx.clone(),
            api,
            sessions: SessionManager::new(ctx),
            ledger: AttemptLedger::new(ctx),
        }
    }

    /// The session manager backing this service.
    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    /// The attempt ledger backing this service.
    pub fn ledger(&self) -> &AttemptLedger {
        &self.ledger
    }

    /// Attempts a login.
    ///
    /// Checks the lockout state first (a locked attempt is still recorded,
    /// with `failure_reason: "account_locked"`), then calls the remote
    /// API. On success either a session is created or, when MFA is
    /// required for the user, a short-lived pending record is stored and
    /// [`LoginOutcome::MfaRequired`] returned.
    pub async fn login(
        &self,
        email: &str,
        password: &str,
        client: &ClientInfo,
    ) -> Result<LoginOutcome> {
        let email = sanitize_input(email);
        tracing::info!("🔐 Login attempt for: {}", email);

        let lockout = self.ledger.is_account_locked(&email);
        if lockout.locked {
            let unlock_time = lockout.unlock_time.unwrap_or_else(Utc::now);
            let mut attempt = LoginAttempt::now(&email, false, &client.user_agent)
                .with_reason("account_locked");
            attempt.ip_address = client.ip_address.clone();
            self.ledger.record_attempt(attempt)?;

            self.ctx.audit.record(
                AuditEvent::new("login_blocked_lockout")
                    .severity(AuditSeverity::Warning)
                    .detail(sonic_rs::json!({
                        "email": email,
                        "unlock_time": unlock_time.to_rfc3339(),
                    })),
            );
            return Ok(LoginOutcome::LockedOut { unlock_time });
        }

        let request = LoginRequest {
            email: email.clone(),
            password: password.to_string(),
        };

        match self.api.login(&request).await? {
            ApiResult::Failure(failure) => {
                let mut attempt = LoginAttempt::now(&email, false, &client.user_agent)
                    .with_reason(&failure.reason);
                attempt.ip_address = client.ip_address.clone();
                self.ledger.record_attempt(attempt)?;

                self.ctx.audit.record(
                    AuditEvent::new("login_failure")
                        .severity(AuditSeverity::Warning)
                        .detail(sonic_rs::json!({
                            "email": email,
                            "reason": failure.reason,
                        })),
                );
                Ok(LoginOutcome::Failed {
                    message: failure.message,
                    reason: failure.reason,
                })
            }
            ApiResult::Success(user) => {
                if mfa::requires_mfa(&self.ctx.policy(), &user) {
                    let pending = PendingMfa {
                        user,
                        issued_at: Utc::now(),
                        ip_address: client.ip_address.clone(),
                    };
                    self.ctx
                        .store
                        .set_item(PENDING_MFA_KEY, &pending, PENDING_MFA_TTL_MINUTES)?;
                    tracing::info!("🔑 MFA required for: {}", email);
                    return Ok(LoginOutcome::MfaRequired);
                }

                let mut attempt = LoginAttempt::now(&email, true, &client.user_agent);
                attempt.ip_address = client.ip_address.clone();
                self.ledger.record_attempt(attempt)?;

                let session = self
                    .sessions
                    .create_session(&user, false, client.ip_address.clone())?;
                Ok(LoginOutcome::Authenticated(session))
            }
        }
    }

    /// Completes a pending MFA challenge.
    ///
    /// # Errors
    ///
    /// `SecurityError::MfaSessionExpired` when no pending login exists.
    /// This is the one authentication failure that is thrown rather than
    /// returned, because the caller's flow state is unrecoverable.
    pub async fn complete_mfa(&self, code: &str, client: &ClientInfo) -> Result<LoginOutcome> {
        let pending: PendingMfa = self
            .ctx
            .store
            .get_item(PENDING_MFA_KEY)
            .ok_or(SecurityError::MfaSessionExpired)?;

        let request = VerifyMfaRequest {
            email: pending.user.email.clone(),
            code: code.to_string(),
        };

        match self.api.verify_mfa(&request).await? {
            ApiResult::Failure(failure) => {
                let mut attempt =
                    LoginAttempt::now(&pending.user.email, false, &client.user_agent)
                        .with_reason(&failure.reason);
                attempt.ip_address = client.ip_address.clone();
                self.ledger.record_attempt(attempt)?;
                Ok(LoginOutcome::Failed {
                    message: failure.message,
                    reason: failure.reason,
                })
            }
            ApiResult::Success(user) => {
                self.ctx.store.remove_item(PENDING_MFA_KEY);

                let mut attempt = LoginAttempt::now(&user.email, true, &client.user_agent);
                attempt.ip_address = client.ip_address.clone();
                self.ledger.record_attempt(attempt)?;

                let session = self
                    .sessions
                    .create_session(&user, true, pending.ip_address.clone())?;
                Ok(LoginOutcome::Authenticated(session))
            }
        }
    }

    /// Logs out: terminates the session and every session-adjacent record.
    pub fn logout(&self) {
        self.sessions.terminate_all("logout");
    }

    /// Changes the password; a sensitive action requiring a valid session.
    pub async fn change_password(
        &self,
        current_password: &str,
        new_password: &str,
    ) -> Result<PasswordChangeOutcome> {
        let session = self.require_valid_session("change_password")?;

        let report = validate_password(&self.ctx.policy(), new_password);
        if !report.valid {
            return Ok(PasswordChangeOutcome::Rejected(report));
        }

        let request = ChangePasswordRequest {
            current_password: current_password.to_string(),
            new_password: new_password.to_string(),
        };

        match self
            .api
            .change_password(&session.session_token, &self.csrf_token(), &request)
            .await?
        {
            ApiResult::Success(()) => {
                self.ctx.audit.record(
                    AuditEvent::new("password_changed")
                        .user(session.user_id)
                        .fingerprint(session.device_fingerprint.clone()),
                );
                tracing::info!("✅ Password changed for user: {}", session.user_id);
                Ok(PasswordChangeOutcome::Changed)
            }
            ApiResult::Failure(failure) => Ok(PasswordChangeOutcome::Failed {
                message: failure.message,
                reason: failure.reason,
            }),
        }
    }

    /// Enables MFA; a sensitive action requiring a valid session.
    ///
    /// The server provides the shared secret; backup codes are issued
    /// client-side.
    pub async fn enable_mfa(&self) -> Result<MfaEnableOutcome> {
        let session = self.require_valid_session("enable_mfa")?;

        match self
            .api
            .enable_mfa(&session.session_token, &self.csrf_token())
            .await?
        {
            ApiResult::Success(enrollment) => {
                self.ctx.audit.record(
                    AuditEvent::new("mfa_enabled").user(session.user_id),
                );
                Ok(MfaEnableOutcome::Enabled(MfaSetup {
                    secret: enrollment.secret,
                    backup_codes: mfa::generate_backup_codes(),
                }))
            }
            ApiResult::Failure(failure) => Ok(MfaEnableOutcome::Failed {
                message: failure.message,
                reason: failure.reason,
            }),
        }
    }

    /// Disables MFA; a sensitive action requiring a valid session.
    pub async fn disable_mfa(&self) -> Result<ActionOutcome> {
        let session = self.require_valid_session("disable_mfa")?;

        match self
            .api
            .disable_mfa(&session.session_token, &self.csrf_token())
            .await?
        {
            ApiResult::Success(()) => {
                self.ctx.audit.record(
                    AuditEvent::new("mfa_disabled")
                        .user(session.user_id)
                        .severity(AuditSeverity::Warning),
                );
                Ok(ActionOutcome::Done)
            }
            ApiResult::Failure(failure) => Ok(ActionOutcome::Failed {
                message: failure.message,
                reason: failure.reason,
            }),
        }
    }

    /// Gate for sensitive actions: a missing/invalid session is a
    /// security violation. Audited at high severity, leftover session
    /// state scrubbed, operation denied.
    fn require_valid_session(&self, action: &str) -> Result<AuthSession> {
        match self.sessions.current_session() {
            Some(session) => Ok(session),
            None => {
                self.ctx.audit.record(
                    AuditEvent::new("sensitive_action_denied")
                        .severity(AuditSeverity::High)
                        .detail(sonic_rs::json!({ "action": action })),
                );
                self.sessions.terminate_all("security_violation");
                Err(SecurityError::Violation(format!(
                    "No valid session for sensitive action '{}'",
                    action
                )))
            }
        }
    }

    fn csrf_token(&self) -> String {
        self.ctx
            .store
            .get_item::<String>(CSRF_TOKEN_KEY)
            .unwrap_or_default()
    }
}
