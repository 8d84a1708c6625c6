use chrono::{Duration, Utc};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::audit::{AuditEvent, AuditSeverity};
use crate::crypto::token;
use crate::error::Result;
use crate::models::permission::Permission;
use crate::models::session::AuthSession;
use crate::models::user::{Role, User};
use crate::services::permissions::role_permissions;
use crate::state::{
    AUTH_SESSION_KEY, CSRF_TOKEN_KEY, PENDING_MFA_KEY, SIGNER_SESSION_KEY, SecurityContext,
};

/// Hard maximum age of a session, independent of activity.
pub const SESSION_HARD_CAP_HOURS: i64 = 8;

/// Length of the opaque bearer session token, in hex characters.
const SESSION_TOKEN_LENGTH: usize = 64;

/// Manages the single authenticated session of this client.
///
/// The session is bound to the device fingerprint and a sliding idle
/// window inside an 8-hour hard cap; it lives in the encrypted store and
/// is destroyed on logout, idle timeout, fingerprint mismatch, or bulk
/// termination.
#[derive(Clone)]
pub struct SessionManager {
    ctx: SecurityContext,
}

impl SessionManager {
    /// Creates a manager over the given context.
    pub fn new(ctx: &SecurityContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Creates and persists a new session for `user`.
    ///
    /// Computes the device fingerprint, mints a bearer token and a CSRF
    /// token, assigns permissions from the role, persists with the fixed
    /// 8-hour cap and emits an audit event.
    ///
    /// # Arguments
    ///
    /// * `user` - The authenticated user.
    /// * `mfa_verified` - Whether MFA was completed for this login.
    /// * `ip_address` - Client IP, when known.
    pub fn create_session(
        &self,
        user: &User,
        mfa_verified: bool,
        ip_address: Option<String>,
    ) -> Result<AuthSession> {
        let now = Utc::now();
        let fingerprint = self.ctx.device_fingerprint();

        let session = AuthSession {
            user_id: user.id,
            role: user.role,
            permissions: role_permissions(user.role),
            login_time: now,
            last_activity: now,
            device_fingerprint: fingerprint.clone(),
            mfa_verified,
            session_token: token::generate_token(SESSION_TOKEN_LENGTH),
            ip_address,
        };

        self.ctx
            .store
            .set_item(AUTH_SESSION_KEY, &session, SESSION_HARD_CAP_HOURS * 60)?;
        self.ctx.store.set_item(
            CSRF_TOKEN_KEY,
            &token::generate_csrf_token(),
            SESSION_HARD_CAP_HOURS * 60,
        )?;

        self.ctx.audit.record(
            AuditEvent::new("session_created")
                .user(user.id)
                .fingerprint(fingerprint)
                .detail(sonic_rs::json!({
                    "role": user.role.as_str(),
                    "mfa_verified": mfa_verified,
                })),
        );
        tracing::info!("✅ Session created for user: {}", user.id);

        Ok(session)
    }

    /// Returns the current session if it is still valid.
    ///
    /// An idle-expired or over-cap session is deleted and reported absent;
    /// a fingerprint mismatch is additionally audited at high severity as
    /// a hijack signal.
    pub fn current_session(&self) -> Option<AuthSession> {
        let session: AuthSession = self.ctx.store.get_item(AUTH_SESSION_KEY)?;
        let now = Utc::now();

        if now - session.login_time > Duration::hours(SESSION_HARD_CAP_HOURS) {
            tracing::info!("⏰ Session reached hard cap for user: {}", session.user_id);
            self.expire(&session, "hard_cap");
            return None;
        }

        let timeout = self.ctx.policy().session_timeout_minutes;
        if now - session.last_activity > Duration::minutes(timeout) {
            tracing::info!("⏰ Session idle-expired for user: {}", session.user_id);
            self.expire(&session, "idle_timeout");
            return None;
        }

        if self.ctx.device_fingerprint() != session.device_fingerprint {
            tracing::warn!(
                "🚨 Fingerprint mismatch for user {}, treating as hijack",
                session.user_id
            );
            self.ctx.store.remove_item(AUTH_SESSION_KEY);
            self.ctx.store.remove_item(CSRF_TOKEN_KEY);
            self.ctx.audit.record(
                AuditEvent::new("session_fingerprint_mismatch")
                    .user(session.user_id)
                    .fingerprint(self.ctx.device_fingerprint())
                    .severity(AuditSeverity::High)
                    .detail(sonic_rs::json!({
                        "expected": session.device_fingerprint,
                    })),
            );
            return None;
        }

        Some(session)
    }

    /// Re-stamps `last_activity` on the current session.
    ///
    /// The record is re-persisted with the full TTL: a sliding idle
    /// window inside the hard cap, which [`Self::current_session`]
    /// enforces separately.
    ///
    /// # Returns
    ///
    /// `true` if a valid session was touched.
    pub fn update_activity(&self) -> bool {
        let Some(mut session) = self.current_session() else {
            return false;
        };

        session.last_activity = Utc::now();
        match self
            .ctx
            .store
            .set_item(AUTH_SESSION_KEY, &session, SESSION_HARD_CAP_HOURS * 60)
        {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!("⚠️  Failed to persist activity touch: {}", e);
                false
            }
        }
    }

    /// Terminates the current session, logging duration and reason.
    pub fn terminate_session(&self, reason: &str) {
        if let Some(session) = self.ctx.store.get_item::<AuthSession>(AUTH_SESSION_KEY) {
            let duration = Utc::now() - session.login_time;
            self.ctx.audit.record(
                AuditEvent::new("session_terminated")
                    .user(session.user_id)
                    .fingerprint(session.device_fingerprint.clone())
                    .detail(sonic_rs::json!({
                        "reason": reason,
                        "duration_seconds": duration.num_seconds(),
                    })),
            );
            tracing::info!(
                "👋 Session terminated for user {} after {}s ({})",
                session.user_id,
                duration.num_seconds(),
                reason
            );
        }

        self.ctx.store.remove_item(AUTH_SESSION_KEY);
        self.ctx.store.remove_item(CSRF_TOKEN_KEY);
    }

    /// Bulk termination: clears the session and every session-adjacent
    /// record (signer session, pending MFA, CSRF token).
    pub fn terminate_all(&self, reason: &str) {
        self.terminate_session(reason);
        self.ctx.store.remove_item(SIGNER_SESSION_KEY);
        self.ctx.store.remove_item(PENDING_MFA_KEY);
    }

    /// Whether the current session holds `permission`.
    ///
    /// True on an exact match, the admin wildcard, or a `resource:*` /
    /// `*:action` wildcard grant. An unparseable permission string never
    /// grants.
    pub fn has_permission(&self, permission: &str) -> bool {
        let Ok(required) = permission.parse::<Permission>() else {
            tracing::warn!("⚠️  Malformed permission check: {}", permission);
            return false;
        };

        self.current_session()
            .map(|s| s.permissions.iter().any(|granted| granted.grants(&required)))
            .unwrap_or(false)
    }

    /// Whether the current session carries exactly `role`.
    pub fn has_role(&self, role: Role) -> bool {
        self.current_session()
            .map(|s| s.role == role)
            .unwrap_or(false)
    }

    /// Whether the current session carries any of `roles`.
    pub fn has_any_role(&self, roles: &[Role]) -> bool {
        self.current_session()
            .map(|s| roles.contains(&s.role))
            .unwrap_or(false)
    }

    fn expire(&self, session: &AuthSession, cause: &str) {
        self.ctx.store.remove_item(AUTH_SESSION_KEY);
        self.ctx.store.remove_item(CSRF_TOKEN_KEY);
        self.ctx.audit.record(
            AuditEvent::new("session_expired")
                .user(session.user_id)
                .fingerprint(session.device_fingerprint.clone())
                .detail(sonic_rs::json!({ "cause": cause })),
        );
    }
}

/// Spawns the recurring session watchdog.
///
/// Roughly once per `period` the current session is re-validated and its
/// validity published on the returned watch channel, so expiry propagates
/// to callers without them polling.
///
/// # Arguments
///
/// * `manager` - The session manager to re-validate with.
/// * `period` - The re-validation interval (≈ one minute in production).
///
/// # Returns
///
/// The task handle and a receiver of the latest validity.
pub fn spawn_session_watchdog(
    manager: SessionManager,
    period: std::time::Duration,
) -> (JoinHandle<()>, watch::Receiver<bool>) {
    let (tx, rx) = watch::channel(manager.current_session().is_some());

    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            let valid = manager.current_session().is_some();
            if tx.send(valid).is_err() {
                // All receivers dropped; nothing left to notify.
                break;
            }
        }
    });

    (handle, rx)
}
