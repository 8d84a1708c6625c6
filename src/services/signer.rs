use chrono::{Duration, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audit::{AuditEvent, AuditSeverity};
use crate::error::Result;
use crate::models::session::{SignerSession, SignerSessionSummary};
use crate::models::user::{Role, User};
use crate::state::{SIGNER_SESSION_KEY, SecurityContext};

/// Hard cap of the secondary signing session.
pub const SIGNER_SESSION_CAP_HOURS: i64 = 8;
/// What "active" means for a signing session.
pub const SIGNER_IDLE_MINUTES: i64 = 30;

/// Batch signing limiter: operations allowed per window.
const BATCH_OPS_PER_WINDOW: u32 = 5;
const BATCH_WINDOW_MINUTES: i64 = 60;

/// Recipient counts that trigger warnings.
const BATCH_LARGE_THRESHOLD: usize = 100;
const BATCH_TOO_MANY_THRESHOLD: usize = 500;

/// Outcome of a batch-signing guard check.
#[derive(Debug, Clone, Serialize)]
pub struct BatchDecision {
    /// Whether the batch operation may proceed.
    pub allowed: bool,
    /// Advisory warnings for allowed but unusual batches.
    pub warnings: Vec<String>,
}

/// Resource-level authorization for the signer domain, plus the
/// lightweight signing-activity session tracker.
///
/// Layered on top of the session lifecycle: role gates come from the
/// user, activity tracking lives in its own store record with an
/// independent 8-hour cap and a 30-minute idle-activity definition.
#[derive(Clone)]
pub struct SignerGuard {
    ctx: SecurityContext,
}

impl SignerGuard {
    /// Creates a guard over the given context.
    pub fn new(ctx: &SecurityContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Whether `user` may enter the signer domain at all.
    pub fn validate_signer_access(&self, user: &User) -> bool {
        matches!(user.role, Role::Signer | Role::Admin)
    }

    /// Whether `user` may perform `action` on the given document.
    ///
    /// Document-level ACLs are not modeled beyond the role gate.
    pub fn validate_document_access(&self, user: &User, document_id: &str, action: &str) -> bool {
        let allowed = self.validate_signer_access(user);
        if !allowed {
            tracing::warn!(
                "🚫 Document access denied: user {} ({}) on {} [{}]",
                user.id,
                user.role,
                document_id,
                action
            );
        }
        allowed
    }

    /// Whether `user` may perform `action` on a signature owned by
    /// `owner_id`: signer access AND ownership (admins exempt).
    pub fn validate_signature_access(&self, user: &User, owner_id: Uuid, action: &str) -> bool {
        if !self.validate_signer_access(user) {
            return false;
        }

        let allowed = user.id == owner_id || user.role == Role::Admin;
        if !allowed {
            tracing::warn!(
                "🚫 Signature access denied: user {} does not own signature of {} [{}]",
                user.id,
                owner_id,
                action
            );
        }
        allowed
    }

    /// Guards a batch signing operation over `recipient_count` recipients.
    ///
    /// Denied without signer access or once the per-user limiter (5 batch
    /// operations per 60 minutes) is exhausted; otherwise allowed, with
    /// warnings for unusually large batches.
    pub fn validate_batch_signing(&self, user: &User, recipient_count: usize) -> BatchDecision {
        if !self.validate_signer_access(user) {
            return BatchDecision {
                allowed: false,
                warnings: vec!["User does not have signing privileges".to_string()],
            };
        }

        let key = format!("batch_signing:{}", user.id);
        if !self
            .ctx
            .limiter
            .check_rate_limit(&key, BATCH_OPS_PER_WINDOW, BATCH_WINDOW_MINUTES)
        {
            let wait = self.ctx.limiter.minutes_until_reset(&key).unwrap_or(BATCH_WINDOW_MINUTES);
            self.ctx.audit.record(
                AuditEvent::new("batch_signing_denied")
                    .user(user.id)
                    .severity(AuditSeverity::Warning)
                    .detail(sonic_rs::json!({ "recipient_count": recipient_count })),
            );
            return BatchDecision {
                allowed: false,
                warnings: vec![format!(
                    "Batch signing limit reached. Try again in {} minutes",
                    wait
                )],
            };
        }

        let mut warnings = Vec::new();
        if recipient_count > BATCH_LARGE_THRESHOLD {
            warnings.push(format!(
                "Large recipient count ({}) - sending will take a while",
                recipient_count
            ));
        }
        if recipient_count > BATCH_TOO_MANY_THRESHOLD {
            warnings.push(format!(
                "Too many recipients ({}) - consider splitting into smaller groups",
                recipient_count
            ));
        }

        BatchDecision {
            allowed: true,
            warnings,
        }
    }

    /// Whether `user` may continue signing: signer access AND a signing
    /// session that is within its idle-activity window.
    pub fn validate_signing_session(&self, user: &User) -> bool {
        if !self.validate_signer_access(user) {
            return false;
        }

        match self.current_signing_session() {
            Some(session) => {
                Utc::now() - session.last_activity <= Duration::minutes(SIGNER_IDLE_MINUTES)
            }
            None => false,
        }
    }

    /// Starts (or restarts) the signing-activity session for `user`.
    pub fn start_signing_session(&self, user: &User) -> Result<SignerSession> {
        let now = Utc::now();
        let session = SignerSession {
            user_id: user.id,
            role: user.role,
            start_time: now,
            last_activity: now,
            active_document_ids: Vec::new(),
            signature_count: 0,
        };

        self.persist(&session)?;
        self.ctx.audit.record(
            AuditEvent::new("signer_session_started")
                .user(user.id)
                .detail(sonic_rs::json!({ "role": user.role.as_str() })),
        );
        tracing::info!("✍️  Signing session started for user: {}", user.id);

        Ok(session)
    }

    /// Records activity on a document: touches `last_activity` and adds
    /// the document to the active set.
    ///
    /// # Returns
    ///
    /// `false` if no signing session exists.
    pub fn record_document_activity(&self, document_id: &str) -> Result<bool> {
        let Some(mut session) = self.current_signing_session() else {
            return Ok(false);
        };

        session.last_activity = Utc::now();
        if !session.active_document_ids.iter().any(|d| d == document_id) {
            session.active_document_ids.push(document_id.to_string());
        }
        self.persist(&session)?;
        Ok(true)
    }

    /// Records one created signature and touches `last_activity`.
    ///
    /// # Returns
    ///
    /// `false` if no signing session exists.
    pub fn record_signature(&self) -> Result<bool> {
        let Some(mut session) = self.current_signing_session() else {
            return Ok(false);
        };

        session.last_activity = Utc::now();
        session.signature_count += 1;
        self.persist(&session)?;
        Ok(true)
    }

    /// Summarizes the current signing session for display.
    pub fn session_summary(&self) -> Option<SignerSessionSummary> {
        let session = self.current_signing_session()?;
        Some(SignerSessionSummary {
            duration_seconds: (Utc::now() - session.start_time).num_seconds(),
            documents_viewed: session.active_document_ids.len(),
            signatures_created: session.signature_count,
            last_activity: session.last_activity,
        })
    }

    /// Ends the signing session, logging the total duration.
    pub fn end_signing_session(&self) {
        if let Some(session) = self.current_signing_session() {
            let duration = Utc::now() - session.start_time;
            self.ctx.audit.record(
                AuditEvent::new("signer_session_ended")
                    .user(session.user_id)
                    .detail(sonic_rs::json!({
                        "duration_seconds": duration.num_seconds(),
                        "documents_viewed": session.active_document_ids.len(),
                        "signatures_created": session.signature_count,
                    })),
            );
            tracing::info!(
                "✍️  Signing session ended for user {} after {}s",
                session.user_id,
                duration.num_seconds()
            );
        }

        self.ctx.store.remove_item(SIGNER_SESSION_KEY);
    }

    /// Reads the signing session if it is still within its hard cap.
    ///
    /// Activity re-persists the record with a fresh TTL, so the 8-hour
    /// cap is enforced here against `start_time`, the same way the auth
    /// session checks its login time.
    pub fn current_signing_session(&self) -> Option<SignerSession> {
        let session: SignerSession = self.ctx.store.get_item(SIGNER_SESSION_KEY)?;

        if Utc::now() - session.start_time > Duration::hours(SIGNER_SESSION_CAP_HOURS) {
            tracing::info!(
                "⏰ Signing session reached hard cap for user: {}",
                session.user_id
            );
            self.ctx.store.remove_item(SIGNER_SESSION_KEY);
            return None;
        }

        Some(session)
    }

    fn persist(&self, session: &SignerSession) -> Result<()> {
        self.ctx
            .store
            .set_item(SIGNER_SESSION_KEY, session, SIGNER_SESSION_CAP_HOURS * 60)
    }
}
