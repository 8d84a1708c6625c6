use chrono::{DateTime, Duration, Timelike, Utc};
use serde::Serialize;

use crate::error::Result;
use crate::models::attempt::LoginAttempt;
use crate::state::{LOGIN_ATTEMPTS_KEY, SecurityContext};

/// Ledger cap: only the most recent attempts are retained.
pub const MAX_ATTEMPTS_RETAINED: usize = 100;

/// Persisted retention window for the ledger.
const ATTEMPTS_TTL_MINUTES: i64 = 24 * 60;

/// Risk window constants for [`AttemptLedger::assess_login_risk`].
const RISK_POINTS_PER_FAILURE: u32 = 10;
const RISK_POINTS_STALE_SUCCESS: u32 = 20;
const RISK_POINTS_OFF_HOURS: u32 = 15;

/// Result of a lockout check.
#[derive(Debug, Clone, Serialize)]
pub struct LockoutStatus {
    /// Whether the account is currently locked.
    pub locked: bool,
    /// When the lock lifts; present whenever the failure threshold was
    /// reached, even if the lock has since expired.
    pub unlock_time: Option<DateTime<Utc>>,
}

/// Heuristic suspiciousness of a login attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

/// Outcome of a login risk assessment.
#[derive(Debug, Clone, Serialize)]
pub struct RiskAssessment {
    /// Overall level derived from the score.
    pub level: RiskLevel,
    /// The additive score.
    pub score: u32,
    /// One human-readable string per contributing factor.
    pub factors: Vec<String>,
}

/// The login attempt ledger with lockout and risk scoring.
///
/// Retains the most recent 100 attempts with a 24-hour persisted
/// retention window. Lockout and risk read the policy fresh on every
/// check.
#[derive(Clone)]
pub struct AttemptLedger {
    ctx: SecurityContext,
}

impl AttemptLedger {
    /// Creates a ledger over the given context.
    pub fn new(ctx: &SecurityContext) -> Self {
        Self { ctx: ctx.clone() }
    }

    /// Appends an attempt, pruning the oldest beyond the cap.
    ///
    /// # Arguments
    ///
    /// * `attempt` - The attempt to record.
    pub fn record_attempt(&self, attempt: LoginAttempt) -> Result<()> {
        let mut attempts = self.attempts();

        tracing::debug!(
            "📒 Recording {} login attempt for: {}",
            if attempt.success { "successful" } else { "failed" },
            attempt.email
        );

        attempts.push(attempt);
        if attempts.len() > MAX_ATTEMPTS_RETAINED {
            let excess = attempts.len() - MAX_ATTEMPTS_RETAINED;
            attempts.drain(..excess);
        }

        self.ctx
            .store
            .set_item(LOGIN_ATTEMPTS_KEY, &attempts, ATTEMPTS_TTL_MINUTES)
    }

    /// Returns the retained attempts, oldest first.
    pub fn attempts(&self) -> Vec<LoginAttempt> {
        self.ctx
            .store
            .get_item(LOGIN_ATTEMPTS_KEY)
            .unwrap_or_default()
    }

    /// Computes the lockout state for `email`.
    ///
    /// Counts failures inside the policy's lockout window; at or beyond
    /// `max_login_attempts` the unlock time is the last qualifying
    /// failure plus the lockout duration.
    pub fn is_account_locked(&self, email: &str) -> LockoutStatus {
        let policy = self.ctx.policy();
        let now = Utc::now();
        let window_start = now - Duration::minutes(policy.lockout_duration_minutes);

        let attempts = self.attempts();
        let qualifying: Vec<&LoginAttempt> = attempts
            .iter()
            .filter(|a| !a.success && a.email == email && a.timestamp >= window_start)
            .collect();

        if (qualifying.len() as u32) < policy.max_login_attempts {
            return LockoutStatus {
                locked: false,
                unlock_time: None,
            };
        }

        let last_failure = qualifying
            .iter()
            .map(|a| a.timestamp)
            .max()
            .unwrap_or(now);
        let unlock_time = last_failure + Duration::minutes(policy.lockout_duration_minutes);

        LockoutStatus {
            locked: now < unlock_time,
            unlock_time: Some(unlock_time),
        }
    }

    /// Scores the suspiciousness of logging in as `email` right now.
    ///
    /// Additive: 10 points per failed attempt in the last 24 hours, 20 if
    /// there was no successful login within 7 days, 15 if the local hour
    /// is outside 06:00-22:00. High at 50, medium at 25.
    pub fn assess_login_risk(&self, email: &str) -> RiskAssessment {
        let now = Utc::now();
        let attempts = self.attempts();
        let mut score = 0;
        let mut factors = Vec::new();

        let recent_failures = attempts
            .iter()
            .filter(|a| !a.success && a.email == email && now - a.timestamp <= Duration::hours(24))
            .count() as u32;
        if recent_failures > 0 {
            score += RISK_POINTS_PER_FAILURE * recent_failures;
            factors.push(format!(
                "{} failed login attempt(s) in the last 24 hours",
                recent_failures
            ));
        }

        let last_success = attempts
            .iter()
            .filter(|a| a.success && a.email == email)
            .map(|a| a.timestamp)
            .max();
        let stale = match last_success {
            Some(t) => now - t > Duration::days(7),
            None => true,
        };
        if stale {
            score += RISK_POINTS_STALE_SUCCESS;
            factors.push("No successful login within the last 7 days".to_string());
        }

        let local_hour = chrono::Local::now().hour();
        if !(6..22).contains(&local_hour) {
            score += RISK_POINTS_OFF_HOURS;
            factors.push("Login attempted outside usual hours (06:00-22:00)".to_string());
        }

        let level = if score >= 50 {
            RiskLevel::High
        } else if score >= 25 {
            RiskLevel::Medium
        } else {
            RiskLevel::Low
        };

        RiskAssessment {
            level,
            score,
            factors,
        }
    }
}
