use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One recorded login attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginAttempt {
    /// The email the attempt was made for.
    pub email: String,
    /// When the attempt happened.
    pub timestamp: DateTime<Utc>,
    /// Whether the attempt succeeded.
    pub success: bool,
    /// User agent of the client making the attempt.
    pub user_agent: String,
    /// Failure reason from the remote API, e.g. `invalid_credentials` or
    /// `account_locked`.
    pub failure_reason: Option<String>,
    /// Client IP address, when known.
    pub ip_address: Option<String>,
}

impl LoginAttempt {
    /// Creates an attempt stamped with the current time.
    ///
    /// # Arguments
    ///
    /// * `email` - The email the attempt was made for.
    /// * `success` - Whether the attempt succeeded.
    /// * `user_agent` - User agent of the client.
    pub fn now(email: impl Into<String>, success: bool, user_agent: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            timestamp: Utc::now(),
            success,
            user_agent: user_agent.into(),
            failure_reason: None,
            ip_address: None,
        }
    }

    /// Sets the failure reason.
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.failure_reason = Some(reason.into());
        self
    }

    /// Sets the client IP address.
    pub fn with_ip(mut self, ip: impl Into<String>) -> Self {
        self.ip_address = Some(ip.into());
        self
    }
}
