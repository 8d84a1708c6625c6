use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::permission::Permission;
use crate::models::user::Role;

/// An authenticated session bound to one device fingerprint.
///
/// Valid only while the idle window and the 8-hour hard cap both hold AND
/// the recomputed fingerprint matches the stored one.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthSession {
    /// The ID of the user this session belongs to.
    pub user_id: Uuid,
    /// The user's role at login time.
    pub role: Role,
    /// Permissions granted by the role at login time.
    pub permissions: Vec<Permission>,
    /// When the session was created.
    pub login_time: DateTime<Utc>,
    /// Last explicit activity touch; drives the sliding idle window.
    pub last_activity: DateTime<Utc>,
    /// Fingerprint of the device the session was created on.
    pub device_fingerprint: String,
    /// Whether MFA was completed for this session.
    pub mfa_verified: bool,
    /// Opaque bearer credential for the remote API.
    pub session_token: String,
    /// Client IP address, when known.
    pub ip_address: Option<String>,
}

/// The lightweight secondary session tracked for active signers.
///
/// Independent of [`AuthSession`]: its own 8-hour cap and a 30-minute
/// idle-activity definition.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SignerSession {
    /// The signing user.
    pub user_id: Uuid,
    /// The signing user's role.
    pub role: Role,
    /// When the signing session started.
    pub start_time: DateTime<Utc>,
    /// Last recorded signing activity.
    pub last_activity: DateTime<Utc>,
    /// Documents opened during this signing session.
    pub active_document_ids: Vec<String>,
    /// Signatures created during this signing session.
    pub signature_count: u64,
}

/// Summary of a signing session for display.
#[derive(Debug, Clone, Serialize)]
pub struct SignerSessionSummary {
    /// Total elapsed time since the session started, in seconds.
    pub duration_seconds: i64,
    /// Distinct documents viewed.
    pub documents_viewed: usize,
    /// Signatures created.
    pub signatures_created: u64,
    /// Last recorded activity.
    pub last_activity: DateTime<Utc>,
}

/// A login pending MFA completion; short-lived.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingMfa {
    /// The user whose password was already accepted.
    pub user: crate::models::user::User,
    /// When the challenge was issued.
    pub issued_at: DateTime<Utc>,
    /// Client IP address carried into the eventual session.
    pub ip_address: Option<String>,
}
