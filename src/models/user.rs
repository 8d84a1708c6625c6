use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Roles recognized by the permission registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Full access, universal permission wildcard.
    Admin,
    /// Certificate signing authority.
    Signer,
    /// Certificate and template management.
    Staff,
    /// Read-only access.
    Viewer,
}

impl Role {
    /// Returns the lowercase name of the role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Signer => "signer",
            Role::Staff => "staff",
            Role::Viewer => "viewer",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A platform user as returned by the remote authentication API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user's unique identifier.
    pub id: Uuid,
    /// The user's email address.
    pub email: String,
    /// The user's display name.
    pub name: String,
    /// The user's role.
    pub role: Role,
    /// Whether the user has MFA enabled on their account.
    pub mfa_enabled: bool,
}
