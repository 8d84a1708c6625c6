use rand::Rng;
use rand::rngs::OsRng;
use subtle::ConstantTimeEq;

use crate::config::SecurityPolicy;
use crate::models::user::{Role, User};

/// Number of backup codes issued per batch.
const BACKUP_CODE_COUNT: usize = 10;
/// Length of each backup code.
const BACKUP_CODE_LENGTH: usize = 8;
/// Alphabet for backup codes: uppercase alphanumeric.
const BACKUP_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Whether `user` must complete MFA to hold a session.
///
/// True when the policy demands MFA globally, or always for the
/// privileged roles (admin, signer).
pub fn requires_mfa(policy: &SecurityPolicy, user: &User) -> bool {
    policy.require_mfa || matches!(user.role, Role::Admin | Role::Signer)
}

/// Issues a fresh batch of backup codes.
///
/// # Returns
///
/// 10 codes of 8 uppercase alphanumeric characters each.
pub fn generate_backup_codes() -> Vec<String> {
    let mut rng = OsRng;
    (0..BACKUP_CODE_COUNT)
        .map(|_| {
            (0..BACKUP_CODE_LENGTH)
                .map(|_| {
                    let idx = rng.gen_range(0..BACKUP_CODE_ALPHABET.len());
                    BACKUP_CODE_ALPHABET[idx] as char
                })
                .collect()
        })
        .collect()
}

/// Format-only TOTP verification stub.
///
/// Accepts any six-digit code except the all-zero one. This is NOT a real
/// time-based one-time-password algorithm; a production deployment must
/// substitute one before relying on it.
pub fn verify_totp(code: &str, _secret: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit()) && code != "000000"
}

/// Case-insensitive backup code membership test.
///
/// Each candidate comparison is constant-time; the overall membership
/// scan still reveals list length, which is fixed anyway.
///
/// # Arguments
///
/// * `code` - The user-supplied code.
/// * `valid_codes` - The remaining unused backup codes.
pub fn verify_backup_code(code: &str, valid_codes: &[String]) -> bool {
    let normalized = code.trim().to_uppercase();
    valid_codes
        .iter()
        .any(|valid| {
            valid.as_bytes().ct_eq(normalized.as_bytes()).into()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn user(role: Role) -> User {
        User {
            id: Uuid::new_v4(),
            email: "u@example.com".to_string(),
            name: "U".to_string(),
            role,
            mfa_enabled: false,
        }
    }

    #[test]
    fn test_mfa_gating() {
        let mut policy = SecurityPolicy::default();
        policy.require_mfa = false;

        assert!(requires_mfa(&policy, &user(Role::Admin)));
        assert!(requires_mfa(&policy, &user(Role::Signer)));
        assert!(!requires_mfa(&policy, &user(Role::Staff)));
        assert!(!requires_mfa(&policy, &user(Role::Viewer)));

        policy.require_mfa = true;
        assert!(requires_mfa(&policy, &user(Role::Viewer)));
    }

    #[test]
    fn test_backup_code_shape() {
        let codes = generate_backup_codes();
        assert_eq!(codes.len(), 10);
        for code in &codes {
            assert_eq!(code.len(), 8);
            assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_totp_stub_format_only() {
        assert!(verify_totp("123456", "secret"));
        assert!(!verify_totp("000000", "secret"));
        assert!(!verify_totp("12345", "secret"));
        assert!(!verify_totp("1234567", "secret"));
        assert!(!verify_totp("12345a", "secret"));
    }

    #[test]
    fn test_backup_code_case_insensitive() {
        let codes = vec!["AB12CD34".to_string(), "ZZ99XX11".to_string()];
        assert!(verify_backup_code("ab12cd34", &codes));
        assert!(verify_backup_code(" ZZ99xx11 ", &codes));
        assert!(!verify_backup_code("AB12CD35", &codes));
    }
}
