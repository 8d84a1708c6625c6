use serde::Serialize;

use crate::config::SecurityPolicy;

/// Outcome of a policy validation: a full list of failed rules.
///
/// Violations are data, never errors; callers render every reason.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationReport {
    /// Whether every rule passed.
    pub valid: bool,
    /// One human-readable message per failed rule.
    pub errors: Vec<String>,
}

impl ValidationReport {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }
}

/// Validates a password against the security policy.
///
/// Each policy option gates exactly one rule; every failed rule appears in
/// the report.
///
/// # Arguments
///
/// * `policy` - The effective security policy.
/// * `password` - The candidate password.
///
/// # Returns
///
/// A `ValidationReport` listing every failed rule.
pub fn validate_password(policy: &SecurityPolicy, password: &str) -> ValidationReport {
    let mut errors = Vec::new();

    if password.chars().count() < policy.password_min_length {
        errors.push(format!(
            "Password must be at least {} characters long",
            policy.password_min_length
        ));
    }

    if policy.password_require_special_chars
        && !password.chars().any(|c| !c.is_alphanumeric() && !c.is_whitespace())
    {
        errors.push("Password must contain at least one special character".to_string());
    }

    ValidationReport::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strong_password_passes() {
        let report = validate_password(&SecurityPolicy::default(), "correct-horse-battery!");
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_weak_password_lists_every_failed_rule() {
        let report = validate_password(&SecurityPolicy::default(), "abc");
        assert!(!report.valid);
        assert_eq!(report.errors.len(), 2, "{:?}", report.errors);
    }

    #[test]
    fn test_no_rules_beyond_the_policy_options() {
        let long = format!("{}!", "x".repeat(200));
        let report = validate_password(&SecurityPolicy::default(), &long);
        assert!(report.valid, "{:?}", report.errors);
    }

    #[test]
    fn test_policy_gates_rules_independently() {
        let mut policy = SecurityPolicy::default();
        policy.password_require_special_chars = false;
        let report = validate_password(&policy, "longenoughpw");
        assert!(report.valid);

        policy.password_min_length = 20;
        let report = validate_password(&policy, "longenoughpw");
        assert_eq!(report.errors.len(), 1);
    }
}
