use serde::Serialize;

use crate::config::{Environment, SecurityPolicy};

/// Outcome of a security health check.
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// 0-100, higher is healthier.
    pub score: u32,
    /// One entry per detected issue.
    pub issues: Vec<String>,
    /// One recommendation per issue, same order.
    pub recommendations: Vec<String>,
}

/// Scores the current configuration's security posture.
///
/// Starts at 100 and deducts a documented penalty per unsafe condition,
/// appending a paired issue and recommendation for each; the score floors
/// at 0.
///
/// # Arguments
///
/// * `environment` - The execution environment.
/// * `policy` - The effective security policy.
pub fn perform_security_health_check(
    environment: &Environment,
    policy: &SecurityPolicy,
) -> HealthReport {
    let mut deduction = 0u32;
    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    if !environment.secure_context {
        deduction += 30;
        issues.push("Application is not running in a secure transport context".to_string());
        recommendations.push("Serve the application over HTTPS".to_string());
    }

    if policy.session_timeout_minutes > 60 {
        deduction += 10;
        issues.push(format!(
            "Session timeout is long ({} minutes)",
            policy.session_timeout_minutes
        ));
        recommendations.push("Reduce the session timeout to 60 minutes or less".to_string());
    }

    if !policy.require_mfa {
        deduction += 20;
        issues.push("Multi-factor authentication is not required".to_string());
        recommendations.push("Enable the require_mfa policy option".to_string());
    }

    if policy.password_min_length < 8 {
        deduction += 15;
        issues.push(format!(
            "Minimum password length is weak ({} characters)",
            policy.password_min_length
        ));
        recommendations.push("Require passwords of at least 8 characters".to_string());
    }

    HealthReport {
        score: 100u32.saturating_sub(deduction),
        issues,
        recommendations,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ExecutionMode;

    fn secure_env() -> Environment {
        Environment {
            mode: ExecutionMode::Production,
            secure_context: true,
        }
    }

    fn safe_policy() -> SecurityPolicy {
        SecurityPolicy {
            require_mfa: true,
            ..SecurityPolicy::default()
        }
    }

    #[test]
    fn test_healthy_configuration_scores_100() {
        let report = perform_security_health_check(&secure_env(), &safe_policy());
        assert_eq!(report.score, 100);
        assert!(report.issues.is_empty());
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn test_each_condition_deducts_documented_penalty() {
        let env = secure_env();

        let mut policy = safe_policy();
        policy.session_timeout_minutes = 120;
        assert_eq!(perform_security_health_check(&env, &policy).score, 90);

        let mut policy = safe_policy();
        policy.require_mfa = false;
        assert_eq!(perform_security_health_check(&env, &policy).score, 80);

        let mut policy = safe_policy();
        policy.password_min_length = 6;
        assert_eq!(perform_security_health_check(&env, &policy).score, 85);

        let insecure = Environment {
            mode: ExecutionMode::Development,
            secure_context: false,
        };
        assert_eq!(perform_security_health_check(&insecure, &safe_policy()).score, 70);
    }

    #[test]
    fn test_issues_pair_with_recommendations() {
        let insecure = Environment {
            mode: ExecutionMode::Development,
            secure_context: false,
        };
        let policy = SecurityPolicy {
            session_timeout_minutes: 90,
            require_mfa: false,
            password_min_length: 4,
            ..SecurityPolicy::default()
        };

        let report = perform_security_health_check(&insecure, &policy);
        assert_eq!(report.score, 100 - 30 - 10 - 20 - 15);
        assert_eq!(report.issues.len(), 4);
        assert_eq!(report.issues.len(), report.recommendations.len());
    }
}
