#![allow(dead_code)]

use std::path::Path;
use std::sync::Arc;

use uuid::Uuid;

use signguard::audit::MemoryAuditSink;
use signguard::client::{
    ApiFailure, ApiResult, AuthApi, ChangePasswordRequest, LoginRequest, MfaEnrollment,
    VerifyMfaRequest,
};
use signguard::fingerprint::EnvironmentSignals;
use signguard::models::user::{Role, User};
use signguard::{Result, SecurityConfig, SecurityContext};

/// Fixed application key shared by every test context.
pub const TEST_MASTER_KEY: [u8; 32] = [7u8; 32];

/// A context plus handles the tests assert against.
pub struct TestHarness {
    pub ctx: SecurityContext,
    pub audit: Arc<MemoryAuditSink>,
    // Held so the storage directory outlives the context.
    pub _dir: Option<tempfile::TempDir>,
}

/// Deterministic fingerprint signals distinguished by `device_tag`.
pub fn signals(device_tag: &str) -> EnvironmentSignals {
    EnvironmentSignals {
        user_agent: "signguard-tests/1.0".to_string(),
        languages: vec!["en-US".to_string()],
        screen_width: 1920,
        screen_height: 1080,
        color_depth: 24,
        timezone_offset_minutes: 0,
        hardware_concurrency: 4,
        device_memory_gb: 8,
        canvas_signature: device_tag.to_string(),
    }
}

/// Builds a harness with its own storage directory.
pub fn harness() -> TestHarness {
    let dir = tempfile::tempdir().unwrap();
    let mut h = harness_at(dir.path(), "device-a");
    h._dir = Some(dir);
    h
}

/// Builds a harness over an existing storage directory, simulating a
/// given device.
pub fn harness_at(dir: &Path, device_tag: &str) -> TestHarness {
    signguard::telemetry::init_tracing();

    let mut config = SecurityConfig::new(dir, TEST_MASTER_KEY);
    config.signals = Some(signals(device_tag));

    let audit = Arc::new(MemoryAuditSink::new());
    let ctx = SecurityContext::new(config)
        .unwrap()
        .with_audit(audit.clone());

    TestHarness {
        ctx,
        audit,
        _dir: None,
    }
}

/// A test user with the given role.
pub fn user(role: Role) -> User {
    User {
        id: Uuid::new_v4(),
        email: format!("{}@example.com", role.as_str()),
        name: format!("Test {}", role.as_str()),
        role,
        mfa_enabled: false,
    }
}

/// A scripted stand-in for the remote authentication API.
pub struct MockAuthApi {
    pub user: User,
    pub accept_password: String,
    pub accept_code: String,
}

impl MockAuthApi {
    pub fn accepting(user: User) -> Self {
        Self {
            user,
            accept_password: "correct-horse!".to_string(),
            accept_code: "123456".to_string(),
        }
    }
}

impl AuthApi for MockAuthApi {
    async fn login(&self, req: &LoginRequest) -> Result<ApiResult<User>> {
        if req.password == self.accept_password {
            Ok(ApiResult::Success(self.user.clone()))
        } else {
            Ok(ApiResult::Failure(ApiFailure {
                message: "Invalid email or password".to_string(),
                reason: "invalid_credentials".to_string(),
            }))
        }
    }

    async fn verify_mfa(&self, req: &VerifyMfaRequest) -> Result<ApiResult<User>> {
        if req.code == self.accept_code {
            Ok(ApiResult::Success(self.user.clone()))
        } else {
            Ok(ApiResult::Failure(ApiFailure {
                message: "Invalid verification code".to_string(),
                reason: "invalid_code".to_string(),
            }))
        }
    }

    async fn change_password(
        &self,
        _bearer: &str,
        _csrf: &str,
        req: &ChangePasswordRequest,
    ) -> Result<ApiResult<()>> {
        if req.current_password == self.accept_password {
            Ok(ApiResult::Success(()))
        } else {
            Ok(ApiResult::Failure(ApiFailure {
                message: "Current password is incorrect".to_string(),
                reason: "invalid_credentials".to_string(),
            }))
        }
    }

    async fn enable_mfa(&self, _bearer: &str, _csrf: &str) -> Result<ApiResult<MfaEnrollment>> {
        Ok(ApiResult::Success(MfaEnrollment {
            secret: "MOCKSECRETBASE32".to_string(),
        }))
    }

    async fn disable_mfa(&self, _bearer: &str, _csrf: &str) -> Result<ApiResult<()>> {
        Ok(ApiResult::Success(()))
    }
}
