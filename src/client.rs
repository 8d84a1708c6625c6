use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::models::user::User;

/// Request payload for `POST /auth/login`.
#[derive(Debug, Clone, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request payload for `POST /auth/verify-mfa`.
#[derive(Debug, Clone, Serialize)]
pub struct VerifyMfaRequest {
    pub email: String,
    pub code: String,
}

/// Request payload for `POST /auth/change-password`.
#[derive(Debug, Clone, Serialize)]
pub struct ChangePasswordRequest {
    pub current_password: String,
    pub new_password: String,
}

/// Failure body of a non-success response: `{message, reason}`.
///
/// `reason` is machine-readable (e.g. `invalid_credentials`) and feeds
/// the attempt ledger's `failure_reason`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFailure {
    pub message: String,
    pub reason: String,
}

/// Server-side MFA enrollment data returned by `POST /auth/enable-mfa`.
#[derive(Debug, Clone, Deserialize)]
pub struct MfaEnrollment {
    /// The shared secret for the authenticator app.
    pub secret: String,
}

/// Discriminated outcome of a remote call.
///
/// Application-level failures are data; only transport/serialization
/// problems surface as errors. No retry or backoff: failure is immediate.
#[derive(Debug, Clone)]
pub enum ApiResult<T> {
    Success(T),
    Failure(ApiFailure),
}

/// The consumed contract of the remote authentication API.
///
/// The API itself is an external collaborator; implementations only
/// shuttle the request/response shapes.
pub trait AuthApi {
    /// `POST /auth/login`.
    fn login(
        &self,
        req: &LoginRequest,
    ) -> impl Future<Output = Result<ApiResult<User>>> + Send;

    /// `POST /auth/verify-mfa`.
    fn verify_mfa(
        &self,
        req: &VerifyMfaRequest,
    ) -> impl Future<Output = Result<ApiResult<User>>> + Send;

    /// `POST /auth/change-password` (state-changing: bearer + CSRF).
    fn change_password(
        &self,
        bearer: &str,
        csrf: &str,
        req: &ChangePasswordRequest,
    ) -> impl Future<Output = Result<ApiResult<()>>> + Send;

    /// `POST /auth/enable-mfa` (state-changing: bearer + CSRF).
    fn enable_mfa(
        &self,
        bearer: &str,
        csrf: &str,
    ) -> impl Future<Output = Result<ApiResult<MfaEnrollment>>> + Send;

    /// `POST /auth/disable-mfa` (state-changing: bearer + CSRF).
    fn disable_mfa(
        &self,
        bearer: &str,
        csrf: &str,
    ) -> impl Future<Output = Result<ApiResult<()>>> + Send;
}

/// The reqwest-backed implementation of [`AuthApi`].
#[derive(Clone)]
pub struct HttpAuthClient {
    http: reqwest::Client,
    base_url: String,
}

impl HttpAuthClient {
    /// Creates a client against `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    async fn parse<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<ApiResult<T>> {
        if response.status().is_success() {
            Ok(ApiResult::Success(response.json().await?))
        } else {
            let status = response.status();
            let failure = response.json::<ApiFailure>().await.unwrap_or(ApiFailure {
                message: format!("Request failed with status {}", status),
                reason: "unknown".to_string(),
            });
            tracing::warn!("❌ Auth API failure ({}): {}", failure.reason, failure.message);
            Ok(ApiResult::Failure(failure))
        }
    }

    async fn parse_empty(response: reqwest::Response) -> Result<ApiResult<()>> {
        if response.status().is_success() {
            Ok(ApiResult::Success(()))
        } else {
            let status = response.status();
            let failure = response.json::<ApiFailure>().await.unwrap_or(ApiFailure {
                message: format!("Request failed with status {}", status),
                reason: "unknown".to_string(),
            });
            tracing::warn!("❌ Auth API failure ({}): {}", failure.reason, failure.message);
            Ok(ApiResult::Failure(failure))
        }
    }
}

impl AuthApi for HttpAuthClient {
    async fn login(&self, req: &LoginRequest) -> Result<ApiResult<User>> {
        let response = self
            .http
            .post(format!("{}/auth/login", self.base_url))
            .json(req)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn verify_mfa(&self, req: &VerifyMfaRequest) -> Result<ApiResult<User>> {
        let response = self
            .http
            .post(format!("{}/auth/verify-mfa", self.base_url))
            .json(req)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn change_password(
        &self,
        bearer: &str,
        csrf: &str,
        req: &ChangePasswordRequest,
    ) -> Result<ApiResult<()>> {
        let response = self
            .http
            .post(format!("{}/auth/change-password", self.base_url))
            .bearer_auth(bearer)
            .header("X-CSRF-Token", csrf)
            .json(req)
            .send()
            .await?;
        Self::parse_empty(response).await
    }

    async fn enable_mfa(&self, bearer: &str, csrf: &str) -> Result<ApiResult<MfaEnrollment>> {
        let response = self
            .http
            .post(format!("{}/auth/enable-mfa", self.base_url))
            .bearer_auth(bearer)
            .header("X-CSRF-Token", csrf)
            .send()
            .await?;
        Self::parse(response).await
    }

    async fn disable_mfa(&self, bearer: &str, csrf: &str) -> Result<ApiResult<()>> {
        let response = self
            .http
            .post(format!("{}/auth/disable-mfa", self.base_url))
            .bearer_auth(bearer)
            .header("X-CSRF-Token", csrf)
            .send()
            .await?;
        Self::parse_empty(response).await
    }
}
