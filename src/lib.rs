//! signguard: client-side security and session subsystem for a
//! certificate-signing platform.
//!
//! Provides encrypted local persistence, a device-fingerprint-bound
//! session lifecycle with idle timeout, login-attempt tracking with
//! lockout, a role/permission model, MFA gating, risk and health
//! scoring, and a signer-domain authorization layer.
//!
//! None of this is a security boundary against a hostile client: the
//! fingerprint, rate-limiter and lockout state all live in storage the
//! end user controls. It is an anti-abuse/UX heuristic layer; real
//! enforcement belongs server-side.

pub mod audit;
pub mod client;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod state;
pub mod telemetry;

pub mod crypto {
    pub mod aes;
    pub mod hash;
    pub mod token;
}

pub mod models {
    pub mod attempt;
    pub mod permission;
    pub mod session;
    pub mod user;
}

pub mod storage {
    pub mod rate_limit;
    pub mod store;
}

pub mod services {
    pub mod auth;
    pub mod health;
    pub mod ledger;
    pub mod mfa;
    pub mod permissions;
    pub mod sessions;
    pub mod signer;
}

pub mod validation {
    pub mod auth;
    pub mod files;
    pub mod input;
}

pub use config::{Environment, ExecutionMode, SecurityConfig, SecurityPolicy};
pub use error::{Result, SecurityError};
pub use state::SecurityContext;
