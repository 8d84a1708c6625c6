use chrono::Local;
use serde::{Deserialize, Serialize};

use crate::crypto::hash;

/// Environment signals a device fingerprint is derived from.
///
/// Deterministic for a stable environment. This is a session-reuse
/// detector, not a strong identity anchor: every signal is under the
/// client's control.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentSignals {
    /// User agent string of the host application.
    pub user_agent: String,
    /// Preferred languages, most specific first.
    pub languages: Vec<String>,
    /// Screen width in pixels.
    pub screen_width: u32,
    /// Screen height in pixels.
    pub screen_height: u32,
    /// Color depth in bits.
    pub color_depth: u32,
    /// Timezone offset from UTC in minutes.
    pub timezone_offset_minutes: i32,
    /// Logical core count.
    pub hardware_concurrency: u32,
    /// Device memory hint in gigabytes.
    pub device_memory_gb: u32,
    /// Signature of a rendered canvas probe.
    pub canvas_signature: String,
}

impl EnvironmentSignals {
    /// Collects signals from the host environment.
    ///
    /// Screen geometry and device memory have no host equivalent here, so
    /// stable defaults stand in; embedders with real values should build
    /// the struct directly.
    pub fn detect() -> Self {
        let cores = std::thread::available_parallelism()
            .map(|n| n.get() as u32)
            .unwrap_or(1);

        let offset_minutes = Local::now().offset().local_minus_utc() / 60;

        Self {
            user_agent: format!(
                "signguard/{} ({}; {})",
                env!("CARGO_PKG_VERSION"),
                whoami::distro(),
                whoami::arch()
            ),
            languages: vec![
                std::env::var("LANG").unwrap_or_else(|_| "en-US".to_string()),
            ],
            screen_width: 1920,
            screen_height: 1080,
            color_depth: 24,
            timezone_offset_minutes: offset_minutes,
            hardware_concurrency: cores,
            device_memory_gb: 8,
            canvas_signature: "signguard-canvas-v1".to_string(),
        }
    }
}

/// Computes a stable device fingerprint from environment signals.
///
/// # Arguments
///
/// * `signals` - The collected environment signals.
///
/// # Returns
///
/// A hex digest identifying the device environment.
pub fn generate_fingerprint(signals: &EnvironmentSignals) -> String {
    let concatenated = format!(
        "{}|{}|{}x{}x{}|{}|{}|{}|{}",
        signals.user_agent,
        signals.languages.join(","),
        signals.screen_width,
        signals.screen_height,
        signals.color_depth,
        signals.timezone_offset_minutes,
        signals.hardware_concurrency,
        signals.device_memory_gb,
        signals.canvas_signature,
    );

    hash::hash(&concatenated)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signals() -> EnvironmentSignals {
        EnvironmentSignals {
            user_agent: "test-agent/1.0".to_string(),
            languages: vec!["en-US".to_string(), "pt-BR".to_string()],
            screen_width: 2560,
            screen_height: 1440,
            color_depth: 24,
            timezone_offset_minutes: -180,
            hardware_concurrency: 8,
            device_memory_gb: 16,
            canvas_signature: "canvas-abc".to_string(),
        }
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(generate_fingerprint(&signals()), generate_fingerprint(&signals()));
    }

    #[test]
    fn test_fingerprint_sensitive_to_any_signal() {
        let base = generate_fingerprint(&signals());

        let mut changed = signals();
        changed.timezone_offset_minutes = 0;
        assert_ne!(base, generate_fingerprint(&changed));

        let mut changed = signals();
        changed.canvas_signature = "canvas-xyz".to_string();
        assert_ne!(base, generate_fingerprint(&changed));
    }

    #[test]
    fn test_detect_is_stable() {
        assert_eq!(
            generate_fingerprint(&EnvironmentSignals::detect()),
            generate_fingerprint(&EnvironmentSignals::detect())
        );
    }
}
