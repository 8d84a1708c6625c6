use std::collections::HashMap;

use chrono::{DateTime, Duration, Utc};
use parking_lot::Mutex;

#[derive(Debug, Clone)]
struct Window {
    count: u32,
    reset_at: DateTime<Utc>,
}

/// A fixed-window rate limiter.
///
/// State is in-memory only and intentionally NOT persisted across process
/// restarts.
#[derive(Default)]
pub struct FixedWindowLimiter {
    windows: Mutex<HashMap<String, Window>>,
}

impl FixedWindowLimiter {
    /// Creates an empty limiter.
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks and consumes one call against the window for `key`.
    ///
    /// The first call in a window seeds the count at 1; further calls
    /// increment until `count >= max_attempts`, then deny. The window
    /// resets once `now >= reset_at`.
    ///
    /// # Arguments
    ///
    /// * `key` - The identity being limited, e.g. `login:user@example.com`.
    /// * `max_attempts` - Calls allowed per window.
    /// * `window_minutes` - Width of the window.
    ///
    /// # Returns
    ///
    /// `true` if the call is allowed.
    pub fn check_rate_limit(&self, key: &str, max_attempts: u32, window_minutes: i64) -> bool {
        let now = Utc::now();
        let mut windows = self.windows.lock();

        match windows.get_mut(key) {
            Some(window) if now < window.reset_at => {
                if window.count >= max_attempts {
                    tracing::warn!("🚦 Rate limit exceeded for: {}", key);
                    return false;
                }
                window.count += 1;
                true
            }
            _ => {
                windows.insert(
                    key.to_string(),
                    Window {
                        count: 1,
                        reset_at: now + Duration::minutes(window_minutes),
                    },
                );
                true
            }
        }
    }

    /// Minutes until the window for `key` resets, if one is open.
    ///
    /// Used to tell callers how long to wait after a denial.
    pub fn minutes_until_reset(&self, key: &str) -> Option<i64> {
        let windows = self.windows.lock();
        windows.get(key).and_then(|w| {
            let remaining = w.reset_at - Utc::now();
            (remaining > Duration::zero()).then(|| remaining.num_minutes().max(1))
        })
    }

    /// Drops the window for `key`, if any.
    pub fn reset(&self, key: &str) {
        self.windows.lock().remove(key);
    }
}
