use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use uuid::Uuid;

/// Upper bound on buffered events in [`MemoryAuditSink`].
const MAX_BUFFERED_EVENTS: usize = 5_000;

/// Severity of an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditSeverity {
    Info,
    Warning,
    /// Hijack signals and denied sensitive actions.
    High,
}

/// One event on the audit stream.
///
/// Every state-changing security operation emits one of these for an
/// external logging/monitoring collaborator.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    /// Machine-readable event name, e.g. `session_created`.
    pub event: String,
    /// The user involved, when known.
    pub user_id: Option<Uuid>,
    /// When the event happened.
    pub timestamp: DateTime<Utc>,
    /// Fingerprint of the device involved, when known.
    pub device_fingerprint: Option<String>,
    /// Event severity.
    pub severity: AuditSeverity,
    /// Free-form event detail.
    pub detail: sonic_rs::Value,
}

impl AuditEvent {
    /// Creates an info-severity event stamped with the current time.
    pub fn new(event: impl Into<String>) -> Self {
        Self {
            event: event.into(),
            user_id: None,
            timestamp: Utc::now(),
            device_fingerprint: None,
            severity: AuditSeverity::Info,
            detail: sonic_rs::json!({}),
        }
    }

    /// Sets the user involved.
    pub fn user(mut self, user_id: Uuid) -> Self {
        self.user_id = Some(user_id);
        self
    }

    /// Sets the device fingerprint involved.
    pub fn fingerprint(mut self, fingerprint: impl Into<String>) -> Self {
        self.device_fingerprint = Some(fingerprint.into());
        self
    }

    /// Sets the severity.
    pub fn severity(mut self, severity: AuditSeverity) -> Self {
        self.severity = severity;
        self
    }

    /// Sets the event detail.
    pub fn detail(mut self, detail: sonic_rs::Value) -> Self {
        self.detail = detail;
        self
    }
}

/// Destination for the audit event stream.
pub trait AuditSink: Send + Sync {
    /// Records one event.
    fn record(&self, event: AuditEvent);
}

/// The default sink: forwards events to `tracing`.
#[derive(Default)]
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, event: AuditEvent) {
        match event.severity {
            AuditSeverity::High => tracing::warn!(
                event = %event.event,
                user_id = ?event.user_id,
                detail = %event.detail,
                "🚨 Security event"
            ),
            AuditSeverity::Warning => tracing::warn!(
                event = %event.event,
                user_id = ?event.user_id,
                detail = %event.detail,
                "⚠️  Security event"
            ),
            AuditSeverity::Info => tracing::info!(
                event = %event.event,
                user_id = ?event.user_id,
                detail = %event.detail,
                "🔐 Security event"
            ),
        }
    }
}

/// A capped in-memory sink, mainly for tests and diagnostics.
#[derive(Default)]
pub struct MemoryAuditSink {
    events: Mutex<Vec<AuditEvent>>,
}

impl MemoryAuditSink {
    /// Creates an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a snapshot of all buffered events.
    pub fn events(&self) -> Vec<AuditEvent> {
        self.events.lock().clone()
    }

    /// Returns buffered events with the given name.
    pub fn events_named(&self, name: &str) -> Vec<AuditEvent> {
        self.events
            .lock()
            .iter()
            .filter(|e| e.event == name)
            .cloned()
            .collect()
    }
}

impl AuditSink for MemoryAuditSink {
    fn record(&self, event: AuditEvent) {
        let mut events = self.events.lock();
        if events.len() >= MAX_BUFFERED_EVENTS {
            events.remove(0);
        }
        events.push(event);
    }
}
