mod common;

use chrono::{Duration, Utc};
use uuid::Uuid;

use common::{harness, user};
use signguard::models::session::SignerSession;
use signguard::models::user::Role;
use signguard::services::signer::{SIGNER_SESSION_CAP_HOURS, SignerGuard};
use signguard::state::SIGNER_SESSION_KEY;

#[test]
fn test_signer_domain_role_gate() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);

    assert!(guard.validate_signer_access(&user(Role::Signer)));
    assert!(guard.validate_signer_access(&user(Role::Admin)));
    assert!(!guard.validate_signer_access(&user(Role::Staff)));
    assert!(!guard.validate_signer_access(&user(Role::Viewer)));

    assert!(guard.validate_document_access(&user(Role::Signer), "doc-1", "view"));
    assert!(!guard.validate_document_access(&user(Role::Viewer), "doc-1", "view"));
}

#[test]
fn test_signature_access_requires_ownership() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);
    let other_owner = Uuid::new_v4();

    assert!(guard.validate_signature_access(&signer, signer.id, "delete"));
    assert!(!guard.validate_signature_access(&signer, other_owner, "delete"));

    // Admins are exempt from the ownership check.
    assert!(guard.validate_signature_access(&user(Role::Admin), other_owner, "delete"));

    // No signer access means no signature access, owned or not.
    let staff = user(Role::Staff);
    assert!(!guard.validate_signature_access(&staff, staff.id, "delete"));
}

#[test]
fn test_batch_signing_warnings_scale_with_recipients() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    let decision = guard.validate_batch_signing(&signer, 10);
    assert!(decision.allowed);
    assert!(decision.warnings.is_empty());

    let decision = guard.validate_batch_signing(&signer, 150);
    assert!(decision.allowed);
    assert_eq!(decision.warnings.len(), 1);
    assert!(decision.warnings[0].contains("Large recipient count (150)"));

    let decision = guard.validate_batch_signing(&signer, 600);
    assert!(decision.allowed);
    assert_eq!(decision.warnings.len(), 2);
    assert!(decision.warnings[1].contains("Too many recipients (600)"));

    let decision = guard.validate_batch_signing(&user(Role::Staff), 10);
    assert!(!decision.allowed);
    assert!(decision.warnings[0].contains("signing privileges"));
}

#[test]
fn test_batch_signing_rate_limit_exhausts() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    for _ in 0..5 {
        assert!(guard.validate_batch_signing(&signer, 1).allowed);
    }

    let decision = guard.validate_batch_signing(&signer, 1);
    assert!(!decision.allowed);
    assert!(decision.warnings[0].contains("Batch signing limit reached"));
    assert_eq!(h.audit.events_named("batch_signing_denied").len(), 1);

    // The limiter is keyed per user.
    let another = user(Role::Admin);
    assert!(guard.validate_batch_signing(&another, 1).allowed);
}

#[test]
fn test_signing_session_tracks_documents_and_signatures() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    // No session: activity has nowhere to land.
    assert!(!guard.record_document_activity("doc-1").unwrap());
    assert!(!guard.record_signature().unwrap());
    assert!(guard.session_summary().is_none());

    guard.start_signing_session(&signer).unwrap();
    assert!(guard.record_document_activity("doc-1").unwrap());
    assert!(guard.record_document_activity("doc-2").unwrap());
    assert!(guard.record_document_activity("doc-1").unwrap());
    assert!(guard.record_signature().unwrap());
    assert!(guard.record_signature().unwrap());

    let summary = guard.session_summary().unwrap();
    assert_eq!(summary.documents_viewed, 2);
    assert_eq!(summary.signatures_created, 2);

    assert_eq!(h.audit.events_named("signer_session_started").len(), 1);
}

#[test]
fn test_signing_session_idle_window() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    assert!(!guard.validate_signing_session(&signer));

    guard.start_signing_session(&signer).unwrap();
    assert!(guard.validate_signing_session(&signer));

    // Rewind activity past the 30-minute idle definition.
    let mut raw: SignerSession = h.ctx.store.get_item(SIGNER_SESSION_KEY).unwrap();
    raw.last_activity = Utc::now() - Duration::minutes(31);
    h.ctx
        .store
        .set_item(SIGNER_SESSION_KEY, &raw, SIGNER_SESSION_CAP_HOURS * 60)
        .unwrap();

    assert!(!guard.validate_signing_session(&signer));

    // Fresh activity revalidates it.
    assert!(guard.record_document_activity("doc-1").unwrap());
    assert!(guard.validate_signing_session(&signer));
}

#[test]
fn test_signing_session_hard_cap_survives_activity() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    guard.start_signing_session(&signer).unwrap();

    // Fresh activity, but the session started beyond the 8-hour cap.
    let mut raw: SignerSession = h.ctx.store.get_item(SIGNER_SESSION_KEY).unwrap();
    raw.start_time = Utc::now() - Duration::hours(9);
    raw.last_activity = Utc::now();
    h.ctx
        .store
        .set_item(SIGNER_SESSION_KEY, &raw, SIGNER_SESSION_CAP_HOURS * 60)
        .unwrap();

    assert!(guard.current_signing_session().is_none());
    assert!(!guard.validate_signing_session(&signer));
    // The record is gone; activity cannot resurrect it.
    assert!(h.ctx.store.get_item::<SignerSession>(SIGNER_SESSION_KEY).is_none());
    assert!(!guard.record_document_activity("doc-1").unwrap());
}

#[test]
fn test_end_signing_session_logs_totals() {
    let h = harness();
    let guard = SignerGuard::new(&h.ctx);
    let signer = user(Role::Signer);

    guard.start_signing_session(&signer).unwrap();
    guard.record_document_activity("doc-1").unwrap();
    guard.record_signature().unwrap();

    guard.end_signing_session();
    assert!(guard.current_signing_session().is_none());

    let events = h.audit.events_named("signer_session_ended");
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].user_id, Some(signer.id));

    // Ending twice is harmless.
    guard.end_signing_session();
    assert_eq!(h.audit.events_named("signer_session_ended").len(), 1);
}
