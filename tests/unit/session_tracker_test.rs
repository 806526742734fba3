//! Unit tests for the session tracker.
//!
//! Identity resolution at startup, the resolution-failure collapse to
//! "signed out", and identity replacement on auth-change events.

use marksync::managers::session_tracker::SessionTracker;
use marksync::service::MemoryService;
use marksync::types::identity::{AuthChange, Identity};

fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: None,
    }
}

#[tokio::test]
async fn startup_resolves_an_existing_identity() {
    let service = MemoryService::new();
    service.set_identity(identity("user-1"));

    let tracker = SessionTracker::start(&service).await;
    assert!(tracker.is_authenticated());
    assert_eq!(tracker.identity().map(|i| i.id.as_str()), Some("user-1"));
}

#[tokio::test]
async fn startup_without_identity_is_unauthenticated() {
    let service = MemoryService::new();
    let tracker = SessionTracker::start(&service).await;
    assert!(!tracker.is_authenticated());
    assert_eq!(tracker.identity(), None);
}

#[tokio::test]
async fn resolution_failure_is_treated_as_signed_out() {
    let service = MemoryService::new();
    service.set_identity(identity("user-1"));
    service.set_auth_failing(true);

    let tracker = SessionTracker::start(&service).await;
    assert!(!tracker.is_authenticated());
}

#[tokio::test]
async fn sign_in_event_replaces_the_held_identity() {
    let service = MemoryService::new();
    let mut tracker = SessionTracker::start(&service).await;

    service.set_identity(identity("user-1"));
    let change = tracker.next_change().await;
    assert_eq!(change, Some(AuthChange::SignedIn(identity("user-1"))));
    assert_eq!(tracker.identity().map(|i| i.id.as_str()), Some("user-1"));

    // A different identity signing in replaces, not accumulates
    service.set_identity(identity("user-2"));
    tracker.next_change().await;
    assert_eq!(tracker.identity().map(|i| i.id.as_str()), Some("user-2"));
}

#[tokio::test]
async fn sign_out_event_clears_the_identity() {
    let service = MemoryService::new();
    service.set_identity(identity("user-1"));
    let mut tracker = SessionTracker::start(&service).await;

    service.clear_identity();
    let change = tracker.next_change().await;
    assert_eq!(change, Some(AuthChange::SignedOut));
    assert!(!tracker.is_authenticated());
}
