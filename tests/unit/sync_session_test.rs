//! Unit tests for the sync session's background tasks.
//!
//! The poll timer and the push subscription run as real tokio tasks
//! here. Each test picks a poll interval that keeps the channel under
//! test isolated: push-only tests use an interval longer than the test,
//! poll tests use a short one.

use std::sync::Arc;
use std::time::Duration;

use marksync::managers::synchronizer::{SyncSession, SyncState};
use marksync::service::MemoryService;
use marksync::types::bookmark::Bookmark;
use marksync::types::identity::Identity;

/// Long enough that no poll tick fires during a push-only test.
const POLL_NEVER: Duration = Duration::from_secs(60);
const SETTLE: Duration = Duration::from_millis(100);

fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: None,
    }
}

fn ghost(id: i64) -> Bookmark {
    Bookmark {
        id,
        title: "Ghost".to_string(),
        url: "https://ghost.example".to_string(),
        owner: "user-1".to_string(),
    }
}

async fn open_session(service: &Arc<MemoryService>, poll: Duration) -> SyncSession {
    SyncSession::open(identity("user-1"), service.clone(), poll).await
}

#[tokio::test]
async fn open_performs_the_initial_fetch_and_goes_live() {
    let service = Arc::new(MemoryService::new());
    service.seed("user-1", "First", "https://one.example");
    service.seed("user-1", "Second", "https://two.example");

    let session = open_session(&service, POLL_NEVER).await;

    assert_eq!(session.state(), SyncState::Live);
    assert!(session.push_available());
    let list = session.bookmarks();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].title, "Second");
}

#[tokio::test]
async fn push_events_are_applied_to_the_list() {
    let service = Arc::new(MemoryService::new());
    let session = open_session(&service, POLL_NEVER).await;

    service.emit_insert(ghost(7));
    tokio::time::sleep(SETTLE).await;
    assert_eq!(session.bookmarks().len(), 1);
    assert_eq!(session.bookmarks()[0].id, 7);

    service.emit_delete("user-1", 7);
    tokio::time::sleep(SETTLE).await;
    assert!(session.bookmarks().is_empty());
}

#[tokio::test]
async fn push_events_for_other_owners_are_not_applied() {
    let service = Arc::new(MemoryService::new());
    let session = open_session(&service, POLL_NEVER).await;

    let mut other = ghost(3);
    other.owner = "user-2".to_string();
    service.emit_insert(other);
    tokio::time::sleep(SETTLE).await;

    assert!(session.bookmarks().is_empty());
}

#[tokio::test]
async fn poll_overwrite_heals_a_push_insert_the_table_never_saw() {
    let service = Arc::new(MemoryService::new());
    let session = open_session(&service, Duration::from_millis(300)).await;

    // The push channel runs ahead of the table (replication lag)
    service.emit_insert(ghost(7));
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert_eq!(session.bookmarks().len(), 1);

    // The next full refresh returns the table's truth: no id 7
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(session.bookmarks().is_empty());
}

#[tokio::test]
async fn poll_picks_up_rows_created_elsewhere() {
    let service = Arc::new(MemoryService::new());
    let session = open_session(&service, Duration::from_millis(100)).await;

    // A row appears in the table without any push event
    service.seed("user-1", "Elsewhere", "https://elsewhere.example");
    tokio::time::sleep(Duration::from_millis(350)).await;

    let list = session.bookmarks();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Elsewhere");
}

#[tokio::test]
async fn subscription_failure_clears_the_flag_but_not_the_timer() {
    let service = Arc::new(MemoryService::new());
    service.set_subscribe_failing(true);

    let session = open_session(&service, Duration::from_millis(100)).await;
    assert!(!session.push_available());
    assert_eq!(session.state(), SyncState::Live);

    // The poll timer keeps refreshing regardless of the flag
    service.seed("user-1", "Polled", "https://polled.example");
    tokio::time::sleep(Duration::from_millis(350)).await;
    assert_eq!(session.bookmarks().len(), 1);
}

#[tokio::test]
async fn dropping_the_session_stops_both_channels() {
    let service = Arc::new(MemoryService::new());
    let session = open_session(&service, Duration::from_millis(50)).await;
    assert!(session.bookmarks().is_empty());

    drop(session);
    tokio::time::sleep(SETTLE).await;

    // Events after teardown go nowhere; emitting must not panic and the
    // forwarding task ends once the subscriber is gone.
    service.emit_insert(ghost(9));
    service.seed("user-1", "Late", "https://late.example");
    tokio::time::sleep(SETTLE).await;
}
