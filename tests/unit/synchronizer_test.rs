//! Unit tests for the bookmark view synchronizer's list operations.
//!
//! These exercise refresh/create/delete and the push-event apply paths
//! directly, without the background tasks (see sync_session_test for
//! those).

use std::sync::Arc;

use rstest::rstest;

use marksync::managers::synchronizer::{SyncState, Synchronizer};
use marksync::service::MemoryService;
use marksync::types::bookmark::Bookmark;
use marksync::types::errors::CreateError;
use marksync::types::identity::Identity;

fn identity(id: &str) -> Identity {
    Identity {
        id: id.to_string(),
        email: None,
    }
}

fn setup() -> (Arc<MemoryService>, Synchronizer) {
    let service = Arc::new(MemoryService::new());
    let sync = Synchronizer::new(identity("user-1"), service.clone());
    (service, sync)
}

fn record(id: i64, title: &str) -> Bookmark {
    Bookmark {
        id,
        title: title.to_string(),
        url: format!("https://{}.example", title.to_lowercase()),
        owner: "user-1".to_string(),
    }
}

#[test]
fn starts_initializing_with_an_empty_list() {
    let (_service, sync) = setup();
    assert_eq!(sync.state(), SyncState::Initializing);
    assert!(sync.bookmarks().is_empty());
    assert!(sync.push_available());
}

#[tokio::test]
async fn refresh_replaces_the_list_newest_first() {
    let (service, sync) = setup();
    service.seed("user-1", "First", "https://one.example");
    service.seed("user-1", "Second", "https://two.example");

    sync.refresh().await;

    let list = sync.bookmarks();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0].title, "Second");
    assert_eq!(list[1].title, "First");
}

#[tokio::test]
async fn refresh_failure_keeps_the_stale_list() {
    let (service, sync) = setup();
    service.seed("user-1", "Kept", "https://kept.example");
    sync.refresh().await;
    assert_eq!(sync.bookmarks().len(), 1);

    service.seed("user-1", "Unseen", "https://unseen.example");
    service.set_select_failing(true);
    sync.refresh().await;

    // Still the old snapshot
    let list = sync.bookmarks();
    assert_eq!(list.len(), 1);
    assert_eq!(list[0].title, "Kept");
}

#[tokio::test]
async fn create_prepends_the_record_with_its_store_assigned_id() {
    let (service, sync) = setup();
    service.seed("user-1", "Existing", "https://existing.example");
    sync.refresh().await;

    let created = sync.create("Example", "https://example.com").await.unwrap();
    assert_eq!(created.title, "Example");

    let list = sync.bookmarks();
    assert_eq!(list[0].id, created.id);
    assert_eq!(list[0].title, "Example");
    assert_eq!(list.len(), 2);
}

#[rstest]
#[case("", "https://example.com")]
#[case("Example", "")]
#[case("", "")]
#[tokio::test]
async fn create_with_empty_fields_makes_no_network_call(
    #[case] title: &str,
    #[case] url: &str,
) {
    let (service, sync) = setup();

    let result = sync.create(title, url).await;
    assert!(matches!(
        result,
        Err(CreateError::EmptyTitle) | Err(CreateError::EmptyUrl)
    ));
    // Nothing reached the store
    assert_eq!(service.row_count(), 0);
    assert!(sync.bookmarks().is_empty());
}

#[tokio::test]
async fn create_failure_leaves_local_state_untouched() {
    let (service, sync) = setup();
    service.set_insert_failing(true);

    let result = sync.create("Example", "https://example.com").await;
    assert!(matches!(result, Err(CreateError::Rejected(_))));
    assert!(sync.bookmarks().is_empty());
}

#[tokio::test]
async fn delete_removes_locally_even_when_the_remote_call_fails() {
    let (service, sync) = setup();
    service.seed("user-1", "Doomed", "https://doomed.example");
    sync.refresh().await;
    let id = sync.bookmarks()[0].id;

    service.set_delete_failing(true);
    sync.delete(id).await;

    assert!(sync.bookmarks().is_empty());
    // The remote row survived the failed call
    assert_eq!(service.row_count(), 1);
}

#[test]
fn apply_insert_prepends_unknown_ids() {
    let (_service, sync) = setup();
    sync.apply_insert(record(1, "First"));
    sync.apply_insert(record(2, "Second"));

    let list = sync.bookmarks();
    assert_eq!(list[0].id, 2);
    assert_eq!(list[1].id, 1);
}

#[test]
fn apply_insert_replaces_an_existing_id_in_place() {
    let (_service, sync) = setup();
    sync.apply_insert(record(1, "First"));
    sync.apply_insert(record(2, "Second"));

    // Same id arriving again (e.g. after a concurrent refresh) replaces
    // rather than duplicating
    sync.apply_insert(record(1, "Renamed"));

    let list = sync.bookmarks();
    assert_eq!(list.len(), 2);
    assert_eq!(list[1].id, 1);
    assert_eq!(list[1].title, "Renamed");
}

#[test]
fn apply_delete_is_idempotent() {
    let (_service, sync) = setup();
    sync.apply_insert(record(1, "First"));

    sync.apply_delete(1);
    sync.apply_delete(1);

    assert!(sync.bookmarks().is_empty());
}
