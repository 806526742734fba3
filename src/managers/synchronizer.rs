//! Bookmark View Synchronizer for marksync.
//!
//! Maintains the in-memory ordered list of bookmark records for one
//! identity, kept consistent with the remote table via two redundant
//! update channels (a periodic full refresh and a push-event
//! subscription), plus direct local mutation on user-initiated create
//! and delete actions.
//!
//! [`Synchronizer`] holds the list and the update operations;
//! [`SyncSession`] owns one synchronizer together with its two background
//! tasks, and tears both down when dropped.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use tokio::task::JoinHandle;

use crate::service::{ChangeSubscription, RemoteService};
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::change::ChangeEvent;
use crate::types::errors::CreateError;
use crate::types::identity::Identity;

/// Lifecycle state of a sync session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncState {
    /// The initial full fetch has not completed yet.
    Initializing,
    /// The list is populated and both update channels are running.
    Live,
}

/// The in-memory mirror of the remote `bookmarks` table for one identity.
pub struct Synchronizer {
    identity: Identity,
    service: Arc<dyn RemoteService>,
    bookmarks: Mutex<Vec<Bookmark>>,
    state: Mutex<SyncState>,
    push_available: AtomicBool,
}

impl Synchronizer {
    pub fn new(identity: Identity, service: Arc<dyn RemoteService>) -> Self {
        Self {
            identity,
            service,
            bookmarks: Mutex::new(Vec::new()),
            state: Mutex::new(SyncState::Initializing),
            push_available: AtomicBool::new(true),
        }
    }

    fn list(&self) -> MutexGuard<'_, Vec<Bookmark>> {
        self.bookmarks.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Snapshot of the current list, newest first.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.list().clone()
    }

    pub fn state(&self) -> SyncState {
        *self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Whether the push subscription was established. The poll timer does
    /// not consult this flag; it keeps running either way.
    pub fn push_available(&self) -> bool {
        self.push_available.load(Ordering::SeqCst)
    }

    pub(crate) fn mark_live(&self) {
        *self.state.lock().unwrap_or_else(|e| e.into_inner()) = SyncState::Live;
    }

    pub(crate) fn mark_push_unavailable(&self) {
        self.push_available.store(false, Ordering::SeqCst);
    }

    /// Full refresh: fetches all bookmarks owned by this identity, newest
    /// first, and replaces the entire local list. On failure the list is
    /// left unchanged; the next tick retries implicitly.
    pub async fn refresh(&self) {
        match self.service.select_owned(&self.identity.id).await {
            Ok(records) => *self.list() = records,
            Err(e) => {
                tracing::debug!("full refresh failed, keeping stale list: {}", e);
            }
        }
    }

    /// Creates a bookmark. Empty fields abort before any network call;
    /// on success the record returned by the store, carrying its
    /// authoritative id, is prepended locally.
    pub async fn create(&self, title: &str, url: &str) -> Result<Bookmark, CreateError> {
        if title.is_empty() {
            return Err(CreateError::EmptyTitle);
        }
        if url.is_empty() {
            return Err(CreateError::EmptyUrl);
        }

        let record = self
            .service
            .insert(NewBookmark {
                owner: self.identity.id.clone(),
                title: title.to_string(),
                url: url.to_string(),
            })
            .await
            .map_err(|e| CreateError::Rejected(e.to_string()))?;

        self.apply_insert(record.clone());
        Ok(record)
    }

    /// Deletes a bookmark: requests removal from the store, then removes
    /// the id from the local list regardless of the remote outcome.
    pub async fn delete(&self, id: i64) {
        if let Err(e) = self.service.delete(id).await {
            tracing::debug!("remote delete of {} failed, removing locally anyway: {}", id, e);
        }
        self.apply_delete(id);
    }

    /// Applies an insert as an upsert-by-id: replaces the record in place
    /// when the id is already present, otherwise prepends.
    pub fn apply_insert(&self, record: Bookmark) {
        let mut list = self.list();
        match list.iter().position(|b| b.id == record.id) {
            Some(pos) => list[pos] = record,
            None => list.insert(0, record),
        }
    }

    /// Applies a delete by filtering the id out. Idempotent.
    pub fn apply_delete(&self, id: i64) {
        self.list().retain(|b| b.id != id);
    }
}

/// A live sync session: one [`Synchronizer`] plus its poll timer and push
/// subscription, all scoped to a single signed-in identity. Dropping the
/// session aborts both tasks and discards the list.
pub struct SyncSession {
    sync: Arc<Synchronizer>,
    poll_task: JoinHandle<()>,
    feed_task: JoinHandle<()>,
}

impl SyncSession {
    /// Opens a session: performs the initial full fetch, establishes the
    /// push subscription, then starts both background channels.
    pub async fn open(
        identity: Identity,
        service: Arc<dyn RemoteService>,
        poll_interval: Duration,
    ) -> Self {
        let sync = Arc::new(Synchronizer::new(identity, service.clone()));
        sync.refresh().await;

        let feed_task = match service.subscribe(&sync.identity().id).await {
            Ok(subscription) => tokio::spawn(run_change_feed(sync.clone(), subscription)),
            Err(e) => {
                tracing::warn!("push channel failed, falling back to polling: {}", e);
                sync.mark_push_unavailable();
                tokio::spawn(async {})
            }
        };
        let poll_task = tokio::spawn(run_poll(sync.clone(), poll_interval));
        sync.mark_live();

        Self {
            sync,
            poll_task,
            feed_task,
        }
    }

    pub fn identity(&self) -> &Identity {
        self.sync.identity()
    }

    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.sync.bookmarks()
    }

    pub fn state(&self) -> SyncState {
        self.sync.state()
    }

    pub fn push_available(&self) -> bool {
        self.sync.push_available()
    }

    pub async fn create(&self, title: &str, url: &str) -> Result<Bookmark, CreateError> {
        self.sync.create(title, url).await
    }

    pub async fn delete(&self, id: i64) {
        self.sync.delete(id).await
    }
}

impl Drop for SyncSession {
    fn drop(&mut self) {
        self.poll_task.abort();
        self.feed_task.abort();
    }
}

/// Periodic full refresh. Runs for the whole session, irrespective of
/// push-channel health.
async fn run_poll(sync: Arc<Synchronizer>, every: Duration) {
    let mut ticker = tokio::time::interval(every);
    // The first tick completes immediately and the initial fetch already
    // ran; consume it so refreshes start one interval from now.
    ticker.tick().await;
    loop {
        ticker.tick().await;
        sync.refresh().await;
    }
}

/// Applies push events to the list until the channel closes or the
/// session is dropped.
async fn run_change_feed(sync: Arc<Synchronizer>, mut subscription: ChangeSubscription) {
    while let Some(event) = subscription.next_event().await {
        match event {
            ChangeEvent::Inserted(record) => sync.apply_insert(record),
            ChangeEvent::Deleted { id } => sync.apply_delete(id),
        }
    }
}
