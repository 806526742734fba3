//! In-process backend for marksync.
//!
//! Implements all three remote-service seams against in-memory state,
//! the analog of an in-memory database for tests and demo mode. Ids are
//! assigned from a counter, selects return rows newest-first, and every
//! insert/delete is broadcast to subscribed change feeds.
//!
//! Test hooks allow injecting auth-state transitions, raw push events
//! (e.g. an insert event whose row is not yet visible to selects), and
//! per-operation failures.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};

use crate::service::{AuthApi, BookmarkTable, ChangeFeed, ChangeSubscription};
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::change::ChangeEvent;
use crate::types::errors::{AuthError, RealtimeError, TableError};
use crate::types::identity::{AuthChange, Identity};

const EVENT_CAPACITY: usize = 64;

struct MemoryState {
    identity: Option<Identity>,
    // Insertion order; selects read this newest-first.
    rows: Vec<Bookmark>,
    next_id: i64,
}

/// In-memory implementation of the remote service.
pub struct MemoryService {
    state: Mutex<MemoryState>,
    auth_tx: broadcast::Sender<AuthChange>,
    change_tx: broadcast::Sender<(String, ChangeEvent)>,
    auth_failing: AtomicBool,
    select_failing: AtomicBool,
    insert_failing: AtomicBool,
    delete_failing: AtomicBool,
    subscribe_failing: AtomicBool,
}

impl MemoryService {
    pub fn new() -> Self {
        let (auth_tx, _) = broadcast::channel(EVENT_CAPACITY);
        let (change_tx, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            state: Mutex::new(MemoryState {
                identity: None,
                rows: Vec::new(),
                next_id: 1,
            }),
            auth_tx,
            change_tx,
            auth_failing: AtomicBool::new(false),
            select_failing: AtomicBool::new(false),
            insert_failing: AtomicBool::new(false),
            delete_failing: AtomicBool::new(false),
            subscribe_failing: AtomicBool::new(false),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Signs an identity in and emits the matching auth-change event.
    pub fn set_identity(&self, identity: Identity) {
        self.lock().identity = Some(identity.clone());
        let _ = self.auth_tx.send(AuthChange::SignedIn(identity));
    }

    /// Clears the identity and emits a signed-out event.
    pub fn clear_identity(&self) {
        self.lock().identity = None;
        let _ = self.auth_tx.send(AuthChange::SignedOut);
    }

    /// Stores a row directly, without broadcasting a change event.
    /// Returns the stored record. Used to stage pre-existing remote data.
    pub fn seed(&self, owner: &str, title: &str, url: &str) -> Bookmark {
        let mut state = self.lock();
        let record = Bookmark {
            id: state.next_id,
            title: title.to_string(),
            url: url.to_string(),
            owner: owner.to_string(),
        };
        state.next_id += 1;
        state.rows.push(record.clone());
        record
    }

    /// Broadcasts an insert event without storing the row: the push
    /// channel running ahead of the table, as under replication lag.
    pub fn emit_insert(&self, record: Bookmark) {
        let owner = record.owner.clone();
        let _ = self.change_tx.send((owner, ChangeEvent::Inserted(record)));
    }

    /// Broadcasts a delete event without touching stored rows.
    pub fn emit_delete(&self, owner: &str, id: i64) {
        let _ = self
            .change_tx
            .send((owner.to_string(), ChangeEvent::Deleted { id }));
    }

    /// Number of rows currently stored, across all owners.
    pub fn row_count(&self) -> usize {
        self.lock().rows.len()
    }

    pub fn set_auth_failing(&self, failing: bool) {
        self.auth_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_select_failing(&self, failing: bool) {
        self.select_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_insert_failing(&self, failing: bool) {
        self.insert_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_delete_failing(&self, failing: bool) {
        self.delete_failing.store(failing, Ordering::SeqCst);
    }

    pub fn set_subscribe_failing(&self, failing: bool) {
        self.subscribe_failing.store(failing, Ordering::SeqCst);
    }
}

impl Default for MemoryService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthApi for MemoryService {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        if self.auth_failing.load(Ordering::SeqCst) {
            return Err(AuthError::NetworkError("auth endpoint unreachable".to_string()));
        }
        Ok(self.lock().identity.clone())
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }

    /// Completes the whole sign-in inline: a canned identity derived from
    /// the provider name is signed in and the event emitted.
    async fn sign_in(&self, provider: &str) -> Result<String, AuthError> {
        let identity = Identity {
            id: format!("{}-user", provider),
            email: Some(format!("user@{}.example", provider)),
        };
        self.set_identity(identity);
        Ok(format!("memory://{}", provider))
    }

    async fn sign_out(&self) -> Result<(), AuthError> {
        self.clear_identity();
        Ok(())
    }
}

#[async_trait]
impl BookmarkTable for MemoryService {
    async fn select_owned(&self, owner: &str) -> Result<Vec<Bookmark>, TableError> {
        if self.select_failing.load(Ordering::SeqCst) {
            return Err(TableError::NetworkError("select unreachable".to_string()));
        }
        let state = self.lock();
        Ok(state
            .rows
            .iter()
            .rev()
            .filter(|b| b.owner == owner)
            .cloned()
            .collect())
    }

    async fn insert(&self, new: NewBookmark) -> Result<Bookmark, TableError> {
        if self.insert_failing.load(Ordering::SeqCst) {
            return Err(TableError::ApiError("insert rejected".to_string()));
        }
        let record = {
            let mut state = self.lock();
            let record = Bookmark {
                id: state.next_id,
                title: new.title,
                url: new.url,
                owner: new.owner,
            };
            state.next_id += 1;
            state.rows.push(record.clone());
            record
        };
        let _ = self
            .change_tx
            .send((record.owner.clone(), ChangeEvent::Inserted(record.clone())));
        Ok(record)
    }

    async fn delete(&self, id: i64) -> Result<(), TableError> {
        if self.delete_failing.load(Ordering::SeqCst) {
            return Err(TableError::NetworkError("delete unreachable".to_string()));
        }
        let removed = {
            let mut state = self.lock();
            match state.rows.iter().position(|b| b.id == id) {
                Some(pos) => Some(state.rows.remove(pos)),
                None => None,
            }
        };
        // Deleting an absent id succeeds, as in the real table endpoint.
        if let Some(record) = removed {
            let _ = self
                .change_tx
                .send((record.owner, ChangeEvent::Deleted { id }));
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for MemoryService {
    async fn subscribe(&self, owner: &str) -> Result<ChangeSubscription, RealtimeError> {
        if self.subscribe_failing.load(Ordering::SeqCst) {
            return Err(RealtimeError::ConnectError(
                "realtime endpoint unavailable".to_string(),
            ));
        }
        let mut feed = self.change_tx.subscribe();
        let owner = owner.to_string();
        let (tx, rx) = mpsc::channel(32);
        let forwarder = tokio::spawn(async move {
            loop {
                match feed.recv().await {
                    Ok((event_owner, event)) if event_owner == owner => {
                        if tx.send(event).await.is_err() {
                            break;
                        }
                    }
                    Ok(_) => continue,
                    Err(broadcast::error::RecvError::Lagged(_)) => continue,
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        Ok(ChangeSubscription::new(rx, Some(forwarder.abort_handle())))
    }
}
