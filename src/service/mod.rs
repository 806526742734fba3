//! marksync remote service layer.
//!
//! The hosted backend is reached through three trait seams: identity
//! resolution ([`AuthApi`]), table access ([`BookmarkTable`]), and the
//! change-notification channel ([`ChangeFeed`]). Two implementations exist:
//!
//! - [`HttpService`]: HTTP + WebSocket client for a real deployment.
//! - [`MemoryService`]: in-process backend for tests and demo mode.
//!
//! # Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use marksync::service::{MemoryService, RemoteService};
//!
//! let service: Arc<dyn RemoteService> = Arc::new(MemoryService::new());
//! ```

pub mod http;
pub mod memory;
pub mod realtime;

pub use http::HttpService;
pub use memory::MemoryService;
pub use realtime::RealtimeClient;

use async_trait::async_trait;
use tokio::sync::{broadcast, mpsc};
use tokio::task::AbortHandle;

use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::change::ChangeEvent;
use crate::types::errors::{AuthError, RealtimeError, TableError};
use crate::types::identity::{AuthChange, Identity};

/// Trait defining identity resolution and sign-in/sign-out operations.
#[async_trait]
pub trait AuthApi: Send + Sync {
    /// Resolves the currently authenticated identity, if any.
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError>;

    /// Returns a receiver of identity-change events. Subscribe before
    /// triggering sign-in/sign-out so no event is missed.
    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange>;

    /// Starts a sign-in with the named identity provider. Returns the
    /// location where the sign-in is completed.
    async fn sign_in(&self, provider: &str) -> Result<String, AuthError>;

    /// Signs the current identity out.
    async fn sign_out(&self) -> Result<(), AuthError>;
}

/// Trait defining access to the remote `bookmarks` table.
#[async_trait]
pub trait BookmarkTable: Send + Sync {
    /// Fetches all bookmarks owned by `owner`, newest first.
    async fn select_owned(&self, owner: &str) -> Result<Vec<Bookmark>, TableError>;

    /// Inserts a bookmark and returns the stored record with its
    /// authoritative id.
    async fn insert(&self, new: NewBookmark) -> Result<Bookmark, TableError>;

    /// Deletes the bookmark with the given id. Deleting an absent id is
    /// not an error.
    async fn delete(&self, id: i64) -> Result<(), TableError>;
}

/// Trait defining the push-notification channel.
#[async_trait]
pub trait ChangeFeed: Send + Sync {
    /// Subscribes to insert/delete events for rows owned by `owner`.
    async fn subscribe(&self, owner: &str) -> Result<ChangeSubscription, RealtimeError>;
}

/// The full remote collaborator: auth + table + change feed.
pub trait RemoteService: AuthApi + BookmarkTable + ChangeFeed {}

impl<T: AuthApi + BookmarkTable + ChangeFeed> RemoteService for T {}

/// A live subscription to the change-notification channel.
///
/// Events arrive on an internal queue; dropping the subscription stops the
/// reader task and releases the channel.
pub struct ChangeSubscription {
    events: mpsc::Receiver<ChangeEvent>,
    reader: Option<AbortHandle>,
}

impl ChangeSubscription {
    pub fn new(events: mpsc::Receiver<ChangeEvent>, reader: Option<AbortHandle>) -> Self {
        Self { events, reader }
    }

    /// Waits for the next change event. Returns `None` once the channel
    /// has closed.
    pub async fn next_event(&mut self) -> Option<ChangeEvent> {
        self.events.recv().await
    }
}

impl Drop for ChangeSubscription {
    fn drop(&mut self) {
        if let Some(reader) = self.reader.take() {
            reader.abort();
        }
    }
}
