//! App Core for marksync.
//!
//! Central struct wiring the session tracker to sync sessions. The
//! bookmark list lives in an explicit session-scoped context: a
//! [`SyncSession`] opened when an identity becomes present and dropped
//! when it is cleared, never in ambient state.

use std::sync::Arc;

use crate::config::ClientConfig;
use crate::managers::session_tracker::SessionTracker;
use crate::managers::synchronizer::{SyncSession, SyncState};
use crate::service::RemoteService;
use crate::types::bookmark::Bookmark;
use crate::types::errors::{AuthError, CreateError};
use crate::types::identity::{AuthChange, Identity};

/// Central application struct holding the service handle, the session
/// tracker, and the sync session for the signed-in identity (if any).
pub struct App {
    config: ClientConfig,
    service: Arc<dyn RemoteService>,
    tracker: SessionTracker,
    session: Option<SyncSession>,
}

impl App {
    /// Startup sequence: subscribe to identity changes, resolve the
    /// current identity, and open a sync session when one is present.
    pub async fn startup(config: ClientConfig, service: Arc<dyn RemoteService>) -> Self {
        let tracker = SessionTracker::start(service.as_ref()).await;
        let mut app = Self {
            config,
            service,
            tracker,
            session: None,
        };
        if let Some(identity) = app.tracker.identity().cloned() {
            app.open_session(identity).await;
        }
        app
    }

    async fn open_session(&mut self, identity: Identity) {
        let session = SyncSession::open(
            identity,
            self.service.clone(),
            self.config.poll_interval(),
        )
        .await;
        self.session = Some(session);
    }

    /// Waits for the next identity-change event and applies it: a
    /// sign-in opens a fresh session (tearing down any previous one); a
    /// sign-out drops the session and with it the list. Returns the event
    /// that was applied, or `None` when the auth collaborator went away.
    pub async fn process_auth_change(&mut self) -> Option<AuthChange> {
        let change = self.tracker.next_change().await?;
        match &change {
            AuthChange::SignedIn(identity) => {
                self.session = None;
                let identity = identity.clone();
                self.open_session(identity).await;
            }
            AuthChange::SignedOut => self.session = None,
        }
        Some(change)
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.tracker.identity()
    }

    pub fn session(&self) -> Option<&SyncSession> {
        self.session.as_ref()
    }

    pub fn sync_state(&self) -> Option<SyncState> {
        self.session.as_ref().map(|s| s.state())
    }

    /// Snapshot of the current bookmark list; empty whenever no session
    /// is live.
    pub fn bookmarks(&self) -> Vec<Bookmark> {
        self.session
            .as_ref()
            .map(|s| s.bookmarks())
            .unwrap_or_default()
    }

    /// Creates a bookmark through the live session. Without one, returns
    /// `NotSignedIn` before any network call.
    pub async fn create_bookmark(&self, title: &str, url: &str) -> Result<Bookmark, CreateError> {
        match &self.session {
            Some(session) => session.create(title, url).await,
            None => Err(CreateError::NotSignedIn),
        }
    }

    /// Deletes a bookmark through the live session. Without one there is
    /// nothing to delete.
    pub async fn delete_bookmark(&self, id: i64) {
        if let Some(session) = &self.session {
            session.delete(id).await;
        }
    }

    /// Starts a provider sign-in. Returns the location where the sign-in
    /// is completed.
    pub async fn sign_in(&self, provider: &str) -> Result<String, AuthError> {
        self.service.sign_in(provider).await
    }

    pub async fn sign_out(&self) -> Result<(), AuthError> {
        self.service.sign_out().await
    }

    /// Shutdown sequence: drop the sync session, aborting its timer and
    /// subscription.
    pub fn shutdown(&mut self) {
        self.session = None;
    }
}
