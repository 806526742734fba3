//! Session Tracker for marksync.
//!
//! Resolves the current authenticated identity at startup and follows
//! identity-change events for the rest of the application's life. Holds
//! nothing beyond the identity itself.

use tokio::sync::broadcast;

use crate::service::RemoteService;
use crate::types::identity::{AuthChange, Identity};

/// Tracks the signed-in identity across auth-change events.
pub struct SessionTracker {
    identity: Option<Identity>,
    changes: broadcast::Receiver<AuthChange>,
}

impl SessionTracker {
    /// Subscribes to identity-change events, then resolves the current
    /// identity. A resolution failure is not distinguished from "no
    /// identity"; both yield an unauthenticated view.
    pub async fn start(service: &dyn RemoteService) -> Self {
        let changes = service.subscribe_changes();
        let identity = match service.current_identity().await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::debug!("identity resolution failed, treating as signed out: {}", e);
                None
            }
        };
        Self { identity, changes }
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }

    /// Waits for the next identity-change event, replaces the held
    /// identity, and returns the event. Returns `None` once the auth
    /// collaborator has gone away.
    pub async fn next_change(&mut self) -> Option<AuthChange> {
        loop {
            match self.changes.recv().await {
                Ok(change) => {
                    match &change {
                        AuthChange::SignedIn(identity) => {
                            self.identity = Some(identity.clone());
                        }
                        AuthChange::SignedOut => self.identity = None,
                    }
                    return Some(change);
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::debug!("missed {} auth events, catching up", skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}
