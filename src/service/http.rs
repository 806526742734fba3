//! HTTP client for the hosted backend service.
//!
//! Auth endpoints follow the service's `/auth/v1` surface (user lookup,
//! logout, provider authorize); table access goes through `/rest/v1` with
//! query-string filters (`owner=eq.<id>`, `order=created_at.desc`) and
//! `Prefer: return=representation` on inserts. The change feed is
//! delegated to [`RealtimeClient`].

use std::sync::RwLock;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::sync::broadcast;

use crate::config::ClientConfig;
use crate::service::realtime::RealtimeClient;
use crate::service::{AuthApi, BookmarkTable, ChangeFeed, ChangeSubscription};
use crate::types::bookmark::{Bookmark, NewBookmark};
use crate::types::errors::{AuthError, RealtimeError, TableError};
use crate::types::identity::{AuthChange, Identity};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);
const AUTH_EVENT_CAPACITY: usize = 64;

/// User payload returned by the auth endpoint.
#[derive(Debug, Deserialize)]
struct UserPayload {
    id: String,
    email: Option<String>,
}

/// HTTP + WebSocket implementation of the remote service seams.
pub struct HttpService {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
    access_token: RwLock<Option<String>>,
    realtime: RealtimeClient,
    auth_tx: broadcast::Sender<AuthChange>,
}

impl HttpService {
    /// Creates a client for the given service base URL and anon api key.
    pub fn new(service_url: &str, api_key: &str) -> Result<Self, AuthError> {
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;
        let base_url = service_url.trim_end_matches('/').to_string();
        let realtime = RealtimeClient::new(&base_url, api_key);
        let (auth_tx, _) = broadcast::channel(AUTH_EVENT_CAPACITY);
        Ok(Self {
            http,
            base_url,
            api_key: api_key.to_string(),
            access_token: RwLock::new(None),
            realtime,
            auth_tx,
        })
    }

    /// Creates a client from loaded configuration.
    pub fn from_config(config: &ClientConfig) -> Result<Self, AuthError> {
        Self::new(&config.service_url, &config.api_key)
    }

    /// Returns the provider authorize URL a sign-in is completed at.
    pub fn authorize_url(&self, provider: &str) -> String {
        format!("{}/auth/v1/authorize?provider={}", self.base_url, provider)
    }

    /// Completes a sign-in with the access token obtained from the
    /// provider redirect: resolves the user behind the token, stores the
    /// token, and emits a signed-in event.
    pub async fn complete_sign_in(&self, access_token: &str) -> Result<Identity, AuthError> {
        let identity = self.fetch_user(access_token).await?.ok_or_else(|| {
            AuthError::ApiError("access token does not resolve to a user".to_string())
        })?;
        self.store_token(Some(access_token.to_string()));
        let _ = self.auth_tx.send(AuthChange::SignedIn(identity.clone()));
        Ok(identity)
    }

    fn store_token(&self, token: Option<String>) {
        let mut guard = self
            .access_token
            .write()
            .unwrap_or_else(|e| e.into_inner());
        *guard = token;
    }

    fn token(&self) -> Option<String> {
        self.access_token
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    /// Looks up the user behind a bearer token. A 401/403 response means
    /// the token no longer resolves to an identity.
    async fn fetch_user(&self, token: &str) -> Result<Option<Identity>, AuthError> {
        let response = self
            .http
            .get(format!("{}/auth/v1/user", self.base_url))
            .header("apikey", &self.api_key)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| AuthError::NetworkError(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN
        {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(AuthError::ApiError(format!("user lookup failed: {}", status)));
        }

        let user: UserPayload = response
            .json()
            .await
            .map_err(|e| AuthError::DecodeError(e.to_string()))?;
        Ok(Some(Identity {
            id: user.id,
            email: user.email,
        }))
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/bookmarks", self.base_url)
    }

    /// Applies the apikey and (when present) bearer headers to a request.
    fn table_request(&self, req: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        let req = req.header("apikey", &self.api_key);
        match self.token() {
            Some(token) => req.bearer_auth(token),
            None => req,
        }
    }
}

#[async_trait]
impl AuthApi for HttpService {
    async fn current_identity(&self) -> Result<Option<Identity>, AuthError> {
        match self.token() {
            Some(token) => self.fetch_user(&token).await,
            None => Ok(None),
        }
    }

    fn subscribe_changes(&self) -> broadcast::Receiver<AuthChange> {
        self.auth_tx.subscribe()
    }

    async fn sign_in(&self, provider: &str) -> Result<String, AuthError> {
        Ok(self.authorize_url(provider))
    }

    /// Signs out: best-effort logout call, then the token is dropped and
    /// a signed-out event emitted regardless of the remote outcome.
    async fn sign_out(&self) -> Result<(), AuthError> {
        if let Some(token) = self.token() {
            let result = self
                .http
                .post(format!("{}/auth/v1/logout", self.base_url))
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await;
            if let Err(e) = result {
                tracing::debug!("remote logout failed: {}", e);
            }
        }
        self.store_token(None);
        let _ = self.auth_tx.send(AuthChange::SignedOut);
        Ok(())
    }
}

#[async_trait]
impl BookmarkTable for HttpService {
    async fn select_owned(&self, owner: &str) -> Result<Vec<Bookmark>, TableError> {
        let owner_filter = format!("eq.{}", owner);
        let response = self
            .table_request(self.http.get(self.table_url()))
            .query(&[
                ("select", "*"),
                ("owner", owner_filter.as_str()),
                ("order", "created_at.desc"),
            ])
            .send()
            .await
            .map_err(|e| TableError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TableError::ApiError(format!(
                "select failed: {}",
                response.status()
            )));
        }
        response
            .json()
            .await
            .map_err(|e| TableError::DecodeError(e.to_string()))
    }

    async fn insert(&self, new: NewBookmark) -> Result<Bookmark, TableError> {
        let response = self
            .table_request(self.http.post(self.table_url()))
            .header("Prefer", "return=representation")
            .json(&new)
            .send()
            .await
            .map_err(|e| TableError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TableError::ApiError(format!(
                "insert failed: {}",
                response.status()
            )));
        }
        // The representation comes back as a single-element array.
        let mut records: Vec<Bookmark> = response
            .json()
            .await
            .map_err(|e| TableError::DecodeError(e.to_string()))?;
        if records.is_empty() {
            return Err(TableError::DecodeError(
                "insert returned no representation".to_string(),
            ));
        }
        Ok(records.remove(0))
    }

    async fn delete(&self, id: i64) -> Result<(), TableError> {
        let id_filter = format!("eq.{}", id);
        let response = self
            .table_request(self.http.delete(self.table_url()))
            .query(&[("id", id_filter.as_str())])
            .send()
            .await
            .map_err(|e| TableError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            return Err(TableError::ApiError(format!(
                "delete failed: {}",
                response.status()
            )));
        }
        Ok(())
    }
}

#[async_trait]
impl ChangeFeed for HttpService {
    async fn subscribe(&self, owner: &str) -> Result<ChangeSubscription, RealtimeError> {
        self.realtime.subscribe(owner).await
    }
}
