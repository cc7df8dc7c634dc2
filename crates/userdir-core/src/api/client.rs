//! HTTP client for the remote user directory.
//!
//! This module provides the `DirectoryClient` contract and the reqwest-backed
//! `HttpDirectoryClient` that talks to a JSON collection resource.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::models::{User, UserDraft, UserId};

use super::TransportError;

// ============================================================================
// Constants
// ============================================================================

/// Collection resource used when nothing else is configured.
pub const DEFAULT_BASE_URL: &str = "https://jsonplaceholder.typicode.com/users";

/// HTTP request timeout in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// The four operations the cache needs from the directory.
///
/// Each call is one network round trip. Implementations must not retry.
#[async_trait]
pub trait DirectoryClient: Send + Sync {
    /// Fetch the whole collection
    async fn list(&self) -> Result<Vec<User>, TransportError>;

    /// Create a user; the returned record carries the server-assigned id
    async fn create(&self, draft: &UserDraft) -> Result<User, TransportError>;

    /// Replace a user with the given record
    async fn update(&self, user: &User) -> Result<User, TransportError>;

    /// Delete a user; the confirmation payload is ignored
    async fn delete(&self, id: UserId) -> Result<(), TransportError>;
}

/// Directory client over HTTP.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct HttpDirectoryClient {
    client: Client,
    base_url: String,
}

impl HttpDirectoryClient {
    /// Create a client for the given collection URL
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder().timeout(timeout).build()?;
        let base_url = base_url.into().trim_end_matches('/').to_string();

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn collection_url(&self) -> String {
        self.base_url.clone()
    }

    fn item_url(&self, id: UserId) -> String {
        format!("{}/{}", self.base_url, id)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response, TransportError> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(TransportError::from_status(status, &body))
        }
    }

    /// Send a prepared request once and return the successful response.
    async fn send(&self, method: &str, url: &str, request: reqwest::RequestBuilder) -> Result<reqwest::Response, TransportError> {
        debug!(method, url, "Sending directory request");

        let result = match request.send().await {
            Ok(response) => Self::check_response(response).await,
            Err(e) => Err(TransportError::from(e)),
        };

        if let Err(ref e) = result {
            warn!(method, url, error = %e, "Directory request failed");
        }
        result
    }

    async fn send_json<T: DeserializeOwned>(
        &self,
        method: &str,
        url: &str,
        request: reqwest::RequestBuilder,
    ) -> Result<T, TransportError> {
        let response = self.send(method, url, request).await?;
        response.json().await.map_err(|e| {
            warn!(method, url, error = %e, "Failed to parse directory response");
            TransportError::from(e)
        })
    }
}

#[async_trait]
impl DirectoryClient for HttpDirectoryClient {
    async fn list(&self) -> Result<Vec<User>, TransportError> {
        let url = self.collection_url();
        let users: Vec<User> = self.send_json("GET", &url, self.client.get(&url)).await?;
        debug!(count = users.len(), "Fetched users");
        Ok(users)
    }

    async fn create(&self, draft: &UserDraft) -> Result<User, TransportError> {
        let url = self.collection_url();
        let request = self.client.post(&url).json(draft);
        self.send_json("POST", &url, request).await
    }

    async fn update(&self, user: &User) -> Result<User, TransportError> {
        let url = self.item_url(user.id);
        let request = self.client.put(&url).json(user);
        self.send_json("PUT", &url, request).await
    }

    async fn delete(&self, id: UserId) -> Result<(), TransportError> {
        let url = self.item_url(id);
        self.send("DELETE", &url, self.client.delete(&url)).await?;
        Ok(())
    }
}
