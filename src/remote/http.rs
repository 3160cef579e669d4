//! Remote Store HTTP Client
//!
//! This module provides the reqwest-backed implementation of
//! [`RemoteStore`] against the document-store HTTP API.
//!
//! Status mapping: 401/403 become `Unauthenticated`, 404 becomes
//! `NotFound`, every other failure (including transport errors) becomes
//! `RemoteUnavailable` and is retried on a later reconciliation pass.

use crate::config::Config;
use crate::error::{Result, SyncError};
use crate::remote::{RemoteStore, RemoteTodo};
use crate::session::SessionContext;
use crate::types::TodoPatch;
use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::{Deserialize, Serialize};

/// Insert request body
#[derive(Debug, Serialize)]
struct InsertRequest<'a> {
    text: &'a str,
    done: bool,
}

/// Insert response body
#[derive(Debug, Deserialize)]
struct InsertResponse {
    remote_id: String,
}

/// Owner-scoped listing response body
#[derive(Debug, Deserialize)]
struct ListResponse {
    todos: Vec<RemoteTodo>,
}

/// HTTP client for the remote document store
#[derive(Debug, Clone)]
pub struct HttpRemoteStore {
    config: Config,
    client: Client,
}

impl HttpRemoteStore {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Bearer header value for the session, or `Unauthenticated`
    fn bearer(session: &SessionContext) -> Result<String> {
        if !session.is_authenticated() {
            return Err(SyncError::Unauthenticated);
        }
        Ok(format!("Bearer {}", session.token()))
    }

    /// Map a non-success response to the error taxonomy
    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(SyncError::Unauthenticated),
            StatusCode::NOT_FOUND => Err(SyncError::not_found("remote document")),
            _ => {
                let text = response.text().await.unwrap_or_else(|_| status.to_string());
                Err(SyncError::remote_unavailable(format!(
                    "{} {}",
                    status, text
                )))
            }
        }
    }
}

#[async_trait]
impl RemoteStore for HttpRemoteStore {
    async fn insert(&self, session: &SessionContext, text: &str, done: bool) -> Result<String> {
        let url = self.config.api_url("/api/todos");
        let response = self
            .client
            .post(&url)
            .header("Authorization", Self::bearer(session)?)
            .json(&InsertRequest { text, done })
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: InsertResponse = response.json().await?;
        Ok(body.remote_id)
    }

    async fn update(
        &self,
        session: &SessionContext,
        remote_id: &str,
        patch: &TodoPatch,
    ) -> Result<()> {
        let url = self
            .config
            .api_url(&format!("/api/todos/{}", remote_id));
        let response = self
            .client
            .patch(&url)
            .header("Authorization", Self::bearer(session)?)
            .json(patch)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn delete(&self, session: &SessionContext, remote_id: &str) -> Result<()> {
        let url = self
            .config
            .api_url(&format!("/api/todos/{}", remote_id));
        let response = self
            .client
            .delete(&url)
            .header("Authorization", Self::bearer(session)?)
            .send()
            .await?;

        Self::check(response).await?;
        Ok(())
    }

    async fn list_by_owner(&self, session: &SessionContext) -> Result<Vec<RemoteTodo>> {
        let url = self.config.api_url("/api/todos");
        let response = self
            .client
            .get(&url)
            .header("Authorization", Self::bearer(session)?)
            .send()
            .await?;

        let response = Self::check(response).await?;
        let body: ListResponse = response.json().await?;
        Ok(body.todos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_anonymous_session_is_rejected_before_any_request() {
        let store = HttpRemoteStore::new(Config::default());
        let session = SessionContext::anonymous();

        let result = store.insert(&session, "no session", false).await;
        assert!(matches!(result, Err(SyncError::Unauthenticated)));
    }
}
