//! Session and Authentication Module
//!
//! Holds the authenticated principal used to scope all remote store
//! operations, and the HTTP client functions for login/registration.
//!
//! Offline, signed-out use is a first-class mode: nothing in the local
//! store requires a session. A [`SessionContext`] is only needed once
//! reconciliation reaches for the remote store.

use crate::config::Config;
use crate::error::{Result, SyncError};
use reqwest::Client;
use serde::{Deserialize, Serialize};

/// An authenticated principal plus the bearer credential that proves it
///
/// Constructed by [`AuthClient::login`] or [`AuthClient::register`]; the
/// anonymous constructor exists so unauthenticated paths stay testable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    principal_id: String,
    email: String,
    token: String,
}

impl SessionContext {
    /// A session for the given principal and bearer token
    pub fn new(
        principal_id: impl Into<String>,
        email: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            principal_id: principal_id.into(),
            email: email.into(),
            token: token.into(),
        }
    }

    /// A session that represents no authenticated principal
    pub fn anonymous() -> Self {
        Self {
            principal_id: String::new(),
            email: String::new(),
            token: String::new(),
        }
    }

    /// Whether this session carries an authenticated principal
    pub fn is_authenticated(&self) -> bool {
        !self.principal_id.is_empty() && !self.token.is_empty()
    }

    /// Identifier of the owning principal
    pub fn principal_id(&self) -> &str {
        &self.principal_id
    }

    /// Account email address
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Bearer token for remote calls
    pub fn token(&self) -> &str {
        &self.token
    }
}

/// Login request body
#[derive(Debug, Serialize)]
struct LoginRequest {
    email: String,
    password: String,
}

/// Registration request body
#[derive(Debug, Serialize)]
struct RegisterRequest {
    email: String,
    password: String,
}

/// Authentication response body
#[derive(Debug, Deserialize)]
struct AuthResponse {
    user_id: String,
    email: String,
    token: String,
}

/// Authentication HTTP client
///
/// Talks to the remote store's `/api/auth` endpoints and turns successful
/// responses into a ready [`SessionContext`].
#[derive(Debug, Clone)]
pub struct AuthClient {
    config: Config,
    client: Client,
}

impl AuthClient {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            client: Client::new(),
        }
    }

    /// Log in with email and password
    ///
    /// Fails with `InvalidCredentials` when the service rejects the login
    /// and `RemoteUnavailable` on transport failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<SessionContext> {
        let url = self.config.api_url("/api/auth/login");
        let request = LoginRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        match response.status().as_u16() {
            401 | 403 => return Err(SyncError::InvalidCredentials),
            status if !response.status().is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(SyncError::remote_unavailable(format!(
                    "login failed: {} {}",
                    status, text
                )));
            }
            _ => {}
        }

        let auth: AuthResponse = response.json().await?;
        Ok(SessionContext::new(auth.user_id, auth.email, auth.token))
    }

    /// Register a new account and log it in
    ///
    /// Fails with `AccountExists` when the email is already registered.
    /// On success the new account is immediately usable: the returned
    /// session is authenticated, matching the login flow.
    pub async fn register(&self, email: &str, password: &str) -> Result<SessionContext> {
        let url = self.config.api_url("/api/auth/register");
        let request = RegisterRequest {
            email: email.to_string(),
            password: password.to_string(),
        };

        let response = self.client.post(&url).json(&request).send().await?;

        match response.status().as_u16() {
            409 => return Err(SyncError::AccountExists),
            status if !response.status().is_success() => {
                let text = response.text().await.unwrap_or_default();
                return Err(SyncError::remote_unavailable(format!(
                    "registration failed: {} {}",
                    status, text
                )));
            }
            _ => {}
        }

        let auth: AuthResponse = response.json().await?;
        Ok(SessionContext::new(auth.user_id, auth.email, auth.token))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anonymous_session_is_not_authenticated() {
        let session = SessionContext::anonymous();
        assert!(!session.is_authenticated());
        assert_eq!(session.principal_id(), "");
    }

    #[test]
    fn test_constructed_session_is_authenticated() {
        let session = SessionContext::new("user-1", "a@example.com", "token-abc");
        assert!(session.is_authenticated());
        assert_eq!(session.principal_id(), "user-1");
        assert_eq!(session.email(), "a@example.com");
        assert_eq!(session.token(), "token-abc");
    }

    #[test]
    fn test_token_without_principal_is_not_authenticated() {
        let session = SessionContext::new("", "a@example.com", "token-abc");
        assert!(!session.is_authenticated());
    }
}
