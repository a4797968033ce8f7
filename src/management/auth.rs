use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, info};

use super::{UserRecord, UserStore, UserStoreError};
use crate::types::Token;

/// Seconds before the nominal expiry at which a token is treated as stale.
pub const EXPIRY_MARGIN_SECS: u64 = 240;

#[derive(Debug, Error)]
pub enum TokenError {
    #[error("unauthenticated: {0}")]
    Unauthenticated(String),
    #[error("re-authentication with Spotify is required: {0}")]
    RefreshRequired(String),
    #[error("token refresh failed: {0}")]
    Refresh(String),
    #[error(transparent)]
    Store(#[from] UserStoreError),
}

/// Source of live access credentials, keyed by user.
#[async_trait]
pub trait TokenProvider: Send + Sync {
    async fn access_token(&self, user_id: &str) -> Result<String, TokenError>;
}

#[derive(Debug, Deserialize)]
struct RefreshResponse {
    access_token: String,
    refresh_token: Option<String>,
    scope: Option<String>,
    expires_in: Option<u64>,
}

/// [`TokenProvider`] over the tokens kept in the user store.
///
/// Stale tokens are refreshed against the Spotify token endpoint and the
/// result is written back to the store.
pub struct TokenManager {
    users: Arc<dyn UserStore>,
    http: Client,
    token_url: String,
    client_id: Option<String>,
    client_secret: Option<String>,
}

impl TokenManager {
    pub fn new(
        users: Arc<dyn UserStore>,
        http: Client,
        token_url: impl Into<String>,
        client_id: Option<String>,
        client_secret: Option<String>,
    ) -> Self {
        Self {
            users,
            http,
            token_url: token_url.into(),
            client_id,
            client_secret,
        }
    }

    async fn refresh_token(&self, token: &Token) -> Result<Token, TokenError> {
        let client_id = self
            .client_id
            .as_deref()
            .ok_or_else(|| TokenError::Refresh("no client id configured".to_string()))?;

        let mut form = vec![
            ("grant_type", "refresh_token"),
            ("refresh_token", token.refresh_token.as_str()),
            ("client_id", client_id),
        ];
        if let Some(secret) = self.client_secret.as_deref() {
            form.push(("client_secret", secret));
        }

        let res = self
            .http
            .post(&self.token_url)
            .form(&form)
            .send()
            .await
            .map_err(|e| TokenError::Refresh(e.to_string()))?;

        if !res.status().is_success() {
            let status = res.status();
            return Err(match status.as_u16() {
                400 | 401 => TokenError::RefreshRequired(format!("refresh rejected with {status}")),
                _ => TokenError::Refresh(format!("token endpoint responded with {status}")),
            });
        }

        let json = res
            .json::<RefreshResponse>()
            .await
            .map_err(|e| TokenError::Refresh(e.to_string()))?;

        Ok(Token {
            access_token: json.access_token,
            // Spotify only sometimes rotates the refresh token.
            refresh_token: json
                .refresh_token
                .unwrap_or_else(|| token.refresh_token.clone()),
            scope: json.scope.unwrap_or_else(|| token.scope.clone()),
            expires_in: json.expires_in.unwrap_or(3600),
            obtained_at: Utc::now().timestamp() as u64,
        })
    }
}

pub fn is_expired(token: &Token, now: u64) -> bool {
    now + EXPIRY_MARGIN_SECS >= token.obtained_at + token.expires_in
}

#[async_trait]
impl TokenProvider for TokenManager {
    async fn access_token(&self, user_id: &str) -> Result<String, TokenError> {
        let Some(user) = self.users.find(user_id).await? else {
            return Err(unknown_user(user_id));
        };

        let Some(token) = user.token else {
            return Err(TokenError::RefreshRequired(format!(
                "no Spotify token stored for user {user_id}"
            )));
        };

        let now = Utc::now().timestamp() as u64;
        if !is_expired(&token, now) {
            return Ok(token.access_token);
        }

        if token.refresh_token.is_empty() {
            return Err(TokenError::RefreshRequired(format!(
                "no refresh token stored for user {user_id}"
            )));
        }

        debug!(user_id, "access token stale, refreshing");
        let fresh = self.refresh_token(&token).await?;
        let access_token = fresh.access_token.clone();

        // Only the token is written; the rest of the record may have changed
        // while the refresh was in flight.
        let stored = self
            .users
            .update(
                user_id,
                Box::new(move |user: &mut UserRecord| {
                    user.token = Some(fresh);
                    true
                }),
            )
            .await?;
        if stored.is_none() {
            return Err(unknown_user(user_id));
        }
        info!(user_id, "access token refreshed");

        Ok(access_token)
    }
}

fn unknown_user(user_id: &str) -> TokenError {
    TokenError::Unauthenticated(format!("user {user_id} does not exist"))
}
