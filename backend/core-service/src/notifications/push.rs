//! Outbound push transport (§4.6, §6). Missing vendor credentials make this
//! a silent no-op rather than a startup failure.

use crate::config::PushConfig;
use crate::db::Store;
use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
struct PushPayload<'a> {
    token: &'a str,
    title: &'a str,
    body: &'a str,
    data: Option<serde_json::Value>,
}

#[derive(Clone)]
pub struct PushClient {
    http: reqwest::Client,
    config: PushConfig,
}

impl PushClient {
    pub fn new(config: PushConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.is_configured()
    }

    /// Sends to every push token registered for `user_id`. A vendor
    /// response indicating the token is no longer valid deletes the token
    /// row (§4.6 "Invalid-token HTTP responses result in deleting the token
    /// row"); any other transport failure is logged and swallowed.
    pub async fn send_to_user(
        &self,
        store: &Store,
        user_id: Uuid,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) {
        if !self.is_configured() {
            debug!(%user_id, "push vendor not configured, skipping");
            return;
        }

        let tokens = match store.push_tokens.list_for_user(user_id).await {
            Ok(tokens) => tokens,
            Err(err) => {
                warn!(%user_id, error = %err, "failed to load push tokens");
                return;
            }
        };

        for token in tokens {
            match self.send_one(&token.token, title, body, data.clone()).await {
                Ok(()) => {}
                Err(PushSendError::InvalidToken) => {
                    let _ = store.push_tokens.remove(user_id, &token.token).await;
                }
                Err(PushSendError::Transport(err)) => {
                    warn!(%user_id, error = %err, "push delivery failed");
                }
            }
        }
    }

    async fn send_one(
        &self,
        token: &str,
        title: &str,
        body: &str,
        data: Option<serde_json::Value>,
    ) -> Result<(), PushSendError> {
        let Some(endpoint) = &self.config.vendor_endpoint else {
            return Ok(());
        };

        let response = self
            .http
            .post(endpoint)
            .bearer_auth(self.config.vendor_key.as_deref().unwrap_or_default())
            .json(&PushPayload {
                token,
                title,
                body,
                data,
            })
            .send()
            .await
            .map_err(|e| PushSendError::Transport(e.to_string()))?;

        match response.status().as_u16() {
            200..=299 => Ok(()),
            400 | 404 | 410 => Err(PushSendError::InvalidToken),
            status => Err(PushSendError::Transport(format!("vendor returned {status}"))),
        }
    }
}

enum PushSendError {
    InvalidToken,
    Transport(String),
}
