//! Bearer + refresh session issuance (§4.4).

use crate::config::AuthConfig;
use crate::db::Store;
use crate::domain::User;
use crate::error::{CoreError, CoreResult};
use chrono::{Duration, Utc};
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use uuid::Uuid;

#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Issues and validates sessions. The Redis handle is optional: without it,
/// logout still revokes the refresh handle but cannot force-expire a still
/// live bearer token early (it simply expires naturally at `exp`).
#[derive(Clone)]
pub struct SessionService {
    store: Store,
    redis: Option<Arc<Mutex<ConnectionManager>>>,
    access_ttl_seconds: i64,
    refresh_ttl_seconds: i64,
}

impl SessionService {
    pub fn new(
        store: Store,
        redis: Option<Arc<Mutex<ConnectionManager>>>,
        auth: &AuthConfig,
    ) -> Self {
        Self {
            store,
            redis,
            access_ttl_seconds: auth.access_ttl_seconds,
            refresh_ttl_seconds: auth.refresh_ttl_seconds,
        }
    }

    pub async fn register(&self, email: &str, password: &str) -> CoreResult<User> {
        let email = normalize_email(email);
        if self.store.users.find_by_email(&email).await?.is_some() {
            return Err(CoreError::Conflict("email already registered".into()));
        }

        let password_hash = super::password::hash_password(password)?;
        self.store.users.create(&email, Some(&password_hash), None).await
    }

    pub async fn login(&self, email: &str, password: &str) -> CoreResult<TokenPair> {
        let email = normalize_email(email);
        let user = self
            .store
            .users
            .find_by_email(&email)
            .await?
            .ok_or(CoreError::Unauthenticated)?;

        let Some(password_hash) = &user.password_hash else {
            return Err(CoreError::Unauthenticated);
        };

        if !super::password::verify_password(password, password_hash)? {
            return Err(CoreError::Unauthenticated);
        }

        self.issue_pair(user.id).await
    }

    /// Single-use refresh (§4.4): the old handle is deleted before the new
    /// pair is issued, so a replayed refresh token always fails.
    pub async fn refresh(&self, refresh_token: &str) -> CoreResult<TokenPair> {
        let hash = crypto_core::token_hash(refresh_token);
        let handle = self.store.auth_tokens.find_refresh_handle(&hash).await?;
        self.store
            .auth_tokens
            .revoke_refresh_handle(handle.id)
            .await?;
        self.issue_pair(handle.user_id).await
    }

    pub async fn logout(&self, access_token: &str, refresh_token: Option<&str>) -> CoreResult<()> {
        if let Some(refresh_token) = refresh_token {
            let hash = crypto_core::token_hash(refresh_token);
            if let Ok(handle) = self.store.auth_tokens.find_refresh_handle(&hash).await {
                self.store
                    .auth_tokens
                    .revoke_refresh_handle(handle.id)
                    .await?;
            }
        }

        self.revoke_access_token(access_token).await;
        Ok(())
    }

    pub(crate) async fn issue_pair(&self, user_id: Uuid) -> CoreResult<TokenPair> {
        let access_token = crypto_core::jwt::generate_access_token(user_id, self.access_ttl_seconds)
            .map_err(CoreError::Internal)?;

        let refresh_token = crypto_core::random_token(48);
        let token_hash = crypto_core::token_hash(&refresh_token);
        let expires_at = Utc::now() + Duration::seconds(self.refresh_ttl_seconds);
        self.store
            .auth_tokens
            .create_refresh_handle(user_id, &token_hash, expires_at)
            .await?;

        Ok(TokenPair {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: self.access_ttl_seconds,
        })
    }

    /// Records the bearer token as revoked for the remainder of its natural
    /// lifetime so `actix_middleware::TokenRevocationMiddleware` rejects it
    /// on the very next request, even though the JWT signature itself
    /// remains valid until `exp` (§4.4 logout).
    async fn revoke_access_token(&self, access_token: &str) {
        let Some(redis) = &self.redis else {
            return;
        };

        let remaining_ttl = crypto_core::jwt::validate_token(access_token)
            .ok()
            .map(|data| (data.claims.exp - Utc::now().timestamp()).max(1))
            .unwrap_or(self.access_ttl_seconds);

        let token_hash = hex::encode(crypto_core::hash::sha256(access_token.as_bytes()));
        let key = format!("revoked_token:{token_hash}");

        let mut conn = redis.lock().await;
        let result: Result<(), redis::RedisError> =
            conn.set_ex(&key, 1, remaining_ttl as u64).await;
        if let Err(err) = result {
            tracing::warn!(error = %err, "failed to record token revocation");
        }
    }
}

fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}
